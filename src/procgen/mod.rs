pub mod names;
pub mod seed;

pub use seed::{WarpRng, make_seed};

/// Strip every character outside printable ASCII. Returns `None` when
/// nothing usable is left.
pub fn sanitize_seed(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(|c| (' '..='~').contains(c)).collect();
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_control_and_non_ascii() {
        assert_eq!(sanitize_seed("Al\tpha\u{e9}\n").as_deref(), Some("Alpha"));
        assert_eq!(sanitize_seed(" ~ok~ ").as_deref(), Some(" ~ok~ "));
    }

    #[test]
    fn empty_after_cleaning_is_rejected() {
        assert_eq!(sanitize_seed(""), None);
        assert_eq!(sanitize_seed("\u{1}\u{2}\u{3}\u{e9}"), None);
    }
}
