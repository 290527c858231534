use std::hash::{Hash, Hasher};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::names;

/// Hash a seed string into the 64-bit state the stream is seeded from.
pub fn make_seed(seed: &str) -> u64 {
    let mut hasher = std::hash::DefaultHasher::new();
    seed.hash(&mut hasher);
    hasher.finish()
}

/// Reseedable stream every randomizer draws from.
///
/// All draws advance one stream, so a fixed seed and a fixed call order
/// always give the same values. Callers must not reorder draws.
#[derive(Debug, Clone)]
pub struct WarpRng {
    rng: SmallRng,
}

impl WarpRng {
    pub fn new(seed: &str) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(make_seed(seed)),
        }
    }

    /// Reset to the state derived from `seed` alone. Empty seeds are rejected
    /// before they get here.
    pub fn reseed(&mut self, seed: &str) {
        self.rng = SmallRng::seed_from_u64(make_seed(seed));
    }

    /// Integer in `min..max`. Returns `min` for an empty range.
    pub fn next_int(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        self.rng.random_range(min..max)
    }

    /// Float in `[min, max)`.
    pub fn next_float(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_unit() * (max - min)
    }

    pub fn next_range(&mut self, range: (f64, f64)) -> f64 {
        self.next_float(range.0, range.1)
    }

    /// Float in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }

    /// Index in `0..len`.
    pub fn next_index(&mut self, len: usize) -> usize {
        self.next_int(0, len as i64) as usize
    }

    /// Prefix + suffix drawn from the two fixed word lists.
    pub fn next_name_pair(&mut self) -> String {
        let prefix = names::PREFIXES[self.next_index(names::PREFIXES.len())];
        let suffix = names::SUFFIXES[self.next_index(names::SUFFIXES.len())];
        format!("{prefix}{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_hash() {
        assert_eq!(make_seed("Alpha Centauri"), make_seed("Alpha Centauri"));
        assert_ne!(make_seed("Alpha Centauri"), make_seed("Alpha Centaurj"));
    }

    #[test]
    fn reseed_restarts_the_stream() {
        let mut rng = WarpRng::new("xyz");
        let first: Vec<i64> = (0..8).map(|_| rng.next_int(0, 1000)).collect();
        rng.next_name_pair();
        rng.reseed("xyz");
        let again: Vec<i64> = (0..8).map(|_| rng.next_int(0, 1000)).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn float_stays_in_half_open_range() {
        let mut rng = WarpRng::new("bounds");
        for _ in 0..1000 {
            let v = rng.next_float(2.0, 3.0);
            assert!((2.0..3.0).contains(&v), "{v}");
            let u = rng.next_unit();
            assert!((0.0..1.0).contains(&u), "{u}");
        }
    }

    #[test]
    fn empty_int_range_returns_min() {
        let mut rng = WarpRng::new("empty");
        assert_eq!(rng.next_int(5, 5), 5);
        assert_eq!(rng.next_int(9, 3), 9);
    }

    #[test]
    fn name_pair_uses_word_lists() {
        let mut rng = WarpRng::new("names");
        for _ in 0..50 {
            let name = rng.next_name_pair();
            assert!(names::PREFIXES.iter().any(|p| name.starts_with(p)), "{name}");
            assert!(names::SUFFIXES.iter().any(|s| name.ends_with(s)), "{name}");
        }
    }
}
