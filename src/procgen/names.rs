pub const PREFIXES: &[&str] = &[
    "Ker", "Jo", "Ear", "Ju", "Jeb", "Plu", "Nep", "Bes", "Tat", "Coru",
    "Dego", "Ho", "Geo", "Mu", "Usta", "Pla", "Gal", "Rea", "Olym", "Mor",
    "Mar", "Jup", "Sa", "Sat", "Kry", "Ee", "Su", "Spar", "He", "Xa",
    "Sak", "So", "Ha", "Kor", "Ath", "Chand", "Rig", "Ven", "Den", "C",
    "Holo", "Korr", "Ran",
];

pub const SUFFIXES: &[&str] = &[
    "bin", "ol", "th", "to", "ne", "in", "ant", "bah", "sis", "n",
    "os", "ch", "dor", "vin", "s", "ury", "us", "it", "er", "urn",
    "une", "pau", "far", "ton", "lou", "tax", "dar", "aar", "l", "la",
    "nth", "il", "ifrey", "nus", "neb", "ron", "ii", "iban", "trax", "turus",
    "clos", "daa",
];

const ROMAN_NUMERALS: &[&str] = &["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];

/// Moon designation for the zero-based distance rank among its siblings.
/// Past the table the highest numeral repeats as a prefix: 10 -> "XI".
pub fn roman_numeral(mut index: usize) -> String {
    let highest = ROMAN_NUMERALS[ROMAN_NUMERALS.len() - 1];
    let mut out = String::new();
    while index >= ROMAN_NUMERALS.len() {
        out.push_str(highest);
        index -= ROMAN_NUMERALS.len();
    }
    out.push_str(ROMAN_NUMERALS[index]);
    out
}

/// Planet designation for the zero-based distance rank: 0 -> "b", 24 -> "z",
/// then "aa", "ab", ...
pub fn planet_letter(index: usize) -> String {
    // Bijective base-26 where 'a' is 1, starting from 'b'.
    let mut n = index + 2;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'a' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}
