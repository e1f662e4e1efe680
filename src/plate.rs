//! Registration plate normalization and validation.
//!
//! Plates use the twelve Cyrillic capitals that look like Latin letters plus
//! the ASCII digits. Anything typed by a user goes through [`normalize`]
//! first; [`parse`] then splits a well-formed plate into its parts.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Cyrillic letters allowed on a plate, in the same order as
/// `LATIN_LOOKALIKES`.
pub const PLATE_LETTERS: [char; 12] = [
    'А', 'В', 'Е', 'К', 'М', 'Н', 'О', 'Р', 'С', 'Т', 'У', 'Х',
];

const LATIN_LOOKALIKES: [char; 12] = [
    'A', 'B', 'E', 'K', 'M', 'H', 'O', 'P', 'C', 'T', 'Y', 'X',
];

/// Shortest possible valid plate: letter, 3 digits, 2 letters, 2-digit region.
pub const MIN_PLATE_LEN: usize = 8;

fn grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Regex::new(r"^[АВЕКМНОРСТУХ][0-9]{3}[АВЕКМНОРСТУХ]{2}[0-9]{2,3}$")
            .expect("plate grammar must compile")
    })
}

/// Plate text in canonical form: no whitespace, upper-case, plate alphabet only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PlateString(String);

impl PlateString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in characters, not bytes.
    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_valid(&self) -> bool {
        is_valid(&self.0)
    }

    pub fn parse(&self) -> Option<ParsedPlate> {
        parse(&self.0)
    }
}

impl fmt::Display for PlateString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PlateString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A valid plate split into the parts printed on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPlate {
    pub letter1: char,
    pub digits: String,
    pub letter2: char,
    pub letter3: char,
    pub region: String,
}

impl ParsedPlate {
    /// The three series letters, e.g. `АВС` for `А123ВС777`.
    pub fn series(&self) -> String {
        [self.letter1, self.letter2, self.letter3].iter().collect()
    }
}

impl fmt::Display for ParsedPlate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}{}",
            self.letter1, self.digits, self.letter2, self.letter3, self.region
        )
    }
}

pub fn is_plate_letter(c: char) -> bool {
    PLATE_LETTERS.contains(&c)
}

fn canonical(c: char) -> Option<char> {
    if c.is_ascii_digit() || is_plate_letter(c) {
        return Some(c);
    }
    LATIN_LOOKALIKES
        .iter()
        .position(|&l| l == c)
        .map(|i| PLATE_LETTERS[i])
}

/// Normalizes raw user input. Never fails; unknown characters are dropped.
pub fn normalize(raw: &str) -> PlateString {
    PlateString(
        raw.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_uppercase)
            .filter_map(canonical)
            .collect(),
    )
}

pub fn is_valid(s: &str) -> bool {
    grammar().is_match(s)
}

/// Splits `s` at the fixed offsets of the grammar. `None` unless `is_valid(s)`.
pub fn parse(s: &str) -> Option<ParsedPlate> {
    if !is_valid(s) {
        return None;
    }
    let chars: Vec<char> = s.chars().collect();
    Some(ParsedPlate {
        letter1: chars[0],
        digits: chars[1..4].iter().collect(),
        letter2: chars[4],
        letter3: chars[5],
        region: chars[6..].iter().collect(),
    })
}

/// Parses raw input as it is being typed; `None` until a complete plate is entered.
pub fn preview(raw: &str) -> Option<ParsedPlate> {
    let plate = normalize(raw);
    if plate.len() < MIN_PLATE_LEN {
        return None;
    }
    plate.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_whitespace_and_maps_latin() {
        assert_eq!(normalize(" a123bc777 ").as_str(), "А123ВС777");
        assert_eq!(normalize("х 001 хх\t99").as_str(), "Х001ХХ99");
    }

    #[test]
    fn normalize_drops_foreign_symbols() {
        assert_eq!(normalize("Z-Ж_123!Q").as_str(), "123");
        assert_eq!(normalize("١٢٣").as_str(), "");
        assert!(normalize("   ").is_empty());
    }

    #[test]
    fn normalize_output_uses_plate_alphabet_only() {
        let inputs = [
            "",
            "abc xyz 123",
            "ÄÖÜ ßẞ ǅ",
            "\u{00a0}м\u{2003}555\nор\r\n50",
            "emoji 🚗 plate",
            "ABEKMHOPCTYX abekmhopctyx 0123456789",
        ];
        for input in inputs.iter() {
            let out = normalize(input);
            assert!(
                out.as_str()
                    .chars()
                    .all(|c| c.is_ascii_digit() || is_plate_letter(c)),
                "{:?} -> {:?}",
                input,
                out
            );
        }
    }

    #[test]
    fn grammar_accepts_two_and_three_digit_regions() {
        assert!(is_valid("А123ВС77"));
        assert!(is_valid("А123ВС777"));
        assert!(is_valid("Х000ХХ01"));
    }

    #[test]
    fn grammar_rejects_deviations() {
        for s in [
            "",
            "А12ВС7",
            "А123ВС7",
            "А123ВС7777",
            "1123ВС777",
            "АА23ВС777",
            "А123В1777",
            "A123BC777",
            "Б123ВС777",
            " А123ВС777",
            "А123ВС777\n",
        ]
        .iter()
        {
            assert!(!is_valid(s), "{:?} should be invalid", s);
            assert!(parse(s).is_none());
        }
    }

    #[test]
    fn parse_splits_at_fixed_offsets() {
        let parts = parse("А123ВС777").unwrap();
        assert_eq!(parts.letter1, 'А');
        assert_eq!(parts.digits, "123");
        assert_eq!(parts.letter2, 'В');
        assert_eq!(parts.letter3, 'С');
        assert_eq!(parts.region, "777");
        assert_eq!(parts.series(), "АВС");
    }

    #[test]
    fn parsed_plate_reconstructs_source() {
        for s in ["А123ВС77", "М555ОР750", "Е001КХ99"].iter() {
            assert_eq!(parse(s).unwrap().to_string(), *s);
        }
    }

    #[test]
    fn mixed_case_latin_input_parses() {
        let plate = normalize(" a123bc777 ");
        assert!(plate.is_valid());
        let parts = plate.parse().unwrap();
        assert_eq!(parts.digits, "123");
        assert_eq!(parts.region, "777");
    }

    #[test]
    fn too_short_input_is_invalid() {
        assert!(!normalize("A12BC7").is_valid());
    }

    #[test]
    fn preview_waits_for_complete_plate() {
        assert!(preview("а12").is_none());
        assert!(preview("а123вс7").is_none());
        assert_eq!(preview("а123вс77").unwrap().region, "77");
    }
}
