//! A1-notation parsing and formatting.
//!
//! Bidirectional conversion between spreadsheet-style references (e.g. "A1",
//! "B2", "AA100") and the core's zero-based [`Point`] coordinates.

use regex::Regex;
use std::sync::OnceLock;
use tabula_core::Point;

fn a1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Za-z]+)(?<numbers>[0-9]+)$").expect("A1 regex must compile")
    })
}

/// Parse a reference like "A1" or "aa10" into a zero-based point.
/// Returns `None` if the input is not valid A1 notation (row numbers are
/// 1-based, so "A0" is invalid).
pub fn parse_a1(name: &str) -> Option<Point> {
    let caps = a1_re().captures(name)?;
    let column = parse_column_letters(&caps["letters"])?;
    let row = caps["numbers"].parse::<usize>().ok()?.checked_sub(1)?;
    Some(Point { row, column })
}

/// Parse column letters alone (A -> 0, Z -> 25, AA -> 26).
pub fn parse_column_letters(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    let index = letters
        .to_ascii_uppercase()
        .bytes()
        .fold(0usize, |acc, b| acc * 26 + (b - b'A') as usize + 1);
    Some(index - 1)
}

/// Convert a column index to letters (0 -> A, 25 -> Z, 26 -> AA).
pub fn column_letters(column: usize) -> String {
    let mut result = String::new();
    let mut n = column + 1;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

/// Format a point in A1 notation.
pub fn to_a1(point: Point) -> String {
    format!("{}{}", column_letters(point.column), point.row + 1)
}

/// Whether a token has the shape of an A1 reference, valid or not.
/// Used to classify unresolved identifiers: "A0" is ref-shaped, "total" is
/// not.
pub fn is_ref_shaped(token: &str) -> bool {
    a1_re().is_match(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_and_multi_letter_references() {
        assert_eq!(parse_a1("A1"), Some(Point::new(0, 0)));
        assert_eq!(parse_a1("B3"), Some(Point::new(2, 1)));
        assert_eq!(parse_a1("AA100"), Some(Point::new(99, 26)));
        assert_eq!(parse_a1("zz1"), Some(Point::new(0, 701)));
    }

    #[test]
    fn rejects_malformed_references() {
        assert_eq!(parse_a1("A0"), None);
        assert_eq!(parse_a1("1A"), None);
        assert_eq!(parse_a1("A"), None);
        assert_eq!(parse_a1(""), None);
        assert_eq!(parse_a1("A1B"), None);
    }

    #[test]
    fn column_letters_round_trip() {
        for column in [0, 1, 25, 26, 51, 701, 702] {
            assert_eq!(parse_column_letters(&column_letters(column)), Some(column));
        }
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(26), "AA");
    }

    #[test]
    fn a1_round_trip() {
        let point = Point::new(41, 27);
        assert_eq!(parse_a1(&to_a1(point)), Some(point));
    }

    #[test]
    fn ref_shape_is_independent_of_validity() {
        assert!(is_ref_shaped("A1"));
        assert!(is_ref_shaped("A0"));
        assert!(!is_ref_shaped("total"));
        assert!(!is_ref_shaped("A1:B2"));
    }
}
