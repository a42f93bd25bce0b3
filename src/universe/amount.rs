//! Won amount parsing for proposal tables
//!
//! Accepts digit groups with the Korean units 십, 백, 천 (inside a section)
//! and 만, 억 (closing a section), an optional trailing 원, commas, and
//! whitespace. Anything else is not an amount.

use regex::Regex;
use std::sync::OnceLock;

static SHAPE: OnceLock<Regex> = OnceLock::new();

fn shape() -> &'static Regex {
    SHAPE.get_or_init(|| Regex::new(r"^[0-9십백천만억]+원?$").expect("static amount pattern"))
}

/// Parses an amount text into won. Overflow and placeholders yield `None`.
pub fn parse_amount(text: &str) -> Option<u64> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if !shape().is_match(&compact) {
        return None;
    }
    let body = compact.strip_suffix('원').unwrap_or(&compact);

    let mut total: u64 = 0;
    let mut section: u64 = 0;
    let mut digits: Option<u64> = None;
    let mut saw_value = false;

    for c in body.chars() {
        if let Some(d) = c.to_digit(10) {
            digits = Some(digits.unwrap_or(0).checked_mul(10)?.checked_add(d as u64)?);
            saw_value = true;
            continue;
        }
        let small = match c {
            '십' => Some(10),
            '백' => Some(100),
            '천' => Some(1_000),
            _ => None,
        };
        if let Some(unit) = small {
            section = section.checked_add(digits.take().unwrap_or(1).checked_mul(unit)?)?;
            saw_value = true;
            continue;
        }
        let big: u64 = match c {
            '만' => 10_000,
            '억' => 100_000_000,
            _ => return None,
        };
        let value = section.checked_add(digits.take().unwrap_or(0))?;
        if value == 0 {
            return None;
        }
        total = total.checked_add(value.checked_mul(big)?)?;
        section = 0;
    }

    if !saw_value {
        return None;
    }
    total.checked_add(section)?.checked_add(digits.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_man_won() {
        assert_eq!(parse_amount("3,000만원"), Some(30_000_000));
        assert_eq!(parse_amount("500만"), Some(5_000_000));
    }

    #[test]
    fn test_mixed_units() {
        assert_eq!(parse_amount("1억 2천만원"), Some(120_000_000));
        assert_eq!(parse_amount("1천만원"), Some(10_000_000));
        assert_eq!(parse_amount("천만원"), Some(10_000_000));
        assert_eq!(parse_amount("2억"), Some(200_000_000));
    }

    #[test]
    fn test_plain_won() {
        assert_eq!(parse_amount("10,000,000원"), Some(10_000_000));
        assert_eq!(parse_amount("25,300"), Some(25_300));
        assert_eq!(parse_amount("0원"), Some(0));
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("-"), None);
        assert_eq!(parse_amount("보장"), None);
        assert_eq!(parse_amount("세부보장참조"), None);
        assert_eq!(parse_amount("만원"), None);
        assert_eq!(parse_amount("원"), None);
    }

    #[test]
    fn test_overflow() {
        assert_eq!(parse_amount("99999999999999999999999원"), None);
        assert_eq!(parse_amount("999999999999억"), None);
    }
}
