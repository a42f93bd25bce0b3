//! The single normalization rule shared by alias build and recall.
//!
//! Lowercases ASCII and removes every whitespace, punctuation, and symbol
//! character. Hangul, digits, and letters are kept as-is.

use regex::Regex;
use std::sync::OnceLock;

static STRIP: OnceLock<Regex> = OnceLock::new();

fn strip_pattern() -> &'static Regex {
    STRIP.get_or_init(|| {
        Regex::new(r"[\s\p{P}\p{S}]+").expect("static normalization pattern")
    })
}

/// Normalizes a coverage name or alias.
pub fn normalize(text: &str) -> String {
    strip_pattern()
        .replace_all(text, "")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_whitespace_and_punctuation() {
        assert_eq!(normalize("암 진단비(유사암 제외)"), "암진단비유사암제외");
        assert_eq!(normalize("  유사암·진단비  "), "유사암진단비");
    }

    #[test]
    fn test_lowercases_ascii() {
        assert_eq!(normalize("CI 보험금"), "ci보험금");
    }

    #[test]
    fn test_symbols_removed() {
        assert_eq!(normalize("질병+상해 / 입원일당"), "질병상해입원일당");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize("[갱신형] 암 진단비 Ⅱ");
        assert_eq!(normalize(&once), once);
    }

    #[test]
    fn test_only_punctuation_normalizes_to_empty() {
        assert_eq!(normalize(" - / . "), "");
    }
}
