use once_cell::sync::Lazy;
use regex::Regex;

// unicode punctuation and symbols; combining marks are left alone so
// scripts like Devanagari keep their vowel signs
static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\p{P}\p{S}]").expect("punctuation regex is valid"));

/// Comparison form of `text`: lowercase, no punctuation or symbols, single spaces.
///
/// Separators inside numbers go away with the rest of the punctuation, so
/// `1,000` and `1000` compare equal.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let stripped = PUNCTUATION.replace_all(&lower, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn word_count(normalized: &str) -> usize {
    normalized.split_whitespace().count()
}
