//! Word matching helpers shared by revelation detection and beat matching.

use std::collections::BTreeSet;

/// Distinct lowercase words of `text` longer than `min_len` characters.
pub fn key_words(text: &str, min_len: usize) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| w.chars().count() > min_len)
        .collect()
}

/// Number of key words two texts have in common.
pub fn shared_key_words(a: &str, b: &str, min_len: usize) -> usize {
    let a = key_words(a, min_len);
    let b = key_words(b, min_len);
    a.intersection(&b).count()
}

/// Whether `text` mentions any keyword. Single keywords match whole words,
/// keywords with spaces match as phrases.
pub fn mentions_any(text: &str, keywords: &[&str]) -> bool {
    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .collect();
    keywords.iter().any(|k| {
        if k.contains(' ') {
            lower.contains(k)
        } else {
            words.contains(k)
        }
    })
}
