//! Text preprocessing for embedding generation.
//!
//! Raw fact text goes through two stages before hashing:
//! 1. Normalization: lowercase, punctuation replaced with spaces, whitespace collapsed
//! 2. Tokenization: whitespace split, bilingual stopword removal
//!
//! Token order is preserved; the embedder weights earlier tokens higher.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// `stopwords: tokens removed before weighting, enumerated bilingual list`.
/// Turkish function words first, then English.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        // Turkish
        "bir", "bu", "şu", "o", "ve", "veya", "ile", "için", "da", "de",
        "den", "dan", "i", "ı", "u", "ü", "mi", "mı", "mu", "mü",
        // English
        "a", "an", "the", "this", "and", "or", "but", "in", "on", "at",
        "to", "for", "of", "with", "by", "from", "is", "are", "was", "were",
    ])
});

/// Normalize raw text for tokenization.
///
/// Lowercases, replaces every punctuation character with a space, and
/// collapses whitespace runs into single spaces. Returns an empty string
/// when the input has no alphanumeric content.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|fragment| !fragment.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split normalized text into tokens, dropping stopwords.
///
/// Order is significant: the embedder decays weights by position.
pub fn tokenize(normalized: &str) -> Vec<String> {
    normalized
        .split_whitespace()
        .filter(|word| !STOPWORDS.contains(*word))
        .map(|word| word.to_string())
        .collect()
}

/// Check a lowercased word against the stopword set.
pub(crate) fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(normalize_text("Hello World"), "hello world");
    }

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(normalize_text("hello, world! (test)"), "hello world test");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_text("hello   world\n\ttest"), "hello world test");
    }

    #[test]
    fn test_normalize_empty_for_letterless_input() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("!!! ... ---"), "");
        assert_eq!(normalize_text("   \n\t  "), "");
    }

    #[test]
    fn test_normalize_keeps_turkish_letters() {
        assert_eq!(normalize_text("Kahve içmeyi çok severim"), "kahve içmeyi çok severim");
    }

    #[test]
    fn test_tokenize_removes_turkish_stopwords() {
        let tokens = tokenize(&normalize_text("Bu bir test metni"));
        assert_eq!(tokens, vec!["test", "metni"]);
    }

    #[test]
    fn test_tokenize_removes_english_stopwords() {
        let tokens = tokenize(&normalize_text("This is a test"));
        assert_eq!(tokens, vec!["test"]);
    }

    #[test]
    fn test_tokenize_preserves_order() {
        let tokens = tokenize("gamma beta alpha");
        assert_eq!(tokens, vec!["gamma", "beta", "alpha"]);
    }

    #[test]
    fn test_tokenize_stopword_only_input_is_empty() {
        assert!(tokenize("the and is ve bir bu").is_empty());
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_is_stopword() {
        assert!(is_stopword("the"));
        assert!(is_stopword("için"));
        assert!(!is_stopword("kahve"));
    }
}
