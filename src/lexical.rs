//! Keyword scoring for hybrid retrieval.
//!
//! Complements cosine similarity with exact keyword matching over fact
//! text. The hybrid search weights the two scores against each other.

use crate::knowledge::FactRecord;
use crate::preprocess::is_stopword;

/// Extract match keywords from a query: lowercased words longer than two
/// characters, stopwords removed.
pub fn extract_keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .filter(|word| !is_stopword(word))
        .map(|word| word.to_string())
        .collect()
}

/// Fraction of keywords found in the fact's key and value text.
///
/// Substring containment, not token equality: "koş" matches "koşu".
pub fn keyword_score(fact: &FactRecord, keywords: &[String]) -> f32 {
    if keywords.is_empty() {
        return 0.0;
    }

    let fact_text = format!("{} {}", fact.key, fact.value).to_lowercase();
    let matches = keywords
        .iter()
        .filter(|keyword| fact_text.contains(keyword.as_str()))
        .count();

    matches as f32 / keywords.len() as f32
}
