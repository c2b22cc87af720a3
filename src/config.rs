//! Engine configuration.
//!
//! Dimension, model tag and retrieval thresholds are explicit,
//! serde-loadable values rather than process-wide state. Constructors
//! validate their config up front.

use crate::{DEFAULT_DIMENSION, DEFAULT_MODEL_TAG, DEFAULT_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Default result limit for similarity search
const DEFAULT_SEARCH_LIMIT: usize = 15;
/// Default similarity threshold for related-fact lookup
const DEFAULT_RELATED_THRESHOLD: f32 = 0.4;
/// Default semantic share of the hybrid score
const DEFAULT_SEMANTIC_WEIGHT: f32 = 0.6;
/// Default query-embedding cache lifetime (30 minutes)
const DEFAULT_QUERY_CACHE_TTL_SECS: u64 = 1800;

/// Configuration for embedding generation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Output vector dimension
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Version tag written alongside generated embeddings
    #[serde(default = "default_model_tag")]
    pub model_tag: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: DEFAULT_DIMENSION,
            model_tag: DEFAULT_MODEL_TAG.to_string(),
        }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) {
        if self.dimension == 0 {
            panic!("embedding dimension must be non-zero");
        }
        if self.model_tag.is_empty() {
            panic!("model_tag must not be empty");
        }
    }
}

fn default_dimension() -> usize {
    DEFAULT_DIMENSION
}

fn default_model_tag() -> String {
    DEFAULT_MODEL_TAG.to_string()
}

/// Configuration for the retrieval service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum results returned when the caller passes no limit
    #[serde(default = "default_search_limit")]
    pub default_limit: usize,

    /// Minimum similarity score [0.0, 1.0] for semantic search
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,

    /// Minimum similarity score [0.0, 1.0] for related-fact lookup
    #[serde(default = "default_related_threshold")]
    pub related_threshold: f32,

    /// Semantic share of the hybrid score [0.0, 1.0]; keyword share is the rest
    #[serde(default = "default_semantic_weight")]
    pub semantic_weight: f32,

    /// Query-embedding cache lifetime in seconds
    #[serde(default = "default_query_cache_ttl_secs")]
    pub query_cache_ttl_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_SEARCH_LIMIT,
            min_similarity: DEFAULT_THRESHOLD,
            related_threshold: DEFAULT_RELATED_THRESHOLD,
            semantic_weight: DEFAULT_SEMANTIC_WEIGHT,
            query_cache_ttl_secs: DEFAULT_QUERY_CACHE_TTL_SECS,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) {
        if self.default_limit == 0 {
            panic!("default_limit must be non-zero");
        }
        for (name, value) in [
            ("min_similarity", self.min_similarity),
            ("related_threshold", self.related_threshold),
            ("semantic_weight", self.semantic_weight),
        ] {
            if !(0.0..=1.0).contains(&value) {
                panic!("{} must be between 0.0 and 1.0, got {}", name, value);
            }
        }
    }
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

fn default_min_similarity() -> f32 {
    DEFAULT_THRESHOLD
}

fn default_related_threshold() -> f32 {
    DEFAULT_RELATED_THRESHOLD
}

fn default_semantic_weight() -> f32 {
    DEFAULT_SEMANTIC_WEIGHT
}

fn default_query_cache_ttl_secs() -> u64 {
    DEFAULT_QUERY_CACHE_TTL_SECS
}
