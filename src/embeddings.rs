//! Deterministic hash-based embedding generation.
//!
//! Maps token sequences into fixed-dimension vectors via feature hashing
//! with positional decay. This is a cheap, fully deterministic fallback
//! representation for local ranking; the [`EmbeddingProvider`] trait is the
//! seam where a higher-quality remote provider would slot in without
//! touching the batch or search code.

use crate::config::EmbeddingConfig;
use crate::preprocess::{normalize_text, tokenize};
use crate::vector::l2_normalize;

/// Error type for embedding operations.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding generation failed: {0}")]
    GenerationFailed(String),

    #[error("invalid embedding dimension: expected {expected}, got {got}")]
    InvalidDimension { expected: usize, got: usize },
}

/// Abstract interface for generating embeddings from text.
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text.
    ///
    /// The local hash pipeline cannot fail; the `Result` exists so a future
    /// remote provider can report failures without changing any caller.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Generate embeddings for multiple texts, in input order.
    ///
    /// All-or-nothing: the first failing text aborts the whole call. The
    /// fact-store batch in [`crate::regenerate`] isolates failures per
    /// record instead.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// Fixed output dimension of this provider.
    fn dimensions(&self) -> usize;

    /// Version tag written alongside every generated embedding, so stale
    /// algorithm versions can be told apart from missing embeddings.
    fn model_tag(&self) -> &str;
}

/// Deterministic feature-hashing embedder.
///
/// Each token is hashed into one of `dimension` buckets and contributes a
/// position-decayed weight to it. Collisions between distinct tokens are a
/// property of feature hashing and are not corrected. Non-empty output is
/// L2-normalized; text with no surviving tokens yields the zero vector.
#[derive(Clone, Debug)]
pub struct HashEmbedder {
    config: EmbeddingConfig,
}

impl HashEmbedder {
    /// Create an embedder from an explicit configuration.
    ///
    /// Panics if the configuration is invalid (zero dimension).
    pub fn new(config: EmbeddingConfig) -> Self {
        config.validate();
        Self { config }
    }

    /// Hash a token into a bucket index using FNV-1a 64.
    ///
    /// Pinned to a specific algorithm so embeddings reproduce across runs
    /// and processes; the std hasher is seeded per process and would break
    /// determinism.
    fn bucket(token: &str, dimension: usize) -> usize {
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in token.as_bytes() {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(0x100000001b3);
        }
        (hash % dimension as u64) as usize
    }

    /// Accumulate position-weighted bucket sums for a token sequence.
    ///
    /// The token at zero-based position `i` contributes `1 / (i + 1)` to
    /// its bucket, biasing the representation toward earlier words. Any
    /// change to this formula must ship under a new model tag.
    fn accumulate(&self, tokens: &[String]) -> Vec<f32> {
        let mut accumulator = vec![0.0f32; self.config.dimension];
        for (i, token) in tokens.iter().enumerate() {
            let bucket = Self::bucket(token, self.config.dimension);
            accumulator[bucket] += 1.0 / (i as f32 + 1.0);
        }
        accumulator
    }
}

impl EmbeddingProvider for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let normalized = normalize_text(text);
        let tokens = tokenize(&normalized);
        Ok(l2_normalize(self.accumulate(&tokens)))
    }

    fn dimensions(&self) -> usize {
        self.config.dimension
    }

    fn model_tag(&self) -> &str {
        &self.config.model_tag
    }
}

/// Validate that a provider-produced vector has the expected dimension.
pub fn ensure_dimension(expected: usize, vector: &[f32]) -> Result<(), EmbeddingError> {
    if vector.len() != expected {
        return Err(EmbeddingError::InvalidDimension {
            expected,
            got: vector.len(),
        });
    }
    Ok(())
}
