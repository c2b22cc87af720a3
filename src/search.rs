//! Semantic retrieval over the knowledge store.
//!
//! [`VectorSearch`] embeds a query, scores it against every active fact's
//! stored embedding with cosine similarity, and returns the best matches.
//! Facts missing a valid embedding are backfilled on the fly (handed to the
//! store but not committed; durability belongs to the batch regenerator).
//! Query embeddings are cached with a TTL so repeated queries skip the
//! pipeline.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::SearchConfig;
use crate::embeddings::{EmbeddingError, EmbeddingProvider};
use crate::knowledge::{FactRecord, KnowledgeStore, StoreError};
use crate::lexical::{extract_keywords, keyword_score};
use crate::vector::cosine_similarity;

/// Default result limit for related-fact lookup
const RELATED_LIMIT: usize = 5;
/// Widened candidate-pool threshold used by the hybrid search before reranking
const HYBRID_POOL_THRESHOLD: f32 = 0.2;

/// Errors that can occur during retrieval.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("failed to fetch facts: {0}")]
    FetchFailed(StoreError),

    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("fact does not have an embedding")]
    MissingEmbedding,

    #[error("invalid search query")]
    InvalidQuery,
}

/// A fact paired with its retrieval scores.
#[derive(Clone, Debug)]
pub struct ScoredFact {
    pub fact: FactRecord,
    /// Cosine similarity against the query embedding
    pub semantic_score: f32,
    /// Keyword match fraction, 0.0 outside hybrid search
    pub keyword_score: f32,
    /// Hybrid score; equals `semantic_score` for pure semantic search
    pub final_score: f32,
}

impl ScoredFact {
    /// Final score as a display percentage.
    pub fn score_percentage(&self) -> u32 {
        (self.final_score * 100.0) as u32
    }
}

/// Cached query embedding with its creation time.
struct CachedQuery {
    embedding: Vec<f32>,
    created_at: Instant,
}

/// Retrieval service over the knowledge store.
///
/// Owns the embedding provider and a TTL-bounded query-embedding cache.
/// Interior mutability keeps the search API `&self`.
pub struct VectorSearch {
    provider: Box<dyn EmbeddingProvider>,
    config: SearchConfig,
    query_cache: Mutex<HashMap<String, CachedQuery>>,
}

impl VectorSearch {
    /// Create a retrieval service from a provider and a search config.
    ///
    /// Panics if the configuration is invalid.
    pub fn new(provider: Box<dyn EmbeddingProvider>, config: SearchConfig) -> Self {
        config.validate();
        Self {
            provider,
            config,
            query_cache: Mutex::new(HashMap::new()),
        }
    }

    /// The provider backing this service.
    pub fn provider(&self) -> &dyn EmbeddingProvider {
        self.provider.as_ref()
    }

    /// Find the facts most similar to a query.
    ///
    /// Facts without a valid embedding are embedded on the spot and handed
    /// to the store; a per-fact failure skips the fact. Results are sorted
    /// by similarity (highest first) and truncated.
    ///
    /// # Arguments
    /// * `query` - The search query text
    /// * `store` - The knowledge store holding the facts
    /// * `limit` - Maximum results (config default if None)
    /// * `min_similarity` - Minimum similarity score (config default if None)
    pub fn find_similar(
        &self,
        query: &str,
        store: &mut dyn KnowledgeStore,
        limit: Option<usize>,
        min_similarity: Option<f32>,
    ) -> Result<Vec<ScoredFact>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::InvalidQuery);
        }

        let query_embedding = self.query_embedding(query)?;

        let facts = store
            .fetch_active_facts()
            .map_err(SearchError::FetchFailed)?;

        let limit = limit.unwrap_or(self.config.default_limit);
        let min_similarity = min_similarity.unwrap_or(self.config.min_similarity);
        let dimensions = self.provider.dimensions();

        let mut scored: Vec<ScoredFact> = Vec::new();

        for mut fact in facts {
            if !fact.has_valid_embedding(dimensions) {
                match self.provider.embed(&fact.source_text()) {
                    Ok(embedding) => {
                        if let Err(err) = store.set_embedding(
                            fact.id,
                            embedding.clone(),
                            self.provider.model_tag(),
                        ) {
                            log::warn!("failed to store embedding for fact {}: {}", fact.id, err);
                            continue;
                        }
                        fact.set_embedding(embedding, self.provider.model_tag());
                    }
                    Err(err) => {
                        log::warn!("skipping fact {}: {}", fact.id, err);
                        continue;
                    }
                }
            }

            let Some(embedding) = fact.embedding.as_ref() else {
                continue;
            };
            let similarity = cosine_similarity(&query_embedding, embedding);

            if similarity >= min_similarity {
                scored.push(ScoredFact {
                    semantic_score: similarity,
                    keyword_score: 0.0,
                    final_score: similarity,
                    fact,
                });
            }
        }

        sort_by_score(&mut scored, |s| s.semantic_score);
        scored.truncate(limit);

        Ok(scored)
    }

    /// Hybrid search: semantic similarity blended with keyword matching.
    ///
    /// Runs a semantic pass over a widened candidate pool, then reranks
    /// with `semantic * weight + keyword * (1 - weight)` where the keyword
    /// score is the matched fraction of query keywords.
    pub fn find_similar_hybrid(
        &self,
        query: &str,
        store: &mut dyn KnowledgeStore,
        limit: Option<usize>,
    ) -> Result<Vec<ScoredFact>, SearchError> {
        let limit = limit.unwrap_or(self.config.default_limit);

        // Wider pool at a lower threshold; reranking decides the final cut.
        let mut scored =
            self.find_similar(query, store, Some(limit * 2), Some(HYBRID_POOL_THRESHOLD))?;

        let keywords = extract_keywords(query);
        let semantic_weight = self.config.semantic_weight;
        let keyword_weight = 1.0 - semantic_weight;

        for result in &mut scored {
            result.keyword_score = keyword_score(&result.fact, &keywords);
            result.final_score =
                result.semantic_score * semantic_weight + result.keyword_score * keyword_weight;
        }

        sort_by_score(&mut scored, |s| s.final_score);
        scored.truncate(limit);

        Ok(scored)
    }

    /// Find facts related to an existing fact.
    ///
    /// The anchor fact must already carry an embedding. Other active facts
    /// without one are skipped, not backfilled.
    pub fn find_related(
        &self,
        fact: &FactRecord,
        store: &dyn KnowledgeStore,
        limit: Option<usize>,
    ) -> Result<Vec<ScoredFact>, SearchError> {
        let anchor = fact
            .embedding
            .as_ref()
            .ok_or(SearchError::MissingEmbedding)?;

        let facts = store
            .fetch_active_facts()
            .map_err(SearchError::FetchFailed)?;

        let limit = limit.unwrap_or(RELATED_LIMIT);
        let threshold = self.config.related_threshold;

        let mut scored: Vec<ScoredFact> = Vec::new();

        for other in facts {
            if other.id == fact.id {
                continue;
            }
            let Some(embedding) = other.embedding.as_ref() else {
                continue;
            };
            let similarity = cosine_similarity(anchor, embedding);

            if similarity >= threshold {
                scored.push(ScoredFact {
                    semantic_score: similarity,
                    keyword_score: 0.0,
                    final_score: similarity,
                    fact: other,
                });
            }
        }

        sort_by_score(&mut scored, |s| s.semantic_score);
        scored.truncate(limit);

        Ok(scored)
    }

    /// Drop all cached query embeddings.
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.query_cache.lock() {
            cache.clear();
        }
    }

    /// Embed a query, serving repeats from the TTL cache.
    fn query_embedding(&self, query: &str) -> Result<Vec<f32>, EmbeddingError> {
        let ttl = Duration::from_secs(self.config.query_cache_ttl_secs);

        if let Ok(cache) = self.query_cache.lock() {
            if let Some(cached) = cache.get(query) {
                if cached.created_at.elapsed() < ttl {
                    return Ok(cached.embedding.clone());
                }
            }
        }

        let embedding = self.provider.embed(query)?;

        if let Ok(mut cache) = self.query_cache.lock() {
            cache.retain(|_, cached| cached.created_at.elapsed() < ttl);
            cache.insert(
                query.to_string(),
                CachedQuery {
                    embedding: embedding.clone(),
                    created_at: Instant::now(),
                },
            );
        }

        Ok(embedding)
    }
}

/// Sort scored facts descending by the given score.
fn sort_by_score(scored: &mut [ScoredFact], score: impl Fn(&ScoredFact) -> f32) {
    scored.sort_by(|a, b| {
        score(b)
            .partial_cmp(&score(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
