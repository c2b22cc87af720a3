//! Cross-module integration tests.
//!
//! Unit tests live beside the code they cover; the files here exercise the
//! embedding pipeline, the batch regenerator and the retrieval service
//! together, with test doubles standing in for the store and provider.


use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::EmbeddingConfig;
use crate::embeddings::{EmbeddingError, EmbeddingProvider, HashEmbedder};
use crate::knowledge::{FactCategory, FactRecord, KnowledgeStore, MemoryStore, StoreError};

/// Stock embedder with the default 128-dimension config.
pub fn default_embedder() -> HashEmbedder {
    HashEmbedder::new(EmbeddingConfig::default())
}

/// A small store of distinct facts with no embeddings set.
pub fn seed_store(count: u64) -> MemoryStore {
    let mut store = MemoryStore::new();
    for id in 0..count {
        store.insert(FactRecord::new(
            id,
            FactCategory::Other,
            &format!("key_{}", id),
            &format!("value number {}", id),
        ));
    }
    store
}

/// Provider that fails for any text containing the marker.
pub struct FailingProvider {
    inner: HashEmbedder,
    fail_marker: String,
}

impl FailingProvider {
    pub fn new(fail_marker: &str) -> Self {
        Self {
            inner: default_embedder(),
            fail_marker: fail_marker.to_string(),
        }
    }
}

impl EmbeddingProvider for FailingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.contains(&self.fail_marker) {
            return Err(EmbeddingError::GenerationFailed("injected failure".into()));
        }
        self.inner.embed(text)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn model_tag(&self) -> &str {
        self.inner.model_tag()
    }
}

/// Provider that claims 128 dimensions but produces 129-length vectors.
pub struct WrongDimensionProvider {
    inner: HashEmbedder,
}

impl WrongDimensionProvider {
    pub fn new() -> Self {
        Self {
            inner: default_embedder(),
        }
    }
}

impl EmbeddingProvider for WrongDimensionProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut embedding = self.inner.embed(text)?;
        embedding.push(0.0);
        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn model_tag(&self) -> &str {
        self.inner.model_tag()
    }
}

/// Provider wrapper counting every `embed` call.
pub struct CountingProvider {
    inner: HashEmbedder,
    calls: Arc<AtomicUsize>,
}

impl CountingProvider {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner: default_embedder(),
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl EmbeddingProvider for CountingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed(text)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn model_tag(&self) -> &str {
        self.inner.model_tag()
    }
}

/// Store whose fetch always fails. Any mutation is a test failure.
pub struct FailingFetchStore;

impl KnowledgeStore for FailingFetchStore {
    fn fetch_active_facts(&self) -> Result<Vec<FactRecord>, StoreError> {
        Err(StoreError::Fetch(anyhow::anyhow!("database unavailable")))
    }

    fn set_embedding(
        &mut self,
        _id: u64,
        _embedding: Vec<f32>,
        _model_tag: &str,
    ) -> Result<(), StoreError> {
        panic!("store mutated after failed fetch");
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        panic!("store committed after failed fetch");
    }
}

/// Store that accepts updates but refuses to commit them.
pub struct FailingCommitStore {
    pub inner: MemoryStore,
}

impl KnowledgeStore for FailingCommitStore {
    fn fetch_active_facts(&self) -> Result<Vec<FactRecord>, StoreError> {
        self.inner.fetch_active_facts()
    }

    fn set_embedding(
        &mut self,
        id: u64,
        embedding: Vec<f32>,
        model_tag: &str,
    ) -> Result<(), StoreError> {
        self.inner.set_embedding(id, embedding, model_tag)
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        Err(StoreError::Commit(anyhow::anyhow!("disk full")))
    }
}
