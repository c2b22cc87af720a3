//! Fact records and the knowledge-store seam.
//!
//! The store owning the records is an external collaborator; this crate
//! reads a fact's text fields and writes the derived embedding back through
//! the [`KnowledgeStore`] trait. [`MemoryStore`] is the bundled in-memory
//! backend, used by tests and by callers that keep facts in memory.

use serde::{Deserialize, Serialize};

/// Category labels for stored facts.
///
/// Serialized with the store's stable string form; [`label`](Self::label)
/// is the display text that gets embedded as part of the fact's source
/// text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FactCategory {
    PersonalInfo,
    Relationships,
    Lifestyle,
    Values,
    Fears,
    Goals,
    Preferences,
    Memories,
    Experiences,
    Challenges,
    Habits,
    Triggers,
    CurrentSituation,
    RecentEvents,
    Other,
}

impl FactCategory {
    /// Display label, embedded ahead of key and value.
    pub fn label(&self) -> &'static str {
        match self {
            FactCategory::PersonalInfo => "personal info",
            FactCategory::Relationships => "relationships",
            FactCategory::Lifestyle => "lifestyle",
            FactCategory::Values => "values",
            FactCategory::Fears => "fears",
            FactCategory::Goals => "goals",
            FactCategory::Preferences => "preferences",
            FactCategory::Memories => "memories",
            FactCategory::Experiences => "experiences",
            FactCategory::Challenges => "challenges",
            FactCategory::Habits => "habits",
            FactCategory::Triggers => "triggers",
            FactCategory::CurrentSituation => "current situation",
            FactCategory::RecentEvents => "recent events",
            FactCategory::Other => "other",
        }
    }
}

/// A stored unit of knowledge: a category, a key and a value.
///
/// Embeddings are derived data with no identity of their own; they are
/// created and overwritten by this crate and destroyed with the record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FactRecord {
    pub id: u64,
    pub category: FactCategory,
    pub key: String,
    pub value: String,
    pub is_active: bool,

    /// Derived embedding, absent until generated
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,

    /// Tag of the algorithm version that produced the embedding
    #[serde(default)]
    pub embedding_model: Option<String>,
}

impl FactRecord {
    pub fn new(id: u64, category: FactCategory, key: &str, value: &str) -> Self {
        Self {
            id,
            category,
            key: key.to_string(),
            value: value.to_string(),
            is_active: true,
            embedding: None,
            embedding_model: None,
        }
    }

    /// The text that gets embedded: category label, key and value,
    /// space-separated.
    pub fn source_text(&self) -> String {
        format!("{} {} {}", self.category.label(), self.key, self.value)
    }

    /// True when an embedding is present and has the expected dimension.
    pub fn has_valid_embedding(&self, expected_dimension: usize) -> bool {
        self.embedding
            .as_ref()
            .map(|embedding| embedding.len() == expected_dimension)
            .unwrap_or(false)
    }

    /// Overwrite the stored embedding and the tag of the model that
    /// produced it.
    pub fn set_embedding(&mut self, embedding: Vec<f32>, model_tag: &str) {
        self.embedding = Some(embedding);
        self.embedding_model = Some(model_tag.to_string());
    }
}

/// Errors raised by knowledge-store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to fetch facts from the store: {0}")]
    Fetch(anyhow::Error),

    #[error("failed to commit pending fact updates: {0}")]
    Commit(anyhow::Error),

    #[error("fact not found")]
    NotFound,
}

/// Seam to the external fact store.
///
/// Implementations are driven by one caller at a time; the batch
/// regenerator assumes a single writer and concurrent invocations must be
/// serialized by the caller.
pub trait KnowledgeStore: Send + Sync {
    /// Fetch every active fact, in the store's stable order.
    fn fetch_active_facts(&self) -> Result<Vec<FactRecord>, StoreError>;

    /// Write an embedding and its model tag onto the identified fact.
    ///
    /// The update may be buffered until [`commit`](Self::commit).
    fn set_embedding(
        &mut self,
        id: u64,
        embedding: Vec<f32>,
        model_tag: &str,
    ) -> Result<(), StoreError>;

    /// Persist all pending updates.
    fn commit(&mut self) -> Result<(), StoreError>;
}

/// In-memory knowledge store.
///
/// Facts keep their insertion order, which is also the fetch order.
/// Updates apply directly, so `commit` is a no-op.
#[derive(Debug, Default)]
pub struct MemoryStore {
    facts: Vec<FactRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fact: FactRecord) {
        self.facts.push(fact);
    }

    pub fn get(&self, id: u64) -> Option<&FactRecord> {
        self.facts.iter().find(|fact| fact.id == id)
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl KnowledgeStore for MemoryStore {
    fn fetch_active_facts(&self) -> Result<Vec<FactRecord>, StoreError> {
        Ok(self
            .facts
            .iter()
            .filter(|fact| fact.is_active)
            .cloned()
            .collect())
    }

    fn set_embedding(
        &mut self,
        id: u64,
        embedding: Vec<f32>,
        model_tag: &str,
    ) -> Result<(), StoreError> {
        let fact = self
            .facts
            .iter_mut()
            .find(|fact| fact.id == id)
            .ok_or(StoreError::NotFound)?;
        fact.set_embedding(embedding, model_tag);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
