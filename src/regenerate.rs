//! Batch (re)generation of fact embeddings.
//!
//! Drives the embedding pipeline across every active fact in a knowledge
//! store. Idempotent unless forced: facts already carrying a valid
//! embedding are skipped. A single fact's failure is logged and skipped;
//! only a failed fetch or a failed final commit aborts the call.

use crate::embeddings::{ensure_dimension, EmbeddingError, EmbeddingProvider};
use crate::knowledge::{KnowledgeStore, StoreError};

/// Errors that abort a batch regeneration call.
#[derive(Debug, thiserror::Error)]
pub enum RegenerateError {
    /// The store could not be read. Nothing was mutated.
    #[error("failed to fetch facts: {0}")]
    FetchFailed(StoreError),

    /// The final commit failed. `generated` embeddings were computed and
    /// handed to the store, but none are durably persisted.
    #[error("failed to commit after generating {generated} embeddings: {source}")]
    CommitFailed { generated: usize, source: StoreError },
}

/// Regenerate embeddings for every active fact in the store.
///
/// Facts that already carry a valid embedding (present, expected dimension)
/// are skipped unless `force_regenerate` is set. Each remaining fact's
/// source text runs through the provider; a per-fact failure is logged and
/// the batch continues with the next fact. One commit is issued after the
/// loop.
///
/// # Returns
/// The number of embeddings newly generated in this call.
pub fn regenerate_all_fact_embeddings(
    provider: &dyn EmbeddingProvider,
    store: &mut dyn KnowledgeStore,
    force_regenerate: bool,
) -> Result<usize, RegenerateError> {
    let facts = store
        .fetch_active_facts()
        .map_err(RegenerateError::FetchFailed)?;

    let dimensions = provider.dimensions();
    let mut generated = 0usize;

    for fact in &facts {
        if !force_regenerate && fact.has_valid_embedding(dimensions) {
            continue;
        }

        match embed_checked(provider, &fact.source_text(), dimensions) {
            Ok(embedding) => {
                if let Err(err) = store.set_embedding(fact.id, embedding, provider.model_tag()) {
                    log::warn!("failed to update embedding for fact {}: {}", fact.id, err);
                    continue;
                }
                generated += 1;
            }
            Err(err) => {
                log::warn!("failed to generate embedding for fact {}: {}", fact.id, err);
            }
        }
    }

    store
        .commit()
        .map_err(|source| RegenerateError::CommitFailed { generated, source })?;

    log::info!(
        "regenerated {} of {} active fact embeddings",
        generated,
        facts.len()
    );

    Ok(generated)
}

/// Run one text through the provider and validate the output dimension,
/// so a misbehaving provider is skipped per record rather than written.
fn embed_checked(
    provider: &dyn EmbeddingProvider,
    text: &str,
    dimensions: usize,
) -> Result<Vec<f32>, EmbeddingError> {
    let embedding = provider.embed(text)?;
    ensure_dimension(dimensions, &embedding)?;
    Ok(embedding)
}
