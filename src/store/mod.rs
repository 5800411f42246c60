//! Vector store abstraction.
//!
//! The [`VectorStore`] trait is the pipeline's only view of storage. Two
//! backings exist:
//!
//! | Backing | Lifetime | Used for |
//! |---------|----------|----------|
//! | [`SqliteStore`] | persisted collection in a SQLite file | ingested documents |
//! | [`InMemoryStore`] | dropped with the value | one web search |
//!
//! Both are append-only. Similarity is cosine similarity computed in Rust
//! over every record of the collection; ties keep insertion order.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::embedding::cosine_similarity;
use crate::models::{DocumentChunk, RetrievedChunk};

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Append `chunks` with their `vectors` (same length, same order).
    ///
    /// Returns the number of records written. All records of one call are
    /// written together or not at all.
    async fn add(&self, chunks: &[DocumentChunk], vectors: &[Vec<f32>]) -> Result<usize>;

    /// Up to `k` records nearest to `query_vec`, most similar first.
    /// An empty store yields an empty result.
    async fn similarity_search(&self, query_vec: &[f32], k: usize)
        -> Result<Vec<RetrievedChunk>>;

    /// Number of records in the store.
    async fn count(&self) -> Result<i64>;
}

fn check_lengths(chunks: &[DocumentChunk], vectors: &[Vec<f32>]) -> Result<()> {
    if chunks.len() != vectors.len() {
        bail!(
            "Chunk/vector count mismatch: {} chunks, {} vectors",
            chunks.len(),
            vectors.len()
        );
    }
    Ok(())
}

/// Score every candidate against `query_vec` and keep the best `k`.
///
/// `candidates` must be in insertion order; the stable sort keeps it for
/// equal scores.
fn rank<I>(query_vec: &[f32], candidates: I, k: usize) -> Vec<RetrievedChunk>
where
    I: IntoIterator<Item = (RetrievedChunk, Vec<f32>)>,
{
    let mut scored: Vec<RetrievedChunk> = candidates
        .into_iter()
        .map(|(mut chunk, vector)| {
            chunk.score = cosine_similarity(query_vec, &vector);
            chunk
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, vector: Vec<f32>) -> (RetrievedChunk, Vec<f32>) {
        (
            RetrievedChunk {
                id: id.to_string(),
                text: id.to_string(),
                source: "user_input".to_string(),
                score: 0.0,
            },
            vector,
        )
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        let ranked = rank(
            &[1.0, 0.0],
            vec![
                candidate("far", vec![0.0, 1.0]),
                candidate("near", vec![1.0, 0.1]),
                candidate("mid", vec![1.0, 1.0]),
            ],
            2,
        );
        let ids: Vec<&str> = ranked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid"]);
    }

    #[test]
    fn test_rank_ties_keep_insertion_order() {
        let ranked = rank(
            &[1.0, 0.0],
            vec![
                candidate("a", vec![2.0, 0.0]),
                candidate("b", vec![1.0, 0.0]),
                candidate("c", vec![3.0, 0.0]),
            ],
            3,
        );
        let ids: Vec<&str> = ranked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_check_lengths() {
        let chunks = vec![DocumentChunk::new("x", "user_input")];
        assert!(check_lengths(&chunks, &[vec![1.0]]).is_ok());
        assert!(check_lengths(&chunks, &[]).is_err());
    }
}
