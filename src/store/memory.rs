//! Transient [`VectorStore`] held entirely in memory.
//!
//! Uses a `Vec` behind `std::sync::RwLock`. Search is brute-force cosine
//! similarity over all records.

use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{DocumentChunk, RetrievedChunk};

use super::{check_lengths, rank, VectorStore};

struct StoredRecord {
    id: String,
    chunk: DocumentChunk,
    vector: Vec<f32>,
}

#[derive(Default)]
pub struct InMemoryStore {
    records: RwLock<Vec<StoredRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("In-memory store lock poisoned")
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn add(&self, chunks: &[DocumentChunk], vectors: &[Vec<f32>]) -> Result<usize> {
        check_lengths(chunks, vectors)?;
        let mut records = self.records.write().map_err(poisoned)?;
        for (chunk, vector) in chunks.iter().zip(vectors) {
            records.push(StoredRecord {
                id: Uuid::new_v4().to_string(),
                chunk: chunk.clone(),
                vector: vector.clone(),
            });
        }
        Ok(chunks.len())
    }

    async fn similarity_search(
        &self,
        query_vec: &[f32],
        k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let records = self.records.read().map_err(poisoned)?;
        Ok(rank(
            query_vec,
            records.iter().map(|r| {
                (
                    RetrievedChunk {
                        id: r.id.clone(),
                        text: r.chunk.text.clone(),
                        source: r.chunk.source.clone(),
                        score: 0.0,
                    },
                    r.vector.clone(),
                )
            }),
            k,
        ))
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.records.read().map_err(poisoned)?.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_store_search() {
        let store = InMemoryStore::new();
        assert!(store.similarity_search(&[1.0, 0.0], 5).await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_and_search() {
        let store = InMemoryStore::new();
        let chunks = vec![
            DocumentChunk::new("east", "web_search"),
            DocumentChunk::new("north", "web_search"),
        ];
        let written = store
            .add(&chunks, &[vec![1.0, 0.0], vec![0.0, 1.0]])
            .await
            .unwrap();
        assert_eq!(written, 2);

        let hits = store.similarity_search(&[0.1, 1.0], 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "north");
        assert_eq!(hits[0].source, "web_search");
    }

    #[tokio::test]
    async fn test_append_only_keeps_duplicates() {
        let store = InMemoryStore::new();
        let chunks = vec![DocumentChunk::new("same", "user_input")];
        store.add(&chunks, &[vec![1.0]]).await.unwrap();
        store.add(&chunks, &[vec![1.0]]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_mismatched_lengths_rejected() {
        let store = InMemoryStore::new();
        let chunks = vec![DocumentChunk::new("a", "user_input")];
        assert!(store.add(&chunks, &[]).await.is_err());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
