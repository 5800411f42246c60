//! Persisted [`VectorStore`] backed by a SQLite table.
//!
//! Every record belongs to a named collection; one database file can hold
//! several. Embeddings are stored as little-endian `f32` BLOBs next to their
//! dimensionality; a search only scores records whose dimensionality matches
//! the query vector. Inserts of one [`add`](VectorStore::add) call share a
//! transaction, so a failed ingestion leaves no partial records behind.

use anyhow::{bail, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::config::Config;
use crate::db;
use crate::embedding::{blob_to_vec, vec_to_blob};
use crate::migrate;
use crate::models::{DocumentChunk, RetrievedChunk};

use super::{check_lengths, rank, VectorStore};

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    collection: String,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool, collection: impl Into<String>) -> Self {
        Self {
            pool,
            collection: collection.into(),
        }
    }

    /// Connect to the configured database, ensure the schema exists, and
    /// bind to the configured collection.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply(&pool).await?;
        Ok(Self::new(pool, config.db.collection.clone()))
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Record counts per source tag, largest first.
    pub async fn count_by_source(&self) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT source, COUNT(*) AS n
            FROM records
            WHERE collection = ?
            GROUP BY source
            ORDER BY n DESC, source ASC
            "#,
        )
        .bind(&self.collection)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| (row.get::<String, _>("source"), row.get::<i64, _>("n")))
            .collect())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn add(&self, chunks: &[DocumentChunk], vectors: &[Vec<f32>]) -> Result<usize> {
        check_lengths(chunks, vectors)?;
        if let Some(dims) = vectors.first().map(Vec::len) {
            if vectors.iter().any(|v| v.len() != dims) {
                bail!("Embedding batch has mixed dimensionality");
            }
        }

        let mut tx = self.pool.begin().await?;
        for (chunk, vector) in chunks.iter().zip(vectors) {
            sqlx::query(
                "INSERT INTO records (id, collection, text, source, embedding, dims) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&self.collection)
            .bind(&chunk.text)
            .bind(&chunk.source)
            .bind(vec_to_blob(vector))
            .bind(vector.len() as i64)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(chunks.len())
    }

    async fn similarity_search(
        &self,
        query_vec: &[f32],
        k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let dims = query_vec.len() as i64;
        let rows = sqlx::query(
            r#"
            SELECT id, text, source, embedding
            FROM records
            WHERE collection = ? AND dims = ?
            ORDER BY rowid ASC
            "#,
        )
        .bind(&self.collection)
        .bind(dims)
        .fetch_all(&self.pool)
        .await?;

        let skipped: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM records WHERE collection = ? AND dims != ?")
                .bind(&self.collection)
                .bind(dims)
                .fetch_one(&self.pool)
                .await?;
        if skipped > 0 {
            tracing::warn!(
                skipped,
                dims,
                collection = %self.collection,
                "records with a different embedding size were ignored"
            );
        }

        let candidates: Vec<(RetrievedChunk, Vec<f32>)> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                (
                    RetrievedChunk {
                        id: row.get("id"),
                        text: row.get("text"),
                        source: row.get("source"),
                        score: 0.0,
                    },
                    blob_to_vec(&blob),
                )
            })
            .collect();

        Ok(rank(query_vec, candidates, k))
    }

    async fn count(&self) -> Result<i64> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records WHERE collection = ?")
            .bind(&self.collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}
