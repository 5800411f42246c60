//! Database statistics.
//!
//! Summarizes what the configured collection holds: total records, a
//! per-source breakdown, and where the database lives on disk. Used by
//! `tourbot stats`.

use anyhow::Result;

use crate::config::Config;
use crate::store::{SqliteStore, VectorStore};

/// Snapshot of the configured collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionStats {
    pub collection: String,
    pub records: i64,
    pub by_source: Vec<(String, i64)>,
    pub db_size: u64,
}

pub async fn collect(config: &Config, store: &SqliteStore) -> Result<CollectionStats> {
    let records = store.count().await?;
    let by_source = store.count_by_source().await?;
    let db_size = std::fs::metadata(&config.db.path)
        .map(|m| m.len())
        .unwrap_or(0);

    Ok(CollectionStats {
        collection: store.collection().to_string(),
        records,
        by_source,
        db_size,
    })
}

/// Run the stats command: query the database and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let stats = collect(config, &store).await?;
    store.close().await;

    println!("tourbot: Database Stats");
    println!("=======================");
    println!();
    println!("  Database:    {}", config.db.path.display());
    println!("  Size:        {}", format_bytes(stats.db_size));
    println!("  Collection:  {}", stats.collection);
    println!("  Records:     {}", stats.records);

    if !stats.by_source.is_empty() {
        println!();
        println!("  By source:");
        println!("  {:<24} {:>8}", "SOURCE", "RECORDS");
        println!("  {}", "-".repeat(33));
        for (source, count) in &stats.by_source {
            println!("  {:<24} {:>8}", source, count);
        }
    }

    println!();
    Ok(())
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentChunk;
    use tempfile::TempDir;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[tokio::test]
    async fn test_collect_counts_sources() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::minimal();
        config.db.path = tmp.path().join("tourbot.sqlite");
        let store = SqliteStore::open(&config).await.unwrap();
        store
            .add(
                &[
                    DocumentChunk::new("a", "user_input"),
                    DocumentChunk::new("b", "user_input"),
                ],
                &[vec![1.0], vec![0.5]],
            )
            .await
            .unwrap();

        let stats = collect(&config, &store).await.unwrap();
        assert_eq!(stats.collection, "concert_tour_collection");
        assert_eq!(stats.records, 2);
        assert_eq!(stats.by_source, vec![("user_input".to_string(), 2)]);
    }
}
