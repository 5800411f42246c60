//! # tourbot
//!
//! A retrieval-augmented assistant for concert-tour information.
//!
//! Users share documents about tours and ask questions about them. Documents
//! pass a topic gate, are summarized by an LLM, chunked, embedded, and
//! appended to a SQLite-backed vector collection. Questions are embedded,
//! matched against the collection, and answered by the LLM from the
//! retrieved chunks only. A second mode answers questions about an artist
//! from live web-search snippets indexed into a throwaway in-memory store.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────────────────┐   ┌──────────────┐
//! │   CLI    │──▶│       Pipeline        │──▶│ SqliteStore  │
//! │ respond  │   │ classify/ingest/answer│   │ (persisted)  │
//! └──────────┘   └──────────┬───────────┘   └──────────────┘
//!                           │
//!          ┌────────────────┼──────────────────┐
//!          ▼                ▼                  ▼
//!   ┌─────────────┐  ┌─────────────┐   ┌───────────────┐
//!   │ Completion  │  │  Embedding  │   │  Web search   │
//!   │  provider   │  │  provider   │   │ + InMemory    │
//!   └─────────────┘  └─────────────┘   └───────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Chunks, labels, modes |
//! | [`chunk`] | Recursive character splitter |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`llm`] | Chat completion provider abstraction |
//! | [`web_search`] | Web search provider abstraction |
//! | [`store`] | Vector stores (SQLite and in-memory) |
//! | [`prompts`] | Prompts for the three LLM call sites |
//! | [`pipeline`] | Classification, ingestion, retrieval, answers |
//! | [`respond`] | Front-end dispatch and user-visible replies |
//! | [`replay`] | Batch evaluation from a sample-data file |
//! | [`stats`] | Collection statistics |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |

pub mod chunk;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod http;
pub mod llm;
pub mod migrate;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod replay;
pub mod respond;
pub mod stats;
pub mod store;
pub mod web_search;
