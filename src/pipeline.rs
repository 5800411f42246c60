//! Classification, ingestion, retrieval, and answer generation.
//!
//! A [`Pipeline`] owns the embedding and completion providers plus the
//! chunker. Stores and the web search provider are passed in per call, so
//! the same pipeline can serve the persisted collection and any number of
//! transient web-search stores.
//!
//! # Flows
//!
//! ```text
//! ingest:     relevance gate → summarize (LLM) → chunk → embed → append
//! question:   embed query → k nearest → answer (LLM)
//! web search: search → snippets → chunk → embed into fresh store
//!             → nearest to artist → answer (LLM)
//! ```
//!
//! Provider failures propagate as `anyhow::Error`, except inside the
//! search/index/retrieve stage of [`Pipeline::web_answer`], where they are
//! logged and reported as [`WebAnswer::NoInformation`].

use std::fmt;
use std::sync::Arc;

use anyhow::Result;

use crate::chunk::RecursiveSplitter;
use crate::config::{Config, LlmConfig, RetrievalConfig, WebSearchConfig};
use crate::embedding::{self, EmbeddingProvider};
use crate::llm::{ChatCompletionsProvider, CompletionProvider, CompletionRequest};
use crate::models::{DocumentChunk, Label, RetrievedChunk, SOURCE_USER_INPUT, SOURCE_WEB_SEARCH};
use crate::prompts;
use crate::store::{InMemoryStore, VectorStore};
use crate::web_search::{self, SearchQuery, WebSearchProvider};

/// Case-insensitive substrings, any one of which admits a document.
pub const RELEVANCE_KEYWORDS: [&str; 12] = [
    "concert",
    "tour",
    "venue",
    "performer",
    "schedule",
    "logistics",
    "artist",
    "band",
    "event",
    "performance",
    "dates",
    "location",
];

pub const REFUSAL: &str = "Sorry, I cannot ingest documents with other themes.";
pub const NO_DOCUMENTS: &str = "No relevant documents found.";
pub const NO_WEB_INFORMATION: &str = "No relevant information found for the given artist.";

/// Whether `text` looks like concert-tour material.
pub fn is_relevant(text: &str) -> bool {
    let lower = text.to_lowercase();
    RELEVANCE_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Map a classifier completion onto a label. `"document"` wins over
/// `"question"` when both appear.
pub fn parse_label(completion: &str) -> Label {
    let lower = completion.to_lowercase();
    if lower.contains("document") {
        Label::Document
    } else if lower.contains("question") {
        Label::Question
    } else {
        Label::Unknown
    }
}

/// The question asked of the web-search context for `artist`.
pub fn web_question(artist: &str) -> String {
    format!("Show me details about the {} upcoming concerts.", artist)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Failed the relevance gate; nothing was summarized or stored.
    Rejected,
    Added { summary: String, chunks: usize },
}

impl fmt::Display for IngestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestOutcome::Rejected => f.write_str(REFUSAL),
            IngestOutcome::Added { summary, .. } => write!(
                f,
                "Thank you for sharing! Your document has been successfully added to the database. \
                 Here is a brief summary of the data from the document:\n{}",
                summary
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreAnswer {
    Answer(String),
    /// Retrieval came back empty; the LLM was not called.
    NoDocuments,
}

impl fmt::Display for StoreAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreAnswer::Answer(text) => f.write_str(text),
            StoreAnswer::NoDocuments => f.write_str(NO_DOCUMENTS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebAnswer {
    Answer(String),
    NoInformation,
}

impl fmt::Display for WebAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebAnswer::Answer(text) => f.write_str(text),
            WebAnswer::NoInformation => f.write_str(NO_WEB_INFORMATION),
        }
    }
}

pub struct Pipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn CompletionProvider>,
    splitter: RecursiveSplitter,
    llm_config: LlmConfig,
    retrieval: RetrievalConfig,
    web_search: WebSearchConfig,
    embed_batch_size: usize,
}

impl Pipeline {
    /// Build a pipeline around caller-supplied providers.
    pub fn new(
        config: &Config,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            embedder,
            llm,
            splitter: RecursiveSplitter::from_config(&config.chunking),
            llm_config: config.llm.clone(),
            retrieval: config.retrieval.clone(),
            web_search: config.web_search.clone(),
            embed_batch_size: config.embedding.batch_size,
        }
    }

    /// Build a pipeline with the providers named in `config`.
    ///
    /// # Errors
    ///
    /// Fails when a required API key is missing or the embedding provider
    /// cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self> {
        let embedder = embedding::create_provider(&config.embedding)?;
        let llm: Arc<dyn CompletionProvider> =
            Arc::new(ChatCompletionsProvider::new(&config.llm)?);
        Ok(Self::new(config, embedder, llm))
    }

    /// Label raw input with a single LLM call.
    pub async fn classify(&self, text: &str) -> Result<Label> {
        let request = CompletionRequest::new(prompts::classify(text), &self.llm_config.classify);
        let completion = self.llm.complete(&request).await?;
        let label = parse_label(&completion.text());
        tracing::info!(%label, "classified input");
        Ok(label)
    }

    /// Summarize `text`, chunk the summary, and append it to `store`.
    pub async fn ingest(&self, text: &str, store: &dyn VectorStore) -> Result<IngestOutcome> {
        if !is_relevant(text) {
            tracing::info!("document rejected by relevance gate");
            return Ok(IngestOutcome::Rejected);
        }

        let summary = self.summarize(text).await?;
        let chunks: Vec<DocumentChunk> = self
            .splitter
            .split_text(&summary)
            .into_iter()
            .map(|t| DocumentChunk::new(t, SOURCE_USER_INPUT))
            .collect();

        let written = self.index(&chunks, store).await?;
        tracing::info!(chunks = written, "document ingested");

        Ok(IngestOutcome::Added {
            summary,
            chunks: written,
        })
    }

    async fn summarize(&self, text: &str) -> Result<String> {
        let request = CompletionRequest::new(prompts::summarize(text), &self.llm_config.summarize);
        Ok(self.llm.complete(&request).await?.text())
    }

    async fn index(&self, chunks: &[DocumentChunk], store: &dyn VectorStore) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors =
            embedding::embed_in_batches(self.embedder.as_ref(), &texts, self.embed_batch_size)
                .await?;
        store.add(chunks, &vectors).await
    }

    /// The `k` stored chunks most similar to `query`.
    pub async fn retrieve(
        &self,
        query: &str,
        store: &dyn VectorStore,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>> {
        let query_vec = embedding::embed_query(self.embedder.as_ref(), query).await?;
        let docs = store.similarity_search(&query_vec, k).await?;
        tracing::debug!(k, found = docs.len(), "retrieved chunks");
        Ok(docs)
    }

    /// Answer `question` from `docs` only.
    pub async fn answer(&self, docs: &[RetrievedChunk], question: &str) -> Result<String> {
        let request = CompletionRequest::new(prompts::answer(docs, question), &self.llm_config.answer);
        Ok(self.llm.complete(&request).await?.text())
    }

    /// Retrieve with the configured `k` and answer, skipping the LLM when
    /// nothing was found.
    pub async fn answer_from_store(
        &self,
        question: &str,
        store: &dyn VectorStore,
    ) -> Result<StoreAnswer> {
        let docs = self.retrieve(question, store, self.retrieval.k).await?;
        if docs.is_empty() {
            return Ok(StoreAnswer::NoDocuments);
        }
        Ok(StoreAnswer::Answer(self.answer(&docs, question).await?))
    }

    /// Answer a question about `artist`'s upcoming concerts from live search
    /// results.
    pub async fn web_answer(
        &self,
        search: &dyn WebSearchProvider,
        artist: &str,
    ) -> Result<WebAnswer> {
        let docs = match self.web_context(search, artist).await {
            Ok(Some(docs)) => docs,
            Ok(None) => return Ok(WebAnswer::NoInformation),
            Err(e) => {
                tracing::error!(error = %e, artist, "web search failed");
                return Ok(WebAnswer::NoInformation);
            }
        };

        let answer = self.answer(&docs, &web_question(artist)).await?;
        Ok(WebAnswer::Answer(answer))
    }

    /// Search, index snippets into a fresh transient store, and retrieve.
    /// `None` means there was nothing to answer from.
    async fn web_context(
        &self,
        search: &dyn WebSearchProvider,
        artist: &str,
    ) -> Result<Option<Vec<RetrievedChunk>>> {
        let hits = search
            .search(&SearchQuery::upcoming_concerts(artist, &self.web_search))
            .await?;
        if hits.is_empty() {
            tracing::warn!(artist, "no search results found");
            return Ok(None);
        }
        for hit in &hits {
            tracing::debug!(title = ?hit.title, link = ?hit.link, "search result");
        }

        let snippets = web_search::snippets(&hits);
        if snippets.is_empty() {
            tracing::warn!(artist, results = hits.len(), "no snippets in search results");
            return Ok(None);
        }

        let chunks: Vec<DocumentChunk> = self
            .splitter
            .split_text(&snippets.join(" "))
            .into_iter()
            .map(|t| DocumentChunk::new(t, SOURCE_WEB_SEARCH))
            .collect();
        if chunks.is_empty() {
            tracing::warn!(artist, "no chunks created from snippets");
            return Ok(None);
        }

        let store = InMemoryStore::new();
        self.index(&chunks, &store).await?;

        let docs = self.retrieve(artist, &store, self.retrieval.web_k).await?;
        if docs.is_empty() {
            tracing::warn!(artist, "no relevant chunks retrieved");
            return Ok(None);
        }
        Ok(Some(docs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relevance_gate() {
        assert!(is_relevant("The band plays Wembley"));
        assert!(is_relevant("CONCERT announced"));
        assert!(is_relevant("new tour dates"));
        assert!(!is_relevant("Quarterly earnings report for a software company."));
    }

    #[test]
    fn test_parse_label() {
        assert_eq!(parse_label("document"), Label::Document);
        assert_eq!(parse_label("  Question\n"), Label::Question);
        assert_eq!(parse_label("This is a document, not a question"), Label::Document);
        assert_eq!(parse_label("I am not sure"), Label::Unknown);
        assert_eq!(parse_label(""), Label::Unknown);
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(IngestOutcome::Rejected.to_string(), REFUSAL);
        let added = IngestOutcome::Added {
            summary: "- Performer(s): Taylor Swift".to_string(),
            chunks: 1,
        };
        assert_eq!(
            added.to_string(),
            "Thank you for sharing! Your document has been successfully added to the database. \
             Here is a brief summary of the data from the document:\n- Performer(s): Taylor Swift"
        );
        assert_eq!(StoreAnswer::NoDocuments.to_string(), NO_DOCUMENTS);
        assert_eq!(WebAnswer::NoInformation.to_string(), NO_WEB_INFORMATION);
    }

    #[test]
    fn test_web_question() {
        assert_eq!(
            web_question("Taylor Swift"),
            "Show me details about the Taylor Swift upcoming concerts."
        );
    }
}
