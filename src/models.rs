//! Core data models used throughout tourbot.
//!
//! These types represent the chunks, stored records, and labels that flow
//! through the ingestion and retrieval pipeline.

use std::fmt;
use std::str::FromStr;

/// Source tag attached to chunks ingested from user input.
pub const SOURCE_USER_INPUT: &str = "user_input";

/// Source tag attached to chunks built from web-search snippets.
pub const SOURCE_WEB_SEARCH: &str = "web_search";

/// A substring of an ingested text plus its source tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentChunk {
    pub text: String,
    pub source: String,
}

impl DocumentChunk {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
        }
    }
}

/// A chunk returned by a similarity search, nearest first.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub id: String,
    pub text: String,
    pub source: String,
    /// Cosine similarity to the query vector.
    pub score: f32,
}

/// Result of classifying a raw submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Document,
    Question,
    Unknown,
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Label::Document => "document",
            Label::Question => "question",
            Label::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Front-end mode selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Classify, then ingest or answer from the persisted store.
    #[default]
    Core,
    /// Answer from a live web search for an artist.
    WebSearch,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "core" => Ok(Mode::Core),
            "web-search" | "web" => Ok(Mode::WebSearch),
            other => anyhow::bail!("Unknown mode: '{}'. Use core or web-search.", other),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Core => f.write_str("core"),
            Mode::WebSearch => f.write_str("web-search"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("core".parse::<Mode>().unwrap(), Mode::Core);
        assert_eq!("web-search".parse::<Mode>().unwrap(), Mode::WebSearch);
        assert_eq!("web".parse::<Mode>().unwrap(), Mode::WebSearch);
        assert!("Core RAG".parse::<Mode>().is_err());
    }

    #[test]
    fn test_label_display() {
        assert_eq!(Label::Document.to_string(), "document");
        assert_eq!(Label::Unknown.to_string(), "unknown");
    }
}
