//! Front-end dispatch: one raw submission in, one user-visible reply out.
//!
//! Core mode classifies the input and either ingests it or answers it from
//! the persisted store. Web-search mode treats the whole input as an artist
//! name.

use std::fmt;

use anyhow::Result;

use crate::models::{Label, Mode};
use crate::pipeline::{IngestOutcome, Pipeline, StoreAnswer, WebAnswer};
use crate::store::VectorStore;
use crate::web_search::WebSearchProvider;

pub const EMPTY_INPUT: &str = "Please enter a valid query.";
pub const UNCLASSIFIED: &str = "Unable to classify the input. Please try again.";
pub const EMPTY_DOCUMENT: &str = "Please provide the document content to add.";

/// Canonical request wording that precedes a document to ingest.
pub const DOCUMENT_PREAMBLE: &str = "Please, add this document to your database:";

/// What a submission is answered against.
#[derive(Clone, Copy)]
pub enum Target<'a> {
    Store(&'a dyn VectorStore),
    Web(&'a dyn WebSearchProvider),
}

impl Target<'_> {
    pub fn mode(&self) -> Mode {
        match self {
            Target::Store(_) => Mode::Core,
            Target::Web(_) => Mode::WebSearch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    EmptyInput,
    EmptyDocument,
    Unclassified,
    Ingested(IngestOutcome),
    Answered(StoreAnswer),
    Web(WebAnswer),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::EmptyInput => f.write_str(EMPTY_INPUT),
            Reply::EmptyDocument => f.write_str(EMPTY_DOCUMENT),
            Reply::Unclassified => f.write_str(UNCLASSIFIED),
            Reply::Ingested(outcome) => fmt::Display::fmt(outcome, f),
            Reply::Answered(answer) => fmt::Display::fmt(answer, f),
            Reply::Web(answer) => fmt::Display::fmt(answer, f),
        }
    }
}

/// Remove a leading [`DOCUMENT_PREAMBLE`] (any case) and surrounding
/// whitespace. Input without the preamble is only trimmed.
pub fn strip_preamble(input: &str) -> &str {
    let trimmed = input.trim();
    match trimmed.get(..DOCUMENT_PREAMBLE.len()) {
        Some(head) if head.eq_ignore_ascii_case(DOCUMENT_PREAMBLE) => {
            trimmed[DOCUMENT_PREAMBLE.len()..].trim()
        }
        _ => trimmed,
    }
}

pub async fn respond(pipeline: &Pipeline, target: Target<'_>, input: &str) -> Result<Reply> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Reply::EmptyInput);
    }
    tracing::debug!(mode = %target.mode(), "handling submission");

    match target {
        Target::Web(search) => Ok(Reply::Web(pipeline.web_answer(search, input).await?)),
        Target::Store(store) => match pipeline.classify(input).await? {
            Label::Document => {
                let document = strip_preamble(input);
                if document.is_empty() {
                    return Ok(Reply::EmptyDocument);
                }
                Ok(Reply::Ingested(pipeline.ingest(document, store).await?))
            }
            Label::Question => Ok(Reply::Answered(
                pipeline.answer_from_store(input, store).await?,
            )),
            Label::Unknown => Ok(Reply::Unclassified),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_preamble() {
        assert_eq!(
            strip_preamble("Please, add this document to your database: Taylor Swift at Wembley"),
            "Taylor Swift at Wembley"
        );
        assert_eq!(
            strip_preamble("  please, ADD this document to your database:\nBand tour"),
            "Band tour"
        );
        assert_eq!(strip_preamble("Please, add this document to your database:   "), "");
        assert_eq!(strip_preamble("Tour dates: June"), "Tour dates: June");
    }

    #[test]
    fn test_strip_preamble_multibyte_prefix() {
        // The preamble length falls inside a multibyte char here.
        assert_eq!(strip_preamble("🎤🎤🎤🎤🎤🎤🎤🎤🎤🎤🎤"), "🎤🎤🎤🎤🎤🎤🎤🎤🎤🎤🎤");
    }

    #[test]
    fn test_reply_strings() {
        assert_eq!(Reply::EmptyInput.to_string(), "Please enter a valid query.");
        assert_eq!(
            Reply::Unclassified.to_string(),
            "Unable to classify the input. Please try again."
        );
        assert_eq!(
            Reply::Answered(StoreAnswer::NoDocuments).to_string(),
            "No relevant documents found."
        );
    }
}
