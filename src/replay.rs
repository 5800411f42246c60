//! Batch evaluation from a sample-data file.
//!
//! The file has two sections, each introduced by a heading line, with one
//! item per non-empty line:
//!
//! ```text
//! ### Example Documents:
//! The 2025 world tour opens at Wembley Stadium, London on June 21.
//!
//! ### Example Questions:
//! Where does the 2025 world tour open?
//! ```
//!
//! Documents are ingested directly, skipping classification. Every question
//! is then retrieved and answered against the same store.

use std::path::Path;

use anyhow::{Context, Result};

use crate::pipeline::{IngestOutcome, Pipeline, StoreAnswer};
use crate::store::VectorStore;

const DOCUMENTS_HEADING: &str = "### Example Documents:";
const QUESTIONS_HEADING: &str = "### Example Questions:";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayData {
    pub documents: Vec<String>,
    pub questions: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Preface,
    Documents,
    Questions,
}

/// Parse replay data. Lines before the first heading are ignored.
pub fn parse(text: &str) -> ReplayData {
    let mut data = ReplayData::default();
    let mut section = Section::Preface;

    for line in text.lines().map(str::trim) {
        if line.starts_with(DOCUMENTS_HEADING) {
            section = Section::Documents;
        } else if line.starts_with(QUESTIONS_HEADING) {
            section = Section::Questions;
        } else if !line.is_empty() {
            match section {
                Section::Documents => data.documents.push(line.to_string()),
                Section::Questions => data.questions.push(line.to_string()),
                Section::Preface => {}
            }
        }
    }

    data
}

pub fn load(path: &Path) -> Result<ReplayData> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read replay file: {}", path.display()))?;
    Ok(parse(&text))
}

/// Results of one replay run, in input order.
#[derive(Debug, Default)]
pub struct ReplayReport {
    pub ingested: Vec<IngestOutcome>,
    pub answers: Vec<(String, StoreAnswer)>,
}

/// Reported by [`run`] as soon as each step completes.
#[derive(Debug)]
pub enum Progress<'a> {
    Ingested(&'a IngestOutcome),
    /// All documents are in; questions follow.
    QuestionsStarted,
    Answered(&'a str, &'a StoreAnswer),
}

/// Ingest every document, then answer every question. `on_progress` sees
/// each result before the next step starts, so results that precede a
/// failure are never lost.
pub async fn run(
    pipeline: &Pipeline,
    store: &dyn VectorStore,
    data: &ReplayData,
    mut on_progress: impl FnMut(Progress<'_>),
) -> Result<ReplayReport> {
    let mut report = ReplayReport::default();

    for (i, doc) in data.documents.iter().enumerate() {
        let outcome = pipeline
            .ingest(doc, store)
            .await
            .with_context(|| format!("Failed to ingest document {}", i + 1))?;
        on_progress(Progress::Ingested(&outcome));
        report.ingested.push(outcome);
    }

    on_progress(Progress::QuestionsStarted);
    for question in &data.questions {
        let answer = pipeline
            .answer_from_store(question, store)
            .await
            .with_context(|| format!("Failed to answer: {}", question))?;
        on_progress(Progress::Answered(question, &answer));
        report.answers.push((question.clone(), answer));
    }

    Ok(report)
}

fn print_progress(progress: Progress<'_>) {
    match progress {
        Progress::Ingested(outcome) => println!("{}", outcome),
        Progress::QuestionsStarted => {
            println!();
            println!("Testing queries...");
        }
        Progress::Answered(question, answer) => {
            println!();
            println!("Query: {}", question);
            match answer {
                StoreAnswer::Answer(text) => println!("Response: {}", text),
                StoreAnswer::NoDocuments => println!("{}", answer),
            }
        }
    }
}

/// Load `path` and run it, printing each result to stdout as it arrives.
pub async fn run_replay(pipeline: &Pipeline, store: &dyn VectorStore, path: &Path) -> Result<()> {
    let data = load(path)?;
    tracing::info!(
        documents = data.documents.len(),
        questions = data.questions.len(),
        "starting replay"
    );

    println!("Ingesting documents...");
    run(pipeline, store, &data, print_progress).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections() {
        let text = "Sample data\n\n### Example Documents:\n  doc one  \n\ndoc two\n### Example Questions:\nq one?\n\n";
        let data = parse(text);
        assert_eq!(data.documents, vec!["doc one", "doc two"]);
        assert_eq!(data.questions, vec!["q one?"]);
    }

    #[test]
    fn test_parse_without_headings_is_empty() {
        assert_eq!(parse("just text\nmore"), ReplayData::default());
    }
}
