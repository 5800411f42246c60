//! Recursive character text splitter.
//!
//! Splits text into overlapping chunks no longer than `chunk_size`
//! characters. The splitter tries the largest natural boundary first and
//! only falls back to a finer one for pieces that are still too long:
//!
//! 1. paragraphs (`\n\n`)
//! 2. lines (`\n`)
//! 3. words (` `)
//! 4. single characters
//!
//! Separators stay attached to the start of the piece that follows them, so
//! joining adjacent pieces reproduces the source text exactly. Adjacent
//! pieces are greedily merged up to `chunk_size`; when a chunk is emitted,
//! pieces are dropped from its front until at most `chunk_overlap`
//! characters remain, and those carry over into the next chunk.
//!
//! Lengths are measured in `char`s, never bytes.
//!
//! # Example
//!
//! ```rust
//! use tourbot::chunk::RecursiveSplitter;
//!
//! let splitter = RecursiveSplitter::new(1000, 200);
//! let chunks = splitter.split_text("Hello world.\n\nSecond paragraph.");
//! assert_eq!(chunks, vec!["Hello world.\n\nSecond paragraph."]);
//! ```

use std::collections::VecDeque;

use crate::config::ChunkingConfig;

/// Default separator hierarchy, coarsest first. The empty string means
/// "split between every character".
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split `text` into ordered, overlapping chunks.
    ///
    /// Chunks are whitespace-trimmed and never empty. Empty or
    /// whitespace-only input yields no chunks.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let mut separator = separators.last().map(String::as_str).unwrap_or("");
        let mut finer: &[String] = &[];

        for (i, candidate) in separators.iter().enumerate() {
            if candidate.is_empty() {
                separator = "";
                break;
            }
            if text.contains(candidate.as_str()) {
                separator = candidate;
                finer = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut small: Vec<&str> = Vec::new();

        for piece in split_keep_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                small.push(piece);
                continue;
            }

            if !small.is_empty() {
                chunks.extend(self.merge_pieces(&small));
                small.clear();
            }

            if finer.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, finer));
            }
        }

        if !small.is_empty() {
            chunks.extend(self.merge_pieces(&small));
        }

        chunks
    }

    /// Greedily pack pieces into chunks, carrying up to `chunk_overlap`
    /// characters from the tail of each chunk into the next.
    fn merge_pieces(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        total,
                        chunk_size = self.chunk_size,
                        "created a chunk longer than the configured size"
                    );
                }
                if !window.is_empty() {
                    if let Some(chunk) = join_trimmed(&window) {
                        chunks.push(chunk);
                    }
                    while total > self.chunk_overlap
                        || (total + len > self.chunk_size && total > 0)
                    {
                        match window.pop_front() {
                            Some(front) => total -= char_len(front),
                            None => break,
                        }
                    }
                }
            }

            window.push_back(piece);
            total += len;
        }

        if let Some(chunk) = join_trimmed(&window) {
            chunks.push(chunk);
        }

        chunks
    }
}

/// Split on `separator`, attaching each separator occurrence to the start
/// of the piece after it. Empty pieces are dropped.
fn split_keep_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn join_trimmed(window: &VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_words(n: usize) -> String {
        (0..n)
            .map(|i| format!("word{}", i))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_small_text_single_chunk() {
        let chunks = RecursiveSplitter::new(1000, 200).split_text("Hello, world!");
        assert_eq!(chunks, vec!["Hello, world!"]);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let splitter = RecursiveSplitter::new(1000, 200);
        assert!(splitter.split_text("").is_empty());
        assert!(splitter.split_text("  \n\n  ").is_empty());
    }

    #[test]
    fn test_prefers_paragraph_boundary() {
        let p1 = "Alpha paragraph with some words.";
        let p2 = "Beta paragraph with more words.";
        let text = format!("{}\n\n{}", p1, p2);
        let chunks = RecursiveSplitter::new(40, 10).split_text(&text);
        assert_eq!(chunks, vec![p1, p2]);
    }

    #[test]
    fn test_chunks_respect_size() {
        let text = numbered_words(200);
        let chunks = RecursiveSplitter::new(50, 20).split_text(&text);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.chars().count() <= 50, "chunk too long: {:?}", c);
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let text = numbered_words(200);
        let chunks = RecursiveSplitter::new(50, 20).split_text(&text);
        for pair in chunks.windows(2) {
            let first_word = pair[1].split_whitespace().next().unwrap();
            assert!(
                pair[0].split_whitespace().any(|w| w == first_word),
                "{:?} does not carry into {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_zero_overlap_partitions_words() {
        let text = numbered_words(60);
        let chunks = RecursiveSplitter::new(30, 0).split_text(&text);
        let rejoined: Vec<&str> = chunks.iter().flat_map(|c| c.split_whitespace()).collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        assert_eq!(rejoined, original);
    }

    #[test]
    fn test_falls_back_to_characters() {
        let text = "abcdefghijklmnopqrstuvwxy";
        let chunks = RecursiveSplitter::new(10, 2).split_text(text);
        assert!(chunks.len() > 2);
        for c in &chunks {
            assert!(c.chars().count() <= 10);
        }
        assert!(chunks[0].starts_with("abcdefghij"));
        assert!(chunks.last().unwrap().ends_with('y'));
    }

    #[test]
    fn test_multibyte_utf8_chars() {
        let text = "┌──────────────────┐\n│ Wembley 🎤 London │\n└──────────────────┘";
        let chunks = RecursiveSplitter::new(8, 2).split_text(text);
        assert!(!chunks.is_empty());
        for c in &chunks {
            assert!(c.chars().count() <= 8);
        }
    }

    #[test]
    fn test_deterministic() {
        let text = format!(
            "{}\n\n{}\n{}",
            numbered_words(80),
            numbered_words(30),
            numbered_words(45)
        );
        let splitter = RecursiveSplitter::new(100, 30);
        assert_eq!(splitter.split_text(&text), splitter.split_text(&text));
    }

    #[test]
    fn test_split_keep_separator() {
        assert_eq!(
            split_keep_separator("a b  c", " "),
            vec!["a", " b", " ", " c"]
        );
        assert_eq!(split_keep_separator("héllo", ""), vec!["h", "é", "l", "l", "o"]);
    }
}
