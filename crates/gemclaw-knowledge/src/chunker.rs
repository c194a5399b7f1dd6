//! Separator-based text splitter.
//!
//! Text is split on a separator (blank line by default) and the pieces are
//! greedily merged into chunks of at most `chunk_size` characters. When a
//! chunk is emitted, trailing pieces totalling at most `chunk_overlap`
//! characters are carried into the next chunk. A single piece longer than
//! `chunk_size` is kept whole as an oversize chunk.

use std::collections::VecDeque;

/// A contiguous span of source text used as a retrieval unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Position in the document, starting at 0.
    pub index: usize,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSplitter {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub separator: String,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            separator: "\n\n".into(),
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize, separator: impl Into<String>) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size),
            separator: separator.into(),
        }
    }

    pub fn from_config(config: &gemclaw_core::config::KnowledgeConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap, config.separator.clone())
    }

    /// Split `text` into chunks.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        let pieces: Vec<&str> = if self.separator.is_empty() {
            text.split("").filter(|s| !s.is_empty()).collect()
        } else {
            text.split(self.separator.as_str())
                .filter(|s| !s.is_empty())
                .collect()
        };
        self.merge(&pieces)
            .into_iter()
            .enumerate()
            .map(|(index, content)| Chunk { index, content })
            .collect()
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let sep_len = char_len(&self.separator);
        let mut docs = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = char_len(piece);
            let joiner = if current.is_empty() { 0 } else { sep_len };

            if total + len + joiner > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        "Created a chunk of size {total}, which is longer than the specified {}",
                        self.chunk_size
                    );
                }
                if !current.is_empty() {
                    self.push_joined(&mut docs, &current);
                    // drop pieces from the front until what remains fits the overlap
                    // and leaves room for the incoming piece
                    while total > self.chunk_overlap
                        || (total > 0
                            && total + len + if current.is_empty() { 0 } else { sep_len }
                                > self.chunk_size)
                    {
                        let Some(front) = current.pop_front() else {
                            break;
                        };
                        total -= char_len(front) + if current.is_empty() { 0 } else { sep_len };
                    }
                }
            }

            let joiner = if current.is_empty() { 0 } else { sep_len };
            current.push_back(piece);
            total += len + joiner;
        }

        self.push_joined(&mut docs, &current);
        docs
    }

    fn push_joined(&self, docs: &mut Vec<String>, current: &VecDeque<&str>) {
        let joined = current
            .iter()
            .copied()
            .collect::<Vec<_>>()
            .join(&self.separator);
        let trimmed = joined.trim();
        if !trimmed.is_empty() {
            docs.push(trimmed.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(word: &str, chars: usize) -> String {
        let mut p = String::new();
        while p.len() + word.len() + 1 <= chars {
            p.push_str(word);
            p.push(' ');
        }
        p.trim_end().to_string()
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = TextSplitter::default();
        let chunks = splitter.split("Returns accepted within 30 days.\n\nReceipts required.");
        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].content,
            "Returns accepted within 30 days.\n\nReceipts required."
        );
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn test_chunks_respect_size() {
        let text = (0..12)
            .map(|i| paragraph(&format!("rule{i}"), 120))
            .collect::<Vec<_>>()
            .join("\n\n");
        let splitter = TextSplitter::new(500, 50, "\n\n");
        let chunks = splitter.split(&text);
        assert!(chunks.len() > 2);
        for c in &chunks {
            assert!(c.content.chars().count() <= 500, "chunk {} too long", c.index);
        }
        let indices: Vec<usize> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indices, (0..chunks.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_overlap_carries_small_pieces() {
        // pieces of 30 chars: 5 fit per 160-char chunk, one (30 ≤ 40) carries over
        let pieces: Vec<String> = (0..10).map(|i| format!("{i:0>30}")).collect();
        let text = pieces.join("\n\n");
        let splitter = TextSplitter::new(160, 40, "\n\n");
        let chunks = splitter.split(&text);
        assert!(chunks.len() >= 2);
        let first_last = chunks[0].content.rsplit("\n\n").next().unwrap();
        let second_first = chunks[1].content.split("\n\n").next().unwrap();
        assert_eq!(first_last, second_first);
    }

    #[test]
    fn test_no_overlap_when_zero() {
        let pieces: Vec<String> = (0..6).map(|i| format!("{i:0>30}")).collect();
        let text = pieces.join("\n\n");
        let chunks = TextSplitter::new(70, 0, "\n\n").split(&text);
        let rejoined = chunks
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn test_oversize_piece_kept_whole() {
        let long = "x".repeat(800);
        let text = format!("short intro\n\n{long}\n\nshort outro");
        let chunks = TextSplitter::default().split(&text);
        assert!(chunks.iter().any(|c| c.content == long));
    }

    #[test]
    fn test_empty_text() {
        assert!(TextSplitter::default().split("").is_empty());
        assert!(TextSplitter::default().split("\n\n\n\n").is_empty());
    }

    #[test]
    fn test_overlap_clamped_to_size() {
        let s = TextSplitter::new(10, 50, "\n\n");
        assert_eq!(s.chunk_overlap, 10);
    }
}
