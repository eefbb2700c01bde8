//! Recursive character splitting for the document index.
//!
//! Text is split on the coarsest separator present (paragraph, line, sentence,
//! word, character) and the pieces are greedily merged back into chunks of at most
//! `chunk_size` characters, carrying up to `overlap` characters of trailing context
//! into the next chunk. Pieces still too large are split again with the next
//! finer separator.

use std::collections::VecDeque;

pub const CHUNK_SIZE: usize = 1000;
pub const CHUNK_OVERLAP: usize = 150;

const SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

#[derive(Debug, Clone, Copy)]
pub struct Splitter {
    chunk_size: usize,
    overlap: usize,
}

impl Default for Splitter {
    fn default() -> Self {
        Self::new(CHUNK_SIZE, CHUNK_OVERLAP)
    }
}

impl Splitter {
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size.saturating_sub(1)),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let Some(pos) = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep))
        else {
            return self.merge(&[text], "");
        };
        let separator = separators[pos];
        let finer = &separators[pos + 1..];

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|s| !s.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting, separator));
                fitting.clear();
            }
            if finer.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, finer));
            }
        }
        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting, separator));
        }
        chunks
    }

    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joiner = if window.is_empty() { 0 } else { sep_len };

            if total + len + joiner > self.chunk_size && !window.is_empty() {
                push_chunk(&mut chunks, &window, separator);

                // Drop from the front until the remainder fits as overlap.
                while total > self.overlap
                    || (total > 0 && total + len + sep_len > self.chunk_size)
                {
                    let Some(front) = window.pop_front() else {
                        break;
                    };
                    total -= char_len(front) + if window.is_empty() { 0 } else { sep_len };
                }
            }

            let joiner = if window.is_empty() { 0 } else { sep_len };
            window.push_back(piece);
            total += len + joiner;
        }

        push_chunk(&mut chunks, &window, separator);
        chunks
    }
}

fn push_chunk(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = Splitter::default().split("  AE201A: Flight Mechanics - Study of aircraft.  ");
        assert_eq!(chunks, vec!["AE201A: Flight Mechanics - Study of aircraft."]);
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(Splitter::default().split("").is_empty());
        assert!(Splitter::default().split("\n\n  \n").is_empty());
    }

    #[test]
    fn chunks_respect_size_and_overlap() {
        let words: Vec<String> = (0..400).map(|i| format!("word{i:03}")).collect();
        let text = words.join(" ");
        let splitter = Splitter::new(100, 20);
        let chunks = splitter.split(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(char_len(chunk) <= 100, "chunk too long: {}", char_len(chunk));
        }
        for pair in chunks.windows(2) {
            let last_word = pair[0].split(' ').last().unwrap();
            assert!(
                pair[1].contains(last_word),
                "expected overlap between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
        assert!(chunks.first().unwrap().starts_with("word000"));
        assert!(chunks.last().unwrap().ends_with("word399"));
    }

    #[test]
    fn prefers_paragraph_boundaries() {
        let para_a = "a".repeat(60);
        let para_b = "b".repeat(60);
        let text = format!("{para_a}\n\n{para_b}");
        let chunks = Splitter::new(100, 0).split(&text);
        assert_eq!(chunks, vec![para_a, para_b]);
    }

    #[test]
    fn unbreakable_runs_fall_back_to_characters() {
        let text = "é".repeat(250);
        let chunks = Splitter::new(100, 0).split(&text);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| char_len(c) <= 100));
        assert_eq!(chunks.concat(), text);
    }
}
