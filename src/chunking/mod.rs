#[cfg(test)]
mod tests;

use tracing::debug;

/// Configuration for text chunking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Number of characters shared between adjacent chunks
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 10_000,
            overlap: 1_000,
        }
    }
}

/// Split text into overlapping chunks of at most `chunk_size` characters.
///
/// Each break prefers, in order: a paragraph break, a line break, a sentence
/// end, a word boundary; if none falls inside the search window the chunk is
/// hard-cut at the character budget. Consecutive chunks share exactly
/// `overlap` characters, so no character of the input is lost at a boundary.
///
/// An empty input yields no chunks. `overlap` must be strictly less than
/// `chunk_size`; that is a caller contract enforced at configuration
/// validation, not here.
#[inline]
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();

    if total <= config.chunk_size {
        return vec![text.to_string()];
    }

    // Breaks are never taken earlier than this many characters into a chunk.
    // Keeping the floor above `overlap` guarantees forward progress and makes
    // the shared region between neighbors exactly `overlap` characters.
    let break_floor = config.overlap.max(config.chunk_size / 2);

    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let budget_end = (start + config.chunk_size).min(total);

        if budget_end == total {
            chunks.push(chars[start..total].iter().collect());
            break;
        }

        let floor = (start + break_floor).min(budget_end - 1);
        let end = find_break(&chars, floor, budget_end).unwrap_or(budget_end);

        chunks.push(chars[start..end].iter().collect::<String>());
        start = end - config.overlap;
    }

    debug!(
        "Chunked {} characters into {} chunks (size {}, overlap {})",
        total,
        chunks.len(),
        config.chunk_size,
        config.overlap
    );

    chunks
}

/// Find the best break position in `(floor, ceiling]`, scanning backwards
/// from the ceiling. A cut at position `p` means the chunk ends before
/// `chars[p]`.
fn find_break(chars: &[char], floor: usize, ceiling: usize) -> Option<usize> {
    let mut line_break = None;
    let mut sentence_end = None;
    let mut word_boundary = None;

    let mut p = ceiling;
    while p > floor {
        let before = chars[p - 1];

        if before == '\n' {
            if p >= 2 && chars[p - 2] == '\n' {
                // Latest paragraph break in the window wins outright.
                return Some(p);
            }
            if line_break.is_none() {
                line_break = Some(p);
            }
        } else if matches!(before, '.' | '!' | '?') {
            if sentence_end.is_none() && chars.get(p).is_some_and(|c| c.is_whitespace()) {
                sentence_end = Some(p);
            }
        } else if before.is_whitespace() && word_boundary.is_none() {
            word_boundary = Some(p);
        }

        p -= 1;
    }

    line_break.or(sentence_end).or(word_boundary)
}
