use super::*;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Rebuild the original text from the chunk sequence by skipping each
/// chunk's overlap prefix. Verifies no characters are lost or duplicated
/// beyond the configured overlap.
fn reconstruct(chunks: &[String], overlap: usize) -> String {
    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        if i == 0 {
            out.push_str(chunk);
        } else {
            out.extend(chunk.chars().skip(overlap));
        }
    }
    out
}

#[test]
fn empty_input_yields_no_chunks() {
    let config = ChunkingConfig::default();
    assert!(chunk_text("", &config).is_empty());
}

#[test]
fn whitespace_only_input_is_one_chunk() {
    let config = ChunkingConfig::default();
    let chunks = chunk_text("   \n  ", &config);
    assert_eq!(chunks, vec!["   \n  ".to_string()]);
}

#[test]
fn short_text_is_a_single_chunk() {
    let config = ChunkingConfig {
        chunk_size: 100,
        overlap: 10,
    };
    let chunks = chunk_text("a short paragraph of text", &config);
    assert_eq!(chunks, vec!["a short paragraph of text".to_string()]);
}

#[test]
fn chunks_cover_every_character() {
    let text = (0..50)
        .map(|i| format!("Paragraph {} has a little bit of body text in it.", i))
        .collect::<Vec<_>>()
        .join("\n\n");

    for (chunk_size, overlap) in [(100, 10), (250, 50), (80, 0)] {
        let config = ChunkingConfig {
            chunk_size,
            overlap,
        };
        let chunks = chunk_text(&text, &config);
        assert!(chunks.len() > 1, "test text should need multiple chunks");
        assert_eq!(
            reconstruct(&chunks, overlap),
            text,
            "reconstruction failed for size {} overlap {}",
            chunk_size,
            overlap
        );
    }
}

#[test]
fn chunk_and_overlap_bounds_hold() {
    let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);

    for (chunk_size, overlap) in [(100, 10), (120, 30), (64, 8)] {
        let config = ChunkingConfig {
            chunk_size,
            overlap,
        };
        let chunks = chunk_text(&text, &config);

        for chunk in &chunks {
            assert!(
                char_len(chunk) <= chunk_size,
                "chunk of {} chars exceeds budget {}",
                char_len(chunk),
                chunk_size
            );
        }

        for pair in chunks.windows(2) {
            let prev_suffix: String = pair[0]
                .chars()
                .skip(char_len(&pair[0]) - overlap)
                .collect();
            let next_prefix: String = pair[1].chars().take(overlap).collect();
            assert_eq!(prev_suffix, next_prefix);
        }
    }
}

#[test]
fn paragraph_breaks_are_preferred() {
    let text = (0..20)
        .map(|i| format!("para {:02} body text here", i))
        .collect::<Vec<_>>()
        .join("\n\n");
    let config = ChunkingConfig {
        chunk_size: 100,
        overlap: 10,
    };

    let chunks = chunk_text(&text, &config);
    assert!(chunks.len() > 1);
    // Every non-final chunk should have snapped to a paragraph boundary
    // rather than cutting a word.
    for chunk in &chunks[..chunks.len() - 1] {
        assert!(
            chunk.ends_with("\n\n"),
            "expected paragraph-aligned cut, got {:?}",
            &chunk[chunk.len().saturating_sub(12)..]
        );
    }
}

#[test]
fn sentence_breaks_beat_word_breaks() {
    let text = "A sentence that ends here. Another sentence follows it directly and keeps going with more words. "
        .repeat(10);
    let config = ChunkingConfig {
        chunk_size: 150,
        overlap: 20,
    };

    let chunks = chunk_text(&text, &config);
    assert!(chunks.len() > 1);
    for chunk in &chunks[..chunks.len() - 1] {
        let trimmed = chunk.trim_end();
        assert!(
            trimmed.ends_with('.'),
            "expected sentence-aligned cut, got {:?}",
            &trimmed[trimmed.len().saturating_sub(12)..]
        );
    }
}

#[test]
fn unbroken_text_falls_back_to_hard_cuts() {
    let text = "a".repeat(250);
    let config = ChunkingConfig {
        chunk_size: 100,
        overlap: 10,
    };

    let chunks = chunk_text(&text, &config);
    assert_eq!(chunks.len(), 3);
    assert_eq!(char_len(&chunks[0]), 100);
    assert_eq!(char_len(&chunks[1]), 100);
    assert_eq!(char_len(&chunks[2]), 70);
    assert_eq!(reconstruct(&chunks, 10), text);
}

#[test]
fn multibyte_text_chunks_on_char_boundaries() {
    let text = "héllo wörld ünd möre ".repeat(30);
    let config = ChunkingConfig {
        chunk_size: 50,
        overlap: 5,
    };

    let chunks = chunk_text(&text, &config);
    assert!(chunks.len() > 1);
    assert_eq!(reconstruct(&chunks, 5), text);
}
