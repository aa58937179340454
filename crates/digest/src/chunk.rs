use crate::assemble::BLOCK_DELIMITER;

/// Split digest text into transport-safe chunks of at most `max_len`
/// characters.
///
/// Prefers to cut on [`BLOCK_DELIMITER`] boundaries, greedily packing whole
/// blocks into each chunk. A single block longer than `max_len` is
/// hard-sliced into consecutive `max_len`-sized pieces. Empty input yields
/// zero chunks; every returned chunk is non-empty.
#[must_use]
pub fn split_for_transport(text: &str, max_len: usize) -> Vec<String> {
    let payload = text.trim();
    if payload.is_empty() || max_len == 0 {
        return Vec::new();
    }
    if char_len(payload) <= max_len {
        return vec![payload.to_owned()];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut buf_chars = 0usize;

    let blocks = payload
        .split(BLOCK_DELIMITER)
        .map(str::trim)
        .filter(|block| !block.is_empty());

    for block in blocks {
        let block_chars = char_len(block);
        let candidate_chars = if buf.is_empty() {
            block_chars
        } else {
            // The delimiter is ASCII, so its byte length is its char length.
            buf_chars + BLOCK_DELIMITER.len() + block_chars
        };

        if candidate_chars <= max_len {
            if !buf.is_empty() {
                buf.push_str(BLOCK_DELIMITER);
            }
            buf.push_str(block);
            buf_chars = candidate_chars;
            continue;
        }

        if !buf.is_empty() {
            chunks.push(std::mem::take(&mut buf));
            buf_chars = 0;
        }

        if block_chars <= max_len {
            buf.push_str(block);
            buf_chars = block_chars;
            continue;
        }

        // The block alone cannot fit a single chunk: hard-slice it.
        let block_charvec: Vec<char> = block.chars().collect();
        for piece in block_charvec.chunks(max_len) {
            let slice: String = piece.iter().collect();
            let slice = slice.trim();
            if !slice.is_empty() {
                chunks.push(slice.to_owned());
            }
        }
    }

    if !buf.trim().is_empty() {
        chunks.push(buf.trim().to_owned());
    }

    chunks.retain(|chunk| !chunk.trim().is_empty());
    chunks
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_zero_chunks() {
        assert!(split_for_transport("", 100).is_empty());
        assert!(split_for_transport("  \n ", 100).is_empty());
    }

    #[test]
    fn short_input_is_a_single_chunk() {
        assert_eq!(split_for_transport("hello", 10), ["hello"]);
    }

    #[test]
    fn splits_on_block_boundaries() {
        let text = ["block1", "block2", "block3"].join(BLOCK_DELIMITER);
        let chunks = split_for_transport(&text, 20);
        assert_eq!(chunks, ["block1", "block2", "block3"]);
    }

    #[test]
    fn packs_blocks_greedily() {
        let text = ["aaaa", "bbbb", "cccc"].join(BLOCK_DELIMITER);
        // Two blocks plus the delimiter fit in 22 chars; the third overflows.
        let chunks = split_for_transport(&text, 22);
        assert_eq!(
            chunks,
            [format!("aaaa{BLOCK_DELIMITER}bbbb"), "cccc".to_owned()]
        );
    }

    #[test]
    fn hard_slices_oversized_blocks() {
        let text = "x".repeat(95);
        let chunks = split_for_transport(&text, 30);
        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks.concat(), text);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 30);
        }
    }

    #[test]
    fn oversized_block_flushes_pending_buffer_first() {
        let text = format!("small{BLOCK_DELIMITER}{}", "y".repeat(50));
        let chunks = split_for_transport(&text, 20);
        assert_eq!(chunks[0], "small");
        assert_eq!(chunks[1..].concat(), "y".repeat(50));
    }

    #[test]
    fn every_chunk_is_within_bounds_and_non_empty() {
        let blocks: Vec<String> = (0..12).map(|i| format!("block {i} {}", "z".repeat(i * 7))).collect();
        let text = blocks.join(BLOCK_DELIMITER);
        for max_len in [1, 5, 16, 40, 100, 4096] {
            for chunk in split_for_transport(&text, max_len) {
                let len = chunk.chars().count();
                assert!(len > 0 && len <= max_len, "len {len} vs max {max_len}");
            }
        }
    }

    #[test]
    fn slices_multibyte_text_on_char_boundaries() {
        let text = "я".repeat(45);
        let chunks = split_for_transport(&text, 20);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks.concat(), text);
    }
}
