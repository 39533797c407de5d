//! Segmentation: split text into request-sized chunks at safe boundaries.
//!
//! Translation endpoints cap the size of a single request, so long documents
//! go out in pieces. A cut in the middle of a sentence makes the service
//! translate two fragments it cannot understand, so the cut point is chosen
//! in order of preference:
//!
//! 1. just after the last `". "` inside the window
//! 2. just after the last `\n` inside the window
//! 3. a hard cut at `max_chars - 1` characters
//!
//! Sizes are counted in characters, not bytes, and cuts always land on a
//! `char` boundary. Chunks borrow from the input; concatenating them in order
//! gives back the input exactly.

/// Split `text` into chunks of at most `max_chars` characters.
///
/// No chunk is longer than `max_chars`. Empty input yields no chunks.
/// `max_chars` below 1 behaves as 1.
pub fn segment(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let Some(window_end) = byte_offset_of_char(remaining, max_chars) else {
            // Fewer than max_chars characters left.
            chunks.push(remaining);
            break;
        };

        let split = find_split(remaining, window_end, max_chars);
        let (chunk, rest) = remaining.split_at(split);
        chunks.push(chunk);
        remaining = rest;
    }

    chunks
}

/// Byte offset where the `n`-th character starts, or `None` if `text` has
/// `n` characters or fewer.
fn byte_offset_of_char(text: &str, n: usize) -> Option<usize> {
    text.char_indices().nth(n).map(|(i, _)| i)
}

fn find_split(text: &str, window_end: usize, max_chars: usize) -> usize {
    let window = &text[..window_end];

    if let Some(pos) = window.rfind(". ") {
        return pos + 2;
    }
    if let Some(pos) = window.rfind('\n') {
        return pos + 1;
    }

    let hard = (max_chars - 1).max(1);
    byte_offset_of_char(text, hard).unwrap_or(window_end)
}
