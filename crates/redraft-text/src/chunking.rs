//! Text chunking for the rewrite pipeline.
//!
//! Long reports are cut into overlapping windows so each window fits one
//! inference call. Cuts prefer a sentence terminator or line break near
//! the window end over a mid-sentence break.

/// Default window size handed to a single inference call.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 12_000;
/// Default overlap between consecutive windows.
pub const DEFAULT_CHUNK_OVERLAP: usize = 400;

/// How far back from the window end to look for a sentence boundary.
const BOUNDARY_LOOKBACK: usize = 200;

/// A bounded window of the original document with position metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub text: String,
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub start_char: usize,
    pub end_char: usize,
}

/// Split `text` into overlapping chunks of at most `max_chunk_size` bytes.
///
/// Short input comes back as a single chunk equal to the whole text.
/// Every window after the first starts at the previous window's end minus
/// `overlap`, and the loop always advances: if the overlap step would land
/// at or before the previous start, the next window starts exactly at the
/// previous end.
pub fn split_text(text: &str, max_chunk_size: usize, overlap: usize) -> Vec<TextChunk> {
    let max_chunk_size = max_chunk_size.max(1);

    if text.len() <= max_chunk_size {
        return vec![TextChunk {
            text: text.to_string(),
            chunk_index: 0,
            total_chunks: 1,
            start_char: 0,
            end_char: text.len(),
        }];
    }

    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut start = 0usize;

    while start < text.len() {
        let window_end = floor_char_boundary(text, (start + max_chunk_size).min(text.len()));
        let end = if window_end < text.len() {
            boundary_cut(text, start, window_end).unwrap_or(window_end)
        } else {
            window_end
        };

        spans.push((start, end));

        if end >= text.len() {
            break;
        }

        let mut next = floor_char_boundary(text, end.saturating_sub(overlap));
        if next <= start {
            next = end;
        }
        start = next;
    }

    let total = spans.len();
    spans
        .into_iter()
        .enumerate()
        .map(|(i, (s, e))| TextChunk {
            text: text[s..e].to_string(),
            chunk_index: i,
            total_chunks: total,
            start_char: s,
            end_char: e,
        })
        .collect()
}

/// Find the last sentence terminator or line break within the final
/// `BOUNDARY_LOOKBACK` bytes of the window. Returns the position just
/// after the boundary character, or None to cut at the window end.
fn boundary_cut(text: &str, start: usize, window_end: usize) -> Option<usize> {
    let from = floor_char_boundary(text, window_end.saturating_sub(BOUNDARY_LOOKBACK)).max(start);
    let window = &text[from..window_end];

    for (i, c) in window.char_indices().rev() {
        if matches!(c, '.' | '!' | '?' | '\n') {
            let cut = from + i + c.len_utf8();
            if cut > start {
                return Some(cut);
            }
        }
    }
    None
}

/// Largest char boundary at or below `index`.
fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}
