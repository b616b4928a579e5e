//! Fixed-size chunking with overlap.

/// A bounded substring of a larger document, produced for embedding and
/// indexing.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub text: String,
    /// Source identifier (filename, doc id, ...).
    pub source: String,
    /// Index of this chunk within its source.
    pub chunk_index: usize,
}

/// Split `text` into windows of at most `max_chars` characters, consecutive
/// windows overlapping by `overlap` characters.
///
/// Windows that trim to nothing are dropped. Offsets are counted in chars,
/// not bytes, so multi-byte text never splits inside a code point.
pub fn chunk_text(text: &str, source: &str, max_chars: usize, overlap: usize) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || max_chars == 0 {
        return Vec::new();
    }

    let step = max_chars.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chunk_index = 0;

    loop {
        let end = (start + max_chars).min(chars.len());
        let window: String = chars[start..end].iter().collect();
        let trimmed = window.trim();
        if !trimmed.is_empty() {
            chunks.push(Chunk {
                text: trimmed.to_string(),
                source: source.to_string(),
                chunk_index,
            });
            chunk_index += 1;
        }

        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}
