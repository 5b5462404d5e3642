//! Append-only reasoning diffing.

/// Part of `full` not yet covered by `written`.
///
/// Strips the longest common prefix (on a char boundary) and returns the
/// tail. An empty result means there is nothing new to emit.
pub fn residual<'a>(full: &'a str, written: &str) -> &'a str {
    if let Some(tail) = full.strip_prefix(written) {
        return tail;
    }
    &full[common_prefix_len(full, written)..]
}

fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((idx, _), _)| idx)
        .unwrap_or_else(|| a.len().min(b.len()))
}
