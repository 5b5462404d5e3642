//! JSON-lines fragment recordings, one [`Fragment`] object per line.

use std::path::Path;

use crate::error::{FlowError, Result};
use crate::types::Fragment;

/// Parse a recording. Blank lines and lines starting with `#` are skipped.
pub fn parse_fragments(raw: &str) -> Result<Vec<Fragment>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|e| {
                FlowError::InvalidArgument(format!("line {}: {e}", idx + 1))
            })
        })
        .collect()
}

/// Load a recording from disk.
pub fn read_fragments(path: &Path) -> Result<Vec<Fragment>> {
    let raw = std::fs::read_to_string(path)?;
    parse_fragments(&raw)
}
