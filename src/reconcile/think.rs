//! Splits inline `<think>` reasoning out of the accumulated reply text.
//!
//! The splitter always looks at the whole reply, so a delimiter cut across
//! fragments is found as soon as its last byte arrives. Everything up to the
//! opening tag stays on the reasoning side; once Think mode is chosen that
//! prefix is whitespace only. Keeping it there means bytes emitted while the
//! block is still open are always a prefix of the final block.

use super::mode::{THINK_CLOSE, THINK_OPEN};

/// Result of splitting the accumulated reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThinkSplit<'a> {
    /// No opening tag: the whole text is answer.
    NoTag,
    /// Opening tag seen, closing tag not yet: all of `reasoning` is
    /// provisionally reasoning.
    Open {
        reasoning: &'a str,
        inner: &'a str,
    },
    /// Both tags seen.
    Closed {
        /// Text through the end of the closing tag.
        reasoning: &'a str,
        /// Text strictly between the tags.
        inner: &'a str,
        /// Text after the closing tag.
        answer: &'a str,
    },
}

/// Split on the first `<think>` and the first `</think>` after it.
pub fn split(text: &str) -> ThinkSplit<'_> {
    let Some(open) = text.find(THINK_OPEN) else {
        return ThinkSplit::NoTag;
    };
    let inner_start = open + THINK_OPEN.len();
    match text[inner_start..].find(THINK_CLOSE) {
        None => ThinkSplit::Open {
            reasoning: text,
            inner: &text[inner_start..],
        },
        Some(rel) => {
            let close = inner_start + rel;
            let end = close + THINK_CLOSE.len();
            ThinkSplit::Closed {
                reasoning: &text[..end],
                inner: &text[inner_start..close],
                answer: &text[end..],
            }
        }
    }
}
