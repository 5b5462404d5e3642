//! Reasoning-delivery mode detection.

use strum::Display;

/// Opening delimiter of inline reasoning.
pub const THINK_OPEN: &str = "<think>";
/// Closing delimiter of inline reasoning.
pub const THINK_CLOSE: &str = "</think>";

/// How the upstream delivers reasoning for one session.
///
/// Decided once and never revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ReasoningMode {
    /// Not enough data yet.
    #[default]
    Unset,
    /// Reasoning arrives on a separate field of each fragment.
    Api,
    /// Reasoning is embedded in the answer text between think tags.
    Think,
    /// No reasoning detected; all text is answer.
    None,
}

impl ReasoningMode {
    pub fn is_decided(self) -> bool {
        self != Self::Unset
    }
}

/// Classify a session from the accumulated reply text and the latest
/// fragment's side-channel reasoning.
///
/// Returns [`ReasoningMode::Unset`] while the trimmed reply is still shorter
/// than the opening tag.
pub fn detect(reply_text: &str, reasoning_delta: &str) -> ReasoningMode {
    if !reasoning_delta.is_empty() {
        return ReasoningMode::Api;
    }
    let trimmed = reply_text.trim();
    if trimmed.chars().count() < THINK_OPEN.len() {
        return ReasoningMode::Unset;
    }
    classify_prefix(trimmed)
}

/// Decide with whatever arrived, used once the source has ended.
pub fn force(reply_text: &str) -> ReasoningMode {
    classify_prefix(reply_text.trim())
}

fn classify_prefix(trimmed: &str) -> ReasoningMode {
    if trimmed.starts_with(THINK_OPEN) {
        ReasoningMode::Think
    } else {
        ReasoningMode::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_channel_reasoning_wins() {
        assert_eq!(detect("", "hmm"), ReasoningMode::Api);
        assert_eq!(detect("<think>", "hmm"), ReasoningMode::Api);
    }

    #[test]
    fn defers_until_tag_length_is_reached() {
        assert_eq!(detect("", ""), ReasoningMode::Unset);
        assert_eq!(detect("<thin", ""), ReasoningMode::Unset);
        assert_eq!(detect("   \n<thin  ", ""), ReasoningMode::Unset);
        assert_eq!(detect("Hi", ""), ReasoningMode::Unset);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // six multibyte characters, eighteen bytes
        assert_eq!(detect("你好你好你好", ""), ReasoningMode::Unset);
        assert_eq!(detect("你好你好你好你", ""), ReasoningMode::None);
    }

    #[test]
    fn detects_think_and_plain_text() {
        assert_eq!(detect("<think>", ""), ReasoningMode::Think);
        assert_eq!(detect("\n <think>abc", ""), ReasoningMode::Think);
        assert_eq!(detect("Hello, world", ""), ReasoningMode::None);
        assert_eq!(detect("x <think>abc", ""), ReasoningMode::None);
    }

    #[test]
    fn force_decides_short_text() {
        assert_eq!(force("Hi"), ReasoningMode::None);
        assert_eq!(force(""), ReasoningMode::None);
        assert_eq!(force(" <think>"), ReasoningMode::Think);
        assert!(!ReasoningMode::Unset.is_decided());
        assert!(ReasoningMode::None.is_decided());
    }
}
