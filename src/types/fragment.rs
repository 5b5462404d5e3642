//! Upstream fragment type.

use serde::{Deserialize, Serialize};

/// One incremental unit of model output.
///
/// Every field may be empty. A non-empty `error_code` marks an
/// upstream-reported failure for this step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fragment {
    /// Answer text delta.
    pub text: String,
    /// Reasoning delta delivered on a side channel.
    #[serde(alias = "reasoningText", alias = "reasoning_content")]
    pub reasoning_text: String,
    #[serde(alias = "errorCode")]
    pub error_code: String,
    #[serde(alias = "errorMessage")]
    pub error_message: String,
}

impl Fragment {
    /// Fragment carrying only answer text.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Fragment carrying only side-channel reasoning.
    pub fn reasoning(reasoning: impl Into<String>) -> Self {
        Self {
            reasoning_text: reasoning.into(),
            ..Default::default()
        }
    }

    /// Fragment reporting an upstream failure.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: code.into(),
            error_message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning_text = reasoning.into();
        self
    }

    pub fn is_error(&self) -> bool {
        !self.error_code.is_empty()
    }

    /// True when the fragment carries nothing at all (keep-alive chunks).
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
            && self.reasoning_text.is_empty()
            && self.error_code.is_empty()
            && self.error_message.is_empty()
    }
}
