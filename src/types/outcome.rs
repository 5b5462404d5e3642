//! Session results and failure classification.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::Display;

/// How a reconciliation session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Outcome {
    /// The source closed and everything was flushed.
    Completed,
    /// Nothing was produced before the stream ended or failed.
    EmptyResponse,
    /// No fragment arrived within the initial deadline.
    InitialTimeout,
    /// Silence between fragments exceeded the inter-fragment deadline.
    GapTimeout,
    /// An error fragment arrived after content; it was appended as a suffix.
    UpstreamReported { code: String, message: String },
    /// The caller (or the client behind the sink) went away.
    Cancelled,
}

impl Outcome {
    /// Whether a caller may re-run the session with a fresh source.
    ///
    /// `has_content` reports whether the failed attempt produced any chat or
    /// reasoning text.
    pub fn is_retryable(&self, has_content: bool) -> bool {
        match self {
            Self::EmptyResponse | Self::InitialTimeout => true,
            Self::GapTimeout => !has_content,
            Self::Completed | Self::UpstreamReported { .. } | Self::Cancelled => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::InitialTimeout | Self::GapTimeout)
    }
}

/// Reasoning captured during a session, whether or not it was emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThinkingRecord {
    /// Reasoning text with any `<think>` delimiters removed.
    pub content: String,
    /// Time from session start to the first committed answer byte.
    pub elapsed: Option<Duration>,
}

/// Everything a finished session hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// Answer text, as flushed on the chat channel.
    pub answer: String,
    /// Raw concatenation of every text delta (plus any error suffix).
    pub reply_text: String,
    pub thinking: ThinkingRecord,
    pub outcome: Outcome,
}

impl Reconciled {
    /// True when the session produced any answer or reasoning text.
    pub fn has_content(&self) -> bool {
        !self.answer.is_empty() || !self.thinking.content.is_empty()
    }

    pub fn is_retryable(&self) -> bool {
        self.outcome.is_retryable(self.has_content())
    }
}
