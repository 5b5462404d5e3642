//! Events handed to an output sink.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Kind of control event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ControlKind {
    /// The session started and the model is working.
    Thinking,
    /// The first answer byte is about to be emitted.
    ThinkingDone,
}

/// Control event: `{ "type": ..., "timeConsumedSeconds"?: ... }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ControlEvent {
    #[serde(rename = "type")]
    pub kind: ControlKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_consumed_seconds: Option<f64>,
}

impl ControlEvent {
    pub fn thinking() -> Self {
        Self {
            kind: ControlKind::Thinking,
            time_consumed_seconds: None,
        }
    }

    pub fn thinking_done(seconds: f64) -> Self {
        Self {
            kind: ControlKind::ThinkingDone,
            time_consumed_seconds: Some(seconds),
        }
    }
}

/// Channel a content delta belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeltaCategory {
    Chat,
    Reasoning,
}

/// Content-delta event. `id` increases monotonically within a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentDelta {
    pub id: u64,
    pub category: DeltaCategory,
    pub content: String,
    pub model: String,
}

/// Anything the reconciliation loop hands to a sink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SinkEvent {
    Control(ControlEvent),
    Delta(ContentDelta),
}

impl SinkEvent {
    /// Delta payload, if this is a content delta of the given category.
    pub fn delta_content(&self, category: DeltaCategory) -> Option<&str> {
        match self {
            Self::Delta(delta) if delta.category == category => Some(&delta.content),
            _ => None,
        }
    }

    pub fn control_kind(&self) -> Option<ControlKind> {
        match self {
            Self::Control(control) => Some(control.kind),
            Self::Delta(_) => None,
        }
    }
}
