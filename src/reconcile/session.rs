//! Per-request reconciliation state.

use std::time::Duration;

use strum::Display;
use tokio::time::Instant;

use crate::types::{Fragment, Outcome, Reconciled, ThinkingRecord};

use super::diff::residual;
use super::mode::{self, ReasoningMode};
use super::think::{self, ThinkSplit};

/// Where the session loop is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum LoopState {
    Idle,
    Detecting,
    Streaming,
    Draining,
    Done,
}

/// Mutable state of one in-flight request.
///
/// Owned by the loop driving it and never shared. Bytes move from
/// `reply_text` into one of the two pending buffers, and from there into the
/// matching `*_written` string once the loop hands them to the sink.
#[derive(Debug)]
pub struct Session {
    reply_text: String,
    mode: ReasoningMode,
    state: LoopState,
    chat_buffer: String,
    reasoning_buffer: String,
    chat_written: String,
    /// Reasoning handed to the sink. Stays empty when reasoning is disabled.
    reasoning_written: String,
    /// Reasoning moved out of the buffer, emitted or suppressed. Diff base.
    reasoning_committed: String,
    /// Full reasoning content known so far, in channel form.
    reasoning_full: String,
    /// Reasoning with think delimiters removed.
    thinking_content: String,
    /// Offset into `reply_text` up to which bytes went to the chat buffer.
    chat_cursor: usize,
    think_closed: bool,
    ignored_side_channel: bool,
    reasoning_enabled: bool,
    started: Instant,
    thinking_elapsed: Option<Duration>,
}

impl Session {
    pub fn new(reasoning_enabled: bool) -> Self {
        Self {
            reply_text: String::new(),
            mode: ReasoningMode::Unset,
            state: LoopState::Idle,
            chat_buffer: String::new(),
            reasoning_buffer: String::new(),
            chat_written: String::new(),
            reasoning_written: String::new(),
            reasoning_committed: String::new(),
            reasoning_full: String::new(),
            thinking_content: String::new(),
            chat_cursor: 0,
            think_closed: false,
            ignored_side_channel: false,
            reasoning_enabled,
            started: Instant::now(),
            thinking_elapsed: None,
        }
    }

    pub fn mode(&self) -> ReasoningMode {
        self.mode
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: LoopState) {
        self.state = state;
    }

    pub fn reply_text(&self) -> &str {
        &self.reply_text
    }

    pub fn chat_written(&self) -> &str {
        &self.chat_written
    }

    pub fn reasoning_written(&self) -> &str {
        &self.reasoning_written
    }

    pub fn thinking_elapsed(&self) -> Option<Duration> {
        self.thinking_elapsed
    }

    /// No answer text was emitted and no reasoning was produced. Reasoning
    /// counts even when its output is disabled.
    pub fn nothing_produced(&self) -> bool {
        self.chat_written.is_empty() && self.reasoning_committed.is_empty()
    }

    /// Absorb one fragment: grow the reply, decide the mode if possible,
    /// and route new bytes into the pending buffers.
    pub fn ingest(&mut self, fragment: &Fragment) {
        self.reply_text.push_str(&fragment.text);

        if !self.mode.is_decided() {
            let detected = mode::detect(&self.reply_text, &fragment.reasoning_text);
            if detected.is_decided() {
                self.decide(detected);
            }
        }

        self.route(&fragment.reasoning_text);
    }

    /// Decide the mode from whatever arrived. No-op once decided.
    pub fn force_mode(&mut self) {
        if !self.mode.is_decided() {
            self.decide(mode::force(&self.reply_text));
            self.route("");
        }
    }

    fn decide(&mut self, mode: ReasoningMode) {
        tracing::debug!(mode = %mode, reply_len = self.reply_text.len(), "reasoning mode decided");
        self.mode = mode;
    }

    fn route(&mut self, reasoning_delta: &str) {
        match self.mode {
            ReasoningMode::Unset => {}
            ReasoningMode::Api | ReasoningMode::None => self.route_side_channel(reasoning_delta),
            ReasoningMode::Think => self.route_think_tags(reasoning_delta),
        }
    }

    /// Text is answer; reasoning arrives on the fragment's own field.
    fn route_side_channel(&mut self, reasoning_delta: &str) {
        self.take_chat_tail();
        if !reasoning_delta.is_empty() {
            self.reasoning_full.push_str(reasoning_delta);
            self.thinking_content.push_str(reasoning_delta);
            self.stage_reasoning();
        }
    }

    /// Reasoning sits inside the first think block of the reply text.
    fn route_think_tags(&mut self, reasoning_delta: &str) {
        if !reasoning_delta.is_empty() && !self.ignored_side_channel {
            tracing::debug!("ignoring side-channel reasoning in think-tag mode");
            self.ignored_side_channel = true;
        }

        if self.think_closed {
            self.take_chat_tail();
            return;
        }

        match think::split(&self.reply_text) {
            ThinkSplit::NoTag => self.take_chat_tail(),
            ThinkSplit::Open { reasoning, inner } => {
                self.reasoning_full = reasoning.to_string();
                self.thinking_content = inner.to_string();
                self.stage_reasoning();
            }
            ThinkSplit::Closed {
                reasoning,
                inner,
                answer,
            } => {
                self.reasoning_full = reasoning.to_string();
                self.thinking_content = inner.to_string();
                self.chat_buffer.push_str(answer);
                self.chat_cursor = self.reply_text.len();
                self.think_closed = true;
                tracing::debug!(
                    reasoning_len = self.thinking_content.len(),
                    "think block closed"
                );
                self.stage_reasoning();
            }
        }
    }

    fn take_chat_tail(&mut self) {
        if self.chat_cursor < self.reply_text.len() {
            self.chat_buffer.push_str(&self.reply_text[self.chat_cursor..]);
            self.chat_cursor = self.reply_text.len();
        }
    }

    fn stage_reasoning(&mut self) {
        let tail = residual(&self.reasoning_full, &self.reasoning_committed);
        if !tail.is_empty() {
            self.reasoning_buffer.push_str(tail);
            self.reasoning_committed.push_str(tail);
        }
    }

    /// Pending reasoning, if any. Returns `None` when empty or when
    /// reasoning output is disabled (the bytes stay tracked either way).
    pub fn take_reasoning(&mut self) -> Option<String> {
        if self.reasoning_buffer.is_empty() {
            return None;
        }
        let pending = std::mem::take(&mut self.reasoning_buffer);
        if !self.reasoning_enabled {
            return None;
        }
        self.reasoning_written.push_str(&pending);
        Some(pending)
    }

    /// Pending chat text, if any. The first call that returns text stamps
    /// the thinking time.
    pub fn take_chat(&mut self) -> Option<String> {
        if self.chat_buffer.is_empty() {
            return None;
        }
        let pending = std::mem::take(&mut self.chat_buffer);
        if self.thinking_elapsed.is_none() {
            self.thinking_elapsed = Some(self.started.elapsed());
        }
        self.chat_written.push_str(&pending);
        Some(pending)
    }

    /// True when this chat flush is the first one of the session.
    pub fn first_chat_pending(&self) -> bool {
        self.chat_written.is_empty() && !self.chat_buffer.is_empty()
    }

    /// When no answer was ever produced, promote the whole reasoning content
    /// to the chat buffer. Returns whether anything was promoted.
    pub fn promote_reasoning_to_chat(&mut self) -> bool {
        if !self.chat_written.is_empty() || !self.chat_buffer.is_empty() {
            return false;
        }
        if self.reasoning_full.is_empty() {
            return false;
        }
        self.chat_buffer = self.reasoning_full.clone();
        true
    }

    /// Append a visible error suffix to the reply and stage it as chat.
    pub fn append_error_suffix(&mut self, code: &str, message: &str) {
        let suffix = error_suffix(code, message);
        self.reply_text.push_str(&suffix);
        self.chat_cursor = self.reply_text.len();
        self.chat_buffer.push_str(&suffix);
    }

    pub fn into_reconciled(self, outcome: Outcome) -> Reconciled {
        Reconciled {
            answer: self.chat_written,
            reply_text: self.reply_text,
            thinking: ThinkingRecord {
                content: self.thinking_content,
                elapsed: self.thinking_elapsed,
            },
            outcome,
        }
    }
}

fn error_suffix(code: &str, message: &str) -> String {
    if message.is_empty() {
        format!("\n\n[upstream error: {code}]")
    } else {
        format!("\n\n[upstream error {code}: {message}]")
    }
}
