//! The session loop: races the fragment source against the watchdog and
//! cancellation, and drives the sink.

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ReconcileConfig;
use crate::error::{FlowError, Result};
use crate::sink::EventSink;
use crate::types::{
    ContentDelta, ControlEvent, DeltaCategory, Fragment, Outcome, Reconciled, SinkEvent,
};

use super::session::{LoopState, Session};
use super::watchdog::{WatchPhase, Watchdog};

/// Reconcile one fragment stream into chat and reasoning deltas on `sink`.
///
/// Never fails: every way a session can end is reported through
/// [`Reconciled::outcome`] together with whatever text was accumulated.
/// Events already handed to the sink are final.
pub async fn reconcile<S, K>(
    fragments: S,
    sink: &mut K,
    config: &ReconcileConfig,
    cancel: &CancellationToken,
) -> Reconciled
where
    S: Stream<Item = Result<Fragment>>,
    K: EventSink + ?Sized,
{
    let mut fragments = std::pin::pin!(fragments);
    let mut session = Session::new(config.reasoning_enabled);
    let mut emitter = Emitter::new(sink, &config.model);
    let mut watchdog = Watchdog::new(config.initial_timeout, config.inter_fragment_timeout);

    let outcome = match emitter.control(ControlEvent::thinking()) {
        Ok(()) => {
            session.set_state(LoopState::Detecting);
            run(&mut session, &mut emitter, &mut watchdog, &mut fragments, cancel).await
        }
        Err(err) => sink_gone(err),
    };

    session.set_state(LoopState::Done);
    debug!(
        outcome = %outcome,
        mode = %session.mode(),
        reply_len = session.reply_text().len(),
        chat_len = session.chat_written().len(),
        reasoning_len = session.reasoning_written().len(),
        deltas = emitter.next_id,
        "reconcile session finished"
    );
    session.into_reconciled(outcome)
}

async fn run<S, K>(
    session: &mut Session,
    emitter: &mut Emitter<'_, K>,
    watchdog: &mut Watchdog,
    fragments: &mut std::pin::Pin<&mut S>,
    cancel: &CancellationToken,
) -> Outcome
where
    S: Stream<Item = Result<Fragment>>,
    K: EventSink + ?Sized,
{
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(mode = %session.mode(), "reconcile session cancelled");
                return Outcome::Cancelled;
            }
            next = fragments.next() => next,
            phase = watchdog.expired() => {
                return timeout_outcome(phase, session);
            }
        };

        let fragment = match next {
            None => return drain(session, emitter).unwrap_or_else(sink_gone),
            Some(Ok(fragment)) => fragment,
            Some(Err(err)) => {
                let (code, message) = match err {
                    FlowError::Upstream { code, message } => (code, message),
                    other => ("stream_error".to_string(), other.to_string()),
                };
                return upstream_failure(session, emitter, code, message)
                    .unwrap_or_else(sink_gone);
            }
        };

        watchdog.on_fragment();
        session.ingest(&fragment);
        if session.state() == LoopState::Detecting && session.mode().is_decided() {
            session.set_state(LoopState::Streaming);
        }
        if let Err(err) = flush(session, emitter) {
            return sink_gone(err);
        }

        if fragment.is_error() {
            return upstream_failure(session, emitter, fragment.error_code, fragment.error_message)
                .unwrap_or_else(sink_gone);
        }
    }
}

/// Hand pending reasoning, then pending chat, to the sink. The first chat
/// delta of a session is preceded by `thinking-done`.
fn flush<K>(session: &mut Session, emitter: &mut Emitter<'_, K>) -> Result<()>
where
    K: EventSink + ?Sized,
{
    if let Some(reasoning) = session.take_reasoning() {
        emitter.delta(DeltaCategory::Reasoning, reasoning)?;
    }

    let first = session.first_chat_pending();
    if let Some(chat) = session.take_chat() {
        if first {
            let elapsed = session.thinking_elapsed().unwrap_or_default();
            emitter.control(ControlEvent::thinking_done(elapsed.as_secs_f64()))?;
        }
        emitter.delta(DeltaCategory::Chat, chat)?;
    }
    Ok(())
}

/// Source closed: settle the mode, flush, and fall back to the reasoning as
/// the answer when the model produced nothing else.
fn drain<K>(session: &mut Session, emitter: &mut Emitter<'_, K>) -> Result<Outcome>
where
    K: EventSink + ?Sized,
{
    session.set_state(LoopState::Draining);
    session.force_mode();
    flush(session, emitter)?;

    if session.promote_reasoning_to_chat() {
        debug!("no answer text produced, promoting reasoning to answer");
        flush(session, emitter)?;
    }

    if session.chat_written().is_empty() {
        warn!("upstream closed without producing any content");
        Ok(Outcome::EmptyResponse)
    } else {
        Ok(Outcome::Completed)
    }
}

fn upstream_failure<K>(
    session: &mut Session,
    emitter: &mut Emitter<'_, K>,
    code: String,
    message: String,
) -> Result<Outcome>
where
    K: EventSink + ?Sized,
{
    session.set_state(LoopState::Draining);
    session.force_mode();
    flush(session, emitter)?;

    if session.nothing_produced() {
        warn!(code = %code, message = %message, "upstream error before any output");
        return Ok(Outcome::EmptyResponse);
    }

    warn!(code = %code, message = %message, "upstream error after output, appending notice");
    session.append_error_suffix(&code, &message);
    flush(session, emitter)?;
    Ok(Outcome::UpstreamReported { code, message })
}

fn timeout_outcome(phase: WatchPhase, session: &Session) -> Outcome {
    warn!(
        phase = %phase,
        mode = %session.mode(),
        reply_len = session.reply_text().len(),
        "upstream stalled"
    );
    match phase {
        WatchPhase::Initial => Outcome::InitialTimeout,
        WatchPhase::Gap => Outcome::GapTimeout,
    }
}

fn sink_gone(err: FlowError) -> Outcome {
    warn!(error = %err, "sink rejected event, stopping session");
    Outcome::Cancelled
}

/// Stamps ids and the model name onto outgoing deltas.
struct Emitter<'a, K: ?Sized> {
    sink: &'a mut K,
    model: &'a str,
    next_id: u64,
}

impl<'a, K: EventSink + ?Sized> Emitter<'a, K> {
    fn new(sink: &'a mut K, model: &'a str) -> Self {
        Self {
            sink,
            model,
            next_id: 0,
        }
    }

    fn control(&mut self, event: ControlEvent) -> Result<()> {
        self.sink.send(SinkEvent::Control(event))
    }

    fn delta(&mut self, category: DeltaCategory, content: String) -> Result<()> {
        debug_assert!(!content.is_empty());
        let id = self.next_id;
        self.next_id += 1;
        self.sink.send(SinkEvent::Delta(ContentDelta {
            id,
            category,
            content,
            model: self.model.to_string(),
        }))
    }
}
