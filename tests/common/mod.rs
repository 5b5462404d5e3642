//! Shared test helpers.

#![allow(dead_code)]

use std::time::Duration;

use futures::stream::{self, StreamExt};
use reasonflow::config::ReconcileConfig;
use reasonflow::reconcile::reconcile;
use reasonflow::sink::CollectingSink;
use reasonflow::source::{from_fragments, FragmentStream};
use reasonflow::types::{ControlKind, Fragment, Reconciled, SinkEvent};
use tokio_util::sync::CancellationToken;

pub fn config(reasoning_enabled: bool) -> ReconcileConfig {
    ReconcileConfig::builder()
        .initial_timeout(Duration::from_secs(120))
        .inter_fragment_timeout(Duration::from_secs(30))
        .reasoning_enabled(reasoning_enabled)
        .model("test-model")
        .build()
}

/// Run a session over the given fragments and collect everything emitted.
pub async fn run(
    fragments: Vec<Fragment>,
    reasoning_enabled: bool,
) -> (CollectingSink, Reconciled) {
    run_stream(from_fragments(fragments), &config(reasoning_enabled)).await
}

pub async fn run_stream(
    source: FragmentStream,
    config: &ReconcileConfig,
) -> (CollectingSink, Reconciled) {
    let mut sink = CollectingSink::new();
    let result = reconcile(source, &mut sink, config, &CancellationToken::new()).await;
    (sink, result)
}

/// Text fragments, then a source that never yields again.
pub fn then_silence(fragments: Vec<Fragment>) -> FragmentStream {
    stream::iter(fragments.into_iter().map(Ok))
        .chain(stream::pending())
        .boxed()
}

pub fn texts(parts: &[&str]) -> Vec<Fragment> {
    parts.iter().map(|p| Fragment::text(*p)).collect()
}

pub fn control_kinds(sink: &CollectingSink) -> Vec<ControlKind> {
    sink.events().iter().filter_map(SinkEvent::control_kind).collect()
}

pub fn strip_markers(text: &str) -> String {
    text.replace("<think>", "").replace("</think>", "")
}

/// Delta ids are 0, 1, 2, ... and no delta is empty.
pub fn assert_well_formed(sink: &CollectingSink) {
    let deltas: Vec<_> = sink
        .events()
        .iter()
        .filter_map(|event| match event {
            SinkEvent::Delta(delta) => Some(delta),
            SinkEvent::Control(_) => None,
        })
        .collect();
    for (expected, delta) in deltas.iter().enumerate() {
        assert_eq!(delta.id, expected as u64, "delta ids must be consecutive");
        assert!(!delta.content.is_empty(), "empty delta {}", delta.id);
        assert_eq!(delta.model, "test-model");
    }
}
