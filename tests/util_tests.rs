//! Tests for the caller-side retry helper.

mod common;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::*;
use reasonflow::types::{Fragment, Outcome};
use reasonflow::util::retry::RetryPolicy;

fn policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff: Duration::from_millis(100),
        max_backoff: Duration::from_millis(100),
        multiplier: 2.0,
    }
}

#[tokio::test(start_paused = true)]
async fn retries_empty_responses_until_content_arrives() {
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();

    let result = policy(4)
        .execute(|attempt| {
            counter.fetch_add(1, Ordering::SeqCst);
            let fragments = if attempt < 2 {
                vec![Fragment::error("503", "cold start")]
            } else {
                texts(&["Warm now"])
            };
            async move { run(fragments, true).await.1 }
        })
        .await;

    assert_eq!(result.outcome, Outcome::Completed);
    assert_eq!(result.answer, "Warm now");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_max_attempts() {
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();

    let result = policy(3)
        .execute(|_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { run(vec![], true).await.1 }
        })
        .await;

    assert_eq!(result.outcome, Outcome::EmptyResponse);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn does_not_retry_once_content_was_produced() {
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();

    let result = policy(5)
        .execute(|_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async {
                run(
                    vec![Fragment::text("Some text"), Fragment::error("500", "reset")],
                    true,
                )
                .await
                .1
            }
        })
        .await;

    assert!(matches!(result.outcome, Outcome::UpstreamReported { .. }));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn zero_attempts_still_runs_once() {
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();

    let result = policy(0)
        .execute(|_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { run(vec![], true).await.1 }
        })
        .await;

    assert_eq!(result.outcome, Outcome::EmptyResponse);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn runaway_multiplier_is_capped_by_max_backoff() {
    let policy = RetryPolicy {
        max_attempts: 4,
        initial_backoff: Duration::from_secs(1),
        max_backoff: Duration::from_secs(5),
        multiplier: f64::MAX,
    };
    let start = tokio::time::Instant::now();

    let result = policy.execute(|_| async { run(vec![], true).await.1 }).await;

    assert_eq!(result.outcome, Outcome::EmptyResponse);
    // One pause of about 1s, then two capped at about 5s each.
    assert!(start.elapsed() <= Duration::from_millis(1250 + 2 * 6250));
}
