//! Streaming answer reconciliation.
//!
//! Consumes an upstream fragment stream and re-emits it as two channels,
//! reasoning and answer, whatever shape the upstream uses for reasoning:
//!
//! - a separate reasoning field on each fragment ([`ReasoningMode::Api`]),
//! - a `<think>...</think>` block at the start of the answer text
//!   ([`ReasoningMode::Think`]),
//! - no reasoning at all ([`ReasoningMode::None`]).
//!
//! # Example
//!
//! ```
//! use reasonflow::config::ReconcileConfig;
//! use reasonflow::reconcile::reconcile;
//! use reasonflow::sink::CollectingSink;
//! use reasonflow::source::from_fragments;
//! use reasonflow::types::{Fragment, Outcome};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let source = from_fragments(vec![
//!     Fragment::text("<think>Great!</think>"),
//!     Fragment::text("Hello, world"),
//! ]);
//! let mut sink = CollectingSink::new();
//! let config = ReconcileConfig::default();
//! let result = reconcile(source, &mut sink, &config, &CancellationToken::new()).await;
//!
//! assert_eq!(result.outcome, Outcome::Completed);
//! assert_eq!(sink.chat(), "Hello, world");
//! assert_eq!(sink.reasoning(), "<think>Great!</think>");
//! assert_eq!(result.thinking.content, "Great!");
//! # }
//! ```

pub mod diff;
pub mod mode;
pub mod runner;
pub mod session;
pub mod think;
pub mod watchdog;

pub use mode::{ReasoningMode, THINK_CLOSE, THINK_OPEN};
pub use runner::reconcile;
pub use session::{LoopState, Session};
pub use watchdog::{WatchPhase, Watchdog};

use futures::Stream;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::config::ReconcileConfig;
use crate::error::Result;
use crate::sink::ChannelSink;
use crate::types::{Fragment, Reconciled, SinkEvent};

/// Run a session on its own task.
///
/// Returns the event stream for the client side and a handle resolving to
/// the session result. Dropping the event stream makes the session stop at
/// its next write.
pub fn spawn_session<S>(
    fragments: S,
    config: ReconcileConfig,
    cancel: CancellationToken,
) -> (UnboundedReceiverStream<SinkEvent>, JoinHandle<Reconciled>)
where
    S: Stream<Item = Result<Fragment>> + Send + 'static,
{
    let (mut sink, rx) = ChannelSink::channel();
    let handle =
        tokio::spawn(async move { reconcile(fragments, &mut sink, &config, &cancel).await });
    (UnboundedReceiverStream::new(rx), handle)
}
