//! Convenience re-exports for common use.

pub use crate::config::ReconcileConfig;
pub use crate::error::{FlowError, Result};
pub use crate::reconcile::{reconcile, spawn_session, ReasoningMode};
pub use crate::sink::{ChannelSink, CollectingSink, EventSink, SseSink};
pub use crate::source::FragmentStream;
pub use crate::types::{
    ContentDelta, ControlEvent, ControlKind, DeltaCategory, Fragment, Outcome, Reconciled,
    SinkEvent, ThinkingRecord,
};
pub use crate::util::retry::RetryPolicy;
pub use tokio_util::sync::CancellationToken;
