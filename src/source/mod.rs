//! Fragment sources: adapters that turn upstream output into
//! [`Fragment`] streams for the reconciliation loop.

pub mod jsonl;
pub mod sse;

use futures::stream::{self, BoxStream};
use futures::StreamExt;

use crate::error::Result;
use crate::types::Fragment;

/// Boxed fragment stream, the shape every adapter here produces.
pub type FragmentStream = BoxStream<'static, Result<Fragment>>;

/// In-memory source yielding the given fragments, then closing.
pub fn from_fragments(fragments: Vec<Fragment>) -> FragmentStream {
    stream::iter(fragments.into_iter().map(Ok)).boxed()
}
