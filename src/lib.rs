//! reasonflow: streaming answer reconciliation for LLM backends.
//!
//! Takes the incremental fragment stream of a language model and re-emits
//! it as two channels, reasoning and final answer, whichever way the model
//! delivers its reasoning (side-channel field, inline `<think>` block, or
//! not at all). Emitted content is never duplicated or retracted, and stalls
//! are classified so callers can decide whether to retry.
//!
//! # Quick Start
//!
//! ```no_run
//! use reasonflow::prelude::*;
//! use reasonflow::source::from_fragments;
//!
//! # async fn example() -> reasonflow::error::Result<()> {
//! let config = ReconcileConfig::from_env()?;
//! let source = from_fragments(vec![Fragment::reasoning("Hm."), Fragment::text("Hi!")]);
//! let mut sink = CollectingSink::new();
//! let result = reconcile(source, &mut sink, &config, &CancellationToken::new()).await;
//! println!("{} ({})", result.answer, result.outcome);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod prelude;
pub mod reconcile;
pub mod sink;
pub mod source;
pub mod types;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
