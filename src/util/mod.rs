//! Caller-side utilities built on session outcomes.

pub mod retry;
