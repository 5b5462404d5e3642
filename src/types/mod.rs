//! Core types for reasonflow.

pub mod fragment;
pub mod outcome;
pub mod stream;

pub use fragment::*;
pub use outcome::*;
pub use stream::*;
