//! Utility splitting and empty-file reduction.

pub mod reduce;
pub mod splitter;

pub use reduce::{reduce, ReduceSummary};
pub use splitter::{split, SplitOutcome};
