//! Import graph: edges from `@import` directives, then layer propagation.

pub mod builder;
pub mod layers;

pub use builder::{build_graph, GraphSummary};
pub use layers::{propagate_layers, Ancestry};
