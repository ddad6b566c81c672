//! Arena-backed CSS tree shared by every stylesheet.

pub mod node;
pub mod tree;

pub use node::{ImportOrigin, NodeData, NodeId, NodeKind, Span};
pub use tree::{Ast, Walk};
