//! Stylesheet records and the registry that owns them.

pub mod registry;
pub mod stylesheet;

pub use registry::Registry;
pub use stylesheet::{SheetId, Stylesheet};
