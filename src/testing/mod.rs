//! Testing helpers: in-memory projects and snapshot rendering.
//!
//! Use a [`Project`] to run a migration over in-memory files without touching
//! the filesystem. Use [`render_plan`] and [`render_files`] to capture the
//! outcome as plain text for snapshot-style assertions.

pub mod project;
pub mod snapshot;

pub use project::{Migrated, Project};
pub use snapshot::{render_files, render_plan};
