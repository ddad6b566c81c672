//! # layersplit
//!
//! Splits utility definitions out of layered stylesheets.
//!
//! Given a set of stylesheets connected by `@import`, layersplit works out which
//! cascade layers every stylesheet belongs to (a stylesheet inherits the
//! `layer(...)` of every import chain that reaches it), moves the `@utility`
//! definitions of stylesheets in the `utilities` and `components` layers into
//! sibling `*.utilities.css` files, imports those files wherever the originals
//! are imported, and removes stylesheets that end up empty.
//!
//! ## Core Systems
//!
//! - **[`ast`]** - Slotmap-backed CSS tree arena with tree operations
//! - **[`css`]** - Tokenizer, parser, printer and `@import` parameter handling
//! - **[`sheet`]** - Stylesheet records and the path-keyed registry
//! - **[`resolve`]** - Import resolution (filesystem and in-memory)
//! - **[`graph`]** - Import graph building and layer propagation
//! - **[`transform`]** - Per-stylesheet rewrite passes
//! - **[`split`]** - Utility splitting and empty-file reduction
//! - **[`migrate`]** - Runs the passes in order and plans file changes
//! - **[`config`]** - TOML configuration
//! - **[`testing`]** - In-memory projects and snapshot helpers

// Foundation
pub mod error;
pub mod paths;

// Core systems
pub mod ast;
pub mod css;
pub mod resolve;
pub mod sheet;

// Passes
pub mod graph;
pub mod split;
pub mod transform;

// Orchestration
pub mod config;
pub mod migrate;

pub mod testing;

pub use error::{MigrateError, Result};
pub use migrate::{FileOp, Migration, MigrationReport};
