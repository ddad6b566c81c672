//! Per-stylesheet tree transforms.
//!
//! The migration core only moves utility definitions between files. Rewrites
//! inside a single stylesheet (turning legacy layer blocks into utility
//! definitions, for instance) are [`SheetTransform`]s run by a
//! [`TransformPipeline`] before splitting, once layer membership is known.
//!
//! # Example
//!
//! ```ignore
//! use layersplit::transform::{SheetTransform, TransformContext, TransformPipeline};
//!
//! struct DropComments;
//!
//! impl SheetTransform for DropComments {
//!     fn name(&self) -> &str { "drop-comments" }
//!
//!     fn transform(&self, ast: &mut Ast, root: NodeId, _ctx: &TransformContext<'_>) -> Result<()> {
//!         for id in ast.find_all(root, |data| matches!(data.kind, NodeKind::Comment(_))) {
//!             ast.remove(id);
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut pipeline = TransformPipeline::new();
//! pipeline.push(Box::new(DropComments));
//! ```

pub mod layer_utilities;

use std::collections::BTreeSet;
use std::path::Path;

use crate::ast::{Ast, NodeId};
use crate::config::SplitConfig;
use crate::error::Result;

pub use layer_utilities::LayerUtilities;

/// What a transform may know about the stylesheet it rewrites.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    /// File being migrated; `None` for in-memory content.
    pub file: Option<&'a Path>,
    /// Effective layers of the stylesheet (own and inherited).
    pub layers: &'a BTreeSet<String>,
    pub config: &'a SplitConfig,
}

/// A rewrite of one stylesheet's tree.
pub trait SheetTransform {
    /// Human-readable name for this transform.
    ///
    /// Used for logging and error messages.
    fn name(&self) -> &str;

    /// Rewrite the tree under `root` in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the stylesheet cannot be rewritten. The migration
    /// stops on the first error.
    fn transform(&self, ast: &mut Ast, root: NodeId, ctx: &TransformContext<'_>) -> Result<()>;
}

/// A pipeline of transforms to execute in order.
pub struct TransformPipeline {
    transforms: Vec<Box<dyn SheetTransform>>,
}

impl TransformPipeline {
    /// Create a new empty pipeline.
    pub fn new() -> Self {
        Self {
            transforms: Vec::new(),
        }
    }

    /// The built-in transforms.
    pub fn standard() -> Self {
        let mut pipeline = Self::new();
        pipeline.push(Box::new(LayerUtilities));
        pipeline
    }

    /// Add a transform. Transforms run in the order they are added.
    pub fn push(&mut self, transform: Box<dyn SheetTransform>) {
        self.transforms.push(transform);
    }

    /// Add multiple transforms to the pipeline.
    pub fn extend(&mut self, transforms: impl IntoIterator<Item = Box<dyn SheetTransform>>) {
        self.transforms.extend(transforms);
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Execute all transforms in insertion order.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered. Execution stops on error.
    pub fn execute(&self, ast: &mut Ast, root: NodeId, ctx: &TransformContext<'_>) -> Result<()> {
        for transform in &self.transforms {
            tracing::debug!(
                transform = transform.name(),
                file = ?ctx.file,
                "Running transform"
            );
            transform.transform(ast, root, ctx)?;
        }
        Ok(())
    }

    /// Names of all transforms in execution order.
    pub fn transform_names(&self) -> Vec<&str> {
        self.transforms.iter().map(|t| t.name()).collect()
    }
}

impl Default for TransformPipeline {
    fn default() -> Self {
        Self::new()
    }
}
