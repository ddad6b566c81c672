//! The stylesheet record.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use slotmap::new_key_type;

use crate::ast::NodeId;

new_key_type! {
    /// Stable identifier of a stylesheet in the [`Registry`](super::Registry).
    pub struct SheetId;
}

/// One participating stylesheet.
///
/// Graph fields are filled in by the passes in order: the graph builder sets
/// `import_rules`, `parents` and `own_layers`; layer propagation completes
/// `layers`; the splitter creates derived stylesheets; the reducer sets
/// `unlink`.
#[derive(Debug, Clone)]
pub struct Stylesheet {
    /// Absolute, normalized path. `None` for anonymous in-memory content.
    pub file: Option<PathBuf>,
    /// Last-known serialized text.
    pub content: String,
    /// Printed form of the tree at load time, used to detect changes.
    pub baseline: String,
    /// Root node in the shared [`Ast`](crate::ast::Ast).
    pub root: NodeId,
    /// Layers named on imports that point at this stylesheet.
    pub own_layers: BTreeSet<String>,
    /// Own layers plus every layer inherited from ancestors.
    pub layers: BTreeSet<String>,
    /// `@import` nodes, in importing stylesheets, that point at this one.
    pub import_rules: BTreeSet<NodeId>,
    /// Stylesheets that import this one directly.
    pub parents: BTreeSet<SheetId>,
    /// Marked for deletion.
    pub unlink: bool,
    /// Synthesized by the splitter.
    pub derived: bool,
}

impl Stylesheet {
    pub fn new(file: Option<PathBuf>, content: impl Into<String>, root: NodeId) -> Self {
        Self {
            file,
            content: content.into(),
            baseline: String::new(),
            root,
            own_layers: BTreeSet::new(),
            layers: BTreeSet::new(),
            import_rules: BTreeSet::new(),
            parents: BTreeSet::new(),
            unlink: false,
            derived: false,
        }
    }

    /// Directory containing the file, if any.
    pub fn dir(&self) -> Option<&Path> {
        self.file.as_deref().and_then(Path::parent)
    }

    /// Record a layer declared on an import of this stylesheet.
    pub fn declare_layer(&mut self, layer: impl Into<String>) {
        let layer = layer.into();
        self.own_layers.insert(layer.clone());
        self.layers.insert(layer);
    }

    /// Whether this stylesheet is a member of any of `names`.
    pub fn in_any_layer<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|name| self.layers.contains(name.as_ref()))
    }

    /// Human-readable identity for logs.
    pub fn label(&self) -> String {
        self.file
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<anonymous>".to_string())
    }
}
