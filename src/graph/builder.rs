//! Dependency graph builder: `@import` directives -> parent/child edges.

use std::path::Path;

use crate::ast::NodeId;
use crate::css::import;
use crate::resolve::Resolver;
use crate::sheet::{Registry, SheetId};

/// Counts from one graph-building pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphSummary {
    /// Imports recorded as edges.
    pub edges: usize,
    /// Imports whose specifier could not be resolved.
    pub unresolved: usize,
    /// Imports resolved to a file outside the registry.
    pub untracked: usize,
    /// Imports whose parameters could not be read.
    pub malformed: usize,
}

/// Record every `@import` of every registered stylesheet as an edge on the
/// imported stylesheet.
///
/// For each directive that resolves to a registered stylesheet, the directive
/// joins the target's `import_rules`, the importer joins its `parents`, and
/// every `layer(<name>)` modifier is declared on the target. Anonymous
/// stylesheets resolve relative to `base_dir`.
pub fn build_graph(registry: &mut Registry, resolver: &dyn Resolver, base_dir: &Path) -> GraphSummary {
    let mut summary = GraphSummary::default();

    for source in registry.ids() {
        let Some(sheet) = registry.get(source) else {
            continue;
        };
        let dir = sheet.dir().unwrap_or(base_dir).to_path_buf();
        let imports = registry
            .ast()
            .find_all(sheet.root, |data| data.is_import());

        for node in imports {
            match link_import(registry, resolver, source, node, &dir) {
                Link::Edge => summary.edges += 1,
                Link::Unresolved => summary.unresolved += 1,
                Link::Untracked => summary.untracked += 1,
                Link::Malformed => summary.malformed += 1,
            }
        }
    }

    tracing::debug!(
        edges = summary.edges,
        unresolved = summary.unresolved,
        untracked = summary.untracked,
        malformed = summary.malformed,
        "Built import graph"
    );
    summary
}

enum Link {
    Edge,
    Unresolved,
    Untracked,
    Malformed,
}

fn link_import(
    registry: &mut Registry,
    resolver: &dyn Resolver,
    source: SheetId,
    node: NodeId,
    dir: &Path,
) -> Link {
    let Some(params) = registry.ast().get(node).and_then(|data| data.params()) else {
        return Link::Malformed;
    };
    let Some(specifier) = import::specifier(params) else {
        tracing::debug!(params, "Skipping @import with unreadable parameters");
        return Link::Malformed;
    };
    let layers = import::layers(params);

    let Some(resolved) = resolver.resolve(specifier, dir) else {
        tracing::warn!(specifier, base = %dir.display(), "Could not resolve @import");
        return Link::Unresolved;
    };
    let Some(target) = registry.id_for_path(&resolved) else {
        tracing::trace!(path = %resolved.display(), "Import points outside the stylesheet set");
        return Link::Untracked;
    };

    if let Some(sheet) = registry.get_mut(target) {
        sheet.import_rules.insert(node);
        sheet.parents.insert(source);
        for layer in layers {
            sheet.declare_layer(layer);
        }
    }
    Link::Edge
}
