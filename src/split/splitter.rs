//! Utility splitter: moves utility definitions out of layered stylesheets
//! into derived sibling stylesheets and imports them where the originals are
//! imported.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::ast::{Ast, ImportOrigin, NodeData, NodeId};
use crate::config::SplitConfig;
use crate::css::import;
use crate::error::{MigrateError, Result};
use crate::paths::{derived_file_name, import_specifier, specifier_file_name};
use crate::sheet::{Registry, SheetId};

/// Result of a split pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOutcome {
    /// `(original, derived)` for every stylesheet that was split, in
    /// discovery order. Merged originals share a derived stylesheet.
    pub pairs: Vec<(SheetId, SheetId)>,
}

impl SplitOutcome {
    /// Derived stylesheet holding the utilities of `original`.
    pub fn derived_of(&self, original: SheetId) -> Option<SheetId> {
        self.pairs
            .iter()
            .find(|(o, _)| *o == original)
            .map(|&(_, derived)| derived)
    }

    /// Distinct derived stylesheets, in creation order.
    pub fn derived(&self) -> Vec<SheetId> {
        let mut out: Vec<SheetId> = Vec::new();
        for &(_, derived) in &self.pairs {
            if !out.contains(&derived) {
                out.push(derived);
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

enum Claim {
    New(PathBuf),
    Merge(SheetId),
}

/// Split every file-backed stylesheet that belongs to one of the configured
/// layers.
///
/// Utility at-rules are moved, in document order, into a derived stylesheet
/// next to the original (`a.css` -> `a.utilities.css`, named after the
/// specifier the original is imported with). Originals whose derived paths
/// coincide share one derived stylesheet; the later one's utilities go first.
/// Every import of an original then gets a plain import of the derived
/// stylesheet right after it, or inside the importer's own derived stylesheet
/// when the importer was split too.
///
/// A stylesheet holding nothing but utilities, imported only through plain
/// imports by importers that stay whole, is left in place: splitting it would
/// empty it and hand its path straight back to the same content.
pub fn split(registry: &mut Registry, config: &SplitConfig) -> Result<SplitOutcome> {
    // Decided up front: moving nodes changes what a stylesheet holds.
    let mut decided = HashMap::new();
    let originals: Vec<SheetId> = registry
        .ids()
        .into_iter()
        .filter(|&id| splits(registry, config, id, &mut decided))
        .collect();

    let mut outcome = SplitOutcome::default();
    let mut by_path: HashMap<PathBuf, SheetId> = HashMap::new();

    for original in originals {
        let utilities = utility_nodes(registry, original, config);

        let derived = match claim_path(registry, original, config, &by_path)? {
            Claim::New(path) => {
                let ast = registry.ast_mut();
                let derived_root = ast.create_root();
                for &node in &utilities {
                    ast.reparent(node, derived_root);
                }
                let derived = registry.add_root(path.clone(), derived_root)?;
                tracing::debug!(
                    original = %registry.sheet(original)?.label(),
                    derived = %path.display(),
                    utilities = utilities.len(),
                    "Split utilities"
                );
                by_path.insert(path, derived);
                derived
            }
            Claim::Merge(derived) => {
                let derived_root = registry.sheet(derived)?.root;
                let ast = registry.ast_mut();
                for (index, &node) in utilities.iter().enumerate() {
                    ast.move_to(node, derived_root, index);
                }
                let content = registry.to_css(derived);
                let sheet = registry.sheet_mut(derived)?;
                sheet.content = content;
                tracing::debug!(
                    derived = %sheet.label(),
                    utilities = utilities.len(),
                    "Merged utilities into existing derived stylesheet"
                );
                derived
            }
        };
        outcome.pairs.push((original, derived));
    }

    for &(original, derived) in &outcome.pairs {
        link_derived(registry, &outcome, original, derived)?;
    }
    Ok(outcome)
}

fn is_candidate(registry: &Registry, id: SheetId, config: &SplitConfig) -> bool {
    registry.get(id).is_some_and(|sheet| {
        sheet.file.is_some() && !sheet.unlink && !sheet.derived && sheet.in_any_layer(&config.layers)
    })
}

fn utility_nodes(registry: &Registry, id: SheetId, config: &SplitConfig) -> Vec<NodeId> {
    registry.get(id).map_or_else(Vec::new, |sheet| {
        registry
            .ast()
            .find_all(sheet.root, |data| data.is_at_rule(&config.at_rule))
    })
}

/// Whether `id` gets split. Memoized in `decided`; `None` marks a stylesheet
/// still being decided, which only a cyclic graph revisits.
fn splits(
    registry: &Registry,
    config: &SplitConfig,
    id: SheetId,
    decided: &mut HashMap<SheetId, Option<bool>>,
) -> bool {
    match decided.get(&id) {
        Some(Some(known)) => return *known,
        Some(None) => return false,
        None => {}
    }
    decided.insert(id, None);

    let utilities = utility_nodes(registry, id, config);
    let result = is_candidate(registry, id, config)
        && !utilities.is_empty()
        && !(holds_only(registry, id, &utilities)
            && only_plain_imports(registry, id)
            && !importers(registry, id)
                .into_iter()
                .any(|importer| splits(registry, config, importer, decided)));

    if !result && !utilities.is_empty() && is_candidate(registry, id, config) {
        tracing::debug!(
            sheet = %registry.get(id).map(|sheet| sheet.label()).unwrap_or_default(),
            "Stylesheet already holds only utilities, left in place"
        );
    }
    decided.insert(id, Some(result));
    result
}

/// Every top-level node of `id` is one of `nodes`.
fn holds_only(registry: &Registry, id: SheetId, nodes: &[NodeId]) -> bool {
    let Some(sheet) = registry.get(id) else {
        return false;
    };
    let children = registry.ast().children(sheet.root);
    !children.is_empty() && children.iter().all(|child| nodes.contains(child))
}

/// Every import of `id` already reads exactly like the import the reducer
/// would leave behind.
fn only_plain_imports(registry: &Registry, id: SheetId) -> bool {
    let ast = registry.ast();
    original_edges(registry, id).into_iter().all(|edge| {
        ast.get(edge).and_then(NodeData::params).is_some_and(|params| {
            import::specifier(params)
                .is_some_and(|spec| params.trim() == import::plain(spec, import::quote_of(params)))
        })
    })
}

fn importers(registry: &Registry, id: SheetId) -> Vec<SheetId> {
    original_edges(registry, id)
        .into_iter()
        .filter_map(|edge| registry.owner_of(edge))
        .collect()
}

/// Import directives pointing at `id` that the migration did not inject.
fn original_edges(registry: &Registry, id: SheetId) -> Vec<NodeId> {
    let Some(sheet) = registry.get(id) else {
        return Vec::new();
    };
    sheet
        .import_rules
        .iter()
        .copied()
        .filter(|&node| registry.ast().get(node).is_some_and(|data| !data.injected))
        .collect()
}

fn claim_path(
    registry: &Registry,
    original: SheetId,
    config: &SplitConfig,
    by_path: &HashMap<PathBuf, SheetId>,
) -> Result<Claim> {
    let sheet = registry.sheet(original)?;
    let file = sheet.file.as_deref().ok_or(MigrateError::MissingFile)?;
    let dir = file.parent().unwrap_or(Path::new(""));
    let ext = file.extension().and_then(|ext| ext.to_str());
    let name = import_name(registry, original).unwrap_or_else(|| {
        file.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let mut attempt = 0;
    loop {
        let path = dir.join(derived_file_name(&name, &config.suffix, ext, attempt));
        if let Some(&derived) = by_path.get(&path) {
            return Ok(Claim::Merge(derived));
        }
        if registry.id_for_path(&path).is_none() {
            return Ok(Claim::New(path));
        }
        attempt += 1;
    }
}

/// File name used by the first import of `original` that was not injected.
fn import_name(registry: &Registry, original: SheetId) -> Option<String> {
    let ast = registry.ast();
    registry
        .get(original)?
        .import_rules
        .iter()
        .filter_map(|&node| ast.get(node))
        .filter(|data| !data.injected)
        .filter_map(|data| import::specifier(data.params()?))
        .map(specifier_file_name)
        .find(|name| !matches!(*name, "" | "." | ".."))
        .map(str::to_string)
}

fn link_derived(
    registry: &mut Registry,
    outcome: &SplitOutcome,
    original: SheetId,
    derived: SheetId,
) -> Result<()> {
    let derived_file = registry
        .sheet(derived)?
        .file
        .clone()
        .ok_or(MigrateError::MissingFile)?;
    for edge in original_edges(registry, original) {
        let Some(importer) = registry.owner_of(edge) else {
            continue;
        };
        let Some(params) = registry.ast().get(edge).and_then(|data| data.params()) else {
            continue;
        };
        let Some(specifier) = import::specifier(params) else {
            continue;
        };
        let quote = import::quote_of(params);
        let origin = ImportOrigin {
            sheet: original,
            specifier: specifier.to_string(),
        };

        // A split importer carries the import in its own derived stylesheet.
        let host = outcome.derived_of(importer).filter(|&host| host != derived);
        let owner = host.unwrap_or(importer);
        let dir = registry.sheet(owner)?.dir().map(Path::to_path_buf);
        let params = import::plain(
            &import_specifier(dir.as_deref(), &derived_file, &origin.specifier),
            quote,
        );

        let node = match host {
            Some(host) => {
                let root = registry.sheet(host)?.root;
                let ast = registry.ast_mut();
                existing_import(ast, root, &params).unwrap_or_else(|| {
                    let index = ast
                        .children(root)
                        .iter()
                        .take_while(|&&child| ast.get(child).is_some_and(NodeData::is_import))
                        .count();
                    ast.insert_at(root, index, NodeData::at_rule("import", params.clone()).injected_from(origin))
                })
            }
            None => {
                let ast = registry.ast_mut();
                let Some(container) = ast.parent(edge) else {
                    continue;
                };
                match existing_import(ast, container, &params) {
                    Some(existing) => existing,
                    None => {
                        let data = NodeData::at_rule("import", params.clone()).injected_from(origin);
                        let Some(node) = ast.insert_after(edge, data) else {
                            continue;
                        };
                        node
                    }
                }
            }
        };

        tracing::trace!(params = %params, "Linked derived stylesheet");
        let sheet = registry.sheet_mut(derived)?;
        sheet.import_rules.insert(node);
        sheet.parents.insert(owner);
    }
    Ok(())
}

/// An injected `@import` with `params` directly under `container`.
fn existing_import(ast: &Ast, container: NodeId, params: &str) -> Option<NodeId> {
    ast.children(container).iter().copied().find(|&child| {
        ast.get(child)
            .is_some_and(|data| data.injected && data.is_import() && data.params() == Some(params))
    })
}
