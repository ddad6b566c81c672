//! Empty-file reducer.
//!
//! After splitting, some stylesheets print as nothing. They are marked for
//! deletion and the imports pointing at them are removed, which can empty
//! their importers in turn, so the pass repeats until nothing changes. A
//! derived stylesheet whose original was deleted then takes over the
//! original's path.

use std::path::Path;

use crate::css::import;
use crate::error::Result;
use crate::paths::import_specifier;
use crate::sheet::{Registry, SheetId};

use super::SplitOutcome;

/// What the reducer changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReduceSummary {
    /// Stylesheets newly marked `unlink`, in the order they were marked.
    pub unlinked: Vec<SheetId>,
    /// Derived stylesheets that took over the path of their original.
    pub renamed: Vec<SheetId>,
    /// Passes until the fixed point, including the final unchanged one.
    pub passes: usize,
}

/// Mark emptied stylesheets `unlink` until a fixed point, then let derived
/// stylesheets take over the paths of unlinked originals.
pub fn reduce(registry: &mut Registry, outcome: &SplitOutcome) -> Result<ReduceSummary> {
    let mut summary = ReduceSummary::default();

    // Terminates: every pass either unlinks a stylesheet or stops.
    loop {
        summary.passes += 1;
        let emptied: Vec<SheetId> = registry
            .iter()
            .filter(|(_, sheet)| !sheet.unlink && !sheet.content.trim().is_empty())
            .map(|(id, _)| id)
            .filter(|&id| registry.to_css(id).trim().is_empty())
            .collect();
        if emptied.is_empty() {
            break;
        }
        for id in emptied {
            unlink(registry, id)?;
            summary.unlinked.push(id);
        }
    }

    for &(original, derived) in &outcome.pairs {
        let Some(file) = registry
            .get(original)
            .filter(|sheet| sheet.unlink)
            .and_then(|sheet| sheet.file.clone())
        else {
            continue;
        };
        let live = registry.get(derived).is_some_and(|sheet| !sheet.unlink);
        if !live || summary.renamed.contains(&derived) {
            continue;
        }
        retarget(registry, original, derived, &file)?;
        summary.renamed.push(derived);
    }

    tracing::debug!(
        unlinked = summary.unlinked.len(),
        renamed = summary.renamed.len(),
        passes = summary.passes,
        "Reduced empty stylesheets"
    );
    Ok(summary)
}

fn unlink(registry: &mut Registry, id: SheetId) -> Result<()> {
    let sheet = registry.sheet_mut(id)?;
    sheet.unlink = true;
    let rules = std::mem::take(&mut sheet.import_rules);
    tracing::debug!(sheet = %sheet.label(), imports = rules.len(), "Unlinking empty stylesheet");

    let ast = registry.ast_mut();
    for rule in rules {
        ast.remove(rule);
    }
    Ok(())
}

/// Point every import of `derived` at `file`, the vacated path of
/// `original`, and move `derived` there.
fn retarget(registry: &mut Registry, original: SheetId, derived: SheetId, file: &Path) -> Result<()> {
    let rules: Vec<_> = registry.sheet(derived)?.import_rules.iter().copied().collect();
    for rule in rules {
        let Some(data) = registry.ast().get(rule) else {
            continue;
        };
        let Some(params) = data.params() else {
            continue;
        };
        let Some(current) = import::specifier(params) else {
            continue;
        };
        let specifier = match &data.origin {
            Some(origin) if origin.sheet == original => origin.specifier.clone(),
            _ => {
                let dir = registry
                    .owner_of(rule)
                    .and_then(|owner| registry.get(owner))
                    .and_then(|owner| owner.dir());
                import_specifier(dir, file, current)
            }
        };
        let Some(rewritten) = import::with_specifier(params, &specifier) else {
            continue;
        };
        if let Some(data) = registry.ast_mut().get_mut(rule) {
            data.set_params(rewritten);
        }
    }

    tracing::debug!(
        derived = %registry.sheet(derived)?.label(),
        path = %file.display(),
        "Derived stylesheet replaces its original"
    );
    registry.adopt_path(derived, file)
}
