//! Migration orchestrator.
//!
//! Runs the passes in order over a populated [`Registry`]:
//!
//! 1. graph building ([`build_graph`])
//! 2. layer propagation ([`propagate_layers`])
//! 3. per-sheet transforms ([`TransformPipeline`]), which need layers
//! 4. utility splitting ([`split`])
//! 5. empty-file reduction ([`reduce`])
//!
//! The result is a list of [`FileOp`]s for the caller to apply. Nothing in
//! here reads or writes files.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::SplitConfig;
use crate::css::{parse, to_css};
use crate::error::{MigrateError, Result};
use crate::graph::{build_graph, propagate_layers, GraphSummary};
use crate::resolve::Resolver;
use crate::sheet::{Registry, SheetId};
use crate::split::{reduce, split, ReduceSummary, SplitOutcome};
use crate::transform::{TransformContext, TransformPipeline};

/// A change to apply to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOp {
    Write { path: PathBuf, contents: String },
    Delete { path: PathBuf },
}

impl FileOp {
    pub fn path(&self) -> &Path {
        match self {
            FileOp::Write { path, .. } | FileOp::Delete { path } => path,
        }
    }
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOp::Write { path, .. } => write!(f, "write  {}", path.display()),
            FileOp::Delete { path } => write!(f, "delete {}", path.display()),
        }
    }
}

/// Everything one run decided.
#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    pub graph: GraphSummary,
    pub split: SplitOutcome,
    pub reduce: ReduceSummary,
    pub plan: Vec<FileOp>,
}

/// A migration over a set of registered stylesheets.
pub struct Migration {
    registry: Registry,
    config: SplitConfig,
    pipeline: TransformPipeline,
}

impl Migration {
    /// Migrate `registry` with the standard transforms.
    pub fn new(registry: Registry, config: SplitConfig) -> Self {
        Self {
            registry,
            config,
            pipeline: TransformPipeline::standard(),
        }
    }

    /// Replace the per-sheet transforms (builder).
    pub fn with_pipeline(mut self, pipeline: TransformPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn into_registry(self) -> Registry {
        self.registry
    }

    /// Run the per-sheet transforms on a single file-backed stylesheet.
    ///
    /// # Errors
    ///
    /// [`MigrateError::MissingFile`] if the stylesheet has no path, or the
    /// first transform error.
    pub fn transform_sheet(&mut self, id: SheetId) -> Result<()> {
        let sheet = self.registry.sheet(id)?;
        let file = sheet.file.clone().ok_or(MigrateError::MissingFile)?;
        self.apply_transforms(id, Some(file.as_path()))
    }

    fn apply_transforms(&mut self, id: SheetId, file: Option<&Path>) -> Result<()> {
        let sheet = self.registry.sheet(id)?;
        let root = sheet.root;
        let layers = sheet.layers.clone();
        let ctx = TransformContext {
            file,
            layers: &layers,
            config: &self.config,
        };
        self.pipeline.execute(self.registry.ast_mut(), root, &ctx)
    }

    /// Run every pass and compute the file plan.
    ///
    /// Anonymous stylesheets resolve their imports against `base_dir`.
    ///
    /// # Errors
    ///
    /// [`MigrateError::ImportCycle`] for cyclic imports, or the first
    /// transform error.
    pub fn run(&mut self, resolver: &dyn Resolver, base_dir: &Path) -> Result<MigrationReport> {
        let graph = build_graph(&mut self.registry, resolver, base_dir);
        propagate_layers(&mut self.registry)?;

        for id in self.registry.ids() {
            let file = self.registry.sheet(id)?.file.clone();
            self.apply_transforms(id, file.as_deref())?;
        }

        let split = split(&mut self.registry, &self.config)?;
        let reduce = reduce(&mut self.registry, &split)?;
        let plan = plan(&self.registry);

        tracing::info!(
            stylesheets = self.registry.len(),
            imports = graph.edges,
            split = split.pairs.len(),
            unlinked = reduce.unlinked.len(),
            writes = plan.iter().filter(|op| matches!(op, FileOp::Write { .. })).count(),
            deletes = plan.iter().filter(|op| matches!(op, FileOp::Delete { .. })).count(),
            "Migration finished"
        );
        Ok(MigrationReport {
            graph,
            split,
            reduce,
            plan,
        })
    }
}

/// Writes for live stylesheets that changed, deletes for unlinked originals
/// whose path was not taken over. Registration order.
///
/// A derived stylesheet that took over a path is compared with what that
/// path held at load time; any other derived stylesheet is new and written.
pub fn plan(registry: &Registry) -> Vec<FileOp> {
    let mut ops = Vec::new();
    for (id, sheet) in registry.iter() {
        let Some(path) = &sheet.file else {
            continue;
        };
        if !registry.owns_path(id) {
            continue;
        }
        if sheet.unlink {
            if !sheet.derived {
                ops.push(FileOp::Delete { path: path.clone() });
            }
            continue;
        }
        let css = registry.to_css(id);
        let baseline = if sheet.derived {
            loaded_baseline(registry, id, path)
        } else {
            Some(sheet.baseline.as_str())
        };
        if baseline != Some(css.as_str()) {
            ops.push(FileOp::Write {
                path: path.clone(),
                contents: format!("{css}\n"),
            });
        }
    }
    ops
}

/// Printed form of the stylesheet loaded from `path`, other than `id`.
fn loaded_baseline<'a>(registry: &'a Registry, id: SheetId, path: &Path) -> Option<&'a str> {
    registry
        .iter()
        .find(|&(other, sheet)| other != id && !sheet.derived && sheet.file.as_deref() == Some(path))
        .map(|(_, sheet)| sheet.baseline.as_str())
}

/// Run `pipeline` over anonymous content and print the result.
///
/// No graph is built and nothing is split: a lone stylesheet has no importers
/// and no file to split into.
pub fn migrate_contents(text: &str, pipeline: &TransformPipeline, config: &SplitConfig) -> Result<String> {
    let (mut ast, root) = parse(text).map_err(|source| MigrateError::Parse { file: None, source })?;
    let layers = Default::default();
    let ctx = TransformContext {
        file: None,
        layers: &layers,
        config,
    };
    pipeline.execute(&mut ast, root, &ctx)?;
    Ok(to_css(&ast, root))
}
