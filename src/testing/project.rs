//! Project: an in-memory set of stylesheets driven through a migration.
//!
//! The `Project` plays the I/O collaborator for tests. It registers its
//! files, resolves imports against them with [`KnownFiles`], runs a
//! [`Migration`] and applies the resulting plan to its own file map.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::SplitConfig;
use crate::error::Result;
use crate::migrate::{FileOp, Migration, MigrationReport};
use crate::paths::normalize;
use crate::resolve::KnownFiles;
use crate::sheet::Registry;
use crate::transform::TransformPipeline;

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// An in-memory project rooted at an absolute directory.
///
/// # Examples
///
/// ```ignore
/// use layersplit::testing::Project;
///
/// let migrated = Project::new("/p")
///     .file("index.css", "@import './a.css' layer(utilities);")
///     .file("a.css", "@utility foo { color: red }")
///     .migrate()
///     .unwrap();
/// assert_eq!(migrated.read("index.css"), Some("@import './a.css';\n"));
/// ```
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    files: BTreeMap<PathBuf, String>,
    config: SplitConfig,
    transforms: bool,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: BTreeMap::new(),
            config: SplitConfig::default(),
            transforms: true,
        }
    }

    /// Add a file, relative to the project root (builder).
    pub fn file(mut self, path: &str, contents: &str) -> Self {
        let path = self.path(path);
        self.files.insert(path, contents.to_owned());
        self
    }

    pub fn with_config(mut self, config: SplitConfig) -> Self {
        self.config = config;
        self
    }

    /// Run without the built-in per-sheet transforms.
    pub fn without_transforms(mut self) -> Self {
        self.transforms = false;
        self
    }

    // ── Query ────────────────────────────────────────────────────────

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of a project-relative path.
    pub fn path(&self, relative: &str) -> PathBuf {
        normalize(&self.root.join(relative))
    }

    pub fn files(&self) -> &BTreeMap<PathBuf, String> {
        &self.files
    }

    pub fn resolver(&self) -> KnownFiles {
        KnownFiles::new(self.files.keys())
    }

    /// Register every file, in path order.
    pub fn registry(&self) -> Result<Registry> {
        let mut registry = Registry::new();
        for (path, contents) in &self.files {
            registry.add_source(Some(path.clone()), contents)?;
        }
        Ok(registry)
    }

    // ── Running ──────────────────────────────────────────────────────

    /// Run a full migration and apply its plan.
    pub fn migrate(&self) -> Result<Migrated> {
        let mut migration = Migration::new(self.registry()?, self.config.clone());
        if !self.transforms {
            migration = migration.with_pipeline(TransformPipeline::new());
        }
        let report = migration.run(&self.resolver(), &self.root)?;

        let mut after = self.clone();
        after.apply(&report.plan);
        Ok(Migrated {
            report,
            registry: migration.into_registry(),
            project: after,
        })
    }

    fn apply(&mut self, plan: &[FileOp]) {
        for op in plan {
            match op {
                FileOp::Write { path, contents } => {
                    self.files.insert(path.clone(), contents.clone());
                }
                FileOp::Delete { path } => {
                    self.files.remove(path);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Migrated
// ---------------------------------------------------------------------------

/// A project after one migration.
pub struct Migrated {
    pub report: MigrationReport,
    /// Final registry state.
    pub registry: Registry,
    /// The project with the plan applied.
    pub project: Project,
}

impl Migrated {
    /// Contents of a project-relative file after the migration.
    pub fn read(&self, relative: &str) -> Option<&str> {
        self.project
            .files
            .get(&self.project.path(relative))
            .map(String::as_str)
    }

    /// Project-relative paths of every file after the migration.
    pub fn paths(&self) -> Vec<String> {
        self.project
            .files
            .keys()
            .map(|path| {
                path.strip_prefix(&self.project.root)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    /// Migrate the migrated files again.
    pub fn rerun(&self) -> Result<Migrated> {
        self.project.migrate()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
