//! Import resolution: module specifier + base directory -> absolute path.
//!
//! [`FsResolver`] follows the package-style rules stylesheet tooling uses:
//! relative and absolute paths, `.css` extension inference, `index.css`
//! directory fallback and bare package names looked up in `node_modules`.
//! [`KnownFiles`] applies the path rules to an in-memory file set.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::normalize;

/// Resolves an import specifier relative to the importing file's directory.
pub trait Resolver {
    /// Absolute, normalized path of the imported file, or `None` when the
    /// specifier cannot be resolved.
    fn resolve(&self, specifier: &str, base_dir: &Path) -> Option<PathBuf>;
}

impl<F> Resolver for F
where
    F: Fn(&str, &Path) -> Option<PathBuf>,
{
    fn resolve(&self, specifier: &str, base_dir: &Path) -> Option<PathBuf> {
        self(specifier, base_dir)
    }
}

const EXTENSION: &str = "css";
const INDEX_FILE: &str = "index.css";

/// Specifiers that point outside the local filesystem.
fn is_remote(specifier: &str) -> bool {
    let lower = specifier.to_ascii_lowercase();
    ["http:", "https:", "data:", "//"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

fn is_path_like(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
}

/// Files a path may refer to, in lookup order.
fn candidates(path: &Path) -> Vec<PathBuf> {
    let mut out = vec![path.to_path_buf()];
    if path.extension().is_none() {
        let mut with_ext = path.as_os_str().to_owned();
        with_ext.push(".");
        with_ext.push(EXTENSION);
        out.push(PathBuf::from(with_ext));
    }
    out.push(path.join(INDEX_FILE));
    out
}

/// Split `@scope/name/rest` or `name/rest` into package name and subpath.
fn split_package(specifier: &str) -> (&str, Option<&str>) {
    let split_at = if specifier.starts_with('@') {
        specifier
            .match_indices('/')
            .nth(1)
            .map(|(i, _)| i)
    } else {
        specifier.find('/')
    };
    match split_at {
        Some(i) if i + 1 < specifier.len() => (&specifier[..i], Some(&specifier[i + 1..])),
        Some(i) => (&specifier[..i], None),
        None => (specifier, None),
    }
}

/// Filesystem-backed resolver.
#[derive(Debug, Clone)]
pub struct FsResolver {
    /// package.json fields consulted for a package's stylesheet entry point.
    pub package_fields: Vec<String>,
}

impl Default for FsResolver {
    fn default() -> Self {
        Self {
            package_fields: vec!["style".to_string()],
        }
    }
}

impl FsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn first_file(path: &Path) -> Option<PathBuf> {
        candidates(path)
            .into_iter()
            .find(|candidate| candidate.is_file())
            .map(|found| normalize(&found))
    }

    /// Entry stylesheet declared in `package.json`.
    fn manifest_entry(&self, package_dir: &Path) -> Option<PathBuf> {
        let text = fs::read_to_string(package_dir.join("package.json")).ok()?;
        let manifest: serde_json::Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(dir = %package_dir.display(), error = %err, "Ignoring unreadable package.json");
                return None;
            }
        };
        self.package_fields
            .iter()
            .find_map(|field| manifest.get(field)?.as_str())
            .and_then(|entry| Self::first_file(&package_dir.join(entry)))
    }

    fn resolve_package(&self, specifier: &str, base_dir: &Path) -> Option<PathBuf> {
        let (package, subpath) = split_package(specifier);
        for dir in base_dir.ancestors() {
            let package_dir = dir.join("node_modules").join(package);
            if !package_dir.is_dir() {
                continue;
            }
            let found = match subpath {
                Some(sub) => Self::first_file(&package_dir.join(sub)),
                None => self
                    .manifest_entry(&package_dir)
                    .or_else(|| Self::first_file(&package_dir.join(INDEX_FILE))),
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }
}

impl Resolver for FsResolver {
    fn resolve(&self, specifier: &str, base_dir: &Path) -> Option<PathBuf> {
        if specifier.is_empty() || is_remote(specifier) {
            return None;
        }
        if is_path_like(specifier) {
            return Self::first_file(&base_dir.join(specifier));
        }
        self.resolve_package(specifier, base_dir)
    }
}

/// Resolver over a fixed set of known files. Bare package specifiers never
/// resolve.
#[derive(Debug, Clone, Default)]
pub struct KnownFiles {
    files: HashSet<PathBuf>,
}

impl KnownFiles {
    pub fn new<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            files: files.into_iter().map(|p| normalize(p.as_ref())).collect(),
        }
    }

    pub fn insert(&mut self, path: impl AsRef<Path>) {
        self.files.insert(normalize(path.as_ref()));
    }
}

impl Resolver for KnownFiles {
    fn resolve(&self, specifier: &str, base_dir: &Path) -> Option<PathBuf> {
        if specifier.is_empty() || is_remote(specifier) || !is_path_like(specifier) {
            return None;
        }
        candidates(&base_dir.join(specifier))
            .into_iter()
            .map(|candidate| normalize(&candidate))
            .find(|candidate| self.files.contains(candidate))
    }
}
