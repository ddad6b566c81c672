//! Stylesheet registry: one record per resolved path, one shared tree arena.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use slotmap::{SecondaryMap, SlotMap};

use super::stylesheet::{SheetId, Stylesheet};
use crate::ast::{Ast, NodeId};
use crate::css::{parse_into, to_css};
use crate::error::{MigrateError, Result};
use crate::paths::normalize;

/// Owns every participating stylesheet, keyed by [`SheetId`], and the arena
/// their trees live in.
///
/// Invariant: at most one stylesheet is registered per normalized path.
#[derive(Default)]
pub struct Registry {
    sheets: SlotMap<SheetId, Stylesheet>,
    by_file: HashMap<PathBuf, SheetId>,
    by_root: SecondaryMap<NodeId, SheetId>,
    ast: Ast,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` and register it under `file`.
    ///
    /// # Errors
    ///
    /// [`MigrateError::DuplicateFile`] if the path is already registered,
    /// [`MigrateError::Parse`] if the text is not valid CSS.
    pub fn add_source(&mut self, file: Option<PathBuf>, text: &str) -> Result<SheetId> {
        let file = file.map(|path| normalize(&path));
        if let Some(path) = &file {
            if self.by_file.contains_key(path) {
                return Err(MigrateError::DuplicateFile(path.clone()));
            }
        }

        let root = self.ast.create_root();
        if let Err(source) = parse_into(&mut self.ast, root, text) {
            self.ast.remove(root);
            return Err(MigrateError::Parse { file, source });
        }

        let mut sheet = Stylesheet::new(file, text, root);
        sheet.baseline = to_css(&self.ast, root);
        Ok(self.insert(sheet))
    }

    /// Register a derived stylesheet whose content already lives under `root`.
    pub fn add_root(&mut self, file: PathBuf, root: NodeId) -> Result<SheetId> {
        let file = normalize(&file);
        if self.by_file.contains_key(&file) {
            return Err(MigrateError::DuplicateFile(file));
        }
        let content = to_css(&self.ast, root);
        let mut sheet = Stylesheet::new(Some(file), content, root);
        sheet.derived = true;
        Ok(self.insert(sheet))
    }

    fn insert(&mut self, sheet: Stylesheet) -> SheetId {
        let file = sheet.file.clone();
        let root = sheet.root;
        let id = self.sheets.insert(sheet);
        if let Some(path) = file {
            self.by_file.insert(path, id);
        }
        self.by_root.insert(root, id);
        id
    }

    pub fn get(&self, id: SheetId) -> Option<&Stylesheet> {
        self.sheets.get(id)
    }

    pub fn get_mut(&mut self, id: SheetId) -> Option<&mut Stylesheet> {
        self.sheets.get_mut(id)
    }

    /// Like [`get`](Self::get), but an unknown id is an error.
    pub fn sheet(&self, id: SheetId) -> Result<&Stylesheet> {
        self.sheets.get(id).ok_or(MigrateError::UnknownStylesheet)
    }

    pub fn sheet_mut(&mut self, id: SheetId) -> Result<&mut Stylesheet> {
        self.sheets.get_mut(id).ok_or(MigrateError::UnknownStylesheet)
    }

    /// Every stylesheet id, in registration order.
    pub fn ids(&self) -> Vec<SheetId> {
        self.sheets.keys().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SheetId, &Stylesheet)> {
        self.sheets.iter()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// The stylesheet registered under `path`.
    pub fn id_for_path(&self, path: &Path) -> Option<SheetId> {
        self.by_file.get(&normalize(path)).copied()
    }

    /// The stylesheet whose tree contains `node`.
    pub fn owner_of(&self, node: NodeId) -> Option<SheetId> {
        let root = self.ast.root_of(node)?;
        self.by_root.get(root).copied()
    }

    /// Current serialized content of a stylesheet.
    pub fn to_css(&self, id: SheetId) -> String {
        self.sheets
            .get(id)
            .map(|sheet| to_css(&self.ast, sheet.root))
            .unwrap_or_default()
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn ast_mut(&mut self) -> &mut Ast {
        &mut self.ast
    }

    /// Let a derived stylesheet take over the path of an unlinked one.
    ///
    /// The previous owner keeps its `file` so the deletion it was marked for
    /// can be recognized as superseded.
    pub fn adopt_path(&mut self, id: SheetId, path: &Path) -> Result<()> {
        let path = normalize(path);
        let sheet = self.sheet_mut(id)?;
        if let Some(old) = sheet.file.replace(path.clone()) {
            if self.by_file.get(&old) == Some(&id) {
                self.by_file.remove(&old);
            }
        }
        self.by_file.insert(path, id);
        Ok(())
    }

    /// Whether `id` is the current owner of its own path.
    pub fn owns_path(&self, id: SheetId) -> bool {
        self.sheets
            .get(id)
            .and_then(|sheet| sheet.file.as_ref())
            .is_some_and(|path| self.by_file.get(path) == Some(&id))
    }

    /// Transitive closure over `parents`, depth-first, each ancestor once.
    ///
    /// # Errors
    ///
    /// [`MigrateError::ImportCycle`] if the import graph reachable from `id`
    /// contains a cycle. The chain is reported in import order.
    pub fn ancestors(&self, id: SheetId) -> Result<Vec<SheetId>> {
        let mut visited = HashSet::new();
        let mut out = Vec::new();
        let mut path = vec![id];
        self.visit_parents(id, &mut path, &mut visited, &mut out)?;
        Ok(out)
    }

    fn visit_parents(
        &self,
        id: SheetId,
        path: &mut Vec<SheetId>,
        visited: &mut HashSet<SheetId>,
        out: &mut Vec<SheetId>,
    ) -> Result<()> {
        for &parent in &self.sheet(id)?.parents {
            if let Some(pos) = path.iter().position(|&p| p == parent) {
                let chain = std::iter::once(parent)
                    .chain(path[pos..].iter().rev().copied())
                    .map(|p| self.get(p).and_then(|sheet| sheet.file.clone()))
                    .collect();
                return Err(MigrateError::ImportCycle(chain));
            }
            if !visited.insert(parent) {
                continue;
            }
            out.push(parent);
            path.push(parent);
            self.visit_parents(parent, path, visited, out)?;
            path.pop();
        }
        Ok(())
    }
}
