//! Layer propagation: every stylesheet inherits the layers of its ancestors.

use std::collections::BTreeSet;

use slotmap::SecondaryMap;

use crate::error::Result;
use crate::sheet::{Registry, SheetId};

/// Ancestor sets of every stylesheet, computed once after graph building.
///
/// `parents` does not change between graph building and splitting, so the
/// closure is never invalidated while it is in use.
#[derive(Debug, Default)]
pub struct Ancestry {
    ancestors: SecondaryMap<SheetId, Vec<SheetId>>,
}

impl Ancestry {
    /// Compute the ancestors of every registered stylesheet.
    ///
    /// # Errors
    ///
    /// [`MigrateError::ImportCycle`](crate::error::MigrateError::ImportCycle)
    /// if the import graph is cyclic.
    pub fn compute(registry: &Registry) -> Result<Self> {
        let mut ancestors = SecondaryMap::new();
        for id in registry.ids() {
            ancestors.insert(id, registry.ancestors(id)?);
        }
        Ok(Self { ancestors })
    }

    /// Ancestors of `id`; empty for unknown ids.
    pub fn of(&self, id: SheetId) -> &[SheetId] {
        self.ancestors.get(id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Union the own-declared layers of every ancestor into each stylesheet's
/// `layers`.
pub fn propagate_layers(registry: &mut Registry) -> Result<Ancestry> {
    let ancestry = Ancestry::compute(registry)?;

    let mut inherited: Vec<(SheetId, BTreeSet<String>)> = Vec::new();
    for id in registry.ids() {
        let layers: BTreeSet<String> = ancestry
            .of(id)
            .iter()
            .filter_map(|&ancestor| registry.get(ancestor))
            .flat_map(|ancestor| ancestor.own_layers.iter().cloned())
            .collect();
        if !layers.is_empty() {
            inherited.push((id, layers));
        }
    }

    for (id, layers) in inherited {
        let sheet = registry.sheet_mut(id)?;
        tracing::trace!(sheet = %sheet.label(), ?layers, "Inherited layers");
        sheet.layers.extend(layers);
    }
    Ok(ancestry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrateError;
    use crate::graph::build_graph;
    use crate::resolve::KnownFiles;
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};

    fn analyzed(files: &[(&str, &str)]) -> Result<Registry> {
        let mut registry = Registry::new();
        for (path, text) in files {
            registry.add_source(Some(PathBuf::from(path)), text)?;
        }
        let known = KnownFiles::new(files.iter().map(|(path, _)| *path));
        build_graph(&mut registry, &known, Path::new("/"));
        propagate_layers(&mut registry)?;
        Ok(registry)
    }

    fn layers(registry: &Registry, path: &str) -> Vec<String> {
        let id = registry.id_for_path(Path::new(path)).unwrap();
        registry.get(id).unwrap().layers.iter().cloned().collect()
    }

    #[test]
    fn layers_flow_down_import_chains() {
        let registry = analyzed(&[
            ("/p/index.css", "@import './a.css' layer(utilities);"),
            ("/p/a.css", "@import './b.css';"),
            ("/p/b.css", "@import './c.css' layer(extra);"),
            ("/p/c.css", ".c {}"),
        ])
        .unwrap();

        assert!(layers(&registry, "/p/index.css").is_empty());
        assert_eq!(layers(&registry, "/p/a.css"), vec!["utilities"]);
        assert_eq!(layers(&registry, "/p/b.css"), vec!["utilities"]);
        assert_eq!(layers(&registry, "/p/c.css"), vec!["extra", "utilities"]);
    }

    #[test]
    fn descendants_are_supersets_of_ancestors() {
        let registry = analyzed(&[
            ("/p/index.css", "@import './a.css' layer(one);\n@import './b.css' layer(two);"),
            ("/p/a.css", "@import './shared.css' layer(three);"),
            ("/p/b.css", "@import './shared.css';"),
            ("/p/shared.css", ".s {}"),
        ])
        .unwrap();

        for (id, sheet) in registry.iter() {
            for ancestor in registry.ancestors(id).unwrap() {
                let ancestor = registry.get(ancestor).unwrap();
                assert!(sheet.layers.is_superset(&ancestor.layers), "{}", sheet.label());
            }
        }
        assert_eq!(layers(&registry, "/p/shared.css"), vec!["one", "three", "two"]);
    }

    #[test]
    fn diamond_matches_single_path() {
        let diamond = analyzed(&[
            ("/p/top.css", "@import './left.css';\n@import './right.css';"),
            ("/p/root.css", "@import './top.css' layer(utilities);"),
            ("/p/left.css", "@import './bottom.css';"),
            ("/p/right.css", "@import './bottom.css';"),
            ("/p/bottom.css", ".b {}"),
        ])
        .unwrap();
        let chain = analyzed(&[
            ("/p/root.css", "@import './top.css' layer(utilities);"),
            ("/p/top.css", "@import './left.css';"),
            ("/p/left.css", "@import './bottom.css';"),
            ("/p/bottom.css", ".b {}"),
        ])
        .unwrap();

        assert_eq!(
            layers(&diamond, "/p/bottom.css"),
            layers(&chain, "/p/bottom.css")
        );
    }

    #[test]
    fn propagation_is_idempotent() {
        let mut registry = analyzed(&[
            ("/p/index.css", "@import './a.css' layer(utilities);"),
            ("/p/a.css", "@import './b.css';"),
            ("/p/b.css", ""),
        ])
        .unwrap();
        let before = layers(&registry, "/p/b.css");
        propagate_layers(&mut registry).unwrap();
        assert_eq!(layers(&registry, "/p/b.css"), before);
    }

    #[test]
    fn cyclic_imports_fail() {
        let result = analyzed(&[
            ("/p/a.css", "@import './b.css';"),
            ("/p/b.css", "@import './a.css';"),
        ]);
        assert!(matches!(result, Err(MigrateError::ImportCycle(_))));
    }

    #[test]
    fn ancestry_lookup() {
        let registry = analyzed(&[
            ("/p/index.css", "@import './a.css';"),
            ("/p/a.css", ""),
        ])
        .unwrap();
        let ancestry = Ancestry::compute(&registry).unwrap();
        let index = registry.id_for_path(Path::new("/p/index.css")).unwrap();
        let a = registry.id_for_path(Path::new("/p/a.css")).unwrap();
        assert_eq!(ancestry.of(a), &[index]);
        assert!(ancestry.of(index).is_empty());
    }
}
