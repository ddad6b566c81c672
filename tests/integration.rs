//! Integration tests for layersplit.
//!
//! These tests exercise the public API from outside the crate, verifying that
//! graph building, layer propagation, splitting and reduction work together.

use std::fs;
use std::path::{Path, PathBuf};

use insta::assert_snapshot;
use pretty_assertions::assert_eq;

use layersplit::ast::NodeKind;
use layersplit::config::SplitConfig;
use layersplit::graph::{build_graph, propagate_layers};
use layersplit::migrate::{FileOp, Migration};
use layersplit::resolve::{FsResolver, KnownFiles, Resolver};
use layersplit::sheet::Registry;
use layersplit::split::split;
use layersplit::testing::{render_files, render_plan, Project};
use layersplit::MigrateError;

fn utility_names(registry: &Registry, path: &str) -> Vec<String> {
    let id = registry.id_for_path(Path::new(path)).expect("registered");
    let root = registry.get(id).unwrap().root;
    registry
        .ast()
        .find_all(root, |data| data.is_at_rule("utility"))
        .into_iter()
        .filter_map(|node| match &registry.ast().get(node)?.kind {
            NodeKind::AtRule { params, .. } => Some(params.clone()),
            _ => None,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_layered_import_is_replaced_by_plain_import() {
    let migrated = Project::new("/p")
        .file("index.css", "@import \"./a.css\" layer(utilities);")
        .file("a.css", "@utility foo {color:red}")
        .migrate()
        .unwrap();

    let a = migrated.registry.iter().find(|(_, s)| !s.derived && s.file.as_deref() == Some(Path::new("/p/a.css")));
    assert!(a.is_some_and(|(_, sheet)| sheet.unlink));
    assert_snapshot!(render_plan(&migrated.report.plan, Path::new("/p")), @r#"
    write index.css
    @import "./a.css";
    "#);
    assert_eq!(migrated.paths(), vec!["a.css", "index.css"]);
}

#[test]
fn test_chain_reduces_to_fixed_point() {
    let migrated = Project::new("/p")
        .file("a.css", "@import './b.css' layer(components);\nbody { margin: 0 }")
        .file("b.css", "@import './c.css';\n@utility b { x: 1 }")
        .file("c.css", "@utility c { x: 2 }")
        .migrate()
        .unwrap();

    let reduce = &migrated.report.reduce;
    assert_eq!(reduce.unlinked.len(), 2);
    assert_eq!(reduce.renamed.len(), 2);
    assert_snapshot!(render_files(migrated.project.files(), Path::new("/p")), @r"
    ── a.css ──
    @import './b.css';
    body {
      margin: 0;
    }
    ── b.css ──
    @import './c.css';
    @utility b { x: 1 }
    ── c.css ──
    @utility c { x: 2 }
    ");
}

#[test]
fn test_partially_split_tree() {
    let migrated = Project::new("/p")
        .file(
            "index.css",
            "@import './base.css' layer(base);\n@import './components/card.css' layer(components);",
        )
        .file("base.css", "html { color: black }")
        .file(
            "components/card.css",
            "@import './shadow.css';\narticle { padding: 1rem }\n@utility card-title { font-weight: bold }",
        )
        .file("components/shadow.css", "@utility shadow { box-shadow: none }\n[data-shadow] { position: relative }")
        .migrate()
        .unwrap();

    assert_snapshot!(render_files(migrated.project.files(), Path::new("/p")), @r"
    ── base.css ──
    html { color: black }
    ── components/card.css ──
    @import './shadow.css';
    article {
      padding: 1rem;
    }
    ── components/card.utilities.css ──
    @import './shadow.utilities.css';
    @utility card-title {
      font-weight: bold;
    }
    ── components/shadow.css ──
    [data-shadow] {
      position: relative;
    }
    ── components/shadow.utilities.css ──
    @utility shadow {
      box-shadow: none;
    }
    ── index.css ──
    @import './base.css' layer(base);
    @import './components/card.css' layer(components);
    @import './components/card.utilities.css';
    ");
}

#[test]
fn test_second_run_changes_nothing() {
    let project = Project::new("/p")
        .file("index.css", "@import './a.css' layer(utilities);\n@import './b.css' layer(utilities);")
        .file("a.css", "@import './c.css';\nh1 {}\n@utility a { x: 1 }")
        .file("b.css", "@utility b { x: 2 }")
        .file("c.css", "@layer utilities { .c { x: 3 } }");

    let first = project.migrate().unwrap();
    assert!(!first.report.plan.is_empty());

    let second = first.rerun().unwrap();
    assert!(second.report.split.is_empty());
    assert!(second.report.reduce.unlinked.is_empty());
    assert_eq!(second.report.plan, Vec::<FileOp>::new());
}

#[test]
fn test_second_run_with_inherited_layer_changes_nothing() {
    let project = Project::new("/p")
        .file("root.css", "@import './index.css' layer(utilities);")
        .file("index.css", "@import './a.css';\n@import './b.css';")
        .file("a.css", "@utility a { x: 1 }")
        .file("b.css", "h1 {}\n@utility b { x: 2 }");

    let first = project.migrate().unwrap();
    assert_eq!(first.report.split.pairs.len(), 1);
    assert_eq!(first.read("a.css"), Some("@utility a { x: 1 }"));
    assert_eq!(
        first.read("index.css"),
        Some("@import './a.css';\n@import './b.css';\n@import './b.utilities.css';\n")
    );

    let second = first.rerun().unwrap();
    assert!(second.report.split.pairs.is_empty());
    assert!(second.report.reduce.unlinked.is_empty());
    assert_eq!(second.report.plan, Vec::<FileOp>::new());
}

#[test]
fn test_import_modifiers_on_separate_lines() {
    let migrated = Project::new("/p")
        .file("index.css", "@import './a.css'\n  layer(utilities);\n@import './b.css'\tlayer(components);")
        .file("a.css", "h1 {}\n@utility a { x: 1 }")
        .file("b.css", "h2 {}\n@utility b { x: 2 }")
        .migrate()
        .unwrap();

    assert_eq!(migrated.report.graph.edges, 2);
    assert_eq!(migrated.report.graph.malformed, 0);
    assert_eq!(migrated.report.split.pairs.len(), 2);
    assert_eq!(
        migrated.paths(),
        vec!["a.css", "a.utilities.css", "b.css", "b.utilities.css", "index.css"]
    );
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn test_splitting_moves_every_utility_in_order() {
    let project = Project::new("/p")
        .file("index.css", "@import './a.css' layer(utilities);")
        .file(
            "a.css",
            "@utility one { x: 1 }\nh1 {}\n@media print { @utility two { x: 2 } }\n@utility three { x: 3 }",
        );
    let mut registry = project.registry().unwrap();
    build_graph(&mut registry, &project.resolver(), project.root());
    propagate_layers(&mut registry).unwrap();
    let outcome = split(&mut registry, &SplitConfig::default()).unwrap();

    assert_eq!(outcome.pairs.len(), 1);
    assert!(utility_names(&registry, "/p/a.css").is_empty());
    assert_eq!(
        utility_names(&registry, "/p/a.utilities.css"),
        vec!["one", "two", "three"]
    );
}

#[test]
fn test_colliding_derived_paths_merge_later_first() {
    let mut registry = Registry::new();
    for (path, text) in [
        ("/p/index.css", "@import './theme.css' layer(utilities);\n@import './vendor/theme.css' layer(utilities);"),
        ("/p/theme.css", "@utility local { order: 1 }"),
        ("/p/vendor-theme.css", "@utility vendor { order: 2 }\nh1 {}"),
    ] {
        registry.add_source(Some(PathBuf::from(path)), text).unwrap();
    }
    let known = KnownFiles::new(["/p/theme.css"]);
    let resolver = |specifier: &str, base: &Path| match specifier {
        "./vendor/theme.css" => Some(base.join("vendor-theme.css")),
        other => known.resolve(other, base),
    };

    let mut migration = Migration::new(registry, SplitConfig::default());
    let report = migration.run(&resolver, Path::new("/p")).unwrap();
    assert_eq!(report.split.derived().len(), 1);

    let registry = migration.into_registry();
    assert_eq!(utility_names(&registry, "/p/theme.css"), vec!["vendor", "local"]);
}

#[test]
fn test_diamond_layers_match_single_path() {
    let diamond = Project::new("/p")
        .file("root.css", "@import './left.css' layer(utilities);\n@import './right.css' layer(utilities);")
        .file("left.css", "@import './bottom.css';")
        .file("right.css", "@import './bottom.css';")
        .file("bottom.css", ".b {}");
    let chain = Project::new("/p")
        .file("root.css", "@import './left.css' layer(utilities);")
        .file("left.css", "@import './bottom.css';")
        .file("bottom.css", ".b {}");

    let layers = |project: &Project| {
        let mut registry = project.registry().unwrap();
        build_graph(&mut registry, &project.resolver(), project.root());
        propagate_layers(&mut registry).unwrap();
        let id = registry.id_for_path(Path::new("/p/bottom.css")).unwrap();
        registry.get(id).unwrap().layers.clone()
    };
    assert_eq!(layers(&diamond), layers(&chain));
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_custom_layers_and_suffix() {
    let config = SplitConfig {
        layers: vec!["helpers".into()],
        at_rule: "utility".into(),
        suffix: "helpers".into(),
    };
    let migrated = Project::new("/p")
        .file("index.css", "@import './a.css' layer(helpers);\n@import './b.css' layer(utilities);")
        .file("a.css", "h1 {}\n@utility a { x: 1 }")
        .file("b.css", "h2 {}\n@utility b { x: 2 }")
        .with_config(config)
        .migrate()
        .unwrap();

    assert_eq!(
        migrated.paths(),
        vec!["a.css", "a.helpers.css", "b.css", "index.css"]
    );
    assert_eq!(migrated.read("b.css"), Some("h2 {}\n@utility b { x: 2 }"));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn test_single_sheet_without_file_is_rejected() {
    let mut registry = Registry::new();
    let id = registry.add_source(None, "@layer utilities { .a {} }").unwrap();
    let mut migration = Migration::new(registry, SplitConfig::default());
    let err = migration.transform_sheet(id).unwrap_err();
    assert!(matches!(err, MigrateError::MissingFile));
    assert_eq!(err.to_string(), "cannot migrate a stylesheet without a file path");
}

#[test]
fn test_import_cycle_is_an_error() {
    let result = Project::new("/p")
        .file("a.css", "@import './b.css' layer(utilities);")
        .file("b.css", "@import './c.css';")
        .file("c.css", "@import './a.css';")
        .migrate();
    match result {
        Err(MigrateError::ImportCycle(chain)) => assert_eq!(chain.len(), 4),
        Err(other) => panic!("expected an import cycle, got {other}"),
        Ok(_) => panic!("expected an import cycle"),
    }
}

#[test]
fn test_unresolved_imports_are_left_alone() {
    let migrated = Project::new("/p")
        .file("index.css", "@import 'tailwindcss';\n@import './missing.css' layer(utilities);")
        .migrate()
        .unwrap();
    assert_eq!(migrated.report.graph.unresolved, 2);
    assert!(migrated.report.plan.is_empty());
}

// ---------------------------------------------------------------------------
// Filesystem
// ---------------------------------------------------------------------------

#[test]
fn test_filesystem_project_with_package_import() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::create_dir_all(root.join("node_modules/ui")).unwrap();
    fs::write(
        root.join("src/app.css"),
        "@import 'ui';\n@import './utils' layer(utilities);\nbody { margin: 0 }\n",
    )
    .unwrap();
    fs::write(root.join("src/utils.css"), "@utility stack { display: flex }\n").unwrap();
    fs::write(root.join("node_modules/ui/package.json"), r#"{"style": "ui.css"}"#).unwrap();
    fs::write(root.join("node_modules/ui/ui.css"), ".ui {}\n").unwrap();

    let mut registry = Registry::new();
    for file in ["src/app.css", "src/utils.css"] {
        let path = root.join(file);
        let text = fs::read_to_string(&path).unwrap();
        registry.add_source(Some(path), &text).unwrap();
    }
    let mut migration = Migration::new(registry, SplitConfig::default());
    let report = migration.run(&FsResolver::new(), root).unwrap();

    // The package resolves but is not part of the migration.
    assert_eq!(report.graph.untracked, 1);
    assert_eq!(report.graph.edges, 1);

    for op in &report.plan {
        match op {
            FileOp::Write { path, contents } => fs::write(path, contents).unwrap(),
            FileOp::Delete { path } => fs::remove_file(path).unwrap(),
        }
    }
    assert_eq!(
        fs::read_to_string(root.join("src/app.css")).unwrap(),
        "@import 'ui';\n@import './utils';\nbody {\n  margin: 0;\n}\n"
    );
    // utils.css keeps its path and prints as loaded, so it is not rewritten.
    assert!(report.plan.iter().all(|op| op.path() != root.join("src/utils.css").as_path()));
    assert_eq!(
        fs::read_to_string(root.join("src/utils.css")).unwrap(),
        "@utility stack { display: flex }\n"
    );
    assert!(!root.join("src/utils.utilities.css").exists());
}
