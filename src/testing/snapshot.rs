//! Snapshot rendering helpers.
//!
//! Functions for converting migration plans and project file sets into
//! plain-text strings suitable for snapshot testing and assertions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::migrate::FileOp;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Render a plan, one operation per block, with paths relative to `root`.
///
/// Writes are followed by the written contents; deletes are a single line.
///
/// ```text
/// write index.css
/// @import './a.css';
/// delete b.css
/// ```
pub fn render_plan(plan: &[FileOp], root: &Path) -> String {
    let mut out = String::new();
    for op in plan {
        match op {
            FileOp::Write { path, contents } => {
                out.push_str(&format!("write {}\n", relative(path, root)));
                out.push_str(contents);
                if !contents.ends_with('\n') {
                    out.push('\n');
                }
            }
            FileOp::Delete { path } => {
                out.push_str(&format!("delete {}\n", relative(path, root)));
            }
        }
    }
    out.trim_end().to_owned()
}

/// Render a file set as `── path ──` headers followed by contents, in path
/// order. Empty files render as a bare header.
pub fn render_files(files: &BTreeMap<PathBuf, String>, root: &Path) -> String {
    files
        .iter()
        .map(|(path, contents)| {
            let header = format!("── {} ──", relative(path, root));
            let body = contents.trim_end();
            if body.is_empty() {
                header
            } else {
                format!("{header}\n{body}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

// ===========================================================================
// Tests
// ===========================================================================
