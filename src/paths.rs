//! Lexical path helpers: normalization, relative specifiers, derived names.
//!
//! Nothing here touches the filesystem.

use std::path::{Component, Path, PathBuf};

/// Remove `.` components and fold `..` into the preceding component.
///
/// `..` at the start of a relative path is kept; `..` above the root is dropped.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// A `./`- or `../`-prefixed specifier that leads from `from_dir` to `to`.
pub fn relative_specifier(from_dir: &Path, to: &Path) -> String {
    let from = normalize(from_dir);
    let to = normalize(to);
    let from_parts: Vec<_> = from
        .components()
        .filter(|c| *c != Component::CurDir)
        .collect();
    let to_parts: Vec<_> = to.components().filter(|c| *c != Component::CurDir).collect();

    // Different roots (e.g. Windows drives): nothing relative to express.
    if from_parts.first() != to_parts.first() && from.has_root() {
        return to.to_string_lossy().replace('\\', "/");
    }

    let common = from_parts
        .iter()
        .zip(&to_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut segments: Vec<String> = Vec::new();
    for _ in common..from_parts.len() {
        segments.push("..".to_string());
    }
    for part in &to_parts[common..] {
        segments.push(part.as_os_str().to_string_lossy().into_owned());
    }

    let joined = segments.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}

/// Specifier an importer in `importer_dir` uses to reach `target`.
///
/// Without a known importer directory, the last segment of `sibling_of` (a
/// specifier that reaches a file in the same directory as `target`) is swapped
/// for the target's file name.
pub fn import_specifier(importer_dir: Option<&Path>, target: &Path, sibling_of: &str) -> String {
    if let Some(dir) = importer_dir {
        return relative_specifier(dir, target);
    }
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match sibling_of.trim_end_matches('/').rsplit_once('/') {
        Some((head, _)) => format!("{head}/{name}"),
        None => name,
    }
}

/// Last path segment of an import specifier.
pub fn specifier_file_name(specifier: &str) -> &str {
    let trimmed = specifier.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Insert `.<suffix>` before the extension of `file_name`.
///
/// `a.css` becomes `a.utilities.css`. A name without an extension takes
/// `fallback_ext` when given. A non-zero `attempt` adds a counter,
/// `a.utilities.1.css`, for names already taken.
pub fn derived_file_name(file_name: &str, suffix: &str, fallback_ext: Option<&str>, attempt: usize) -> String {
    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (file_name, fallback_ext),
    };
    let mut name = format!("{stem}.{suffix}");
    if attempt > 0 {
        name.push_str(&format!(".{attempt}"));
    }
    if let Some(ext) = ext {
        name.push('.');
        name.push_str(ext);
    }
    name
}
