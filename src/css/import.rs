//! `@import` parameter handling.
//!
//! Parameters have the shape `<target> [layer(<name>)] [<modifiers>...]`
//! where `<target>` is a quoted string or `url(...)`.

use crate::css::segment::segment_whitespace;

/// Quote style of an import target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Quoted(char),
    Url(Option<char>),
}

/// `s` without `prefix`, compared ASCII case-insensitively.
fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// The target segment of `params`, with its specifier and quoting.
fn target(params: &str) -> Option<(&str, &str, Target)> {
    let first = segment_whitespace(params.trim()).into_iter().next()?;

    let quoted = |s: &str| -> Option<(char, usize)> {
        let q = s.chars().next().filter(|c| *c == '"' || *c == '\'')?;
        (s.len() >= 2 && s.ends_with(q)).then_some((q, s.len()))
    };

    if let Some((q, len)) = quoted(first) {
        return Some((first, &first[1..len - 1], Target::Quoted(q)));
    }

    let inner = strip_prefix_ignore_case(first, "url(")?
        .strip_suffix(')')?
        .trim();
    match quoted(inner) {
        Some((q, len)) => Some((first, &inner[1..len - 1], Target::Url(Some(q)))),
        None if !inner.is_empty() => Some((first, inner, Target::Url(None))),
        None => None,
    }
}

/// The module specifier an import points at, `None` when the parameters are
/// malformed.
pub fn specifier(params: &str) -> Option<&str> {
    target(params)
        .map(|(_, spec, _)| spec)
        .filter(|spec| !spec.is_empty())
}

/// Names of every `layer(<name>)` modifier. A bare `layer` (anonymous layer)
/// and an empty `layer()` contribute nothing.
pub fn layers(params: &str) -> Vec<String> {
    segment_whitespace(params.trim())
        .into_iter()
        .skip(1)
        .filter_map(|part| strip_prefix_ignore_case(part, "layer(")?.strip_suffix(')'))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parameters of a plain import of `specifier`, without any modifiers.
pub fn plain(specifier: &str, quote: char) -> String {
    format!("{quote}{specifier}{quote}")
}

/// Quote character used by the import target, defaulting to `"`.
pub fn quote_of(params: &str) -> char {
    match target(params) {
        Some((_, _, Target::Quoted(q))) | Some((_, _, Target::Url(Some(q)))) => q,
        _ => '"',
    }
}

/// Replace the import target with `new_specifier`, keeping its quoting style
/// and every modifier. Returns `None` when the parameters are malformed.
pub fn with_specifier(params: &str, new_specifier: &str) -> Option<String> {
    let trimmed = params.trim();
    let (first, _, kind) = target(trimmed)?;
    let rest = &trimmed[first.len()..];
    let replaced = match kind {
        Target::Quoted(q) => format!("{q}{new_specifier}{q}"),
        Target::Url(Some(q)) => format!("url({q}{new_specifier}{q})"),
        Target::Url(None) => format!("url({new_specifier})"),
    };
    Some(format!("{replaced}{rest}"))
}
