//! Split CSS parameter lists on a separator at the top nesting level.

/// Split `input` on `separator`, ignoring separators inside `()`, `[]`, `{}`
/// and quoted strings. Empty segments (runs of separators) are dropped.
///
/// ```ignore
/// assert_eq!(
///     segment("\"a.css\" layer(x y) screen", ' '),
///     vec!["\"a.css\"", "layer(x y)", "screen"],
/// );
/// ```
pub fn segment(input: &str, separator: char) -> Vec<&str> {
    segment_by(input, |ch| ch == separator)
}

/// [`segment`] on any ASCII whitespace, the separator of `@import`
/// parameters and other preludes.
pub fn segment_whitespace(input: &str) -> Vec<&str> {
    segment_by(input, |ch| ch.is_ascii_whitespace())
}

/// [`segment`] with a separator predicate.
pub fn segment_by<P>(input: &str, is_separator: P) -> Vec<&str>
where
    P: Fn(char) -> bool,
{
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, ch) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' | '\'' if quote == Some(ch) => quote = None,
            '"' | '\'' if quote.is_none() => quote = Some(ch),
            _ if quote.is_some() => {}
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ if depth == 0 && is_separator(ch) => {
                if i > start {
                    parts.push(&input[start..i]);
                }
                start = i + ch.len_utf8();
            }
            _ => {}
        }
    }
    if start < input.len() {
        parts.push(&input[start..]);
    }
    parts
}
