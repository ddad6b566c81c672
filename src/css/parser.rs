//! Statement-level CSS parser.
//!
//! Parses CSS text into nodes appended under an existing root of an [`Ast`].
//! Uses the logos-based tokenizer from [`crate::css::tokenizer`] and slices
//! node text straight from the source, so parameters and selectors keep their
//! original spelling.

use logos::Logos;

use crate::ast::{Ast, NodeData, NodeId};
use crate::css::tokenizer::Token;

/// Errors from CSS parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token at byte {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
}

/// A token with its byte span in the source.
#[derive(Debug, Clone, Copy)]
struct PToken {
    token: Token,
    start: usize,
    end: usize,
}

/// Where a prelude (selector, at-rule params, declaration) stopped.
struct Prelude {
    /// Byte offset of the terminator, or the input length.
    end: usize,
    /// Byte offset of the first top-level `:`.
    colon: Option<usize>,
    /// The terminating token (not consumed), `None` at end of input.
    terminator: Option<Token>,
}

fn tokenize_with_spans(input: &str) -> Result<Vec<PToken>, ParseError> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        match result {
            Ok(token) => tokens.push(PToken {
                token,
                start: span.start,
                end: span.end,
            }),
            Err(()) => {
                return Err(ParseError::UnexpectedToken {
                    position: span.start,
                    message: format!("unrecognized input '{}'", &input[span]),
                });
            }
        }
    }
    Ok(tokens)
}

/// Parse `input` and append the resulting nodes to `root`.
pub fn parse_into(ast: &mut Ast, root: NodeId, input: &str) -> Result<(), ParseError> {
    let tokens = tokenize_with_spans(input)?;
    let mut parser = Parser {
        source: input,
        tokens,
        cursor: 0,
    };
    parser.parse_block(ast, root, false)
}

/// Parse `input` into a fresh arena. Returns the arena and the root node.
pub fn parse(input: &str) -> Result<(Ast, NodeId), ParseError> {
    let mut ast = Ast::new();
    let root = ast.create_root();
    parse_into(&mut ast, root, input)?;
    Ok((ast, root))
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<PToken>,
    cursor: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<PToken> {
        self.tokens.get(self.cursor).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|t| t.token == Token::Whitespace) {
            self.cursor += 1;
        }
    }

    /// End offset of the most recently consumed token.
    fn last_end(&self) -> usize {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.end)
            .unwrap_or(0)
    }

    /// Parse statements until end of input (top level) or the closing `}`
    /// of a nested block.
    fn parse_block(&mut self, ast: &mut Ast, parent: NodeId, nested: bool) -> Result<(), ParseError> {
        loop {
            self.skip_whitespace();
            let Some(tok) = self.peek() else {
                if nested {
                    return Err(ParseError::UnexpectedEof("expected '}'".into()));
                }
                return Ok(());
            };

            match tok.token {
                Token::BraceClose => {
                    self.cursor += 1;
                    if nested {
                        return Ok(());
                    }
                    return Err(ParseError::UnexpectedToken {
                        position: tok.start,
                        message: "unmatched '}'".into(),
                    });
                }
                Token::Semicolon => {
                    self.cursor += 1;
                }
                Token::Comment => {
                    self.cursor += 1;
                    let text = &self.source[tok.start + 2..tok.end - 2];
                    ast.append(parent, NodeData::comment(text).with_span(tok.start, tok.end));
                }
                Token::AtKeyword => self.parse_at_rule(ast, parent, tok)?,
                _ => self.parse_qualified(ast, parent, tok)?,
            }
        }
    }

    /// Advance to the next top-level `{`, `;` or `}`, tracking parentheses.
    fn scan_prelude(&mut self) -> Prelude {
        let mut depth = 0usize;
        let mut colon = None;
        while let Some(tok) = self.peek() {
            match tok.token {
                Token::ParenOpen => depth += 1,
                Token::ParenClose => depth = depth.saturating_sub(1),
                Token::Colon if depth == 0 && colon.is_none() => colon = Some(tok.start),
                Token::BraceOpen | Token::Semicolon | Token::BraceClose if depth == 0 => {
                    return Prelude {
                        end: tok.start,
                        colon,
                        terminator: Some(tok.token),
                    };
                }
                _ => {}
            }
            self.cursor += 1;
        }
        Prelude {
            end: self.source.len(),
            colon,
            terminator: None,
        }
    }

    /// `@name params;` or `@name params { ... }`.
    fn parse_at_rule(&mut self, ast: &mut Ast, parent: NodeId, keyword: PToken) -> Result<(), ParseError> {
        self.cursor += 1;
        let name = &self.source[keyword.start + 1..keyword.end];
        let prelude = self.scan_prelude();
        let params = self.source[keyword.end..prelude.end].trim();

        match prelude.terminator {
            Some(Token::BraceOpen) => {
                self.cursor += 1;
                let node = ast.append(parent, NodeData::at_block(name, params));
                self.parse_block(ast, node, true)?;
                let end = self.last_end();
                if let Some(data) = ast.get_mut(node) {
                    data.span = Some(crate::ast::Span {
                        start: keyword.start,
                        end,
                    });
                }
            }
            Some(Token::Semicolon) => {
                self.cursor += 1;
                let end = self.last_end();
                ast.append(
                    parent,
                    NodeData::at_rule(name, params).with_span(keyword.start, end),
                );
            }
            _ => {
                ast.append(
                    parent,
                    NodeData::at_rule(name, params).with_span(keyword.start, prelude.end),
                );
            }
        }
        Ok(())
    }

    /// A rule (`selector { ... }`) or a declaration (`property: value;`).
    fn parse_qualified(&mut self, ast: &mut Ast, parent: NodeId, first: PToken) -> Result<(), ParseError> {
        let start = first.start;
        let prelude = self.scan_prelude();

        if prelude.terminator == Some(Token::BraceOpen) {
            self.cursor += 1;
            let selector = self.source[start..prelude.end].trim();
            let node = ast.append(parent, NodeData::rule(selector));
            self.parse_block(ast, node, true)?;
            let end = self.last_end();
            if let Some(data) = ast.get_mut(node) {
                data.span = Some(crate::ast::Span { start, end });
            }
            return Ok(());
        }

        let Some(colon) = prelude.colon else {
            return Err(ParseError::UnexpectedToken {
                position: start,
                message: format!(
                    "expected ':' in declaration '{}'",
                    self.source[start..prelude.end].trim()
                ),
            });
        };

        let property = self.source[start..colon].trim();
        let (value, important) = split_important(self.source[colon + 1..prelude.end].trim());
        if prelude.terminator == Some(Token::Semicolon) {
            self.cursor += 1;
        }
        let end = self.last_end().max(prelude.end);

        let mut data = NodeData::declaration(property, value).with_span(start, end);
        if let crate::ast::NodeKind::Declaration { important: flag, .. } = &mut data.kind {
            *flag = important;
        }
        ast.append(parent, data);
        Ok(())
    }
}

/// Split a trailing `!important` (any case, optional space after `!`) off a
/// declaration value.
fn split_important(value: &str) -> (String, bool) {
    let lower = value.to_ascii_lowercase();
    if let Some(rest) = lower.strip_suffix("important") {
        if let Some(before) = rest.trim_end().strip_suffix('!') {
            return (value[..before.len()].trim_end().to_string(), true);
        }
    }
    (value.to_string(), false)
}
