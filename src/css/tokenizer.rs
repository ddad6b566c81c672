//! logos-based CSS tokenizer.
//!
//! The parser only needs statement boundaries, so the token set is coarse:
//! everything that is not structural punctuation, whitespace, a comment, a
//! string or an at-keyword is a [`Token::Word`]. Node text is sliced from the
//! source by span, never rebuilt from tokens.
//!
//! Priority notes:
//! - `/* ... */` matches [`Token::Comment`], a lone `/` is [`Token::Slash`]
//! - `@import` matches [`Token::AtKeyword`], a lone `@` is [`Token::At`]

use logos::Logos;

/// CSS token produced by the lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Block comment, delimiters included.
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/")]
    Comment,

    /// At-keyword: `@import`, `@layer`, `@utility`.
    #[regex(r"@[a-zA-Z_-][a-zA-Z0-9_-]*")]
    AtKeyword,

    /// Double-quoted string literal (escapes allowed).
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    DoubleQuoted,

    /// Single-quoted string literal (escapes allowed).
    #[regex(r"'([^'\\\n]|\\.)*'")]
    SingleQuoted,

    #[regex(r"[ \t\n\r\f]+")]
    Whitespace,

    /// Any run of characters without structural meaning.
    #[regex(r#"[^ \t\n\r\f{}();:"'/@]+"#)]
    Word,

    /// `{`
    #[token("{")]
    BraceOpen,

    /// `}`
    #[token("}")]
    BraceClose,

    /// `(`
    #[token("(")]
    ParenOpen,

    /// `)`
    #[token(")")]
    ParenClose,

    /// `;`
    #[token(";")]
    Semicolon,

    /// `:`
    #[token(":")]
    Colon,

    /// `/`
    #[token("/")]
    Slash,

    /// `@`
    #[token("@")]
    At,
}

/// Tokenize a CSS string into `(Token, String)` pairs.
///
/// Input that fails to lex is dropped.
pub fn tokenize(input: &str) -> Vec<(Token, String)> {
    let lexer = Token::lexer(input);
    lexer
        .spanned()
        .filter_map(|(result, span)| result.ok().map(|token| (token, input[span].to_string())))
        .collect()
}
