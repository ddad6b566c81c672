//! Node types: NodeId, NodeData, NodeKind.

use slotmap::new_key_type;

use crate::sheet::SheetId;

new_key_type! {
    /// Unique identifier for a CSS tree node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Byte range of a node in the text it was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Top-level container of one stylesheet.
    Root,
    /// `@name params;` or `@name params { ... }`.
    AtRule {
        name: String,
        params: String,
        /// Whether the at-rule carries a `{ ... }` block.
        block: bool,
    },
    /// `selector { ... }`.
    Rule { selector: String },
    /// `property: value [!important]`.
    Declaration {
        property: String,
        value: String,
        important: bool,
    },
    /// Comment text without the `/*` `*/` delimiters.
    Comment(String),
}

/// The import an injected `@import` was synthesized from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOrigin {
    /// Stylesheet the original import pointed at.
    pub sheet: SheetId,
    /// Specifier exactly as written in the original import.
    pub specifier: String,
}

/// Data associated with a single tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub kind: NodeKind,
    /// Source location, `None` for synthesized nodes.
    pub span: Option<Span>,
    /// Set on `@import` rules created by the migration itself.
    pub injected: bool,
    pub origin: Option<ImportOrigin>,
}

impl NodeData {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            span: None,
            injected: false,
            origin: None,
        }
    }

    pub fn root() -> Self {
        Self::new(NodeKind::Root)
    }

    /// An at-rule without a block, e.g. `@import "./a.css";`.
    pub fn at_rule(name: impl Into<String>, params: impl Into<String>) -> Self {
        Self::new(NodeKind::AtRule {
            name: name.into(),
            params: params.into(),
            block: false,
        })
    }

    /// An at-rule with a (possibly empty) block.
    pub fn at_block(name: impl Into<String>, params: impl Into<String>) -> Self {
        Self::new(NodeKind::AtRule {
            name: name.into(),
            params: params.into(),
            block: true,
        })
    }

    pub fn rule(selector: impl Into<String>) -> Self {
        Self::new(NodeKind::Rule {
            selector: selector.into(),
        })
    }

    pub fn declaration(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(NodeKind::Declaration {
            property: property.into(),
            value: value.into(),
            important: false,
        })
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Comment(text.into()))
    }

    /// Set the source span (builder).
    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.span = Some(Span { start, end });
        self
    }

    /// Mark this node as created by the migration (builder).
    pub fn injected_from(mut self, origin: ImportOrigin) -> Self {
        self.injected = true;
        self.origin = Some(origin);
        self
    }

    /// Whether this node is an at-rule with the given name (ASCII case-insensitive).
    pub fn is_at_rule(&self, name: &str) -> bool {
        matches!(&self.kind, NodeKind::AtRule { name: n, .. } if n.eq_ignore_ascii_case(name))
    }

    /// Whether this node is an `@import` directive.
    pub fn is_import(&self) -> bool {
        self.is_at_rule("import")
    }

    /// Parameters of an at-rule.
    pub fn params(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::AtRule { params, .. } => Some(params),
            _ => None,
        }
    }

    /// Replace the parameters of an at-rule. No-op for other kinds.
    pub fn set_params(&mut self, value: impl Into<String>) {
        if let NodeKind::AtRule { params, .. } = &mut self.kind {
            *params = value.into();
        }
    }
}
