//! Deterministic CSS printer.
//!
//! Statements are printed one per line with two-space indentation. The output
//! never ends with a newline, and an empty root prints as the empty string.

use crate::ast::{Ast, NodeId, NodeKind};

const INDENT: &str = "  ";

/// Serialize `node` and its subtree.
pub fn to_css(ast: &Ast, node: NodeId) -> String {
    let mut out = String::new();
    match ast.get(node).map(|data| &data.kind) {
        Some(NodeKind::Root) => print_children(ast, node, 0, &mut out),
        Some(_) => print_node(ast, node, 0, &mut out),
        None => {}
    }
    out
}

fn print_children(ast: &Ast, parent: NodeId, depth: usize, out: &mut String) {
    for (i, &child) in ast.children(parent).iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        print_node(ast, child, depth, out);
    }
}

fn print_node(ast: &Ast, node: NodeId, depth: usize, out: &mut String) {
    let Some(data) = ast.get(node) else {
        return;
    };
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    match &data.kind {
        NodeKind::Root => print_children(ast, node, depth, out),
        NodeKind::AtRule {
            name,
            params,
            block,
        } => {
            out.push('@');
            out.push_str(name);
            if !params.is_empty() {
                out.push(' ');
                out.push_str(params);
            }
            if *block {
                out.push(' ');
                print_block(ast, node, depth, out);
            } else {
                out.push(';');
            }
        }
        NodeKind::Rule { selector } => {
            out.push_str(selector);
            out.push(' ');
            print_block(ast, node, depth, out);
        }
        NodeKind::Declaration {
            property,
            value,
            important,
        } => {
            out.push_str(property);
            out.push_str(": ");
            out.push_str(value);
            if *important {
                out.push_str(" !important");
            }
            out.push(';');
        }
        NodeKind::Comment(text) => {
            out.push_str("/*");
            out.push_str(text);
            out.push_str("*/");
        }
    }
}

fn print_block(ast: &Ast, node: NodeId, depth: usize, out: &mut String) {
    if ast.children(node).is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    print_children(ast, node, depth + 1, out);
    out.push('\n');
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push('}');
}
