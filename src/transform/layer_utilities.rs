//! Rewrite class rules in utility layers into utility definitions.
//!
//! `@layer utilities { .btn { ... } }` becomes `@utility btn { ... }` at the
//! position of the layer block. A stylesheet that is itself a member of a
//! utility layer (imported with `layer(utilities)`) gets its top-level class
//! rules rewritten in place. Rules with anything but a single class selector
//! stay where they are.

use crate::ast::{Ast, NodeData, NodeId, NodeKind};
use crate::error::Result;

use super::{SheetTransform, TransformContext};

pub struct LayerUtilities;

impl SheetTransform for LayerUtilities {
    fn name(&self) -> &str {
        "layer-utilities"
    }

    fn transform(&self, ast: &mut Ast, root: NodeId, ctx: &TransformContext<'_>) -> Result<()> {
        let config = ctx.config;

        let blocks: Vec<NodeId> = ast
            .children(root)
            .iter()
            .copied()
            .filter(|&id| {
                ast.get(id).is_some_and(|data| match &data.kind {
                    NodeKind::AtRule {
                        name,
                        params,
                        block: true,
                    } => name.eq_ignore_ascii_case("layer") && config.layers.iter().any(|l| l == params.trim()),
                    _ => false,
                })
            })
            .collect();

        for block in blocks {
            for rule in ast.children(block).to_vec() {
                if let Some(utility) = convert_rule(ast, rule, &config.at_rule) {
                    ast.move_to(utility, root, ast.index_of(block).unwrap_or(0));
                }
            }
            if ast.children(block).is_empty() {
                ast.remove(block);
            }
        }

        if ctx.layers.iter().any(|layer| config.layers.contains(layer)) {
            for rule in ast.children(root).to_vec() {
                convert_rule(ast, rule, &config.at_rule);
            }
        }
        Ok(())
    }
}

/// Replace a single-class rule with an at-rule named `at_rule` holding the
/// same children. Returns the new node.
fn convert_rule(ast: &mut Ast, rule: NodeId, at_rule: &str) -> Option<NodeId> {
    let name = match &ast.get(rule)?.kind {
        NodeKind::Rule { selector } => simple_class(selector)?.to_string(),
        _ => return None,
    };
    let utility = ast.insert_before(rule, NodeData::at_block(at_rule, name))?;
    for child in ast.children(rule).to_vec() {
        ast.reparent(child, utility);
    }
    ast.remove(rule);
    Some(utility)
}

/// `btn` for `.btn`; `None` for compound, escaped or combined selectors.
fn simple_class(selector: &str) -> Option<&str> {
    let name = selector.trim().strip_prefix('.')?;
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_');
    valid.then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SplitConfig;
    use crate::css::{parse, to_css};
    use insta::assert_snapshot;
    use std::collections::BTreeSet;

    fn migrate(input: &str, layers: &[&str]) -> String {
        let (mut ast, root) = parse(input).unwrap();
        let layers: BTreeSet<String> = layers.iter().map(|l| l.to_string()).collect();
        let config = SplitConfig::default();
        let ctx = TransformContext {
            file: None,
            layers: &layers,
            config: &config,
        };
        LayerUtilities.transform(&mut ast, root, &ctx).unwrap();
        to_css(&ast, root)
    }

    #[test]
    fn layer_block_becomes_utilities() {
        assert_snapshot!(
            migrate(".x {} @layer utilities { .a { color: red } .b { color: blue } } .y {}", &[]),
            @r"
        .x {}
        @utility a {
          color: red;
        }
        @utility b {
          color: blue;
        }
        .y {}
        "
        );
    }

    #[test]
    fn complex_selectors_stay_in_layer() {
        assert_snapshot!(
            migrate("@layer components { .card > p { margin: 0 } .card { padding: 0 } }", &[]),
            @r"
        @utility card {
          padding: 0;
        }
        @layer components {
          .card > p {
            margin: 0;
          }
        }
        "
        );
    }

    #[test]
    fn other_layers_are_untouched() {
        let input = "@layer base {\n  .a {}\n}";
        assert_eq!(migrate(input, &[]), input);
    }

    #[test]
    fn member_sheet_rules_are_converted() {
        assert_eq!(
            migrate(".a { color: red }\nh1 { margin: 0 }", &["utilities"]),
            "@utility a {\n  color: red;\n}\nh1 {\n  margin: 0;\n}"
        );
        assert_eq!(migrate(".a {}", &["base"]), ".a {}");
    }

    #[test]
    fn simple_class_selectors() {
        assert_eq!(simple_class(".btn"), Some("btn"));
        assert_eq!(simple_class(" .btn-lg_2 "), Some("btn-lg_2"));
        assert_eq!(simple_class(".a.b"), None);
        assert_eq!(simple_class(".a:hover"), None);
        assert_eq!(simple_class(".1x"), None);
        assert_eq!(simple_class("btn"), None);
        assert_eq!(simple_class("."), None);
    }
}
