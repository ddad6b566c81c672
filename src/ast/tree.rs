//! Tree operations: insert, remove, move, walk.

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId};

/// Traversal control returned by [`Ast::walk`] visitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Descend into the node's children.
    Continue,
    /// Do not visit the node's children.
    Skip,
}

/// The CSS trees of every stylesheet, backed by one slotmap arena.
///
/// Each stylesheet owns a [`NodeKind::Root`](super::NodeKind::Root) node.
/// Because all trees share the arena, nodes can move between stylesheets
/// without being cloned and a [`NodeId`] stays valid across the move.
pub struct Ast {
    nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
}

impl Ast {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
        }
    }

    /// Insert a detached node (no parent). Used for roots.
    pub fn create(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Insert a new, empty root node.
    pub fn create_root(&mut self) -> NodeId {
        self.create(NodeData::root())
    }

    /// Insert a node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the arena.
    pub fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let index = self.children(parent).len();
        self.insert_at(parent, index, data)
    }

    /// Insert a node as the child of `parent` at `index` (clamped to the
    /// number of children).
    pub fn insert_at(&mut self, parent: NodeId, index: usize, data: NodeData) -> NodeId {
        debug_assert!(self.nodes.contains_key(parent), "parent node does not exist");
        let id = self.create(data);
        self.attach(id, parent, index);
        id
    }

    /// Insert a node immediately before `sibling`. Returns `None` if `sibling`
    /// has no parent.
    pub fn insert_before(&mut self, sibling: NodeId, data: NodeData) -> Option<NodeId> {
        let parent = self.parent(sibling)?;
        let index = self.index_of(sibling)?;
        Some(self.insert_at(parent, index, data))
    }

    /// Insert a node immediately after `sibling`. Returns `None` if `sibling`
    /// has no parent.
    pub fn insert_after(&mut self, sibling: NodeId, data: NodeData) -> Option<NodeId> {
        let parent = self.parent(sibling)?;
        let index = self.index_of(sibling)?;
        Some(self.insert_at(parent, index + 1, data))
    }

    /// Drop `id` together with its subtree and hand back the data of `id`.
    pub fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        self.detach(id);
        let data = self.nodes.remove(id)?;

        let mut pending = self.children.remove(id).unwrap_or_default();
        while let Some(node) = pending.pop() {
            pending.extend(self.children.remove(node).unwrap_or_default());
            self.parent.remove(node);
            self.nodes.remove(node);
        }
        Some(data)
    }

    /// Move `node` (with its subtree) to become the child of `new_parent` at
    /// `index` (clamped). The node is detached from its old parent first.
    ///
    /// Moving a node under one of its own descendants is a logic error and is
    /// caught by a debug assertion.
    pub fn move_to(&mut self, node: NodeId, new_parent: NodeId, index: usize) {
        debug_assert!(
            self.ancestors_of(new_parent).all(|ancestor| ancestor != node),
            "cannot move a node into its own subtree"
        );
        self.detach(node);
        self.attach(node, new_parent, index);
    }

    /// Move `node` to the end of `new_parent`'s children.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) {
        let index = self.children(new_parent).len();
        self.move_to(node, new_parent, index);
    }

    fn attach(&mut self, node: NodeId, parent: NodeId, index: usize) {
        if let Some(siblings) = self.children.get_mut(parent) {
            let index = index.min(siblings.len());
            siblings.insert(index, node);
            self.parent.insert(node, parent);
        }
    }

    fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.parent.remove(node) else {
            return;
        };
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.retain(|&child| child != node);
        }
    }

    /// `node` itself followed by each enclosing node up to its root.
    fn ancestors_of(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(node), |&current| self.parent(current))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Child list of `id`; empty for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Position of `id` among its siblings.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// Walk up from `id` to the node without a parent.
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        if !self.nodes.contains_key(id) {
            return None;
        }
        self.ancestors_of(id).last()
    }

    /// Pre-order depth-first traversal of the descendants of `start`.
    ///
    /// `start` itself is not visited. Returning [`Walk::Skip`] from `visit`
    /// prevents descent into that node's children.
    pub fn walk<F>(&self, start: NodeId, mut visit: F)
    where
        F: FnMut(NodeId, &NodeData) -> Walk,
    {
        let mut stack: Vec<NodeId> = self.children(start).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            let Some(data) = self.nodes.get(current) else {
                continue;
            };
            if visit(current, data) == Walk::Continue {
                stack.extend(self.children(current).iter().rev());
            }
        }
    }

    /// Collect descendants of `start` matching `predicate`, without looking
    /// inside a match.
    pub fn find_all<P>(&self, start: NodeId, mut predicate: P) -> Vec<NodeId>
    where
        P: FnMut(&NodeData) -> bool,
    {
        let mut found = Vec::new();
        self.walk(start, |id, data| {
            if predicate(data) {
                found.push(id);
                Walk::Skip
            } else {
                Walk::Continue
            }
        });
        found
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// Live nodes across every stylesheet tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }
}

impl Default for Ast {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;

    /// Fixture tree:
    /// ```text
    ///        root
    ///       /    \
    ///   @media    .b
    ///    /  \
    ///  .c    @utility d
    /// ```
    fn build_tree() -> (Ast, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut ast = Ast::new();
        let root = ast.create_root();
        let a = ast.append(root, NodeData::at_block("media", "screen"));
        let b = ast.append(root, NodeData::rule(".b"));
        let c = ast.append(a, NodeData::rule(".c"));
        let d = ast.append(a, NodeData::at_block("utility", "d"));
        (ast, root, a, b, c, d)
    }

    #[test]
    fn append_parent_relationship() {
        let (ast, root, a, _b, c, _d) = build_tree();
        assert_eq!(ast.parent(a), Some(root));
        assert_eq!(ast.parent(c), Some(a));
        assert_eq!(ast.parent(root), None);
    }

    #[test]
    fn children_keep_insertion_order() {
        let (ast, root, a, b, c, d) = build_tree();
        assert_eq!(ast.children(root), &[a, b]);
        assert_eq!(ast.children(a), &[c, d]);
        assert!(ast.children(c).is_empty());
    }

    #[test]
    fn insert_before_and_after() {
        let (mut ast, root, a, b, ..) = build_tree();
        let before = ast.insert_before(b, NodeData::comment("x")).unwrap();
        let after = ast.insert_after(a, NodeData::comment("y")).unwrap();
        assert_eq!(ast.children(root), &[a, after, before, b]);
        assert_eq!(ast.index_of(b), Some(3));
    }

    #[test]
    fn insert_after_detached_node_is_none() {
        let mut ast = Ast::new();
        let root = ast.create_root();
        assert!(ast.insert_after(root, NodeData::comment("x")).is_none());
    }

    #[test]
    fn insert_at_clamps_index() {
        let (mut ast, root, a, b, ..) = build_tree();
        let last = ast.insert_at(root, 99, NodeData::comment("z"));
        assert_eq!(ast.children(root), &[a, b, last]);
    }

    #[test]
    fn root_of_nested_node() {
        let (ast, root, _a, _b, c, _d) = build_tree();
        assert_eq!(ast.root_of(c), Some(root));
        assert_eq!(ast.root_of(root), Some(root));
    }

    #[test]
    fn remove_drops_descendants() {
        let (mut ast, root, a, b, c, d) = build_tree();
        let removed = ast.remove(a).unwrap();
        assert!(matches!(removed.kind, NodeKind::AtRule { .. }));
        assert!(!ast.contains(c));
        assert!(!ast.contains(d));
        assert_eq!(ast.children(root), &[b]);
        assert_eq!(ast.len(), 2);
        assert!(ast.remove(a).is_none());
    }

    #[test]
    fn move_between_roots_keeps_subtree() {
        let (mut ast, root, a, b, c, d) = build_tree();
        let other = ast.create_root();
        ast.reparent(a, other);
        assert_eq!(ast.children(root), &[b]);
        assert_eq!(ast.children(other), &[a]);
        assert_eq!(ast.children(a), &[c, d]);
        assert_eq!(ast.root_of(d), Some(other));
    }

    #[test]
    fn move_to_front() {
        let (mut ast, root, a, b, ..) = build_tree();
        ast.move_to(b, root, 0);
        assert_eq!(ast.children(root), &[b, a]);
    }

    #[test]
    fn walk_is_pre_order() {
        let (ast, root, a, b, c, d) = build_tree();
        let mut order = Vec::new();
        ast.walk(root, |id, _| {
            order.push(id);
            Walk::Continue
        });
        assert_eq!(order, vec![a, c, d, b]);
    }

    #[test]
    fn walk_skip_prunes_children() {
        let (ast, root, a, b, ..) = build_tree();
        let mut order = Vec::new();
        ast.walk(root, |id, _| {
            order.push(id);
            Walk::Skip
        });
        assert_eq!(order, vec![a, b]);
    }

    #[test]
    fn find_all_does_not_descend_into_matches() {
        let mut ast = Ast::new();
        let root = ast.create_root();
        let outer = ast.append(root, NodeData::at_block("utility", "outer"));
        ast.append(outer, NodeData::at_block("utility", "inner"));
        let media = ast.append(root, NodeData::at_block("media", "print"));
        let nested = ast.append(media, NodeData::at_block("utility", "nested"));

        let found = ast.find_all(root, |data| data.is_at_rule("utility"));
        assert_eq!(found, vec![outer, nested]);
    }

    #[test]
    fn default_is_empty() {
        let ast = Ast::default();
        assert!(ast.is_empty());
    }
}
