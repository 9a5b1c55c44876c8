use std::fmt;
use std::ptr;

use boolinator::Boolinator;

use crate::arena::NodeId;
use crate::tree::Tree;

/// A read only position in a tree: a node id or the end position.
///
/// Navigation methods move the cursor one link at a time and report
/// whether the move happened, leaving it untouched otherwise. The traversal
/// methods reach the end position (`is_end`) once exhausted.
pub struct Cursor<'a, T: 'a>{
    tree: &'a Tree<T>,
    node: Option<NodeId>,
}

impl<'a, T: 'a> Clone for Cursor<'a, T>{
    fn clone(&self) -> Cursor<'a, T>{
        *self
    }
}

impl<'a, T: 'a> Copy for Cursor<'a, T>{}

impl<'a, T: 'a> PartialEq for Cursor<'a, T>{
    fn eq(&self, other: &Cursor<'a, T>) -> bool{
        ptr::eq(self.tree, other.tree) && self.node == other.node
    }
}

impl<'a, T: 'a> fmt::Debug for Cursor<'a, T>{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result{
        f.debug_tuple("Cursor").field(&self.node).finish()
    }
}

impl<T> Tree<T>{
    /// Cursor at the root, or at the end position for an empty tree.
    pub fn root_cursor(&self) -> Cursor<'_, T>{
        Cursor{ tree: self, node: self.root }
    }

    pub fn end_cursor(&self) -> Cursor<'_, T>{
        Cursor{ tree: self, node: None }
    }

    /// Cursor at `id`, or at the end position if `id` is not a live node.
    pub fn cursor(&self, id: NodeId) -> Cursor<'_, T>{
        Cursor{ tree: self, node: self.contains(id).as_some(id) }
    }

    /// Cursor at the first node in post-order: the deepest leftmost
    /// descendant of the root.
    pub fn post_cursor(&self) -> Cursor<'_, T>{
        Cursor{ tree: self, node: self.root.map(|root| self.leftmost_leaf(root)) }
    }

    /// Cursor at the first node of the post-order walk of the subtree of `id`.
    pub fn subtree_post_cursor(&self, id: NodeId) -> Cursor<'_, T>{
        Cursor{ tree: self, node: self.contains(id).as_some_from(|| self.leftmost_leaf(id)) }
    }
}

impl<'a, T: 'a> Cursor<'a, T>{
    pub fn tree(&self) -> &'a Tree<T>{
        self.tree
    }

    pub fn id(&self) -> Option<NodeId>{
        self.node
    }

    pub fn is_end(&self) -> bool{
        self.node.is_none()
    }

    pub fn get(&self) -> Option<&'a T>{
        let tree = self.tree;
        self.node.and_then(|id| tree.get(id))
    }

    fn step<F>(&mut self, link: F) -> bool
        where F: FnOnce(&Tree<T>, NodeId) -> Option<NodeId>
    {
        match self.node.and_then(|id| link(self.tree, id)) {
            Some(next) => {
                self.node = Some(next);
                true
            }
            None => false
        }
    }

    pub fn up(&mut self) -> bool{
        self.step(Tree::parent)
    }

    pub fn down(&mut self) -> bool{
        self.step(Tree::first_child)
    }

    pub fn left(&mut self) -> bool{
        self.step(Tree::previous_sibling)
    }

    pub fn right(&mut self) -> bool{
        self.step(Tree::next_sibling)
    }

    /// Moves to the next node in pre-order. Returns false once the end is
    /// reached.
    pub fn next(&mut self) -> bool{
        let tree = self.tree;
        self.node = self.node.and_then(|id| tree.pre_successor(id, None));
        self.node.is_some()
    }

    /// Moves to the next node in post-order. Start from `Tree::post_cursor`
    /// to visit the whole tree.
    pub fn next_post(&mut self) -> bool{
        let tree = self.tree;
        self.node = self.node.and_then(|id| tree.post_successor(id, None));
        self.node.is_some()
    }

    /// Pre-order step that reaches the end instead of leaving the subtree of
    /// `reference`.
    pub fn next_sub_pre(&mut self, reference: NodeId) -> bool{
        let tree = self.tree;
        self.node = self.node.and_then(|id| tree.pre_successor(id, Some(reference)));
        self.node.is_some()
    }

    /// Post-order step that reaches the end after visiting `reference`.
    pub fn next_sub_post(&mut self, reference: NodeId) -> bool{
        let tree = self.tree;
        self.node = self.node.and_then(|id| tree.post_successor(id, Some(reference)));
        self.node.is_some()
    }

    pub fn degree(&self) -> usize{
        self.node.map_or(0, |id| self.tree.degree(id))
    }

    pub fn depth(&self) -> usize{
        self.node.map_or(0, |id| self.tree.depth(id))
    }

    /// Lowest common ancestor of both cursors, the end position if either is
    /// at the end.
    pub fn lca(&self, other: &Cursor<'a, T>) -> Cursor<'a, T>{
        let node = match (self.node, other.node) {
            (Some(a), Some(b)) => self.tree.lca(a, b),
            _ => None,
        };
        Cursor{ tree: self.tree, node }
    }
}
