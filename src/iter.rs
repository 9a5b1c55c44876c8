use std::slice;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::arena::{Node, NodeId};
use crate::tree::Tree;

impl<T> Tree<T>{
    /// Return an iterator of references to this node and its ancestors.
    ///
    /// Call `.next().unwrap()` once on the iterator to skip the node itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, T> {
        Ancestors {
            tree: self,
            node: self.arena.get(id).map(|_| id),
        }
    }

    /// Return an iterator of references to this node’s children.
    pub fn children(&self, id: NodeId) -> Children<'_, T> {
        Children {
            tree: self,
            node: self.first_child(id),
        }
    }

    /// Return an iterator of this node and its descendants, in tree order.
    ///
    /// Parent nodes appear before the descendants.
    /// Call `.next().unwrap()` once on the iterator to skip the node itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_, T> {
        Descendants(self.traverse(id))
    }

    /// Return an iterator of this node and its descendants, children
    /// appearing before their parents.
    pub fn descendants_post(&self, id: NodeId) -> PostOrder<'_, T> {
        PostOrder {
            tree: self,
            bound: Some(id),
            next: self.arena.get(id).map(|_| self.leftmost_leaf(id)),
        }
    }

    /// Return an iterator of the start and end edges of this node and its
    /// descendants, in tree order.
    pub fn traverse(&self, id: NodeId) -> Traverse<'_, T> {
        Traverse {
            tree: self,
            root: id,
            next: self.arena.get(id).map(|_| NodeEdge::Start(id)),
        }
    }

    /// Ids of every node in pre-order.
    pub fn node_ids(&self) -> Descendants<'_, T> {
        match self.root {
            Some(root) => self.descendants(root),
            None => Descendants(Traverse{ tree: self, root: NodeId::new(0), next: None }),
        }
    }

    /// Payloads of every node in pre-order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter{
            tree: self,
            ids: self.node_ids(),
        }
    }

    /// Payloads of every node in post-order.
    pub fn iter_post(&self) -> IterPost<'_, T> {
        let ids = match self.root {
            Some(root) => self.descendants_post(root),
            None => PostOrder{ tree: self, bound: None, next: None },
        };
        IterPost{
            tree: self,
            ids,
        }
    }

    /// Payloads of every node in slot order, which is unrelated to the tree
    /// structure but doesn't need to follow links.
    pub fn values(&self) -> Values<'_, T> {
        Values{
            it: self.arena.nodes()
        }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, T> {
        ValuesMut{
            it: self.arena.nodes_mut()
        }
    }
}

#[cfg(feature = "parallel")]
impl<T: Sync> Tree<T>{
    /// Parallel iterator over every payload in slot order.
    pub fn par_values<'a>(&'a self) -> impl ParallelIterator<Item = &'a T> + 'a {
        self.arena.slots().par_iter().filter_map(|node| node.data.as_ref())
    }
}

#[cfg(feature = "parallel")]
impl<T: Send> Tree<T>{
    pub fn par_values_mut<'a>(&'a mut self) -> impl ParallelIterator<Item = &'a mut T> + 'a {
        self.arena.slots_mut().par_iter_mut().filter_map(|node| node.data.as_mut())
    }
}

macro_rules! impl_node_iterator {
    ($name: ident, $next: expr) => {
        impl<'a, T> Iterator for $name<'a, T> {
            type Item = NodeId;

            fn next(&mut self) -> Option<NodeId> {
                match self.node.take() {
                    Some(node) => {
                        self.node = $next(&self.tree.arena[node]);
                        Some(node)
                    }
                    None => None
                }
            }
        }
    }
}

/// An iterator of ids of a given node and its ancestors.
pub struct Ancestors<'a, T: 'a> {
    tree: &'a Tree<T>,
    node: Option<NodeId>,
}
impl_node_iterator!(Ancestors, |node: &Node<T>| node.parent());

/// An iterator of ids of the children of a given node.
pub struct Children<'a, T: 'a> {
    tree: &'a Tree<T>,
    node: Option<NodeId>,
}
impl_node_iterator!(Children, |node: &Node<T>| node.next_sibling());

/// An iterator of ids of a given node and its descendants, in tree order.
pub struct Descendants<'a, T: 'a>(Traverse<'a, T>);

impl<'a, T> Iterator for Descendants<'a, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            match self.0.next() {
                Some(NodeEdge::Start(node)) => return Some(node),
                Some(NodeEdge::End(_)) => {}
                None => return None
            }
        }
    }
}

/// An iterator of ids of a given node and its descendants, in post-order.
pub struct PostOrder<'a, T: 'a> {
    tree: &'a Tree<T>,
    bound: Option<NodeId>,
    next: Option<NodeId>,
}

impl<'a, T> Iterator for PostOrder<'a, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.next.take()?;
        self.next = self.tree.post_successor(node, self.bound);
        Some(node)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEdge<T> {
    /// Indicates that start of a node.
    /// Yielded by `Traverse::next` before the node’s descendants.
    /// In the text format, this corresponds to the opening `{value`
    Start(T),

    /// Indicates that end of a node.
    /// Yielded by `Traverse::next` after the node’s descendants.
    /// In the text format, this corresponds to the closing `}`
    End(T),
}

/// An iterator of the edges of a given node and its descendants, in tree order.
pub struct Traverse<'a, T: 'a> {
    tree: &'a Tree<T>,
    root: NodeId,
    next: Option<NodeEdge<NodeId>>,
}

impl<'a, T> Iterator for Traverse<'a, T> {
    type Item = NodeEdge<NodeId>;

    fn next(&mut self) -> Option<NodeEdge<NodeId>> {
        match self.next.take() {
            Some(item) => {
                self.next = match item {
                    NodeEdge::Start(node) => {
                        match self.tree.arena[node].first_child() {
                            Some(first_child) => Some(NodeEdge::Start(first_child)),
                            None => Some(NodeEdge::End(node))
                        }
                    }
                    NodeEdge::End(node) => {
                        if node == self.root {
                            None
                        } else {
                            let node = &self.tree.arena[node];
                            match node.next_sibling() {
                                Some(next_sibling) => Some(NodeEdge::Start(next_sibling)),
                                // Only `None` if the root was reached without
                                // passing through `self.root`.
                                None => node.parent().map(NodeEdge::End)
                            }
                        }
                    }
                };
                Some(item)
            }
            None => None
        }
    }
}

pub struct Iter<'a, T: 'a>{
    tree: &'a Tree<T>,
    ids: Descendants<'a, T>,
}

impl<'a, T: 'a> Iterator for Iter<'a, T>{
    type Item = &'a T;
    #[inline]
    fn next(&mut self) -> Option<&'a T>{
        let tree = self.tree;
        self.ids.next().map(|id| &tree[id])
    }
}

pub struct IterPost<'a, T: 'a>{
    tree: &'a Tree<T>,
    ids: PostOrder<'a, T>,
}

impl<'a, T: 'a> Iterator for IterPost<'a, T>{
    type Item = &'a T;
    #[inline]
    fn next(&mut self) -> Option<&'a T>{
        let tree = self.tree;
        self.ids.next().map(|id| &tree[id])
    }
}

impl<'a, T> IntoIterator for &'a Tree<T>{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T>{
        self.iter()
    }
}

pub struct Values<'a, T: 'a>{
    it: slice::Iter<'a, Node<T>>
}

impl<'a, T: 'a> Iterator for Values<'a, T>{
    type Item = &'a T;
    #[inline]
    fn next(&mut self) -> Option<&'a T>{
        loop {
            let node = self.it.next()?;
            if let Some(data) = node.data.as_ref() {
                return Some(data);
            }
        }
    }
}

pub struct ValuesMut<'a, T: 'a>{
    it: slice::IterMut<'a, Node<T>>
}

impl<'a, T: 'a> Iterator for ValuesMut<'a, T>{
    type Item = &'a mut T;
    #[inline]
    fn next(&mut self) -> Option<&'a mut T>{
        loop {
            let node = self.it.next()?;
            if let Some(data) = node.data.as_mut() {
                return Some(data);
            }
        }
    }
}
