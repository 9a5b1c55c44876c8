use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Index, IndexMut};

use crate::arena::{Arena, Node, NodeId, Parent};
use crate::error::{Error, Result};
use crate::iter::NodeEdge;

/// A multiway tree stored in a single slot array.
///
/// Nodes are addressed by `NodeId`, which stays valid while the node is
/// alive even if the array is reallocated. Every node keeps four links:
/// parent, first child and previous/next sibling.
#[derive(Clone)]
pub struct Tree<T>{
    pub(crate) arena: Arena<T>,
    pub(crate) root: Option<NodeId>,
}

/// Links of a node that define its place in the structure.
#[derive(Copy, Clone)]
struct Links{
    parent: Parent,
    child: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl Links{
    // Rewrites references to `a` as `b` and the other way around.
    fn exchanged(self, a: NodeId, b: NodeId) -> Links{
        let swap = |id: NodeId| if id == a { b } else if id == b { a } else { id };
        Links{
            parent: match self.parent {
                Parent::Node(parent) => Parent::Node(swap(parent)),
                other => other,
            },
            child: self.child.map(swap),
            left: self.left.map(swap),
            right: self.right.map(swap),
        }
    }
}

impl<T> Default for Tree<T>{
    fn default() -> Tree<T>{
        Tree::new()
    }
}

impl<T> Tree<T>{
    pub fn new() -> Tree<T>{
        Tree{
            arena: Arena::new(),
            root: None,
        }
    }

    /// Panic
    /// -----
    ///
    /// Panics if `capacity` exceeds `NodeId::MAX` or the allocation fails.
    pub fn with_capacity(capacity: usize) -> Tree<T>{
        let mut tree = Tree::new();
        tree.reserve(capacity);
        tree
    }

    pub fn len(&self) -> usize{
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool{
        self.root.is_none()
    }

    pub fn capacity(&self) -> usize{
        self.arena.capacity()
    }

    /// Grows the slot array to hold at least `capacity` nodes.
    ///
    /// Panic
    /// -----
    ///
    /// Panics on allocation failure, use `try_reserve` to handle it.
    pub fn reserve(&mut self, capacity: usize){
        self.arena.reserve(capacity)
    }

    pub fn try_reserve(&mut self, capacity: usize) -> Result<()>{
        self.arena.try_reserve(capacity)
    }

    /// Marks the slot array as not expected to move.
    ///
    /// This is a contract for the caller: reserve enough capacity before
    /// locking. Growing while locked still works but is reported with a
    /// warning through the `log` facade.
    pub fn lock(&mut self, locked: bool){
        self.arena.lock(locked)
    }

    pub fn is_locked(&self) -> bool{
        self.arena.is_locked()
    }

    /// Drops every node keeping the allocated capacity.
    pub fn reset(&mut self){
        debug!("resetting tree with {} nodes", self.len());
        self.arena.reset();
        self.root = None;
    }

    /// Drops every node and releases the slot array.
    pub fn clear(&mut self){
        debug!("clearing tree with {} nodes", self.len());
        self.arena.clear();
        self.root = None;
    }

    pub fn root(&self) -> Option<NodeId>{
        self.root
    }

    pub fn contains(&self, id: NodeId) -> bool{
        self.arena.contains(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<T>>{
        self.arena.get(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&T>{
        self.arena.get(id).and_then(|node| node.data.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T>{
        if self.contains(id) {
            self.arena[id].data.as_mut()
        }else{
            None
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId>{
        self.arena.get(id).and_then(Node::parent)
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId>{
        self.arena.get(id).and_then(Node::first_child)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId>{
        self.arena.get(id).and_then(Node::previous_sibling)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId>{
        self.arena.get(id).and_then(Node::next_sibling)
    }

    pub fn is_root(&self, id: NodeId) -> bool{
        self.root == Some(id)
    }

    pub fn is_leaf(&self, id: NodeId) -> bool{
        self.first_child(id).is_none()
    }

    /// Whether `ancestor` is a proper ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool{
        self.ancestors(id).skip(1).any(|a| a == ancestor)
    }

    /// Number of immediate children of `id`.
    pub fn degree(&self, id: NodeId) -> usize{
        self.children(id).count()
    }

    /// Number of ancestors between `id` and the root, 0 for the root.
    pub fn depth(&self, id: NodeId) -> usize{
        self.ancestors(id).skip(1).count()
    }

    /// Lowest common ancestor of `a` and `b`, a node being its own ancestor.
    pub fn lca(&self, a: NodeId, b: NodeId) -> Option<NodeId>{
        if !self.contains(a) || !self.contains(b) {
            return None;
        }
        let (mut a, mut b) = (a, b);
        let (mut depth_a, mut depth_b) = (self.depth(a), self.depth(b));
        while depth_a > depth_b {
            a = self.arena[a].parent()?;
            depth_a -= 1;
        }
        while depth_b > depth_a {
            b = self.arena[b].parent()?;
            depth_b -= 1;
        }
        while a != b {
            a = self.arena[a].parent()?;
            b = self.arena[b].parent()?;
        }
        Some(a)
    }

    fn check(&self, id: NodeId){
        if !self.contains(id) {
            panic!("{}", Error::InvalidNode(id))
        }
    }

    fn links(&self, id: NodeId) -> Links{
        let node = &self.arena[id];
        Links{
            parent: node.parent,
            child: node.child,
            left: node.left,
            right: node.right,
        }
    }

    fn set_links(&mut self, id: NodeId, links: Links){
        let node = &mut self.arena[id];
        node.parent = links.parent;
        node.child = links.child;
        node.left = links.left;
        node.right = links.right;
    }

    // Points whatever precedes a node (its left sibling, the parent's first
    // child link or the tree root) to `next`.
    fn replace_in_parent(&mut self, parent: Parent, left: Option<NodeId>, next: Option<NodeId>){
        match (left, parent) {
            (Some(left), _) => self.arena[left].right = next,
            (None, Parent::Node(parent)) => self.arena[parent].child = next,
            (None, Parent::Root) => self.root = next,
            (None, Parent::Free) => debug_assert!(false, "linking into a free slot"),
        }
    }

    /// Makes the neighbours named in the node's own links point back at it.
    fn attach(&mut self, id: NodeId){
        let (parent, left, right) = {
            let node = &self.arena[id];
            (node.parent, node.left, node.right)
        };
        self.replace_in_parent(parent, left, Some(id));
        if let Some(right) = right {
            self.arena[right].left = Some(id);
        }
    }

    /// Detach a node from its parent and siblings. Children are not affected.
    fn detach(&mut self, id: NodeId){
        let (parent, left, right) = {
            let node = &mut self.arena[id];
            (node.parent, node.left.take(), node.right.take())
        };
        self.replace_in_parent(parent, left, right);
        if let Some(right) = right {
            self.arena[right].left = left;
        }
    }

    /// Sets `parent` on every node of the sibling list starting at `first`.
    /// Returns the last node of the list.
    fn reparent(&mut self, first: Option<NodeId>, parent: Parent) -> Option<NodeId>{
        let mut last = None;
        let mut next = first;
        while let Some(id) = next {
            let node = &mut self.arena[id];
            node.parent = parent;
            last = Some(id);
            next = node.right;
        }
        last
    }

    /// Replaces the whole tree with a single root node.
    pub fn set_root(&mut self, value: T) -> NodeId{
        self.reset();
        let id = self.arena.alloc(value, Parent::Root);
        self.root = Some(id);
        id
    }

    /// Inserts a new node in the place of `pos`, `pos` becoming its only child.
    pub fn insert_above(&mut self, pos: NodeId, value: T) -> NodeId{
        self.check(pos);
        let links = self.links(pos);
        let id = self.arena.alloc(value, links.parent);
        self.set_links(id, Links{
            child: Some(pos),
            ..links
        });
        self.set_links(pos, Links{
            parent: Parent::Node(id),
            left: None,
            right: None,
            ..links
        });
        self.attach(id);
        id
    }

    /// Inserts a new node as the only child of `pos`, adopting the previous
    /// children of `pos`.
    pub fn insert_below(&mut self, pos: NodeId, value: T) -> NodeId{
        self.check(pos);
        let children = self.arena[pos].child;
        let id = self.arena.alloc(value, Parent::Node(pos));
        self.arena[id].child = children;
        self.arena[pos].child = Some(id);
        self.reparent(children, Parent::Node(id));
        id
    }

    /// Inserts a new node as the first child of `pos`.
    pub fn insert_child(&mut self, pos: NodeId, value: T) -> NodeId{
        self.check(pos);
        let first = self.arena[pos].child;
        let id = self.arena.alloc(value, Parent::Node(pos));
        self.arena[id].right = first;
        if let Some(first) = first {
            self.arena[first].left = Some(id);
        }
        self.arena[pos].child = Some(id);
        id
    }

    /// Inserts a new node as the last child of `pos`.
    pub fn append_child(&mut self, pos: NodeId, value: T) -> NodeId{
        self.check(pos);
        let last = self.children(pos).last();
        match last {
            Some(last) => self.insert_sibling(last, value, false),
            None => self.insert_child(pos, value),
        }
    }

    /// Inserts a new sibling immediately before `pos`.
    pub fn insert_left(&mut self, pos: NodeId, value: T) -> Result<NodeId>{
        self.check_sibling_of(pos)?;
        Ok(self.insert_sibling(pos, value, true))
    }

    /// Inserts a new sibling immediately after `pos`.
    pub fn insert_right(&mut self, pos: NodeId, value: T) -> Result<NodeId>{
        self.check_sibling_of(pos)?;
        Ok(self.insert_sibling(pos, value, false))
    }

    fn check_sibling_of(&self, pos: NodeId) -> Result<()>{
        match self.arena.get(pos) {
            None => Err(Error::InvalidNode(pos)),
            Some(node) if node.is_root() => Err(Error::SiblingOfRoot),
            Some(_) => Ok(()),
        }
    }

    fn insert_sibling(&mut self, pos: NodeId, value: T, before: bool) -> NodeId{
        let links = self.links(pos);
        let id = self.arena.alloc(value, links.parent);
        let (left, right) = if before {
            (links.left, Some(pos))
        }else{
            (Some(pos), links.right)
        };
        self.set_links(id, Links{
            parent: links.parent,
            child: None,
            left,
            right,
        });
        self.attach(id);
        id
    }

    /// Removes `pos` from the tree handing back its payload.
    ///
    /// The children of `pos` take its place among its siblings, in order.
    /// When `pos` is the root its first child becomes the new root.
    /// Returns `None` if `pos` is not a live node.
    pub fn unlink(&mut self, pos: NodeId) -> Option<T>{
        if !self.contains(pos) {
            return None;
        }
        if self.arena[pos].is_root() {
            if let Some(first) = self.arena[pos].child {
                self.exchange(pos, first);
            }
        }
        let links = self.links(pos);
        match links.child {
            None => self.detach(pos),
            Some(first) => {
                debug_assert!(!self.arena[pos].is_root());
                let last = self.reparent(Some(first), links.parent).unwrap_or(first);
                self.arena[first].left = links.left;
                self.arena[last].right = links.right;
                self.replace_in_parent(links.parent, links.left, Some(first));
                if let Some(right) = links.right {
                    self.arena[right].left = Some(last);
                }
            }
        }
        let data = self.arena.free(pos);
        if self.arena.len() == 0 {
            self.root = None;
        }
        Some(data)
    }

    /// Removes and drops `pos`, see `unlink`. Returns false if `pos` is not
    /// a live node.
    pub fn remove(&mut self, pos: NodeId) -> bool{
        self.unlink(pos).is_some()
    }

    /// Removes `pos` and all of its descendants.
    ///
    /// The payloads are returned in post-order, `pos` last. The result is
    /// empty if `pos` is not a live node.
    pub fn prune(&mut self, pos: NodeId) -> Vec<T>{
        let mut removed = Vec::new();
        if !self.contains(pos) {
            return removed;
        }
        let mut next = Some(self.leftmost_leaf(pos));
        while let Some(id) = next {
            next = self.post_successor(id, Some(pos));
            debug_assert!(self.arena[id].child.is_none());
            self.detach(id);
            removed.push(self.arena.free(id));
        }
        if self.arena.len() == 0 {
            self.root = None;
        }
        trace!("pruned {} nodes", removed.len());
        removed
    }

    /// Exchanges the places of `a` and `b` in the tree.
    ///
    /// With `swap_children` the two subtrees trade places and each node keeps
    /// its descendants, which fails with `Error::Cycle` if one node is an
    /// ancestor of the other. Otherwise only the two nodes move and each one
    /// adopts the children of the other.
    pub fn swap_at(&mut self, a: NodeId, b: NodeId, swap_children: bool) -> Result<()>{
        for &id in &[a, b] {
            if !self.contains(id) {
                return Err(Error::InvalidNode(id));
            }
        }
        if a == b {
            return Ok(());
        }
        if swap_children {
            if self.is_ancestor(a, b) || self.is_ancestor(b, a) {
                return Err(Error::Cycle);
            }
            let links_a = self.links(a).exchanged(a, b);
            let links_b = self.links(b).exchanged(a, b);
            self.set_links(a, Links{ child: links_a.child, ..links_b });
            self.set_links(b, Links{ child: links_b.child, ..links_a });
            self.attach(a);
            self.attach(b);
        }else{
            self.exchange(a, b);
        }
        Ok(())
    }

    // Exchanges the positions of two nodes leaving their children in place.
    fn exchange(&mut self, a: NodeId, b: NodeId){
        let links_a = self.links(a).exchanged(a, b);
        let links_b = self.links(b).exchanged(a, b);
        self.set_links(a, links_b);
        self.set_links(b, links_a);
        // Both must be attached before walking either child list, which may
        // run through the other node.
        self.attach(a);
        self.attach(b);
        for &id in &[a, b] {
            let children = self.arena[id].child;
            self.reparent(children, Parent::Node(id));
        }
    }

    /// Moves the subtree rooted at `src` to become the first child of `dst`.
    pub fn graft_child(&mut self, dst: NodeId, src: NodeId) -> Result<()>{
        for &id in &[dst, src] {
            if !self.contains(id) {
                return Err(Error::InvalidNode(id));
            }
        }
        if self.arena[src].is_root() {
            return Err(Error::GraftRoot);
        }
        if src == dst || self.is_ancestor(src, dst) {
            return Err(Error::Cycle);
        }
        self.detach(src);
        let first = self.arena[dst].child;
        {
            let node = &mut self.arena[src];
            node.parent = Parent::Node(dst);
            node.right = first;
        }
        self.attach(src);
        Ok(())
    }

    /// Sorts the children of `pos` with a selection sort that relinks nodes
    /// in place, ids stay attached to their payloads.
    pub fn sort_children_by<F>(&mut self, pos: NodeId, mut cmp: F)
        where F: FnMut(&T, &T) -> Ordering
    {
        self.check(pos);
        let mut sorted: Option<NodeId> = None;
        loop {
            let start = match sorted {
                None => self.arena[pos].child,
                Some(last) => self.arena[last].right,
            };
            let start = match start {
                Some(start) => start,
                None => break,
            };
            let mut min = start;
            let mut next = self.arena[start].right;
            while let Some(id) = next {
                if cmp(&self[id], &self[min]) == Ordering::Less {
                    min = id;
                }
                next = self.arena[id].right;
            }
            if min != start {
                self.detach(min);
                let links = self.links(start);
                {
                    let node = &mut self.arena[min];
                    node.parent = links.parent;
                    node.left = links.left;
                    node.right = Some(start);
                }
                self.attach(min);
            }
            sorted = Some(min);
        }
    }

    pub fn sort_children_by_key<K, F>(&mut self, pos: NodeId, mut key: F)
        where F: FnMut(&T) -> K, K: Ord
    {
        self.sort_children_by(pos, |a, b| key(a).cmp(&key(b)))
    }

    pub fn sort_children(&mut self, pos: NodeId)
        where T: Ord
    {
        self.sort_children_by(pos, Ord::cmp)
    }

    pub(crate) fn leftmost_leaf(&self, id: NodeId) -> NodeId{
        let mut id = id;
        while let Some(child) = self.arena[id].child {
            id = child;
        }
        id
    }

    /// Next node in pre-order, never leaving the subtree of `bound`.
    pub(crate) fn pre_successor(&self, id: NodeId, bound: Option<NodeId>) -> Option<NodeId>{
        if let Some(child) = self.arena[id].child {
            return Some(child);
        }
        let mut id = id;
        loop {
            if Some(id) == bound {
                return None;
            }
            let node = &self.arena[id];
            if let Some(right) = node.right {
                return Some(right);
            }
            id = node.parent()?;
        }
    }

    /// Next node in post-order, never leaving the subtree of `bound`.
    pub(crate) fn post_successor(&self, id: NodeId, bound: Option<NodeId>) -> Option<NodeId>{
        if Some(id) == bound {
            return None;
        }
        let node = &self.arena[id];
        match node.right {
            Some(right) => Some(self.leftmost_leaf(right)),
            None => node.parent(),
        }
    }

    /// Hash of every payload in pre-order using `FxHasher`.
    pub fn fx_hash(&self) -> u64
        where T: Hash
    {
        fxhash::hash64(self)
    }

    // Pre-order edge walk shared by the text and debug renderings.
    pub(crate) fn write_with<W, F>(&self, out: &mut W, mut value: F) -> fmt::Result
        where W: fmt::Write + ?Sized,
              F: FnMut(&T, &mut W) -> fmt::Result
    {
        out.write_char('[')?;
        if let Some(root) = self.root {
            for edge in self.traverse(root) {
                match edge {
                    NodeEdge::Start(id) => {
                        let node = &self.arena[id];
                        if node.left.is_some() {
                            out.write_char(',')?;
                        }
                        out.write_char('{')?;
                        value(&self[id], out)?;
                        if node.child.is_some() {
                            out.write_str(",[")?;
                        }
                    }
                    NodeEdge::End(id) => {
                        if self.arena[id].child.is_some() {
                            out.write_char(']')?;
                        }
                        out.write_char('}')?;
                    }
                }
            }
        }
        out.write_char(']')
    }
}

impl<T> Index<NodeId> for Tree<T>{
    type Output = T;

    fn index(&self, id: NodeId) -> &T{
        match self.get(id) {
            Some(data) => data,
            None => panic!("{}", Error::InvalidNode(id)),
        }
    }
}

impl<T> IndexMut<NodeId> for Tree<T>{
    fn index_mut(&mut self, id: NodeId) -> &mut T{
        match self.get_mut(id) {
            Some(data) => data,
            None => panic!("{}", Error::InvalidNode(id)),
        }
    }
}

/// Trees are equal when they have the same shape and equal payloads at
/// every position, regardless of how their slots are laid out.
impl<T: PartialEq> PartialEq for Tree<T>{
    fn eq(&self, other: &Tree<T>) -> bool{
        if self.len() != other.len() {
            return false;
        }
        let (lhs, rhs) = match (self.root, other.root) {
            (None, None) => return true,
            (Some(lhs), Some(rhs)) => (lhs, rhs),
            _ => return false,
        };
        let mut lhs = self.traverse(lhs);
        let mut rhs = other.traverse(rhs);
        loop {
            match (lhs.next(), rhs.next()) {
                (None, None) => return true,
                (Some(NodeEdge::Start(a)), Some(NodeEdge::Start(b))) => if self[a] != other[b] {
                    return false;
                },
                (Some(NodeEdge::End(_)), Some(NodeEdge::End(_))) => (),
                _ => return false,
            }
        }
    }
}

impl<T: Eq> Eq for Tree<T>{}

impl<T: Hash> Hash for Tree<T>{
    fn hash<H: Hasher>(&self, state: &mut H){
        self.len().hash(state);
        for value in self.iter() {
            value.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Tree<T>{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result{
        self.write_with(f, |value, f| write!(f, "{:?}", value))
    }
}
