// Slot storage for the tree: nodes live in one vector and are addressed by
// index, freed slots are chained through their `child` link.

use std::cmp;
use std::ops::{Index, IndexMut};
use std::slice;

use crate::error::{Error, Result};

/// Minimum number of slots allocated the first time the arena grows.
pub const MIN_CAPACITY: usize = 4;

/// A node identifier within a particular `Tree`.
///
/// Ids are plain indices so they stay valid when the slot array is
/// reallocated. An id is recycled once its node is removed.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone, Debug)]
pub struct NodeId {
    index: u32,
}

impl NodeId{
    /// Maximum number of slots an arena can hold.
    pub const MAX: usize = u32::MAX as usize;

    #[inline]
    pub(crate) fn new(index: usize) -> NodeId{
        debug_assert!(index < NodeId::MAX);
        NodeId{ index: index as u32 }
    }

    #[inline]
    pub fn index(self) -> usize{
        self.index as usize
    }
}

/// Parent link of a slot. Doubles as the in-use tag.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub(crate) enum Parent{
    Free,
    Root,
    Node(NodeId),
}

#[derive(Clone, Debug)]
pub struct Node<T> {
    // Keep these private (with read-only accessors) so that we can keep them consistent.
    // E.g. the parent of a node’s child is that node.
    pub(crate) parent: Parent,
    // Next free slot while the node is on the free list.
    pub(crate) child: Option<NodeId>,
    pub(crate) left: Option<NodeId>,
    pub(crate) right: Option<NodeId>,
    pub(crate) data: Option<T>,
}

impl<T> Node<T> {
    fn free(next: Option<NodeId>) -> Node<T>{
        Node{
            parent: Parent::Free,
            child: next,
            left: None,
            right: None,
            data: None,
        }
    }

    /// Return the ID of the parent node, unless this node is the root of the tree.
    pub fn parent(&self) -> Option<NodeId> {
        match self.parent{
            Parent::Node(parent) => Some(parent),
            Parent::Root | Parent::Free => None,
        }
    }

    /// Return the ID of the first child of this node, unless it has no child.
    pub fn first_child(&self) -> Option<NodeId> { self.child.filter(|_| self.is_live()) }

    /// Return the ID of the previous sibling of this node, unless it is a first child.
    pub fn previous_sibling(&self) -> Option<NodeId> { self.left }

    /// Return the ID of the next sibling of this node, unless it is a last child.
    pub fn next_sibling(&self) -> Option<NodeId> { self.right }

    pub fn is_root(&self) -> bool { self.parent == Parent::Root }

    pub fn data(&self) -> Option<&T> { self.data.as_ref() }

    #[inline]
    pub(crate) fn is_live(&self) -> bool{
        self.parent != Parent::Free
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Arena<T> {
    nodes: Vec<Node<T>>,
    free: Option<NodeId>,
    len: usize,
    allow_realloc: bool,
}

impl<T> Arena<T> {
    pub fn new() -> Arena<T> {
        Arena {
            nodes: Vec::new(),
            free: None,
            len: 0,
            allow_realloc: true,
        }
    }

    #[inline]
    pub fn len(&self) -> usize{
        self.len
    }

    #[inline]
    pub fn capacity(&self) -> usize{
        self.nodes.len()
    }

    pub fn is_locked(&self) -> bool{
        !self.allow_realloc
    }

    pub fn lock(&mut self, locked: bool){
        debug!("tree arena {} at capacity {}", if locked { "locked" } else { "unlocked" }, self.capacity());
        self.allow_realloc = !locked;
    }

    pub fn contains(&self, id: NodeId) -> bool{
        self.nodes.get(id.index()).map_or(false, Node::is_live)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<T>>{
        self.nodes.get(id.index()).filter(|node| node.is_live())
    }

    pub fn try_reserve(&mut self, capacity: usize) -> Result<()>{
        if capacity <= self.capacity() {
            return Ok(());
        }
        self.grow_to(capacity).map(|_| ())
    }

    pub fn reserve(&mut self, capacity: usize){
        if let Err(err) = self.try_reserve(capacity){
            panic!("{}", err)
        }
    }

    /// Extends the slot array to `capacity` slots and pushes the new ones on
    /// the free list. Returns the new free list head.
    fn grow_to(&mut self, capacity: usize) -> Result<NodeId>{
        let old_capacity = self.capacity();
        if capacity > NodeId::MAX || capacity <= old_capacity {
            return Err(Error::OutOfMemory{ requested: capacity });
        }
        if !self.allow_realloc {
            warn!("growing locked tree arena from {} to {} slots, previous node addresses are invalidated",
                old_capacity, capacity);
        }
        self.nodes.try_reserve_exact(capacity - old_capacity)
            .map_err(|_| Error::OutOfMemory{ requested: capacity })?;
        trace!("growing tree arena from {} to {} slots", old_capacity, capacity);

        let tail = self.free;
        for index in old_capacity .. capacity {
            let next = if index + 1 < capacity {
                Some(NodeId::new(index + 1))
            }else{
                tail
            };
            self.nodes.push(Node::free(next));
        }
        let head = NodeId::new(old_capacity);
        self.free = Some(head);
        Ok(head)
    }

    /// Takes a slot from the free list, growing the arena if it's empty,
    /// and stores `data` in it with no links besides `parent`.
    ///
    /// Panic
    /// -----
    ///
    /// Panics if the arena can't grow any further.
    pub(crate) fn alloc(&mut self, data: T, parent: Parent) -> NodeId{
        debug_assert!(parent != Parent::Free);
        let id = match self.free {
            Some(id) => id,
            None => {
                let capacity = cmp::min(
                    cmp::max(MIN_CAPACITY, self.capacity().saturating_mul(2)),
                    NodeId::MAX);
                match self.grow_to(capacity){
                    Ok(id) => id,
                    Err(err) => panic!("{}", err),
                }
            }
        };
        let node = &mut self.nodes[id.index()];
        debug_assert!(!node.is_live());
        self.free = node.child;
        *node = Node{
            parent,
            child: None,
            left: None,
            right: None,
            data: Some(data),
        };
        self.len += 1;
        id
    }

    /// Returns a slot to the free list handing back its payload.
    /// The node must already be unlinked from the structure.
    pub(crate) fn free(&mut self, id: NodeId) -> T{
        let next = self.free;
        let node = &mut self.nodes[id.index()];
        let data = match node.data.take() {
            Some(data) => data,
            None => panic!("{}", Error::InvalidNode(id)),
        };
        *node = Node::free(next);
        self.free = Some(id);
        self.len -= 1;
        data
    }

    /// Drops every payload and chains all the slots back in the free list.
    pub fn reset(&mut self){
        let capacity = self.capacity();
        for (index, node) in self.nodes.iter_mut().enumerate() {
            let next = if index + 1 < capacity { Some(NodeId::new(index + 1)) } else { None };
            *node = Node::free(next);
        }
        self.free = if capacity > 0 { Some(NodeId::new(0)) } else { None };
        self.len = 0;
    }

    /// Drops every payload and releases the slot array.
    pub fn clear(&mut self){
        self.nodes = Vec::new();
        self.free = None;
        self.len = 0;
    }

    pub fn free_head(&self) -> Option<NodeId>{
        self.free
    }

    pub fn nodes(&self) -> slice::Iter<'_, Node<T>>{
        self.nodes.iter()
    }

    pub fn nodes_mut(&mut self) -> slice::IterMut<'_, Node<T>>{
        self.nodes.iter_mut()
    }

    #[cfg(feature = "parallel")]
    pub fn slots(&self) -> &[Node<T>]{
        &self.nodes
    }

    #[cfg(feature = "parallel")]
    pub fn slots_mut(&mut self) -> &mut [Node<T>]{
        &mut self.nodes
    }
}

impl<T> Index<NodeId> for Arena<T> {
    type Output = Node<T>;

    fn index(&self, node: NodeId) -> &Node<T> {
        let slot = &self.nodes[node.index()];
        debug_assert!(slot.is_live(), "{:?} is a free slot", node);
        slot
    }
}

impl<T> IndexMut<NodeId> for Arena<T> {
    fn index_mut(&mut self, node: NodeId) -> &mut Node<T> {
        let slot = &mut self.nodes[node.index()];
        debug_assert!(slot.is_live(), "{:?} is a free slot", node);
        slot
    }
}
