//! Multiway tree stored in a single growable slot array.
//!
//! Nodes are addressed by `NodeId` indices instead of pointers, so ids stay
//! valid when the array is reallocated and removed slots are recycled
//! through a free list. Besides the usual insertions the tree supports
//! moving nodes around (swap, graft, unlink with children promotion),
//! ancestry queries and a bracketed text format:
//!
//! ```
//! use idtree::Tree;
//!
//! let mut tree = Tree::new();
//! let root = tree.set_root(1);
//! let five = tree.insert_child(root, 5);
//! let two = tree.insert_left(five, 2).unwrap();
//! tree.append_child(two, 3);
//! tree.append_child(two, 4);
//! assert_eq!(tree.to_string(), "[{1,[{2,[{3},{4}]},{5}]}]");
//! assert_eq!(tree.iter().sum::<i32>(), 15);
//! ```

#![cfg_attr(feature = "unstable", feature(test))]

#[macro_use] extern crate log;
extern crate boolinator;
extern crate fxhash;
extern crate smallvec;
extern crate thiserror;
#[cfg(feature = "parallel")]
extern crate rayon;

mod arena;
mod codec;
mod cursor;
mod error;
mod iter;
mod tree;

#[cfg(feature = "unstable")]
mod tree_benches;

pub use arena::{Node, NodeId, MIN_CAPACITY};
pub use codec::TextValue;
pub use cursor::Cursor;
pub use error::{Error, Result};
pub use iter::{Ancestors, Children, Descendants, Iter, IterPost, NodeEdge, PostOrder, Traverse, Values, ValuesMut};
pub use tree::Tree;
