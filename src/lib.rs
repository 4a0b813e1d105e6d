//! A height-balanced binary search tree built from a stream of ordered records.
//!
//! Every node carries a balance factor in {-1, 0, +1}; insertion maintains it
//! in a single pass with at most one single or double rotation, so the tree
//! height stays logarithmic in the number of records. Records that compare
//! equal are kept as separate nodes. Traversal for display can be bounded to
//! a maximum depth.
//!
//! The tree is generic over the record type and takes the ordering as a
//! [`Comparator`]; reading and formatting records stays with the caller.
//!
//! ```
//! use avl_build::AvlTree;
//!
//! let mut tree = AvlTree::new();
//! tree.insert(2)?;
//! tree.insert(1)?;
//! tree.insert(3)?;
//! assert_eq!(tree.len(), 3);
//!
//! let mut visited = Vec::new();
//! tree.traverse_to_depth(1, |record, depth| visited.push((*record, depth)));
//! assert_eq!(visited, [(2, 0), (1, 1), (3, 1)]);
//! # Ok::<(), avl_build::OutOfMemory>(())
//! ```

mod source;
mod tree;

pub use source::{BuildError, RecordSource, SourceFormatError};
pub use tree::{AvlTree, Comparator, Iter, NaturalOrder, OrderBy, OutOfMemory};
