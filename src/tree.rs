use std::alloc::{alloc, Layout};
use std::cmp::Ordering;
use std::fmt;
use std::io;

use thiserror::Error;

/// Memory for a new tree node could not be allocated.
///
/// The insert that failed leaves the tree in its previous state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("cannot allocate memory for a tree node")]
pub struct OutOfMemory;

/// Orders the records of a tree.
///
/// The comparator is chosen when the tree is created and must yield the same
/// total order for the whole lifetime of the tree.
pub trait Comparator<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// Orders records by their `Ord` instance.
#[derive(Clone, Copy, Debug, Default)]
pub struct NaturalOrder;

impl<T: Ord> Comparator<T> for NaturalOrder {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Adapts a comparison function into a [`Comparator`].
///
/// ```
/// use avl_build::{AvlTree, OrderBy};
/// let mut tree = AvlTree::with_comparator(OrderBy(|a: &i32, b: &i32| b.cmp(a)));
/// tree.insert(1)?;
/// tree.insert(2)?;
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [2, 1]);
/// # Ok::<(), avl_build::OutOfMemory>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct OrderBy<F>(pub F);

impl<T, F> Comparator<T> for OrderBy<F>
where
    F: Fn(&T, &T) -> Ordering,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.0)(a, b)
    }
}

/// A height-balanced binary search tree over a generic record type.
///
/// Records that compare equal are kept as distinct nodes; nothing is
/// deduplicated.
///
/// ```
/// use avl_build::AvlTree;
/// let mut tree = AvlTree::new();
/// tree.insert(2)?;
/// tree.insert(1)?;
/// tree.insert(3)?;
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
/// # Ok::<(), avl_build::OutOfMemory>(())
/// ```
pub struct AvlTree<T, C = NaturalOrder> {
    root: Link<T>,
    num_nodes: usize,
    cmp: C,
}

struct Node<T> {
    record: T,
    left: Link<T>,
    right: Link<T>,
    balance: i8,
}

type Link<T> = Option<Box<Node<T>>>;

impl<T: Ord> AvlTree<T> {
    /// Creates an empty tree ordered by the record type's `Ord` instance.
    /// No memory is allocated until the first record is inserted.
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<T, C> AvlTree<T, C> {
    /// Creates an empty tree ordered by the given comparator.
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            root: None,
            num_nodes: 0,
            cmp,
        }
    }

    /// Returns true if the tree contains no records.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of records in the tree.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the number of nodes on the longest path from the root down to
    /// a leaf, zero for an empty tree. Walks the tree; meant for diagnostics.
    pub fn height(&self) -> usize {
        Self::subtree_height(&self.root)
    }

    /// Clears the tree, deallocating all nodes.
    /// Every node is released after its children. No-op on an empty tree.
    pub fn clear(&mut self) {
        Self::drop_subtree(self.root.take());
        self.num_nodes = 0;
    }

    /// Visits records in pre-order (node, left subtree, right subtree),
    /// skipping subtrees deeper than `max_depth`. The root is at depth 0.
    pub fn traverse_to_depth<F>(&self, max_depth: usize, mut visit: F)
    where
        F: FnMut(&T, usize),
    {
        Self::visit_to_depth(&self.root, 0, max_depth, &mut visit);
    }

    /// Writes the tree in pre-order down to `max_depth`, one record per line,
    /// indented by two spaces per depth level.
    pub fn write_to_depth<W>(&self, max_depth: usize, out: &mut W) -> io::Result<()>
    where
        T: fmt::Display,
        W: io::Write,
    {
        Self::write_subtree(&self.root, 0, max_depth, out)
    }

    /// Returns an iterator visiting the records in order, smallest first.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.root)
    }

    fn subtree_height(link: &Link<T>) -> usize {
        match link {
            None => 0,
            Some(node) => {
                1 + Self::subtree_height(&node.left).max(Self::subtree_height(&node.right))
            }
        }
    }

    fn drop_subtree(link: Link<T>) {
        if let Some(mut node) = link {
            Self::drop_subtree(node.left.take());
            Self::drop_subtree(node.right.take());
        }
    }

    fn visit_to_depth<F>(link: &Link<T>, depth: usize, max_depth: usize, visit: &mut F)
    where
        F: FnMut(&T, usize),
    {
        let node = match link {
            None => return,
            Some(node) => node,
        };
        if depth > max_depth {
            return;
        }
        visit(&node.record, depth);
        Self::visit_to_depth(&node.left, depth + 1, max_depth, visit);
        Self::visit_to_depth(&node.right, depth + 1, max_depth, visit);
    }

    fn write_subtree<W>(
        link: &Link<T>,
        depth: usize,
        max_depth: usize,
        out: &mut W,
    ) -> io::Result<()>
    where
        T: fmt::Display,
        W: io::Write,
    {
        let node = match link {
            None => return Ok(()),
            Some(node) => node,
        };
        if depth > max_depth {
            return Ok(());
        }
        writeln!(out, "{:indent$}{}", "", node.record, indent = 2 * depth)?;
        Self::write_subtree(&node.left, depth + 1, max_depth, out)?;
        Self::write_subtree(&node.right, depth + 1, max_depth, out)
    }
}

impl<T, C: Comparator<T>> AvlTree<T, C> {
    /// Inserts a record into the tree.
    ///
    /// Rebalances with at most one single or double rotation. If node
    /// allocation fails the tree is left unmodified.
    pub fn insert(&mut self, record: T) -> Result<(), OutOfMemory> {
        Self::insert_at(&self.cmp, &mut self.root, record)?;
        self.num_nodes += 1;
        Ok(())
    }

    /// Inserts below `link` and returns whether the subtree grew in height.
    ///
    /// Each node stores the height of its right subtree minus the height of
    /// its left subtree, always in {-1, 0, +1}. The returned flag lets the
    /// caller update its own balance factor without measuring any heights.
    fn insert_at(cmp: &C, link: &mut Link<T>, record: T) -> Result<bool, OutOfMemory> {
        let node = match link {
            None => {
                *link = Some(Node::create(record)?);
                return Ok(true);
            }
            Some(node) => node,
        };

        // One comparison per level. Equal records go right, so duplicates
        // are kept rather than rejected.
        if cmp.compare(&record, &node.record) == Ordering::Less {
            if !Self::insert_at(cmp, &mut node.left, record)? {
                return Ok(false);
            }
            match node.balance {
                1 => {
                    // The taller right side absorbs the growth.
                    node.balance = 0;
                    return Ok(false);
                }
                0 => {
                    node.balance = -1;
                    return Ok(true);
                }
                _ => {}
            }
            // Left subtree is now two levels taller than the right.
            Self::rebalance_left(link);
        } else {
            if !Self::insert_at(cmp, &mut node.right, record)? {
                return Ok(false);
            }
            match node.balance {
                -1 => {
                    node.balance = 0;
                    return Ok(false);
                }
                0 => {
                    node.balance = 1;
                    return Ok(true);
                }
                _ => {}
            }
            Self::rebalance_right(link);
        }
        // A rotation restores the pre-insert subtree height,
        // so the growth never propagates past it.
        Ok(false)
    }

    /// Restores balance after the left subtree of `link` outgrew the right
    /// one by two levels. After an insert the left child leans to one side,
    /// so a single or a double rotation always applies.
    fn rebalance_left(link: &mut Link<T>) {
        let mut node = link.take().unwrap();
        let mut left = node.left.take().unwrap();
        if left.balance < 0 {
            // Single rotation right.
            node.left = left.right.take();
            node.balance = 0;
            left.balance = 0;
            left.right = Some(node);
            *link = Some(left);
        } else {
            // Double rotation, pivoting through the left child's right child.
            let mut pivot = left.right.take().unwrap();
            left.right = pivot.left.take();
            node.left = pivot.right.take();
            match pivot.balance {
                0 => {
                    left.balance = 0;
                    node.balance = 0;
                }
                1 => {
                    left.balance = -1;
                    node.balance = 0;
                }
                _ => {
                    left.balance = 0;
                    node.balance = 1;
                }
            }
            pivot.balance = 0;
            pivot.left = Some(left);
            pivot.right = Some(node);
            *link = Some(pivot);
        }
    }

    /// Mirror image of [`rebalance_left`] for a right subtree that outgrew
    /// the left one by two levels.
    ///
    /// [`rebalance_left`]: AvlTree::rebalance_left
    fn rebalance_right(link: &mut Link<T>) {
        let mut node = link.take().unwrap();
        let mut right = node.right.take().unwrap();
        if right.balance > 0 {
            // Single rotation left.
            node.right = right.left.take();
            node.balance = 0;
            right.balance = 0;
            right.left = Some(node);
            *link = Some(right);
        } else {
            // Double rotation, pivoting through the right child's left child.
            let mut pivot = right.left.take().unwrap();
            right.left = pivot.right.take();
            node.right = pivot.left.take();
            match pivot.balance {
                0 => {
                    right.balance = 0;
                    node.balance = 0;
                }
                1 => {
                    right.balance = 0;
                    node.balance = -1;
                }
                _ => {
                    right.balance = 1;
                    node.balance = 0;
                }
            }
            pivot.balance = 0;
            pivot.right = Some(right);
            pivot.left = Some(node);
            *link = Some(pivot);
        }
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        let (_, num_nodes) = Self::check_subtree(&self.cmp, &self.root);
        assert_eq!(num_nodes, self.num_nodes);
    }

    /// Returns the true height and node count of the subtree, asserting the
    /// balance and ordering invariants at every node on the way.
    #[cfg(any(test, feature = "consistency_check"))]
    fn check_subtree(cmp: &C, link: &Link<T>) -> (usize, usize) {
        let node = match link {
            None => return (0, 0),
            Some(node) => node,
        };

        let (left_height, left_count) = Self::check_subtree(cmp, &node.left);
        let (right_height, right_count) = Self::check_subtree(cmp, &node.right);

        // Stored balance factor must equal the true height difference.
        assert_eq!(node.balance as i64, right_height as i64 - left_height as i64);
        assert!((-1..=1).contains(&node.balance));

        // Left strictly smaller, right greater or equal (duplicates go right).
        if let Some(left) = &node.left {
            assert_eq!(cmp.compare(&left.record, &node.record), Ordering::Less);
        }
        if let Some(right) = &node.right {
            assert_ne!(cmp.compare(&right.record, &node.record), Ordering::Less);
        }

        (left_height.max(right_height) + 1, left_count + right_count + 1)
    }
}

impl<T: Ord> Default for AvlTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> Drop for AvlTree<T, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<'a, T, C> IntoIterator for &'a AvlTree<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

/// An in-order iterator over the records of a tree.
///
/// Keeps the chain of not-yet-visited ancestors on an explicit stack, which
/// the AVL invariant bounds logarithmically in the number of records.
pub struct Iter<'a, T> {
    stack: Vec<&'a Node<T>>,
}

impl<'a, T> Iter<'a, T> {
    fn new(root: &'a Link<T>) -> Self {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left_spine(root.as_deref());
        iter
    }

    fn push_left_spine(&mut self, mut next: Option<&'a Node<T>>) {
        while let Some(node) = next {
            self.stack.push(node);
            next = node.left.as_deref();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(&node.record)
    }
}

impl<T> Node<T> {
    /// Allocates a new leaf node, reporting failure instead of aborting.
    fn create(record: T) -> Result<Box<Node<T>>, OutOfMemory> {
        // Never zero sized: a node always carries its two links.
        let layout = Layout::new::<Node<T>>();
        let raw = unsafe { alloc(layout) } as *mut Node<T>;
        if raw.is_null() {
            return Err(OutOfMemory);
        }
        unsafe {
            raw.write(Node {
                record,
                left: None,
                right: None,
                balance: 0,
            });
            Ok(Box::from_raw(raw))
        }
    }
}
