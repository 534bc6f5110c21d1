//! # Hierarchy
//!
//! Hierarchy converts between flat lists of parent-linked records and nested trees.
//! The element type stays opaque: the caller describes how to read an id and a parent
//! id, how to recognize the root and how to assign children, and the crate does the
//! rest.
//!
//! *   [`Hierarchy::build_tree`]: assemble a forest below the root.
//! *   [`Hierarchy::flatten`]: list the direct children (or all descendants) of the root.
//! *   [`traverse`]: pre-order walk with level, parent and ancestor path.
//! *   [`sort_with_children`]: stable sort of every level of a nested list.
//!
//! Inputs may be flat, nested or a mix of both once a
//! [`children`](Hierarchy::children) accessor is set. No operation recurses on the
//! call stack, so deep inputs are fine.

pub mod accessor;
pub mod error;
mod flat;
pub mod index;
pub mod sort;
pub mod traverse;
mod tree;

#[cfg(test)]
mod test_menus;

pub use accessor::{Hierarchy, HierarchyOptions};
pub use error::{Accessor, HierarchyError};
pub use index::{ChildIndex, Descendants, NodeIndex, Position, WorkingSet};
pub use sort::{sort, sort_with_children};
pub use traverse::{traverse, Visit, Visitor, WithAncestors, FIRST_LEVEL};
