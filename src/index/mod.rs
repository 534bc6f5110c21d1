//! The working list of one call and the parent-id index built over it.
//!
//! *   [`WorkingSet`]: the flat, filtered and optionally sorted elements a call operates
//!     on. Nested input is expanded into it in pre-order, and every element is
//!     classified by its [`Position`] relative to the root sentinel.
//! *   [`ChildIndex`]: for each working element, the ordered list of its direct
//!     children. Built in one pass by bucketing elements under their parent id, then
//!     handing each bucket to the first element carrying that id.
//! *   [`NodeIndex`]: a typed position into the working list.
//!
//! Both are built fresh by every call and dropped at its end. All walks over the
//! index use explicit stacks, so arbitrarily deep input cannot exhaust the call stack.

use std::{cmp::Ordering, fmt::Display, hash::Hash};

use ahash::AHashMap;
use derive_more::{From, Into};
use itertools::Itertools;
use tracing::debug;

use crate::{
    accessor::{Hierarchy, Keys},
    error::HierarchyError,
};

pub mod iterato;

pub use iterato::Descendants;

/// A type-safe position of an element in a [`WorkingSet`].
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, From, Into)]
pub struct NodeIndex(pub usize);

impl Display for NodeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an element sits relative to the root sentinel.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// Its own id is the root sentinel.
    Root,
    /// Its parent id is the root sentinel.
    Top,
    /// Neither: it hangs below some other element, or below nothing at all.
    Nested,
}

/// The flat list of elements one call actually processes.
pub struct WorkingSet<T, V> {
    values: Vec<Option<T>>,
    ids: Vec<V>,
    parents: Vec<V>,
    positions: Vec<Position>,
}

impl<T, V> WorkingSet<T, V> {
    /// Expands, filters and sorts `elements`, then reads the keys of every survivor.
    ///
    /// Nested children are detached and follow their parent directly. An element
    /// rejected by the filter still contributes its nested children.
    pub(crate) fn prepare<I>(
        elements: I,
        keys: &Keys<'_, T, V>,
        compare: Option<&dyn Fn(&T, &T) -> Ordering>,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut values: Vec<T> = Vec::new();
        match keys.children {
            Some(children) => {
                let mut stack = vec![elements.into_iter().collect_vec().into_iter()];
                while let Some(level) = stack.last_mut() {
                    let Some(mut element) = level.next() else {
                        stack.pop();
                        continue;
                    };
                    let nested = children(&mut element);
                    if keys.keep(&element) {
                        values.push(element);
                    }
                    if !nested.is_empty() {
                        stack.push(nested.into_iter());
                    }
                }
            }
            None => values.extend(elements.into_iter().filter(|e| keys.keep(e))),
        }

        if let Some(compare) = compare {
            if values.len() > 1 {
                values.sort_by(|a, b| compare(a, b));
            }
        }

        let mut ids = Vec::with_capacity(values.len());
        let mut parents = Vec::with_capacity(values.len());
        let mut positions = Vec::with_capacity(values.len());
        for value in &values {
            let id = (keys.id)(value);
            let parent = (keys.parent_id)(value);
            positions.push(if (keys.root)(&id) {
                Position::Root
            } else if (keys.root)(&parent) {
                Position::Top
            } else {
                Position::Nested
            });
            ids.push(id);
            parents.push(parent);
        }

        WorkingSet {
            values: values.into_iter().map(Some).collect(),
            ids,
            parents,
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The element at `node`, unless it has already been moved into a result.
    pub fn get(&self, node: NodeIndex) -> Option<&T> {
        self.values.get(node.0)?.as_ref()
    }

    pub fn id(&self, node: NodeIndex) -> Option<&V> {
        self.ids.get(node.0)
    }

    pub fn position(&self, node: NodeIndex) -> Option<Position> {
        self.positions.get(node.0).copied()
    }

    pub fn iter_node_ids(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        (0..self.values.len()).map(NodeIndex)
    }

    /// Direct children of the root, in working order.
    pub fn top_level(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.with_position(Position::Top)
    }

    /// Elements whose own id is the root sentinel, in working order.
    pub fn root_holders(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.with_position(Position::Root)
    }

    fn with_position(&self, position: Position) -> impl Iterator<Item = NodeIndex> + '_ {
        self.positions
            .iter()
            .positions(move |p| *p == position)
            .map(NodeIndex)
    }

    /// The one root holder, or an error if there are none or several.
    pub fn single_root(&self) -> Result<NodeIndex, HierarchyError> {
        self.root_holders()
            .exactly_one()
            .map_err(|holders| HierarchyError::RootCardinality {
                found: holders.count(),
            })
    }

    /// Moves the element at `node` out of the working set.
    pub(crate) fn take(&mut self, node: NodeIndex) -> Option<T> {
        self.values.get_mut(node.0)?.take()
    }
}

/// Direct children of every working element, in working order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChildIndex {
    children: Vec<Vec<NodeIndex>>,
}

impl ChildIndex {
    /// Buckets the working elements by parent id and resolves each bucket to the first
    /// element whose id equals its key.
    ///
    /// Root holders are never bucketed and never own a bucket, so walks that start at a
    /// top level element are finite even when ids repeat or parent links form cycles.
    pub fn build<T, V: Hash + Eq>(working: &WorkingSet<T, V>) -> Self {
        let mut buckets: AHashMap<&V, Vec<NodeIndex>> =
            AHashMap::with_capacity(working.parents.len());

        let keyed = working.parents.iter().zip(&working.positions);
        for (i, (parent, position)) in keyed.enumerate() {
            if *position == Position::Root {
                continue;
            }
            buckets.entry(parent).or_default().push(NodeIndex(i));
        }
        let bucket_count = buckets.len();

        let children = working
            .ids
            .iter()
            .zip(&working.positions)
            .map(|(id, position)| match position {
                Position::Root => Vec::new(),
                Position::Top | Position::Nested => buckets.remove(id).unwrap_or_default(),
            })
            .collect();

        debug!(
            elements = working.len(),
            buckets = bucket_count,
            unclaimed = buckets.len(),
            "built child index"
        );
        ChildIndex { children }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The direct children of `node`; empty for leaves and unknown nodes.
    pub fn children(&self, node: NodeIndex) -> &[NodeIndex] {
        self.children.get(node.0).map_or(&[], Vec::as_slice)
    }

    /// Every transitive descendant of `node`, each sibling group emitted after the
    /// subtrees below it.
    pub fn descendants(&self, node: NodeIndex) -> Descendants<'_> {
        Descendants::new(self, node)
    }

    /// Draws the trees hanging below the root, one line per element.
    ///
    /// Root holders head the drawing, followed by every top level element and its
    /// subtree. Elements that are not connected to the root are not drawn.
    pub fn debug_draw<T, V>(
        &self,
        working: &WorkingSet<T, V>,
        mut label: impl FnMut(&T) -> String,
    ) -> String {
        let mut output = String::new();
        let mut draw =
            |node: NodeIndex| working.get(node).map_or_else(|| format!("<{node}>"), &mut label);

        for root in working.root_holders() {
            output.push_str(&draw(root));
            output.push('\n');
        }

        let top = working.top_level().collect_vec();
        // (node, prefix of its line, last among its siblings)
        let mut stack: Vec<(NodeIndex, String, bool)> = top
            .iter()
            .enumerate()
            .rev()
            .map(|(i, &node)| (node, String::new(), i + 1 == top.len()))
            .collect();

        while let Some((node, prefix, is_last)) = stack.pop() {
            let connector = if is_last { "└── " } else { "├── " };
            output.push_str(&prefix);
            output.push_str(connector);
            output.push_str(&draw(node));
            output.push('\n');

            let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
            let children = self.children(node);
            for (i, &child) in children.iter().enumerate().rev() {
                stack.push((child, child_prefix.clone(), i + 1 == children.len()));
            }
        }

        output
    }
}

impl<T, V: Hash + Eq, R> Hierarchy<T, V, R> {
    /// Prepares the working list of `elements` and indexes it, without assembling
    /// anything. Useful to inspect how a configuration reads some input.
    pub fn index<I>(&self, elements: I) -> Result<(WorkingSet<T, V>, ChildIndex), HierarchyError>
    where
        I: IntoIterator<Item = T>,
    {
        let keys = self.keys()?;
        let working = WorkingSet::prepare(elements, &keys, None);
        let index = ChildIndex::build(&working);
        Ok((working, index))
    }
}
