//! Assembly of nested trees from flat (or mixed) element lists.
//!
//! Every element whose parent id is the root sentinel becomes a top level result, and
//! every other element is attached below the element whose id equals its parent id.
//! Elements that are not connected to the root are dropped. Subtrees are assembled
//! bottom up on an explicit stack: a node is handed to `set_children` only once all of
//! its own children are complete.

use std::{cmp::Ordering, hash::Hash};

use tracing::{debug, trace};

use crate::{
    accessor::{Hierarchy, Materialize},
    error::{Accessor, HierarchyError},
    index::{ChildIndex, NodeIndex, WorkingSet},
};

impl<T, V: Hash + Eq, R> Hierarchy<T, V, R> {
    /// Builds the forest below the root sentinel, preserving input order.
    ///
    /// With [`include_root`](Hierarchy::include_root) set, returns a single element: the
    /// root holder with the whole forest assigned as its children.
    ///
    /// ```
    /// use hierarchy::Hierarchy;
    ///
    /// #[derive(Debug)]
    /// struct Node {
    ///     id: u32,
    ///     parent: u32,
    ///     children: Vec<Node>,
    /// }
    ///
    /// let node = |id, parent| Node { id, parent, children: vec![] };
    /// let tree = Hierarchy::new()
    ///     .id(|n: &Node| n.id)
    ///     .parent_id(|n: &Node| n.parent)
    ///     .root(|v: &u32| *v == 0)
    ///     .set_children(|n: &mut Node, children| n.children = children)
    ///     .build_tree(vec![node(1, 0), node(2, 1), node(3, 1)])
    ///     .unwrap();
    ///
    /// assert_eq!(tree.len(), 1);
    /// assert_eq!(tree[0].children.len(), 2);
    /// ```
    pub fn build_tree<I>(&self, elements: I) -> Result<Vec<R>, HierarchyError>
    where
        I: IntoIterator<Item = T>,
    {
        self.assemble(elements, None)
    }

    /// Like [`build_tree`](Hierarchy::build_tree), but the working list is first
    /// stable-sorted with `compare`, which orders every sibling group of the result.
    pub fn build_tree_by<I, F>(&self, elements: I, compare: F) -> Result<Vec<R>, HierarchyError>
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T, &T) -> Ordering,
    {
        self.assemble(elements, Some(&compare))
    }

    fn assemble<I>(
        &self,
        elements: I,
        compare: Option<&dyn Fn(&T, &T) -> Ordering>,
    ) -> Result<Vec<R>, HierarchyError>
    where
        I: IntoIterator<Item = T>,
    {
        let keys = self.keys()?;
        let set_children = self
            .set_children
            .as_deref()
            .ok_or(HierarchyError::MissingAccessor(Accessor::SetChildren))?;
        let materialize = self.materializer()?;

        let mut elements = elements.into_iter().peekable();
        if elements.peek().is_none() {
            return Ok(Vec::new());
        }

        let mut working = WorkingSet::prepare(elements, &keys, compare);
        let index = ChildIndex::build(&working);
        let root = if self.options.include_root {
            Some(working.single_root()?)
        } else {
            None
        };

        let top = working.top_level().collect::<Vec<_>>();
        let mut assembler = Assembler {
            working: &mut working,
            index: &index,
            materialize: &materialize,
            set_children,
        };
        let forest: Vec<R> = top
            .into_iter()
            .filter_map(|node| assembler.assemble(node))
            .collect();
        debug!(
            working = working.len(),
            top_level = forest.len(),
            "assembled tree"
        );

        let Some(mut root) = root
            .and_then(|node| working.take(node))
            .map(|value| materialize.apply(value))
        else {
            return Ok(forest);
        };
        trace!("attaching forest below root holder");
        set_children(&mut root, forest);
        Ok(vec![root])
    }
}

/// A node whose children are still being assembled.
struct Frame<'i, R> {
    value: R,
    pending: std::slice::Iter<'i, NodeIndex>,
    done: Vec<R>,
}

struct Assembler<'a, 'i, 'h, T, V, R> {
    working: &'a mut WorkingSet<T, V>,
    index: &'i ChildIndex,
    materialize: &'a Materialize<'h, T, R>,
    set_children: &'h dyn Fn(&mut R, Vec<R>),
}

impl<'i, T, V, R> Assembler<'_, 'i, '_, T, V, R> {
    /// Assembles the full subtree below `top`, or nothing if `top` was already used.
    fn assemble(&mut self, top: NodeIndex) -> Option<R> {
        let mut stack = vec![self.open(top)?];
        loop {
            let frame = stack.last_mut()?;
            if let Some(&child) = frame.pending.next() {
                if let Some(frame) = self.open(child) {
                    stack.push(frame);
                }
                continue;
            }

            let Frame {
                mut value, done, ..
            } = stack.pop()?;
            (self.set_children)(&mut value, done);
            match stack.last_mut() {
                Some(parent) => parent.done.push(value),
                None => return Some(value),
            }
        }
    }

    fn open(&mut self, node: NodeIndex) -> Option<Frame<'i, R>> {
        let index = self.index;
        let value = self.working.take(node)?;
        let children = index.children(node);
        Some(Frame {
            value: self.materialize.apply(value),
            pending: children.iter(),
            done: Vec::with_capacity(children.len()),
        })
    }
}
