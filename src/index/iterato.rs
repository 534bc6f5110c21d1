//! Explicit-stack walks over a [`ChildIndex`].

use super::{ChildIndex, NodeIndex};

/// One sibling group on the [`Descendants`] stack.
struct Group<'a> {
    siblings: &'a [NodeIndex],
    next: usize,
    /// Set once every subtree below the group has been emitted.
    emitting: bool,
}

impl<'a> Group<'a> {
    fn new(siblings: &'a [NodeIndex]) -> Self {
        Group {
            siblings,
            next: 0,
            emitting: false,
        }
    }
}

/// Iterates the transitive descendants of a node, deepest groups first.
///
/// For a node with children `c1..cn` the order is: the descendants of `c1`, ..., the
/// descendants of `cn`, then `c1..cn` themselves. Branches stay in index order.
pub struct Descendants<'a> {
    index: &'a ChildIndex,
    stack: Vec<Group<'a>>,
}

impl<'a> Descendants<'a> {
    pub fn new(index: &'a ChildIndex, start: NodeIndex) -> Self {
        let children = index.children(start);
        let stack = if children.is_empty() {
            Vec::new()
        } else {
            vec![Group::new(children)]
        };
        Descendants { index, stack }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index;
        loop {
            let group = self.stack.last_mut()?;
            if !group.emitting {
                if let Some(&sibling) = group.siblings.get(group.next) {
                    group.next += 1;
                    let below = index.children(sibling);
                    if !below.is_empty() {
                        self.stack.push(Group::new(below));
                    }
                    continue;
                }
                group.emitting = true;
                group.next = 0;
            }

            if let Some(&sibling) = group.siblings.get(group.next) {
                group.next += 1;
                return Some(sibling);
            }
            self.stack.pop();
        }
    }
}
