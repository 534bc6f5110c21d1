//! Flattening of flat, nested or mixed element lists into the elements below the root.

use std::{cmp::Ordering, hash::Hash};

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
    accessor::Hierarchy,
    error::HierarchyError,
    index::{ChildIndex, NodeIndex, WorkingSet},
};

impl<T, V: Hash + Eq, R> Hierarchy<T, V, R> {
    /// Lists the direct children of the root in working order.
    ///
    /// With [`all_descendants`](Hierarchy::all_descendants) every direct child is
    /// followed by all of its transitive descendants: the subtree of each child first,
    /// then the children themselves. With [`include_root`](Hierarchy::include_root) the
    /// root holder is prepended.
    pub fn flatten<I>(&self, elements: I) -> Result<Vec<R>, HierarchyError>
    where
        I: IntoIterator<Item = T>,
    {
        self.select(elements, None)
    }

    /// Like [`flatten`](Hierarchy::flatten), but the working list is sorted with
    /// `compare` first and the selected elements are stable-sorted once more before
    /// the root holder is prepended.
    pub fn flatten_by<I, F>(&self, elements: I, compare: F) -> Result<Vec<R>, HierarchyError>
    where
        I: IntoIterator<Item = T>,
        F: Fn(&T, &T) -> Ordering,
    {
        self.select(elements, Some(&compare))
    }

    fn select<I>(
        &self,
        elements: I,
        compare: Option<&dyn Fn(&T, &T) -> Ordering>,
    ) -> Result<Vec<R>, HierarchyError>
    where
        I: IntoIterator<Item = T>,
    {
        let keys = self.keys()?;
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

        let mut selected = collect(&working, &index, self.options.all_descendants);
        if let Some(compare) = compare {
            if selected.len() > 1 {
                trace!(selected = selected.len(), "final sort pass");
                selected.sort_by(|a, b| match (working.get(*a), working.get(*b)) {
                    (Some(a), Some(b)) => compare(a, b),
                    _ => Ordering::Equal,
                });
            }
        }
        debug!(
            working = working.len(),
            selected = selected.len(),
            all_descendants = self.options.all_descendants,
            "flattened"
        );

        Ok(root
            .into_iter()
            .chain(selected)
            .filter_map(|node| working.take(node))
            .map(|value| materialize.apply(value))
            .collect())
    }
}

fn collect<T, V>(working: &WorkingSet<T, V>, index: &ChildIndex, all: bool) -> Vec<NodeIndex> {
    if !all {
        return working.top_level().collect();
    }
    working
        .top_level()
        .flat_map(|top| std::iter::once(top).chain(index.descendants(top)))
        .collect_vec()
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use similar_asserts::assert_eq;

    use crate::{
        test_menus::{by_sort, default_menus, ids, menu, menu_hierarchy, shape, Menu, ROOT_PID},
        Hierarchy, HierarchyError,
    };

    #[test]
    fn direct_children_only() {
        let flat = menu_hierarchy(1).flatten(default_menus()).unwrap();
        assert_eq!(ids(&flat), vec![2, 6, 7]);

        let flat = menu_hierarchy(1)
            .flatten_by(default_menus(), by_sort)
            .unwrap();
        assert_eq!(ids(&flat), vec![7, 6, 2]);
    }

    #[test]
    fn descendants_follow_their_branch() {
        let flat = menu_hierarchy(1)
            .all_descendants(true)
            .flatten(default_menus())
            .unwrap();
        assert_eq!(ids(&flat), vec![2, 8, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn root_is_prepended_after_the_final_sort() {
        let flat = menu_hierarchy(1)
            .all_descendants(true)
            .include_root(true)
            .flatten_by(default_menus(), by_sort)
            .unwrap();
        assert_eq!(ids(&flat), vec![1, 3, 5, 4, 8, 7, 6, 2]);
    }

    #[test]
    fn small_scenario() {
        let menus = vec![menu(1, 0, 1), menu(2, 1, 2), menu(3, 1, 3), menu(4, 2, 4)];

        let flat = menu_hierarchy(1)
            .all_descendants(true)
            .flatten(menus.clone())
            .unwrap();
        let mut found = ids(&flat);
        found.sort();
        assert_eq!(found, vec![2, 3, 4]);

        let flat = menu_hierarchy(1)
            .all_descendants(true)
            .include_root(true)
            .flatten(menus)
            .unwrap();
        assert_eq!(flat[0].id, 1);
        assert_eq!(flat.len(), 4);
    }

    #[test]
    fn root_cardinality_is_checked() {
        let flat = menu_hierarchy(ROOT_PID)
            .include_root(true)
            .flatten(default_menus());
        assert_eq!(flat.err(), Some(HierarchyError::RootCardinality { found: 0 }));

        let mut menus = default_menus();
        menus.push(menu(1, 3, 0));
        let flat = menu_hierarchy(1).include_root(true).flatten(menus);
        assert_eq!(flat.err(), Some(HierarchyError::RootCardinality { found: 2 }));

        // without the switch the holders are dropped silently
        let mut menus = default_menus();
        menus.push(menu(1, 3, 0));
        assert_eq!(menu_hierarchy(1).flatten(menus).unwrap().len(), 3);
    }

    #[test]
    fn nested_children_are_detached() {
        let tree = menu_hierarchy(ROOT_PID)
            .build_tree_by(default_menus(), by_sort)
            .unwrap();
        let nested = menu_hierarchy(ROOT_PID)
            .children(|m: &mut Menu| std::mem::take(&mut m.children))
            .all_descendants(true)
            .flatten_by(tree, by_sort)
            .unwrap();
        let direct = menu_hierarchy(ROOT_PID)
            .all_descendants(true)
            .flatten_by(default_menus(), by_sort)
            .unwrap();

        assert_eq!(nested, direct);
        assert!(nested.iter().all(|m| m.children.is_empty()));
    }

    #[test]
    fn read_children_stay_attached() {
        let tree = menu_hierarchy(ROOT_PID)
            .build_tree_by(default_menus(), by_sort)
            .unwrap();
        let flat = menu_hierarchy(ROOT_PID)
            .read_children(|m: &Menu| m.children.as_slice())
            .all_descendants(true)
            .flatten(tree)
            .unwrap();

        assert_eq!(ids(&flat), vec![1, 8, 3, 5, 4, 7, 6, 2]);
        assert_eq!(shape(&flat[..1]), "1[7,6,2[3[8],5,4]]");
        assert_eq!(ids(&flat[7].children), vec![3, 5, 4]);
        assert!(flat[1].children.is_empty());
    }

    #[test]
    fn transforms_selected_elements() {
        let config: Hierarchy<Menu, i32, Value> = Hierarchy::transforming()
            .id(|m: &Menu| m.id)
            .parent_id(|m: &Menu| m.pid)
            .root(|v: &i32| *v == 1)
            .transform(|m: Menu| json!({ "id": m.id, "pid": m.pid }))
            .filter(|m: &Menu| m.id % 2 == 0 || m.id == 1)
            .all_descendants(true)
            .include_root(true);

        let flat = config.flatten_by(default_menus(), by_sort).unwrap();
        assert_eq!(
            Value::Array(flat),
            json!([
                { "id": 1, "pid": -1 },
                { "id": 4, "pid": 2 },
                { "id": 6, "pid": 1 },
                { "id": 2, "pid": 1 },
            ])
        );
    }

    #[test]
    fn empty_input() {
        let flat = menu_hierarchy(1)
            .include_root(true)
            .flatten(Vec::new())
            .unwrap();
        assert!(flat.is_empty());
    }

    /// Forests below `0`: element `i + 1` hangs below one of the elements before it, or
    /// below the root, and the list is then shuffled.
    fn forests() -> impl Strategy<Value = Vec<Menu>> {
        (1..40usize)
            .prop_flat_map(|n| {
                (0..n)
                    .map(|i| (0..=i as i32, 0..5i32))
                    .collect::<Vec<_>>()
            })
            .prop_map(|links| {
                links
                    .into_iter()
                    .enumerate()
                    .map(|(i, (pid, sort))| menu(i as i32 + 1, pid, sort))
                    .collect::<Vec<_>>()
            })
            .prop_shuffle()
    }

    proptest! {
        #[test]
        fn flatten_after_build_keeps_every_id(menus in forests()) {
            let mut expected = ids(&menus);
            expected.sort();

            let tree = menu_hierarchy(0).build_tree(menus).unwrap();
            let flat = menu_hierarchy(0)
                .children(|m: &mut Menu| std::mem::take(&mut m.children))
                .all_descendants(true)
                .flatten(tree)
                .unwrap();
            let mut found = ids(&flat);
            found.sort();
            prop_assert_eq!(found, expected);
        }

        #[test]
        fn build_flatten_build_round_trips(menus in forests()) {
            let nested = |root| {
                menu_hierarchy(root).children(|m: &mut Menu| std::mem::take(&mut m.children))
            };

            let tree = menu_hierarchy(0).build_tree_by(menus, by_sort).unwrap();
            let expected = shape(&tree);
            let flat = nested(0).all_descendants(true).flatten(tree).unwrap();
            let rebuilt = nested(0).build_tree(flat).unwrap();
            prop_assert_eq!(shape(&rebuilt), expected);
        }
    }
}
