//! Stable in-place sorting of single levels and whole nested lists.

use std::cmp::Ordering;

/// Stable-sorts one level in place.
pub fn sort<T, F>(list: &mut [T], compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    if list.len() > 1 {
        list.sort_by(compare);
    }
}

/// Stable-sorts `list` and every children list below it with the same comparator.
///
/// `children` gives mutable access to the nested children of an element, if any.
///
/// ```
/// use hierarchy::sort_with_children;
///
/// struct Node(u8, Vec<Node>);
///
/// let mut nodes = vec![Node(2, vec![Node(9, vec![]), Node(7, vec![])]), Node(1, vec![])];
/// sort_with_children(&mut nodes, |n: &mut Node| Some(n.1.as_mut_slice()), |a, b| a.0.cmp(&b.0));
///
/// assert_eq!(nodes[0].0, 1);
/// assert_eq!(nodes[1].1[0].0, 7);
/// ```
pub fn sort_with_children<T, C, F>(list: &mut [T], children: C, mut compare: F)
where
    C: Fn(&mut T) -> Option<&mut [T]>,
    F: FnMut(&T, &T) -> Ordering,
{
    let mut stack = vec![list];
    while let Some(level) = stack.pop() {
        sort(level, &mut compare);
        stack.extend(
            level
                .iter_mut()
                .filter_map(&children)
                .filter(|below| !below.is_empty()),
        );
    }
}
