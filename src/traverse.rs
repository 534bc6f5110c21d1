//! Callback driven pre-order walks over nested element lists.

use tracing::trace;

/// The level of the elements handed to [`traverse`] directly.
pub const FIRST_LEVEL: usize = 0;

/// One visited element and its surroundings.
#[derive(Debug)]
pub struct Visit<'a, T> {
    /// Depth of `current`, starting at [`FIRST_LEVEL`].
    pub level: usize,
    pub current: &'a T,
    /// `None` on the first level.
    pub parent: Option<&'a T>,
    /// The path from a first level element down to `parent`, both included.
    ///
    /// Only tracked when [`Visitor::with_ancestors`] holds, and `None` on the first level.
    pub ancestors: Option<&'a [&'a T]>,
    /// The children of `current`, `None` when it has none.
    pub children: Option<&'a [T]>,
}

impl<T> Clone for Visit<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Visit<'_, T> {}

impl<T> Visit<'_, T> {
    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }
}

/// Receives the elements of a [`traverse`] call.
///
/// Every `FnMut(Visit<'_, T>)` closure is a visitor that does not track ancestors.
pub trait Visitor<T> {
    /// Whether [`Visit::ancestors`] should be filled in.
    fn with_ancestors(&self) -> bool {
        false
    }

    /// Called once with the first level list before anything is visited.
    fn before_each(&mut self, _elements: &mut [T]) {}

    fn each(&mut self, visit: Visit<'_, T>);
}

impl<T, F> Visitor<T> for F
where
    F: FnMut(Visit<'_, T>),
{
    fn each(&mut self, visit: Visit<'_, T>) {
        self(visit)
    }
}

/// Wraps a closure into a [`Visitor`] that tracks ancestors.
pub struct WithAncestors<F>(pub F);

impl<T, F> Visitor<T> for WithAncestors<F>
where
    F: FnMut(Visit<'_, T>),
{
    fn with_ancestors(&self) -> bool {
        true
    }

    fn each(&mut self, visit: Visit<'_, T>) {
        (self.0)(visit)
    }
}

/// Visits `elements` and everything below them in pre-order.
///
/// `children` reads the nested children of an element; an empty list counts as none.
/// The walk runs on an explicit stack, so the depth of the input is not limited by the
/// call stack.
///
/// ```
/// use hierarchy::{traverse, Visit};
///
/// struct Dir {
///     name: &'static str,
///     entries: Vec<Dir>,
/// }
///
/// let mut dirs = vec![Dir {
///     name: "src",
///     entries: vec![Dir { name: "lib.rs", entries: vec![] }],
/// }];
/// let mut names = vec![];
/// traverse(
///     &mut dirs,
///     |d: &Dir| Some(d.entries.as_slice()),
///     &mut |v: Visit<'_, Dir>| names.push((v.level, v.current.name)),
/// );
/// assert_eq!(names, [(0, "src"), (1, "lib.rs")]);
/// ```
pub fn traverse<T, C, V>(elements: &mut [T], children: C, visitor: &mut V)
where
    C: Fn(&T) -> Option<&[T]>,
    V: Visitor<T> + ?Sized,
{
    if elements.is_empty() {
        return;
    }
    visitor.before_each(elements);

    let elements: &[T] = elements;
    let track = visitor.with_ancestors();
    let mut path: Vec<&T> = Vec::new();
    let mut stack: Vec<(&T, Option<&T>, usize)> = elements
        .iter()
        .rev()
        .map(|element| (element, None, FIRST_LEVEL))
        .collect();
    let mut visited = 0usize;

    while let Some((current, parent, level)) = stack.pop() {
        let below = children(current).filter(|c| !c.is_empty());
        if track {
            path.truncate(level);
        }
        visitor.each(Visit {
            level,
            current,
            parent,
            ancestors: (track && level > FIRST_LEVEL).then_some(path.as_slice()),
            children: below,
        });
        visited += 1;

        if let Some(below) = below {
            if track {
                path.push(current);
            }
            stack.extend(
                below
                    .iter()
                    .rev()
                    .map(|child| (child, Some(current), level + 1)),
            );
        }
    }
    trace!(visited, "traversal finished");
}
