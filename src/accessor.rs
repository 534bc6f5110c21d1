//! The accessor bundle describing how the engine reads and writes an opaque element type.
//!
//! A [`Hierarchy`] is populated once by the caller through chained builder methods and
//! then handed to [`Hierarchy::build_tree`] or [`Hierarchy::flatten`]. Required
//! accessors are checked when an operation starts, never while the input is consumed.
//!
//! # Root convention
//!
//! A single predicate ([`Hierarchy::root`]) recognizes the *root sentinel value*.
//! An element whose parent id satisfies it is a direct child of the root and sits at
//! the top level of a result; an element whose own id satisfies it is the root holder,
//! which only appears in results when [`Hierarchy::include_root`] is set.
//!
//! # Transform modes
//!
//! With transform enabled every result element is produced by the transform
//! function. With transform disabled the input elements themselves are moved into
//! the result, which requires the result type to be the element type (configurations
//! created with [`Hierarchy::new`]).

use tracing::trace;

use crate::error::{Accessor, HierarchyError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The plain switches of a [`Hierarchy`], separated so they can be loaded from settings.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HierarchyOptions {
    /// `None` means enabled exactly when a transform function is set.
    pub enable_transform: Option<bool>,
    /// Flattening keeps every transitive descendant of a top level element.
    pub all_descendants: bool,
    /// Results are headed by the single element whose id is the root sentinel.
    pub include_root: bool,
}

type KeyFn<T, V> = Box<dyn Fn(&T) -> V>;

/// Caller-supplied accessors over elements `T` with ids `V`, producing results `R`.
pub struct Hierarchy<T, V, R = T> {
    pub(crate) id: Option<KeyFn<T, V>>,
    pub(crate) parent_id: Option<KeyFn<T, V>>,
    pub(crate) root: Option<Box<dyn Fn(&V) -> bool>>,
    pub(crate) children: Option<Box<dyn Fn(&mut T) -> Vec<T>>>,
    pub(crate) set_children: Option<Box<dyn Fn(&mut R, Vec<R>)>>,
    pub(crate) transform: Option<Box<dyn Fn(T) -> R>>,
    pub(crate) filter: Option<Box<dyn Fn(&T) -> bool>>,
    /// Present only when `R = T`, so untransformed elements can be moved through.
    passthrough: Option<fn(T) -> R>,
    pub(crate) options: HierarchyOptions,
}

impl<T, V> Hierarchy<T, V, T> {
    /// Creates an empty configuration whose results are the input elements themselves.
    pub fn new() -> Self {
        Self::with_passthrough(Some(std::convert::identity))
    }
}

impl<T, V> Default for Hierarchy<T, V, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, V, R> Hierarchy<T, V, R> {
    /// Creates an empty configuration for a result type that must be produced by
    /// [`Hierarchy::transform`].
    pub fn transforming() -> Self {
        Self::with_passthrough(None)
    }

    fn with_passthrough(passthrough: Option<fn(T) -> R>) -> Self {
        Hierarchy {
            id: None,
            parent_id: None,
            root: None,
            children: None,
            set_children: None,
            transform: None,
            filter: None,
            passthrough,
            options: HierarchyOptions::default(),
        }
    }

    /// Reads the id of an element. Required.
    pub fn id<F>(mut self, id: F) -> Self
    where
        F: Fn(&T) -> V + 'static,
    {
        self.id = Some(Box::new(id));
        self
    }

    /// Reads the parent id of an element. Required.
    pub fn parent_id<F>(mut self, parent_id: F) -> Self
    where
        F: Fn(&T) -> V + 'static,
    {
        self.parent_id = Some(Box::new(parent_id));
        self
    }

    /// Recognizes the root sentinel value. Required.
    pub fn root<F>(mut self, root: F) -> Self
    where
        F: Fn(&V) -> bool + 'static,
    {
        self.root = Some(Box::new(root));
        self
    }

    /// Detaches the nested children of an element.
    ///
    /// When set, nested input is expanded into the working list in pre-order, so flat,
    /// nested and mixed inputs are all accepted.
    pub fn children<F>(mut self, children: F) -> Self
    where
        F: Fn(&mut T) -> Vec<T> + 'static,
    {
        self.children = Some(Box::new(children));
        self
    }

    /// Reads the nested children of an element without detaching them.
    ///
    /// Nested input is expanded like with [`Hierarchy::children`], but from clones, so
    /// every element keeps its own children list. Replaces any `children` accessor.
    pub fn read_children<F>(self, children: F) -> Self
    where
        T: Clone + 'static,
        F: Fn(&T) -> &[T] + 'static,
    {
        self.children(move |element: &mut T| children(element).to_vec())
    }

    /// Assigns the assembled children of a result element. Required by tree assembly.
    pub fn set_children<F>(mut self, set_children: F) -> Self
    where
        F: Fn(&mut R, Vec<R>) + 'static,
    {
        self.set_children = Some(Box::new(set_children));
        self
    }

    /// Produces a result element from an input element.
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(T) -> R + 'static,
    {
        self.transform = Some(Box::new(transform));
        self
    }

    /// Keeps only the elements for which `filter` holds.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn enable_transform(mut self, enable: bool) -> Self {
        self.options.enable_transform = Some(enable);
        self
    }

    pub fn all_descendants(mut self, all_descendants: bool) -> Self {
        self.options.all_descendants = all_descendants;
        self
    }

    pub fn include_root(mut self, include_root: bool) -> Self {
        self.options.include_root = include_root;
        self
    }

    /// Replaces every switch at once.
    pub fn options(mut self, options: HierarchyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_transform_enabled(&self) -> bool {
        self.options
            .enable_transform
            .unwrap_or(self.transform.is_some())
    }

    pub(crate) fn keys(&self) -> Result<Keys<'_, T, V>, HierarchyError> {
        let root = self
            .root
            .as_deref()
            .ok_or(HierarchyError::MissingAccessor(Accessor::Root))?;
        let parent_id = self
            .parent_id
            .as_deref()
            .ok_or(HierarchyError::MissingAccessor(Accessor::ParentId))?;
        let id = self
            .id
            .as_deref()
            .ok_or(HierarchyError::MissingAccessor(Accessor::Id))?;
        Ok(Keys {
            id,
            parent_id,
            root,
            children: self.children.as_deref(),
            filter: self.filter.as_deref(),
        })
    }

    pub(crate) fn materializer(&self) -> Result<Materialize<'_, T, R>, HierarchyError> {
        let materialize = if self.is_transform_enabled() {
            self.transform.as_deref().map(Materialize::Transform)
        } else {
            self.passthrough.map(Materialize::Move)
        };
        trace!(transform = self.is_transform_enabled(), "resolved materializer");
        materialize.ok_or(HierarchyError::MissingAccessor(Accessor::Transform))
    }
}

/// The validated key accessors of one call.
pub(crate) struct Keys<'h, T, V> {
    pub(crate) id: &'h dyn Fn(&T) -> V,
    pub(crate) parent_id: &'h dyn Fn(&T) -> V,
    pub(crate) root: &'h dyn Fn(&V) -> bool,
    pub(crate) children: Option<&'h dyn Fn(&mut T) -> Vec<T>>,
    pub(crate) filter: Option<&'h dyn Fn(&T) -> bool>,
}

impl<T, V> Keys<'_, T, V> {
    pub(crate) fn keep(&self, element: &T) -> bool {
        self.filter.map_or(true, |filter| filter(element))
    }
}

/// Turns a working element into a result element.
pub(crate) enum Materialize<'h, T, R> {
    Transform(&'h dyn Fn(T) -> R),
    Move(fn(T) -> R),
}

impl<T, R> Materialize<'_, T, R> {
    pub(crate) fn apply(&self, element: T) -> R {
        match self {
            Materialize::Transform(transform) => transform(element),
            Materialize::Move(passthrough) => passthrough(element),
        }
    }
}
