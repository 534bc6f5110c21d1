use derive_more::Display;
use thiserror::Error;

/// Names a caller-supplied accessor of a [`Hierarchy`](crate::Hierarchy).
#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, Display)]
pub enum Accessor {
    #[display(fmt = "id")]
    Id,
    #[display(fmt = "parent id")]
    ParentId,
    #[display(fmt = "root")]
    Root,
    #[display(fmt = "set children")]
    SetChildren,
    #[display(fmt = "transform")]
    Transform,
}

/// Errors that abort a hierarchy operation. No partial result is ever returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HierarchyError {
    #[error("Missing {0} accessor")]
    MissingAccessor(Accessor),
    #[error("Expected exactly one root element, found {found}")]
    RootCardinality { found: usize },
}
