//! # PIM Meta
//!
//! Static type metadata for the PIM domain model.
//!
//! Rust has no runtime reflection, so the persistence layer cannot walk a live
//! inheritance chain to discover collections of domain objects. Instead, each
//! domain type registers an explicit descriptor: its field names, declared
//! types, supertype edges, and (for container fields) the element type they
//! carry. The "is this type bounded by the domain base type" question then
//! becomes a lookup against the registered subtype graph.
//!
//! This crate provides:
//! - [`TypeRegistry`]: the name → descriptor table with subtype resolution.
//! - [`TypeDescriptor`] / [`FieldDescriptor`]: the registered metadata.
//! - [`BoundedFieldInspector`]: classifies fields of a registered type against
//!   a reference type fixed at construction.
//! - [`TypeInfo`]: the runtime hook that lets a value report its registered
//!   type name.
//!
//! **No domain knowledge**: which types exist and how they relate is decided
//! by the registering crate (see `pim-types`). This crate only answers
//! questions about whatever was registered.

pub mod inspector;
pub mod registry;

pub use inspector::BoundedFieldInspector;
pub use registry::{
    ContainerKind, DeclaredType, ElementType, FieldDescriptor, TypeDescriptor, TypeRegistry,
};

/// Errors raised by registration and metadata lookups.
///
/// These are programming/configuration errors, not validation failures: a
/// missing or duplicated registration means the metadata table itself is
/// wrong, and callers are not expected to recover.
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    /// A type name was looked up but never registered.
    #[error("type \"{0}\" is not registered")]
    UnknownType(String),
    /// The inspector was constructed with an unregistered reference type.
    #[error("reference type \"{0}\" is not registered")]
    UnknownReferenceType(String),
    /// The same type name was registered twice.
    #[error("type \"{0}\" is already registered")]
    DuplicateType(String),
    /// The `extends` chain of a type loops back on itself.
    #[error("type \"{0}\" has a cyclic extends chain")]
    CyclicHierarchy(String),
}

pub type MetaResult<T> = std::result::Result<T, MetaError>;

/// Runtime hook for values that belong to a registered type.
///
/// A value's reported name must match the name its type was registered under,
/// otherwise registry lookups on that value will miss.
pub trait TypeInfo {
    /// The registered type name of this value.
    fn type_name(&self) -> &'static str;
}

impl<T> TypeInfo for Vec<T> {
    fn type_name(&self) -> &'static str {
        registry::ORDERED_CONTAINER
    }
}

impl<T, S> TypeInfo for std::collections::HashSet<T, S> {
    fn type_name(&self) -> &'static str {
        registry::UNORDERED_CONTAINER
    }
}
