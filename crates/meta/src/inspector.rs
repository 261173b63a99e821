//! Bounded-field inspection against a reference type.
//!
//! The persistence layer needs to know, for any registered type, which of its
//! fields carry domain objects: either directly (the field's declared type is
//! bounded by the domain base type) or as a container of them. The
//! [`BoundedFieldInspector`] answers that from registered metadata alone;
//! runtime contents never influence the classification.

use crate::registry::{DeclaredType, ElementType, FieldDescriptor, TypeRegistry};
use crate::{MetaError, MetaResult, TypeInfo};

/// Classifies registered fields and types against a reference type fixed at
/// construction.
///
/// The inspector borrows the registry and holds no mutable state, so a single
/// instance is safe to share across threads.
#[derive(Debug)]
pub struct BoundedFieldInspector<'r> {
    registry: &'r TypeRegistry,
    reference: String,
}

impl<'r> BoundedFieldInspector<'r> {
    /// Create an inspector for `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`MetaError::UnknownReferenceType`] if `reference` was never
    /// registered. This is a construction-time programming error, distinct
    /// from the lookup errors the query methods return.
    pub fn new(registry: &'r TypeRegistry, reference: &str) -> MetaResult<Self> {
        if !registry.contains(reference) {
            return Err(MetaError::UnknownReferenceType(reference.to_owned()));
        }
        Ok(Self {
            registry,
            reference: reference.to_owned(),
        })
    }

    /// The reference type this inspector classifies against.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Whether `type_name` is the reference type or a subtype/implementer of
    /// it.
    pub fn is_bounded(&self, type_name: &str) -> bool {
        self.registry.is_subtype(type_name, &self.reference)
    }

    /// Bound test on a runtime value, via its registered type name.
    pub fn is_bounded_value(&self, value: &dyn TypeInfo) -> bool {
        self.is_bounded(value.type_name())
    }

    /// Bound test on a container element type.
    ///
    /// A type variable is resolved to its declared upper bound first. A
    /// variable with no declared bound is the universal top type, which is a
    /// subtype of nothing but itself and can never satisfy a registered
    /// reference type.
    pub fn is_bounded_element(&self, element: &ElementType) -> bool {
        match element {
            ElementType::Named(name) => self.is_bounded(name),
            ElementType::Variable {
                upper_bound: Some(bound),
                ..
            } => self.is_bounded(bound),
            ElementType::Variable {
                upper_bound: None, ..
            } => false,
        }
    }

    /// Whether `field` is a container of bounded elements.
    ///
    /// True iff the declared type is a container carrying exactly one
    /// resolvable element type, and that element type is bounded. A raw
    /// container field is never a bounded container field, whatever it holds
    /// at runtime.
    pub fn is_bounded_container_field(&self, field: &FieldDescriptor) -> bool {
        match &field.ty {
            DeclaredType::Container {
                element: Some(element),
                ..
            } => self.is_bounded_element(element),
            _ => false,
        }
    }

    /// Whether `field` was declared in a type bounded by the reference type.
    pub fn is_declared_in_bounded(&self, field: &FieldDescriptor) -> bool {
        self.is_bounded(&field.declared_in)
    }

    /// The subset of [`TypeRegistry::all_fields`] whose declared type relates
    /// to the reference type: directly bounded fields plus bounded container
    /// fields.
    pub fn bounded_fields(&self, type_name: &str) -> MetaResult<Vec<&'r FieldDescriptor>> {
        let fields = self.registry.all_fields(type_name)?;
        Ok(fields
            .into_iter()
            .filter(|field| match &field.ty {
                DeclaredType::Named(name) => self.is_bounded(name),
                DeclaredType::Container { .. } => self.is_bounded_container_field(field),
            })
            .collect())
    }

    /// The subset of [`TypeRegistry::all_fields`] declared in types bounded
    /// by the reference type (fields inherited from outside the bounded
    /// hierarchy are excluded).
    pub fn inherited_fields(&self, type_name: &str) -> MetaResult<Vec<&'r FieldDescriptor>> {
        let fields = self.registry.all_fields(type_name)?;
        Ok(fields
            .into_iter()
            .filter(|field| self.is_declared_in_bounded(field))
            .collect())
    }
}
