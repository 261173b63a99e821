//! Type descriptors and the registry they live in.
//!
//! A [`TypeDescriptor`] is the static stand-in for a class definition: the
//! type's name, the type it extends, the marker interfaces it implements, the
//! fields it declares (in declaration order, private fields included), and
//! whether the type itself is a multi-element container.
//!
//! The [`TypeRegistry`] owns all descriptors and answers the two structural
//! questions everything else builds on: "is A a subtype of B" (reflexive,
//! transitive, across both `extends` and `implements` edges) and "what is the
//! full field set of A" (own fields first, then ancestors').

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::{MetaError, MetaResult, TypeInfo};

/// Registered name of the built-in ordered container type (list-like).
pub const ORDERED_CONTAINER: &str = "Vec";

/// Registered name of the built-in unordered container type (set-like).
pub const UNORDERED_CONTAINER: &str = "Set";

/// Whether a container field keeps its elements in a defined order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerKind {
    /// List-like: elements have positions.
    Ordered,
    /// Set-like: elements are unordered and unique.
    Unordered,
}

impl ContainerKind {
    /// The registered name of the built-in container type of this kind.
    pub fn type_name(self) -> &'static str {
        match self {
            ContainerKind::Ordered => ORDERED_CONTAINER,
            ContainerKind::Unordered => UNORDERED_CONTAINER,
        }
    }
}

/// The element type carried by a generic container field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementType {
    /// A concrete registered type name.
    Named(String),
    /// A generic type variable, resolved to its declared upper bound when the
    /// bound check runs. No declared bound means the universal top type,
    /// which is a subtype of nothing but itself.
    Variable {
        name: String,
        upper_bound: Option<String>,
    },
}

impl ElementType {
    pub fn named(name: impl Into<String>) -> Self {
        ElementType::Named(name.into())
    }

    pub fn variable(name: impl Into<String>, upper_bound: Option<&str>) -> Self {
        ElementType::Variable {
            name: name.into(),
            upper_bound: upper_bound.map(str::to_owned),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Named(name) => write!(f, "{name}"),
            ElementType::Variable {
                name,
                upper_bound: Some(bound),
            } => write!(f, "{name}: {bound}"),
            ElementType::Variable {
                name,
                upper_bound: None,
            } => write!(f, "{name}"),
        }
    }
}

/// The declared (static) type of a field.
///
/// Classification in this crate is purely declared-type based: a raw
/// container field stays raw even if every element it holds at runtime would
/// satisfy a bound.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclaredType {
    /// A plain named type.
    Named(String),
    /// A container field. `element: None` models a raw (non-generic)
    /// container whose element type is unknown to the metadata.
    Container {
        kind: ContainerKind,
        element: Option<ElementType>,
    },
}

impl DeclaredType {
    pub fn named(name: impl Into<String>) -> Self {
        DeclaredType::Named(name.into())
    }

    pub fn container(kind: ContainerKind, element: ElementType) -> Self {
        DeclaredType::Container {
            kind,
            element: Some(element),
        }
    }

    pub fn raw_container(kind: ContainerKind) -> Self {
        DeclaredType::Container {
            kind,
            element: None,
        }
    }

    /// Whether this declared type is a container, raw or not.
    pub fn is_container(&self) -> bool {
        matches!(self, DeclaredType::Container { .. })
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Named(name) => write!(f, "{name}"),
            DeclaredType::Container {
                kind,
                element: Some(element),
            } => write!(f, "{}<{element}>", kind.type_name()),
            DeclaredType::Container {
                kind,
                element: None,
            } => write!(f, "{}", kind.type_name()),
        }
    }
}

/// One registered field: where it was declared, its name, and its declared
/// type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Name of the type whose descriptor declares this field.
    pub declared_in: String,
    /// Field name.
    pub name: String,
    /// Declared (static) type of the field.
    pub ty: DeclaredType,
}

/// Registered metadata for one type.
#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    name: String,
    extends: Option<String>,
    implements: Vec<String>,
    container: Option<ContainerKind>,
    fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    /// Start a descriptor for `name`. Chain [`extends`](Self::extends),
    /// [`implements`](Self::implements) and [`field`](Self::field) to fill it
    /// in, then hand it to [`TypeRegistry::register`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends: None,
            implements: Vec::new(),
            container: None,
            fields: Vec::new(),
        }
    }

    /// Declare the single supertype this type extends.
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    /// Declare a marker interface this type implements.
    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.implements.push(interface.into());
        self
    }

    /// Mark this type itself as a multi-element container.
    pub fn container(mut self, kind: ContainerKind) -> Self {
        self.container = Some(kind);
        self
    }

    /// Declare a field. Declaration order is preserved and significant.
    pub fn field(mut self, name: impl Into<String>, ty: DeclaredType) -> Self {
        self.fields.push(FieldDescriptor {
            declared_in: self.name.clone(),
            name: name.into(),
            ty,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.extends.as_deref()
    }

    pub fn interfaces(&self) -> &[String] {
        &self.implements
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Whether the type itself is a container type.
    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }
}

/// The table of registered type descriptors.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the built-in ordered/unordered container types so that
    /// container-capability checks work on plain `Vec` and `Set` values.
    pub fn register_builtin_containers(&mut self) -> MetaResult<()> {
        self.register(TypeDescriptor::new(ORDERED_CONTAINER).container(ContainerKind::Ordered))?;
        self.register(
            TypeDescriptor::new(UNORDERED_CONTAINER).container(ContainerKind::Unordered),
        )?;
        Ok(())
    }

    /// Register a descriptor. Names are unique; re-registering is an error.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> MetaResult<()> {
        if self.types.contains_key(descriptor.name()) {
            return Err(MetaError::DuplicateType(descriptor.name().to_owned()));
        }
        self.types
            .insert(descriptor.name().to_owned(), descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Every field declared anywhere along the `extends` chain of `name`:
    /// the type's own fields first, then its ancestors', preserving
    /// declaration order within each type.
    pub fn all_fields(&self, name: &str) -> MetaResult<Vec<&FieldDescriptor>> {
        let mut fields = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(name);

        while let Some(ty) = current {
            if !visited.insert(ty) {
                return Err(MetaError::CyclicHierarchy(name.to_owned()));
            }
            let descriptor = self
                .get(ty)
                .ok_or_else(|| MetaError::UnknownType(ty.to_owned()))?;
            fields.extend(descriptor.fields());
            current = descriptor.parent();
        }

        Ok(fields)
    }

    /// Reflexive, transitive subtype test across `extends` and `implements`
    /// edges. Unregistered names are subtypes of nothing but themselves.
    pub fn is_subtype(&self, name: &str, ancestor: &str) -> bool {
        if name == ancestor {
            return true;
        }

        let mut visited = HashSet::new();
        let mut pending = vec![name];

        while let Some(ty) = pending.pop() {
            if ty == ancestor {
                return true;
            }
            if !visited.insert(ty) {
                continue;
            }
            if let Some(descriptor) = self.get(ty) {
                if let Some(parent) = descriptor.parent() {
                    pending.push(parent);
                }
                pending.extend(descriptor.interfaces().iter().map(String::as_str));
            }
        }

        false
    }

    /// Whether the registered type `name` is itself a container type,
    /// independent of any reference type.
    pub fn is_container(&self, name: &str) -> bool {
        self.get(name).is_some_and(TypeDescriptor::is_container)
    }

    /// Container-capability test on a runtime value.
    pub fn is_container_value(&self, value: &dyn TypeInfo) -> bool {
        self.is_container(value.type_name())
    }
}
