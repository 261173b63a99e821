//! Metadata registration for the domain model.
//!
//! Every domain type registers a descriptor naming its fields, declared
//! types and supertype edges. [`domain_registry`] builds the full table; the
//! persistence layer constructs a `BoundedFieldInspector` over it (reference
//! type [`DOMAIN_ROOT`]) to discover which fields carry domain objects.
//!
//! Registered names must match what [`TypeInfo`] implementations report, or
//! runtime classification will miss.

use pim_meta::{
    ContainerKind, DeclaredType, ElementType, MetaResult, TypeDescriptor, TypeInfo, TypeRegistry,
};

use crate::identifier::{Location, Patient, PatientIdentifier, PatientIdentifierType};

/// Marker root of the domain hierarchy. Every persisted domain type is
/// bounded by this name.
pub const DOMAIN_ROOT: &str = "DomainData";

/// Base of all audited domain records: identity plus void bookkeeping.
const BASE_DATA: &str = "BaseData";

impl TypeInfo for Location {
    fn type_name(&self) -> &'static str {
        "Location"
    }
}

impl TypeInfo for PatientIdentifierType {
    fn type_name(&self) -> &'static str {
        "PatientIdentifierType"
    }
}

impl TypeInfo for PatientIdentifier {
    fn type_name(&self) -> &'static str {
        "PatientIdentifier"
    }
}

impl TypeInfo for Patient {
    fn type_name(&self) -> &'static str {
        "Patient"
    }
}

/// Build the registry describing the PIM domain model.
///
/// # Errors
///
/// Registration only fails on duplicate names, which would mean this table
/// itself is wrong; callers treat that as fatal.
pub fn domain_registry() -> MetaResult<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    registry.register_builtin_containers()?;

    registry.register(TypeDescriptor::new(DOMAIN_ROOT))?;

    registry.register(
        TypeDescriptor::new(BASE_DATA)
            .implements(DOMAIN_ROOT)
            .field("uuid", DeclaredType::named("Uuid"))
            .field("date_created", DeclaredType::named("DateTime"))
            .field("voided", DeclaredType::named("bool"))
            .field("void_reason", DeclaredType::named("String"))
            .field("date_voided", DeclaredType::named("DateTime")),
    )?;

    registry.register(
        TypeDescriptor::new("Location")
            .extends(BASE_DATA)
            .field("name", DeclaredType::named("String")),
    )?;

    registry.register(
        TypeDescriptor::new("PatientIdentifierType")
            .extends(BASE_DATA)
            .field("name", DeclaredType::named("String"))
            .field("format", DeclaredType::named("String"))
            .field("format_description", DeclaredType::named("String"))
            .field("check_digit", DeclaredType::named("CheckDigitKind"))
            .field("uniqueness", DeclaredType::named("UniquenessPolicy"))
            .field("location", DeclaredType::named("LocationPolicy")),
    )?;

    registry.register(
        TypeDescriptor::new("PatientIdentifier")
            .extends(BASE_DATA)
            .field("identifier", DeclaredType::named("String"))
            .field(
                "identifier_type",
                DeclaredType::named("PatientIdentifierType"),
            )
            .field("location", DeclaredType::named("Location"))
            .field("patient", DeclaredType::named("Uuid")),
    )?;

    registry.register(
        TypeDescriptor::new("Patient")
            .extends(BASE_DATA)
            .field(
                "identifiers",
                DeclaredType::container(
                    ContainerKind::Unordered,
                    ElementType::named("PatientIdentifier"),
                ),
            ),
    )?;

    Ok(registry)
}
