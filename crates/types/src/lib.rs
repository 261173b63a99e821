//! # PIM Types
//!
//! Domain model for patient identifiers.
//!
//! This crate defines the identifier records and their configuration:
//! - [`PatientIdentifier`]: one identifier value attached to a patient.
//! - [`PatientIdentifierType`]: the rules for a class of identifiers
//!   (format, check digit, uniqueness, location requirement).
//! - [`Location`]: where an identifier was issued.
//!
//! It also registers the domain model with `pim-meta` (see
//! [`metadata::domain_registry`]) so the persistence layer can discover which
//! fields of which types carry domain objects.
//!
//! **No behaviour**: the validation pipeline that enforces these rules lives
//! in `pim-core`.

pub mod identifier;
pub mod metadata;

pub use identifier::{
    CheckDigitKind, Location, LocationPolicy, Patient, PatientIdentifier, PatientIdentifierType,
    UniquenessPolicy,
};
pub use metadata::{domain_registry, DOMAIN_ROOT};
