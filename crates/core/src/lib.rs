//! # PIM Core
//!
//! Business rules for patient identifiers.
//!
//! This crate contains the pure validation logic:
//! - The fail-fast rule pipeline ([`IdentifierValidator`]): blank check,
//!   voided short-circuit, format regex, check digit, location requirement,
//!   uniqueness.
//! - The accumulating field-length check ([`validator::validate_field_lengths`]),
//!   a separate entry point that collects every violation instead of failing
//!   on the first.
//! - Check-digit algorithms behind the [`CheckDigitAlgorithm`] trait.
//! - The seams the pipeline needs from the wider platform: identifier lookup
//!   ([`IdentifierLookup`]) and error-message rendering ([`MessageSource`]).
//! - Identifier-type configuration loading ([`config::IdentifierTypeSet`]).
//!
//! **No storage concerns**: where identifiers persist and how patients are
//! managed belongs to the callers; this crate only reads through the lookup
//! seam.

pub mod checkdigit;
pub mod config;
pub mod error;
pub mod lookup;
pub mod messages;
pub mod validator;

pub use checkdigit::{CheckDigitAlgorithm, LuhnAlgorithm};
pub use config::{ConfigError, IdentifierTypeSet};
pub use error::{IdentifierError, IdentifierResult};
pub use lookup::{IdentifierLookup, IdentifierQuery, InMemoryIdentifierIndex, NoIdentifiers};
pub use messages::{MessageSource, StaticMessages};
pub use validator::{FieldViolation, IdentifierValidator};
