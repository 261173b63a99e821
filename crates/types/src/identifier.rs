//! Patient identifier records and their configuration.
//!
//! A [`PatientIdentifier`] is a string value plus the
//! [`PatientIdentifierType`] that governs it. The type carries the business
//! rules as data: an optional format regex (with an optional human-readable
//! description for error text), an optional check-digit algorithm selector,
//! a uniqueness policy and a location policy. Identifier types are plain
//! serde structs so deployments can define them in configuration files.
//!
//! Records are never hard-deleted: a withdrawn identifier is *voided* and
//! kept for audit, which exempts it from active-record validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A place identifiers can be issued at and scoped to.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Location {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    pub name: String,
}

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Which check-digit algorithm an identifier type uses.
///
/// Algorithms are an enumerated configuration choice, not a dynamic lookup;
/// `pim-core` resolves the selector to a concrete implementation.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CheckDigitKind {
    /// Mod-10 Luhn variant over an alphanumeric alphabet.
    Luhn,
}

/// How strictly identifier values of a type must be unique.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum UniquenessPolicy {
    /// No other patient may hold an equal value of this type.
    #[default]
    Unique,
    /// Duplicate values are acceptable.
    NonUnique,
    /// No other patient may hold an equal value of this type *at the same
    /// location*.
    UniquePerLocation,
}

/// Whether identifiers of a type must name the location that issued them.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LocationPolicy {
    /// The location is ignored, present or not.
    #[default]
    NotUsed,
    /// An identifier without a location is invalid.
    Required,
}

/// Configuration for a class of identifiers.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PatientIdentifierType {
    #[serde(default = "Uuid::new_v4")]
    pub uuid: Uuid,
    pub name: String,
    /// Regex the whole identifier value must match. Blank or absent means no
    /// format rule.
    #[serde(default)]
    pub format: Option<String>,
    /// Human-readable description of the format, preferred over the raw
    /// regex in error text when present.
    #[serde(default)]
    pub format_description: Option<String>,
    /// Check-digit algorithm; absent means no checksum rule.
    #[serde(default)]
    pub check_digit: Option<CheckDigitKind>,
    #[serde(default)]
    pub uniqueness: UniquenessPolicy,
    #[serde(default)]
    pub location: LocationPolicy,
}

impl PatientIdentifierType {
    /// A type named `name` with no format, no check digit and the default
    /// policies (unique, location not used).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            format: None,
            format_description: None,
            check_digit: None,
            uniqueness: UniquenessPolicy::default(),
            location: LocationPolicy::default(),
        }
    }
}

/// One identifier value attached to a patient.
///
/// A record under construction may not yet carry its type; validation treats
/// a missing type the same as a blank value.
#[derive(Clone, Debug, PartialEq)]
pub struct PatientIdentifier {
    pub uuid: Uuid,
    pub identifier: String,
    pub identifier_type: Option<PatientIdentifierType>,
    pub location: Option<Location>,
    /// The patient this identifier belongs to, once assigned.
    pub patient: Option<Uuid>,
    pub voided: bool,
    pub void_reason: Option<String>,
    pub date_created: DateTime<Utc>,
    pub date_voided: Option<DateTime<Utc>>,
}

impl PatientIdentifier {
    pub fn new(
        identifier: impl Into<String>,
        identifier_type: Option<PatientIdentifierType>,
        location: Option<Location>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            identifier: identifier.into(),
            identifier_type,
            location,
            patient: None,
            voided: false,
            void_reason: None,
            date_created: Utc::now(),
            date_voided: None,
        }
    }

    /// Logically delete this identifier, keeping it for audit.
    pub fn void(&mut self, reason: impl Into<String>) {
        self.voided = true;
        self.void_reason = Some(reason.into());
        self.date_voided = Some(Utc::now());
    }
}

/// Patient summary record: the identifiers a patient currently holds.
///
/// The full patient service is outside this slice; this record exists so the
/// registered metadata has a real owner for the identifier container field
/// and so lookups can talk about "another patient".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patient {
    pub uuid: Uuid,
    pub identifiers: Vec<PatientIdentifier>,
}

impl Patient {
    pub fn new() -> Self {
        Self {
            uuid: Uuid::new_v4(),
            identifiers: Vec::new(),
        }
    }
}
