//! The identifier validation pipeline.
//!
//! Rules run in a fixed order and the first violation wins:
//! 1. blank value or missing identifier type,
//! 2. voided short-circuit (a voided identifier is historical and passes),
//! 3. format regex,
//! 4. check digit,
//! 5. location requirement,
//! 6. uniqueness.
//!
//! [`validate_field_lengths`] is the *other* validation entry point: a
//! storage-width check that collects every violation instead of stopping at
//! the first, so forms can report all problems together.

use pim_types::{LocationPolicy, PatientIdentifier, PatientIdentifierType, UniquenessPolicy};
use regex::Regex;

use crate::checkdigit::{self, CheckDigitAlgorithm};
use crate::error::{IdentifierError, IdentifierResult};
use crate::lookup::{IdentifierLookup, IdentifierQuery};
use crate::messages::{MessageSource, INVALID_FORMAT_KEY};

/// Storage width of the identifier value column.
pub const MAX_IDENTIFIER_LEN: usize = 50;

/// Storage width of the void-reason column.
pub const MAX_VOID_REASON_LEN: usize = 255;

/// One field-length violation from [`validate_field_lengths`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
    /// Name of the offending field.
    pub field: &'static str,
    pub message: String,
}

/// Runs the identifier rule pipeline.
///
/// Holds only borrowed, read-only collaborators, so one validator can be
/// shared freely across threads.
pub struct IdentifierValidator<'a> {
    lookup: &'a dyn IdentifierLookup,
    messages: &'a dyn MessageSource,
}

impl<'a> IdentifierValidator<'a> {
    pub fn new(lookup: &'a dyn IdentifierLookup, messages: &'a dyn MessageSource) -> Self {
        Self { lookup, messages }
    }

    /// Run the full pipeline on one identifier record.
    ///
    /// # Errors
    ///
    /// The first violated rule, as the matching [`IdentifierError`] variant.
    pub fn validate(&self, identifier: &PatientIdentifier) -> IdentifierResult<()> {
        let Some(id_type) = identifier.identifier_type.as_ref() else {
            return Err(IdentifierError::Blank);
        };
        if identifier.identifier.trim().is_empty() {
            return Err(IdentifierError::Blank);
        }

        if identifier.voided {
            tracing::debug!(
                identifier = %identifier.identifier,
                "skipping validation of voided identifier"
            );
            return Ok(());
        }

        if let Some(format) = id_type.format.as_deref() {
            self.check_format(
                &identifier.identifier,
                format,
                id_type.format_description.as_deref(),
            )?;
        }

        if let Some(kind) = id_type.check_digit {
            check_against(&identifier.identifier, checkdigit::resolve(kind))?;
        }

        if id_type.location == LocationPolicy::Required && identifier.location.is_none() {
            return Err(IdentifierError::LocationRequired {
                type_name: id_type.name.clone(),
            });
        }

        self.check_uniqueness(identifier, id_type)
    }

    /// Check a value against a format regex.
    ///
    /// A blank format means no rule. The regex is anchored so the *whole*
    /// value must match. On mismatch the failure detail embeds the format
    /// description when one is configured, otherwise the raw format, rendered
    /// through the message source.
    ///
    /// # Errors
    ///
    /// [`IdentifierError::InvalidFormat`] on mismatch,
    /// [`IdentifierError::BadFormatPattern`] if the configured regex does not
    /// compile.
    pub fn check_format(
        &self,
        identifier: &str,
        format: &str,
        description: Option<&str>,
    ) -> IdentifierResult<()> {
        if format.trim().is_empty() {
            return Ok(());
        }

        let pattern = format!("^(?:{format})$");
        let regex = Regex::new(&pattern).map_err(|source| IdentifierError::BadFormatPattern {
            pattern: format.to_owned(),
            source,
        })?;

        if regex.is_match(identifier) {
            return Ok(());
        }

        let expected = description.filter(|d| !d.trim().is_empty()).unwrap_or(format);
        let detail = self
            .messages
            .message(INVALID_FORMAT_KEY, &[identifier, expected]);
        tracing::debug!(identifier, format, "identifier failed format check");
        Err(IdentifierError::InvalidFormat {
            identifier: identifier.to_owned(),
            expected: detail,
        })
    }

    fn check_uniqueness(
        &self,
        identifier: &PatientIdentifier,
        id_type: &PatientIdentifierType,
    ) -> IdentifierResult<()> {
        let mut query = IdentifierQuery::for_candidate(identifier, id_type.uuid);
        match id_type.uniqueness {
            UniquenessPolicy::NonUnique => return Ok(()),
            UniquenessPolicy::Unique => {}
            UniquenessPolicy::UniquePerLocation => {
                if let Some(location) = identifier.location.as_ref() {
                    query = query.at_location(location.uuid);
                }
            }
        }

        tracing::debug!(
            identifier = %identifier.identifier,
            identifier_type = %id_type.name,
            "querying existing identifiers for uniqueness"
        );
        let in_use = self
            .lookup
            .in_use_by_other(&query)
            .map_err(IdentifierError::Lookup)?;
        if in_use {
            return Err(IdentifierError::NotUnique {
                identifier: identifier.identifier.clone(),
            });
        }
        Ok(())
    }
}

/// Check a value against a check-digit algorithm, standalone.
///
/// # Errors
///
/// [`IdentifierError::Blank`] for a blank value, otherwise whatever the
/// algorithm reports.
pub fn check_against(
    identifier: &str,
    algorithm: &dyn CheckDigitAlgorithm,
) -> IdentifierResult<()> {
    if identifier.trim().is_empty() {
        return Err(IdentifierError::Blank);
    }
    algorithm.validate(identifier)
}

/// Check storage-width limits on an identifier record.
///
/// Unlike the rule pipeline this never fails fast: every violated limit is
/// reported, and an empty result means the record fits.
pub fn validate_field_lengths(identifier: &PatientIdentifier) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    if identifier.identifier.chars().count() > MAX_IDENTIFIER_LEN {
        violations.push(FieldViolation {
            field: "identifier",
            message: format!("identifier exceeds {MAX_IDENTIFIER_LEN} characters"),
        });
    }

    if let Some(reason) = identifier.void_reason.as_deref() {
        if reason.chars().count() > MAX_VOID_REASON_LEN {
            violations.push(FieldViolation {
                field: "void_reason",
                message: format!("void reason exceeds {MAX_VOID_REASON_LEN} characters"),
            });
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkdigit::LuhnAlgorithm;
    use crate::lookup::{InMemoryIdentifierIndex, NoIdentifiers};
    use crate::messages::StaticMessages;
    use pim_types::{CheckDigitKind, Location};
    use uuid::Uuid;

    fn validator<'a>(lookup: &'a dyn IdentifierLookup) -> IdentifierValidator<'a> {
        IdentifierValidator::new(lookup, &StaticMessages)
    }

    fn luhn_type() -> PatientIdentifierType {
        let mut id_type = PatientIdentifierType::new("Old Identification Number");
        id_type.check_digit = Some(CheckDigitKind::Luhn);
        id_type
    }

    #[test]
    fn fails_with_blank_when_the_identifier_is_empty() {
        let identifier =
            PatientIdentifier::new("", Some(PatientIdentifierType::new("MRN")), None);
        let err = validator(&NoIdentifiers)
            .validate(&identifier)
            .expect_err("should fail blank");
        assert!(matches!(err, IdentifierError::Blank));
    }

    #[test]
    fn fails_with_blank_when_the_identifier_type_is_missing() {
        let identifier = PatientIdentifier::new("ABC", None, None);
        let err = validator(&NoIdentifiers)
            .validate(&identifier)
            .expect_err("should fail blank");
        assert!(matches!(err, IdentifierError::Blank));
    }

    #[test]
    fn a_voided_identifier_passes_despite_other_violations() {
        let mut identifier = PatientIdentifier::new("7TU-4", Some(luhn_type()), None);

        let err = validator(&NoIdentifiers)
            .validate(&identifier)
            .expect_err("should fail the check digit first");
        assert!(matches!(err, IdentifierError::InvalidCheckDigit { .. }));

        identifier.void("testing");
        validator(&NoIdentifiers)
            .validate(&identifier)
            .expect("voided identifier should pass");
    }

    #[test]
    fn format_rule_passes_a_matching_identifier() {
        let mut id_type = PatientIdentifierType::new("SSN");
        id_type.format = Some("[0-9]{3}-[0-9]{2}-[0-9]{4}".to_owned());
        let identifier = PatientIdentifier::new("111-22-3333", Some(id_type), None);

        validator(&NoIdentifiers)
            .validate(&identifier)
            .expect("matching identifier should pass");
    }

    #[test]
    fn format_rule_rejects_a_mismatching_identifier() {
        let mut id_type = PatientIdentifierType::new("SSN");
        id_type.format = Some("[0-9]{3}-[0-9]{2}-[0-9]{4}".to_owned());
        let identifier = PatientIdentifier::new("111-222-333", Some(id_type), None);

        let err = validator(&NoIdentifiers)
            .validate(&identifier)
            .expect_err("should fail format");
        assert!(matches!(err, IdentifierError::InvalidFormat { .. }));
    }

    #[test]
    fn format_rule_is_anchored_to_the_whole_value() {
        let v = validator(&NoIdentifiers);
        v.check_format("123", "[0-9]{3}", None).expect("exact match");
        let err = v
            .check_format("1234", "[0-9]{3}", None)
            .expect_err("partial match should not pass");
        assert!(matches!(err, IdentifierError::InvalidFormat { .. }));
    }

    #[test]
    fn a_blank_format_means_no_rule() {
        validator(&NoIdentifiers)
            .check_format("abcdefg", "", None)
            .expect("blank format should pass anything");
    }

    #[test]
    fn format_failure_embeds_the_raw_format_without_a_description() {
        let err = validator(&NoIdentifiers)
            .check_format("abc", "\\d+", None)
            .expect_err("should fail format");
        match err {
            IdentifierError::InvalidFormat { expected, .. } => {
                assert_eq!(expected, "identifier \"abc\" does not match: \"\\d+\"");
            }
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
    }

    #[test]
    fn format_failure_prefers_the_format_description() {
        let err = validator(&NoIdentifiers)
            .check_format("abc", "\\d+", Some("digits only"))
            .expect_err("should fail format");
        match err {
            IdentifierError::InvalidFormat { expected, .. } => {
                assert_eq!(expected, "identifier \"abc\" does not match: \"digits only\"");
            }
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
    }

    #[test]
    fn a_broken_format_pattern_is_a_configuration_error() {
        let err = validator(&NoIdentifiers)
            .check_format("abc", "(unclosed", None)
            .expect_err("should report the bad pattern");
        assert!(matches!(err, IdentifierError::BadFormatPattern { .. }));
    }

    #[test]
    fn check_digit_rule_accepts_a_luhn_valid_identifier() {
        let identifier = PatientIdentifier::new("7TU-8", Some(luhn_type()), None);
        validator(&NoIdentifiers)
            .validate(&identifier)
            .expect("luhn-valid identifier should pass");
    }

    #[test]
    fn check_digit_rule_rejects_a_luhn_invalid_identifier() {
        let identifier = PatientIdentifier::new("7TU-4", Some(luhn_type()), None);
        let err = validator(&NoIdentifiers)
            .validate(&identifier)
            .expect_err("should fail the check digit");
        assert!(matches!(err, IdentifierError::InvalidCheckDigit { .. }));
    }

    #[test]
    fn no_configured_algorithm_accepts_anything() {
        let identifier =
            PatientIdentifier::new("7TU-4", Some(PatientIdentifierType::new("MRN")), None);
        validator(&NoIdentifiers)
            .validate(&identifier)
            .expect("no algorithm means no checksum rule");
    }

    #[test]
    fn check_against_rejects_a_blank_identifier() {
        let err = check_against("", &LuhnAlgorithm).expect_err("should fail blank");
        assert!(matches!(err, IdentifierError::Blank));
    }

    #[test]
    fn required_location_fails_without_a_location() {
        let mut id_type = PatientIdentifierType::new("MRN");
        id_type.location = LocationPolicy::Required;
        let identifier = PatientIdentifier::new("1TU-1", Some(id_type), None);

        let err = validator(&NoIdentifiers)
            .validate(&identifier)
            .expect_err("should require a location");
        assert!(matches!(err, IdentifierError::LocationRequired { .. }));
    }

    #[test]
    fn not_used_location_passes_without_a_location() {
        let id_type = PatientIdentifierType::new("MRN");
        let identifier = PatientIdentifier::new("1TU-1", Some(id_type), None);

        validator(&NoIdentifiers)
            .validate(&identifier)
            .expect("location is ignored under not-used policy");
    }

    #[test]
    fn uniqueness_rule_rejects_a_value_held_by_another_patient() {
        let id_type = PatientIdentifierType::new("MRN");

        let mut taken = PatientIdentifier::new("101-6", Some(id_type.clone()), None);
        taken.patient = Some(Uuid::new_v4());
        let mut index = InMemoryIdentifierIndex::new();
        index.insert(&taken);

        let mut candidate = PatientIdentifier::new("101-6", Some(id_type), None);
        candidate.patient = Some(Uuid::new_v4());

        let err = validator(&index)
            .validate(&candidate)
            .expect_err("should fail uniqueness");
        assert!(matches!(
            err,
            IdentifierError::NotUnique { identifier } if identifier == "101-6"
        ));
    }

    #[test]
    fn non_unique_policy_skips_the_lookup() {
        let mut id_type = PatientIdentifierType::new("MRN");
        id_type.uniqueness = UniquenessPolicy::NonUnique;

        let mut taken = PatientIdentifier::new("101-6", Some(id_type.clone()), None);
        taken.patient = Some(Uuid::new_v4());
        let mut index = InMemoryIdentifierIndex::new();
        index.insert(&taken);

        let mut candidate = PatientIdentifier::new("101-6", Some(id_type), None);
        candidate.patient = Some(Uuid::new_v4());

        validator(&index)
            .validate(&candidate)
            .expect("non-unique policy should pass a duplicate");
    }

    #[test]
    fn unique_per_location_passes_when_the_clash_is_elsewhere() {
        let mut id_type = PatientIdentifierType::new("MRN");
        id_type.uniqueness = UniquenessPolicy::UniquePerLocation;

        let here = Location::new("Amani Clinic");
        let there = Location::new("Mosoriot Clinic");

        let mut taken =
            PatientIdentifier::new("101-6", Some(id_type.clone()), Some(there));
        taken.patient = Some(Uuid::new_v4());
        let mut index = InMemoryIdentifierIndex::new();
        index.insert(&taken);

        let mut candidate =
            PatientIdentifier::new("101-6", Some(id_type), Some(here));
        candidate.patient = Some(Uuid::new_v4());

        validator(&index)
            .validate(&candidate)
            .expect("clash at a different location should pass");
    }

    #[test]
    fn lookup_failures_surface_as_lookup_errors() {
        struct BrokenIndex;

        impl IdentifierLookup for BrokenIndex {
            fn in_use_by_other(
                &self,
                _query: &IdentifierQuery<'_>,
            ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
                Err("store unavailable".into())
            }
        }

        let identifier =
            PatientIdentifier::new("101-6", Some(PatientIdentifierType::new("MRN")), None);
        let err = validator(&BrokenIndex)
            .validate(&identifier)
            .expect_err("should surface the lookup failure");
        assert!(matches!(err, IdentifierError::Lookup(_)));
    }

    #[test]
    fn field_lengths_pass_when_within_limits() {
        let mut identifier =
            PatientIdentifier::new("1TU-1", Some(PatientIdentifierType::new("MRN")), None);
        identifier.void_reason = Some("voidReason".to_owned());

        assert!(validate_field_lengths(&identifier).is_empty());
    }

    #[test]
    fn field_lengths_report_each_violation_without_halting() {
        let mut identifier = PatientIdentifier::new(
            "x".repeat(MAX_IDENTIFIER_LEN + 1),
            Some(PatientIdentifierType::new("MRN")),
            None,
        );
        identifier.void_reason = Some("y".repeat(MAX_VOID_REASON_LEN + 1));

        let violations = validate_field_lengths(&identifier);
        let fields: Vec<&str> = violations.iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["identifier", "void_reason"]);
    }
}
