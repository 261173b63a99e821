//! Identifier validation failures.
//!
//! Every variant is a semantic rule violation, not a systemic fault: there is
//! nothing to retry, the identifier (or its configuration) is simply wrong.
//! The pipeline surfaces the first violated rule; callers match on the
//! variant to report it.

/// A violated identifier rule.
#[derive(Debug, thiserror::Error)]
pub enum IdentifierError {
    /// The identifier value is empty/whitespace, or the record has no
    /// identifier type.
    #[error("identifier is blank or has no identifier type")]
    Blank,
    /// The value does not match the type's format regex. `expected` is the
    /// rendered detail text (format description when configured, raw format
    /// otherwise).
    #[error("identifier \"{identifier}\" does not match: {expected}")]
    InvalidFormat { identifier: String, expected: String },
    /// The type's format regex itself does not compile. This is a
    /// configuration error, surfaced so deployments notice a broken type
    /// definition rather than silently passing everything.
    #[error("identifier format \"{pattern}\" is not a valid pattern: {source}")]
    BadFormatPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// The check-digit algorithm rejected the value.
    #[error("identifier \"{identifier}\" has an invalid check digit ({algorithm})")]
    InvalidCheckDigit {
        identifier: String,
        algorithm: String,
    },
    /// The value contains characters the check-digit algorithm cannot score,
    /// or is not in the `<undecorated>-<digit>` shape it expects.
    #[error("identifier \"{identifier}\" is not allowed by {algorithm}: {detail}")]
    UnallowedIdentifier {
        identifier: String,
        algorithm: String,
        detail: String,
    },
    /// The identifier type requires a location and none is attached.
    #[error("identifier type \"{type_name}\" requires a location")]
    LocationRequired { type_name: String },
    /// Another patient already holds an equal, non-voided identifier of the
    /// same type (within the location scope the policy defines).
    #[error("identifier \"{identifier}\" is already in use by another patient")]
    NotUnique { identifier: String },
    /// The external identifier lookup failed while answering the uniqueness
    /// query.
    #[error("identifier lookup failed: {0}")]
    Lookup(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type IdentifierResult<T> = std::result::Result<T, IdentifierError>;
