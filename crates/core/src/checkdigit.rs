//! Check-digit algorithms.
//!
//! An identifier type may designate a check-digit algorithm; the pipeline
//! resolves the [`CheckDigitKind`] selector to a concrete implementation and
//! asks it to accept or reject the value. Algorithms work on *decorated*
//! identifiers of the shape `<undecorated>-<digit>`: the part before the last
//! hyphen is scored, the part after it is the claimed check digit.

use pim_types::CheckDigitKind;

use crate::error::{IdentifierError, IdentifierResult};

/// A pluggable "accepts this identifier" capability.
pub trait CheckDigitAlgorithm: Send + Sync {
    /// Short algorithm name, used in error detail.
    fn name(&self) -> &'static str;

    /// Characters the undecorated identifier may contain.
    fn allowed_chars(&self) -> &'static str;

    /// Compute the check digit for an undecorated identifier.
    ///
    /// # Errors
    ///
    /// [`IdentifierError::UnallowedIdentifier`] if the input is empty or
    /// contains characters outside [`allowed_chars`](Self::allowed_chars).
    fn check_digit(&self, undecorated: &str) -> IdentifierResult<u32>;

    /// Accept or reject a decorated identifier (`<undecorated>-<digit>`).
    ///
    /// # Errors
    ///
    /// - [`IdentifierError::UnallowedIdentifier`] if the identifier is not in
    ///   the decorated shape or the undecorated part cannot be scored.
    /// - [`IdentifierError::InvalidCheckDigit`] if the claimed digit does not
    ///   match the computed one.
    fn validate(&self, identifier: &str) -> IdentifierResult<()> {
        let identifier = identifier.trim();
        let unallowed = |detail: &str| IdentifierError::UnallowedIdentifier {
            identifier: identifier.to_owned(),
            algorithm: self.name().to_owned(),
            detail: detail.to_owned(),
        };

        let (undecorated, claimed) = identifier
            .rsplit_once('-')
            .ok_or_else(|| unallowed("missing check digit separator"))?;
        if undecorated.is_empty() {
            return Err(unallowed("missing identifier before the check digit"));
        }
        let claimed: u32 = match claimed.parse() {
            Ok(digit) if claimed.len() == 1 => digit,
            _ => return Err(unallowed("check digit must be a single digit")),
        };

        if self.check_digit(undecorated)? == claimed {
            Ok(())
        } else {
            Err(IdentifierError::InvalidCheckDigit {
                identifier: identifier.to_owned(),
                algorithm: self.name().to_owned(),
            })
        }
    }
}

/// Mod-10 Luhn variant over an alphanumeric alphabet.
///
/// Characters are scored as `ascii - 48` after trimming and upper-casing, so
/// letters contribute larger "digits" than numerals. Walking right to left,
/// alternate positions (starting with the rightmost) are weighted
/// `2d - (d / 5) * 9`, the rest contribute `d` directly; the check digit is
/// whatever brings the offset sum up to the next multiple of ten.
#[derive(Debug, Default)]
pub struct LuhnAlgorithm;

const LUHN_ALLOWED: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

impl CheckDigitAlgorithm for LuhnAlgorithm {
    fn name(&self) -> &'static str {
        "luhn mod-10"
    }

    fn allowed_chars(&self) -> &'static str {
        LUHN_ALLOWED
    }

    fn check_digit(&self, undecorated: &str) -> IdentifierResult<u32> {
        let scored = undecorated.trim().to_uppercase();
        let unallowed = |detail: String| IdentifierError::UnallowedIdentifier {
            identifier: undecorated.to_owned(),
            algorithm: self.name().to_owned(),
            detail,
        };

        if scored.is_empty() {
            return Err(unallowed("identifier is empty".to_owned()));
        }

        let mut sum: i64 = 0;
        for (i, ch) in scored.chars().rev().enumerate() {
            if !LUHN_ALLOWED.contains(ch) {
                return Err(unallowed(format!("character '{ch}' is not allowed")));
            }
            let digit = i64::from(ch as u32) - 48;
            let weight = if i % 2 == 0 {
                2 * digit - (digit / 5) * 9
            } else {
                digit
            };
            sum += weight;
        }

        let sum = sum.abs() + 10;
        Ok(((10 - (sum % 10)) % 10) as u32)
    }
}

/// Resolve an identifier type's algorithm selector to its implementation.
pub fn resolve(kind: CheckDigitKind) -> &'static dyn CheckDigitAlgorithm {
    match kind {
        CheckDigitKind::Luhn => &LuhnAlgorithm,
    }
}
