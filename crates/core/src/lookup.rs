//! Identifier lookup seam.
//!
//! The uniqueness rule has to ask the wider platform a single question: is
//! this value already held, on a non-voided identifier of the same type, by a
//! different patient? The [`IdentifierLookup`] trait is that seam; real
//! deployments back it with their identifier store. This module ships two
//! implementations: [`NoIdentifiers`] (an always-empty index, for tools that
//! validate in isolation) and [`InMemoryIdentifierIndex`] (for tests and
//! small utilities).

use pim_types::PatientIdentifier;
use uuid::Uuid;

/// One uniqueness question, fully scoped.
#[derive(Clone, Debug)]
pub struct IdentifierQuery<'a> {
    /// The identifier value to look for (exact match).
    pub value: &'a str,
    /// Identifier type the value must belong to.
    pub type_uuid: Uuid,
    /// When set, only identifiers at this location clash
    /// (unique-per-location policy).
    pub location: Option<Uuid>,
    /// The candidate record itself, excluded from the search.
    pub candidate_uuid: Uuid,
    /// The candidate's patient; identifiers of the same patient do not
    /// clash.
    pub patient: Option<Uuid>,
}

impl<'a> IdentifierQuery<'a> {
    /// Build the query for a candidate identifier. The location scope is only
    /// set by the caller when the type's policy is unique-per-location.
    pub fn for_candidate(candidate: &'a PatientIdentifier, type_uuid: Uuid) -> Self {
        Self {
            value: &candidate.identifier,
            type_uuid,
            location: None,
            candidate_uuid: candidate.uuid,
            patient: candidate.patient,
        }
    }

    /// Scope the query to a location.
    pub fn at_location(mut self, location: Uuid) -> Self {
        self.location = Some(location);
        self
    }
}

/// Read-only access to existing identifiers.
pub trait IdentifierLookup: Send + Sync {
    /// Whether any non-voided identifier matching the query is held by
    /// another patient.
    ///
    /// # Errors
    ///
    /// Implementations backed by external stores surface their own failure;
    /// the pipeline wraps it as a lookup error.
    fn in_use_by_other(
        &self,
        query: &IdentifierQuery<'_>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// An index that knows no identifiers. Every uniqueness check passes.
#[derive(Debug, Default)]
pub struct NoIdentifiers;

impl IdentifierLookup for NoIdentifiers {
    fn in_use_by_other(
        &self,
        _query: &IdentifierQuery<'_>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(false)
    }
}

#[derive(Clone, Debug)]
struct IndexEntry {
    uuid: Uuid,
    value: String,
    type_uuid: Uuid,
    location: Option<Uuid>,
    patient: Option<Uuid>,
    voided: bool,
}

/// In-memory identifier index.
#[derive(Debug, Default)]
pub struct InMemoryIdentifierIndex {
    entries: Vec<IndexEntry>,
}

impl InMemoryIdentifierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an existing identifier. Records without an identifier type are
    /// ignored; they cannot participate in typed uniqueness queries.
    pub fn insert(&mut self, identifier: &PatientIdentifier) {
        let Some(id_type) = identifier.identifier_type.as_ref() else {
            return;
        };
        self.entries.push(IndexEntry {
            uuid: identifier.uuid,
            value: identifier.identifier.clone(),
            type_uuid: id_type.uuid,
            location: identifier.location.as_ref().map(|l| l.uuid),
            patient: identifier.patient,
            voided: identifier.voided,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IdentifierLookup for InMemoryIdentifierIndex {
    fn in_use_by_other(
        &self,
        query: &IdentifierQuery<'_>,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let clash = self.entries.iter().any(|entry| {
            if entry.voided
                || entry.uuid == query.candidate_uuid
                || entry.type_uuid != query.type_uuid
                || entry.value != query.value
            {
                return false;
            }
            if let Some(scope) = query.location {
                if entry.location != Some(scope) {
                    return false;
                }
            }
            // Same known patient re-registering their own value is not a
            // clash; anything else is.
            match (entry.patient, query.patient) {
                (Some(theirs), Some(ours)) => theirs != ours,
                _ => true,
            }
        });
        Ok(clash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pim_types::{Location, PatientIdentifierType};

    fn existing(
        value: &str,
        id_type: &PatientIdentifierType,
        location: Option<&Location>,
    ) -> PatientIdentifier {
        let mut identifier = PatientIdentifier::new(
            value,
            Some(id_type.clone()),
            location.cloned(),
        );
        identifier.patient = Some(Uuid::new_v4());
        identifier
    }

    #[test]
    fn finds_a_clash_for_the_same_value_and_type() {
        let id_type = PatientIdentifierType::new("MRN");
        let mut index = InMemoryIdentifierIndex::new();
        index.insert(&existing("101-6", &id_type, None));

        let mut candidate = PatientIdentifier::new("101-6", Some(id_type.clone()), None);
        candidate.patient = Some(Uuid::new_v4());

        let query = IdentifierQuery::for_candidate(&candidate, id_type.uuid);
        assert!(index.in_use_by_other(&query).expect("lookup"));
    }

    #[test]
    fn ignores_voided_entries() {
        let id_type = PatientIdentifierType::new("MRN");
        let mut taken = existing("101-6", &id_type, None);
        taken.void("merged");
        let mut index = InMemoryIdentifierIndex::new();
        index.insert(&taken);

        let candidate = PatientIdentifier::new("101-6", Some(id_type.clone()), None);
        let query = IdentifierQuery::for_candidate(&candidate, id_type.uuid);
        assert!(!index.in_use_by_other(&query).expect("lookup"));
    }

    #[test]
    fn ignores_other_identifier_types() {
        let mrn = PatientIdentifierType::new("MRN");
        let ssn = PatientIdentifierType::new("SSN");
        let mut index = InMemoryIdentifierIndex::new();
        index.insert(&existing("101-6", &mrn, None));

        let candidate = PatientIdentifier::new("101-6", Some(ssn.clone()), None);
        let query = IdentifierQuery::for_candidate(&candidate, ssn.uuid);
        assert!(!index.in_use_by_other(&query).expect("lookup"));
    }

    #[test]
    fn the_candidate_record_does_not_clash_with_itself() {
        let id_type = PatientIdentifierType::new("MRN");
        let mut candidate = PatientIdentifier::new("101-6", Some(id_type.clone()), None);
        candidate.patient = Some(Uuid::new_v4());

        let mut index = InMemoryIdentifierIndex::new();
        index.insert(&candidate);

        let query = IdentifierQuery::for_candidate(&candidate, id_type.uuid);
        assert!(!index.in_use_by_other(&query).expect("lookup"));
    }

    #[test]
    fn the_same_patient_does_not_clash_with_their_own_value() {
        let id_type = PatientIdentifierType::new("MRN");
        let patient = Uuid::new_v4();

        let mut theirs = existing("101-6", &id_type, None);
        theirs.patient = Some(patient);
        let mut index = InMemoryIdentifierIndex::new();
        index.insert(&theirs);

        let mut candidate = PatientIdentifier::new("101-6", Some(id_type.clone()), None);
        candidate.patient = Some(patient);

        let query = IdentifierQuery::for_candidate(&candidate, id_type.uuid);
        assert!(!index.in_use_by_other(&query).expect("lookup"));
    }

    #[test]
    fn location_scope_only_matches_the_same_location() {
        let id_type = PatientIdentifierType::new("MRN");
        let here = Location::new("Amani Clinic");
        let there = Location::new("Mosoriot Clinic");

        let mut index = InMemoryIdentifierIndex::new();
        index.insert(&existing("101-6", &id_type, Some(&there)));

        let mut candidate =
            PatientIdentifier::new("101-6", Some(id_type.clone()), Some(here.clone()));
        candidate.patient = Some(Uuid::new_v4());

        let scoped = IdentifierQuery::for_candidate(&candidate, id_type.uuid)
            .at_location(here.uuid);
        assert!(!index.in_use_by_other(&scoped).expect("lookup"));

        let scoped_there = IdentifierQuery::for_candidate(&candidate, id_type.uuid)
            .at_location(there.uuid);
        assert!(index.in_use_by_other(&scoped_there).expect("lookup"));
    }

    #[test]
    fn insert_skips_records_without_a_type() {
        let mut index = InMemoryIdentifierIndex::new();
        index.insert(&PatientIdentifier::new("101-6", None, None));
        assert!(index.is_empty());
    }
}
