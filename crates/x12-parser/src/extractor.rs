//! Extractor trait and qualifier-to-role tables.
//!
//! Each transaction family implements [`ClaimExtractor`] over the
//! assembled loop tree. Which entity qualifier means "patient" versus
//! "provider" versus "payer" differs by family and by trading-partner
//! dialect, so every extractor carries a [`QualifierRoles`] table; a new
//! dialect is accommodated by adding table entries, never by branching
//! extractor logic.

use x12_types::{well_known, Party, Segment, Transaction, TransactionKind};

use crate::types::ExtractionError;

/// The entity roles a claim record resolves from name segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyRole {
    /// Patient, subscriber, or insured.
    Patient,
    /// Rendering or billing provider.
    Provider,
    /// Payer.
    Payer,
    /// Payee (835 remittance receiver).
    Payee,
}

/// Qualifier-to-role lookup table for one transaction family.
#[derive(Debug, Clone)]
pub struct QualifierRoles {
    patient: Vec<String>,
    provider: Vec<String>,
    payer: Vec<String>,
    payee: Vec<String>,
    /// REF qualifiers carrying the provider-side claim identifier.
    claim_reference: Vec<String>,
    /// REF qualifiers carrying the payer claim control number.
    control_reference: Vec<String>,
    /// REF qualifiers carrying a fallback patient identifier.
    member_reference: Vec<String>,
    /// DTP qualifiers carrying service dates.
    service_date: Vec<String>,
}

impl QualifierRoles {
    /// Table for the 277 claim status family.
    pub fn claim_status() -> Self {
        use well_known::*;
        Self {
            patient: strings(&[ENTITY_INSURED, ENTITY_PATIENT]),
            provider: strings(&[ENTITY_PROVIDER, ENTITY_BILLING_PROVIDER]),
            payer: strings(&[ENTITY_PAYER]),
            payee: Vec::new(),
            claim_reference: strings(&[REF_PATIENT_ACCOUNT]),
            control_reference: strings(&[REF_PAYER_CLAIM_CONTROL]),
            member_reference: strings(&[REF_MEMBER_ID, REF_MEMBER_ID_ALT]),
            service_date: strings(&[DATE_SERVICE_PERIOD, DATE_CLAIM_START, DATE_CLAIM_END]),
        }
    }

    /// Table for the 277CA acknowledgment family; identical to the claim
    /// status table today, kept separate so dialects can diverge.
    pub fn acknowledgment() -> Self {
        Self::claim_status()
    }

    /// Table for the 835 payment family.
    pub fn payment() -> Self {
        use well_known::*;
        Self {
            patient: strings(&[ENTITY_PATIENT, ENTITY_INSURED]),
            provider: strings(&[ENTITY_BILLING_PROVIDER]),
            payer: strings(&[ENTITY_PAYER]),
            payee: strings(&[ENTITY_PAYEE]),
            claim_reference: strings(&[REF_PATIENT_ACCOUNT]),
            control_reference: strings(&[REF_PAYER_CLAIM_CONTROL]),
            member_reference: strings(&[REF_MEMBER_ID, REF_MEMBER_ID_ALT]),
            service_date: strings(&[DATE_CLAIM_START, DATE_CLAIM_END, DATE_SERVICE_PERIOD]),
        }
    }

    /// Adds a patient qualifier for a trading-partner dialect.
    pub fn with_patient_qualifier<S: Into<String>>(mut self, qualifier: S) -> Self {
        self.patient.push(qualifier.into());
        self
    }

    /// Adds a claim-reference qualifier for a trading-partner dialect.
    pub fn with_claim_reference<S: Into<String>>(mut self, qualifier: S) -> Self {
        self.claim_reference.push(qualifier.into());
        self
    }

    /// Resolves an entity qualifier to a role.
    pub fn role_of(&self, qualifier: &str) -> Option<PartyRole> {
        if self.patient.iter().any(|q| q == qualifier) {
            Some(PartyRole::Patient)
        } else if self.provider.iter().any(|q| q == qualifier) {
            Some(PartyRole::Provider)
        } else if self.payer.iter().any(|q| q == qualifier) {
            Some(PartyRole::Payer)
        } else if self.payee.iter().any(|q| q == qualifier) {
            Some(PartyRole::Payee)
        } else {
            None
        }
    }

    /// Returns true if the REF qualifier carries the claim identifier.
    pub fn is_claim_reference(&self, qualifier: &str) -> bool {
        self.claim_reference.iter().any(|q| q == qualifier)
    }

    /// Returns true if the REF qualifier carries the payer claim control
    /// number.
    pub fn is_control_reference(&self, qualifier: &str) -> bool {
        self.control_reference.iter().any(|q| q == qualifier)
    }

    /// Returns true if the REF qualifier carries a fallback patient id.
    pub fn is_member_reference(&self, qualifier: &str) -> bool {
        self.member_reference.iter().any(|q| q == qualifier)
    }

    /// Returns true if the DTP qualifier carries a service date.
    pub fn is_service_date(&self, qualifier: &str) -> bool {
        self.service_date.iter().any(|q| q == qualifier)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Extracts a family's typed claim records from an assembled transaction.
pub trait ClaimExtractor {
    /// The record type this extractor produces.
    type Record;

    /// The transaction family this extractor consumes.
    const KIND: TransactionKind;

    /// The qualifier-to-role table in effect.
    fn roles(&self) -> &QualifierRoles;

    /// Walks the loop tree and produces the record set.
    ///
    /// # Errors
    /// Returns [`ExtractionError`] when a mandatory role cannot be
    /// resolved; the failure aborts this transaction only.
    fn extract(&self, transaction: &Transaction) -> Result<Vec<Self::Record>, ExtractionError>;
}

/// Builds a [`Party`] from an NM1 segment.
///
/// NM102 distinguishes person (1) from organization (2); persons carry
/// last/first in NM103/NM104, organizations the full name in NM103. The
/// identification code is NM109.
pub fn party_from_nm1(segment: &Segment) -> Party {
    let name = match segment.element(2) {
        Some("1") => {
            let last = segment.element_or_empty(3);
            let first = segment.element_or_empty(4);
            match (first.is_empty(), last.is_empty()) {
                (true, true) => None,
                (true, false) => Some(last.to_string()),
                (false, true) => Some(first.to_string()),
                (false, false) => Some(format!("{first} {last}")),
            }
        }
        _ => segment.element(3).map(str::to_string),
    };

    Party {
        name,
        id: segment.element(9).map(str::to_string),
    }
}

/// Builds a [`Party`] from an N1 segment (N102 name, N104 id).
pub fn party_from_n1(segment: &Segment) -> Party {
    Party {
        name: segment.element(2).map(str::to_string),
        id: segment.element(4).map(str::to_string),
    }
}

/// Field-parsing helpers shared by the extractors.
pub mod parse {
    use chrono::NaiveDate;
    use x12_types::DateRange;

    use crate::types::ExtractionError;

    /// Parses a monetary amount.
    pub fn amount(value: &str) -> Result<f64, ExtractionError> {
        value
            .trim()
            .parse::<f64>()
            .map_err(|_| ExtractionError::InvalidAmount {
                value: value.to_string(),
            })
    }

    /// Parses an optional monetary amount, treating unparseable values as
    /// absent.
    pub fn amount_opt(value: Option<&str>) -> Option<f64> {
        value.and_then(|v| v.trim().parse::<f64>().ok())
    }

    /// Parses a CCYYMMDD date. Returns `None` for other shapes; dates are
    /// best-effort everywhere they appear.
    pub fn date(value: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), "%Y%m%d").ok()
    }

    /// Parses a DTP03 value: either a single CCYYMMDD date or a
    /// CCYYMMDD-CCYYMMDD range.
    pub fn date_range(value: &str) -> Option<DateRange> {
        let value = value.trim();
        match value.split_once('-') {
            Some((start, end)) => {
                let start = date(start)?;
                let end = date(end)?;
                Some(DateRange { start, end })
            }
            None => date(value).map(DateRange::single),
        }
    }
}
