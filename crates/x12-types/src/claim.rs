//! Extracted claim records.
//!
//! Each transaction family produces its own record shape; the three shapes
//! share the composite claim identity used by the reconciliation engine to
//! correlate records arriving from different streams.

use chrono::NaiveDate;

use crate::StatusCode;

/// A named party resolved from an NM1/N1 segment via the extractor's
/// qualifier-to-role table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Party {
    /// Display name; `first last` for persons, organization name otherwise.
    pub name: Option<String>,
    /// Identification code (member id, NPI, payer id).
    pub id: Option<String>,
}

impl Party {
    /// Returns true when neither a name nor an id was found.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.id.is_none()
    }
}

/// An inclusive service date range. Single service dates are carried as a
/// range with equal endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DateRange {
    /// First day of service.
    pub start: NaiveDate,
    /// Last day of service.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a single-day range.
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }
}

/// Composite key correlating records about the same claim across
/// transaction families.
///
/// Correlation requires an exact match on all three components; there is
/// deliberately no fuzzy matching, since over-eager matching conflates
/// distinct claims.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClaimIdentity {
    /// Provider-side claim identifier (patient account number / CLP01).
    pub claim_id: String,
    /// Patient or subscriber identification code.
    pub patient_id: String,
    /// Payer identification code.
    pub payer_id: String,
}

impl std::fmt::Display for ClaimIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}|{}", self.claim_id, self.patient_id, self.payer_id)
    }
}

fn identity_from_parts(
    claim_id: Option<&str>,
    patient_id: Option<&str>,
    payer_id: Option<&str>,
) -> Option<ClaimIdentity> {
    Some(ClaimIdentity {
        claim_id: claim_id?.to_string(),
        patient_id: patient_id?.to_string(),
        payer_id: payer_id?.to_string(),
    })
}

/// One claim's status as reported by a 277 claim status response.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusRecord {
    /// Claim-level trace number (TRN02).
    pub trace_number: Option<String>,
    /// Patient account number (REF*D9).
    pub claim_id: Option<String>,
    /// Patient or subscriber.
    pub patient: Party,
    /// Service provider.
    pub provider: Party,
    /// Payer (information source).
    pub payer: Party,
    /// Status codes in reporting order; an open set.
    pub statuses: Vec<StatusCode>,
    /// Effective date of the first reported status (STC02).
    pub status_date: Option<NaiveDate>,
    /// Total claim charge amount (STC04).
    pub billed_amount: Option<f64>,
    /// Service period.
    pub service_dates: Option<DateRange>,
    /// Payer claim control number (REF*1K).
    pub payer_claim_control_number: Option<String>,
    /// Transaction creation date (BHT04).
    pub transaction_date: Option<NaiveDate>,
}

impl StatusRecord {
    /// Returns the composite claim identity when all three components are
    /// present.
    pub fn identity(&self) -> Option<ClaimIdentity> {
        identity_from_parts(
            self.claim_id.as_deref(),
            self.patient.id.as_deref(),
            self.payer.id.as_deref(),
        )
    }
}

/// One claim's acknowledgment as reported by a 277CA.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcknowledgmentRecord {
    /// Claim-level trace number (TRN02).
    pub trace_number: Option<String>,
    /// Patient account number (REF*D9).
    pub claim_id: Option<String>,
    /// Patient or subscriber.
    pub patient: Party,
    /// Service provider.
    pub provider: Party,
    /// Payer (information source).
    pub payer: Party,
    /// Status codes in reporting order; an open set.
    pub statuses: Vec<StatusCode>,
    /// Effective date of the first reported status (STC02).
    pub status_date: Option<NaiveDate>,
    /// Total claim charge amount (STC04).
    pub billed_amount: Option<f64>,
    /// Service period.
    pub service_dates: Option<DateRange>,
    /// Free-text rejection reason (MSG01).
    pub rejection_reason: Option<String>,
    /// Payer claim control number (REF*1K).
    pub payer_claim_control_number: Option<String>,
    /// Transaction creation date (BHT04).
    pub transaction_date: Option<NaiveDate>,
}

impl AcknowledgmentRecord {
    /// Returns the composite claim identity when all three components are
    /// present.
    pub fn identity(&self) -> Option<ClaimIdentity> {
        identity_from_parts(
            self.claim_id.as_deref(),
            self.patient.id.as_deref(),
            self.payer.id.as_deref(),
        )
    }

    /// Returns true when any reported status category rejects the claim.
    pub fn is_rejected(&self) -> bool {
        self.statuses.iter().any(StatusCode::indicates_rejection)
    }

    /// Returns true when a status category accepts the claim and none
    /// rejects it.
    pub fn is_accepted(&self) -> bool {
        !self.is_rejected() && self.statuses.iter().any(StatusCode::indicates_acceptance)
    }
}

/// A claim-level or service-level adjustment from a CAS segment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Adjustment {
    /// Adjustment group code (CO, PR, OA, PI).
    pub group: String,
    /// Claim adjustment reason code; an open set.
    pub reason: String,
    /// Adjustment amount.
    pub amount: f64,
}

/// A paid service line from an SVC segment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceLine {
    /// Procedure code from the SVC01 composite (qualifier stripped).
    pub procedure: Option<String>,
    /// Line item charge amount.
    pub charge_amount: f64,
    /// Line item provider payment amount.
    pub paid_amount: f64,
    /// Paid units of service.
    pub units: Option<f64>,
    /// Line-level adjustments.
    pub adjustments: Vec<Adjustment>,
}

/// One claim's payment as reported by an 835 remittance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaymentRecord {
    /// Claim submitter's identifier (CLP01); matches the patient account
    /// number used by the 277 families.
    pub claim_id: Option<String>,
    /// Claim payment status code (CLP02); an open set.
    pub status_code: String,
    /// Total claim charge amount (CLP03).
    pub charge_amount: f64,
    /// Claim payment amount (CLP04).
    pub paid_amount: f64,
    /// Patient responsibility amount (CLP05).
    pub patient_responsibility: Option<f64>,
    /// Payer claim control number (CLP07).
    pub payer_claim_control_number: Option<String>,
    /// Patient named in the claim payment loop.
    pub patient: Party,
    /// Payer from the remittance header.
    pub payer: Party,
    /// Payee from the remittance header.
    pub payee: Party,
    /// Claim-level adjustments.
    pub adjustments: Vec<Adjustment>,
    /// Paid service lines.
    pub service_lines: Vec<ServiceLine>,
    /// Claim statement period.
    pub service_dates: Option<DateRange>,
    /// Payment effective date (BPR16).
    pub payment_date: Option<NaiveDate>,
}

impl PaymentRecord {
    /// Returns the composite claim identity when all three components are
    /// present.
    pub fn identity(&self) -> Option<ClaimIdentity> {
        identity_from_parts(
            self.claim_id.as_deref(),
            self.patient.id.as_deref(),
            self.payer.id.as_deref(),
        )
    }

    /// Sum of claim-level adjustment amounts.
    pub fn adjustment_total(&self) -> f64 {
        self.adjustments.iter().map(|a| a.amount).sum()
    }

    /// Returns true when charge, payment, patient responsibility, and
    /// claim-level adjustments balance to within half a cent.
    pub fn amounts_balance(&self) -> bool {
        let explained = self.paid_amount
            + self.patient_responsibility.unwrap_or(0.0)
            + self.adjustment_total();
        (self.charge_amount - explained).abs() < 0.005
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(charge: f64, paid: f64, patient_resp: Option<f64>, adj: &[f64]) -> PaymentRecord {
        PaymentRecord {
            claim_id: Some("CLM001".to_string()),
            status_code: "1".to_string(),
            charge_amount: charge,
            paid_amount: paid,
            patient_responsibility: patient_resp,
            payer_claim_control_number: None,
            patient: Party {
                name: Some("JANE DOE".to_string()),
                id: Some("MBR001".to_string()),
            },
            payer: Party {
                name: Some("ACME HEALTH".to_string()),
                id: Some("12345".to_string()),
            },
            payee: Party::default(),
            adjustments: adj
                .iter()
                .map(|&amount| Adjustment {
                    group: "CO".to_string(),
                    reason: "45".to_string(),
                    amount,
                })
                .collect(),
            service_lines: Vec::new(),
            service_dates: None,
            payment_date: None,
        }
    }

    #[test]
    fn test_identity_requires_all_components() {
        let record = payment(226.0, 132.0, Some(62.0), &[32.0]);
        let identity = record.identity().unwrap();
        assert_eq!(identity.claim_id, "CLM001");
        assert_eq!(identity.patient_id, "MBR001");
        assert_eq!(identity.payer_id, "12345");

        let mut missing = payment(226.0, 132.0, None, &[]);
        missing.patient.id = None;
        assert!(missing.identity().is_none());
    }

    #[test]
    fn test_amounts_balance() {
        assert!(payment(226.0, 132.0, Some(62.0), &[32.0]).amounts_balance());
        assert!(!payment(226.0, 132.0, None, &[32_259.0]).amounts_balance());
    }

    #[test]
    fn test_ack_classification() {
        let record = AcknowledgmentRecord {
            trace_number: None,
            claim_id: None,
            patient: Party::default(),
            provider: Party::default(),
            payer: Party::default(),
            statuses: vec![StatusCode::new("A7", "21")],
            status_date: None,
            billed_amount: None,
            service_dates: None,
            rejection_reason: None,
            payer_claim_control_number: None,
            transaction_date: None,
        };
        assert!(record.is_rejected());
        assert!(!record.is_accepted());

        let accepted = AcknowledgmentRecord {
            statuses: vec![StatusCode::new("A1", "20")],
            ..record
        };
        assert!(accepted.is_accepted());
    }
}
