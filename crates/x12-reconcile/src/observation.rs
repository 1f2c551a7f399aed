//! Claim observations.
//!
//! Records from the three transaction families are normalized into a
//! single observation shape before entering the ledger. An observation is
//! anchored to the date the source document reports about the claim, not
//! the wall-clock moment of ingestion, so re-processing old files never
//! distorts the timeline.

use chrono::NaiveDate;
use x12_types::{
    well_known, AckOutcome, AcknowledgmentRecord, ClaimIdentity, ClaimState, PaymentRecord,
    StatusCode, StatusRecord, TransactionKind,
};

/// One family-normalized observation about a claim.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClaimObservation {
    /// Composite claim identity.
    pub identity: ClaimIdentity,
    /// Which transaction family reported this observation.
    pub family: TransactionKind,
    /// Date the source document reports about the claim.
    pub observed_at: NaiveDate,
    /// Billed/charged amount, when the family carries one.
    pub billed_amount: Option<f64>,
    /// Paid amount (payment family only).
    pub paid_amount: Option<f64>,
    /// Patient responsibility amount (payment family only).
    pub patient_responsibility: Option<f64>,
    /// Sum of claim-level adjustments (payment family only).
    pub adjustment_total: Option<f64>,
    /// Reported status codes (277 families).
    pub statuses: Vec<StatusCode>,
    /// Claim payment status code (CLP02, payment family).
    pub payment_status: Option<String>,
    /// Free-text rejection reason, when reported.
    pub rejection_reason: Option<String>,
}

impl ClaimObservation {
    /// Builds an observation from a claim status record.
    ///
    /// Returns `None` when the record lacks a complete claim identity or
    /// any usable date; such records cannot be correlated or ordered.
    pub fn from_status(record: &StatusRecord) -> Option<Self> {
        Some(Self {
            identity: record.identity()?,
            family: TransactionKind::ClaimStatus,
            observed_at: record
                .status_date
                .or(record.transaction_date)
                .or(record.service_dates.map(|d| d.start))?,
            billed_amount: record.billed_amount,
            paid_amount: None,
            patient_responsibility: None,
            adjustment_total: None,
            statuses: record.statuses.clone(),
            payment_status: None,
            rejection_reason: None,
        })
    }

    /// Builds an observation from an acknowledgment record.
    pub fn from_acknowledgment(record: &AcknowledgmentRecord) -> Option<Self> {
        Some(Self {
            identity: record.identity()?,
            family: TransactionKind::Acknowledgment,
            observed_at: record
                .status_date
                .or(record.transaction_date)
                .or(record.service_dates.map(|d| d.start))?,
            billed_amount: record.billed_amount,
            paid_amount: None,
            patient_responsibility: None,
            adjustment_total: None,
            statuses: record.statuses.clone(),
            payment_status: None,
            rejection_reason: record.rejection_reason.clone(),
        })
    }

    /// Builds an observation from a payment record.
    pub fn from_payment(record: &PaymentRecord) -> Option<Self> {
        Some(Self {
            identity: record.identity()?,
            family: TransactionKind::Payment,
            observed_at: record
                .payment_date
                .or(record.service_dates.map(|d| d.start))?,
            billed_amount: Some(record.charge_amount),
            paid_amount: Some(record.paid_amount),
            patient_responsibility: record.patient_responsibility,
            adjustment_total: Some(record.adjustment_total()),
            statuses: Vec::new(),
            payment_status: Some(record.status_code.clone()),
            rejection_reason: None,
        })
    }

    /// The lifecycle state this observation reports, when it reports one.
    ///
    /// Status codes are an open set: an observation whose codes say
    /// nothing this engine recognizes returns `None` and is recorded as
    /// history only.
    pub fn candidate_state(&self) -> Option<ClaimState> {
        match self.family {
            TransactionKind::Payment => self.payment_state(),
            TransactionKind::ClaimStatus | TransactionKind::Acknowledgment => {
                if self.statuses.iter().any(StatusCode::indicates_rejection) {
                    Some(ClaimState::Acknowledged(AckOutcome::Rejected))
                } else if self.statuses.iter().any(StatusCode::indicates_acceptance) {
                    Some(ClaimState::Acknowledged(AckOutcome::Accepted))
                } else {
                    // Pending or unrecognized categories confirm the claim
                    // exists without advancing it.
                    Some(ClaimState::Submitted)
                }
            }
        }
    }

    fn payment_state(&self) -> Option<ClaimState> {
        let code = self.payment_status.as_deref()?;
        if code == well_known::CLAIM_REVERSAL {
            return None;
        }
        if code == well_known::CLAIM_DENIED {
            return Some(ClaimState::Denied);
        }

        let paid = self.paid_amount.unwrap_or(0.0);
        let processed = matches!(
            code,
            well_known::CLAIM_PROCESSED_PRIMARY
                | well_known::CLAIM_PROCESSED_SECONDARY
                | well_known::CLAIM_PROCESSED_TERTIARY
        );
        if !processed && paid <= 0.0 {
            return None;
        }

        if paid <= 0.0 {
            Some(ClaimState::Denied)
        } else if self
            .billed_amount
            .is_some_and(|billed| paid + 0.005 < billed)
        {
            Some(ClaimState::PartiallyPaid)
        } else {
            Some(ClaimState::Paid)
        }
    }

    /// Returns true when payment amounts fail to balance: the charge must
    /// equal payment plus patient responsibility plus claim-level
    /// adjustments to within half a cent.
    pub fn amounts_imbalanced(&self) -> bool {
        let (Some(billed), Some(paid)) = (self.billed_amount, self.paid_amount) else {
            return false;
        };
        let explained = paid
            + self.patient_responsibility.unwrap_or(0.0)
            + self.adjustment_total.unwrap_or(0.0);
        (billed - explained).abs() >= 0.005
    }
}
