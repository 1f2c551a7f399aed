//! Reconciliation anomalies and aggregate reporting types.

use chrono::NaiveDate;
use thiserror::Error;
use x12_types::{ClaimIdentity, ClaimState};

/// Non-fatal reconciliation findings.
///
/// Financial data is reported, never rejected: anomalies ride alongside
/// ingestion for downstream human review.
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ReconciliationAnomaly {
    /// A payment's charge is not explained by payment, patient
    /// responsibility, and adjustments.
    #[error("claim {identity}: charge {billed:.2} != paid {paid:.2} + patient {patient_responsibility:.2} + adjustments {adjustment_total:.2}")]
    AmountImbalance {
        /// The claim the payment belongs to.
        identity: ClaimIdentity,
        /// Observation date of the payment.
        observed_at: NaiveDate,
        /// Charge amount.
        billed: f64,
        /// Payment amount.
        paid: f64,
        /// Patient responsibility amount.
        patient_responsibility: f64,
        /// Sum of claim-level adjustments.
        adjustment_total: f64,
    },

    /// An observation arrived dated before the current state's basis; it
    /// was recorded in history without changing state.
    #[error("claim {identity}: observation dated {observed_at} arrived after state basis {state_basis}")]
    OutOfOrder {
        /// The claim observed.
        identity: ClaimIdentity,
        /// Date of the late observation.
        observed_at: NaiveDate,
        /// Basis date of the state it could not change.
        state_basis: NaiveDate,
    },
}

/// Alert severity for stuck-claim reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Severity {
    /// Within the escalation window; chase soon.
    Medium,
    /// Past the escalation window; revenue is at serious risk.
    High,
}

/// One claim flagged as stuck or rejected-without-recovery.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StuckClaimAlert {
    /// The claim at risk.
    pub identity: ClaimIdentity,
    /// Its current lifecycle state.
    pub state: ClaimState,
    /// Basis date of that state.
    pub state_basis: NaiveDate,
    /// Days between the basis date and the report date.
    pub days_since: i64,
    /// Escalation severity.
    pub severity: Severity,
    /// Billed amount at risk, when known.
    pub billed_amount: Option<f64>,
}

/// Aggregate revenue-risk report over one ledger.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReconciliationReport {
    /// Date the report was computed against.
    pub as_of: NaiveDate,
    /// Claim identities tracked.
    pub total_claims: usize,
    /// Acknowledgment observations in the report window.
    pub total_acknowledgments: usize,
    /// Rejecting acknowledgment observations in the report window.
    pub rejected_acknowledgments: usize,
    /// Rejected ÷ total acknowledgments, in `[0, 1]`.
    pub rejection_rate: f64,
    /// Sum of billed amounts for claims currently stuck or rejected with
    /// no subsequent payment.
    pub revenue_at_risk: f64,
    /// Rejected claims later observed paid.
    pub resubmitted_claims: usize,
    /// At-risk claims, oldest basis first.
    pub alerts: Vec<StuckClaimAlert>,
    /// All anomalies recorded since the ledger was created.
    pub anomalies: Vec<ReconciliationAnomaly>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anomaly_display() {
        let anomaly = ReconciliationAnomaly::AmountImbalance {
            identity: ClaimIdentity {
                claim_id: "CLM001".to_string(),
                patient_id: "MBR001".to_string(),
                payer_id: "12345".to_string(),
            },
            observed_at: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            billed: 226.0,
            paid: 132.0,
            patient_responsibility: 0.0,
            adjustment_total: 32_259.0,
        };
        let rendered = anomaly.to_string();
        assert!(rendered.contains("CLM001|MBR001|12345"));
        assert!(rendered.contains("32259.00"));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_anomaly_serializes() {
        let anomaly = ReconciliationAnomaly::OutOfOrder {
            identity: ClaimIdentity {
                claim_id: "CLM001".to_string(),
                patient_id: "MBR001".to_string(),
                payer_id: "12345".to_string(),
            },
            observed_at: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            state_basis: NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
        };
        let json = serde_json::to_string(&anomaly).unwrap();
        assert!(json.contains("OutOfOrder"));
        assert!(json.contains("2024-01-10"));
    }
}
