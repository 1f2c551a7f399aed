//! Per-claim timeline and state machine.

use chrono::NaiveDate;
use x12_types::{ClaimIdentity, ClaimState};

use crate::config::ReconcileConfig;
use crate::observation::ClaimObservation;
use crate::report::ReconciliationAnomaly;

/// Ordered observation history and derived state for one claim identity.
///
/// The observation list is append-only: reconciliation never deletes
/// history, only derives new state from it. State transitions obey two
/// rules: an observation older than the current state's basis date never
/// changes state, and a candidate state with a lower progression rank
/// never replaces a higher one. Together they make re-ingestion
/// idempotent and regression impossible.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClaimTimeline {
    identity: ClaimIdentity,
    observations: Vec<ClaimObservation>,
    state: ClaimState,
    /// Date of the observation that last set or confirmed the state.
    state_basis: NaiveDate,
}

impl ClaimTimeline {
    /// Creates an empty timeline for a claim first seen on the given
    /// date. Every observation, the first included, enters through
    /// [`ClaimTimeline::ingest`].
    pub fn new(identity: ClaimIdentity, first_observed: NaiveDate) -> Self {
        Self {
            identity,
            observations: Vec::new(),
            state: ClaimState::Submitted,
            state_basis: first_observed,
        }
    }

    /// Returns the claim identity.
    pub fn identity(&self) -> &ClaimIdentity {
        &self.identity
    }

    /// Returns the derived current state.
    pub fn state(&self) -> ClaimState {
        self.state
    }

    /// Returns the basis date of the current state.
    pub fn state_basis(&self) -> NaiveDate {
        self.state_basis
    }

    /// Returns the full observation history, oldest first by ingestion.
    pub fn observations(&self) -> &[ClaimObservation] {
        &self.observations
    }

    /// Appends an observation and advances state per the transition rules.
    ///
    /// Returns the anomalies this observation raised; anomalies never
    /// block ingestion.
    pub fn ingest(&mut self, observation: ClaimObservation) -> Vec<ReconciliationAnomaly> {
        let mut anomalies = Vec::new();

        if observation.amounts_imbalanced() {
            anomalies.push(ReconciliationAnomaly::AmountImbalance {
                identity: self.identity.clone(),
                observed_at: observation.observed_at,
                billed: observation.billed_amount.unwrap_or(0.0),
                paid: observation.paid_amount.unwrap_or(0.0),
                patient_responsibility: observation.patient_responsibility.unwrap_or(0.0),
                adjustment_total: observation.adjustment_total.unwrap_or(0.0),
            });
        }

        if observation.observed_at < self.state_basis {
            anomalies.push(ReconciliationAnomaly::OutOfOrder {
                identity: self.identity.clone(),
                observed_at: observation.observed_at,
                state_basis: self.state_basis,
            });
        } else if let Some(candidate) = observation.candidate_state() {
            if candidate.rank() >= self.state.rank() {
                self.state = candidate;
                self.state_basis = observation.observed_at;
            }
        }

        self.observations.push(observation);
        anomalies
    }

    /// Returns true when the claim has not advanced past submission or
    /// acknowledgment within the configured aging threshold, measured
    /// from the state-basis observation date.
    pub fn is_stuck(&self, as_of: NaiveDate, config: &ReconcileConfig) -> bool {
        !self.state.is_settled()
            && (as_of - self.state_basis).num_days() > config.stuck_after_days
    }

    /// Returns true when a payment-bearing observation at or after the
    /// state basis shows the claim was eventually paid.
    ///
    /// A rejected claim that was corrected and resubmitted shows up this
    /// way even if a stale rejection set the current state.
    pub fn recovered(&self) -> bool {
        self.state.is_paid()
            || self
                .observations
                .iter()
                .any(|obs| obs.candidate_state().is_some_and(ClaimState::is_paid))
    }

    /// Returns true when any observation reported a front-door rejection.
    pub fn saw_rejection(&self) -> bool {
        self.observations
            .iter()
            .any(|obs| obs.candidate_state().is_some_and(ClaimState::is_rejected))
    }

    /// The most recently observed billed amount, when any observation
    /// carried one.
    pub fn billed_amount(&self) -> Option<f64> {
        self.observations
            .iter()
            .rev()
            .find_map(|obs| obs.billed_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x12_types::{StatusCode, TransactionKind};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn identity() -> ClaimIdentity {
        ClaimIdentity {
            claim_id: "CLM001".to_string(),
            patient_id: "MBR001".to_string(),
            payer_id: "12345".to_string(),
        }
    }

    fn status_obs(observed: NaiveDate, categories: &[&str]) -> ClaimObservation {
        ClaimObservation {
            identity: identity(),
            family: TransactionKind::Acknowledgment,
            observed_at: observed,
            billed_amount: Some(226.0),
            paid_amount: None,
            patient_responsibility: None,
            adjustment_total: None,
            statuses: categories
                .iter()
                .map(|c| StatusCode::new(*c, "20"))
                .collect(),
            payment_status: None,
            rejection_reason: None,
        }
    }

    fn submitted_obs(observed: NaiveDate) -> ClaimObservation {
        ClaimObservation {
            family: TransactionKind::ClaimStatus,
            statuses: vec![StatusCode::new("P1", "20")],
            ..status_obs(observed, &[])
        }
    }

    fn timeline_from(first: ClaimObservation) -> ClaimTimeline {
        let mut timeline = ClaimTimeline::new(first.identity.clone(), first.observed_at);
        timeline.ingest(first);
        timeline
    }

    fn payment_obs(observed: NaiveDate, paid: f64) -> ClaimObservation {
        ClaimObservation {
            identity: identity(),
            family: TransactionKind::Payment,
            observed_at: observed,
            billed_amount: Some(226.0),
            paid_amount: Some(paid),
            patient_responsibility: Some(226.0 - paid),
            adjustment_total: Some(0.0),
            statuses: Vec::new(),
            payment_status: Some("1".to_string()),
            rejection_reason: None,
        }
    }

    #[test]
    fn test_progression() {
        let mut timeline = timeline_from(submitted_obs(date(2024, 1, 10)));
        assert_eq!(timeline.state(), ClaimState::Submitted);

        timeline.ingest(status_obs(date(2024, 1, 15), &["A1"]));
        assert_eq!(
            timeline.state(),
            ClaimState::Acknowledged(x12_types::AckOutcome::Accepted)
        );

        timeline.ingest(payment_obs(date(2024, 1, 20), 132.0));
        assert_eq!(timeline.state(), ClaimState::PartiallyPaid);
        assert_eq!(timeline.state_basis(), date(2024, 1, 20));
        assert_eq!(timeline.observations().len(), 3);
    }

    #[test]
    fn test_duplicate_ingestion_is_idempotent() {
        let mut timeline = timeline_from(status_obs(date(2024, 1, 15), &["A7"]));
        let state = timeline.state();
        let basis = timeline.state_basis();

        let anomalies = timeline.ingest(status_obs(date(2024, 1, 15), &["A7"]));

        // History grows by the duplicate entry; nothing else changes.
        assert!(anomalies.is_empty());
        assert_eq!(timeline.observations().len(), 2);
        assert_eq!(timeline.state(), state);
        assert_eq!(timeline.state_basis(), basis);
    }

    #[test]
    fn test_late_rejection_never_regresses_paid_state() {
        let mut timeline = timeline_from(submitted_obs(date(2024, 1, 1)));
        timeline.ingest(payment_obs(date(2024, 1, 20), 226.0));
        assert_eq!(timeline.state(), ClaimState::Paid);

        // An older-timestamped rejection arrives after the payment.
        let anomalies = timeline.ingest(status_obs(date(2024, 1, 10), &["A7"]));

        assert_eq!(timeline.state(), ClaimState::Paid);
        assert_eq!(timeline.observations().len(), 3);
        assert!(matches!(
            anomalies.as_slice(),
            [ReconciliationAnomaly::OutOfOrder { .. }]
        ));
    }

    #[test]
    fn test_newer_acknowledgment_never_downgrades_settled_state() {
        let mut timeline = timeline_from(payment_obs(date(2024, 1, 20), 226.0));
        // Newer-dated but lower-rank information; state holds.
        timeline.ingest(status_obs(date(2024, 1, 25), &["A1"]));
        assert_eq!(timeline.state(), ClaimState::Paid);
    }

    #[test]
    fn test_imbalanced_payment_flags_but_still_advances() {
        let mut timeline = timeline_from(submitted_obs(date(2024, 1, 1)));

        let mut payment = payment_obs(date(2024, 1, 20), 132.0);
        payment.patient_responsibility = None;
        payment.adjustment_total = Some(32_259.0);

        let anomalies = timeline.ingest(payment);
        assert!(matches!(
            anomalies.as_slice(),
            [ReconciliationAnomaly::AmountImbalance { .. }]
        ));
        assert_eq!(timeline.state(), ClaimState::PartiallyPaid);
    }

    #[test]
    fn test_stuck_classification() {
        let config = ReconcileConfig::default();
        let timeline = timeline_from(status_obs(date(2024, 1, 1), &["A7"]));

        assert!(!timeline.is_stuck(date(2024, 1, 21), &config));
        assert!(timeline.is_stuck(date(2024, 2, 15), &config));

        let mut paid = timeline_from(status_obs(date(2024, 1, 1), &["A7"]));
        paid.ingest(payment_obs(date(2024, 1, 5), 226.0));
        assert!(!paid.is_stuck(date(2024, 6, 1), &config));
    }

    #[test]
    fn test_recovery_tracking() {
        let mut timeline = timeline_from(status_obs(date(2024, 1, 1), &["A7"]));
        assert!(timeline.saw_rejection());
        assert!(!timeline.recovered());

        timeline.ingest(payment_obs(date(2024, 2, 1), 226.0));
        assert!(timeline.recovered());
    }
}
