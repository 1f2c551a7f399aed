//! The claim ledger.
//!
//! The ledger is the one shared mutable resource in this workspace. It is
//! an explicit object injected into every reconciliation call, never a
//! process-wide singleton, so tenants and test runs hold independent
//! ledgers concurrently. Observations for different claim identities
//! proceed in parallel; observations for the same identity serialize on
//! that timeline's lock, preserving the append-only/no-regression
//! invariants.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};
use x12_types::{ClaimIdentity, ClaimState, TransactionKind};

use crate::config::ReconcileConfig;
use crate::observation::ClaimObservation;
use crate::report::{ReconciliationAnomaly, ReconciliationReport, Severity, StuckClaimAlert};
use crate::timeline::ClaimTimeline;

/// Claim timelines keyed by identity, with single-writer-per-key locking.
pub struct ClaimLedger {
    config: ReconcileConfig,
    timelines: RwLock<HashMap<ClaimIdentity, Arc<Mutex<ClaimTimeline>>>>,
    anomalies: Mutex<Vec<ReconciliationAnomaly>>,
}

impl ClaimLedger {
    /// Creates a ledger with the given configuration.
    pub fn new(config: ReconcileConfig) -> Self {
        Self {
            config,
            timelines: RwLock::new(HashMap::new()),
            anomalies: Mutex::new(Vec::new()),
        }
    }

    /// Creates a ledger with default thresholds.
    pub fn with_defaults() -> Self {
        Self::new(ReconcileConfig::default())
    }

    /// Returns the configuration in effect.
    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Number of claim identities tracked.
    pub fn claim_count(&self) -> usize {
        self.timelines.read().len()
    }

    /// Current state of one claim, if tracked.
    pub fn state_of(&self, identity: &ClaimIdentity) -> Option<ClaimState> {
        let timeline = self.timelines.read().get(identity).cloned()?;
        let state = timeline.lock().state();
        Some(state)
    }

    /// Ingests one observation, creating the timeline on first sight of
    /// its claim identity.
    ///
    /// Returns the anomalies this observation raised; anomalies are also
    /// retained for reporting.
    pub fn observe(&self, observation: ClaimObservation) -> Vec<ReconciliationAnomaly> {
        let identity = observation.identity.clone();
        let timeline = self.timeline_for(&observation);

        let anomalies = {
            let mut guard = timeline.lock();
            guard.ingest(observation)
        };

        if !anomalies.is_empty() {
            self.anomalies.lock().extend(anomalies.iter().cloned());
            for anomaly in &anomalies {
                info!(%identity, %anomaly, "reconciliation anomaly");
            }
        }
        anomalies
    }

    /// Ingests a batch of observations, returning all anomalies raised.
    pub fn observe_all<I>(&self, observations: I) -> Vec<ReconciliationAnomaly>
    where
        I: IntoIterator<Item = ClaimObservation>,
    {
        let mut anomalies = Vec::new();
        for observation in observations {
            anomalies.extend(self.observe(observation));
        }
        anomalies
    }

    /// Returns the timeline for an observation's identity, creating an
    /// empty one on first sight.
    fn timeline_for(&self, observation: &ClaimObservation) -> Arc<Mutex<ClaimTimeline>> {
        let identity = &observation.identity;
        if let Some(existing) = self.timelines.read().get(identity) {
            return Arc::clone(existing);
        }

        let mut map = self.timelines.write();
        // Double-check: another writer may have created it meanwhile.
        if let Some(existing) = map.get(identity) {
            return Arc::clone(existing);
        }

        debug!(%identity, family = %observation.family, "tracking new claim");
        let timeline = Arc::new(Mutex::new(ClaimTimeline::new(
            identity.clone(),
            observation.observed_at,
        )));
        map.insert(identity.clone(), Arc::clone(&timeline));
        timeline
    }

    /// Computes the aggregate revenue-risk report as of a date.
    ///
    /// The report date is supplied by the caller rather than read from the
    /// clock so replays and tests are reproducible.
    pub fn report(&self, as_of: NaiveDate) -> ReconciliationReport {
        let window_start = self
            .config
            .lookback_days
            .map(|days| as_of - chrono::Duration::days(days));
        let in_window = |date: NaiveDate| window_start.map_or(true, |start| date >= start);

        let timelines: Vec<Arc<Mutex<ClaimTimeline>>> =
            self.timelines.read().values().cloned().collect();

        let mut total_acknowledgments = 0;
        let mut rejected_acknowledgments = 0;
        let mut revenue_at_risk = 0.0;
        let mut resubmitted_claims = 0;
        let mut alerts = Vec::new();

        for timeline in &timelines {
            let timeline = timeline.lock();

            for obs in timeline.observations() {
                if obs.family == TransactionKind::Acknowledgment && in_window(obs.observed_at) {
                    total_acknowledgments += 1;
                    if obs
                        .candidate_state()
                        .is_some_and(ClaimState::is_rejected)
                    {
                        rejected_acknowledgments += 1;
                    }
                }
            }

            if timeline.saw_rejection() && timeline.recovered() {
                resubmitted_claims += 1;
            }

            let stuck = timeline.is_stuck(as_of, &self.config);
            let rejected_unrecovered = timeline.state().is_rejected() && !timeline.recovered();
            if (stuck || rejected_unrecovered) && !timeline.recovered() {
                revenue_at_risk += timeline.billed_amount().unwrap_or(0.0);
                let days_since = (as_of - timeline.state_basis()).num_days();
                alerts.push(StuckClaimAlert {
                    identity: timeline.identity().clone(),
                    state: timeline.state(),
                    state_basis: timeline.state_basis(),
                    days_since,
                    severity: if days_since > self.config.high_severity_after_days {
                        Severity::High
                    } else {
                        Severity::Medium
                    },
                    billed_amount: timeline.billed_amount(),
                });
            }
        }

        // Oldest first: the longest-stalled revenue gets chased first.
        alerts.sort_by(|a, b| b.days_since.cmp(&a.days_since));

        let rejection_rate = if total_acknowledgments == 0 {
            0.0
        } else {
            rejected_acknowledgments as f64 / total_acknowledgments as f64
        };

        let report = ReconciliationReport {
            as_of,
            total_claims: timelines.len(),
            total_acknowledgments,
            rejected_acknowledgments,
            rejection_rate,
            revenue_at_risk,
            resubmitted_claims,
            alerts,
            anomalies: self.anomalies.lock().clone(),
        };

        info!(
            claims = report.total_claims,
            alerts = report.alerts.len(),
            revenue_at_risk = report.revenue_at_risk,
            "reconciliation report computed"
        );

        report
    }
}
