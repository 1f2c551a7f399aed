//! Reconciliation configuration.

/// Configuration for the reconciliation engine.
///
/// The stuck-claim aging threshold is a policy parameter, not a constant:
/// different practices chase unpaid claims on different clocks.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Days since the state-basis observation before an unsettled claim is
    /// classified as stuck.
    pub stuck_after_days: i64,
    /// Days since the state-basis observation before a stuck-claim alert
    /// escalates to high severity.
    pub high_severity_after_days: i64,
    /// Report window: only observations within this many days of the
    /// report date count toward rate aggregates. `None` means no window.
    pub lookback_days: Option<i64>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            stuck_after_days: 30,
            high_severity_after_days: 45,
            lookback_days: None,
        }
    }
}

impl ReconcileConfig {
    /// Creates a config with a custom stuck threshold.
    pub fn with_stuck_after_days(days: i64) -> Self {
        Self {
            stuck_after_days: days,
            ..Self::default()
        }
    }

    /// Restricts report aggregates to a trailing window.
    pub fn with_lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = Some(days);
        self
    }
}
