//! # x12-reconcile
//!
//! Claim lifecycle reconciliation for X12 claim streams.
//!
//! Records from the 277 claim status, 277CA acknowledgment, and 835
//! payment families are normalized into [`ClaimObservation`]s and ingested
//! into a [`ClaimLedger`], which maintains an append-only
//! [`ClaimTimeline`] per composite claim identity. The ledger derives a
//! lifecycle state per claim and computes aggregate revenue-risk reports:
//! rejection rate, revenue at risk, and stuck-claim alerts.
//!
//! The failure mode this exists to catch: a claim is rejected at the
//! payer's front door, the rejection alert is missed, and the practice
//! waits for a remittance that will never arrive. Cross-referencing
//! acknowledgments with payments surfaces those claims while they can
//! still be corrected and resubmitted.
//!
//! ```
//! use chrono::NaiveDate;
//! use x12_reconcile::{ClaimLedger, ClaimObservation, ReconcileConfig};
//!
//! let ledger = ClaimLedger::new(ReconcileConfig::with_stuck_after_days(30));
//! // ... ledger.observe(observation) per extracted record ...
//! let report = ledger.report(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
//! assert_eq!(report.total_claims, 0);
//! ```

#![warn(missing_docs)]

mod config;
mod ledger;
mod observation;
mod report;
mod timeline;

pub use config::ReconcileConfig;
pub use ledger::ClaimLedger;
pub use observation::ClaimObservation;
pub use report::{ReconciliationAnomaly, ReconciliationReport, Severity, StuckClaimAlert};
pub use timeline::ClaimTimeline;

// Re-export x12-types for convenience
pub use x12_types;
