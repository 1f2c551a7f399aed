//! # x12-types
//!
//! Type definitions for X12 healthcare claim transactions.
//!
//! This crate provides the shared data model for the three claim
//! transaction families this workspace consumes: 277 claim status, 277CA
//! claim acknowledgment, and 835 payment/remittance. It holds segments,
//! loop trees, extracted claim records, and the claim lifecycle
//! enumerations; it performs no parsing or I/O itself.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via
//!   serde. Disable this feature for minimal-dependency usage.
//!
//! ## Usage
//!
//! ```rust
//! use x12_types::{Segment, StatusCode, TransactionKind};
//!
//! let stc = Segment::new("STC", vec!["A7:21", "20240115", "", "226.00"]);
//! let status = StatusCode::from_composite(stc.element(1).unwrap(), ':');
//!
//! assert!(status.indicates_rejection());
//! assert_eq!(
//!     TransactionKind::from_codes("277", "005010X214"),
//!     Some(TransactionKind::Acknowledgment)
//! );
//! ```

#![warn(missing_docs)]

mod claim;
mod enums;
mod hierarchy;
mod segment;
mod status_code;
mod transaction;
pub mod well_known;

// Re-export all public types at crate root
pub use claim::{
    AcknowledgmentRecord, Adjustment, ClaimIdentity, DateRange, Party, PaymentRecord, ServiceLine,
    StatusRecord,
};
pub use enums::{AckOutcome, ClaimState};
pub use hierarchy::{LoopNode, LoopTag};
pub use segment::Segment;
pub use status_code::StatusCode;
pub use transaction::{Transaction, TransactionKind};
