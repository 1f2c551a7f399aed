//! # x12-parser
//!
//! Tokenizer, hierarchical loop assembler, envelope validator, and claim
//! extractors for X12 healthcare claim transactions.
//!
//! Three transaction families are supported: 277 claim status, 277CA
//! claim acknowledgment, and 835 payment/remittance. Parsing one document
//! is a pure function of its text: delimiters are discovered from the ISA
//! header window, segments are grouped into a loop tree per a configurable
//! hierarchy schema, envelope structure is validated into a non-fatal
//! diagnostics list, and the family's extractor produces typed claim
//! records.
//!
//! ```no_run
//! use x12_parser::parse_acknowledgments;
//!
//! # fn run(text: &str) -> Result<(), x12_parser::X12Error> {
//! let doc = parse_acknowledgments(text)?;
//! for record in &doc.records {
//!     if record.is_rejected() {
//!         println!("rejected: {:?}", record.claim_id);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod acknowledgment;
mod assembler;
mod claim_loop;
mod document;
mod envelope;
mod extractor;
mod payment;
mod status;
mod tokenizer;
mod types;

pub use acknowledgment::{summarize, AcknowledgmentExtractor, AckSummary};
pub use assembler::{HierarchySchema, LevelRule, LoopAssembler, LoopTrigger};
pub use document::{
    parse_acknowledgments, parse_claim_status, parse_document, parse_payments, Document,
};
#[cfg(feature = "parallel")]
pub use document::parse_batch_parallel;
pub use envelope::validate_envelope;
pub use extractor::{parse, party_from_n1, party_from_nm1, ClaimExtractor, PartyRole, QualifierRoles};
pub use payment::PaymentExtractor;
pub use status::StatusExtractor;
pub use tokenizer::{Delimiters, SegmentTokenizer, ISA_WINDOW_LEN};
pub use types::{Diagnostic, ExtractionError, ParserConfig, X12Error, X12Result};

// Re-export x12-types for convenience
pub use x12_types;
