//! Parser-specific error, diagnostic, and configuration types.

use thiserror::Error;

/// Errors that abort parsing of a document or of one transaction.
///
/// Only `MalformedEnvelope` aborts an entire document; the per-transaction
/// variants abort the enclosing transaction and surface as a
/// [`Diagnostic::TransactionFailed`] so sibling transactions in a batch
/// continue.
#[derive(Error, Debug)]
pub enum X12Error {
    /// I/O error reading input text.
    #[error("IO error reading X12 input: {0}")]
    Io(#[from] std::io::Error),

    /// Tokenizer error from the underlying delimited reader.
    #[error("Tokenizer error: {0}")]
    Csv(#[from] csv::Error),

    /// The interchange header is too short or declares contradictory
    /// delimiters. Fatal; no partial output is produced.
    #[error("Malformed envelope at byte {offset}: {reason}")]
    MalformedEnvelope {
        /// What was wrong with the header window.
        reason: String,
        /// Byte offset of the problem within the input.
        offset: usize,
    },

    /// A schema-required hierarchy level declared a parent that never
    /// appeared, and the level is not a legal root.
    #[error("Orphan loop: level {level} declares no reachable parent (expected one of {expected_parents})")]
    OrphanLoop {
        /// The level code of the orphaned loop.
        level: String,
        /// Comma-joined legal parent codes from the schema.
        expected_parents: String,
    },

    /// Record extraction failed for one transaction.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The transaction set code/version pair is not one of the supported
    /// families.
    #[error("Unsupported transaction set {code} (version {version})")]
    UnsupportedTransaction {
        /// Transaction set code from ST01.
        code: String,
        /// Implementation version from ST03/GS08.
        version: String,
    },

    /// Strict mode rejected a document with validation diagnostics.
    #[error("Validation failed with {count} diagnostic(s) in strict mode")]
    Validation {
        /// Number of diagnostics collected.
        count: usize,
    },
}

/// Result type for parser operations.
pub type X12Result<T> = Result<T, X12Error>;

/// Errors raised while extracting claim records from an assembled tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// A mandatory role has no entity segment with a mapped qualifier.
    #[error("No {role} entity found for claim loop (qualifier table has no match)")]
    MissingRole {
        /// The role that could not be resolved (patient, payer, ...).
        role: &'static str,
    },

    /// A segment required by the transaction family is absent.
    #[error("Required segment {id} not found")]
    MissingSegment {
        /// The missing segment identifier.
        id: &'static str,
    },

    /// A monetary amount failed to parse.
    #[error("Invalid amount: {value}")]
    InvalidAmount {
        /// The offending element value.
        value: String,
    },
}

/// Non-fatal findings surfaced alongside successful extraction.
///
/// Diagnostics are collected and returned, never thrown; partially-invalid
/// documents still yield best-effort structured output.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// SE01 disagrees with the actual ST..SE segment count.
    #[error("Transaction {control_number}: declared {declared} segments, counted {actual}")]
    SegmentCountMismatch {
        /// Transaction set control number.
        control_number: String,
        /// SE01 as written (0 when unparseable).
        declared: usize,
        /// Actual segment count, ST and SE inclusive.
        actual: usize,
    },

    /// Header and trailer control numbers disagree.
    #[error("{scope} control number mismatch: header {header}, trailer {trailer}")]
    ControlNumberMismatch {
        /// Envelope scope: interchange, group, or transaction.
        scope: &'static str,
        /// Control number from the opening segment.
        header: String,
        /// Control number from the closing segment.
        trailer: String,
    },

    /// A trailer's declared child count disagrees with the actual count.
    #[error("{scope} trailer declares {declared} included, counted {actual}")]
    IncludedCountMismatch {
        /// Envelope scope: interchange or group.
        scope: &'static str,
        /// Count declared in the trailer.
        declared: usize,
        /// Actual count.
        actual: usize,
    },

    /// An envelope closing segment never appeared.
    #[error("Missing {id} trailer for {scope}")]
    MissingTrailer {
        /// The absent segment identifier.
        id: &'static str,
        /// Envelope scope the trailer should have closed.
        scope: &'static str,
    },

    /// An envelope closing segment appeared with no matching opener.
    #[error("Unmatched {id} segment closes no open {scope} envelope")]
    UnmatchedTrailer {
        /// The closing segment identifier.
        id: &'static str,
        /// Envelope scope.
        scope: &'static str,
    },

    /// One transaction in a batch failed; siblings continued.
    #[error("Transaction {control_number} failed: {reason}")]
    TransactionFailed {
        /// Transaction set control number ("?" when ST02 was absent).
        control_number: String,
        /// Rendered cause.
        reason: String,
    },
}

/// Configuration for document parsing.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Whether to run envelope validation and collect diagnostics.
    pub validate_envelope: bool,
    /// Whether a non-empty diagnostics list fails the parse call.
    pub strict: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            validate_envelope: true,
            strict: false,
        }
    }
}

impl ParserConfig {
    /// Creates a config that fails the parse call on any diagnostic.
    pub fn strict() -> Self {
        Self {
            validate_envelope: true,
            strict: true,
        }
    }
}
