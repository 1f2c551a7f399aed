//! Document-level parse entry points.
//!
//! One call parses one interchange: tokenize, split into ST..SE
//! transactions, assemble each loop tree, validate the envelope, and run
//! the family's extractor. Tokenizer and assembler failures abort only the
//! transaction they occur in; sibling transactions in the batch still
//! parse, and the failure is surfaced as a diagnostic.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{info, warn};
use x12_types::{
    AcknowledgmentRecord, PaymentRecord, Segment, StatusRecord, Transaction, TransactionKind,
};

use crate::acknowledgment::AcknowledgmentExtractor;
use crate::assembler::LoopAssembler;
use crate::envelope::validate_envelope;
use crate::extractor::ClaimExtractor;
use crate::payment::PaymentExtractor;
use crate::status::StatusExtractor;
use crate::tokenizer::SegmentTokenizer;
use crate::types::{Diagnostic, ParserConfig, X12Error, X12Result};

/// Structured output of one parse call.
///
/// Serialization to a wire format and delivery are the output
/// collaborator's responsibility; this struct is the boundary shape.
#[derive(Debug, Clone)]
pub struct Document<R> {
    /// Transaction family parsed.
    pub kind: TransactionKind,
    /// Implementation version of the first transaction (GS08/ST03).
    pub version: String,
    /// Interchange control number (ISA13).
    pub interchange_control_number: Option<String>,
    /// Assembled transactions that parsed successfully.
    pub transactions: Vec<Transaction>,
    /// Extracted claim records across all transactions, in order.
    pub records: Vec<R>,
    /// Validation findings and per-transaction failures.
    pub diagnostics: Vec<Diagnostic>,
}

impl<R> Document<R> {
    /// Returns true when parsing produced no diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Parses one document with the given extractor and config.
///
/// # Errors
/// Returns [`X12Error::MalformedEnvelope`] for header-level corruption
/// (no partial output), or [`X12Error::Validation`] in strict mode when
/// diagnostics were collected. Per-transaction failures do not error;
/// they appear in [`Document::diagnostics`].
pub fn parse_document<E: ClaimExtractor>(
    text: &str,
    extractor: &E,
    config: &ParserConfig,
) -> X12Result<Document<E::Record>> {
    let tokenizer = SegmentTokenizer::new(text)?;
    let component_separator = tokenizer.delimiters().component;
    let segments = tokenizer.read_all()?;

    let group_version = segments
        .iter()
        .find(|s| s.id() == "GS")
        .and_then(|gs| gs.element(8))
        .map(str::to_string);
    let interchange_control_number = segments
        .iter()
        .find(|s| s.id() == "ISA")
        .and_then(|isa| isa.element(13))
        .map(|v| v.trim().to_string());

    let assembler = LoopAssembler::for_kind(E::KIND);
    let mut transactions = Vec::new();
    let mut records = Vec::new();
    let mut diagnostics = Vec::new();

    for unit in split_transactions(&segments) {
        let control_number = unit.st.element_or_empty(2).to_string();
        let parsed = assembler
            .assemble(
                E::KIND,
                unit.st,
                unit.body,
                unit.se,
                group_version.as_deref(),
                component_separator,
            )
            .and_then(|tx| {
                let tx_records = extractor.extract(&tx)?;
                Ok((tx, tx_records))
            });

        match parsed {
            Ok((tx, tx_records)) => {
                records.extend(tx_records);
                transactions.push(tx);
            }
            Err(e) => {
                warn!(control_number = %control_number, error = %e, "transaction failed");
                diagnostics.push(Diagnostic::TransactionFailed {
                    control_number: if control_number.is_empty() {
                        "?".to_string()
                    } else {
                        control_number
                    },
                    reason: e.to_string(),
                });
            }
        }
    }

    if config.validate_envelope {
        diagnostics.extend(validate_envelope(&segments, &transactions));
    }

    if config.strict && !diagnostics.is_empty() {
        return Err(X12Error::Validation {
            count: diagnostics.len(),
        });
    }

    let version = transactions
        .first()
        .map(|tx| tx.version.clone())
        .or(group_version)
        .unwrap_or_default();

    info!(
        kind = %E::KIND,
        transactions = transactions.len(),
        records = records.len(),
        diagnostics = diagnostics.len(),
        "parsed document"
    );

    Ok(Document {
        kind: E::KIND,
        version,
        interchange_control_number,
        transactions,
        records,
        diagnostics,
    })
}

/// Parses a 277 claim status response document.
pub fn parse_claim_status(text: &str) -> X12Result<Document<StatusRecord>> {
    parse_document(text, &StatusExtractor::new(), &ParserConfig::default())
}

/// Parses a 277CA claim acknowledgment document.
pub fn parse_acknowledgments(text: &str) -> X12Result<Document<AcknowledgmentRecord>> {
    parse_document(
        text,
        &AcknowledgmentExtractor::new(),
        &ParserConfig::default(),
    )
}

/// Parses an 835 payment/remittance document.
pub fn parse_payments(text: &str) -> X12Result<Document<PaymentRecord>> {
    parse_document(text, &PaymentExtractor::new(), &ParserConfig::default())
}

/// Parses independent documents of one family in parallel.
///
/// Each document is a pure single-threaded parse with no shared mutable
/// state, so a batch parallelizes without coordination.
#[cfg(feature = "parallel")]
pub fn parse_batch_parallel<E>(
    texts: &[&str],
    extractor: &E,
    config: &ParserConfig,
) -> Vec<X12Result<Document<E::Record>>>
where
    E: ClaimExtractor + Sync,
    E::Record: Send,
{
    texts
        .par_iter()
        .map(|text| parse_document(text, extractor, config))
        .collect()
}

/// One ST..SE unit within an interchange.
struct TransactionUnit<'a> {
    st: &'a Segment,
    body: &'a [Segment],
    se: Option<&'a Segment>,
}

/// Splits a tokenized interchange into its ST..SE units.
///
/// A transaction missing its SE trailer extends to the next envelope
/// segment; the envelope validator reports the imbalance separately.
fn split_transactions(segments: &[Segment]) -> Vec<TransactionUnit<'_>> {
    let mut units = Vec::new();
    let mut index = 0;

    while index < segments.len() {
        if segments[index].id() != "ST" {
            index += 1;
            continue;
        }

        let st = &segments[index];
        let body_start = index + 1;
        let mut cursor = body_start;
        let mut se = None;

        while cursor < segments.len() {
            match segments[cursor].id() {
                "SE" => {
                    se = Some(&segments[cursor]);
                    break;
                }
                // A new transaction or envelope trailer before SE means
                // the trailer is missing.
                "ST" | "GE" | "IEA" => break,
                _ => cursor += 1,
            }
        }

        units.push(TransactionUnit {
            st,
            body: &segments[body_start..cursor],
            se,
        });

        index = if se.is_some() { cursor + 1 } else { cursor };
    }

    units
}
