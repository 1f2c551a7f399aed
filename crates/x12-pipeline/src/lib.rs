//! # x12-pipeline
//!
//! Thin adapter between the filesystem and the parsing/reconciliation
//! core: input discovery, transaction-kind detection, and per-document
//! routing. All algorithmic work lives in `x12-parser` and
//! `x12-reconcile`; this crate only feeds them already-materialized text
//! and shapes the results for delivery.

#![warn(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};
use x12_parser::{
    parse_acknowledgments, parse_claim_status, parse_payments, SegmentTokenizer, X12Error,
    X12Result,
};
use x12_reconcile::{ClaimLedger, ClaimObservation};
use x12_types::TransactionKind;

/// File extensions treated as X12 input.
const X12_EXTENSIONS: &[&str] = &["x12", "edi", "txt"];

/// Detects the transaction family of a document from its ST segment and
/// implementation version (GS08/ST03).
///
/// # Errors
/// Returns [`X12Error::MalformedEnvelope`] for a bad header window, or
/// [`X12Error::UnsupportedTransaction`] when the set code is not one of
/// the three supported families.
pub fn detect_transaction_kind(text: &str) -> X12Result<TransactionKind> {
    let mut version = String::new();
    let mut set_code: Option<String> = None;

    for segment in SegmentTokenizer::new(text)? {
        let segment = segment?;
        match segment.id() {
            "GS" => {
                if let Some(gs08) = segment.element(8) {
                    version = gs08.to_string();
                }
            }
            "ST" => {
                set_code = segment.element(1).map(str::to_string);
                if let Some(st03) = segment.element(3) {
                    version = st03.to_string();
                }
                break;
            }
            _ => {}
        }
    }

    let code = set_code.unwrap_or_default();
    TransactionKind::from_codes(&code, &version).ok_or(X12Error::UnsupportedTransaction {
        code,
        version,
    })
}

/// Finds X12 input files directly under a directory, sorted by name.
pub fn discover_x12_files<P: AsRef<Path>>(dir: P) -> X12Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        let path = entry.path();
        let is_x12 = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| X12_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if path.is_file() && is_x12 {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Delivery-ready summary of one processed document.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    /// Source path, when the document came from a file.
    pub path: Option<String>,
    /// Transaction family processed.
    pub kind: TransactionKind,
    /// Implementation version.
    pub version: String,
    /// Transactions parsed successfully.
    pub transaction_count: usize,
    /// Claim records extracted.
    pub record_count: usize,
    /// Records ingested into the ledger.
    pub observed_count: usize,
    /// Records skipped for lacking a complete claim identity or any
    /// usable date.
    pub skipped_records: usize,
    /// Validation diagnostics, rendered.
    pub diagnostics: Vec<String>,
    /// Reconciliation anomalies raised during ingestion, rendered.
    pub anomalies: Vec<String>,
}

/// Parses one document and feeds its records into the ledger.
///
/// `kind` overrides detection when the trigger already knows the family
/// (one entry point per family); pass `None` to detect from the text.
pub fn process_document(
    text: &str,
    kind: Option<TransactionKind>,
    ledger: &ClaimLedger,
) -> X12Result<ProcessedDocument> {
    let kind = match kind {
        Some(kind) => kind,
        None => detect_transaction_kind(text)?,
    };

    let (version, transaction_count, record_count, diagnostics, observations) = match kind {
        TransactionKind::ClaimStatus => {
            let doc = parse_claim_status(text)?;
            let observations: Vec<_> = doc
                .records
                .iter()
                .filter_map(ClaimObservation::from_status)
                .collect();
            (
                doc.version,
                doc.transactions.len(),
                doc.records.len(),
                doc.diagnostics,
                observations,
            )
        }
        TransactionKind::Acknowledgment => {
            let doc = parse_acknowledgments(text)?;
            let observations: Vec<_> = doc
                .records
                .iter()
                .filter_map(ClaimObservation::from_acknowledgment)
                .collect();
            (
                doc.version,
                doc.transactions.len(),
                doc.records.len(),
                doc.diagnostics,
                observations,
            )
        }
        TransactionKind::Payment => {
            let doc = parse_payments(text)?;
            let observations: Vec<_> = doc
                .records
                .iter()
                .filter_map(ClaimObservation::from_payment)
                .collect();
            (
                doc.version,
                doc.transactions.len(),
                doc.records.len(),
                doc.diagnostics,
                observations,
            )
        }
    };

    let observed_count = observations.len();
    let skipped_records = record_count - observed_count;
    if skipped_records > 0 {
        warn!(
            skipped = skipped_records,
            %kind,
            "records without a correlatable identity were not ingested"
        );
    }

    let anomalies = ledger.observe_all(observations);

    Ok(ProcessedDocument {
        path: None,
        kind,
        version,
        transaction_count,
        record_count,
        observed_count,
        skipped_records,
        diagnostics: diagnostics.iter().map(|d| d.to_string()).collect(),
        anomalies: anomalies.iter().map(|a| a.to_string()).collect(),
    })
}

/// Processes every X12 file in a directory.
///
/// A file that fails to parse is logged and skipped; the rest of the
/// batch continues.
pub fn process_directory<P: AsRef<Path>>(
    dir: P,
    ledger: &ClaimLedger,
) -> X12Result<Vec<ProcessedDocument>> {
    let mut processed = Vec::new();

    for path in discover_x12_files(dir)? {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable input file");
                continue;
            }
        };

        match process_document(&text, None, ledger) {
            Ok(mut doc) => {
                doc.path = Some(path.display().to_string());
                info!(
                    path = %path.display(),
                    kind = %doc.kind,
                    records = doc.record_count,
                    "processed document"
                );
                processed.push(doc);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "document failed");
            }
        }
    }

    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn isa() -> String {
        format!(
            "ISA*00*{:10}*00*{:10}*ZZ*{:15}*ZZ*{:15}*240115*1200*^*00501*000000001*0*P*:~",
            "", "", "SUBMITTER", "RECEIVER"
        )
    }

    fn ack_document() -> String {
        format!(
            "{}GS*HN*SENDER*RECEIVER*20240115*1200*1*X*005010X214~\
             ST*277*0001*005010X214~\
             BHT*0085*08*REF123*20240115*1200*TH~\
             HL*1**20*1~\
             NM1*PR*2*ACME HEALTH*****PI*12345~\
             HL*2*1*21*1~\
             HL*3*2*22*0~\
             NM1*IL*1*DOE*JANE****MI*MBR001~\
             TRN*2*CLM001~\
             STC*A7:21*20240115**226.00~\
             REF*D9*CLM001~\
             SE*11*0001~\
             GE*1*1~IEA*1*000000001~",
            isa()
        )
    }

    fn payment_document() -> String {
        format!(
            "{}GS*HP*SENDER*RECEIVER*20240120*1200*1*X*005010X221A1~\
             ST*835*0001~\
             BPR*I*132.00*C*CHK************20240120~\
             TRN*1*CHK12345*1234567890~\
             N1*PR*ACME HEALTH*PI*12345~\
             N1*PE*CLINIC*XX*1234567890~\
             LX*1~\
             CLP*CLM001*1*226.00*132.00*62.00*MC*ICN001~\
             NM1*QC*1*DOE*JANE****MI*MBR001~\
             CAS*CO*45*32.00~\
             SE*10*0001~\
             GE*1*1~IEA*1*000000001~",
            isa()
        )
    }

    #[test]
    fn test_detect_kind() {
        assert_eq!(
            detect_transaction_kind(&ack_document()).unwrap(),
            TransactionKind::Acknowledgment
        );
        assert_eq!(
            detect_transaction_kind(&payment_document()).unwrap(),
            TransactionKind::Payment
        );
    }

    #[test]
    fn test_detect_rejects_unsupported_set() {
        let text = format!(
            "{}GS*HC*S*R*20240115*1200*1*X*005010X222~ST*837*0001~SE*2*0001~GE*1*1~IEA*1*000000001~",
            isa()
        );
        let err = detect_transaction_kind(&text).unwrap_err();
        assert!(matches!(
            err,
            X12Error::UnsupportedTransaction { ref code, .. } if code == "837"
        ));
    }

    #[test]
    fn test_process_document_feeds_ledger() {
        let ledger = ClaimLedger::with_defaults();

        let ack = process_document(&ack_document(), None, &ledger).unwrap();
        assert_eq!(ack.record_count, 1);
        assert_eq!(ack.observed_count, 1);
        assert_eq!(ack.skipped_records, 0);

        let payment = process_document(&payment_document(), None, &ledger).unwrap();
        assert_eq!(payment.observed_count, 1);

        assert_eq!(ledger.claim_count(), 1);
    }
}
