//! Envelope validation.
//!
//! Structural checks over a tokenized interchange and its assembled
//! transactions: declared segment counts and control-number pairing across
//! the ISA/IEA, GS/GE, and ST/SE envelope pairs. Validation never halts
//! extraction; findings are returned as a diagnostics list so
//! partially-invalid documents still yield best-effort output.

use x12_types::{Segment, Transaction};

use crate::types::Diagnostic;

/// Validates envelope structure, returning all violations found.
///
/// `segments` is the full tokenized interchange; `transactions` are the
/// assembled ST..SE units (used for the per-transaction segment-count
/// check).
pub fn validate_envelope(segments: &[Segment], transactions: &[Transaction]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    check_transaction_counts(transactions, &mut diagnostics);
    check_pair(segments, "ISA", "IEA", 13, 2, "interchange", &mut diagnostics);
    check_pair(segments, "GS", "GE", 6, 2, "group", &mut diagnostics);
    check_included_counts(segments, &mut diagnostics);

    diagnostics
}

fn check_transaction_counts(transactions: &[Transaction], diagnostics: &mut Vec<Diagnostic>) {
    for tx in transactions {
        if !tx.segment_count_matches() {
            diagnostics.push(Diagnostic::SegmentCountMismatch {
                control_number: tx.control_number.clone(),
                declared: tx.declared_segment_count.unwrap_or(0),
                actual: tx.segment_count,
            });
        }
        if let Some(trailer) = &tx.trailer_control_number {
            if *trailer != tx.control_number {
                diagnostics.push(Diagnostic::ControlNumberMismatch {
                    scope: "transaction",
                    header: tx.control_number.clone(),
                    trailer: trailer.clone(),
                });
            }
        }
    }
}

/// Pairs opening and closing envelope segments in order and compares their
/// control numbers.
fn check_pair(
    segments: &[Segment],
    open_id: &'static str,
    close_id: &'static str,
    open_pos: usize,
    close_pos: usize,
    scope: &'static str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut open_stack: Vec<&Segment> = Vec::new();

    for segment in segments {
        if segment.id() == open_id {
            open_stack.push(segment);
        } else if segment.id() == close_id {
            match open_stack.pop() {
                Some(opener) => {
                    let header = opener.element_or_empty(open_pos);
                    let trailer = segment.element_or_empty(close_pos);
                    if header != trailer {
                        diagnostics.push(Diagnostic::ControlNumberMismatch {
                            scope,
                            header: header.to_string(),
                            trailer: trailer.to_string(),
                        });
                    }
                }
                None => diagnostics.push(Diagnostic::UnmatchedTrailer {
                    id: close_id,
                    scope,
                }),
            }
        }
    }

    for _ in open_stack {
        diagnostics.push(Diagnostic::MissingTrailer {
            id: close_id,
            scope,
        });
    }
}

/// Checks GE01 (transactions per group) and IEA01 (groups per
/// interchange) against actual counts.
fn check_included_counts(segments: &[Segment], diagnostics: &mut Vec<Diagnostic>) {
    let st_count = segments.iter().filter(|s| s.id() == "ST").count();
    let gs_count = segments.iter().filter(|s| s.id() == "GS").count();

    if let Some(ge) = segments.iter().find(|s| s.id() == "GE") {
        if let Some(declared) = ge.element(1).and_then(|v| v.parse::<usize>().ok()) {
            if declared != st_count {
                diagnostics.push(Diagnostic::IncludedCountMismatch {
                    scope: "group",
                    declared,
                    actual: st_count,
                });
            }
        }
    }

    if let Some(iea) = segments.iter().find(|s| s.id() == "IEA") {
        if let Some(declared) = iea.element(1).and_then(|v| v.parse::<usize>().ok()) {
            if declared != gs_count {
                diagnostics.push(Diagnostic::IncludedCountMismatch {
                    scope: "interchange",
                    declared,
                    actual: gs_count,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use x12_types::{LoopNode, TransactionKind};

    fn seg(id: &str, elements: &[&str]) -> Segment {
        Segment::new(id, elements.to_vec())
    }

    fn envelope(isa13: &str, iea02: &str, gs06: &str, ge02: &str) -> Vec<Segment> {
        vec![
            seg(
                "ISA",
                &[
                    "00", "", "00", "", "ZZ", "SUBMITTER", "ZZ", "RECEIVER", "240115", "1200",
                    "^", "00501", isa13, "0", "P", ":",
                ],
            ),
            seg("GS", &["HN", "S", "R", "20240115", "1200", gs06, "X", "005010X212"]),
            seg("ST", &["277", "0001"]),
            seg("SE", &["2", "0001"]),
            seg("GE", &["1", ge02]),
            seg("IEA", &["1", iea02]),
        ]
    }

    fn transaction(declared: Option<usize>, actual: usize) -> Transaction {
        Transaction {
            kind: TransactionKind::ClaimStatus,
            control_number: "0001".to_string(),
            version: "005010X212".to_string(),
            root: LoopNode::root(),
            segment_count: actual,
            declared_segment_count: declared,
            trailer_control_number: Some("0001".to_string()),
            component_separator: ':',
        }
    }

    #[test]
    fn test_clean_envelope_has_no_diagnostics() {
        let segments = envelope("000000001", "000000001", "1", "1");
        let txs = vec![transaction(Some(2), 2)];
        assert!(validate_envelope(&segments, &txs).is_empty());
    }

    #[test]
    fn test_segment_count_mismatch() {
        let segments = envelope("000000001", "000000001", "1", "1");
        let txs = vec![transaction(Some(20), 2)];
        let diagnostics = validate_envelope(&segments, &txs);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::SegmentCountMismatch {
                control_number: "0001".to_string(),
                declared: 20,
                actual: 2,
            }]
        );
    }

    #[test]
    fn test_interchange_control_mismatch() {
        let segments = envelope("000000001", "000000099", "1", "1");
        let diagnostics = validate_envelope(&segments, &[transaction(Some(2), 2)]);
        assert!(diagnostics.contains(&Diagnostic::ControlNumberMismatch {
            scope: "interchange",
            header: "000000001".to_string(),
            trailer: "000000099".to_string(),
        }));
    }

    #[test]
    fn test_group_control_mismatch() {
        let segments = envelope("000000001", "000000001", "1", "7");
        let diagnostics = validate_envelope(&segments, &[transaction(Some(2), 2)]);
        assert!(diagnostics.contains(&Diagnostic::ControlNumberMismatch {
            scope: "group",
            header: "1".to_string(),
            trailer: "7".to_string(),
        }));
    }

    #[test]
    fn test_missing_iea_trailer() {
        let mut segments = envelope("000000001", "000000001", "1", "1");
        segments.retain(|s| s.id() != "IEA");
        let diagnostics = validate_envelope(&segments, &[transaction(Some(2), 2)]);
        assert!(diagnostics.contains(&Diagnostic::MissingTrailer {
            id: "IEA",
            scope: "interchange",
        }));
    }

    #[test]
    fn test_diagnostics_do_not_halt() {
        // Several independent violations are all reported.
        let segments = envelope("000000001", "000000099", "1", "7");
        let diagnostics = validate_envelope(&segments, &[transaction(None, 2)]);
        assert_eq!(diagnostics.len(), 3);
    }
}
