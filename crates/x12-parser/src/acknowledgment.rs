//! 277CA claim acknowledgment extractor.
//!
//! The 277CA is the front-door report: it identifies claims rejected
//! before adjudication. A rejected claim will never appear in an 835
//! remittance until corrected and resubmitted, which is what makes these
//! records the anchor of revenue-risk reconciliation.

use x12_types::{AcknowledgmentRecord, Transaction, TransactionKind};

use crate::claim_loop::collect_claims;
use crate::extractor::{ClaimExtractor, QualifierRoles};
use crate::types::ExtractionError;

/// Extractor for 277CA claim acknowledgment (005010X214) transactions.
#[derive(Debug, Clone)]
pub struct AcknowledgmentExtractor {
    roles: QualifierRoles,
}

impl AcknowledgmentExtractor {
    /// Creates an extractor with the standard qualifier table.
    pub fn new() -> Self {
        Self {
            roles: QualifierRoles::acknowledgment(),
        }
    }

    /// Creates an extractor with a dialect-adjusted qualifier table.
    pub fn with_roles(roles: QualifierRoles) -> Self {
        Self { roles }
    }
}

impl Default for AcknowledgmentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimExtractor for AcknowledgmentExtractor {
    type Record = AcknowledgmentRecord;

    const KIND: TransactionKind = TransactionKind::Acknowledgment;

    fn roles(&self) -> &QualifierRoles {
        &self.roles
    }

    fn extract(
        &self,
        transaction: &Transaction,
    ) -> Result<Vec<AcknowledgmentRecord>, ExtractionError> {
        let claims = collect_claims(transaction, &self.roles)?;
        Ok(claims
            .into_iter()
            .map(|claim| AcknowledgmentRecord {
                trace_number: claim.trace_number,
                claim_id: claim.claim_id,
                patient: claim.patient,
                provider: claim.provider,
                payer: claim.payer,
                statuses: claim.statuses,
                status_date: claim.status_date,
                billed_amount: claim.billed_amount,
                service_dates: claim.service_dates,
                rejection_reason: if claim.messages.is_empty() {
                    None
                } else {
                    Some(claim.messages.join(" "))
                },
                payer_claim_control_number: claim.payer_claim_control_number,
                transaction_date: claim.transaction_date,
            })
            .collect())
    }
}

/// Rollup statistics over one document's acknowledgments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AckSummary {
    /// Acknowledgments seen.
    pub total: usize,
    /// Acknowledgments with an accepting status category.
    pub accepted: usize,
    /// Acknowledgments with a rejecting status category.
    pub rejected: usize,
}

impl AckSummary {
    /// Fraction of acknowledgments rejected, in `[0, 1]`.
    pub fn rejection_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.rejected as f64 / self.total as f64
        }
    }
}

/// Summarizes a set of acknowledgment records.
pub fn summarize(records: &[AcknowledgmentRecord]) -> AckSummary {
    AckSummary {
        total: records.len(),
        accepted: records.iter().filter(|r| r.is_accepted()).count(),
        rejected: records.iter().filter(|r| r.is_rejected()).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::LoopAssembler;
    use x12_types::Segment;

    fn seg(id: &str, elements: &[&str]) -> Segment {
        Segment::new(id, elements.to_vec())
    }

    fn claim_loop(hl_id: &str, member: &str, claim: &str, status: &str, amount: &str) -> Vec<Segment> {
        vec![
            seg("HL", &[hl_id, "2", "22", "0"]),
            seg("NM1", &["IL", "1", "DOE", "JANE", "", "", "", "MI", member]),
            seg("TRN", &["2", claim]),
            seg("STC", &[status, "20240115", "", amount]),
            seg("REF", &["D9", claim]),
        ]
    }

    fn assemble_ack(body: Vec<Segment>) -> Transaction {
        LoopAssembler::for_kind(TransactionKind::Acknowledgment)
            .assemble(
                TransactionKind::Acknowledgment,
                &seg("ST", &["277", "0001", "005010X214"]),
                &body,
                Some(&seg("SE", &[&(body.len() + 2).to_string(), "0001"])),
                None,
                ':',
            )
            .unwrap()
    }

    fn sample_transaction() -> Transaction {
        let mut body = vec![
            seg("BHT", &["0085", "08", "REF123", "20240115", "1200", "TH"]),
            seg("HL", &["1", "", "20", "1"]),
            seg("NM1", &["PR", "2", "ACME HEALTH", "", "", "", "", "PI", "12345"]),
            seg("HL", &["2", "1", "21", "1"]),
        ];
        body.extend(claim_loop("3", "MBR001", "CLM001", "A7:21", "226.00"));
        body.push(seg("MSG", &["MISSING SUBSCRIBER ID"]));
        body.extend(claim_loop("4", "MBR002", "CLM002", "A7:33", "410.00"));
        body.extend(claim_loop("5", "MBR003", "CLM003", "A7:21", "98.50"));
        body.extend(claim_loop("6", "MBR004", "CLM004", "A1:20", "610.00"));
        assemble_ack(body)
    }

    #[test]
    fn test_extract_acknowledgments() {
        let records = AcknowledgmentExtractor::new()
            .extract(&sample_transaction())
            .unwrap();
        assert_eq!(records.len(), 4);

        let first = &records[0];
        assert!(first.is_rejected());
        assert_eq!(first.billed_amount, Some(226.0));
        assert_eq!(
            first.rejection_reason.as_deref(),
            Some("MISSING SUBSCRIBER ID")
        );

        let last = &records[3];
        assert!(last.is_accepted());
        assert_eq!(last.claim_id.as_deref(), Some("CLM004"));
    }

    #[test]
    fn test_summary_rejection_rate() {
        let records = AcknowledgmentExtractor::new()
            .extract(&sample_transaction())
            .unwrap();
        let summary = summarize(&records);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.rejected, 3);
        assert_eq!(summary.accepted, 1);
        assert!((summary.rejection_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(summarize(&[]).rejection_rate(), 0.0);
    }
}
