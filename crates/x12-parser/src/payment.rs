//! 835 payment/remittance extractor.

use chrono::NaiveDate;
use x12_types::{
    Adjustment, LoopNode, Party, PaymentRecord, Segment, ServiceLine, Transaction, TransactionKind,
};

use crate::extractor::{parse, party_from_n1, party_from_nm1, ClaimExtractor, PartyRole, QualifierRoles};
use crate::types::ExtractionError;

/// Extractor for 835 payment/remittance (005010X221A1) transactions.
///
/// The remittance header (BPR, payer/payee N1 loops) applies to every
/// claim payment in the transaction; each CLP loop yields one
/// [`PaymentRecord`].
#[derive(Debug, Clone)]
pub struct PaymentExtractor {
    roles: QualifierRoles,
}

impl PaymentExtractor {
    /// Creates an extractor with the standard qualifier table.
    pub fn new() -> Self {
        Self {
            roles: QualifierRoles::payment(),
        }
    }

    /// Creates an extractor with a dialect-adjusted qualifier table.
    pub fn with_roles(roles: QualifierRoles) -> Self {
        Self { roles }
    }

    fn header_party(&self, transaction: &Transaction, role: PartyRole) -> Party {
        for n1_loop in transaction.root.find_loops("N1") {
            let Some(n1) = n1_loop.first_segment("N1") else {
                continue;
            };
            if n1.element(1).and_then(|q| self.roles.role_of(q)) == Some(role) {
                return party_from_n1(n1);
            }
        }
        Party::default()
    }
}

impl Default for PaymentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimExtractor for PaymentExtractor {
    type Record = PaymentRecord;

    const KIND: TransactionKind = TransactionKind::Payment;

    fn roles(&self) -> &QualifierRoles {
        &self.roles
    }

    fn extract(&self, transaction: &Transaction) -> Result<Vec<PaymentRecord>, ExtractionError> {
        let payment_date = transaction
            .root
            .first_segment("BPR")
            .and_then(|bpr| bpr.element(16))
            .and_then(parse::date);

        let payer = self.header_party(transaction, PartyRole::Payer);
        if payer.is_empty() {
            return Err(ExtractionError::MissingRole { role: "payer" });
        }
        let payee = self.header_party(transaction, PartyRole::Payee);

        let claim_loops = transaction.root.find_loops("CLP");
        let mut records = Vec::with_capacity(claim_loops.len());
        for claim_loop in claim_loops {
            records.push(self.extract_claim(
                claim_loop,
                &payer,
                &payee,
                payment_date,
                transaction.component_separator,
            )?);
        }
        Ok(records)
    }
}

impl PaymentExtractor {
    fn extract_claim(
        &self,
        claim_loop: &LoopNode,
        payer: &Party,
        payee: &Party,
        payment_date: Option<NaiveDate>,
        component_separator: char,
    ) -> Result<PaymentRecord, ExtractionError> {
        let clp = claim_loop
            .first_segment("CLP")
            .ok_or(ExtractionError::MissingSegment { id: "CLP" })?;

        let mut patient = Party::default();
        for nm1 in claim_loop.segments_with_id("NM1") {
            if nm1.element(1).and_then(|q| self.roles.role_of(q)) == Some(PartyRole::Patient) {
                patient = party_from_nm1(nm1);
                break;
            }
        }
        if patient.is_empty() {
            return Err(ExtractionError::MissingRole { role: "patient" });
        }

        let mut service_dates = None;
        for dtp in claim_loop.segments_with_id("DTP") {
            let Some(qualifier) = dtp.element(1) else {
                continue;
            };
            if self.roles.is_service_date(qualifier) {
                let parsed = dtp.element(3).and_then(parse::date_range);
                service_dates = match (service_dates, parsed) {
                    (None, parsed) => parsed,
                    // 232/233 arrive as separate start/end segments.
                    (Some(range), Some(next)) => Some(x12_types::DateRange {
                        start: range.start.min(next.start),
                        end: range.end.max(next.end),
                    }),
                    (some, None) => some,
                };
            }
        }

        let adjustments: Vec<Adjustment> = claim_loop
            .segments_with_id("CAS")
            .flat_map(adjustments_from_cas)
            .collect();

        let service_lines = claim_loop
            .find_loops("SVC")
            .into_iter()
            .map(|svc_loop| self.extract_service_line(svc_loop, component_separator))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PaymentRecord {
            claim_id: clp.element(1).map(str::to_string),
            status_code: clp.element_or_empty(2).to_string(),
            charge_amount: parse::amount(clp.element_or_empty(3))?,
            paid_amount: parse::amount(clp.element_or_empty(4))?,
            patient_responsibility: parse::amount_opt(clp.element(5)),
            payer_claim_control_number: clp.element(7).map(str::to_string),
            patient,
            payer: payer.clone(),
            payee: payee.clone(),
            adjustments,
            service_lines,
            service_dates,
            payment_date,
        })
    }

    fn extract_service_line(
        &self,
        svc_loop: &LoopNode,
        component_separator: char,
    ) -> Result<ServiceLine, ExtractionError> {
        let svc = svc_loop
            .first_segment("SVC")
            .ok_or(ExtractionError::MissingSegment { id: "SVC" })?;

        Ok(ServiceLine {
            procedure: svc
                .element(1)
                .map(|composite| procedure_code(composite, component_separator)),
            charge_amount: parse::amount(svc.element_or_empty(2))?,
            paid_amount: parse::amount(svc.element_or_empty(3))?,
            units: parse::amount_opt(svc.element(5)),
            adjustments: svc_loop
                .segments_with_id("CAS")
                .flat_map(adjustments_from_cas)
                .collect(),
        })
    }
}

/// Expands one CAS segment into its adjustment triples.
///
/// CAS carries a group code followed by up to six (reason, amount,
/// quantity) triples.
fn adjustments_from_cas(cas: &Segment) -> Vec<Adjustment> {
    let group = cas.element_or_empty(1).to_string();
    let mut adjustments = Vec::new();

    let mut position = 2;
    while position < 2 + 6 * 3 {
        let reason = cas.element(position);
        let amount = parse::amount_opt(cas.element(position + 1));
        if let (Some(reason), Some(amount)) = (reason, amount) {
            adjustments.push(Adjustment {
                group: group.clone(),
                reason: reason.to_string(),
                amount,
            });
        } else if reason.is_none() && amount.is_none() {
            break;
        }
        position += 3;
    }

    adjustments
}

/// Strips the qualifier from an SVC01 composite, leaving the procedure
/// code. Values without a qualifier prefix pass through unchanged.
fn procedure_code(composite: &str, component_separator: char) -> String {
    composite
        .split(component_separator)
        .nth(1)
        .unwrap_or(composite)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::LoopAssembler;
    use x12_types::well_known;

    fn seg(id: &str, elements: &[&str]) -> Segment {
        Segment::new(id, elements.to_vec())
    }

    fn assemble_payment(body: Vec<Segment>) -> Transaction {
        LoopAssembler::for_kind(TransactionKind::Payment)
            .assemble(
                TransactionKind::Payment,
                &seg("ST", &["835", "0001"]),
                &body,
                Some(&seg("SE", &[&(body.len() + 2).to_string(), "0001"])),
                Some("005010X221A1"),
                ':',
            )
            .unwrap()
    }

    fn sample_body() -> Vec<Segment> {
        vec![
            seg(
                "BPR",
                &[
                    "I", "132.00", "C", "CHK", "", "", "", "", "", "", "", "", "", "", "",
                    "20240120",
                ],
            ),
            seg("TRN", &["1", "CHK12345", "1234567890"]),
            seg("N1", &["PR", "ACME HEALTH", "PI", "12345"]),
            seg("N1", &["PE", "CLINIC", "XX", "1234567890"]),
            seg("LX", &["1"]),
            seg(
                "CLP",
                &["CLM001", "1", "226.00", "132.00", "62.00", "MC", "ICN001"],
            ),
            seg("NM1", &["QC", "1", "DOE", "JANE", "", "", "", "MI", "MBR001"]),
            seg("CAS", &["CO", "45", "32.00"]),
            seg("DTP", &["232", "D8", "20240110"]),
            seg("DTP", &["233", "D8", "20240112"]),
            seg("SVC", &["HC:99213", "226.00", "132.00", "", "1"]),
            seg("CAS", &["PR", "1", "62.00"]),
        ]
    }

    #[test]
    fn test_extract_payment_record() {
        let tx = assemble_payment(sample_body());
        let records = PaymentExtractor::new().extract(&tx).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.claim_id.as_deref(), Some("CLM001"));
        assert_eq!(record.status_code, well_known::CLAIM_PROCESSED_PRIMARY);
        assert_eq!(record.charge_amount, 226.0);
        assert_eq!(record.paid_amount, 132.0);
        assert_eq!(record.patient_responsibility, Some(62.0));
        assert_eq!(record.payer_claim_control_number.as_deref(), Some("ICN001"));
        assert_eq!(record.patient.id.as_deref(), Some("MBR001"));
        assert_eq!(record.payer.name.as_deref(), Some("ACME HEALTH"));
        assert_eq!(record.payee.id.as_deref(), Some("1234567890"));
        assert_eq!(
            record.payment_date,
            NaiveDate::from_ymd_opt(2024, 1, 20)
        );

        // Claim-level CAS only; the service-line CAS belongs to the line.
        assert_eq!(record.adjustments.len(), 1);
        assert_eq!(record.adjustments[0].reason, "45");
        assert!(record.amounts_balance());

        let dates = record.service_dates.unwrap();
        assert_eq!(dates.start, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(dates.end, NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());

        assert_eq!(record.service_lines.len(), 1);
        let line = &record.service_lines[0];
        assert_eq!(line.procedure.as_deref(), Some("99213"));
        assert_eq!(line.adjustments[0].group, "PR");
    }

    #[test]
    fn test_cas_repeated_triples() {
        let cas = seg(
            "CAS",
            &["CO", "45", "32.00", "", "97", "10.00", "1"],
        );
        let adjustments = adjustments_from_cas(&cas);
        assert_eq!(adjustments.len(), 2);
        assert_eq!(adjustments[0].reason, "45");
        assert_eq!(adjustments[0].amount, 32.0);
        assert_eq!(adjustments[1].reason, "97");
        assert_eq!(adjustments[1].amount, 10.0);
    }

    #[test]
    fn test_multiple_claims_across_lx_groups() {
        let mut body = sample_body();
        body.push(seg("LX", &["2"]));
        body.push(seg(
            "CLP",
            &["CLM002", "4", "410.00", "0.00", "", "MC", "ICN002"],
        ));
        body.push(seg("NM1", &["QC", "1", "ROE", "JOHN", "", "", "", "MI", "MBR002"]));

        let tx = assemble_payment(body);
        let records = PaymentExtractor::new().extract(&tx).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].status_code, well_known::CLAIM_DENIED);
        assert_eq!(records[1].paid_amount, 0.0);
    }

    #[test]
    fn test_missing_patient_fails() {
        let body: Vec<Segment> = sample_body()
            .into_iter()
            .filter(|s| !(s.id() == "NM1" && s.element(1) == Some("QC")))
            .collect();
        let tx = assemble_payment(body);
        let err = PaymentExtractor::new().extract(&tx).unwrap_err();
        assert_eq!(err, ExtractionError::MissingRole { role: "patient" });
    }
}
