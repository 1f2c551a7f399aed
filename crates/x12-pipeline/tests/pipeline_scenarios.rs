//! End-to-end scenarios: raw X12 text through parsing, ledger ingestion,
//! and aggregate reporting.

use chrono::NaiveDate;
use x12_pipeline::process_document;
use x12_reconcile::{ClaimLedger, ReconciliationAnomaly};
use x12_types::{AckOutcome, ClaimIdentity, ClaimState, TransactionKind};

fn isa() -> String {
    format!(
        "ISA*00*{:10}*00*{:10}*ZZ*{:15}*ZZ*{:15}*240115*1200*^*00501*000000001*0*P*:~",
        "", "", "SUBMITTER", "RECEIVER"
    )
}

fn wrap(version: &str, functional_code: &str, transaction: &str) -> String {
    format!(
        "{}GS*{functional_code}*SENDER*RECEIVER*20240115*1200*1*X*{version}~{transaction}GE*1*1~IEA*1*000000001~",
        isa()
    )
}

/// Builds a 277CA with one claim loop per (claim id, status, billed) row.
fn ack_document(claims: &[(&str, &str, &str)]) -> String {
    let mut tx = String::from(
        "ST*277*0001*005010X214~\
         BHT*0085*08*REF123*20240115*1200*TH~\
         HL*1**20*1~\
         NM1*PR*2*ACME HEALTH*****PI*12345~\
         HL*2*1*21*1~",
    );
    let mut segments = 6; // ST..HL*2 plus SE
    for (index, (claim, status, billed)) in claims.iter().enumerate() {
        tx.push_str(&format!(
            "HL*{id}*2*22*0~\
             NM1*IL*1*DOE*JANE****MI*MBR-{claim}~\
             TRN*2*{claim}~\
             STC*{status}*20240115**{billed}~\
             REF*D9*{claim}~",
            id = index + 3
        ));
        segments += 5;
    }
    tx.push_str(&format!("SE*{segments}*0001~"));
    wrap("005010X214", "HN", &tx)
}

fn payment_document(claim: &str, status: &str, charge: &str, paid: &str, adjustments: &str) -> String {
    let tx = format!(
        "ST*835*0001~\
         BPR*I*{paid}*C*CHK************20240220~\
         TRN*1*CHK12345*1234567890~\
         N1*PR*ACME HEALTH*PI*12345~\
         N1*PE*CLINIC*XX*1234567890~\
         LX*1~\
         CLP*{claim}*{status}*{charge}*{paid}**MC*ICN001~\
         NM1*QC*1*DOE*JANE****MI*MBR-{claim}~\
         {adjustments}\
         SE*{count}*0001~",
        count = 9 + adjustments.matches('~').count()
    );
    wrap("005010X221A1", "HP", &tx)
}

fn identity(claim: &str) -> ClaimIdentity {
    ClaimIdentity {
        claim_id: claim.to_string(),
        patient_id: format!("MBR-{claim}"),
        payer_id: "12345".to_string(),
    }
}

#[test]
fn rejection_rate_and_revenue_at_risk_roll_up_from_raw_text() {
    let ledger = ClaimLedger::with_defaults();
    let doc = ack_document(&[
        ("CLM001", "A7:21", "226.00"),
        ("CLM002", "A7:33", "410.00"),
        ("CLM003", "A7:21", "98.50"),
        ("CLM004", "A1:20", "610.00"),
    ]);

    let processed = process_document(&doc, Some(TransactionKind::Acknowledgment), &ledger).unwrap();
    assert_eq!(processed.record_count, 4);
    assert_eq!(processed.observed_count, 4);
    assert!(processed.diagnostics.is_empty());

    let report = ledger.report(NaiveDate::from_ymd_opt(2024, 1, 20).unwrap());
    assert!((report.rejection_rate - 0.75).abs() < f64::EPSILON);
    assert!((report.revenue_at_risk - (226.0 + 410.0 + 98.5)).abs() < 0.005);
    assert_eq!(report.alerts.len(), 3);
}

#[test]
fn imbalanced_payment_is_flagged_but_state_still_advances() {
    let ledger = ClaimLedger::with_defaults();

    // Charge 226.00, paid 132.00, adjustments 32,259.00: wildly out of
    // balance, but the claim still settles per its status code.
    let doc = payment_document("CLM001", "1", "226.00", "132.00", "CAS*CO*45*32259.00~");
    let processed = process_document(&doc, None, &ledger).unwrap();

    assert_eq!(processed.observed_count, 1);
    assert_eq!(processed.anomalies.len(), 1);
    assert!(processed.anomalies[0].contains("32259.00"));
    assert_eq!(
        ledger.state_of(&identity("CLM001")),
        Some(ClaimState::PartiallyPaid)
    );

    let report = ledger.report(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    assert!(matches!(
        report.anomalies.as_slice(),
        [ReconciliationAnomaly::AmountImbalance { .. }]
    ));
}

#[test]
fn stale_rejection_after_payment_never_regresses_state() {
    let ledger = ClaimLedger::with_defaults();

    let paid = payment_document("CLM001", "1", "226.00", "226.00", "");
    process_document(&paid, None, &ledger).unwrap();
    assert_eq!(
        ledger.state_of(&identity("CLM001")),
        Some(ClaimState::Paid)
    );

    // The acknowledgment is dated 20240115, before the 20240220 payment.
    let late_rejection = ack_document(&[("CLM001", "A7:21", "226.00")]);
    process_document(&late_rejection, None, &ledger).unwrap();

    assert_eq!(
        ledger.state_of(&identity("CLM001")),
        Some(ClaimState::Paid)
    );

    let report = ledger.report(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    assert_eq!(report.revenue_at_risk, 0.0);
    assert!(report
        .anomalies
        .iter()
        .any(|a| matches!(a, ReconciliationAnomaly::OutOfOrder { .. })));
}

#[test]
fn rejected_then_paid_claim_counts_as_resubmitted() {
    let ledger = ClaimLedger::with_defaults();

    process_document(
        &ack_document(&[("CLM001", "A7:21", "226.00")]),
        None,
        &ledger,
    )
    .unwrap();
    assert_eq!(
        ledger.state_of(&identity("CLM001")),
        Some(ClaimState::Acknowledged(AckOutcome::Rejected))
    );

    process_document(
        &payment_document("CLM001", "1", "226.00", "226.00", ""),
        None,
        &ledger,
    )
    .unwrap();

    let report = ledger.report(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    assert_eq!(report.resubmitted_claims, 1);
    assert_eq!(report.revenue_at_risk, 0.0);
    assert!(report.alerts.is_empty());
}
