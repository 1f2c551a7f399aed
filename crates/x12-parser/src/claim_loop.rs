//! Shared claim-loop walk for the hierarchical 277 families.
//!
//! The claim status and acknowledgment transaction sets share the same
//! loop grammar: entity context (payer, provider) accumulates down the
//! HL tree, and claim detail (TRN, STC, REF, DTP, MSG) lives in
//! subscriber/dependent loops. Both extractors collect the same raw
//! per-claim data and shape it into their own record types.

use chrono::NaiveDate;
use x12_types::{well_known, DateRange, LoopNode, Party, StatusCode, Transaction};

use crate::extractor::{parse, party_from_nm1, PartyRole, QualifierRoles};
use crate::types::ExtractionError;

/// Levels whose loops carry claim detail.
const CLAIM_LEVELS: &[&str] = &[well_known::LEVEL_SUBSCRIBER, well_known::LEVEL_DEPENDENT];

/// Raw data collected from one claim loop and its inherited context.
#[derive(Debug, Clone, Default)]
pub(crate) struct ClaimLoopData {
    pub trace_number: Option<String>,
    pub claim_id: Option<String>,
    pub patient: Party,
    pub provider: Party,
    pub payer: Party,
    pub statuses: Vec<StatusCode>,
    pub status_date: Option<NaiveDate>,
    pub billed_amount: Option<f64>,
    pub service_dates: Option<DateRange>,
    pub payer_claim_control_number: Option<String>,
    pub messages: Vec<String>,
    pub transaction_date: Option<NaiveDate>,
}

/// Inherited entity context accumulated while descending the tree.
#[derive(Debug, Clone, Default)]
struct EntityContext {
    patient: Party,
    provider: Party,
    payer: Party,
}

/// Collects claim data from every subscriber/dependent loop that reports
/// claim detail.
///
/// # Errors
/// Returns [`ExtractionError::MissingRole`] when a claim loop resolves no
/// patient or no payer through the qualifier table.
pub(crate) fn collect_claims(
    transaction: &Transaction,
    roles: &QualifierRoles,
) -> Result<Vec<ClaimLoopData>, ExtractionError> {
    let transaction_date = transaction
        .root
        .first_segment("BHT")
        .and_then(|bht| bht.element(4))
        .and_then(parse::date);

    let mut claims = Vec::new();
    walk(
        &transaction.root,
        &EntityContext::default(),
        roles,
        transaction.component_separator,
        transaction_date,
        &mut claims,
    )?;
    Ok(claims)
}

fn walk(
    node: &LoopNode,
    inherited: &EntityContext,
    roles: &QualifierRoles,
    component_separator: char,
    transaction_date: Option<NaiveDate>,
    claims: &mut Vec<ClaimLoopData>,
) -> Result<(), ExtractionError> {
    let mut context = inherited.clone();
    for nm1 in node.segments_with_id("NM1") {
        let Some(role) = nm1.element(1).and_then(|q| roles.role_of(q)) else {
            continue;
        };
        let party = party_from_nm1(nm1);
        match role {
            PartyRole::Patient => context.patient = party,
            PartyRole::Provider => context.provider = party,
            PartyRole::Payer => context.payer = party,
            PartyRole::Payee => {}
        }
    }

    if CLAIM_LEVELS.contains(&node.level()) && has_claim_detail(node) {
        claims.push(build_claim(
            node,
            &context,
            roles,
            component_separator,
            transaction_date,
        )?);
    }

    for child in node.loops() {
        walk(
            child,
            &context,
            roles,
            component_separator,
            transaction_date,
            claims,
        )?;
    }
    Ok(())
}

fn has_claim_detail(node: &LoopNode) -> bool {
    node.first_segment("STC").is_some() || node.first_segment("TRN").is_some()
}

fn build_claim(
    node: &LoopNode,
    context: &EntityContext,
    roles: &QualifierRoles,
    component_separator: char,
    transaction_date: Option<NaiveDate>,
) -> Result<ClaimLoopData, ExtractionError> {
    if context.patient.is_empty() {
        return Err(ExtractionError::MissingRole { role: "patient" });
    }
    if context.payer.is_empty() {
        return Err(ExtractionError::MissingRole { role: "payer" });
    }

    let mut claim = ClaimLoopData {
        patient: context.patient.clone(),
        provider: context.provider.clone(),
        payer: context.payer.clone(),
        transaction_date,
        ..ClaimLoopData::default()
    };

    for segment in node.segments() {
        match segment.id() {
            "TRN" => {
                claim.trace_number = segment.element(2).map(str::to_string);
            }
            "STC" => {
                if let Some(composite) = segment.element(1) {
                    claim
                        .statuses
                        .push(StatusCode::from_composite(composite, component_separator));
                }
                if claim.status_date.is_none() {
                    claim.status_date = segment.element(2).and_then(parse::date);
                }
                // STC04 is the total claim charge amount.
                if claim.billed_amount.is_none() {
                    claim.billed_amount = parse::amount_opt(segment.element(4));
                }
            }
            "REF" => {
                let Some(qualifier) = segment.element(1) else {
                    continue;
                };
                let value = segment.element(2).map(str::to_string);
                if roles.is_claim_reference(qualifier) {
                    claim.claim_id = value;
                } else if roles.is_control_reference(qualifier) {
                    claim.payer_claim_control_number = value;
                } else if roles.is_member_reference(qualifier) && claim.patient.id.is_none() {
                    claim.patient.id = value;
                }
            }
            "DTP" => {
                let Some(qualifier) = segment.element(1) else {
                    continue;
                };
                if roles.is_service_date(qualifier) && claim.service_dates.is_none() {
                    claim.service_dates = segment.element(3).and_then(parse::date_range);
                }
            }
            "MSG" => {
                if let Some(text) = segment.element(1) {
                    claim.messages.push(text.to_string());
                }
            }
            _ => {}
        }
    }

    Ok(claim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use x12_types::{LoopTag, Segment, TransactionKind};

    fn seg(id: &str, elements: &[&str]) -> Segment {
        Segment::new(id, elements.to_vec())
    }

    fn sample_transaction() -> Transaction {
        let mut root = LoopNode::root();
        root.push_segment(seg("BHT", &["0010", "08", "REF123", "20240115"]));

        let mut source = LoopNode::new("20", LoopTag::Known);
        source.push_segment(seg("HL", &["1", "", "20", "1"]));
        source.push_segment(seg(
            "NM1",
            &["PR", "2", "ACME HEALTH", "", "", "", "", "PI", "12345"],
        ));

        let mut receiver = LoopNode::new("21", LoopTag::Known);
        receiver.push_segment(seg("HL", &["2", "1", "21", "1"]));

        let mut claim = LoopNode::new("22", LoopTag::Known);
        claim.push_segment(seg("HL", &["3", "2", "22", "0"]));
        claim.push_segment(seg(
            "NM1",
            &["IL", "1", "DOE", "JANE", "", "", "", "MI", "MBR001"],
        ));
        claim.push_segment(seg("TRN", &["2", "TRACE001"]));
        claim.push_segment(seg("STC", &["A7:21", "20240115", "", "226.00"]));
        claim.push_segment(seg("REF", &["D9", "CLM001"]));
        claim.push_segment(seg("DTP", &["472", "D8", "20240110"]));
        claim.push_segment(seg("MSG", &["MISSING SUBSCRIBER ID"]));

        receiver.push_loop(claim);
        source.push_loop(receiver);
        root.push_loop(source);

        Transaction {
            kind: TransactionKind::Acknowledgment,
            control_number: "0001".to_string(),
            version: "005010X214".to_string(),
            root,
            segment_count: 12,
            declared_segment_count: Some(12),
            trailer_control_number: Some("0001".to_string()),
            component_separator: ':',
        }
    }

    #[test]
    fn test_collect_claims() {
        let tx = sample_transaction();
        let claims = collect_claims(&tx, &QualifierRoles::acknowledgment()).unwrap();
        assert_eq!(claims.len(), 1);

        let claim = &claims[0];
        assert_eq!(claim.trace_number.as_deref(), Some("TRACE001"));
        assert_eq!(claim.claim_id.as_deref(), Some("CLM001"));
        assert_eq!(claim.patient.id.as_deref(), Some("MBR001"));
        assert_eq!(claim.payer.id.as_deref(), Some("12345"));
        assert_eq!(claim.billed_amount, Some(226.0));
        assert_eq!(claim.statuses[0].category(), "A7");
        assert_eq!(claim.messages, vec!["MISSING SUBSCRIBER ID"]);
        assert_eq!(
            claim.transaction_date,
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
        assert_eq!(
            claim.service_dates.unwrap().start,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
        );
    }

    #[test]
    fn test_missing_patient_fails() {
        let mut tx = sample_transaction();
        // Strip the patient NM1 out of the claim loop.
        let rebuilt = strip_nm1(&tx.root, "IL");
        tx.root = rebuilt;

        let err = collect_claims(&tx, &QualifierRoles::acknowledgment()).unwrap_err();
        assert_eq!(err, ExtractionError::MissingRole { role: "patient" });
    }

    fn strip_nm1(node: &LoopNode, qualifier: &str) -> LoopNode {
        let mut out = if node.is_root() {
            LoopNode::root()
        } else {
            LoopNode::new(node.level(), node.tag())
        };
        for segment in node.segments() {
            if segment.id() == "NM1" && segment.element(1) == Some(qualifier) {
                continue;
            }
            out.push_segment(segment.clone());
        }
        for child in node.loops() {
            out.push_loop(strip_nm1(child, qualifier));
        }
        out
    }
}
