//! 277 claim status extractor.

use x12_types::{StatusRecord, Transaction, TransactionKind};

use crate::claim_loop::collect_claims;
use crate::extractor::{ClaimExtractor, QualifierRoles};
use crate::types::ExtractionError;

/// Extractor for 277 claim status response (005010X212) transactions.
///
/// Each subscriber or dependent loop reporting claim detail yields one
/// [`StatusRecord`]; payer and provider identities are inherited from the
/// enclosing information-source and provider loops.
#[derive(Debug, Clone)]
pub struct StatusExtractor {
    roles: QualifierRoles,
}

impl StatusExtractor {
    /// Creates an extractor with the standard qualifier table.
    pub fn new() -> Self {
        Self {
            roles: QualifierRoles::claim_status(),
        }
    }

    /// Creates an extractor with a dialect-adjusted qualifier table.
    pub fn with_roles(roles: QualifierRoles) -> Self {
        Self { roles }
    }
}

impl Default for StatusExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimExtractor for StatusExtractor {
    type Record = StatusRecord;

    const KIND: TransactionKind = TransactionKind::ClaimStatus;

    fn roles(&self) -> &QualifierRoles {
        &self.roles
    }

    fn extract(&self, transaction: &Transaction) -> Result<Vec<StatusRecord>, ExtractionError> {
        let claims = collect_claims(transaction, &self.roles)?;
        Ok(claims
            .into_iter()
            .map(|claim| StatusRecord {
                trace_number: claim.trace_number,
                claim_id: claim.claim_id,
                patient: claim.patient,
                provider: claim.provider,
                payer: claim.payer,
                statuses: claim.statuses,
                status_date: claim.status_date,
                billed_amount: claim.billed_amount,
                service_dates: claim.service_dates,
                payer_claim_control_number: claim.payer_claim_control_number,
                transaction_date: claim.transaction_date,
            })
            .collect())
    }
}
