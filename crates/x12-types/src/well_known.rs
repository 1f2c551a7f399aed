//! Well-known X12 codes used across the three claim transaction families.
//!
//! Qualifier-to-role mapping lives in the per-family extractor tables; the
//! constants here are the raw code values those tables and the state
//! machine reference.

/// Transaction set code shared by claim status (005010X212) and claim
/// acknowledgment (005010X214) documents.
pub const SET_CLAIM_STATUS: &str = "277";
/// Transaction set code for payment/remittance documents.
pub const SET_PAYMENT: &str = "835";

/// Implementation version for the 277 claim status response.
pub const VERSION_CLAIM_STATUS: &str = "005010X212";
/// Implementation version for the 277CA claim acknowledgment.
pub const VERSION_ACKNOWLEDGMENT: &str = "005010X214";
/// Implementation version for the 835 payment/remittance.
pub const VERSION_PAYMENT: &str = "005010X221A1";

// ── Entity identifier qualifiers (NM101 / N101) ─────────────────────────

/// Insured or subscriber.
pub const ENTITY_INSURED: &str = "IL";
/// Patient.
pub const ENTITY_PATIENT: &str = "QC";
/// Provider.
pub const ENTITY_PROVIDER: &str = "1P";
/// Billing provider.
pub const ENTITY_BILLING_PROVIDER: &str = "85";
/// Payer.
pub const ENTITY_PAYER: &str = "PR";
/// Payee.
pub const ENTITY_PAYEE: &str = "PE";
/// Submitter.
pub const ENTITY_SUBMITTER: &str = "41";
/// Receiver.
pub const ENTITY_RECEIVER: &str = "40";

// ── Reference identification qualifiers (REF01) ─────────────────────────

/// Payer claim control number.
pub const REF_PAYER_CLAIM_CONTROL: &str = "1K";
/// Patient account number; the provider-side claim identifier.
pub const REF_PATIENT_ACCOUNT: &str = "D9";
/// Member identification number.
pub const REF_MEMBER_ID: &str = "EA";
/// Alternative member identification number.
pub const REF_MEMBER_ID_ALT: &str = "1W";

// ── Date/time qualifiers (DTP01) ────────────────────────────────────────

/// Service period.
pub const DATE_SERVICE_PERIOD: &str = "472";
/// Claim statement period start.
pub const DATE_CLAIM_START: &str = "232";
/// Claim statement period end.
pub const DATE_CLAIM_END: &str = "233";

// ── Claim status category codes (STC01-1) ───────────────────────────────

/// Accepted for processing.
pub const CATEGORY_ACCEPTED: &str = "A1";
/// Accepted, transaction complete.
pub const CATEGORY_ACCEPTED_COMPLETE: &str = "A2";
/// Returned to submitter; not accepted.
pub const CATEGORY_RETURNED: &str = "A3";
/// Not found.
pub const CATEGORY_NOT_FOUND: &str = "A4";
/// Accepted, split claim.
pub const CATEGORY_ACCEPTED_SPLIT: &str = "A5";
/// Rejected, resubmission allowed.
pub const CATEGORY_REJECTED_RESUBMIT: &str = "A6";
/// Rejected at the gateway before adjudication.
pub const CATEGORY_REJECTED: &str = "A7";

// ── Claim payment status codes (CLP02) ──────────────────────────────────

/// Processed as primary.
pub const CLAIM_PROCESSED_PRIMARY: &str = "1";
/// Processed as secondary.
pub const CLAIM_PROCESSED_SECONDARY: &str = "2";
/// Processed as tertiary.
pub const CLAIM_PROCESSED_TERTIARY: &str = "3";
/// Denied.
pub const CLAIM_DENIED: &str = "4";
/// Reversal of a previous payment.
pub const CLAIM_REVERSAL: &str = "22";

// ── Hierarchical level codes (HL03) ─────────────────────────────────────

/// Information source (payer).
pub const LEVEL_INFORMATION_SOURCE: &str = "20";
/// Information receiver (clearinghouse or submitter).
pub const LEVEL_INFORMATION_RECEIVER: &str = "21";
/// Service provider.
pub const LEVEL_PROVIDER: &str = "19";
/// Subscriber; claim detail lives at this level.
pub const LEVEL_SUBSCRIBER: &str = "22";
/// Dependent.
pub const LEVEL_DEPENDENT: &str = "23";
