//! Transaction envelope types.

use crate::{well_known, LoopNode};

/// The three claim transaction families this stack consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransactionKind {
    /// 277 claim status response (005010X212).
    ClaimStatus,
    /// 277CA claim acknowledgment (005010X214).
    Acknowledgment,
    /// 835 payment/remittance (005010X221A1).
    Payment,
}

impl TransactionKind {
    /// Returns the transaction set code (ST01) for this family.
    pub fn set_code(self) -> &'static str {
        match self {
            Self::ClaimStatus | Self::Acknowledgment => well_known::SET_CLAIM_STATUS,
            Self::Payment => well_known::SET_PAYMENT,
        }
    }

    /// Resolves a family from a transaction set code and implementation
    /// version. The 277 set code is shared by the status and acknowledgment
    /// families; the version string disambiguates.
    ///
    /// Returns `None` for set codes outside the three supported families.
    pub fn from_codes(set_code: &str, version: &str) -> Option<Self> {
        match set_code {
            well_known::SET_PAYMENT => Some(Self::Payment),
            well_known::SET_CLAIM_STATUS => {
                if version.contains("X214") {
                    Some(Self::Acknowledgment)
                } else {
                    Some(Self::ClaimStatus)
                }
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ClaimStatus => "claim-status",
            Self::Acknowledgment => "acknowledgment",
            Self::Payment => "payment",
        };
        f.write_str(name)
    }
}

/// One parsed transaction: an ST..SE unit owning its assembled loop tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transaction {
    /// Transaction family.
    pub kind: TransactionKind,
    /// Transaction set control number (ST02).
    pub control_number: String,
    /// Implementation version (ST03, falling back to GS08).
    pub version: String,
    /// Root of the assembled loop tree.
    pub root: LoopNode,
    /// Actual segment count, ST and SE inclusive.
    pub segment_count: usize,
    /// Segment count declared in SE01, when parseable.
    pub declared_segment_count: Option<usize>,
    /// Control number echoed in SE02.
    pub trailer_control_number: Option<String>,
    /// Component separator declared in the interchange header (ISA16);
    /// used to split composite elements such as STC01.
    pub component_separator: char,
}

impl Transaction {
    /// Returns true when SE01 matches the actual segment count.
    ///
    /// Absence of a parseable SE01 counts as a mismatch; the envelope
    /// validator reports the details.
    pub fn segment_count_matches(&self) -> bool {
        self.declared_segment_count == Some(self.segment_count)
    }
}
