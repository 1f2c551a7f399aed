//! Claim status codes.
//!
//! Status and category codes are an open set: the standard body issues new
//! codes over time and trading partners add their own, so codes are carried
//! as raw strings rather than a closed enumeration. Helpers classify the
//! handful of categories the reconciliation engine cares about; everything
//! else round-trips untouched.

use crate::well_known;

/// A health-care claim status from an STC composite element.
///
/// The STC01 composite has the form `category:code[:entity]`, e.g. `A7:21`
/// for a gateway rejection with reason 21.
///
/// # Examples
///
/// ```
/// use x12_types::StatusCode;
///
/// let status = StatusCode::from_composite("A7:21", ':');
/// assert_eq!(status.category(), "A7");
/// assert_eq!(status.code(), "21");
/// assert!(status.indicates_rejection());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusCode {
    category: String,
    code: String,
    entity: Option<String>,
}

impl StatusCode {
    /// Creates a status code from its parts.
    pub fn new<S: Into<String>>(category: S, code: S) -> Self {
        Self {
            category: category.into(),
            code: code.into(),
            entity: None,
        }
    }

    /// Parses a status code from an STC composite value using the component
    /// separator declared in the document's envelope.
    pub fn from_composite(value: &str, component_separator: char) -> Self {
        let mut parts = value.split(component_separator);
        Self {
            category: parts.next().unwrap_or("").to_string(),
            code: parts.next().unwrap_or("").to_string(),
            entity: parts.next().filter(|p| !p.is_empty()).map(str::to_string),
        }
    }

    /// Returns the status category code (e.g. `A1`, `A7`, `F1`).
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the status code within the category.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the entity identifier component, when present.
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// Returns true for categories that acknowledge the claim was accepted
    /// into processing.
    pub fn indicates_acceptance(&self) -> bool {
        matches!(
            self.category.as_str(),
            well_known::CATEGORY_ACCEPTED
                | well_known::CATEGORY_ACCEPTED_COMPLETE
                | well_known::CATEGORY_ACCEPTED_SPLIT
        ) || self.is_finalized()
    }

    /// Returns true for categories that reject the claim before
    /// adjudication.
    pub fn indicates_rejection(&self) -> bool {
        matches!(
            self.category.as_str(),
            well_known::CATEGORY_RETURNED
                | well_known::CATEGORY_REJECTED_RESUBMIT
                | well_known::CATEGORY_REJECTED
        )
    }

    /// Returns true for finalized categories (`F0`, `F1`, ...).
    pub fn is_finalized(&self) -> bool {
        self.category.starts_with('F')
    }

    /// Returns true for pending categories (`P0`, `P1`, ...).
    pub fn is_pending(&self) -> bool {
        self.category.starts_with('P')
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.entity {
            Some(entity) => write!(f, "{}:{}:{}", self.category, self.code, entity),
            None => write!(f, "{}:{}", self.category, self.code),
        }
    }
}
