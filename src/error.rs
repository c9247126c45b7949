use crate::model::SlotStatus;
use thiserror::Error;

/// Failures reported by store commands. None of them leave partial state behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// A required field is missing or malformed
    #[error("{message}")]
    Validation { field: String, message: String },
    /// The slot cannot take a new reservation
    #[error("slot {slot_id} is not available ({reason})")]
    SlotUnavailable {
        slot_id: String,
        status: Option<SlotStatus>,
        reason: String,
    },
    /// The referenced id is no longer present
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
}

impl StoreError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// NotFound is a benign no-op for the callers in this program
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::SlotUnavailable { .. } => "slot_unavailable",
            Self::NotFound { .. } => "not_found",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = StoreError::SlotUnavailable {
            slot_id: "3".to_string(),
            status: Some(SlotStatus::Occupied),
            reason: "occupied".to_string(),
        };
        assert_eq!(err.to_string(), "slot 3 is not available (occupied)");
        assert_eq!(
            StoreError::not_found("reservation", "42").to_string(),
            "reservation 42 not found"
        );
    }

    #[test]
    fn test_benign() {
        assert!(StoreError::not_found("slot", "9").is_benign());
        assert!(!StoreError::validation("name", "Please fill in all fields").is_benign());
    }
}
