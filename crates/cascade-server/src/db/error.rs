//! Store error types

use thiserror::Error;

/// Errors from workflow document storage
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document stored under the given id
    #[error("workflow not found: {0}")]
    NotFound(String),

    /// Documents must carry a top-level `workflow` key
    #[error("document must contain a 'workflow' field")]
    MissingWorkflowField,

    /// The stored or incoming document is not valid JSON
    #[error("invalid workflow document: {0}")]
    InvalidDocument(#[from] serde_json::Error),

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Whether this error should surface as HTTP 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_detection() {
        assert!(StoreError::NotFound("w1".to_string()).is_not_found());
        assert!(!StoreError::MissingWorkflowField.is_not_found());
    }

    #[test]
    fn display_messages() {
        let err = StoreError::NotFound("w1".to_string());
        assert!(err.to_string().contains("workflow not found"));
        assert!(StoreError::MissingWorkflowField
            .to_string()
            .contains("'workflow' field"));
    }
}
