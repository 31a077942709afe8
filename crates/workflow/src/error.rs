//! Error types for workflow operations.

use thiserror::Error;
use ticket_core::{Role, StoreError, ValidationError};

/// Errors that can occur during workflow operations.
///
/// Every variant is local to one request; nothing here is fatal to the
/// process. Dependency failures (mail, generation backend) are not errors at
/// this layer at all: they degrade to reports.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Malformed or missing required input.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A referenced id does not resolve to an entity.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Operation requested in a status that forbids it.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The target user lacks the required role.
    #[error("user {user_id} has role {actual}, operation requires {required}")]
    InvalidRole {
        user_id: String,
        required: Role,
        actual: Role,
    },

    /// Store backend failure.
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for WorkflowError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { entity, id } => WorkflowError::NotFound { entity, id },
            other => WorkflowError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_workflow_not_found() {
        let err: WorkflowError = StoreError::NotFound {
            entity: "Ticket",
            id: "TKT-999".to_string(),
        }
        .into();
        assert!(matches!(err, WorkflowError::NotFound { entity: "Ticket", .. }));
    }

    #[test]
    fn test_backend_error_stays_store() {
        let err: WorkflowError = StoreError::Backend("disk on fire".to_string()).into();
        assert!(matches!(err, WorkflowError::Store(_)));
    }

    #[test]
    fn test_invalid_role_display() {
        let err = WorkflowError::InvalidRole {
            user_id: "user-1".to_string(),
            required: Role::Agent,
            actual: Role::User,
        };
        assert_eq!(
            err.to_string(),
            "user user-1 has role user, operation requires agent"
        );
    }
}
