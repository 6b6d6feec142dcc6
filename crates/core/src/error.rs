use crate::types::EntityId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The seeker's spendable balance does not cover the requested debit.
    #[error("Insufficient balance: seeker {seeker_id} has {available} stars, needs {required}")]
    InsufficientBalance {
        seeker_id: EntityId,
        required: i64,
        available: i64,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`] keyed by a UUID.
    pub fn not_found(entity: &'static str, id: EntityId) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
