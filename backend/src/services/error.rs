//! Errors surfaced to clients as top-level GraphQL errors.
//!
//! Per-field validation problems are not errors: they travel back in the
//! mutation payload as strings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrmError {
    #[error("Input list cannot be empty.")]
    EmptyInput,

    /// All filter problems, already joined into one message
    #[error("{0}")]
    InvalidFilter(String),

    #[error("Cannot resolve keyword '{0}' into field.")]
    InvalidOrdering(String),

    #[error("Invalid cursor")]
    InvalidCursor,

    #[error("{0}")]
    InvalidPagination(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type CrmResult<T> = Result<T, CrmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(CrmError::EmptyInput.to_string(), "Input list cannot be empty.");
        assert_eq!(
            CrmError::InvalidOrdering("colour".to_string()).to_string(),
            "Cannot resolve keyword 'colour' into field."
        );
        assert_eq!(
            CrmError::InvalidFilter("phone_pattern: bad".to_string()).to_string(),
            "phone_pattern: bad"
        );
    }

    #[test]
    fn test_converts_into_graphql_error() {
        let err: async_graphql::Error = CrmError::EmptyInput.into();
        assert_eq!(err.message, "Input list cannot be empty.");
    }
}
