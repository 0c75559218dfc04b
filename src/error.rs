use thiserror::Error;

use crate::query::types::BoolRole;

/// Main error type for query DSL construction
#[derive(Error, Debug)]
pub enum DslError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Only one top-level clause is allowed, use a bool query to combine multiple clauses")]
    MultipleTopLevelClauses,

    #[error("Bool query has no clauses: open one of must, filter, should or must_not first")]
    EmptyBool,

    #[error("Bool query role `{0}` was opened but holds no clauses")]
    EmptyBoolRole(BoolRole),

    #[error("No bool role is open: call must, filter, should or must_not before adding clauses")]
    NoOpenRole,

    #[error("Aggregation `{name}` of type {agg_type} cannot have nested aggregations")]
    NotNestable { name: String, agg_type: &'static str },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for query DSL operations
pub type Result<T> = std::result::Result<T, DslError>;

impl DslError {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        DslError::InvalidArgument(msg.into())
    }

    /// Check if this error comes from violating the shape of the query tree
    /// rather than from a bad parameter value
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DslError::MultipleTopLevelClauses
                | DslError::EmptyBool
                | DslError::EmptyBoolRole(_)
                | DslError::NoOpenRole
                | DslError::NotNestable { .. }
        )
    }
}
