//! Wildcard query - matches terms using wildcards
//!
//! Supports:
//! - `*` - matches any sequence of characters
//! - `?` - matches any single character
//!
//! # Example
//!
//! ```rust
//! use queryforge::query::nodes::WildcardQuery;
//! use queryforge::query::QueryNode;
//!
//! let query = WildcardQuery::new("title", "prog*");
//! assert_eq!(query.query_type(), "wildcard");
//! ```

use serde_json::{json, Value};

use crate::query::ast::{single_key, QueryNode};

/// Query that matches terms using wildcard patterns
#[derive(Clone, Debug)]
pub struct WildcardQuery {
    /// Field to search in
    pub field: String,
    /// Wildcard pattern
    pub pattern: String,
}

impl WildcardQuery {
    /// Create a new wildcard query
    pub fn new(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            pattern: pattern.into(),
        }
    }
}

impl QueryNode for WildcardQuery {
    fn query_type(&self) -> &'static str {
        "wildcard"
    }

    fn body(&self) -> Value {
        single_key(self.field.clone(), json!({ "value": self.pattern }))
    }
}
