//! Term query - exact match on a field

use serde_json::{json, Value};

use crate::query::ast::{single_key, QueryNode};

/// Query that matches documents containing an exact value in a field
///
/// Serializes as `{"term": {"<field>": {"value": <value>}}}`.
#[derive(Clone, Debug)]
pub struct TermQuery {
    /// Field to search in
    pub field: String,
    /// Exact value to match
    pub value: Value,
}

impl TermQuery {
    /// Create a new term query
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl QueryNode for TermQuery {
    fn query_type(&self) -> &'static str {
        "term"
    }

    fn body(&self) -> Value {
        single_key(self.field.clone(), json!({ "value": self.value }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_query_creation() {
        let query = TermQuery::new("status", "active");
        assert_eq!(query.field, "status");
        assert_eq!(query.value, json!("active"));
    }

    #[test]
    fn test_term_query_dsl() {
        let query = TermQuery::new("user.name", "kimchy");
        assert_eq!(
            query.to_dsl(),
            json!({"term": {"user.name": {"value": "kimchy"}}})
        );
    }

    #[test]
    fn test_term_query_non_string_value() {
        let query = TermQuery::new("retries", 3);
        assert_eq!(query.to_dsl(), json!({"term": {"retries": {"value": 3}}}));

        let query = TermQuery::new("archived", false);
        assert_eq!(query.to_dsl(), json!({"term": {"archived": {"value": false}}}));
    }

    #[test]
    fn test_term_query_type() {
        assert_eq!(TermQuery::new("a", "b").query_type(), "term");
    }
}
