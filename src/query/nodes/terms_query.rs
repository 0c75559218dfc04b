//! Terms query - matches any of multiple exact values

use serde_json::Value;

use crate::query::ast::{single_key, QueryNode};

/// Query that matches documents containing any of the given values in a field
///
/// Serializes as `{"terms": {"<field>": [<values>]}}`.
#[derive(Clone, Debug)]
pub struct TermsQuery {
    /// Field to search in
    pub field: String,
    /// Values to match (OR semantics)
    pub values: Vec<Value>,
}

impl TermsQuery {
    /// Create a new terms query
    pub fn new<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl QueryNode for TermsQuery {
    fn query_type(&self) -> &'static str {
        "terms"
    }

    fn body(&self) -> Value {
        single_key(self.field.clone(), Value::Array(self.values.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_terms_query_creation() {
        let query = TermsQuery::new("status", ["active", "pending"]);
        assert_eq!(query.field, "status");
        assert_eq!(query.values.len(), 2);
    }

    #[test]
    fn test_terms_query_dsl() {
        let query = TermsQuery::new("tags", vec!["rust".to_string(), "programming".to_string()]);
        assert_eq!(
            query.to_dsl(),
            json!({"terms": {"tags": ["rust", "programming"]}})
        );
    }

    #[test]
    fn test_terms_query_type() {
        let query = TermsQuery::new("status", [1, 2]);
        assert_eq!(query.query_type(), "terms");
        assert_eq!(query.to_dsl(), json!({"terms": {"status": [1, 2]}}));
    }
}
