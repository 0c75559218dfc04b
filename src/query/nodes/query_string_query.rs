//! Query string query - free text in the engine's query string syntax

use serde_json::{Map, Value};

use crate::query::ast::QueryNode;

/// Fields targeted by a query string; a single field is kept as a
/// one-element list
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryStringFields(pub Vec<String>);

impl From<&str> for QueryStringFields {
    fn from(field: &str) -> Self {
        QueryStringFields(vec![field.to_string()])
    }
}

impl From<String> for QueryStringFields {
    fn from(field: String) -> Self {
        QueryStringFields(vec![field])
    }
}

impl From<Vec<String>> for QueryStringFields {
    fn from(fields: Vec<String>) -> Self {
        QueryStringFields(fields)
    }
}

impl From<Vec<&str>> for QueryStringFields {
    fn from(fields: Vec<&str>) -> Self {
        QueryStringFields(fields.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for QueryStringFields {
    fn from(fields: [&str; N]) -> Self {
        QueryStringFields(fields.iter().map(|f| f.to_string()).collect())
    }
}

#[derive(Clone, Debug)]
pub struct QueryStringQuery {
    pub query: String,
    pub fields: Option<Vec<String>>,
}

impl QueryStringQuery {
    /// Create a query string over the engine's default fields
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            fields: None,
        }
    }

    /// Restrict the query string to one or more fields
    pub fn with_fields(mut self, fields: impl Into<QueryStringFields>) -> Self {
        self.fields = Some(fields.into().0);
        self
    }
}

impl QueryNode for QueryStringQuery {
    fn query_type(&self) -> &'static str {
        "query_string"
    }

    fn body(&self) -> Value {
        let mut map = Map::new();
        map.insert("query".to_string(), Value::from(self.query.as_str()));
        if let Some(fields) = &self.fields {
            map.insert(
                "fields".to_string(),
                Value::Array(fields.iter().map(|f| Value::from(f.as_str())).collect()),
            );
        }
        Value::Object(map)
    }
}
