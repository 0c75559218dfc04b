//! Exists query - matches documents that have a value for a field

use serde_json::{json, Value};

use crate::query::ast::QueryNode;

#[derive(Clone, Debug)]
pub struct ExistsQuery {
    pub field: String,
}

impl ExistsQuery {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }
}

impl QueryNode for ExistsQuery {
    fn query_type(&self) -> &'static str {
        "exists"
    }

    fn body(&self) -> Value {
        json!({ "field": self.field })
    }
}
