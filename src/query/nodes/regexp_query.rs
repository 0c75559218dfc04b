//! Regexp query - matches terms against a regular expression

use serde_json::{json, Value};

use crate::query::ast::{single_key, QueryNode};

/// Query that matches terms using a regular expression pattern
#[derive(Clone, Debug)]
pub struct RegexpQuery {
    /// Field to search in
    pub field: String,
    /// Regular expression, in the engine's regex syntax
    pub pattern: String,
}

impl RegexpQuery {
    pub fn new(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            pattern: pattern.into(),
        }
    }
}

impl QueryNode for RegexpQuery {
    fn query_type(&self) -> &'static str {
        "regexp"
    }

    fn body(&self) -> Value {
        single_key(self.field.clone(), json!({ "value": self.pattern }))
    }
}
