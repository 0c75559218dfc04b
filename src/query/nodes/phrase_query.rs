//! Match phrase query - matches an exact sequence of analyzed terms

use serde_json::Value;

use crate::query::ast::{single_key, QueryNode};

/// Query that matches documents containing the terms of a phrase in order
///
/// Serializes as `{"match_phrase": {"<field>": "<phrase>"}}`.
#[derive(Clone, Debug)]
pub struct MatchPhraseQuery {
    /// Field to search in
    pub field: String,
    /// Phrase text, analyzed by the engine
    pub phrase: String,
}

impl MatchPhraseQuery {
    /// Create a new phrase query
    pub fn new(field: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            phrase: phrase.into(),
        }
    }
}

impl QueryNode for MatchPhraseQuery {
    fn query_type(&self) -> &'static str {
        "match_phrase"
    }

    fn body(&self) -> Value {
        single_key(self.field.clone(), Value::from(self.phrase.as_str()))
    }
}
