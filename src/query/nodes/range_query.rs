//! Range query - matches documents with field values in a range

use serde_json::Value;

use crate::error::DslError;
use crate::query::ast::{single_key, QueryNode};
use crate::query::types::{require_field, RangeBounds, RangeValue};
use crate::Result;

/// Query that matches documents with field values within a specified range
///
/// At least one of `gt`, `gte`, `lt`, `lte` must be set.
#[derive(Clone, Debug)]
pub struct RangeQuery {
    /// Field to search in
    pub field: String,
    /// Range bounds (gt, gte, lt, lte)
    bounds: RangeBounds,
}

impl RangeQuery {
    /// Create a new range query
    pub fn new(field: impl Into<String>, bounds: RangeBounds) -> Result<Self> {
        let field = require_field("range query", field.into())?;
        if bounds.is_empty() {
            return Err(DslError::invalid_argument(
                "At least one of gt, gte, lt, lte should be given",
            ));
        }
        Ok(Self { field, bounds })
    }

    /// Create a range query from `(bound, value)` pairs such as `("gte", 10)`
    pub fn from_pairs<K, V, I>(field: impl Into<String>, pairs: I) -> Result<Self>
    where
        K: AsRef<str>,
        V: Into<RangeValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::new(field, RangeBounds::from_pairs(pairs)?)
    }

    pub fn bounds(&self) -> &RangeBounds {
        &self.bounds
    }
}

impl QueryNode for RangeQuery {
    fn query_type(&self) -> &'static str {
        "range"
    }

    fn body(&self) -> Value {
        single_key(self.field.clone(), Value::Object(self.bounds.to_map()))
    }
}
