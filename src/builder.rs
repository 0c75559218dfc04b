//! Top-level request body builder
//!
//! [`QueryBuilder`] combines pagination, source filtering, sorting and
//! collapsing with one [`QueryClauses`] tree and one [`Aggregations`] tree.
//!
//! # Merge precedence
//!
//! [`QueryBuilder::merge`] is right-biased: for `from`, `size`, `_source` and
//! `collapse` the argument's value wins when it is set. Sort entries from both
//! sides are kept, ours first, with the argument's value winning for a field
//! present on both sides. Queries and aggregations are combined with ours
//! first.
//!
//! # Example
//!
//! ```rust
//! use queryforge::QueryBuilder;
//! use queryforge::query::RangeBounds;
//! use serde_json::json;
//!
//! let mut base = QueryBuilder::new();
//! base.from(10).unwrap();
//! base.query_mut().term("user.name", "kimchy").unwrap();
//!
//! let mut extra = QueryBuilder::new();
//! extra.from(25).unwrap();
//! extra.query_mut().range("age", RangeBounds::new().gte(10).lte(20)).unwrap();
//!
//! let merged = base.merge(&extra);
//! assert_eq!(merged.offset(), Some(25));
//! assert_eq!(
//!     merged.to_dsl().unwrap()["query"],
//!     json!({"bool": {"must": [
//!         {"term": {"user.name": {"value": "kimchy"}}},
//!         {"range": {"age": {"gte": 10, "lte": 20}}}
//!     ]}})
//! );
//! ```

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::aggs::Aggregations;
use crate::config::RequestSettings;
use crate::error::DslError;
use crate::query::ast::single_key;
use crate::query::QueryClauses;
use crate::Result;

/// Sort direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = DslError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(DslError::invalid_argument(format!(
                "sort order must be asc or desc, got `{}`",
                other
            ))),
        }
    }
}

/// `_source` filtering expression
#[derive(Clone, Debug, PartialEq)]
pub enum SourceFilter {
    /// Do not return the source at all (`false`)
    Disabled,
    /// Return a single field or wildcard pattern
    Field(String),
    /// Return the listed fields
    Fields(Vec<String>),
    /// Full `includes`/`excludes` specification
    Spec(Map<String, Value>),
}

impl SourceFilter {
    /// Accept `false`, a string, a list of strings or an object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(false) => Ok(SourceFilter::Disabled),
            Value::String(field) => Ok(SourceFilter::Field(field)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(field) => Ok(field),
                    other => Err(DslError::invalid_argument(format!(
                        "_source list entries must be strings, got {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(SourceFilter::Fields),
            Value::Object(spec) => Ok(SourceFilter::Spec(spec)),
            other => Err(DslError::invalid_argument(format!(
                "_source must be false, a string, a list or a mapping, got {}",
                other
            ))),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            SourceFilter::Disabled => Value::Bool(false),
            SourceFilter::Field(field) => Value::from(field.as_str()),
            SourceFilter::Fields(fields) => {
                Value::Array(fields.iter().map(|f| Value::from(f.as_str())).collect())
            }
            SourceFilter::Spec(spec) => Value::Object(spec.clone()),
        }
    }
}

impl From<&str> for SourceFilter {
    fn from(field: &str) -> Self {
        SourceFilter::Field(field.to_string())
    }
}

impl From<String> for SourceFilter {
    fn from(field: String) -> Self {
        SourceFilter::Field(field)
    }
}

impl From<Vec<String>> for SourceFilter {
    fn from(fields: Vec<String>) -> Self {
        SourceFilter::Fields(fields)
    }
}

impl From<Vec<&str>> for SourceFilter {
    fn from(fields: Vec<&str>) -> Self {
        SourceFilter::Fields(fields.into_iter().map(String::from).collect())
    }
}

impl From<Map<String, Value>> for SourceFilter {
    fn from(spec: Map<String, Value>) -> Self {
        SourceFilter::Spec(spec)
    }
}

/// Builder for a complete search request body
#[derive(Clone, Debug, Default)]
pub struct QueryBuilder {
    from: Option<u64>,
    size: Option<u64>,
    source: Option<SourceFilter>,
    collapse: Option<String>,
    sort: Map<String, Value>,
    query: QueryClauses,
    aggregations: Aggregations,
}

fn non_negative<N: TryInto<u64>>(param: &str, n: N) -> Result<u64> {
    n.try_into().map_err(|_| {
        DslError::invalid_argument(format!("{} must be a non-negative integer", param))
    })
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder seeded from `settings`
    pub fn with_settings(settings: &RequestSettings) -> Self {
        Self {
            size: settings.default_size,
            ..Self::default()
        }
    }

    /// Set the offset of the first hit
    pub fn from<N: TryInto<u64>>(&mut self, from: N) -> Result<&mut Self> {
        self.from = Some(non_negative("from", from)?);
        Ok(self)
    }

    /// Set the number of hits to return
    pub fn size<N: TryInto<u64>>(&mut self, size: N) -> Result<&mut Self> {
        self.size = Some(non_negative("size", size)?);
        Ok(self)
    }

    /// Set the `_source` filter
    pub fn source(&mut self, source: impl Into<SourceFilter>) -> &mut Self {
        self.source = Some(source.into());
        self
    }

    /// Set the `_source` filter from a dynamically shaped value
    pub fn source_value(&mut self, source: Value) -> Result<&mut Self> {
        self.source = Some(SourceFilter::from_value(source)?);
        Ok(self)
    }

    /// Collapse hits on `field`
    pub fn collapse(&mut self, field: impl Into<String>) -> &mut Self {
        self.collapse = Some(field.into());
        self
    }

    /// Merge a `{field: order | {order, ...}}` mapping into the sort
    ///
    /// Scalar values become `{"order": value}`. A field that is already
    /// sorted on keeps its position and takes the new value.
    pub fn sort(&mut self, mapping: Value) -> Result<&mut Self> {
        let Value::Object(entries) = mapping else {
            return Err(DslError::invalid_argument("sort must be a mapping of field to order"));
        };
        for (field, spec) in entries {
            let spec = match spec {
                Value::Object(options) => Value::Object(options),
                scalar @ (Value::String(_) | Value::Number(_) | Value::Bool(_)) => {
                    single_key("order", scalar)
                }
                other => {
                    return Err(DslError::invalid_argument(format!(
                        "sort order for `{}` must be a scalar or a mapping, got {}",
                        field, other
                    )))
                }
            };
            self.sort.insert(field, spec);
        }
        Ok(self)
    }

    /// Sort on `field` in `order`
    pub fn sort_field(&mut self, field: impl Into<String>, order: SortOrder) -> &mut Self {
        self.sort
            .insert(field.into(), single_key("order", Value::from(order.as_str())));
        self
    }

    pub fn query(&self) -> &QueryClauses {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut QueryClauses {
        &mut self.query
    }

    pub fn aggregations(&self) -> &Aggregations {
        &self.aggregations
    }

    pub fn aggregations_mut(&mut self) -> &mut Aggregations {
        &mut self.aggregations
    }

    pub fn offset(&self) -> Option<u64> {
        self.from
    }

    pub fn page_size(&self) -> Option<u64> {
        self.size
    }

    pub fn source_filter(&self) -> Option<&SourceFilter> {
        self.source.as_ref()
    }

    pub fn collapse_field(&self) -> Option<&str> {
        self.collapse.as_deref()
    }

    /// Sort entries in insertion order
    pub fn sort_entries(&self) -> &Map<String, Value> {
        &self.sort
    }

    /// Check that `from + size` stays within the configured result window
    pub fn validate_window(&self, settings: &RequestSettings) -> Result<()> {
        let from = self.from.unwrap_or(0);
        let size = self.size.or(settings.default_size).unwrap_or(0);
        match from.checked_add(size) {
            Some(end) if end <= settings.max_window => Ok(()),
            _ => Err(DslError::invalid_argument(format!(
                "from + size must not exceed {}, got from={} size={}",
                settings.max_window, from, size
            ))),
        }
    }

    /// Serialize the full request body
    pub fn to_dsl(&self) -> Result<Value> {
        let mut body = Map::new();
        if let Some(from) = self.from {
            body.insert("from".to_string(), Value::from(from));
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), Value::from(size));
        }
        if let Some(source) = &self.source {
            body.insert("_source".to_string(), source.to_value());
        }
        body.insert("query".to_string(), self.query.to_dsl()?);
        if !self.sort.is_empty() {
            let clauses = self
                .sort
                .iter()
                .map(|(field, spec)| single_key(field.clone(), spec.clone()))
                .collect();
            body.insert("sort".to_string(), Value::Array(clauses));
        }
        if let Some(field) = &self.collapse {
            body.insert("collapse".to_string(), single_key("field", Value::from(field.as_str())));
        }
        if self.aggregations.any() {
            body.insert("aggs".to_string(), Value::Object(self.aggregations.to_dsl()?));
        }
        Ok(Value::Object(body))
    }

    /// Render the request body as JSON text
    pub fn to_json_string(&self, pretty: bool) -> Result<String> {
        let body = self.to_dsl()?;
        let rendered = if pretty {
            serde_json::to_string_pretty(&body)?
        } else {
            serde_json::to_string(&body)?
        };
        Ok(rendered)
    }

    /// Combine two builders into a new one, `other` winning scalar conflicts
    pub fn merge(&self, other: &QueryBuilder) -> QueryBuilder {
        debug!(
            sort_fields = self.sort.len() + other.sort.len(),
            "merging query builders"
        );
        let mut sort = self.sort.clone();
        for (field, spec) in &other.sort {
            sort.insert(field.clone(), spec.clone());
        }

        QueryBuilder {
            from: other.from.or(self.from),
            size: other.size.or(self.size),
            source: other.source.clone().or_else(|| self.source.clone()),
            collapse: other.collapse.clone().or_else(|| self.collapse.clone()),
            sort,
            query: self.query.merge(&other.query),
            aggregations: self.aggregations.merge(&other.aggregations),
        }
    }
}

impl Serialize for QueryBuilder {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_dsl()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}
