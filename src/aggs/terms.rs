//! Terms aggregation - one bucket per distinct value

use serde_json::{Map, Value};

use crate::aggs::{AggregationNode, Aggregations, NestableAggregation};
use crate::builder::SortOrder;
use crate::error::DslError;
use crate::script::Script;
use crate::Result;

/// Where a terms aggregation reads its values from
#[derive(Clone, Debug)]
pub enum TermsSource {
    Field(String),
    Script(Script),
}

/// Bucket aggregation grouping documents by distinct values of a field or script
#[derive(Clone, Debug)]
pub struct TermsAggregation {
    name: String,
    source: TermsSource,
    size: Option<u64>,
    order: Map<String, Value>,
    children: Option<Aggregations>,
}

impl TermsAggregation {
    /// Create a terms aggregation from exactly one of `field` or `script`
    pub fn new(
        name: impl Into<String>,
        field: Option<String>,
        script: Option<Script>,
    ) -> Result<Self> {
        let source = match (field, script) {
            (Some(field), None) => TermsSource::Field(field),
            (None, Some(script)) => TermsSource::Script(script),
            (Some(_), Some(_)) => {
                return Err(DslError::invalid_argument(
                    "terms aggregation takes either a field or a script, not both",
                ))
            }
            (None, None) => {
                return Err(DslError::invalid_argument(
                    "terms aggregation requires a field or a script",
                ))
            }
        };
        Ok(Self::from_source(name, source))
    }

    pub fn with_field(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::from_source(name, TermsSource::Field(field.into()))
    }

    pub fn with_script(name: impl Into<String>, script: Script) -> Self {
        Self::from_source(name, TermsSource::Script(script))
    }

    fn from_source(name: impl Into<String>, source: TermsSource) -> Self {
        Self {
            name: name.into(),
            source,
            size: None,
            order: Map::new(),
            children: None,
        }
    }

    pub fn source(&self) -> &TermsSource {
        &self.source
    }

    /// Set the number of buckets to return
    pub fn size(&mut self, size: u64) -> &mut Self {
        self.size = Some(size);
        self
    }

    /// Order buckets by `key`, e.g. `_count`, `_key` or a sub-aggregation name
    pub fn order(&mut self, key: impl Into<String>, order: SortOrder) -> &mut Self {
        self.order
            .insert(key.into(), Value::from(order.as_str()));
        self
    }
}

impl AggregationNode for TermsAggregation {
    fn name(&self) -> &str {
        &self.name
    }

    fn agg_type(&self) -> &'static str {
        "terms"
    }

    fn body(&self) -> Result<Value> {
        let mut body = Map::new();
        match &self.source {
            TermsSource::Field(field) => {
                body.insert("field".to_string(), Value::from(field.as_str()));
            }
            TermsSource::Script(script) => {
                body.insert("script".to_string(), script.to_dsl());
            }
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), Value::from(size));
        }
        if !self.order.is_empty() {
            body.insert("order".to_string(), Value::Object(self.order.clone()));
        }
        Ok(Value::Object(body))
    }
}

impl NestableAggregation for TermsAggregation {
    fn children(&self) -> Option<&Aggregations> {
        self.children.as_ref()
    }

    fn children_slot(&mut self) -> &mut Option<Aggregations> {
        &mut self.children
    }
}
