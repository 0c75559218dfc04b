//! Date histogram aggregation - buckets by calendar interval

use serde_json::{Map, Value};

use crate::aggs::{AggregationNode, Aggregations, NestableAggregation};
use crate::Result;

#[derive(Clone, Debug)]
pub struct DateHistogramAggregation {
    name: String,
    field: String,
    calendar_interval: String,
    format: Option<String>,
    children: Option<Aggregations>,
}

impl DateHistogramAggregation {
    /// Create a date histogram with a calendar interval such as `day` or `1M`
    pub fn new(
        name: impl Into<String>,
        field: impl Into<String>,
        calendar_interval: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            calendar_interval: calendar_interval.into(),
            format: None,
            children: None,
        }
    }

    /// Date format for bucket keys
    pub fn format(&mut self, format: impl Into<String>) -> &mut Self {
        self.format = Some(format.into());
        self
    }
}

impl AggregationNode for DateHistogramAggregation {
    fn name(&self) -> &str {
        &self.name
    }

    fn agg_type(&self) -> &'static str {
        "date_histogram"
    }

    fn body(&self) -> Result<Value> {
        let mut body = Map::new();
        body.insert("field".to_string(), Value::from(self.field.as_str()));
        body.insert(
            "calendar_interval".to_string(),
            Value::from(self.calendar_interval.as_str()),
        );
        if let Some(format) = &self.format {
            body.insert("format".to_string(), Value::from(format.as_str()));
        }
        Ok(Value::Object(body))
    }
}

impl NestableAggregation for DateHistogramAggregation {
    fn children(&self) -> Option<&Aggregations> {
        self.children.as_ref()
    }

    fn children_slot(&mut self) -> &mut Option<Aggregations> {
        &mut self.children
    }
}
