//! Single-value metric aggregations
//!
//! None of these accept nested aggregations.

use serde_json::{Map, Value};

use crate::aggs::AggregationNode;
use crate::Result;

fn field_body(field: &str, missing: Option<&Value>) -> Value {
    let mut body = Map::new();
    body.insert("field".to_string(), Value::from(field));
    if let Some(missing) = missing {
        body.insert("missing".to_string(), missing.clone());
    }
    Value::Object(body)
}

/// Average of a numeric field
///
/// Metric aggregations have no children accessor:
///
/// ```compile_fail
/// use queryforge::aggs::AvgAggregation;
///
/// let mut agg = AvgAggregation::new("avg_runtime", "duration");
/// agg.aggs();
/// ```
#[derive(Clone, Debug)]
pub struct AvgAggregation {
    name: String,
    field: String,
    missing: Option<Value>,
}

impl AvgAggregation {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            missing: None,
        }
    }

    /// Value used for documents without the field
    pub fn missing(&mut self, value: impl Into<Value>) -> &mut Self {
        self.missing = Some(value.into());
        self
    }
}

impl AggregationNode for AvgAggregation {
    fn name(&self) -> &str {
        &self.name
    }

    fn agg_type(&self) -> &'static str {
        "avg"
    }

    fn body(&self) -> Result<Value> {
        Ok(field_body(&self.field, self.missing.as_ref()))
    }
}

/// Sum of a numeric field
#[derive(Clone, Debug)]
pub struct SumAggregation {
    name: String,
    field: String,
    missing: Option<Value>,
}

impl SumAggregation {
    pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field: field.into(),
            missing: None,
        }
    }

    /// Value used for documents without the field
    pub fn missing(&mut self, value: impl Into<Value>) -> &mut Self {
        self.missing = Some(value.into());
        self
    }
}

impl AggregationNode for SumAggregation {
    fn name(&self) -> &str {
        &self.name
    }

    fn agg_type(&self) -> &'static str {
        "sum"
    }

    fn body(&self) -> Result<Value> {
        Ok(field_body(&self.field, self.missing.as_ref()))
    }
}

macro_rules! field_metric {
    ($(#[$doc:meta])* $ty:ident, $agg_type:literal) => {
        $(#[$doc])*
        #[derive(Clone, Debug)]
        pub struct $ty {
            name: String,
            field: String,
        }

        impl $ty {
            pub fn new(name: impl Into<String>, field: impl Into<String>) -> Self {
                Self {
                    name: name.into(),
                    field: field.into(),
                }
            }
        }

        impl AggregationNode for $ty {
            fn name(&self) -> &str {
                &self.name
            }

            fn agg_type(&self) -> &'static str {
                $agg_type
            }

            fn body(&self) -> Result<Value> {
                Ok(field_body(&self.field, None))
            }
        }
    };
}

field_metric!(
    /// Maximum of a numeric field
    MaxAggregation,
    "max"
);
field_metric!(
    /// Number of values of a field
    ValueCountAggregation,
    "value_count"
);
field_metric!(
    /// Approximate count of distinct values of a field
    CardinalityAggregation,
    "cardinality"
);
