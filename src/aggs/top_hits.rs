//! Top hits aggregation - the best matching documents per bucket

use serde_json::{json, Value};

use crate::aggs::{AggregationNode, Aggregations, NestableAggregation};
use crate::Result;

#[derive(Clone, Debug)]
pub struct TopHitsAggregation {
    name: String,
    size: u64,
    children: Option<Aggregations>,
}

impl TopHitsAggregation {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            children: None,
        }
    }
}

impl AggregationNode for TopHitsAggregation {
    fn name(&self) -> &str {
        &self.name
    }

    fn agg_type(&self) -> &'static str {
        "top_hits"
    }

    fn body(&self) -> Result<Value> {
        Ok(json!({ "size": self.size }))
    }
}

impl NestableAggregation for TopHitsAggregation {
    fn children(&self) -> Option<&Aggregations> {
        self.children.as_ref()
    }

    fn children_slot(&mut self) -> &mut Option<Aggregations> {
        &mut self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_hits_body() {
        let agg = TopHitsAggregation::new("latest", 3);
        assert_eq!(agg.agg_type(), "top_hits");
        assert_eq!(agg.body().unwrap(), json!({"size": 3}));
    }
}
