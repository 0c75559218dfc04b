//! Filter aggregation - a single bucket of documents matching a query

use serde_json::Value;
use tracing::trace;

use crate::aggs::{AggregationNode, Aggregations, NestableAggregation};
use crate::query::QueryClauses;
use crate::Result;

/// Single bucket aggregation narrowed by its own query
///
/// The query is populated by the builder closure given at construction and
/// is owned by the aggregation, so cloning the aggregation copies it.
#[derive(Clone, Debug)]
pub struct FilterAggregation {
    name: String,
    query: QueryClauses,
    children: Option<Aggregations>,
}

impl FilterAggregation {
    /// Create a filter aggregation, letting `build` populate its query
    pub fn new<F>(name: impl Into<String>, build: F) -> Result<Self>
    where
        F: FnOnce(&mut QueryClauses) -> Result<()>,
    {
        let name = name.into();
        let mut query = QueryClauses::new();
        build(&mut query)?;
        trace!(name = %name, empty = query.is_empty(), "built filter aggregation query");
        Ok(Self {
            name,
            query,
            children: None,
        })
    }

    pub fn query(&self) -> &QueryClauses {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut QueryClauses {
        &mut self.query
    }
}

impl AggregationNode for FilterAggregation {
    fn name(&self) -> &str {
        &self.name
    }

    fn agg_type(&self) -> &'static str {
        "filter"
    }

    fn body(&self) -> Result<Value> {
        self.query.to_dsl()
    }
}

impl NestableAggregation for FilterAggregation {
    fn children(&self) -> Option<&Aggregations> {
        self.children.as_ref()
    }

    fn children_slot(&mut self) -> &mut Option<Aggregations> {
        &mut self.children
    }
}
