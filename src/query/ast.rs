//! Abstract Syntax Tree for query representation
//!
//! Leaf clauses implement the `QueryNode` trait and are immutable once built,
//! so they are shared through `Arc` when a tree is cloned or merged. The only
//! mutable clause is `BoolQuery`, which `QueryClause` owns directly and
//! deep-copies on clone.

use serde_json::{Map, Value};
use std::fmt::Debug;
use std::sync::Arc;

use crate::query::nodes::BoolQuery;
use crate::Result;

/// Reference-counted query node for efficient tree sharing
pub type QueryNodeRef = Arc<dyn QueryNode>;

/// Core trait for all immutable leaf query nodes
pub trait QueryNode: Send + Sync + Debug {
    /// DSL clause name, used as the single key of the fragment
    fn query_type(&self) -> &'static str;

    /// Body of the fragment, placed under the `query_type` key
    fn body(&self) -> Value;

    /// Serialize this node into its DSL fragment
    fn to_dsl(&self) -> Value {
        single_key(self.query_type(), self.body())
    }
}

/// A clause that can occupy a query slot or a bool role
#[derive(Clone, Debug)]
pub enum QueryClause {
    /// Immutable leaf, shared on clone
    Node(QueryNodeRef),
    /// Compound bool clause, deep-copied on clone
    Bool(BoolQuery),
}

impl QueryClause {
    /// Wrap a leaf node
    pub fn node(node: impl QueryNode + 'static) -> Self {
        QueryClause::Node(Arc::new(node))
    }

    /// Get the DSL clause name
    pub fn query_type(&self) -> &'static str {
        match self {
            QueryClause::Node(node) => node.query_type(),
            QueryClause::Bool(_) => "bool",
        }
    }

    pub fn is_match_all(&self) -> bool {
        self.query_type() == MatchAllQuery::TYPE
    }

    pub fn is_match_none(&self) -> bool {
        self.query_type() == MatchNoneQuery::TYPE
    }

    /// Serialize this clause into its DSL fragment
    pub fn to_dsl(&self) -> Result<Value> {
        match self {
            QueryClause::Node(node) => Ok(node.to_dsl()),
            QueryClause::Bool(bool_query) => bool_query.to_dsl(),
        }
    }

    /// Check whether two clauses point at the same shared leaf
    pub fn shares_node_with(&self, other: &QueryClause) -> bool {
        match (self, other) {
            (QueryClause::Node(a), QueryClause::Node(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T: QueryNode + 'static> From<T> for QueryClause {
    fn from(node: T) -> Self {
        QueryClause::node(node)
    }
}

impl From<BoolQuery> for QueryClause {
    fn from(bool_query: BoolQuery) -> Self {
        QueryClause::Bool(bool_query)
    }
}

/// Build a `{key: value}` object
pub(crate) fn single_key(key: impl Into<String>, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.into(), value);
    Value::Object(map)
}

/// A query that matches all documents
#[derive(Clone, Debug, Default)]
pub struct MatchAllQuery;

impl MatchAllQuery {
    pub const TYPE: &'static str = "match_all";
}

impl QueryNode for MatchAllQuery {
    fn query_type(&self) -> &'static str {
        Self::TYPE
    }

    fn body(&self) -> Value {
        Value::Object(Map::new())
    }
}

/// A query that matches no documents
#[derive(Clone, Debug, Default)]
pub struct MatchNoneQuery;

impl MatchNoneQuery {
    pub const TYPE: &'static str = "match_none";
}

impl QueryNode for MatchNoneQuery {
    fn query_type(&self) -> &'static str {
        Self::TYPE
    }

    fn body(&self) -> Value {
        Value::Object(Map::new())
    }
}
