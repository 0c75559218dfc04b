//! Query clause construction
//!
//! This module builds the `query` part of a request body in the engine's
//! JSON query DSL, supporting:
//! - Boolean queries (must, filter, should, must_not)
//! - Term and terms queries (exact match)
//! - Range queries (numeric/date ranges)
//! - Pattern queries (regexp, wildcard)
//! - Exists, match_phrase and query_string queries
//! - Negation of any clause
//!
//! # Example
//!
//! ```json
//! {
//!   "query": {
//!     "bool": {
//!       "must": [
//!         { "match_phrase": { "message": "connection refused" } }
//!       ],
//!       "filter": [
//!         { "range": { "created_at": { "gte": "2024-01-01" } } }
//!       ]
//!     }
//!   }
//! }
//! ```

pub mod ast;
pub mod clauses;
pub mod negator;
pub mod nodes;
pub mod types;

pub use ast::{MatchAllQuery, MatchNoneQuery, QueryClause, QueryNode, QueryNodeRef};
pub use clauses::QueryClauses;
pub use negator::Negator;
pub use nodes::{
    BoolQuery, ExistsQuery, MatchPhraseQuery, QueryStringFields, QueryStringQuery, RangeQuery,
    RegexpQuery, TermQuery, TermsQuery, WildcardQuery,
};
pub use types::*;
