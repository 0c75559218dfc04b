pub mod aggs;
pub mod builder;
pub mod config;
pub mod error;
pub mod query;
pub mod script;

pub use aggs::{Aggregation, AggregationNode, Aggregations, NestableAggregation};
pub use builder::{QueryBuilder, SortOrder, SourceFilter};
pub use config::RequestSettings;
pub use error::{DslError, Result};
pub use query::{BoolQuery, BoolRole, Negator, QueryClause, QueryClauses, RangeBounds, RangeValue};
pub use script::Script;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
