//! Concrete query node implementations
//!
//! Every leaf implements the `QueryNode` trait; `BoolQuery` is the mutable
//! compound clause.

mod bool_query;
mod exists_query;
mod phrase_query;
mod query_string_query;
mod range_query;
mod regexp_query;
mod term_query;
mod terms_query;
mod wildcard_query;

pub use bool_query::BoolQuery;
pub use exists_query::ExistsQuery;
pub use phrase_query::MatchPhraseQuery;
pub use query_string_query::{QueryStringFields, QueryStringQuery};
pub use range_query::RangeQuery;
pub use regexp_query::RegexpQuery;
pub use term_query::TermQuery;
pub use terms_query::TermsQuery;
pub use wildcard_query::WildcardQuery;
