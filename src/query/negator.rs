//! Logical negation of query clauses

use tracing::trace;

use crate::query::ast::{MatchAllQuery, MatchNoneQuery, QueryClause};
use crate::query::nodes::BoolQuery;
use crate::query::types::BoolRole;

/// Computes the logical inverse of a clause
///
/// `match_all` and `match_none` map onto each other. Every other clause is
/// wrapped in a fresh bool query under `must_not`. No simplification is
/// attempted, so negating twice nests two `must_not` levels instead of
/// restoring the original clause.
pub struct Negator;

impl Negator {
    /// Negate `clause`, taking ownership of it
    ///
    /// The clause is moved into the result as is; clone it first if the
    /// original must stay usable.
    pub fn negate(clause: QueryClause) -> QueryClause {
        if clause.is_match_all() {
            return QueryClause::from(MatchNoneQuery);
        }
        if clause.is_match_none() {
            return QueryClause::from(MatchAllQuery);
        }

        trace!(query_type = clause.query_type(), "wrapping clause in must_not");
        QueryClause::Bool(BoolQuery::from_role(BoolRole::MustNot, vec![clause]))
    }
}
