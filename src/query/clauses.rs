//! Single-slot container for the top-level query clause

use serde_json::Value;
use std::mem;
use tracing::debug;

use crate::error::DslError;
use crate::query::ast::{MatchAllQuery, MatchNoneQuery, QueryClause, QueryNode, QueryNodeRef};
use crate::query::negator::Negator;
use crate::query::nodes::{
    BoolQuery, ExistsQuery, MatchPhraseQuery, QueryStringFields, QueryStringQuery, RangeQuery,
    RegexpQuery, TermQuery, TermsQuery, WildcardQuery,
};
use crate::query::types::{BoolRole, RangeBounds};
use crate::Result;

/// State of the top-level slot
///
/// `Empty -> Single` happens once through a leaf constructor or `push`.
/// `Empty -> Boolean` happens through `bool_query` (or pushing a bool clause),
/// after which pushed clauses land in the bool query's open role.
#[derive(Clone, Debug, Default)]
enum TopLevel {
    #[default]
    Empty,
    Single(QueryNodeRef),
    Boolean(BoolQuery),
}

impl From<QueryClause> for TopLevel {
    fn from(clause: QueryClause) -> Self {
        match clause {
            QueryClause::Node(node) => TopLevel::Single(node),
            QueryClause::Bool(bool_query) => TopLevel::Boolean(bool_query),
        }
    }
}

/// Holder of the one clause that becomes the request's `query`
///
/// An empty container serializes as `match_all`.
///
/// # Example
///
/// ```rust
/// use queryforge::query::QueryClauses;
/// use queryforge::query::nodes::TermQuery;
/// use serde_json::json;
///
/// let mut query = QueryClauses::new();
/// query
///     .bool_query()
///     .unwrap()
///     .must()
///     .push(TermQuery::new("status", "failed"))
///     .unwrap();
///
/// // In boolean mode leaf constructors append to the open role
/// query.term("stage", "test").unwrap();
///
/// assert!(query.is_boolean());
/// assert_eq!(
///     query.to_dsl().unwrap(),
///     json!({"bool": {"must": [
///         {"term": {"status": {"value": "failed"}}},
///         {"term": {"stage": {"value": "test"}}}
///     ]}})
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct QueryClauses {
    top: TopLevel,
}

impl QueryClauses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no clause has been installed
    pub fn is_empty(&self) -> bool {
        matches!(self.top, TopLevel::Empty)
    }

    /// Check if the top-level clause is a bool query
    pub fn is_boolean(&self) -> bool {
        matches!(self.top, TopLevel::Boolean(_))
    }

    /// Copy of the top-level clause; leaves are shared, a bool query is deep-copied
    pub fn top_level(&self) -> Option<QueryClause> {
        match &self.top {
            TopLevel::Empty => None,
            TopLevel::Single(node) => Some(QueryClause::Node(node.clone())),
            TopLevel::Boolean(bool_query) => Some(QueryClause::Bool(bool_query.clone())),
        }
    }

    /// Add `clause` to the container
    ///
    /// An empty container installs it as the top-level clause. In boolean
    /// mode it is appended to the bool query's open role, failing with
    /// [`DslError::NoOpenRole`] if none is open. A container holding a single
    /// leaf fails with [`DslError::MultipleTopLevelClauses`].
    pub fn push(&mut self, clause: impl Into<QueryClause>) -> Result<&mut Self> {
        match self.top {
            TopLevel::Empty => self.top = TopLevel::from(clause.into()),
            TopLevel::Single(_) => return Err(DslError::MultipleTopLevelClauses),
            TopLevel::Boolean(ref mut bool_query) => {
                bool_query.push(clause)?;
            }
        }
        Ok(self)
    }

    fn push_node(&mut self, node: impl QueryNode + 'static) -> Result<&mut Self> {
        self.push(QueryClause::node(node))
    }

    pub fn term(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Result<&mut Self> {
        self.push_node(TermQuery::new(field, value))
    }

    pub fn terms<I, V>(&mut self, field: impl Into<String>, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push_node(TermsQuery::new(field, values))
    }

    pub fn range(&mut self, field: impl Into<String>, bounds: RangeBounds) -> Result<&mut Self> {
        let query = RangeQuery::new(field, bounds)?;
        self.push_node(query)
    }

    pub fn regexp(
        &mut self,
        field: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Result<&mut Self> {
        self.push_node(RegexpQuery::new(field, pattern))
    }

    pub fn wildcard(
        &mut self,
        field: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Result<&mut Self> {
        self.push_node(WildcardQuery::new(field, pattern))
    }

    pub fn exists(&mut self, field: impl Into<String>) -> Result<&mut Self> {
        self.push_node(ExistsQuery::new(field))
    }

    pub fn match_phrase(
        &mut self,
        field: impl Into<String>,
        phrase: impl Into<String>,
    ) -> Result<&mut Self> {
        self.push_node(MatchPhraseQuery::new(field, phrase))
    }

    /// Install a query string, optionally restricted to `fields`
    pub fn query_string(
        &mut self,
        query: impl Into<String>,
        fields: Option<QueryStringFields>,
    ) -> Result<&mut Self> {
        let mut node = QueryStringQuery::new(query);
        if let Some(fields) = fields {
            node = node.with_fields(fields);
        }
        self.push_node(node)
    }

    pub fn match_all(&mut self) -> Result<&mut Self> {
        self.push_node(MatchAllQuery)
    }

    pub fn match_none(&mut self) -> Result<&mut Self> {
        self.push_node(MatchNoneQuery)
    }

    /// Get the top-level bool query, creating it if the slot is empty
    ///
    /// Fails if the slot already holds a non-bool clause.
    pub fn bool_query(&mut self) -> Result<&mut BoolQuery> {
        if self.is_empty() {
            self.top = TopLevel::Boolean(BoolQuery::new());
        }
        match &mut self.top {
            TopLevel::Boolean(bool_query) => Ok(bool_query),
            _ => Err(DslError::MultipleTopLevelClauses),
        }
    }

    /// Populate `role` of the top-level bool query through `build`
    pub fn with_bool<F>(&mut self, role: BoolRole, build: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut BoolQuery) -> Result<()>,
    {
        self.bool_query()?.with_role(role, build)?;
        Ok(self)
    }

    /// Serialize the top-level clause; an empty container yields `match_all`
    pub fn to_dsl(&self) -> Result<Value> {
        match &self.top {
            TopLevel::Empty => Ok(MatchAllQuery.to_dsl()),
            TopLevel::Single(node) => Ok(node.to_dsl()),
            TopLevel::Boolean(bool_query) => bool_query.to_dsl(),
        }
    }

    /// Combine two containers into a new one
    ///
    /// An empty side contributes nothing. Otherwise both top-level clauses
    /// are placed under `must` of a new bool query, ours first.
    pub fn merge(&self, other: &QueryClauses) -> QueryClauses {
        match (self.top_level(), other.top_level()) {
            (None, None) => QueryClauses::new(),
            (Some(_), None) => self.clone(),
            (None, Some(_)) => other.clone(),
            (Some(ours), Some(theirs)) => {
                debug!(
                    left = ours.query_type(),
                    right = theirs.query_type(),
                    "merging query clauses under bool must"
                );
                QueryClauses {
                    top: TopLevel::Boolean(BoolQuery::from_role(
                        BoolRole::Must,
                        vec![ours, theirs],
                    )),
                }
            }
        }
    }

    /// Negated copy of this container, leaving it untouched
    pub fn negate(&self) -> QueryClauses {
        let mut negated = self.clone();
        negated.negate_mut();
        negated
    }

    /// Negate the top-level clause in place
    ///
    /// An empty container becomes `match_none`.
    pub fn negate_mut(&mut self) -> &mut Self {
        let negated = match mem::take(&mut self.top) {
            TopLevel::Empty => QueryClause::from(MatchNoneQuery),
            TopLevel::Single(node) => Negator::negate(QueryClause::Node(node)),
            TopLevel::Boolean(bool_query) => Negator::negate(QueryClause::Bool(bool_query)),
        };
        debug!(query_type = negated.query_type(), "negated top-level clause");
        self.top = TopLevel::from(negated);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_is_match_all() {
        let query = QueryClauses::new();
        assert!(query.is_empty());
        assert_eq!(query.to_dsl().unwrap(), json!({"match_all": {}}));
        assert!(query.is_empty());
    }

    #[test]
    fn test_single_clause() {
        let mut query = QueryClauses::new();
        query.exists("artifact").unwrap();
        assert_eq!(query.to_dsl().unwrap(), json!({"exists": {"field": "artifact"}}));
        assert!(!query.is_boolean());
    }

    #[test]
    fn test_second_clause_rejected() {
        let mut query = QueryClauses::new();
        query.term("a", "1").unwrap();
        let err = query.wildcard("b", "x*").unwrap_err();
        assert!(matches!(err, DslError::MultipleTopLevelClauses));
        assert!(err.to_string().contains("bool query"));
    }

    #[test]
    fn test_bool_query_is_reused() {
        let mut query = QueryClauses::new();
        query.bool_query().unwrap().must().push(TermQuery::new("a", "1")).unwrap();
        query.bool_query().unwrap().filter().push(TermQuery::new("b", "2")).unwrap();

        assert!(query.is_boolean());
        assert_eq!(
            query.to_dsl().unwrap(),
            json!({"bool": {
                "must": [{"term": {"a": {"value": "1"}}}],
                "filter": [{"term": {"b": {"value": "2"}}}]
            }})
        );
    }

    #[test]
    fn test_boolean_mode_routes_to_open_role() {
        let mut query = QueryClauses::new();
        query.bool_query().unwrap().filter();
        query.term("env", "prod").unwrap().exists("artifact").unwrap();
        query.bool_query().unwrap().must_not();
        query.wildcard("branch", "tmp-*").unwrap();

        assert_eq!(
            query.to_dsl().unwrap(),
            json!({"bool": {
                "filter": [
                    {"term": {"env": {"value": "prod"}}},
                    {"exists": {"field": "artifact"}}
                ],
                "must_not": [{"wildcard": {"branch": {"value": "tmp-*"}}}]
            }})
        );
    }

    #[test]
    fn test_boolean_mode_without_open_role() {
        let mut query = QueryClauses::new();
        query.bool_query().unwrap();
        assert!(matches!(query.term("a", "1"), Err(DslError::NoOpenRole)));
        assert!(matches!(query.to_dsl(), Err(DslError::EmptyBool)));
    }

    #[test]
    fn test_bool_query_over_leaf_rejected() {
        let mut query = QueryClauses::new();
        query.match_all().unwrap();
        assert!(matches!(
            query.bool_query(),
            Err(DslError::MultipleTopLevelClauses)
        ));
    }

    #[test]
    fn test_with_bool_block() {
        let mut query = QueryClauses::new();
        query
            .with_bool(BoolRole::Should, |b| {
                b.push(TermQuery::new("os", "linux"))?;
                Ok(())
            })
            .unwrap();
        assert_eq!(
            query.to_dsl().unwrap(),
            json!({"bool": {"should": [{"term": {"os": {"value": "linux"}}}]}})
        );
    }

    #[test]
    fn test_query_string_fields() {
        let mut query = QueryClauses::new();
        query
            .query_string("segfault", Some(QueryStringFields::from("log")))
            .unwrap();
        assert_eq!(
            query.to_dsl().unwrap(),
            json!({"query_string": {"query": "segfault", "fields": ["log"]}})
        );
    }

    #[test]
    fn test_merge_two_single_clauses() {
        let mut left = QueryClauses::new();
        left.term("user.name", "kimchy").unwrap();
        let mut right = QueryClauses::new();
        right.range("age", RangeBounds::new().gte(10).lte(20)).unwrap();

        let merged = left.merge(&right);
        assert_eq!(
            merged.to_dsl().unwrap(),
            json!({"bool": {"must": [
                {"term": {"user.name": {"value": "kimchy"}}},
                {"range": {"age": {"gte": 10, "lte": 20}}}
            ]}})
        );
    }

    #[test]
    fn test_merge_with_empty_side() {
        let mut left = QueryClauses::new();
        left.match_phrase("message", "disk full").unwrap();
        let empty = QueryClauses::new();

        assert_eq!(left.merge(&empty).to_dsl().unwrap(), left.to_dsl().unwrap());
        assert_eq!(empty.merge(&left).to_dsl().unwrap(), left.to_dsl().unwrap());
        assert!(empty.merge(&QueryClauses::new()).is_empty());
    }

    #[test]
    fn test_merge_does_not_alias_bool() {
        let mut left = QueryClauses::new();
        left.bool_query().unwrap().must().push(TermQuery::new("a", "1")).unwrap();
        let merged = left.merge(&QueryClauses::new());

        left.bool_query().unwrap().must().push(TermQuery::new("b", "2")).unwrap();
        assert_eq!(
            merged.to_dsl().unwrap(),
            json!({"bool": {"must": [{"term": {"a": {"value": "1"}}}]}})
        );
    }

    #[test]
    fn test_negate_empty() {
        let query = QueryClauses::new();
        assert_eq!(query.negate().to_dsl().unwrap(), json!({"match_none": {}}));
        assert!(query.is_empty());
    }

    #[test]
    fn test_negate_match_all_and_none() {
        let mut all = QueryClauses::new();
        all.match_all().unwrap();
        assert_eq!(all.negate().to_dsl().unwrap(), json!({"match_none": {}}));

        let mut none = QueryClauses::new();
        none.match_none().unwrap();
        assert_eq!(none.negate().to_dsl().unwrap(), json!({"match_all": {}}));
    }

    #[test]
    fn test_negate_leaves_receiver_untouched() {
        let mut query = QueryClauses::new();
        query.term("status", "ok").unwrap();
        let negated = query.negate();

        assert_eq!(
            query.to_dsl().unwrap(),
            json!({"term": {"status": {"value": "ok"}}})
        );
        assert_eq!(
            negated.to_dsl().unwrap(),
            json!({"bool": {"must_not": [{"term": {"status": {"value": "ok"}}}]}})
        );
    }

    #[test]
    fn test_negate_mut_in_place() {
        let mut query = QueryClauses::new();
        query.term("status", "ok").unwrap();
        query.negate_mut();
        assert!(query.is_boolean());
    }

    #[test]
    fn test_double_negation_is_not_identity() {
        let mut query = QueryClauses::new();
        query.regexp("branch", "feature/.*").unwrap();
        let twice = query.negate().negate();
        assert_ne!(twice.to_dsl().unwrap(), query.to_dsl().unwrap());
    }
}
