//! Boolean query - combines multiple clauses with AND, OR, NOT semantics

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::DslError;
use crate::query::ast::{single_key, QueryClause};
use crate::query::types::BoolRole;
use crate::Result;

/// Boolean query combining multiple clauses
///
/// The boolean query supports four roles:
/// - `must`: All clauses must match (AND). Contributes to score.
/// - `filter`: All clauses must match (AND). Does not contribute to score.
/// - `should`: At least one clause should match (OR). Contributes to score.
/// - `must_not`: No clause must match (NOT). Does not contribute to score.
///
/// Roles are kept in the order they were first opened. Clauses are added with
/// [`BoolQuery::push`] to whichever role was opened most recently.
///
/// # Example
///
/// ```rust
/// use queryforge::query::nodes::{BoolQuery, RangeQuery, TermQuery};
/// use queryforge::query::RangeBounds;
///
/// let mut query = BoolQuery::new();
/// query.must().push(TermQuery::new("status", "failed")).unwrap();
/// query
///     .filter()
///     .push(RangeQuery::new("duration", RangeBounds::new().gte(60)).unwrap())
///     .unwrap();
///
/// assert_eq!(query.clause_count(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct BoolQuery {
    roles: Vec<(BoolRole, Vec<QueryClause>)>,
    current: Option<BoolRole>,
}

impl BoolQuery {
    /// Create a new empty boolean query
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a query with a single opened role holding `clauses`
    pub fn from_role(role: BoolRole, clauses: Vec<QueryClause>) -> Self {
        Self {
            roles: vec![(role, clauses)],
            current: Some(role),
        }
    }

    /// Open `role`, creating it if needed, and make it the target of `push`
    pub fn open(&mut self, role: BoolRole) -> &mut Self {
        if self.position(role).is_none() {
            self.roles.push((role, Vec::new()));
        }
        self.current = Some(role);
        self
    }

    pub fn must(&mut self) -> &mut Self {
        self.open(BoolRole::Must)
    }

    pub fn filter(&mut self) -> &mut Self {
        self.open(BoolRole::Filter)
    }

    pub fn should(&mut self) -> &mut Self {
        self.open(BoolRole::Should)
    }

    pub fn must_not(&mut self) -> &mut Self {
        self.open(BoolRole::MustNot)
    }

    /// Open `role` and hand the query to `build` for populating it
    pub fn with_role<F>(&mut self, role: BoolRole, build: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut BoolQuery) -> Result<()>,
    {
        self.open(role);
        build(self)?;
        Ok(self)
    }

    /// Append a clause to the most recently opened role
    pub fn push(&mut self, clause: impl Into<QueryClause>) -> Result<&mut Self> {
        let role = self.current.ok_or(DslError::NoOpenRole)?;
        self.role_mut(role).push(clause.into());
        Ok(self)
    }

    /// Role that `push` currently appends to
    pub fn current_role(&self) -> Option<BoolRole> {
        self.current
    }

    /// Clauses of a role, if the role was opened
    pub fn clauses(&self, role: BoolRole) -> Option<&[QueryClause]> {
        self.position(role).map(|idx| self.roles[idx].1.as_slice())
    }

    /// Opened roles in the order they were first opened
    pub fn roles(&self) -> impl Iterator<Item = BoolRole> + '_ {
        self.roles.iter().map(|(role, _)| *role)
    }

    /// Check if no role was ever opened
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Get total number of clauses
    pub fn clause_count(&self) -> usize {
        self.roles.iter().map(|(_, clauses)| clauses.len()).sum()
    }

    /// Serialize into a `{"bool": {...}}` fragment
    pub fn to_dsl(&self) -> Result<Value> {
        if self.roles.is_empty() {
            return Err(DslError::EmptyBool);
        }

        let mut body = Map::new();
        for (role, clauses) in &self.roles {
            if clauses.is_empty() {
                return Err(DslError::EmptyBoolRole(*role));
            }
            let fragments = clauses
                .iter()
                .map(QueryClause::to_dsl)
                .collect::<Result<Vec<_>>>()?;
            body.insert(role.as_str().to_string(), Value::Array(fragments));
        }

        Ok(single_key("bool", Value::Object(body)))
    }

    /// Merge `other` into this query in place
    ///
    /// A bool clause has its roles unioned into this one, its clauses appended
    /// after ours role by role. Any other clause is appended to `must`.
    pub fn merge_mut(&mut self, other: &QueryClause) -> &mut Self {
        match other {
            QueryClause::Bool(other_bool) => self.merge_bool_mut(other_bool),
            clause => {
                trace!(query_type = clause.query_type(), "merging clause into bool must");
                self.role_mut(BoolRole::Must).push(clause.clone());
                self
            }
        }
    }

    /// Union the roles of `other` into this query in place
    pub fn merge_bool_mut(&mut self, other: &BoolQuery) -> &mut Self {
        trace!(
            roles = other.roles.len(),
            clauses = other.clause_count(),
            "merging bool query"
        );
        for (role, clauses) in &other.roles {
            self.role_mut(*role).extend(clauses.iter().cloned());
        }
        self
    }

    /// Merge `other` into a copy of this query
    pub fn merge(&self, other: &QueryClause) -> BoolQuery {
        let mut merged = self.clone();
        merged.merge_mut(other);
        merged
    }

    fn position(&self, role: BoolRole) -> Option<usize> {
        self.roles.iter().position(|(r, _)| *r == role)
    }

    // Creates the role without changing the open role.
    fn role_mut(&mut self, role: BoolRole) -> &mut Vec<QueryClause> {
        let idx = match self.position(role) {
            Some(idx) => idx,
            None => {
                self.roles.push((role, Vec::new()));
                self.roles.len() - 1
            }
        };
        &mut self.roles[idx].1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::MatchAllQuery;
    use crate::query::nodes::{ExistsQuery, TermQuery};
    use serde_json::json;

    fn term(field: &str, value: &str) -> QueryClause {
        QueryClause::from(TermQuery::new(field, value))
    }

    #[test]
    fn test_bool_query_creation() {
        let mut query = BoolQuery::new();
        query.must().push(term("status", "failed")).unwrap();
        query.should().push(term("tag", "flaky")).unwrap();
        query.must_not().push(ExistsQuery::new("retried_by")).unwrap();

        assert_eq!(query.clause_count(), 3);
        assert_eq!(query.current_role(), Some(BoolRole::MustNot));
        assert_eq!(
            query.roles().collect::<Vec<_>>(),
            vec![BoolRole::Must, BoolRole::Should, BoolRole::MustNot]
        );
    }

    #[test]
    fn test_bool_query_dsl() {
        let mut query = BoolQuery::new();
        query
            .filter()
            .push(term("stage", "test"))
            .unwrap()
            .push(term("branch", "main"))
            .unwrap();

        assert_eq!(
            query.to_dsl().unwrap(),
            json!({"bool": {"filter": [
                {"term": {"stage": {"value": "test"}}},
                {"term": {"branch": {"value": "main"}}}
            ]}})
        );
    }

    #[test]
    fn test_reopening_role_appends() {
        let mut query = BoolQuery::new();
        query.must().push(term("a", "1")).unwrap();
        query.filter().push(term("b", "2")).unwrap();
        query.must().push(term("c", "3")).unwrap();

        assert_eq!(query.clauses(BoolRole::Must).unwrap().len(), 2);
        assert_eq!(query.roles().count(), 2);
    }

    #[test]
    fn test_push_without_role_fails() {
        let mut query = BoolQuery::new();
        let err = query.push(term("a", "1")).unwrap_err();
        assert!(matches!(err, DslError::NoOpenRole));
    }

    #[test]
    fn test_empty_bool_fails() {
        let query = BoolQuery::new();
        assert!(matches!(query.to_dsl(), Err(DslError::EmptyBool)));
    }

    #[test]
    fn test_opened_but_empty_role_fails() {
        let mut query = BoolQuery::new();
        query.must().push(term("a", "1")).unwrap();
        query.should();
        assert!(matches!(
            query.to_dsl(),
            Err(DslError::EmptyBoolRole(BoolRole::Should))
        ));
    }

    #[test]
    fn test_with_role_block() {
        let mut query = BoolQuery::new();
        query
            .with_role(BoolRole::Should, |b| {
                b.push(term("os", "linux"))?;
                b.push(term("os", "macos"))?;
                Ok(())
            })
            .unwrap();
        assert_eq!(query.clauses(BoolRole::Should).unwrap().len(), 2);
    }

    #[test]
    fn test_merge_disjoint_roles() {
        let mut left = BoolQuery::new();
        left.must().push(term("a", "1")).unwrap();
        let mut right = BoolQuery::new();
        right.filter().push(term("b", "2")).unwrap();

        let merged = left.merge(&QueryClause::Bool(right));
        assert_eq!(
            merged.to_dsl().unwrap(),
            json!({"bool": {
                "must": [{"term": {"a": {"value": "1"}}}],
                "filter": [{"term": {"b": {"value": "2"}}}]
            }})
        );
        assert_eq!(left.clause_count(), 1);
    }

    #[test]
    fn test_merge_overlapping_roles() {
        let mut left = BoolQuery::new();
        left.must().push(term("a", "1")).unwrap();
        let mut right = BoolQuery::new();
        right.must().push(term("b", "2")).unwrap();

        let merged = left.merge(&QueryClause::Bool(right));
        assert_eq!(
            merged.to_dsl().unwrap(),
            json!({"bool": {"must": [
                {"term": {"a": {"value": "1"}}},
                {"term": {"b": {"value": "2"}}}
            ]}})
        );
    }

    #[test]
    fn test_merge_leaf_goes_to_must() {
        let mut query = BoolQuery::new();
        query.should().push(term("a", "1")).unwrap();
        query.merge_mut(&QueryClause::from(MatchAllQuery));

        assert_eq!(query.clauses(BoolRole::Must).unwrap().len(), 1);
        assert_eq!(query.current_role(), Some(BoolRole::Should));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = BoolQuery::new();
        original.must().push(term("a", "1")).unwrap();

        let mut cloned = original.clone();
        cloned.must().push(term("b", "2")).unwrap();

        assert_eq!(original.clause_count(), 1);
        assert_eq!(cloned.clause_count(), 2);
    }
}
