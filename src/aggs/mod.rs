//! Aggregation construction
//!
//! An [`Aggregations`] container holds named aggregation nodes in insertion
//! order. Bucket-style aggregations implement [`NestableAggregation`] and can
//! carry their own nested container; metric aggregations do not implement it
//! and so expose no way to add children.
//!
//! # Example
//!
//! ```rust
//! use queryforge::aggs::{Aggregations, NestableAggregation};
//! use serde_json::json;
//!
//! let mut aggs = Aggregations::new();
//! aggs.terms("build_jobs", "job.name").aggs().avg("avg_runtime", "duration");
//!
//! assert_eq!(
//!     serde_json::Value::Object(aggs.to_dsl().unwrap()),
//!     json!({"build_jobs": {
//!         "terms": {"field": "job.name"},
//!         "aggs": {"avg_runtime": {"avg": {"field": "duration"}}}
//!     }})
//! );
//! ```

mod bucket_selector;
mod composite;
mod date_histogram;
mod filter;
mod metrics;
mod scripted_metric;
mod terms;
mod top_hits;

pub use bucket_selector::{BucketSelectorAggregation, GapPolicy};
pub use composite::{CompositeAggregation, CompositeSource, CompositeSourceKind, CompositeSources};
pub use date_histogram::DateHistogramAggregation;
pub use filter::FilterAggregation;
pub use metrics::{
    AvgAggregation, CardinalityAggregation, MaxAggregation, SumAggregation, ValueCountAggregation,
};
pub use scripted_metric::ScriptedMetricAggregation;
pub use terms::{TermsAggregation, TermsSource};
pub use top_hits::TopHitsAggregation;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::DslError;
use crate::query::QueryClauses;
use crate::script::Script;
use crate::Result;

/// Behaviour shared by every aggregation node
pub trait AggregationNode {
    /// Caller-chosen key of this aggregation in the request
    fn name(&self) -> &str;

    /// DSL aggregation type, e.g. `terms` or `avg`
    fn agg_type(&self) -> &'static str;

    /// Body placed under the `agg_type` key
    fn body(&self) -> Result<Value>;
}

/// Aggregations that accept nested sub-aggregations
pub trait NestableAggregation: AggregationNode {
    /// Nested container, if one was created
    fn children(&self) -> Option<&Aggregations>;

    /// Storage for the lazily created nested container
    fn children_slot(&mut self) -> &mut Option<Aggregations>;

    /// Nested container, created on first access
    fn aggs(&mut self) -> &mut Aggregations {
        if self.children_slot().is_none() {
            trace!(name = self.name(), "creating nested aggregations");
        }
        self.children_slot().get_or_insert_with(Aggregations::new)
    }

    /// Populate the nested container through `build`
    fn with_aggs<F>(&mut self, build: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Aggregations) -> Result<()>,
        Self: Sized,
    {
        build(self.aggs())?;
        Ok(self)
    }
}

/// Any aggregation node
#[derive(Clone, Debug)]
pub enum Aggregation {
    Terms(TermsAggregation),
    Avg(AvgAggregation),
    Sum(SumAggregation),
    Max(MaxAggregation),
    ValueCount(ValueCountAggregation),
    Cardinality(CardinalityAggregation),
    TopHits(TopHitsAggregation),
    Filter(FilterAggregation),
    Composite(CompositeAggregation),
    DateHistogram(DateHistogramAggregation),
    ScriptedMetric(ScriptedMetricAggregation),
    BucketSelector(BucketSelectorAggregation),
}

macro_rules! each_variant {
    ($value:expr, $agg:ident => $body:expr) => {
        match $value {
            Aggregation::Terms($agg) => $body,
            Aggregation::Avg($agg) => $body,
            Aggregation::Sum($agg) => $body,
            Aggregation::Max($agg) => $body,
            Aggregation::ValueCount($agg) => $body,
            Aggregation::Cardinality($agg) => $body,
            Aggregation::TopHits($agg) => $body,
            Aggregation::Filter($agg) => $body,
            Aggregation::Composite($agg) => $body,
            Aggregation::DateHistogram($agg) => $body,
            Aggregation::ScriptedMetric($agg) => $body,
            Aggregation::BucketSelector($agg) => $body,
        }
    };
}

macro_rules! each_nestable {
    ($value:expr, $agg:ident => $nested:expr, $leaf:ident => $other:expr) => {
        match $value {
            Aggregation::Terms($agg) => $nested,
            Aggregation::TopHits($agg) => $nested,
            Aggregation::Filter($agg) => $nested,
            Aggregation::Composite($agg) => $nested,
            Aggregation::DateHistogram($agg) => $nested,
            $leaf => $other,
        }
    };
}

impl Aggregation {
    pub fn name(&self) -> &str {
        each_variant!(self, agg => agg.name())
    }

    pub fn agg_type(&self) -> &'static str {
        each_variant!(self, agg => agg.agg_type())
    }

    /// Check if this aggregation type accepts nested aggregations
    pub fn is_nestable(&self) -> bool {
        each_nestable!(self, _agg => true, _leaf => false)
    }

    /// Nested container, if this is a nestable aggregation that has one
    pub fn children(&self) -> Option<&Aggregations> {
        each_nestable!(self, agg => agg.children(), _leaf => None)
    }

    /// Nested container, created on first access
    ///
    /// Fails with [`DslError::NotNestable`] for metric aggregations.
    pub fn aggs(&mut self) -> Result<&mut Aggregations> {
        each_nestable!(self, agg => Ok(agg.aggs()), leaf => Err(DslError::NotNestable {
            name: leaf.name().to_string(),
            agg_type: leaf.agg_type(),
        }))
    }

    /// Serialize into the value stored under this aggregation's name
    pub fn to_dsl(&self) -> Result<Value> {
        let mut fragment = Map::new();
        fragment.insert(self.agg_type().to_string(), each_variant!(self, agg => agg.body())?);
        if let Some(children) = self.children().filter(|c| c.any()) {
            fragment.insert("aggs".to_string(), Value::Object(children.to_dsl()?));
        }
        Ok(Value::Object(fragment))
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Aggregation {
                fn from(agg: $ty) -> Self {
                    Aggregation::$variant(agg)
                }
            }
        )*
    };
}

impl_from_variant!(
    Terms(TermsAggregation),
    Avg(AvgAggregation),
    Sum(SumAggregation),
    Max(MaxAggregation),
    ValueCount(ValueCountAggregation),
    Cardinality(CardinalityAggregation),
    TopHits(TopHitsAggregation),
    Filter(FilterAggregation),
    Composite(CompositeAggregation),
    DateHistogram(DateHistogramAggregation),
    ScriptedMetric(ScriptedMetricAggregation),
    BucketSelector(BucketSelectorAggregation),
);

// Appends a node and hands back a typed reference to it.
macro_rules! push_variant {
    ($items:expr, $variant:ident, $agg:expr) => {{
        $items.push(Aggregation::$variant($agg));
        match $items.last_mut() {
            Some(Aggregation::$variant(agg)) => agg,
            _ => unreachable!("last item was just pushed"),
        }
    }};
}

/// Ordered collection of named aggregations
///
/// Names are not unique; when two items share a name the later one wins in
/// the serialized mapping while both stay in the list.
#[derive(Clone, Debug, Default)]
pub struct Aggregations {
    items: Vec<Aggregation>,
}

impl Aggregations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check if at least one aggregation was added
    pub fn any(&self) -> bool {
        !self.items.is_empty()
    }

    /// Check if no aggregation was added
    pub fn none(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aggregation> {
        self.items.iter()
    }

    /// Last aggregation added under `name`
    pub fn get(&self, name: &str) -> Option<&Aggregation> {
        self.items.iter().rev().find(|agg| agg.name() == name)
    }

    /// Mutable access to the last aggregation added under `name`
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Aggregation> {
        self.items.iter_mut().rev().find(|agg| agg.name() == name)
    }

    /// Append an already built aggregation
    pub fn push(&mut self, agg: impl Into<Aggregation>) -> &mut Aggregation {
        self.items.push(agg.into());
        let last = self.items.len() - 1;
        &mut self.items[last]
    }

    /// Terms aggregation over a field
    pub fn terms(&mut self, name: impl Into<String>, field: impl Into<String>) -> &mut TermsAggregation {
        push_variant!(self.items, Terms, TermsAggregation::with_field(name, field))
    }

    /// Terms aggregation over a script
    pub fn terms_script(&mut self, name: impl Into<String>, script: Script) -> &mut TermsAggregation {
        push_variant!(self.items, Terms, TermsAggregation::with_script(name, script))
    }

    pub fn avg(&mut self, name: impl Into<String>, field: impl Into<String>) -> &mut AvgAggregation {
        push_variant!(self.items, Avg, AvgAggregation::new(name, field))
    }

    pub fn sum(&mut self, name: impl Into<String>, field: impl Into<String>) -> &mut SumAggregation {
        push_variant!(self.items, Sum, SumAggregation::new(name, field))
    }

    pub fn max(&mut self, name: impl Into<String>, field: impl Into<String>) -> &mut MaxAggregation {
        push_variant!(self.items, Max, MaxAggregation::new(name, field))
    }

    pub fn value_count(
        &mut self,
        name: impl Into<String>,
        field: impl Into<String>,
    ) -> &mut ValueCountAggregation {
        push_variant!(self.items, ValueCount, ValueCountAggregation::new(name, field))
    }

    pub fn cardinality(
        &mut self,
        name: impl Into<String>,
        field: impl Into<String>,
    ) -> &mut CardinalityAggregation {
        push_variant!(self.items, Cardinality, CardinalityAggregation::new(name, field))
    }

    pub fn top_hits(&mut self, name: impl Into<String>, size: u64) -> &mut TopHitsAggregation {
        push_variant!(self.items, TopHits, TopHitsAggregation::new(name, size))
    }

    /// Filter aggregation whose query is populated by `build`
    pub fn filter<F>(&mut self, name: impl Into<String>, build: F) -> Result<&mut FilterAggregation>
    where
        F: FnOnce(&mut QueryClauses) -> Result<()>,
    {
        let agg = FilterAggregation::new(name, build)?;
        Ok(push_variant!(self.items, Filter, agg))
    }

    /// Composite aggregation whose sources are populated by `build`
    pub fn composite<F>(
        &mut self,
        name: impl Into<String>,
        build: F,
    ) -> Result<&mut CompositeAggregation>
    where
        F: FnOnce(&mut CompositeSources) -> Result<()>,
    {
        let agg = CompositeAggregation::new(name, build)?;
        Ok(push_variant!(self.items, Composite, agg))
    }

    pub fn date_histogram(
        &mut self,
        name: impl Into<String>,
        field: impl Into<String>,
        calendar_interval: impl Into<String>,
    ) -> &mut DateHistogramAggregation {
        push_variant!(
            self.items,
            DateHistogram,
            DateHistogramAggregation::new(name, field, calendar_interval)
        )
    }

    pub fn scripted_metric(
        &mut self,
        name: impl Into<String>,
        map_script: Script,
        combine_script: Script,
        reduce_script: Script,
    ) -> &mut ScriptedMetricAggregation {
        push_variant!(
            self.items,
            ScriptedMetric,
            ScriptedMetricAggregation::new(name, map_script, combine_script, reduce_script)
        )
    }

    /// Bucket selector keeping parent buckets for which `script` holds
    pub fn bucket_selector<K, V, I>(
        &mut self,
        name: impl Into<String>,
        buckets_path: I,
        script: Script,
    ) -> &mut BucketSelectorAggregation
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        push_variant!(
            self.items,
            BucketSelector,
            BucketSelectorAggregation::new(name, buckets_path, script)
        )
    }

    /// Serialize into a name -> fragment mapping
    pub fn to_dsl(&self) -> Result<Map<String, Value>> {
        let mut map = Map::new();
        for agg in &self.items {
            map.insert(agg.name().to_string(), agg.to_dsl()?);
        }
        Ok(map)
    }

    /// New container holding copies of our items followed by copies of `other`'s
    pub fn merge(&self, other: &Aggregations) -> Aggregations {
        debug!(
            left = self.items.len(),
            right = other.items.len(),
            "merging aggregations"
        );
        let mut items = Vec::with_capacity(self.items.len() + other.items.len());
        items.extend(self.items.iter().cloned());
        items.extend(other.items.iter().cloned());
        Aggregations { items }
    }
}
