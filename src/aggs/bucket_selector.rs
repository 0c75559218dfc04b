//! Bucket selector pipeline aggregation - drops parent buckets by script

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::aggs::AggregationNode;
use crate::script::Script;
use crate::Result;

/// Policy for buckets with missing values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    Skip,
    InsertZeros,
    KeepValues,
}

impl GapPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapPolicy::Skip => "skip",
            GapPolicy::InsertZeros => "insert_zeros",
            GapPolicy::KeepValues => "keep_values",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BucketSelectorAggregation {
    name: String,
    buckets_path: Map<String, Value>,
    script: Script,
    gap_policy: Option<GapPolicy>,
}

impl BucketSelectorAggregation {
    /// Create a selector; `buckets_path` maps script variables to metric paths
    pub fn new<K, V, I>(name: impl Into<String>, buckets_path: I, script: Script) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            name: name.into(),
            buckets_path: buckets_path
                .into_iter()
                .map(|(var, path)| (var.into(), Value::String(path.into())))
                .collect(),
            script,
            gap_policy: None,
        }
    }

    pub fn gap_policy(&mut self, policy: GapPolicy) -> &mut Self {
        self.gap_policy = Some(policy);
        self
    }
}

impl AggregationNode for BucketSelectorAggregation {
    fn name(&self) -> &str {
        &self.name
    }

    fn agg_type(&self) -> &'static str {
        "bucket_selector"
    }

    fn body(&self) -> Result<Value> {
        let mut body = Map::new();
        body.insert(
            "buckets_path".to_string(),
            Value::Object(self.buckets_path.clone()),
        );
        body.insert("script".to_string(), self.script.to_dsl());
        if let Some(policy) = self.gap_policy {
            body.insert("gap_policy".to_string(), Value::from(policy.as_str()));
        }
        Ok(Value::Object(body))
    }
}
