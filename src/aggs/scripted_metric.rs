//! Scripted metric aggregation - a metric computed by user scripts

use serde_json::{Map, Value};

use crate::aggs::AggregationNode;
use crate::script::Script;
use crate::Result;

/// Metric computed through the init/map/combine/reduce script phases
///
/// Scripts are shared, not copied, when the aggregation is cloned.
#[derive(Clone, Debug)]
pub struct ScriptedMetricAggregation {
    name: String,
    init_script: Option<Script>,
    map_script: Script,
    combine_script: Script,
    reduce_script: Script,
}

impl ScriptedMetricAggregation {
    pub fn new(
        name: impl Into<String>,
        map_script: Script,
        combine_script: Script,
        reduce_script: Script,
    ) -> Self {
        Self {
            name: name.into(),
            init_script: None,
            map_script,
            combine_script,
            reduce_script,
        }
    }

    /// Script run once per shard before any document is collected
    pub fn init_script(&mut self, script: Script) -> &mut Self {
        self.init_script = Some(script);
        self
    }
}

impl AggregationNode for ScriptedMetricAggregation {
    fn name(&self) -> &str {
        &self.name
    }

    fn agg_type(&self) -> &'static str {
        "scripted_metric"
    }

    fn body(&self) -> Result<Value> {
        let mut body = Map::new();
        if let Some(init) = &self.init_script {
            body.insert("init_script".to_string(), init.to_dsl());
        }
        body.insert("map_script".to_string(), self.map_script.to_dsl());
        body.insert("combine_script".to_string(), self.combine_script.to_dsl());
        body.insert("reduce_script".to_string(), self.reduce_script.to_dsl());
        Ok(Value::Object(body))
    }
}
