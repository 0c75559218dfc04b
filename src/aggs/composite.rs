//! Composite aggregation - multi-source buckets that can be paged through

use serde_json::{Map, Value};

use crate::aggs::{AggregationNode, Aggregations, NestableAggregation};
use crate::builder::SortOrder;
use crate::error::DslError;
use crate::query::ast::single_key;
use crate::Result;

/// How a composite source derives its bucket key
#[derive(Clone, Debug, PartialEq)]
pub enum CompositeSourceKind {
    Terms {
        field: String,
        order: Option<SortOrder>,
    },
    Histogram {
        field: String,
        interval: f64,
    },
    DateHistogram {
        field: String,
        calendar_interval: String,
        format: Option<String>,
    },
}

/// A named value source of a composite aggregation
#[derive(Clone, Debug, PartialEq)]
pub struct CompositeSource {
    pub name: String,
    pub kind: CompositeSourceKind,
}

impl CompositeSource {
    fn to_dsl(&self) -> Value {
        let mut body = Map::new();
        let kind = match &self.kind {
            CompositeSourceKind::Terms { field, order } => {
                body.insert("field".to_string(), Value::from(field.as_str()));
                if let Some(order) = order {
                    body.insert("order".to_string(), Value::from(order.as_str()));
                }
                "terms"
            }
            CompositeSourceKind::Histogram { field, interval } => {
                body.insert("field".to_string(), Value::from(field.as_str()));
                body.insert("interval".to_string(), Value::from(*interval));
                "histogram"
            }
            CompositeSourceKind::DateHistogram {
                field,
                calendar_interval,
                format,
            } => {
                body.insert("field".to_string(), Value::from(field.as_str()));
                body.insert(
                    "calendar_interval".to_string(),
                    Value::from(calendar_interval.as_str()),
                );
                if let Some(format) = format {
                    body.insert("format".to_string(), Value::from(format.as_str()));
                }
                "date_histogram"
            }
        };
        single_key(self.name.clone(), single_key(kind, Value::Object(body)))
    }
}

/// Ordered list of sources handed to the composite builder closure
#[derive(Clone, Debug, Default)]
pub struct CompositeSources {
    sources: Vec<CompositeSource>,
}

impl CompositeSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompositeSource> {
        self.sources.iter()
    }

    pub fn push(&mut self, source: CompositeSource) -> &mut Self {
        self.sources.push(source);
        self
    }

    pub fn terms(&mut self, name: impl Into<String>, field: impl Into<String>) -> &mut Self {
        self.push(CompositeSource {
            name: name.into(),
            kind: CompositeSourceKind::Terms {
                field: field.into(),
                order: None,
            },
        })
    }

    pub fn terms_ordered(
        &mut self,
        name: impl Into<String>,
        field: impl Into<String>,
        order: SortOrder,
    ) -> &mut Self {
        self.push(CompositeSource {
            name: name.into(),
            kind: CompositeSourceKind::Terms {
                field: field.into(),
                order: Some(order),
            },
        })
    }

    pub fn histogram(
        &mut self,
        name: impl Into<String>,
        field: impl Into<String>,
        interval: f64,
    ) -> &mut Self {
        self.push(CompositeSource {
            name: name.into(),
            kind: CompositeSourceKind::Histogram {
                field: field.into(),
                interval,
            },
        })
    }

    pub fn date_histogram(
        &mut self,
        name: impl Into<String>,
        field: impl Into<String>,
        calendar_interval: impl Into<String>,
        format: Option<String>,
    ) -> &mut Self {
        self.push(CompositeSource {
            name: name.into(),
            kind: CompositeSourceKind::DateHistogram {
                field: field.into(),
                calendar_interval: calendar_interval.into(),
                format,
            },
        })
    }
}

/// Bucket aggregation keyed by the combination of several sources
#[derive(Clone, Debug)]
pub struct CompositeAggregation {
    name: String,
    sources: CompositeSources,
    size: Option<u64>,
    children: Option<Aggregations>,
}

impl CompositeAggregation {
    /// Create a composite aggregation, letting `build` add its sources
    ///
    /// At least one source is required.
    pub fn new<F>(name: impl Into<String>, build: F) -> Result<Self>
    where
        F: FnOnce(&mut CompositeSources) -> Result<()>,
    {
        let name = name.into();
        let mut sources = CompositeSources::new();
        build(&mut sources)?;
        if sources.is_empty() {
            return Err(DslError::invalid_argument(format!(
                "composite aggregation `{}` requires at least one source",
                name
            )));
        }
        Ok(Self {
            name,
            sources,
            size: None,
            children: None,
        })
    }

    pub fn sources(&self) -> &CompositeSources {
        &self.sources
    }

    pub fn sources_mut(&mut self) -> &mut CompositeSources {
        &mut self.sources
    }

    /// Number of composite buckets per page
    pub fn size(&mut self, size: u64) -> &mut Self {
        self.size = Some(size);
        self
    }
}

impl AggregationNode for CompositeAggregation {
    fn name(&self) -> &str {
        &self.name
    }

    fn agg_type(&self) -> &'static str {
        "composite"
    }

    fn body(&self) -> Result<Value> {
        let mut body = Map::new();
        body.insert(
            "sources".to_string(),
            Value::Array(self.sources.iter().map(CompositeSource::to_dsl).collect()),
        );
        if let Some(size) = self.size {
            body.insert("size".to_string(), Value::from(size));
        }
        Ok(Value::Object(body))
    }
}

impl NestableAggregation for CompositeAggregation {
    fn children(&self) -> Option<&Aggregations> {
        self.children.as_ref()
    }

    fn children_slot(&mut self) -> &mut Option<Aggregations> {
        &mut self.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_composite_body() {
        let mut agg = CompositeAggregation::new("by_job_and_day", |s| {
            s.terms("job", "job.name")
                .date_histogram("day", "finished_at", "day", None)
                .histogram("bucket", "duration", 60.0);
            Ok(())
        })
        .unwrap();
        agg.size(100);

        assert_eq!(
            agg.body().unwrap(),
            json!({
                "sources": [
                    {"job": {"terms": {"field": "job.name"}}},
                    {"day": {"date_histogram": {"field": "finished_at", "calendar_interval": "day"}}},
                    {"bucket": {"histogram": {"field": "duration", "interval": 60.0}}}
                ],
                "size": 100
            })
        );
    }

    #[test]
    fn test_terms_source_order() {
        let agg = CompositeAggregation::new("c", |s| {
            s.terms_ordered("job", "job.name", SortOrder::Desc);
            Ok(())
        })
        .unwrap();
        assert_eq!(
            agg.body().unwrap()["sources"][0],
            json!({"job": {"terms": {"field": "job.name", "order": "desc"}}})
        );
    }

    #[test]
    fn test_requires_source() {
        let err = CompositeAggregation::new("c", |_| Ok(())).unwrap_err();
        assert!(matches!(err, DslError::InvalidArgument(_)));
    }

    #[test]
    fn test_clone_copies_sources() {
        let original = CompositeAggregation::new("c", |s| {
            s.terms("job", "job.name");
            Ok(())
        })
        .unwrap();

        let mut cloned = original.clone();
        cloned.sources_mut().terms("stage", "stage");

        assert_eq!(original.sources().len(), 1);
        assert_eq!(cloned.sources().len(), 2);
    }
}
