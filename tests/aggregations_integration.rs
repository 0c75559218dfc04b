//! Integration tests for aggregation trees
//!
//! Covers nesting, leaf restrictions, construction errors and clone isolation.

use queryforge::aggs::{Aggregation, GapPolicy, TermsAggregation};
use queryforge::{Aggregations, DslError, NestableAggregation, QueryBuilder, Script, SortOrder};
use serde_json::json;

fn leaf_aggregations() -> Aggregations {
    let mut aggs = Aggregations::new();
    aggs.avg("avg", "duration");
    aggs.sum("sum", "duration");
    aggs.max("max", "duration");
    aggs.value_count("count", "id");
    aggs.cardinality("distinct", "job.name");
    aggs.scripted_metric(
        "profit",
        Script::new("state.values.add(doc.amount.value)"),
        Script::new("return state.values"),
        Script::new("return states.size()"),
    );
    aggs.bucket_selector(
        "slow",
        [("avg", "avg_runtime")],
        Script::new("params.avg > 60"),
    );
    aggs
}

#[test]
fn test_any_and_none() {
    let mut aggs = Aggregations::new();
    assert!(aggs.none());
    assert!(!aggs.any());

    aggs.avg("x", "p");
    assert!(aggs.any());
    assert!(!aggs.none());
}

#[test]
fn test_leaf_aggregations_reject_children() {
    let mut aggs = leaf_aggregations();
    for name in ["avg", "sum", "max", "count", "distinct", "profit", "slow"] {
        let agg = aggs.get_mut(name).unwrap();
        let agg_type = agg.agg_type();
        match agg.aggs() {
            Err(DslError::NotNestable { name: n, agg_type: t }) => {
                assert_eq!(n, name);
                assert_eq!(t, agg_type);
            }
            other => panic!("{} should not be nestable, got {:?}", name, other.map(|_| ())),
        }
    }
}

#[test]
fn test_terms_requires_exactly_one_source() {
    let err = TermsAggregation::new("n", None, None).unwrap_err();
    assert!(matches!(err, DslError::InvalidArgument(_)));

    let err = TermsAggregation::new("n", Some("f".to_string()), Some(Script::new("1")))
        .unwrap_err();
    assert!(matches!(err, DslError::InvalidArgument(_)));

    assert!(TermsAggregation::new("n", Some("f".to_string()), None).is_ok());
}

#[test]
fn test_nested_terms_avg() {
    let mut request = QueryBuilder::new();
    request
        .aggregations_mut()
        .terms("build_jobs", "x")
        .with_aggs(|a| {
            a.avg("avg_runtime", "y");
            Ok(())
        })
        .unwrap();

    assert_eq!(
        request.to_dsl().unwrap()["aggs"],
        json!({"build_jobs": {
            "terms": {"field": "x"},
            "aggs": {"avg_runtime": {"avg": {"field": "y"}}}
        }})
    );
}

#[test]
fn test_duplicate_names_last_wins() {
    let mut aggs = Aggregations::new();
    aggs.avg("metric", "a");
    aggs.max("metric", "b");

    assert_eq!(aggs.len(), 2);
    assert_eq!(
        aggs.to_dsl().unwrap(),
        json!({"metric": {"max": {"field": "b"}}}).as_object().unwrap().clone()
    );
}

#[test]
fn test_pipeline_under_date_histogram() {
    let mut aggs = Aggregations::new();
    let per_day = aggs.date_histogram("per_day", "finished_at", "day");
    per_day.format("yyyy-MM-dd");
    let nested = per_day.aggs();
    nested.avg("avg_runtime", "duration");
    nested
        .bucket_selector(
            "slow_days",
            [("avg", "avg_runtime")],
            Script::new("params.avg > 60"),
        )
        .gap_policy(GapPolicy::Skip);

    assert_eq!(
        Aggregation::to_dsl(aggs.get("per_day").unwrap()).unwrap(),
        json!({
            "date_histogram": {"field": "finished_at", "calendar_interval": "day", "format": "yyyy-MM-dd"},
            "aggs": {
                "avg_runtime": {"avg": {"field": "duration"}},
                "slow_days": {"bucket_selector": {
                    "buckets_path": {"avg": "avg_runtime"},
                    "script": {"source": "params.avg > 60", "lang": "painless"},
                    "gap_policy": "skip"
                }}
            }
        })
    );
}

#[test]
fn test_composite_requires_sources() {
    let mut aggs = Aggregations::new();
    assert!(aggs.composite("pages", |_| Ok(())).is_err());
    assert!(aggs.none());

    aggs.composite("pages", |s| {
        s.terms("job", "job.name").terms_ordered("status", "status", SortOrder::Desc);
        Ok(())
    })
    .unwrap()
    .size(100);

    assert_eq!(
        aggs.to_dsl().unwrap()["pages"],
        json!({"composite": {
            "sources": [
                {"job": {"terms": {"field": "job.name"}}},
                {"status": {"terms": {"field": "status", "order": "desc"}}}
            ],
            "size": 100
        }})
    );
}

#[test]
fn test_filter_error_from_builder_propagates() {
    let mut aggs = Aggregations::new();
    let err = aggs
        .filter("failed", |q| {
            q.term("status", "failed")?;
            q.exists("error")?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, DslError::MultipleTopLevelClauses));
    assert!(aggs.is_empty());
}

#[test]
fn test_composite_and_filter_clone_independent() {
    let mut aggs = Aggregations::new();
    aggs.composite("pages", |s| {
        s.terms("job", "job.name");
        Ok(())
    })
    .unwrap();
    aggs.filter("failed", |q| {
        q.term("status", "failed")?;
        Ok(())
    })
    .unwrap();
    let snapshot = aggs.to_dsl().unwrap();

    let mut cloned = aggs.clone();
    if let Some(Aggregation::Composite(composite)) = cloned.get_mut("pages") {
        composite.sources_mut().histogram("duration", "duration", 60.0);
        composite.aggs().max("longest", "duration");
    } else {
        panic!("expected composite aggregation");
    }
    if let Some(Aggregation::Filter(filter)) = cloned.get_mut("failed") {
        filter.query_mut().negate_mut();
    } else {
        panic!("expected filter aggregation");
    }

    assert_eq!(aggs.to_dsl().unwrap(), snapshot);
    assert_ne!(cloned.to_dsl().unwrap(), snapshot);

    let cloned_snapshot = cloned.to_dsl().unwrap();
    if let Some(Aggregation::Filter(filter)) = aggs.get_mut("failed") {
        filter.aggs().top_hits("latest", 1);
    }
    assert_eq!(cloned.to_dsl().unwrap(), cloned_snapshot);
}

#[test]
fn test_merge_keeps_receiver_first_and_copies() {
    let mut left = Aggregations::new();
    left.terms("jobs", "job.name").aggs().avg("runtime", "duration");
    let mut right = Aggregations::new();
    right.cardinality("hosts", "host");

    let mut merged = left.merge(&right);
    let names: Vec<&str> = merged.iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["jobs", "hosts"]);

    merged.get_mut("jobs").unwrap().aggs().unwrap().sum("total", "duration");
    assert_eq!(left.get("jobs").unwrap().children().unwrap().len(), 1);
}

#[test]
fn test_terms_over_script_with_params() {
    let mut params = serde_json::Map::new();
    params.insert("prefix".to_string(), json!("ci-"));
    let script = Script::new("params.prefix + doc['host'].value").with_params(params);

    let mut aggs = Aggregations::new();
    aggs.terms_script("hosts", script.clone())
        .size(5)
        .order("_count", SortOrder::Desc);

    assert_eq!(
        aggs.to_dsl().unwrap()["hosts"],
        json!({"terms": {
            "script": {
                "source": "params.prefix + doc['host'].value",
                "lang": "painless",
                "params": {"prefix": "ci-"}
            },
            "size": 5,
            "order": {"_count": "desc"}
        }})
    );
}
