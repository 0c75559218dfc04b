use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use queryforge::{QueryBuilder, RangeBounds, RangeValue, RequestSettings, SortOrder};
use serde_json::Value;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "queryforge")]
#[command(about = "Assemble Elasticsearch-compatible search request bodies", long_about = None)]
struct Args {
    /// Offset of the first hit
    #[arg(long)]
    from: Option<u64>,

    /// Number of hits to return
    #[arg(long)]
    size: Option<u64>,

    /// Page size used when --size is not given
    #[arg(long, env = "QUERYFORGE_DEFAULT_SIZE")]
    default_size: Option<u64>,

    /// Upper limit for from + size
    #[arg(long, env = "QUERYFORGE_MAX_WINDOW", default_value = "10000")]
    max_window: u64,

    /// Comma-separated list of source fields, or `false` to disable the source
    #[arg(long, value_delimiter = ',')]
    source: Vec<String>,

    /// Term filter as field=value (repeatable)
    #[arg(long = "term", value_name = "FIELD=VALUE")]
    terms: Vec<String>,

    /// Range filter as field:op=value[,op=value] with op in gt, gte, lt, lte (repeatable)
    #[arg(long = "range", value_name = "FIELD:OP=VALUE")]
    ranges: Vec<String>,

    /// Require the field to be present (repeatable)
    #[arg(long = "exists", value_name = "FIELD")]
    exists: Vec<String>,

    /// Query string expression
    #[arg(long)]
    query_string: Option<String>,

    /// Sort as field[:asc|desc] (repeatable)
    #[arg(long = "sort", value_name = "FIELD[:ORDER]")]
    sorts: Vec<String>,

    /// Collapse hits on this field
    #[arg(long)]
    collapse: Option<String>,

    /// Negate the combined query
    #[arg(long)]
    negate: bool,

    /// Terms aggregation as name=field (repeatable)
    #[arg(long = "terms-agg", value_name = "NAME=FIELD")]
    terms_aggs: Vec<String>,

    /// Avg aggregation as name=field (repeatable)
    #[arg(long = "avg-agg", value_name = "NAME=FIELD")]
    avg_aggs: Vec<String>,

    /// Script language for scripted parts of the request
    #[arg(long, env = "QUERYFORGE_SCRIPT_LANG", default_value = "painless")]
    script_lang: String,

    /// Pretty-print the request body
    #[arg(long, env = "QUERYFORGE_PRETTY")]
    pretty: bool,
}

fn split_pair<'a>(raw: &'a str, sep: char, what: &str) -> Result<(&'a str, &'a str)> {
    raw.split_once(sep)
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| anyhow!("invalid {} `{}`, expected KEY{}VALUE", what, raw, sep))
}

/// Numbers and booleans pass through as JSON, everything else stays a string
fn scalar(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_))) => value,
        _ => Value::from(raw),
    }
}

fn parse_range(raw: &str) -> Result<(String, RangeBounds)> {
    let (field, spec) = split_pair(raw, ':', "range")?;
    let pairs = spec
        .split(',')
        .map(|part| -> Result<(String, RangeValue)> {
            let (op, raw_value) = split_pair(part, '=', "range bound")?;
            Ok((op.to_string(), RangeValue::from_json(&scalar(raw_value))?))
        })
        .collect::<Result<Vec<_>>>()?;
    let bounds = RangeBounds::from_pairs(pairs)
        .with_context(|| format!("invalid range for `{}`", field))?;
    Ok((field.to_string(), bounds))
}

fn build_request(args: &Args, settings: &RequestSettings) -> Result<QueryBuilder> {
    let mut request = QueryBuilder::with_settings(settings);
    if let Some(from) = args.from {
        request.from(from)?;
    }
    if let Some(size) = args.size {
        request.size(size)?;
    }
    match args.source.as_slice() {
        [] => {}
        [only] if only == "false" => {
            request.source_value(Value::Bool(false))?;
        }
        fields => {
            request.source(fields.to_vec());
        }
    }
    if let Some(field) = &args.collapse {
        request.collapse(field.as_str());
    }
    for raw in &args.sorts {
        let (field, order) = match raw.split_once(':') {
            Some((field, order)) => (field, order.parse::<SortOrder>()?),
            None => (raw.as_str(), SortOrder::Asc),
        };
        request.sort_field(field, order);
    }

    let filter_count =
        args.terms.len() + args.ranges.len() + args.exists.len() + args.query_string.iter().count();
    debug!(filters = filter_count, "collecting filters");
    if filter_count > 0 {
        let query = request.query_mut();
        query.bool_query()?.filter();
        for raw in &args.terms {
            let (field, value) = split_pair(raw, '=', "term")?;
            query.term(field, scalar(value))?;
        }
        for raw in &args.ranges {
            let (field, bounds) = parse_range(raw)?;
            query.range(field, bounds)?;
        }
        for field in &args.exists {
            query.exists(field.as_str())?;
        }
        if let Some(query_string) = &args.query_string {
            query.query_string(query_string.as_str(), None)?;
        }
    }
    if args.negate {
        request.query_mut().negate_mut();
    }

    for raw in &args.terms_aggs {
        let (name, field) = split_pair(raw, '=', "terms aggregation")?;
        request.aggregations_mut().terms(name, field);
    }
    for raw in &args.avg_aggs {
        let (name, field) = split_pair(raw, '=', "avg aggregation")?;
        request.aggregations_mut().avg(name, field);
    }

    Ok(request)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();
    info!("queryforge v{}", queryforge::VERSION);

    if args.script_lang.trim().is_empty() {
        bail!("--script-lang must not be empty");
    }
    let mut settings = RequestSettings::default()
        .with_max_window(args.max_window)
        .with_script_lang(args.script_lang.clone())
        .with_pretty(args.pretty);
    if let Some(size) = args.default_size {
        settings = settings.with_default_size(size);
    }

    let request = build_request(&args, &settings)?;
    request
        .validate_window(&settings)
        .context("request exceeds the result window")?;

    println!("{}", request.to_json_string(settings.pretty)?);
    Ok(())
}
