//! Report runner
//!
//! Ties the pipeline together: validate raw input against the registry,
//! resolve the definition's source into a [`SourceQuery`] and hand it to an
//! executor. Fan-out reports repeat that once per group, in declared order,
//! and abort on the first failure.

use chrono::Utc;

use crate::error::{ReportError, ReportResult};
use crate::executor::{MetricQuerySpec, MetricsRequest, QueryExecutor, ServiceKind, SourceQuery};
use crate::report::{registry, templates, FanOutGroups, ParamValue, RawParam, RawParams, ReportParams, ReportSource};
use crate::time::{parse_instant, resolve_window};
use crate::types::ResultSet;

/// Labelled result sets: `None` for single reports, the group label for
/// fan-out reports
pub type ReportOutput = Vec<(Option<String>, ResultSet)>;

/// Run a report once
pub async fn run(
    name: &str,
    raw: &RawParams,
    executor: &dyn QueryExecutor,
) -> ReportResult<ReportOutput> {
    let params = registry::validate(name, raw)?;
    let query = build_query(name, &params)?;
    let results = executor.execute(&query).await?;
    Ok(vec![(None, results)])
}

/// Run a fan-out report once per group, substituting each group's filter
/// value for the definition's fan-out parameter. Fails fast: the first
/// failing group aborts the remainder.
pub async fn run_fan_out(
    name: &str,
    raw: &RawParams,
    groups: &FanOutGroups,
    executor: &dyn QueryExecutor,
) -> ReportResult<ReportOutput> {
    let definition = registry::get(name)?;
    let fan_out_param = definition
        .fan_out_param
        .ok_or_else(|| ReportError::Validation(format!("report '{name}' does not fan out")))?;

    let mut outputs = Vec::with_capacity(groups.len());
    let mut completed: Vec<String> = Vec::new();
    for (label, value) in groups {
        let mut group_raw = raw.clone();
        group_raw.insert(fan_out_param.to_string(), RawParam::Scalar(value.clone()));
        let params = registry::validate(name, &group_raw)?;
        let query = build_query(name, &params)?;
        match executor.execute(&query).await {
            Ok(results) => {
                completed.push(label.clone());
                outputs.push((Some(label.clone()), results));
            }
            Err(source) => {
                return Err(ReportError::ReportExecution {
                    group: label.clone(),
                    completed,
                    source: Box::new(source),
                });
            }
        }
    }
    Ok(outputs)
}

fn build_query(name: &str, params: &ReportParams) -> ReportResult<SourceQuery> {
    let definition = registry::get(name)?;
    match definition.source {
        ReportSource::Sql { .. } => Ok(SourceQuery::Sql(templates::resolve(name, params)?)),
        ReportSource::Metrics { query_spec } => Ok(SourceQuery::Metrics(build_metrics_request(
            name, query_spec, params,
        )?)),
    }
}

fn build_metrics_request(
    name: &str,
    query_spec: &str,
    params: &ReportParams,
) -> ReportResult<MetricsRequest> {
    let queries: Vec<MetricQuerySpec> = serde_json::from_str(query_spec)?;

    let identifier = match params.get("db_id") {
        Some(ParamValue::Str(s)) => s.clone(),
        _ => {
            return Err(ReportError::Validation(format!(
                "missing required parameter 'db_id' for report '{name}'"
            )))
        }
    };

    let service_kind = match params.get("service_type") {
        Some(ParamValue::Str(s)) => s.parse::<ServiceKind>()?,
        _ => ServiceKind::Rds,
    };

    // reference instant: explicit `time` or now, window extends from there
    let reference = match params.get("time") {
        Some(ParamValue::Str(s)) => parse_instant(s).ok_or_else(|| {
            ReportError::Validation(format!(
                "parameter 'time' of report '{name}' expects an ISO-8601 date-time, got '{s}'"
            ))
        })?,
        _ => Utc::now().naive_utc(),
    };

    let window = match params.get("window") {
        Some(ParamValue::Str(s)) => resolve_window(reference, s)?,
        _ => resolve_window(reference, "-1h")?,
    };

    let period_seconds = i32::try_from(int_param(params, "period_s", 3600)).map_err(|_| {
        ReportError::Validation(format!("parameter 'period_s' of report '{name}' is out of range"))
    })?;
    let max_results = i32::try_from(int_param(params, "max_results", 100)).map_err(|_| {
        ReportError::Validation(format!(
            "parameter 'max_results' of report '{name}' is out of range"
        ))
    })?;

    Ok(MetricsRequest {
        service_kind,
        identifier,
        queries,
        window,
        period_seconds,
        max_results,
    })
}

fn int_param(params: &ReportParams, name: &str, default: i64) -> i64 {
    match params.get(name) {
        Some(ParamValue::Int(i)) => *i,
        _ => default,
    }
}
