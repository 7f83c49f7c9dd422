//! AWS Performance Insights executor
//!
//! Resolves the instance's DBI resource id through the RDS control plane,
//! then pages through `GetResourceMetrics` and flattens every datapoint
//! series into rows of `[metric, dimensions, timestamp, value]`.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_pi::operation::get_resource_metrics::GetResourceMetricsOutput;
use aws_sdk_pi::primitives::DateTime;
use aws_sdk_pi::types::{DimensionGroup, MetricQuery, PeriodAlignment, ServiceType};
use serde_json::Value;

use crate::config::AwsConnectionParams;
use crate::error::{ReportError, ReportResult};
use crate::executor::{MetricQuerySpec, MetricsRequest, QueryExecutor, ServiceKind, SourceQuery};
use crate::types::ResultSet;

pub struct PerformanceInsightsExecutor {
    params: AwsConnectionParams,
}

impl PerformanceInsightsExecutor {
    pub fn new(params: AwsConnectionParams) -> Self {
        Self { params }
    }

    async fn sdk_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = &self.params.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &self.params.region {
            loader = loader.region(Region::new(region.clone()));
        }
        loader.load().await
    }

    /// Performance Insights addresses instances by DBI resource id, not by
    /// the instance identifier users know
    async fn resolve_resource_id(&self, config: &SdkConfig, db_id: &str) -> ReportResult<String> {
        let client = aws_sdk_rds::Client::new(config);
        let output = client
            .describe_db_instances()
            .db_instance_identifier(db_id)
            .send()
            .await
            .map_err(|e| {
                ReportError::Connection(format!(
                    "DescribeDBInstances {db_id}: {}",
                    e.into_service_error()
                ))
            })?;
        output
            .db_instances()
            .first()
            .and_then(|instance| instance.dbi_resource_id())
            .map(str::to_string)
            .ok_or_else(|| {
                ReportError::QueryExecution(format!("no RDS instance found for '{db_id}'"))
            })
    }

    async fn run_metrics(&self, request: &MetricsRequest) -> ReportResult<ResultSet> {
        if request.service_kind != ServiceKind::Rds {
            return Err(ReportError::UnsupportedServiceType(
                request.service_kind.to_string(),
            ));
        }

        let config = self.sdk_config().await;
        let resource_id = self.resolve_resource_id(&config, &request.identifier).await?;
        let client = aws_sdk_pi::Client::new(&config);

        let queries = build_metric_queries(&request.queries)?;
        let start = DateTime::from_secs(request.window.start.and_utc().timestamp());
        let end = DateTime::from_secs(request.window.end.and_utc().timestamp());

        let mut results = ResultSet::new(vec![
            "metric".to_string(),
            "dimensions".to_string(),
            "timestamp".to_string(),
            "value".to_string(),
        ]);
        let mut next_token: Option<String> = None;
        loop {
            let mut call = client
                .get_resource_metrics()
                .service_type(ServiceType::Rds)
                .identifier(&resource_id)
                .set_metric_queries(Some(queries.clone()))
                .start_time(start)
                .end_time(end)
                .period_in_seconds(request.period_seconds)
                .max_results(request.max_results)
                .period_alignment(PeriodAlignment::EndTime);
            if let Some(token) = &next_token {
                call = call.next_token(token);
            }
            let output = call.send().await.map_err(|e| {
                ReportError::QueryExecution(format!(
                    "GetResourceMetrics {}: {}",
                    request.identifier,
                    e.into_service_error()
                ))
            })?;

            flatten_metrics(&output, &mut results);

            next_token = output
                .next_token()
                .map(str::to_string)
                .filter(|token| !token.is_empty());
            if next_token.is_none() {
                break;
            }
        }
        Ok(results)
    }
}

#[async_trait::async_trait]
impl QueryExecutor for PerformanceInsightsExecutor {
    async fn execute(&self, query: &SourceQuery) -> ReportResult<ResultSet> {
        match query {
            SourceQuery::Metrics(request) => {
                tracing::debug!(
                    identifier = request.identifier.as_str(),
                    queries = request.queries.len(),
                    "running Performance Insights queries"
                );
                self.run_metrics(request).await
            }
            SourceQuery::Sql(_) => Err(ReportError::QueryExecution(
                "Performance Insights executor cannot serve SQL queries".to_string(),
            )),
        }
    }
}

fn build_metric_queries(specs: &[MetricQuerySpec]) -> ReportResult<Vec<MetricQuery>> {
    let mut queries = Vec::with_capacity(specs.len());
    for spec in specs {
        let mut builder = MetricQuery::builder().metric(&spec.metric);
        if let Some(group_by) = &spec.group_by {
            let mut group = DimensionGroup::builder().group(&group_by.group);
            if let Some(dimensions) = &group_by.dimensions {
                for dimension in dimensions {
                    group = group.dimensions(dimension);
                }
            }
            if let Some(limit) = group_by.limit {
                group = group.limit(limit);
            }
            let group = group.build().map_err(|e| {
                ReportError::Validation(format!("metric query group for '{}': {e}", spec.metric))
            })?;
            builder = builder.group_by(group);
        }
        let query = builder.build().map_err(|e| {
            ReportError::Validation(format!("metric query '{}': {e}", spec.metric))
        })?;
        queries.push(query);
    }
    Ok(queries)
}

fn flatten_metrics(output: &GetResourceMetricsOutput, results: &mut ResultSet) {
    for series in output.metric_list() {
        let Some(key) = series.key() else { continue };
        let metric = key.metric().to_string();
        let dimensions = key
            .dimensions()
            .map(|dims| {
                let mut pairs: Vec<String> =
                    dims.iter().map(|(k, v)| format!("{k}={v}")).collect();
                pairs.sort_unstable();
                pairs.join(", ")
            })
            .unwrap_or_default();
        for point in series.data_points() {
            let timestamp = point.timestamp();
            let rendered = chrono::DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos())
                .map(|ts| ts.naive_utc().to_string())
                .unwrap_or_default();
            results.push_row(vec![
                Value::from(metric.clone()),
                Value::from(dimensions.clone()),
                Value::from(rendered),
                Value::from(point.value()),
            ]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::resolve_window;
    use chrono::NaiveDate;

    fn request(service_kind: ServiceKind) -> MetricsRequest {
        let reference = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        MetricsRequest {
            service_kind,
            identifier: "db-1".to_string(),
            queries: vec![],
            window: resolve_window(reference, "-1h").unwrap(),
            period_seconds: 3600,
            max_results: 100,
        }
    }

    #[tokio::test]
    async fn test_docdb_not_supported() {
        let executor = PerformanceInsightsExecutor::new(AwsConnectionParams::default());
        let err = executor
            .execute(&SourceQuery::Metrics(request(ServiceKind::DocDb)))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedServiceType(_)));
        assert!(err.to_string().contains("DOCDB"));
    }

    #[tokio::test]
    async fn test_rejects_sql_queries() {
        let executor = PerformanceInsightsExecutor::new(AwsConnectionParams::default());
        let err = executor
            .execute(&SourceQuery::Sql("SELECT 1".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::QueryExecution(_)));
    }

    #[test]
    fn test_build_metric_queries_from_spec() {
        let specs: Vec<MetricQuerySpec> = serde_json::from_str(
            r#"[{ "metric": "db.load.avg",
                  "group_by": { "group": "db.wait_event",
                                "dimensions": ["db.wait_event.name"],
                                "limit": 10 } }]"#,
        )
        .unwrap();
        let queries = build_metric_queries(&specs).unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].metric(), "db.load.avg");
        let group = queries[0].group_by().unwrap();
        assert_eq!(group.group(), "db.wait_event");
        assert_eq!(group.dimensions(), ["db.wait_event.name"]);
        assert_eq!(group.limit(), Some(10));
    }

    #[test]
    fn test_build_metric_queries_without_grouping() {
        let specs = vec![MetricQuerySpec {
            metric: "os.cpuUtilization.user.avg".to_string(),
            group_by: None,
        }];
        let queries = build_metric_queries(&specs).unwrap();
        assert!(queries[0].group_by().is_none());
    }
}
