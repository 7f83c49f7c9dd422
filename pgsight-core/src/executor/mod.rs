//! Query executors
//!
//! A resolved report turns into a [`SourceQuery`]; an executor knows how to
//! run one kind of query against one kind of backend and materialize the
//! rows into a [`ResultSet`]. Executors are async; the CLI drives them from
//! a runtime it owns.

pub mod metrics;
pub mod postgres;
pub mod tunnel;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{ReportError, ReportResult};
use crate::time::TimeWindow;
use crate::types::ResultSet;

/// A resolved query ready for execution
#[derive(Debug, Clone, PartialEq)]
pub enum SourceQuery {
    /// Rendered SQL text
    Sql(String),
    /// Performance Insights metric request
    Metrics(MetricsRequest),
}

/// Service kinds Performance Insights can front
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Rds,
    DocDb,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rds => f.write_str("RDS"),
            Self::DocDb => f.write_str("DOCDB"),
        }
    }
}

impl FromStr for ServiceKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RDS" => Ok(Self::Rds),
            "DOCDB" => Ok(Self::DocDb),
            other => Err(ReportError::Validation(format!(
                "unknown service type '{other}', expected RDS or DOCDB"
            ))),
        }
    }
}

/// One metric query from a report's companion resource
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricQuerySpec {
    pub metric: String,
    #[serde(default)]
    pub group_by: Option<GroupBySpec>,
}

/// Dimension grouping for a metric query
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GroupBySpec {
    pub group: String,
    #[serde(default)]
    pub dimensions: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<i32>,
}

/// Fully-resolved Performance Insights request
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRequest {
    pub service_kind: ServiceKind,
    pub identifier: String,
    pub queries: Vec<MetricQuerySpec>,
    pub window: TimeWindow,
    pub period_seconds: i32,
    pub max_results: i32,
}

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &SourceQuery) -> ReportResult<ResultSet>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_kind_round_trip() {
        assert_eq!("RDS".parse::<ServiceKind>().unwrap(), ServiceKind::Rds);
        assert_eq!("DOCDB".parse::<ServiceKind>().unwrap(), ServiceKind::DocDb);
        assert_eq!(ServiceKind::Rds.to_string(), "RDS");
        assert_eq!(ServiceKind::DocDb.to_string(), "DOCDB");
    }

    #[test]
    fn test_service_kind_rejects_unknown() {
        let err = "AURORA".parse::<ServiceKind>().unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
        assert!(err.to_string().contains("AURORA"));
    }

    #[test]
    fn test_metric_query_spec_deserializes() {
        let specs: Vec<MetricQuerySpec> = serde_json::from_str(
            r#"[
                { "metric": "os.cpuUtilization.user.avg" },
                { "metric": "db.load.avg", "group_by": { "group": "db.wait_event", "limit": 5 } }
            ]"#,
        )
        .unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].metric, "os.cpuUtilization.user.avg");
        assert!(specs[0].group_by.is_none());
        let group_by = specs[1].group_by.as_ref().unwrap();
        assert_eq!(group_by.group, "db.wait_event");
        assert_eq!(group_by.limit, Some(5));
        assert!(group_by.dimensions.is_none());
    }
}
