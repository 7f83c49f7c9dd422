use chrono::NaiveDateTime;
use clap::builder::PossibleValuesParser;
use clap::{Args, Subcommand};

use pgsight_core::report::registry;
use pgsight_core::runner;
use pgsight_core::time::parse_instant;
use pgsight_core::{
    AwsConnectionParams, PerformanceInsightsExecutor, RawParam, RawParams, TableFormat,
};

use crate::cli::output;

#[derive(Args)]
pub struct RdsArgs {
    #[command(flatten)]
    pub aws: AwsArgs,

    #[command(subcommand)]
    pub command: RdsCommands,
}

/// AWS credential selection, following the SDK's usual environment
#[derive(Args, Clone)]
pub struct AwsArgs {
    /// AWS profile
    #[arg(long, env = "AWS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// AWS region override
    #[arg(long, env = "AWS_REGION", global = true)]
    pub region: Option<String>,
}

impl AwsArgs {
    pub fn to_params(&self) -> AwsConnectionParams {
        AwsConnectionParams {
            profile: self.profile.clone(),
            region: self.region.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum RdsCommands {
    /// OS and database counter metrics for an instance
    CounterMetrics(MetricsReportArgs),

    /// Database load grouped by top wait events
    LoadAvgTopWaitEvents(MetricsReportArgs),

    /// Database load grouped by top SQL statements
    LoadAvgTopSql(MetricsReportArgs),
}

#[derive(Args)]
pub struct MetricsReportArgs {
    /// RDS instance identifier
    pub db_id: String,

    /// Reference instant, ISO-8601 (default: now)
    #[arg(long, value_parser = parse_naive_datetime)]
    pub time: Option<NaiveDateTime>,

    /// Window around the reference instant, e.g. -1h or 30m
    #[arg(long, default_value = "-1h")]
    pub window: String,

    /// Metric aggregation period in seconds
    #[arg(long, default_value_t = 3600)]
    pub period_s: i64,

    /// Maximum data points per metric query
    #[arg(long, default_value_t = 100)]
    pub max_results: i64,

    /// Performance Insights service type
    #[arg(
        long,
        default_value = "RDS",
        value_parser = PossibleValuesParser::new(registry::SERVICE_TYPES.iter().copied())
    )]
    pub service_type: String,

    /// Table output format
    #[arg(long, value_enum, default_value_t = TableFormat::Psql)]
    pub format: TableFormat,
}

impl MetricsReportArgs {
    fn raw_params(&self) -> RawParams {
        let mut raw = RawParams::new();
        raw.insert("db_id".to_string(), RawParam::from(self.db_id.clone()));
        if let Some(time) = self.time {
            raw.insert(
                "time".to_string(),
                RawParam::from(time.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            );
        }
        raw.insert("window".to_string(), RawParam::from(self.window.clone()));
        raw.insert(
            "period_s".to_string(),
            RawParam::from(self.period_s.to_string()),
        );
        raw.insert(
            "max_results".to_string(),
            RawParam::from(self.max_results.to_string()),
        );
        raw.insert(
            "service_type".to_string(),
            RawParam::from(self.service_type.clone()),
        );
        raw
    }
}

fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime, String> {
    parse_instant(value).ok_or_else(|| {
        format!("expected an ISO-8601 date-time such as 2024-01-02T03:04:05, got '{value}'")
    })
}

pub fn run(args: RdsArgs) -> anyhow::Result<()> {
    match args.command {
        RdsCommands::CounterMetrics(cmd) => {
            let _span = tracing::info_span!("rds_counter_metrics").entered();
            execute_report(&args.aws, "counter_metrics", cmd)
        }
        RdsCommands::LoadAvgTopWaitEvents(cmd) => {
            let _span = tracing::info_span!("rds_load_avg_top_wait_events").entered();
            execute_report(&args.aws, "load_avg_top_wait_events", cmd)
        }
        RdsCommands::LoadAvgTopSql(cmd) => {
            let _span = tracing::info_span!("rds_load_avg_top_sql").entered();
            execute_report(&args.aws, "load_avg_top_sql", cmd)
        }
    }
}

fn execute_report(aws: &AwsArgs, name: &str, args: MetricsReportArgs) -> anyhow::Result<()> {
    let raw = args.raw_params();
    let executor = PerformanceInsightsExecutor::new(aws.to_params());
    let runtime = tokio::runtime::Runtime::new()?;
    let output = runtime.block_on(runner::run(name, &raw, &executor))?;
    output::print_report(name, &raw, args.format, &output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report_args() -> MetricsReportArgs {
        MetricsReportArgs {
            db_id: "orders-prod".to_string(),
            time: None,
            window: "-1h".to_string(),
            period_s: 3600,
            max_results: 100,
            service_type: "RDS".to_string(),
            format: TableFormat::Psql,
        }
    }

    #[test]
    fn test_raw_params_omit_time_when_absent() {
        let raw = report_args().raw_params();
        assert!(!raw.contains_key("time"));
        assert_eq!(raw["db_id"], RawParam::Scalar("orders-prod".to_string()));
        assert_eq!(raw["period_s"], RawParam::Scalar("3600".to_string()));
    }

    #[test]
    fn test_raw_params_format_time() {
        let mut args = report_args();
        args.time = Some(parse_naive_datetime("2024-01-02T03:00:00").unwrap());
        let raw = args.raw_params();
        assert_eq!(
            raw["time"],
            RawParam::Scalar("2024-01-02T03:00:00".to_string())
        );

        args.time = Some(parse_naive_datetime("2024-01-02T03:00:00.250").unwrap());
        let raw = args.raw_params();
        assert_eq!(
            raw["time"],
            RawParam::Scalar("2024-01-02T03:00:00.250".to_string())
        );
    }

    #[test]
    fn test_parse_naive_datetime_accepts_iso_variants() {
        let midnight = parse_naive_datetime("2024-01-02").unwrap();
        assert_eq!(midnight.to_string(), "2024-01-02 00:00:00");

        assert_eq!(
            parse_naive_datetime("2024-01-02 03:04:05").unwrap(),
            parse_naive_datetime("2024-01-02T03:04:05").unwrap()
        );
    }

    #[test]
    fn test_parse_naive_datetime_rejects_garbage() {
        let err = parse_naive_datetime("yesterday").unwrap_err();
        assert!(err.contains("ISO-8601"));
    }
}
