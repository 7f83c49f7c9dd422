use clap::builder::PossibleValuesParser;
use clap::{Args, Subcommand};

use pgsight_core::report::registry;
use pgsight_core::{FanOutGroups, RawParam, RawParams, ReportError, TableFormat};

use super::ConnectionArgs;

/// Statement types reported on when no --sql-type is given
const DEFAULT_SQL_TYPES: &[&str] = &["SELECT", "INSERT", "UPDATE", "DELETE"];

/// Statistics fetched alongside the ranking statistic when no
/// --fetch-field is given
const DEFAULT_FETCH_FIELDS: &[&str] = &["rows", "calls", "total_time", "mean_time"];

#[derive(Args)]
pub struct SqlArgs {
    #[command(subcommand)]
    pub command: SqlCommands,
}

#[derive(Subcommand)]
pub enum SqlCommands {
    /// Time statistics for statements grouped by statement type
    TimeStats(TimeStatsArgs),

    /// Top statements per statement type, ranked by a chosen statistic
    TopStatements(TopStatementsArgs),

    /// Statements that have been running longer than a threshold
    LongRunning(LongRunningArgs),
}

#[derive(Args)]
pub struct TimeStatsArgs {
    /// Statistic to order by
    #[arg(
        long,
        default_value = "avg_time_ms",
        value_parser = PossibleValuesParser::new(registry::TIME_STAT_FIELDS.iter().copied())
    )]
    pub order_by: String,

    /// Restrict to one database (default: all databases)
    #[arg(long, default_value = "_all")]
    pub dbname: String,

    /// Table output format
    #[arg(long, value_enum, default_value_t = TableFormat::Psql)]
    pub format: TableFormat,
}

#[derive(Args)]
pub struct TopStatementsArgs {
    /// Statistic that ranks statements within each type
    #[arg(
        long,
        default_value = "mean_time",
        value_parser = PossibleValuesParser::new(registry::SQL_STAT_FIELDS.iter().copied())
    )]
    pub top_stat_field: String,

    /// Number of statements per type
    #[arg(long, default_value_t = 10)]
    pub count: i64,

    /// Statistic to fetch alongside the ranking one (repeatable)
    #[arg(
        long = "fetch-field",
        value_parser = PossibleValuesParser::new(registry::SQL_STAT_FIELDS.iter().copied())
    )]
    pub fetch_fields: Vec<String>,

    /// Statement type to report on (repeatable)
    #[arg(
        long = "sql-type",
        value_parser = PossibleValuesParser::new(registry::sql_type_labels())
    )]
    pub sql_types: Vec<String>,

    /// Restrict to one database (default: all databases)
    #[arg(long, default_value = "_all")]
    pub dbname: String,

    /// Table output format
    #[arg(long, value_enum, default_value_t = TableFormat::Grid)]
    pub format: TableFormat,
}

#[derive(Args)]
pub struct LongRunningArgs {
    /// Minimum running time in seconds
    #[arg(long, default_value_t = 60)]
    pub min_duration_s: i64,

    /// Restrict to one database (default: all databases)
    #[arg(long, default_value = "_all")]
    pub dbname: String,

    /// Table output format
    #[arg(long, value_enum, default_value_t = TableFormat::Psql)]
    pub format: TableFormat,
}

pub fn run(conn: &ConnectionArgs, args: SqlArgs) -> anyhow::Result<()> {
    match args.command {
        SqlCommands::TimeStats(args) => run_time_stats(conn, args),
        SqlCommands::TopStatements(args) => run_top_statements(conn, args),
        SqlCommands::LongRunning(args) => run_long_running(conn, args),
    }
}

fn run_time_stats(conn: &ConnectionArgs, args: TimeStatsArgs) -> anyhow::Result<()> {
    let _span = tracing::info_span!("pg_sql_time_stats").entered();

    let mut raw = RawParams::new();
    raw.insert("order_by".to_string(), RawParam::from(args.order_by));
    raw.insert("dbname".to_string(), RawParam::from(args.dbname));

    super::execute_report(conn, "sql_time_stats_by_type", &raw, args.format)
}

fn run_top_statements(conn: &ConnectionArgs, args: TopStatementsArgs) -> anyhow::Result<()> {
    let _span = tracing::info_span!("pg_sql_top_statements").entered();

    let groups = fan_out_groups(&args.sql_types)?;
    let fetch_fields = fetch_fields_without_top(&args.fetch_fields, &args.top_stat_field);

    let mut raw = RawParams::new();
    raw.insert(
        "top_stat_field".to_string(),
        RawParam::from(args.top_stat_field),
    );
    raw.insert("count".to_string(), RawParam::from(args.count.to_string()));
    raw.insert("fetch_fields".to_string(), RawParam::from(fetch_fields));
    raw.insert("dbname".to_string(), RawParam::from(args.dbname));

    super::execute_fan_out_report(conn, "top_sql_stats_by_type", &raw, &groups, args.format)
}

fn run_long_running(conn: &ConnectionArgs, args: LongRunningArgs) -> anyhow::Result<()> {
    let _span = tracing::info_span!("pg_sql_long_running").entered();

    let mut raw = RawParams::new();
    raw.insert(
        "min_duration_s".to_string(),
        RawParam::from(args.min_duration_s.to_string()),
    );
    raw.insert("dbname".to_string(), RawParam::from(args.dbname));

    super::execute_report(conn, "active_sql_long_running", &raw, args.format)
}

/// Map statement-type labels to their query filter values, preserving order
fn fan_out_groups(labels: &[String]) -> Result<FanOutGroups, ReportError> {
    let labels: Vec<&str> = if labels.is_empty() {
        DEFAULT_SQL_TYPES.to_vec()
    } else {
        labels.iter().map(String::as_str).collect()
    };

    let mut groups = FanOutGroups::new();
    for label in labels {
        let value = registry::sql_type_value(label).ok_or_else(|| {
            ReportError::Validation(format!("unknown statement type '{label}'"))
        })?;
        groups.insert(label.to_string(), value.to_string());
    }
    Ok(groups)
}

/// The ranking statistic is always selected, so drop it from the fetch list
fn fetch_fields_without_top(fetch_fields: &[String], top_stat_field: &str) -> Vec<String> {
    let chosen: Vec<&str> = if fetch_fields.is_empty() {
        DEFAULT_FETCH_FIELDS.to_vec()
    } else {
        fetch_fields.iter().map(String::as_str).collect()
    };
    chosen
        .into_iter()
        .filter(|field| *field != top_stat_field)
        .map(str::to_string)
        .collect()
}
