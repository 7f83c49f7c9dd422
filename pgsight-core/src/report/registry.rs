//! Static report registry
//!
//! Populated once on first use and read-only afterwards, so lookups and
//! validation are safe from any number of threads. Adding a report means
//! adding a definition here plus its template or metric-query resource
//! under `sql/` or `metrics/`.

use once_cell::sync::Lazy;

use crate::error::{ReportError, ReportResult};
use crate::report::{
    ColumnSpec, ParamKind, ParamValue, ParameterSpec, RawParam, RawParams, ReportDefinition,
    ReportParams, ReportSource,
};

/// Sort fields for `sql_time_stats_by_type`
pub const TIME_STAT_FIELDS: &[&str] = &["avg_time_ms", "num_calls", "total_time_ms", "max_time_ms"];

/// Per-statement statistic columns exposed by `pg_stat_statements`
pub const SQL_STAT_FIELDS: &[&str] = &[
    "calls",
    "total_time",
    "min_time",
    "max_time",
    "mean_time",
    "stddev_time",
    "rows",
    "shared_blks_hit",
    "shared_blks_read",
    "shared_blks_dirtied",
    "shared_blks_written",
    "local_blks_hit",
    "local_blks_read",
    "local_blks_dirtied",
    "local_blks_written",
    "temp_blks_read",
    "temp_blks_written",
    "blk_read_time",
    "blk_write_time",
];

/// Statement types: display label paired with the keyword statements of that
/// type start with. Transactions open with BEGIN, hence the one odd pair.
pub const SQL_TYPES: &[(&str, &str)] = &[
    ("SELECT", "SELECT"),
    ("INSERT", "INSERT"),
    ("UPDATE", "UPDATE"),
    ("DELETE", "DELETE"),
    ("FETCH", "FETCH"),
    ("CREATE", "CREATE"),
    ("DROP", "DROP"),
    ("ALTER", "ALTER"),
    ("TRUNCATE", "TRUNCATE"),
    ("GRANT", "GRANT"),
    ("REVOKE", "REVOKE"),
    ("MOVE", "MOVE"),
    ("COMMIT", "COMMIT"),
    ("ROLLBACK", "ROLLBACK"),
    ("SAVEPOINT", "SAVEPOINT"),
    ("TRANSACTION", "BEGIN"),
];

/// Statement-type filter values accepted by `top_sql_stats_by_type`
pub const SQL_TYPE_VALUES: &[&str] = &[
    "SELECT",
    "INSERT",
    "UPDATE",
    "DELETE",
    "FETCH",
    "CREATE",
    "DROP",
    "ALTER",
    "TRUNCATE",
    "GRANT",
    "REVOKE",
    "MOVE",
    "COMMIT",
    "ROLLBACK",
    "SAVEPOINT",
    "BEGIN",
];

/// Performance Insights service types
pub const SERVICE_TYPES: &[&str] = &["RDS", "DOCDB"];

/// Map a statement-type label to its filter value
pub fn sql_type_value(label: &str) -> Option<&'static str> {
    SQL_TYPES.iter().find(|(l, _)| *l == label).map(|(_, v)| *v)
}

/// Statement-type labels in declaration order
pub fn sql_type_labels() -> Vec<&'static str> {
    SQL_TYPES.iter().map(|(l, _)| *l).collect()
}

fn dbname_parameter() -> ParameterSpec {
    ParameterSpec {
        name: "dbname",
        kind: ParamKind::Str,
        required: false,
        default: Some("_all"),
    }
}

fn schema_parameter() -> ParameterSpec {
    ParameterSpec {
        name: "schema",
        kind: ParamKind::Str,
        required: false,
        default: Some("public"),
    }
}

fn metrics_parameters() -> Vec<ParameterSpec> {
    vec![
        ParameterSpec {
            name: "db_id",
            kind: ParamKind::Str,
            required: true,
            default: None,
        },
        ParameterSpec {
            name: "time",
            kind: ParamKind::Str,
            required: false,
            default: None,
        },
        ParameterSpec {
            name: "window",
            kind: ParamKind::Str,
            required: false,
            default: Some("-1h"),
        },
        ParameterSpec {
            name: "period_s",
            kind: ParamKind::Int,
            required: false,
            default: Some("3600"),
        },
        ParameterSpec {
            name: "max_results",
            kind: ParamKind::Int,
            required: false,
            default: Some("100"),
        },
        ParameterSpec {
            name: "service_type",
            kind: ParamKind::Enum {
                allowed: SERVICE_TYPES,
            },
            required: false,
            default: Some("RDS"),
        },
    ]
}

fn metrics_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec {
            name: "metric",
            description: "Performance Insights metric name",
        },
        ColumnSpec {
            name: "dimensions",
            description: "Dimension values of the series, empty for ungrouped metrics",
        },
        ColumnSpec {
            name: "timestamp",
            description: "Datapoint timestamp (UTC)",
        },
        ColumnSpec {
            name: "value",
            description: "Datapoint value",
        },
    ]
}

static REGISTRY: Lazy<Vec<ReportDefinition>> = Lazy::new(|| {
    vec![
        ReportDefinition {
            name: "sql_time_stats_by_type",
            description: "Time statistics for SQL statements grouped by SQL type",
            parameters: vec![
                ParameterSpec {
                    name: "order_by",
                    kind: ParamKind::Enum {
                        allowed: TIME_STAT_FIELDS,
                    },
                    required: false,
                    default: Some("avg_time_ms"),
                },
                dbname_parameter(),
            ],
            output_columns: vec![
                ColumnSpec {
                    name: "sql_type",
                    description: "The type of SQL statement",
                },
                ColumnSpec {
                    name: "avg_time_ms",
                    description: "Average time statements of the type took to run, in milliseconds",
                },
                ColumnSpec {
                    name: "num_calls",
                    description: "Number of times statements of the type were called",
                },
                ColumnSpec {
                    name: "total_time_ms",
                    description: "Total time statements of the type took to run, in milliseconds",
                },
                ColumnSpec {
                    name: "max_time_ms",
                    description: "Maximum time a statement of the type took to run, in milliseconds",
                },
            ],
            source: ReportSource::Sql {
                template: include_str!("sql/sql_time_stats_by_type.sql"),
            },
            fan_out_param: None,
        },
        ReportDefinition {
            name: "top_sql_stats_by_type",
            description: "Top SQL statements of a type ranked by a chosen statistic",
            parameters: vec![
                ParameterSpec {
                    name: "top_stat_field",
                    kind: ParamKind::Enum {
                        allowed: SQL_STAT_FIELDS,
                    },
                    required: false,
                    default: Some("mean_time"),
                },
                ParameterSpec {
                    name: "count",
                    kind: ParamKind::Int,
                    required: false,
                    default: Some("10"),
                },
                ParameterSpec {
                    name: "fetch_fields",
                    kind: ParamKind::EnumList {
                        allowed: SQL_STAT_FIELDS,
                    },
                    required: false,
                    default: Some("rows,calls,total_time"),
                },
                ParameterSpec {
                    name: "sql_type",
                    kind: ParamKind::Enum {
                        allowed: SQL_TYPE_VALUES,
                    },
                    required: true,
                    default: None,
                },
                dbname_parameter(),
            ],
            output_columns: vec![
                ColumnSpec {
                    name: "user",
                    description: "User who executed the statement",
                },
                ColumnSpec {
                    name: "database",
                    description: "Database in which the statement was executed",
                },
                ColumnSpec {
                    name: "queryid",
                    description: "Hash code identifying identical normalized queries",
                },
                ColumnSpec {
                    name: "query",
                    description: "Text of a representative statement (first 15 chars)",
                },
                ColumnSpec {
                    name: "calls",
                    description: "Number of times the statement was executed",
                },
                ColumnSpec {
                    name: "total_time",
                    description: "Total time spent executing the statement, in milliseconds",
                },
                ColumnSpec {
                    name: "min_time",
                    description: "Minimum time spent executing the statement, in milliseconds",
                },
                ColumnSpec {
                    name: "max_time",
                    description: "Maximum time spent executing the statement, in milliseconds",
                },
                ColumnSpec {
                    name: "mean_time",
                    description: "Mean time spent executing the statement, in milliseconds",
                },
                ColumnSpec {
                    name: "stddev_time",
                    description: "Population standard deviation of execution time, in milliseconds",
                },
                ColumnSpec {
                    name: "rows",
                    description: "Total number of rows retrieved or affected by the statement",
                },
                ColumnSpec {
                    name: "shared_blks_hit",
                    description: "Total number of shared block cache hits by the statement",
                },
                ColumnSpec {
                    name: "shared_blks_read",
                    description: "Total number of shared blocks read by the statement",
                },
                ColumnSpec {
                    name: "shared_blks_dirtied",
                    description: "Total number of shared blocks dirtied by the statement",
                },
                ColumnSpec {
                    name: "shared_blks_written",
                    description: "Total number of shared blocks written by the statement",
                },
                ColumnSpec {
                    name: "local_blks_hit",
                    description: "Total number of local block cache hits by the statement",
                },
                ColumnSpec {
                    name: "local_blks_read",
                    description: "Total number of local blocks read by the statement",
                },
                ColumnSpec {
                    name: "local_blks_dirtied",
                    description: "Total number of local blocks dirtied by the statement",
                },
                ColumnSpec {
                    name: "local_blks_written",
                    description: "Total number of local blocks written by the statement",
                },
                ColumnSpec {
                    name: "temp_blks_read",
                    description: "Total number of temp blocks read by the statement",
                },
                ColumnSpec {
                    name: "temp_blks_written",
                    description: "Total number of temp blocks written by the statement",
                },
                ColumnSpec {
                    name: "blk_read_time",
                    description: "Total time spent reading data file blocks, in milliseconds",
                },
                ColumnSpec {
                    name: "blk_write_time",
                    description: "Total time spent writing data file blocks, in milliseconds",
                },
            ],
            source: ReportSource::Sql {
                template: include_str!("sql/top_sql_stats_by_type.sql"),
            },
            fan_out_param: Some("sql_type"),
        },
        ReportDefinition {
            name: "active_sql_long_running",
            description: "Active SQL statements running longer than a threshold",
            parameters: vec![
                ParameterSpec {
                    name: "min_duration_s",
                    kind: ParamKind::Int,
                    required: false,
                    default: Some("60"),
                },
                dbname_parameter(),
            ],
            output_columns: vec![
                ColumnSpec {
                    name: "datname",
                    description: "Name of the database this backend is connected to",
                },
                ColumnSpec {
                    name: "pid",
                    description: "Process ID of this backend",
                },
                ColumnSpec {
                    name: "usename",
                    description: "Name of the user logged into this backend",
                },
                ColumnSpec {
                    name: "application_name",
                    description: "Name of the application connected to this backend",
                },
                ColumnSpec {
                    name: "client_addr",
                    description: "IP address of the connected client, null for Unix sockets and internal processes",
                },
                ColumnSpec {
                    name: "backend_start",
                    description: "Time when this process was started",
                },
                ColumnSpec {
                    name: "xact_start",
                    description: "Time when the current transaction was started, null if none is active",
                },
                ColumnSpec {
                    name: "query_start",
                    description: "Time when the currently active query was started",
                },
                ColumnSpec {
                    name: "state",
                    description: "Current overall state of this backend",
                },
                ColumnSpec {
                    name: "wait_event_type",
                    description: "Type of event the backend is waiting for, if any",
                },
                ColumnSpec {
                    name: "wait_event",
                    description: "Wait event name if the backend is currently waiting",
                },
                ColumnSpec {
                    name: "running_secs",
                    description: "Seconds the active query has been running",
                },
                ColumnSpec {
                    name: "query",
                    description: "Text of this backend's most recent query",
                },
            ],
            source: ReportSource::Sql {
                template: include_str!("sql/active_sql_long_running.sql"),
            },
            fan_out_param: None,
        },
        ReportDefinition {
            name: "indexes_usage",
            description: "Index usage: scans, writes and sizes per index",
            parameters: vec![schema_parameter()],
            output_columns: vec![
                ColumnSpec {
                    name: "schema",
                    description: "The schema",
                },
                ColumnSpec {
                    name: "table",
                    description: "Table name",
                },
                ColumnSpec {
                    name: "index",
                    description: "Index name",
                },
                ColumnSpec {
                    name: "idx_scan",
                    description: "Count of index scans",
                },
                ColumnSpec {
                    name: "all_scans",
                    description: "Total scans, index and sequential",
                },
                ColumnSpec {
                    name: "idx_scan_pct",
                    description: "Percentage of scans served by the index",
                },
                ColumnSpec {
                    name: "writes",
                    description: "Tuple writes on the table (inserts, updates and deletes)",
                },
                ColumnSpec {
                    name: "scans_per_write",
                    description: "Ratio of index scans to writes, -1 when there are no writes",
                },
                ColumnSpec {
                    name: "idx_size",
                    description: "Index size",
                },
                ColumnSpec {
                    name: "tbl_size",
                    description: "Table size",
                },
                ColumnSpec {
                    name: "idx_type",
                    description: "Index type, one of BTREE, HASH, GIST, SPGIST, GIN, BRIN, BLOOM",
                },
            ],
            source: ReportSource::Sql {
                template: include_str!("sql/indexes_usage.sql"),
            },
            fan_out_param: None,
        },
        ReportDefinition {
            name: "indexes_usage_hints",
            description: "Indexes worth attention, each with the reason it is listed",
            parameters: vec![schema_parameter()],
            output_columns: vec![
                ColumnSpec {
                    name: "reason",
                    description: "Reason the index is listed",
                },
                ColumnSpec {
                    name: "schema",
                    description: "The schema",
                },
                ColumnSpec {
                    name: "table",
                    description: "Table name",
                },
                ColumnSpec {
                    name: "index",
                    description: "Index name",
                },
                ColumnSpec {
                    name: "index_scan_pct",
                    description: "Percentage of scans served by the index",
                },
                ColumnSpec {
                    name: "scans_per_write",
                    description: "Ratio of index scans to writes",
                },
                ColumnSpec {
                    name: "index_size",
                    description: "Index size",
                },
                ColumnSpec {
                    name: "table_size",
                    description: "Table size",
                },
            ],
            source: ReportSource::Sql {
                template: include_str!("sql/indexes_usage_hints.sql"),
            },
            fan_out_param: None,
        },
        ReportDefinition {
            name: "buffers_table_cache_hits",
            description: "Buffer cache hit ratio per table",
            parameters: vec![schema_parameter()],
            output_columns: vec![
                ColumnSpec {
                    name: "tablename",
                    description: "Name of the table",
                },
                ColumnSpec {
                    name: "table_cache_hit_ratio_pct",
                    description: "Percentage of table reads served from the buffer cache, -1 when there were no accesses",
                },
            ],
            source: ReportSource::Sql {
                template: include_str!("sql/buffers_table_cache_hits.sql"),
            },
            fan_out_param: None,
        },
        ReportDefinition {
            name: "buffers_index_cache_hits",
            description: "Buffer cache hit ratio per index",
            parameters: vec![schema_parameter()],
            output_columns: vec![
                ColumnSpec {
                    name: "tablename",
                    description: "Name of the table",
                },
                ColumnSpec {
                    name: "indexname",
                    description: "Name of the index",
                },
                ColumnSpec {
                    name: "index_cache_hit_ratio_pct",
                    description: "Percentage of index reads served from the buffer cache, -1 when there were no accesses",
                },
            ],
            source: ReportSource::Sql {
                template: include_str!("sql/buffers_index_cache_hits.sql"),
            },
            fan_out_param: None,
        },
        ReportDefinition {
            name: "buffers_usage",
            description: "Shared buffer residency per relation",
            parameters: vec![schema_parameter()],
            output_columns: vec![
                ColumnSpec {
                    name: "schema",
                    description: "Schema name",
                },
                ColumnSpec {
                    name: "rel_name",
                    description: "Name of the relation (table, sequence, index)",
                },
                ColumnSpec {
                    name: "rel_type",
                    description: "Relation type",
                },
                ColumnSpec {
                    name: "buffer_count",
                    description: "Number of shared buffers holding pages of the relation",
                },
                ColumnSpec {
                    name: "used_buffers",
                    description: "Buffers pinned at least once by a backend",
                },
                ColumnSpec {
                    name: "used_buffers_pct",
                    description: "Percentage of used buffers",
                },
            ],
            source: ReportSource::Sql {
                template: include_str!("sql/buffers_usage.sql"),
            },
            fan_out_param: None,
        },
        ReportDefinition {
            name: "counter_metrics",
            description: "OS and database counter metrics for an RDS instance",
            parameters: metrics_parameters(),
            output_columns: metrics_columns(),
            source: ReportSource::Metrics {
                query_spec: include_str!("metrics/counter_metrics.json"),
            },
            fan_out_param: None,
        },
        ReportDefinition {
            name: "load_avg_top_wait_events",
            description: "Database load average grouped by top wait events",
            parameters: metrics_parameters(),
            output_columns: metrics_columns(),
            source: ReportSource::Metrics {
                query_spec: include_str!("metrics/load_avg_top_wait_events.json"),
            },
            fan_out_param: None,
        },
        ReportDefinition {
            name: "load_avg_top_sql",
            description: "Database load average grouped by top SQL statements",
            parameters: metrics_parameters(),
            output_columns: metrics_columns(),
            source: ReportSource::Metrics {
                query_spec: include_str!("metrics/load_avg_top_sql.json"),
            },
            fan_out_param: None,
        },
    ]
});

/// All registered reports in declaration order
pub fn all() -> &'static [ReportDefinition] {
    &REGISTRY
}

/// Look up a report by name
pub fn get(name: &str) -> ReportResult<&'static ReportDefinition> {
    REGISTRY
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| ReportError::DefinitionNotFound(name.to_string()))
}

/// Validate raw caller input against a report's parameter specs, applying
/// defaults for anything not supplied
pub fn validate(name: &str, raw: &RawParams) -> ReportResult<ReportParams> {
    let definition = get(name)?;
    validate_params(definition, raw)
}

fn validate_params(definition: &ReportDefinition, raw: &RawParams) -> ReportResult<ReportParams> {
    for key in raw.keys() {
        if definition.parameter(key).is_none() {
            return Err(ReportError::Validation(format!(
                "unknown parameter '{key}' for report '{}'",
                definition.name
            )));
        }
    }

    let mut params = ReportParams::new();
    for spec in &definition.parameters {
        let value = match raw.get(spec.name) {
            Some(supplied) => Some(coerce(definition.name, spec, supplied)?),
            None => match spec.default {
                Some(default) => {
                    let fallback = match spec.kind {
                        ParamKind::EnumList { .. } => {
                            RawParam::List(default.split(',').map(str::to_string).collect())
                        }
                        _ => RawParam::Scalar(default.to_string()),
                    };
                    Some(coerce(definition.name, spec, &fallback)?)
                }
                None => None,
            },
        };
        match value {
            Some(v) => {
                params.insert(spec.name.to_string(), v);
            }
            None if spec.required => {
                return Err(ReportError::Validation(format!(
                    "missing required parameter '{}' for report '{}'",
                    spec.name, definition.name
                )));
            }
            None => {}
        }
    }
    Ok(params)
}

fn coerce(report: &str, spec: &ParameterSpec, raw: &RawParam) -> ReportResult<ParamValue> {
    match (&spec.kind, raw) {
        (ParamKind::Str, RawParam::Scalar(s)) => Ok(ParamValue::Str(s.clone())),
        (ParamKind::Int, RawParam::Scalar(s)) => {
            s.parse::<i64>().map(ParamValue::Int).map_err(|_| {
                ReportError::Validation(format!(
                    "parameter '{}' of report '{report}' expects an integer, got '{s}'",
                    spec.name
                ))
            })
        }
        (ParamKind::Bool, RawParam::Scalar(s)) => match s.as_str() {
            "true" => Ok(ParamValue::Bool(true)),
            "false" => Ok(ParamValue::Bool(false)),
            _ => Err(ReportError::Validation(format!(
                "parameter '{}' of report '{report}' expects 'true' or 'false', got '{s}'",
                spec.name
            ))),
        },
        (ParamKind::Enum { allowed }, RawParam::Scalar(s)) => {
            if allowed.contains(&s.as_str()) {
                Ok(ParamValue::Str(s.clone()))
            } else {
                Err(ReportError::Validation(format!(
                    "parameter '{}' of report '{report}' must be one of [{}], got '{s}'",
                    spec.name,
                    allowed.join(", ")
                )))
            }
        }
        (ParamKind::EnumList { allowed }, RawParam::List(items)) => {
            for item in items {
                if !allowed.contains(&item.as_str()) {
                    return Err(ReportError::Validation(format!(
                        "parameter '{}' of report '{report}' must only contain [{}], got '{item}'",
                        spec.name,
                        allowed.join(", ")
                    )));
                }
            }
            Ok(ParamValue::List(items.clone()))
        }
        (ParamKind::EnumList { .. }, RawParam::Scalar(s)) => Err(ReportError::Validation(format!(
            "parameter '{}' of report '{report}' expects a list, got scalar '{s}'",
            spec.name
        ))),
        (_, RawParam::List(_)) => Err(ReportError::Validation(format!(
            "parameter '{}' of report '{report}' does not accept a list",
            spec.name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_all_reports_registered_with_unique_names() {
        let names: Vec<&str> = all().iter().map(|d| d.name).collect();
        assert_eq!(names.len(), 11);
        let mut deduped = names.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
    }

    #[test]
    fn test_get_known_report() {
        let definition = get("sql_time_stats_by_type").unwrap();
        assert_eq!(definition.name, "sql_time_stats_by_type");
        assert!(matches!(definition.source, ReportSource::Sql { .. }));
    }

    #[test]
    fn test_get_unknown_report() {
        let err = get("no_such_report").unwrap_err();
        assert!(matches!(err, ReportError::DefinitionNotFound(_)));
        assert!(err.to_string().contains("no_such_report"));
    }

    #[test]
    fn test_only_top_sql_fans_out() {
        for definition in all() {
            if definition.name == "top_sql_stats_by_type" {
                assert_eq!(definition.fan_out_param, Some("sql_type"));
            } else {
                assert_eq!(definition.fan_out_param, None);
            }
        }
    }

    #[test]
    fn test_sql_sources_have_templates() {
        for definition in all() {
            if let ReportSource::Sql { template } = definition.source {
                assert!(!template.trim().is_empty(), "{} template empty", definition.name);
            }
        }
    }

    #[test]
    fn test_validate_applies_defaults() {
        let params = validate("sql_time_stats_by_type", &RawParams::new()).unwrap();
        assert_eq!(
            params.get("order_by"),
            Some(&ParamValue::Str("avg_time_ms".to_string()))
        );
        assert_eq!(params.get("dbname"), Some(&ParamValue::Str("_all".to_string())));
    }

    #[test]
    fn test_validate_enum_list_default_splits() {
        let mut raw = RawParams::new();
        raw.insert("sql_type".to_string(), RawParam::from("SELECT"));
        let params = validate("top_sql_stats_by_type", &raw).unwrap();
        assert_eq!(
            params.get("fetch_fields"),
            Some(&ParamValue::List(vec![
                "rows".to_string(),
                "calls".to_string(),
                "total_time".to_string(),
            ]))
        );
        assert_eq!(params.get("count"), Some(&ParamValue::Int(10)));
    }

    #[test]
    fn test_validate_rejects_unknown_key() {
        let mut raw = RawParams::new();
        raw.insert("no_such_param".to_string(), RawParam::from("x"));
        let err = validate("indexes_usage", &raw).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
        assert!(err.to_string().contains("no_such_param"));
        assert!(err.to_string().contains("indexes_usage"));
    }

    #[test]
    fn test_validate_rejects_missing_required() {
        let err = validate("counter_metrics", &RawParams::new()).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
        assert!(err.to_string().contains("db_id"));
    }

    #[test]
    fn test_validate_enum_is_case_sensitive() {
        let mut raw = RawParams::new();
        raw.insert("order_by".to_string(), RawParam::from("AVG_TIME_MS"));
        let err = validate("sql_time_stats_by_type", &raw).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
        assert!(err.to_string().contains("order_by"));
    }

    #[test]
    fn test_validate_rejects_non_integer() {
        let mut raw = RawParams::new();
        raw.insert("db_id".to_string(), RawParam::from("mydb"));
        raw.insert("period_s".to_string(), RawParam::from("soon"));
        let err = validate("counter_metrics", &raw).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
        assert!(err.to_string().contains("period_s"));
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn test_validate_rejects_out_of_set_list_member() {
        let mut raw = RawParams::new();
        raw.insert("sql_type".to_string(), RawParam::from("SELECT"));
        raw.insert(
            "fetch_fields".to_string(),
            RawParam::from(vec!["calls".to_string(), "not_a_field".to_string()]),
        );
        let err = validate("top_sql_stats_by_type", &raw).unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
        assert!(err.to_string().contains("not_a_field"));
    }

    #[test]
    fn test_validate_rejects_shape_mismatches() {
        let mut raw = RawParams::new();
        raw.insert("sql_type".to_string(), RawParam::from("SELECT"));
        raw.insert("fetch_fields".to_string(), RawParam::from("calls"));
        let err = validate("top_sql_stats_by_type", &raw).unwrap_err();
        assert!(err.to_string().contains("expects a list"));

        let mut raw = RawParams::new();
        raw.insert(
            "order_by".to_string(),
            RawParam::from(vec!["avg_time_ms".to_string()]),
        );
        let err = validate("sql_time_stats_by_type", &raw).unwrap_err();
        assert!(err.to_string().contains("does not accept a list"));
    }

    #[test]
    fn test_bool_coercion() {
        let spec = ParameterSpec {
            name: "flag",
            kind: ParamKind::Bool,
            required: false,
            default: None,
        };
        assert_eq!(
            coerce("synthetic", &spec, &RawParam::from("true")).unwrap(),
            ParamValue::Bool(true)
        );
        assert_eq!(
            coerce("synthetic", &spec, &RawParam::from("false")).unwrap(),
            ParamValue::Bool(false)
        );
        assert!(coerce("synthetic", &spec, &RawParam::from("yes")).is_err());
    }

    #[test]
    fn test_sql_type_lookup() {
        assert_eq!(sql_type_value("SELECT"), Some("SELECT"));
        assert_eq!(sql_type_value("TRANSACTION"), Some("BEGIN"));
        assert_eq!(sql_type_value("EXPLAIN"), None);
        assert_eq!(sql_type_labels().len(), SQL_TYPE_VALUES.len());
    }
}
