//! PostgreSQL executor
//!
//! Connects per invocation (optionally through an SSH tunnel), runs the
//! rendered SQL and materializes every row into a [`ResultSet`]. Cells are
//! decoded by column type OID into JSON values; a cell the decoder does not
//! understand becomes null with a debug log rather than failing the report.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tokio_postgres::types::Type;
use tokio_postgres::{NoTls, Row, Statement};

use crate::config::PgConnectionParams;
use crate::error::{ReportError, ReportResult};
use crate::executor::tunnel::SshTunnel;
use crate::executor::{QueryExecutor, SourceQuery};
use crate::types::ResultSet;

pub struct PostgresExecutor {
    params: PgConnectionParams,
}

impl PostgresExecutor {
    pub fn new(params: PgConnectionParams) -> Self {
        Self { params }
    }

    async fn run_sql(&self, sql: &str) -> ReportResult<ResultSet> {
        let mut host = self.params.host.clone();
        let mut port = self.params.port;

        // kept alive for the duration of the query, torn down on every exit
        let _tunnel = match &self.params.tunnel {
            Some(tunnel_params) => {
                let tunnel_params = tunnel_params.clone();
                let target_host = host.clone();
                let tunnel = tokio::task::spawn_blocking(move || {
                    SshTunnel::open_blocking(&tunnel_params, &target_host, port)
                })
                .await
                .map_err(|e| ReportError::Tunnel(format!("tunnel worker failed: {e}")))??;
                host = "127.0.0.1".to_string();
                port = tunnel.local_port();
                Some(tunnel)
            }
            None => None,
        };

        let mut config = tokio_postgres::Config::new();
        config
            .host(&host)
            .port(port)
            .user(&self.params.user)
            .password(&self.params.password)
            .dbname(&self.params.dbname)
            .connect_timeout(self.params.timeout);

        let (client, connection) = config
            .connect(NoTls)
            .await
            .map_err(|e| ReportError::Connection(format!("{host}:{port}: {e}")))?;

        // the connection resolves once the client is dropped
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!("postgres connection closed: {e}");
            }
        });

        let outcome = tokio::time::timeout(self.params.timeout, async {
            let statement = client.prepare(sql).await?;
            let rows = client.query(&statement, &[]).await?;
            Ok::<_, tokio_postgres::Error>((statement, rows))
        })
        .await;

        match outcome {
            Ok(Ok((statement, rows))) => Ok(rows_to_result_set(&statement, &rows)),
            Ok(Err(e)) => Err(ReportError::QueryExecution(e.to_string())),
            Err(_) => Err(ReportError::QueryExecution(format!(
                "query timed out after {}s",
                self.params.timeout.as_secs()
            ))),
        }
    }
}

#[async_trait::async_trait]
impl QueryExecutor for PostgresExecutor {
    async fn execute(&self, query: &SourceQuery) -> ReportResult<ResultSet> {
        match query {
            SourceQuery::Sql(sql) => {
                tracing::debug!(sql = sql.as_str(), "executing report SQL");
                self.run_sql(sql).await
            }
            SourceQuery::Metrics(_) => Err(ReportError::QueryExecution(
                "postgres executor cannot serve metrics queries".to_string(),
            )),
        }
    }
}

fn rows_to_result_set(statement: &Statement, rows: &[Row]) -> ResultSet {
    let columns: Vec<String> = statement
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    let mut results = ResultSet::new(columns);
    for row in rows {
        let mut cells = Vec::with_capacity(row.len());
        for (idx, column) in row.columns().iter().enumerate() {
            cells.push(decode_cell(row, idx, column.type_()));
        }
        results.push_row(cells);
    }
    results
}

fn decode_cell(row: &Row, idx: usize, ty: &Type) -> Value {
    let decoded: Result<Value, tokio_postgres::Error> = if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx).map(json_or_null)
    } else if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx).map(json_or_null)
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx).map(json_or_null)
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx).map(json_or_null)
    } else if *ty == Type::OID {
        row.try_get::<_, Option<u32>>(idx).map(json_or_null)
    } else if *ty == Type::FLOAT4 {
        row.try_get::<_, Option<f32>>(idx).map(json_or_null)
    } else if *ty == Type::FLOAT8 {
        row.try_get::<_, Option<f64>>(idx).map(json_or_null)
    } else if *ty == Type::TIMESTAMP {
        row.try_get::<_, Option<NaiveDateTime>>(idx)
            .map(|v| v.map_or(Value::Null, |ts| Value::String(ts.to_string())))
    } else if *ty == Type::TIMESTAMPTZ {
        row.try_get::<_, Option<DateTime<Utc>>>(idx)
            .map(|v| v.map_or(Value::Null, |ts| Value::String(ts.to_rfc3339())))
    } else if *ty == Type::DATE {
        row.try_get::<_, Option<NaiveDate>>(idx)
            .map(|v| v.map_or(Value::Null, |d| Value::String(d.to_string())))
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        row.try_get::<_, Option<Value>>(idx)
            .map(|v| v.unwrap_or(Value::Null))
    } else {
        // text family plus anything the templates cast to text
        row.try_get::<_, Option<String>>(idx).map(json_or_null)
    };

    match decoded {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(column = idx, column_type = %ty, "cell not decodable: {e}");
            Value::Null
        }
    }
}

fn json_or_null<T: Into<Value>>(value: Option<T>) -> Value {
    value.map_or(Value::Null, Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executor() -> PostgresExecutor {
        PostgresExecutor::new(PgConnectionParams {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            dbname: "postgres".to_string(),
            tunnel: None,
            timeout: std::time::Duration::from_secs(1),
        })
    }

    #[tokio::test]
    async fn test_rejects_metrics_queries() {
        use crate::executor::{MetricsRequest, ServiceKind};
        use crate::time::resolve_window;

        let reference = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let request = MetricsRequest {
            service_kind: ServiceKind::Rds,
            identifier: "db-1".to_string(),
            queries: vec![],
            window: resolve_window(reference, "-1h").unwrap(),
            period_seconds: 3600,
            max_results: 100,
        };
        let err = executor()
            .execute(&SourceQuery::Metrics(request))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::QueryExecution(_)));
        assert!(err.to_string().contains("metrics"));
    }

    #[test]
    fn test_json_or_null() {
        assert_eq!(json_or_null(Some(42i64)), Value::from(42));
        assert_eq!(json_or_null::<i64>(None), Value::Null);
    }
}
