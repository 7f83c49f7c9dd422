//! # pgsight-core
//!
//! Report definitions, query executors and rendering for `pgsight`, a
//! reporting tool over PostgreSQL statistics views and AWS RDS Performance
//! Insights.
//!
//! The pipeline: a named [`report::ReportDefinition`] plus raw caller
//! parameters is validated by [`report::registry`], resolved into a
//! [`executor::SourceQuery`] (rendered SQL or a metrics request), executed
//! by a [`executor::QueryExecutor`] and rendered with [`render::render`].
//! [`runner`] drives the whole pipeline, including fan-out reports.

pub mod config;
pub mod error;
pub mod executor;
pub mod render;
pub mod report;
pub mod runner;
pub mod time;
pub mod types;

pub use config::{AwsConnectionParams, PgConnectionParams, TunnelParams};
pub use error::{ReportError, ReportResult};
pub use executor::metrics::PerformanceInsightsExecutor;
pub use executor::postgres::PostgresExecutor;
pub use executor::{MetricsRequest, QueryExecutor, ServiceKind, SourceQuery};
pub use render::render;
pub use report::{FanOutGroups, ParamValue, RawParam, RawParams, ReportDefinition, ReportParams};
pub use time::{parse_instant, resolve_window, TimeWindow};
pub use types::{ResultSet, TableFormat};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
