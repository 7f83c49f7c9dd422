//! Connection parameter types shared by the executors

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ReportError, ReportResult};

pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_SSH_PORT: u16 = 22;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// SSH tunnel settings used when the database is only reachable via a bastion
#[derive(Debug, Clone)]
pub struct TunnelParams {
    pub ssh_host: String,
    pub ssh_port: u16,
    pub ssh_user: String,
    pub ssh_password: Option<String>,
    pub ssh_key_path: Option<PathBuf>,
    pub ssh_key_passphrase: Option<String>,
}

impl TunnelParams {
    /// Checks that the tunnel can actually be attempted
    pub fn validate(&self) -> ReportResult<()> {
        if self.ssh_host.is_empty() {
            return Err(ReportError::Validation(
                "ssh_host is required when ssh tunneling is enabled".to_string(),
            ));
        }
        if self.ssh_user.is_empty() {
            return Err(ReportError::Validation(
                "ssh_user is required when ssh tunneling is enabled".to_string(),
            ));
        }
        if self.ssh_key_path.is_none() && self.ssh_password.is_none() {
            return Err(ReportError::Validation(
                "one of the supported SSH authentication methods is required: \
                 key (ssh_key_path) or password (ssh_pass)"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

/// Connection settings for a single PostgreSQL invocation.
///
/// Owned by the caller and passed by reference into the executor; never
/// persisted anywhere.
#[derive(Debug, Clone)]
pub struct PgConnectionParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub tunnel: Option<TunnelParams>,
    /// Deadline applied to connect and to each query
    pub timeout: Duration,
}

impl PgConnectionParams {
    pub fn validate(&self) -> ReportResult<()> {
        if self.host.is_empty() {
            return Err(ReportError::Validation("db_host is required".to_string()));
        }
        if self.user.is_empty() {
            return Err(ReportError::Validation("db_user is required".to_string()));
        }
        if self.dbname.is_empty() {
            return Err(ReportError::Validation("db_name is required".to_string()));
        }
        if let Some(tunnel) = &self.tunnel {
            tunnel.validate()?;
        }
        Ok(())
    }
}

/// AWS credentials selection for the Performance Insights executor
#[derive(Debug, Clone, Default)]
pub struct AwsConnectionParams {
    pub profile: Option<String>,
    pub region: Option<String>,
}
