pub mod buffers;
pub mod indexes;
pub mod sql;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};

use pgsight_core::config::{DEFAULT_DB_PORT, DEFAULT_SSH_PORT, DEFAULT_TIMEOUT};
use pgsight_core::runner;
use pgsight_core::{
    FanOutGroups, PgConnectionParams, PostgresExecutor, RawParams, TableFormat, TunnelParams,
};

use crate::cli::output;

#[derive(Args)]
pub struct PgArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: PgCommands,
}

/// Connection flags, each backed by a PGSIGHT_* environment variable
/// (a `.env` file in the working directory is honored)
#[derive(Args, Clone)]
pub struct ConnectionArgs {
    /// Database host
    #[arg(long, env = "PGSIGHT_DB_HOST", default_value = "", global = true)]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "PGSIGHT_DB_PORT", default_value_t = DEFAULT_DB_PORT, global = true)]
    pub db_port: u16,

    /// Database user
    #[arg(long, env = "PGSIGHT_DB_USER", default_value = "", global = true)]
    pub db_user: String,

    /// Database password
    #[arg(
        long,
        env = "PGSIGHT_DB_PASS",
        default_value = "",
        hide_env_values = true,
        global = true
    )]
    pub db_pass: String,

    /// Database name
    #[arg(long, env = "PGSIGHT_DB_NAME", default_value = "", global = true)]
    pub db_name: String,

    /// Connect through an SSH tunnel
    #[arg(long, env = "PGSIGHT_SSH_TUNNEL", global = true)]
    pub ssh_tunnel: bool,

    /// SSH bastion host
    #[arg(long, env = "PGSIGHT_SSH_HOST", default_value = "", global = true)]
    pub ssh_host: String,

    /// SSH bastion port
    #[arg(long, env = "PGSIGHT_SSH_PORT", default_value_t = DEFAULT_SSH_PORT, global = true)]
    pub ssh_port: u16,

    /// SSH user
    #[arg(long, env = "PGSIGHT_SSH_USER", default_value = "", global = true)]
    pub ssh_user: String,

    /// SSH password
    #[arg(long, env = "PGSIGHT_SSH_PASS", hide_env_values = true, global = true)]
    pub ssh_pass: Option<String>,

    /// SSH private key path
    #[arg(long, env = "PGSIGHT_SSH_KEY_PATH", global = true)]
    pub ssh_key_path: Option<PathBuf>,

    /// SSH private key passphrase
    #[arg(long, env = "PGSIGHT_SSH_KEY_PASS", hide_env_values = true, global = true)]
    pub ssh_key_pass: Option<String>,

    /// Seconds allowed for connecting and for each query
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs(), global = true)]
    pub timeout_s: u64,
}

impl ConnectionArgs {
    pub fn to_params(&self) -> PgConnectionParams {
        let tunnel = self.ssh_tunnel.then(|| TunnelParams {
            ssh_host: self.ssh_host.clone(),
            ssh_port: self.ssh_port,
            ssh_user: self.ssh_user.clone(),
            ssh_password: none_if_empty(self.ssh_pass.as_deref()),
            ssh_key_path: self.ssh_key_path.clone(),
            ssh_key_passphrase: none_if_empty(self.ssh_key_pass.as_deref()),
        });
        PgConnectionParams {
            host: self.db_host.clone(),
            port: self.db_port,
            user: self.db_user.clone(),
            password: self.db_pass.clone(),
            dbname: self.db_name.clone(),
            tunnel,
            timeout: Duration::from_secs(self.timeout_s),
        }
    }
}

// Set-but-empty environment variables do not count as supplied secrets
fn none_if_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

#[derive(Subcommand)]
pub enum PgCommands {
    /// Statement statistics from pg_stat_statements and pg_stat_activity
    Sql(sql::SqlArgs),

    /// Index usage statistics
    Indexes(indexes::IndexesArgs),

    /// Buffer cache statistics
    Buffers(buffers::BuffersArgs),
}

pub fn run(args: PgArgs) -> anyhow::Result<()> {
    match args.command {
        PgCommands::Sql(cmd) => sql::run(&args.connection, cmd),
        PgCommands::Indexes(cmd) => indexes::run(&args.connection, cmd),
        PgCommands::Buffers(cmd) => buffers::run(&args.connection, cmd),
    }
}

/// Run one PostgreSQL-backed report end-to-end and print it
pub(crate) fn execute_report(
    conn: &ConnectionArgs,
    name: &str,
    raw: &RawParams,
    format: TableFormat,
) -> anyhow::Result<()> {
    let params = conn.to_params();
    params.validate()?;

    let executor = PostgresExecutor::new(params);
    let runtime = tokio::runtime::Runtime::new()?;
    let output = runtime.block_on(runner::run(name, raw, &executor))?;
    output::print_report(name, raw, format, &output)?;
    Ok(())
}

/// Fan-out variant: one table per group, sequential, first failure aborts
pub(crate) fn execute_fan_out_report(
    conn: &ConnectionArgs,
    name: &str,
    raw: &RawParams,
    groups: &FanOutGroups,
    format: TableFormat,
) -> anyhow::Result<()> {
    let params = conn.to_params();
    params.validate()?;

    let executor = PostgresExecutor::new(params);
    let runtime = tokio::runtime::Runtime::new()?;
    let output = runtime.block_on(runner::run_fan_out(name, raw, groups, &executor))?;
    output::print_report(name, raw, format, &output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection_args() -> ConnectionArgs {
        ConnectionArgs {
            db_host: "db.internal".to_string(),
            db_port: 5432,
            db_user: "reporting".to_string(),
            db_pass: "secret".to_string(),
            db_name: "app".to_string(),
            ssh_tunnel: false,
            ssh_host: String::new(),
            ssh_port: 22,
            ssh_user: String::new(),
            ssh_pass: None,
            ssh_key_path: None,
            ssh_key_pass: None,
            timeout_s: 30,
        }
    }

    #[test]
    fn test_to_params_without_tunnel() {
        let params = connection_args().to_params();
        assert_eq!(params.host, "db.internal");
        assert_eq!(params.timeout, Duration::from_secs(30));
        assert!(params.tunnel.is_none());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_to_params_builds_tunnel_when_enabled() {
        let mut args = connection_args();
        args.ssh_tunnel = true;
        args.ssh_host = "bastion.internal".to_string();
        args.ssh_user = "ops".to_string();
        args.ssh_key_path = Some(PathBuf::from("/home/ops/.ssh/id_ed25519"));

        let params = args.to_params();
        let tunnel = params.tunnel.as_ref().unwrap();
        assert_eq!(tunnel.ssh_host, "bastion.internal");
        assert_eq!(tunnel.ssh_port, 22);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_empty_secrets_are_dropped() {
        let mut args = connection_args();
        args.ssh_tunnel = true;
        args.ssh_host = "bastion.internal".to_string();
        args.ssh_user = "ops".to_string();
        args.ssh_pass = Some(String::new());

        let params = args.to_params();
        let tunnel = params.tunnel.as_ref().unwrap();
        assert!(tunnel.ssh_password.is_none());
        // no auth method left, validation must refuse it
        assert!(params.validate().is_err());
    }
}
