pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pgsight",
    version,
    about = "Performance reports for PostgreSQL and AWS RDS Performance Insights",
    long_about = "pgsight renders performance reports from PostgreSQL statistics views \
                  (pg_stat_statements, pg_stat_activity, index and buffer statistics) and \
                  from the AWS RDS Performance Insights metrics API, as formatted tables \
                  on the terminal."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reports sourced from PostgreSQL statistics views
    Pg(commands::pg::PgArgs),

    /// Reports sourced from AWS RDS Performance Insights
    Rds(commands::rds::RdsArgs),
}
