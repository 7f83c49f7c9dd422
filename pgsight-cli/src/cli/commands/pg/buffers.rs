use clap::{Args, Subcommand};

use super::indexes::SchemaScopedArgs;
use super::ConnectionArgs;

#[derive(Args)]
pub struct BuffersArgs {
    #[command(subcommand)]
    pub command: BuffersCommands,
}

#[derive(Subcommand)]
pub enum BuffersCommands {
    /// Buffer cache hit ratios per table
    TableCacheHits(SchemaScopedArgs),

    /// Buffer cache hit ratios per index
    IndexCacheHits(SchemaScopedArgs),

    /// Shared buffer residency per relation (needs pg_buffercache)
    Usage(SchemaScopedArgs),
}

pub fn run(conn: &ConnectionArgs, args: BuffersArgs) -> anyhow::Result<()> {
    match args.command {
        BuffersCommands::TableCacheHits(args) => {
            let _span = tracing::info_span!("pg_buffers_table_cache_hits").entered();
            super::execute_report(conn, "buffers_table_cache_hits", &args.raw_params(), args.format)
        }
        BuffersCommands::IndexCacheHits(args) => {
            let _span = tracing::info_span!("pg_buffers_index_cache_hits").entered();
            super::execute_report(conn, "buffers_index_cache_hits", &args.raw_params(), args.format)
        }
        BuffersCommands::Usage(args) => {
            let _span = tracing::info_span!("pg_buffers_usage").entered();
            super::execute_report(conn, "buffers_usage", &args.raw_params(), args.format)
        }
    }
}
