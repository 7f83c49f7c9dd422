use clap::{Args, Subcommand};

use pgsight_core::{RawParam, RawParams, TableFormat};

use super::ConnectionArgs;

#[derive(Args)]
pub struct IndexesArgs {
    #[command(subcommand)]
    pub command: IndexesCommands,
}

#[derive(Subcommand)]
pub enum IndexesCommands {
    /// Scan and write statistics per index
    Usage(SchemaScopedArgs),

    /// Indexes worth attention, with the reason
    UsageHints(SchemaScopedArgs),
}

#[derive(Args)]
pub struct SchemaScopedArgs {
    /// Schema to inspect; `_all` lifts the filter
    #[arg(long, default_value = "public")]
    pub schema: String,

    /// Table output format
    #[arg(long, value_enum, default_value_t = TableFormat::Psql)]
    pub format: TableFormat,
}

impl SchemaScopedArgs {
    pub(crate) fn raw_params(&self) -> RawParams {
        let mut raw = RawParams::new();
        raw.insert("schema".to_string(), RawParam::from(self.schema.clone()));
        raw
    }
}

pub fn run(conn: &ConnectionArgs, args: IndexesArgs) -> anyhow::Result<()> {
    match args.command {
        IndexesCommands::Usage(args) => {
            let _span = tracing::info_span!("pg_indexes_usage").entered();
            super::execute_report(conn, "indexes_usage", &args.raw_params(), args.format)
        }
        IndexesCommands::UsageHints(args) => {
            let _span = tracing::info_span!("pg_indexes_usage_hints").entered();
            super::execute_report(conn, "indexes_usage_hints", &args.raw_params(), args.format)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_params_carry_schema() {
        let args = SchemaScopedArgs {
            schema: "billing".to_string(),
            format: TableFormat::Psql,
        };
        let raw = args.raw_params();
        assert_eq!(raw["schema"], RawParam::Scalar("billing".to_string()));
    }
}
