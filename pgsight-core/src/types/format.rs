//! Output table format types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// Table style for rendered report output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum TableFormat {
    /// psql-style ASCII table
    Psql,
    /// ASCII grid with a separator after every row
    Grid,
    /// UTF-8 grid with rounded corners
    Rounded,
    /// GitHub-flavored markdown table
    Github,
    /// Aligned columns without any borders
    Plain,
    /// Aligned columns with horizontal rules only
    Simple,
    /// Markdown pipe table
    Pipe,
    /// Tab-separated values
    Tsv,
    /// Comma-separated values
    Csv,
}

impl TableFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Psql => "psql",
            Self::Grid => "grid",
            Self::Rounded => "rounded",
            Self::Github => "github",
            Self::Plain => "plain",
            Self::Simple => "simple",
            Self::Pipe => "pipe",
            Self::Tsv => "tsv",
            Self::Csv => "csv",
        }
    }

    /// Delimited formats bypass table drawing entirely
    pub fn is_delimited(&self) -> bool {
        matches!(self, Self::Tsv | Self::Csv)
    }
}

impl Default for TableFormat {
    fn default() -> Self {
        Self::Psql
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TableFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "psql" => Ok(Self::Psql),
            "grid" => Ok(Self::Grid),
            "rounded" => Ok(Self::Rounded),
            "github" => Ok(Self::Github),
            "plain" => Ok(Self::Plain),
            "simple" => Ok(Self::Simple),
            "pipe" => Ok(Self::Pipe),
            "tsv" => Ok(Self::Tsv),
            "csv" => Ok(Self::Csv),
            other => Err(ReportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_round_trips_names() {
        for format in [
            TableFormat::Psql,
            TableFormat::Grid,
            TableFormat::Rounded,
            TableFormat::Github,
            TableFormat::Plain,
            TableFormat::Simple,
            TableFormat::Pipe,
            TableFormat::Tsv,
            TableFormat::Csv,
        ] {
            assert_eq!(format.name().parse::<TableFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = "fancy_grid".parse::<TableFormat>().unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedFormat(_)));
        assert!(err.to_string().contains("fancy_grid"));
    }

    #[test]
    fn test_from_str_is_case_sensitive() {
        assert!("PSQL".parse::<TableFormat>().is_err());
        assert!("Psql".parse::<TableFormat>().is_err());
    }

    #[test]
    fn test_default_is_psql() {
        assert_eq!(TableFormat::default(), TableFormat::Psql);
    }

    #[test]
    fn test_delimited_formats() {
        assert!(TableFormat::Tsv.is_delimited());
        assert!(TableFormat::Csv.is_delimited());
        assert!(!TableFormat::Psql.is_delimited());
        assert!(!TableFormat::Github.is_delimited());
    }
}
