//! Report definitions and parameter model
//!
//! A report is a named, static definition: the parameters it accepts, the
//! columns it documents and the source it draws from (an embedded SQL
//! template or a Performance Insights metric-query resource). Definitions
//! live in [`registry`]; SQL templates are rendered by [`templates`].

pub mod registry;
pub mod templates;

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// Parameter value kinds accepted by report definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    Str,
    Int,
    Bool,
    /// Closed set of accepted values, matched case-sensitively
    Enum { allowed: &'static [&'static str] },
    /// List whose members come from a closed set
    EnumList { allowed: &'static [&'static str] },
}

/// One parameter a report accepts
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    /// Literal default; for `EnumList` a comma-separated member list
    pub default: Option<&'static str>,
}

/// Documentation for one output column
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub description: &'static str,
}

/// Where a report's data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportSource {
    /// Embedded SQL template rendered against the validated parameters
    Sql { template: &'static str },
    /// Embedded JSON resource holding the metric queries to issue
    Metrics { query_spec: &'static str },
}

/// A named report: parameters, column docs and data source
#[derive(Debug, Clone)]
pub struct ReportDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParameterSpec>,
    pub output_columns: Vec<ColumnSpec>,
    pub source: ReportSource,
    /// Parameter substituted per group when the report fans out
    pub fan_out_param: Option<&'static str>,
}

impl ReportDefinition {
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

/// Validated parameter value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<String>),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// Unvalidated parameter input as supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawParam {
    Scalar(String),
    List(Vec<String>),
}

impl From<&str> for RawParam {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for RawParam {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<String>> for RawParam {
    fn from(values: Vec<String>) -> Self {
        Self::List(values)
    }
}

/// Caller input, report parameter name to raw value
pub type RawParams = BTreeMap<String, RawParam>;

/// Validated input, report parameter name to typed value
pub type ReportParams = BTreeMap<String, ParamValue>;

/// Fan-out groups: display label to source filter value, in declared order
pub type FanOutGroups = IndexMap<String, String>;
