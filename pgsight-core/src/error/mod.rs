//! Core error types for pgsight

use thiserror::Error;

/// Main error type for report operations
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report not found: {0}")]
    DefinitionNotFound(String),

    #[error("Template render error: {0}")]
    TemplateRender(String),

    #[error("Invalid duration format: {0}")]
    InvalidDurationFormat(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Tunnel error: {0}")]
    Tunnel(String),

    #[error("Query execution error: {0}")]
    QueryExecution(String),

    #[error("Unsupported service type: {0}")]
    UnsupportedServiceType(String),

    #[error("Unsupported table format: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("report group '{group}' failed (completed: [{}]): {source}", .completed.join(", "))]
    ReportExecution {
        group: String,
        completed: Vec<String>,
        #[source]
        source: Box<ReportError>,
    },
}

/// Result type alias for report operations
pub type ReportResult<T> = Result<T, ReportError>;

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let io_error = ReportError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(format!("{}", io_error).contains("IO error"));

        let not_found = ReportError::DefinitionNotFound("no_such_report".to_string());
        assert_eq!(format!("{}", not_found), "Report not found: no_such_report");

        let render = ReportError::TemplateRender("undefined variable".to_string());
        assert_eq!(
            format!("{}", render),
            "Template render error: undefined variable"
        );

        let duration = ReportError::InvalidDurationFormat("2x".to_string());
        assert_eq!(format!("{}", duration), "Invalid duration format: 2x");

        let validation = ReportError::Validation("unknown parameter 'foo'".to_string());
        assert_eq!(format!("{}", validation), "Invalid input: unknown parameter 'foo'");

        let connection = ReportError::Connection("refused".to_string());
        assert_eq!(format!("{}", connection), "Connection error: refused");

        let tunnel = ReportError::Tunnel("handshake failed".to_string());
        assert_eq!(format!("{}", tunnel), "Tunnel error: handshake failed");

        let query = ReportError::QueryExecution("relation does not exist".to_string());
        assert_eq!(
            format!("{}", query),
            "Query execution error: relation does not exist"
        );

        let service = ReportError::UnsupportedServiceType("DOCDB".to_string());
        assert_eq!(format!("{}", service), "Unsupported service type: DOCDB");

        let format_err = ReportError::UnsupportedFormat("fancy_grid".to_string());
        assert_eq!(format!("{}", format_err), "Unsupported table format: fancy_grid");

        let serialization = ReportError::Serialization("invalid JSON".to_string());
        assert_eq!(format!("{}", serialization), "Serialization error: invalid JSON");
    }

    #[test]
    fn test_report_execution_display_names_group_and_completed() {
        let err = ReportError::ReportExecution {
            group: "INSERT".to_string(),
            completed: vec!["SELECT".to_string()],
            source: Box::new(ReportError::QueryExecution("boom".to_string())),
        };

        let rendered = format!("{}", err);
        assert_eq!(
            rendered,
            "report group 'INSERT' failed (completed: [SELECT]): Query execution error: boom"
        );
    }

    #[test]
    fn test_report_execution_source_chain() {
        let err = ReportError::ReportExecution {
            group: "UPDATE".to_string(),
            completed: vec![],
            source: Box::new(ReportError::Connection("timeout".to_string())),
        };

        let source = std::error::Error::source(&err).expect("source present");
        assert!(source.to_string().contains("timeout"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let report_err: ReportError = io_err.into();

        match report_err {
            ReportError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let parse_result: Result<serde_json::Value, serde_json::Error> =
            serde_json::from_str("{invalid json}");

        assert!(parse_result.is_err());
        let report_err: ReportError = parse_result.unwrap_err().into();

        assert!(matches!(report_err, ReportError::Serialization(_)));
    }

    #[test]
    fn test_error_result_type() {
        fn returns_ok() -> ReportResult<String> {
            Ok("success".to_string())
        }

        fn returns_err() -> ReportResult<String> {
            Err(ReportError::DefinitionNotFound("item".to_string()))
        }

        assert!(returns_ok().is_ok());
        match returns_err().unwrap_err() {
            ReportError::DefinitionNotFound(msg) => assert_eq!(msg, "item"),
            _ => panic!("Expected DefinitionNotFound error"),
        }
    }

    #[test]
    fn test_error_is_type_checking() {
        let validation = ReportError::Validation("bad".to_string());
        let tunnel = ReportError::Tunnel("down".to_string());

        assert!(matches!(validation, ReportError::Validation(_)));
        assert!(!matches!(validation, ReportError::Tunnel(_)));
        assert!(matches!(tunnel, ReportError::Tunnel(_)));
    }
}
