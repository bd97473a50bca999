//! Error types for the restodash pipeline.
//!
//! - [`LoadError`] - a data source could not be read or joined (fatal)
//! - [`EmptyResultWarning`] - a view produced zero rows (non-fatal)
//! - [`ViewParseError`] - an unknown view selector
//! - [`ServerError`] - HTTP surface errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use serde::Serialize;
use thiserror::Error;

use crate::views::ViewId;

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while loading the restaurant or country sources.
///
/// Any of these aborts startup: no view can be served without the
/// enriched table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read the source.
    #[error("Failed to read {source_name}: {error}")]
    Io {
        source_name: String,
        #[source]
        error: std::io::Error,
    },

    /// Bytes could not be decoded.
    #[error("Failed to decode {source_name}: {message}")]
    Encoding { source_name: String, message: String },

    /// Source has no header line.
    #[error("{0} is empty")]
    EmptySource(String),

    /// A contract column is absent from the header.
    #[error("{source_name} is missing required column '{column}'")]
    MissingColumn { source_name: String, column: String },

    /// A cell could not be read as the column's type.
    #[error("{source_name}, line {line}, column '{column}' (value '{value}'): not a number")]
    InvalidValue {
        source_name: String,
        line: u64,
        column: String,
        value: String,
    },

    /// Malformed CSV structure.
    #[error("Invalid CSV in {source_name}: {error}")]
    Csv {
        source_name: String,
        #[source]
        error: csv::Error,
    },
}

// =============================================================================
// Warnings
// =============================================================================

/// A view's filter or grouping matched nothing.
///
/// Not an error: the result is still returned, with zero rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[error("View {} produced no rows", .view.number())]
pub struct EmptyResultWarning {
    pub view: ViewId,
}

// =============================================================================
// Selection Errors
// =============================================================================

/// A view selector matched neither a number nor a label.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown view '{0}' (expected 1-10 or an exact view label)")]
pub struct ViewParseError(pub String);

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Dataset could not be prepared.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<ViewParseError> for ServerError {
    fn from(err: ViewParseError) -> Self {
        ServerError::BadRequest(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let load_err = LoadError::EmptySource("restaurants".into());
        let server_err: ServerError = load_err.into();
        assert!(server_err.to_string().contains("restaurants is empty"));

        let parse_err = ViewParseError("11".into());
        let server_err: ServerError = parse_err.into();
        assert!(matches!(server_err, ServerError::BadRequest(_)));
        assert!(server_err.to_string().contains("'11'"));
    }

    #[test]
    fn test_invalid_value_format() {
        let err = LoadError::InvalidValue {
            source_name: "restaurants".into(),
            line: 7,
            column: "Latitude".into(),
            value: "north".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 7"));
        assert!(msg.contains("column 'Latitude'"));
        assert!(msg.contains("value 'north'"));
    }

    #[test]
    fn test_empty_warning_names_view() {
        let warning = EmptyResultWarning { view: ViewId::IndiaOnlineDeliverySpending };
        assert_eq!(warning.to_string(), "View 8 produced no rows");
    }
}
