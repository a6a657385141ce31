//! Error types for cache-aware sparse blocking
//!
//! Provides a unified error type for all cacheblock crates.

use thiserror::Error;

/// Core error type for blocking, arrangement and layout operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The same coordinate appears twice in a COO matrix
    #[error("Duplicate entry at ({row}, {col})")]
    DuplicateEntry { row: usize, col: usize },

    /// Clipping could not produce an origin that is not already registered
    #[error("Tile origin ({row}, {col}) collides with an existing tile and cannot shrink further")]
    OriginCollision { row: usize, col: usize },

    /// Arrangement ran out of candidates while tiles were still unvisited
    #[error(
        "Arrangement exhausted in region ({region_row}, {region_col}): {visited} of {total} tiles placed"
    )]
    ArrangementExhausted {
        region_row: usize,
        region_col: usize,
        visited: usize,
        total: usize,
    },

    /// Tile edge outside the serializable domain
    #[error("Tile edge {edge} at ({row}, {col}) is outside the supported range 1..={max}")]
    ShapeOutOfDomain {
        edge: usize,
        row: usize,
        col: usize,
        max: usize,
    },

    /// Malformed layout or Matrix Market text
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// IO error (for file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error for an out-of-range rate or fraction
    pub fn invalid_rate(name: &str, value: f64) -> Self {
        Self::InvalidParameter(format!("{name} {value} must be in (0, 1]"))
    }

    /// Create an error for a coordinate outside the matrix
    pub fn out_of_bounds(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        Self::InvalidInput(format!(
            "Entry ({row}, {col}) lies outside a {rows}x{cols} matrix"
        ))
    }

    /// Create a parse error at the given 1-based line
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Whether this error aborts processing of the current matrix
    pub fn is_fatal_construction(&self) -> bool {
        matches!(
            self,
            Self::OriginCollision { .. }
                | Self::ArrangementExhausted { .. }
                | Self::ShapeOutOfDomain { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidParameter("sampling_rate must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid parameter: sampling_rate must be positive");

        let err = Error::DuplicateEntry { row: 3, col: 4 };
        assert_eq!(err.to_string(), "Duplicate entry at (3, 4)");

        let err = Error::OriginCollision { row: 7, col: 9 };
        assert_eq!(
            err.to_string(),
            "Tile origin (7, 9) collides with an existing tile and cannot shrink further"
        );

        let err = Error::ArrangementExhausted {
            region_row: 1,
            region_col: 2,
            visited: 3,
            total: 5,
        };
        assert_eq!(
            err.to_string(),
            "Arrangement exhausted in region (1, 2): 3 of 5 tiles placed"
        );

        let err = Error::ShapeOutOfDomain {
            edge: 5,
            row: 0,
            col: 0,
            max: 4,
        };
        assert_eq!(
            err.to_string(),
            "Tile edge 5 at (0, 0) is outside the supported range 1..=4"
        );
    }

    #[test]
    fn test_error_helper_functions() {
        let err = Error::invalid_rate("sampling_rate", 1.5);
        assert_eq!(err.to_string(), "Invalid parameter: sampling_rate 1.5 must be in (0, 1]");

        let err = Error::out_of_bounds(10, 2, 5, 5);
        assert_eq!(
            err.to_string(),
            "Invalid input: Entry (10, 2) lies outside a 5x5 matrix"
        );

        let err = Error::parse(12, "expected 3 tokens");
        assert_eq!(err.to_string(), "Parse error at line 12: expected 3 tokens");
    }

    #[test]
    fn test_error_from_io_error() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => assert!(err.to_string().contains("file not found")),
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::OriginCollision { row: 0, col: 0 }.is_fatal_construction());
        assert!(Error::ShapeOutOfDomain {
            edge: 0,
            row: 0,
            col: 0,
            max: 4
        }
        .is_fatal_construction());
        assert!(!Error::InvalidInput("x".into()).is_fatal_construction());
        assert!(!Error::parse(1, "x").is_fatal_construction());
    }
}
