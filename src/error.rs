// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Error types for Wetwire Observability

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Wetwire Observability
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// I/O error tied to a specific path
    #[error("I/O error on {}: {source}", path.display())]
    IoAt {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Structured parse error with file and line context
    #[error("{}{}: {message}", path.display(), line.map(|l| format!(":{}", l)).unwrap_or_default())]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Feature not supported
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// External command failed
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Attach a path to an I/O error
    pub fn io_at(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::IoAt {
            path: path.into(),
            source,
        }
    }

    /// Build a parse error for a file
    pub fn parse(path: impl Into<PathBuf>, line: Option<usize>, message: impl Into<String>) -> Self {
        Error::Parse {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_parse_with_line() {
        let err = Error::parse("prometheus.yml", Some(12), "unexpected key");
        assert_eq!(err.to_string(), "prometheus.yml:12: unexpected key");
    }

    #[test]
    fn test_error_display_parse_without_line() {
        let err = Error::parse("dash.json", None, "not an object");
        assert_eq!(err.to_string(), "dash.json: not an object");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file missing");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn test_error_io_at_mentions_path() {
        let err = Error::io_at(
            "/nope/out.yml",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/nope/out.yml"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ invalid json }}}").unwrap_err();
        let err: Error = json_err.into();
        assert!(err.to_string().contains("JSON error"));
    }

    #[test]
    fn test_error_unsupported() {
        let err = Error::Unsupported("operator mode".to_string());
        assert_eq!(err.to_string(), "Unsupported: operator mode");
    }
}
