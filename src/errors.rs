//! Typed error hierarchy for ci-guard.
//!
//! Two enums cover the two fallible surfaces:
//! - `ConfigError`: loading and compiling `ci-guard.toml`
//! - `ProtocolError`: decoding host events and encoding responses
//!
//! Probe failures are deliberately absent: a failed VCS or filesystem probe
//! is a negative answer, never an error.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or compiling the guard configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid {field} pattern '{pattern}': {source}")]
    InvalidPattern {
        field: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors from the host event stream.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed event: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("I/O error on event stream: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_read_carries_path() {
        let path = PathBuf::from("/repo/.config/ci-guard.toml");
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = ConfigError::Read {
            path: path.clone(),
            source: io_err,
        };
        match &err {
            ConfigError::Read { path: p, source: s } => {
                assert_eq!(p, &path);
                assert_eq!(s.kind(), std::io::ErrorKind::PermissionDenied);
            }
            _ => panic!("Expected Read"),
        }
        assert!(err.to_string().contains("ci-guard.toml"));
    }

    #[test]
    fn config_error_invalid_pattern_names_field() {
        let source = regex::Regex::new("(unclosed").unwrap_err();
        let err = ConfigError::InvalidPattern {
            field: "validation",
            pattern: "(unclosed".to_string(),
            source,
        };
        let text = err.to_string();
        assert!(text.contains("validation"));
        assert!(text.contains("(unclosed"));
    }

    #[test]
    fn protocol_error_converts_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: ProtocolError = io_err.into();
        assert!(matches!(err, ProtocolError::Io(_)));
    }

    #[test]
    fn protocol_error_malformed_is_matchable() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = ProtocolError::Malformed(source);
        assert!(matches!(err, ProtocolError::Malformed(_)));
        assert!(err.to_string().starts_with("Malformed event"));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        let config_err = ConfigError::Read {
            path: PathBuf::from("x"),
            source: std::io::Error::other("x"),
        };
        assert_std_error(&config_err);
        let protocol_err = ProtocolError::Io(std::io::Error::other("x"));
        assert_std_error(&protocol_err);
    }
}
