//! Error types for run configuration.
//!
//! Only one class of failure is modeled by the harness: an invalid or missing
//! run configuration. [`RunConfig::resolve`](crate::config::RunConfig::resolve)
//! never propagates these errors, it falls back to the defaults and hands the
//! reason back to the caller so it can be reported.

use std::num::ParseIntError;

use thiserror::Error;

/// Reasons a run configuration can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required flag was not supplied.
    #[error("missing --{flag}")]
    Missing {
        /// Flag name without the leading dashes.
        flag: &'static str,
    },

    /// A flag value is not an integer.
    #[error("invalid --{flag} value {value:?}: {source}")]
    Invalid {
        /// Flag name without the leading dashes.
        flag: &'static str,
        /// The raw value as given.
        value: String,
        /// Underlying parse failure.
        source: ParseIntError,
    },

    /// A flag value is zero.
    #[error("--{flag} must be a positive integer")]
    NotPositive {
        /// Flag name without the leading dashes.
        flag: &'static str,
    },

    /// `threads × iterations` does not fit in a `u64`.
    #[error("{threads} threads x {iterations} iterations overflows the expected count")]
    Overflow {
        /// Requested thread count.
        threads: usize,
        /// Requested iteration count.
        iterations: u64,
    },

    /// A discipline label was not recognized.
    #[error("unknown discipline {0:?}")]
    UnknownDiscipline(String),

    /// The discipline list is empty.
    #[error("at least one discipline must be selected")]
    NoDisciplines,
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_missing() {
        let err = ConfigError::Missing { flag: "threads" };
        assert_eq!(err.to_string(), "missing --threads");
    }

    #[test]
    fn test_display_invalid() {
        let source = "abc".parse::<u64>().unwrap_err();
        let err = ConfigError::Invalid {
            flag: "iterations",
            value: "abc".to_string(),
            source,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("invalid --iterations value \"abc\""));
    }

    #[test]
    fn test_display_overflow() {
        let err = ConfigError::Overflow {
            threads: 2,
            iterations: u64::MAX,
        };
        assert!(err.to_string().contains("overflows"));
    }
}
