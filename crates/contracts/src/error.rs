//! Layered error definitions
//!
//! Categorized by source: config / scenario / io.
//! The sync core itself never fails; its policy violations are silent no-ops.

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Scenario Errors =====
    /// Invalid scenario step
    #[error("scenario step #{index}: {message}")]
    Scenario { index: usize, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create scenario step error
    pub fn scenario(index: usize, message: impl Into<String>) -> Self {
        Self::Scenario {
            index,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_field() {
        let err = ContractError::config_validation("engine.threshold_s", "must be > 0");
        assert_eq!(
            err.to_string(),
            "config validation error at 'engine.threshold_s': must be > 0"
        );
    }

    #[test]
    fn test_scenario_display() {
        let err = ContractError::scenario(3, "at_s must be >= 0");
        assert!(err.to_string().contains("#3"));
    }
}
