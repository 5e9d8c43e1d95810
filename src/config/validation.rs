//! Configuration validation.
//!
//! Serde handles syntax; this checks values that would only fail later at
//! bind time or while building response headers.

use axum::http::HeaderValue;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Check the whole configuration, collecting every error rather than the first.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ValidationError::new("server.port", "must be between 1 and 65535"));
    }
    // Hostnames are resolved at bind time, so only emptiness is checked here.
    if config.server.host.trim().is_empty() {
        errors.push(ValidationError::new("server.host", "must not be empty"));
    }
    if config.server.shutdown_grace_secs == 0 {
        errors.push(ValidationError::new("server.shutdown_grace_secs", "must be greater than 0"));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be greater than 0"));
    }
    if config.app.version.trim().is_empty() {
        errors.push(ValidationError::new("app.version", "must not be empty"));
    }
    if config.security.cors_enabled
        && HeaderValue::from_str(&config.security.cors_origin).is_err()
    {
        errors.push(ValidationError::new(
            "security.cors_origin",
            "not a valid header value",
        ));
    }
    if let Some(csp) = &config.security.content_security_policy {
        if HeaderValue::from_str(csp).is_err() {
            errors.push(ValidationError::new(
                "security.content_security_policy",
                "not a valid header value",
            ));
        }
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
