//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from a TOML file. Missing sections fall back to defaults.
pub fn load_file(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Build the effective configuration: defaults, then the optional file, then
/// environment overrides, then validation.
///
/// `lookup` abstracts `std::env::var` so tests can supply a fixed environment.
pub fn load<F>(file: Option<&Path>, lookup: F) -> Result<ServiceConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match file {
        Some(path) => load_file(path)?,
        None => ServiceConfig::default(),
    };

    apply_env(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load using the real process environment.
pub fn load_from_env(file: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    load(file, |key| std::env::var(key).ok())
}

fn apply_env<F>(config: &mut ServiceConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(port) = get("PORT") {
        config.server.port = parse_var("PORT", &port)?;
    }
    if let Some(host) = get("HOST").or_else(|| get("HOSTNAME")) {
        config.server.host = host;
    }
    if let Some(secs) = get("SHUTDOWN_TIMEOUT_SECS") {
        config.server.shutdown_grace_secs = parse_var("SHUTDOWN_TIMEOUT_SECS", &secs)?;
    }
    if let Some(version) = get("VERSION") {
        config.app.version = version;
    }
    if let Some(env) = get("NODE_ENV").or_else(|| get("APP_ENV")) {
        config.app.environment = env;
    }
    if let Some(origin) = get("CORS_ORIGIN") {
        config.security.cors_origin = origin;
    }
    if let Some(csp) = get("CSP") {
        config.security.content_security_policy = Some(csp);
    }
    if let Some(size) = get("MAX_BODY_SIZE") {
        config.security.max_body_size = parse_var("MAX_BODY_SIZE", &size)?;
    }
    if let Some(level) = get("LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(format) = get("LOG_FORMAT") {
        config.observability.log_format = Some(parse_var("LOG_FORMAT", &format)?);
    }
    if let Some(enabled) = get("METRICS_ENABLED") {
        config.observability.metrics_enabled = parse_bool("METRICS_ENABLED", &enabled)?;
    }

    Ok(())
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        var,
        value: value.to_string(),
    })
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Env {
            var,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = load(None, env(&[])).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.app.environment, "development");
    }

    #[test]
    fn environment_overrides() {
        let config = load(
            None,
            env(&[
                ("PORT", "8080"),
                ("HOSTNAME", "127.0.0.1"),
                ("VERSION", "2.3.4"),
                ("NODE_ENV", "production"),
                ("CORS_ORIGIN", "https://example.com"),
                ("METRICS_ENABLED", "false"),
                ("LOG_FORMAT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.app.version, "2.3.4");
        assert!(config.app.is_production());
        assert_eq!(config.security.cors_origin, "https://example.com");
        assert!(!config.observability.metrics_enabled);
        assert_eq!(config.observability.log_format, Some(LogFormat::Json));
    }

    #[test]
    fn host_takes_precedence_over_hostname() {
        let config = load(None, env(&[("HOST", "127.0.0.1"), ("HOSTNAME", "10.0.0.1")])).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn container_hostname_is_accepted() {
        let config = load(None, env(&[("HOSTNAME", "a1b2c3d4e5f6")])).unwrap();
        assert_eq!(config.server.host, "a1b2c3d4e5f6");
    }

    #[test]
    fn host_may_be_a_name() {
        let config = load(None, env(&[("HOST", "localhost"), ("HOSTNAME", "a1b2c3d4e5f6")])).unwrap();
        assert_eq!(config.server.host, "localhost");
    }

    #[test]
    fn invalid_port_is_rejected() {
        let err = load(None, env(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "PORT", .. }));
    }

    #[test]
    fn zero_port_fails_validation() {
        let err = load(None, env(&[("PORT", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn file_then_environment() {
        let dir = std::env::temp_dir().join(format!("welcome-config-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("service.toml");
        fs::write(&path, "[server]\nport = 4000\nhost = \"127.0.0.1\"\n").unwrap();

        let config = load(Some(&path), env(&[])).unwrap();
        assert_eq!(config.server.port, 4000);

        let config = load(Some(&path), env(&[("PORT", "5000")])).unwrap();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.host, "127.0.0.1");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
