//! Security and CORS response headers.
//!
//! # Responsibilities
//! - Add the fixed hardening headers to every response
//! - Add CORS headers when enabled
//! - Add a Content-Security-Policy when configured
//!
//! # Design Decisions
//! - Values are validated once at startup, not per request
//! - Applied outside routing so 404/405/500 and OPTIONS responses carry them
//! - Overriding: a handler cannot weaken these headers

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::SecurityConfig;

pub const CORS_ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const CORS_ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Error converting configured values into headers.
#[derive(Debug, thiserror::Error)]
#[error("invalid value for {header}: {value:?}")]
pub struct HeaderError {
    pub header: HeaderName,
    pub value: String,
}

/// The full header set applied to every response.
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl SecurityHeaders {
    pub fn from_config(config: &SecurityConfig) -> Result<Self, HeaderError> {
        let mut headers = vec![
            (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
            (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
            (header::X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block")),
        ];

        if config.cors_enabled {
            headers.push((
                header::ACCESS_CONTROL_ALLOW_ORIGIN,
                parse(header::ACCESS_CONTROL_ALLOW_ORIGIN, &config.cors_origin)?,
            ));
            headers.push((
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(CORS_ALLOW_METHODS),
            ));
            headers.push((
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(CORS_ALLOW_HEADERS),
            ));
        }

        if let Some(csp) = &config.content_security_policy {
            headers.push((
                header::CONTENT_SECURITY_POLICY,
                parse(header::CONTENT_SECURITY_POLICY, csp)?,
            ));
        }

        Ok(Self { headers })
    }

    /// Write the header set into a response built outside the layered router.
    pub fn insert_into(&self, target: &mut HeaderMap) {
        for (name, value) in &self.headers {
            target.insert(name.clone(), value.clone());
        }
    }

    /// Wrap `router` so every response carries the header set.
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.headers
            .iter()
            .cloned()
            .fold(router, |router, (name, value)| {
                router.layer(SetResponseHeaderLayer::overriding(name, value))
            })
    }
}

fn parse(name: HeaderName, value: &str) -> Result<HeaderValue, HeaderError> {
    HeaderValue::from_str(value).map_err(|_| HeaderError {
        header: name,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(headers: &SecurityHeaders) -> HeaderMap {
        let mut map = HeaderMap::new();
        headers.insert_into(&mut map);
        map
    }

    #[test]
    fn defaults_include_cors_wildcard() {
        let map = rendered(&SecurityHeaders::from_config(&SecurityConfig::default()).unwrap());
        assert_eq!(map[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(map[header::ACCESS_CONTROL_ALLOW_METHODS], CORS_ALLOW_METHODS);
        assert!(!map.contains_key(header::CONTENT_SECURITY_POLICY));
    }

    #[test]
    fn insert_overrides_existing_values() {
        let mut map = HeaderMap::new();
        map.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
        SecurityHeaders::from_config(&SecurityConfig::default())
            .unwrap()
            .insert_into(&mut map);
        assert_eq!(map[header::X_FRAME_OPTIONS], "DENY");
    }

    #[test]
    fn cors_can_be_disabled() {
        let config = SecurityConfig {
            cors_enabled: false,
            ..SecurityConfig::default()
        };
        let map = rendered(&SecurityHeaders::from_config(&config).unwrap());
        assert_eq!(map.len(), 3);
        assert_eq!(map[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(map[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(map[header::X_XSS_PROTECTION], "1; mode=block");
    }

    #[test]
    fn csp_added_when_configured() {
        let config = SecurityConfig {
            content_security_policy: Some("default-src 'none'".into()),
            ..SecurityConfig::default()
        };
        let map = rendered(&SecurityHeaders::from_config(&config).unwrap());
        assert_eq!(map[header::CONTENT_SECURITY_POLICY], "default-src 'none'");
    }

    #[test]
    fn invalid_origin_rejected() {
        let config = SecurityConfig {
            cors_origin: "bad\r\nvalue".into(),
            ..SecurityConfig::default()
        };
        assert!(SecurityHeaders::from_config(&config).is_err());
    }
}
