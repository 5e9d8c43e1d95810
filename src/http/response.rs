//! Response envelope construction.
//!
//! Every structured response has the shape
//! `{success, data, timestamp}` or `{success, message, details, timestamp}`.
//! Timestamps are generated at write time.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Failure while producing a handler's response.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Uniform JSON wrapper for success and failure payloads.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ApiResponse<T> {
    Success {
        success: bool,
        data: T,
        timestamp: String,
    },
    Failure {
        success: bool,
        message: String,
        details: Option<String>,
        timestamp: String,
    },
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse::Success {
            success: true,
            data,
            timestamp: timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn failure(message: impl Into<String>, details: Option<String>) -> Self {
        ApiResponse::Failure {
            success: false,
            message: message.into(),
            details,
            timestamp: timestamp(),
        }
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The current time formatted for a response.
pub fn timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Builds envelope responses under a fixed detail policy.
///
/// In production-like environments the `details` of 5xx responses are
/// withheld; client error details are always sent.
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    expose_server_details: bool,
}

impl Envelope {
    pub fn new(expose_server_details: bool) -> Self {
        Self {
            expose_server_details,
        }
    }

    /// Success envelope with the given status.
    pub fn success<T: Serialize>(
        &self,
        data: T,
        status: StatusCode,
    ) -> Result<Response, HandlerError> {
        Ok(json_response(status, &ApiResponse::success(data))?)
    }

    /// Failure envelope with the given status.
    pub fn error(
        &self,
        status: StatusCode,
        message: impl Into<String>,
        details: Option<String>,
    ) -> Response {
        let details = if status.is_server_error() && !self.expose_server_details {
            None
        } else {
            details
        };
        json_response(status, &ApiResponse::failure(message, details)).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to serialize error envelope");
            self.empty(StatusCode::INTERNAL_SERVER_ERROR)
        })
    }

    /// Plain text body outside the envelope.
    pub fn plain_text(&self, status: StatusCode, body: &'static str) -> Response {
        (
            status,
            [(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
            body,
        )
            .into_response()
    }

    /// Status-only response with an empty body.
    pub fn empty(&self, status: StatusCode) -> Response {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = status;
        response
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new(true)
    }
}

fn json_response<T: Serialize>(
    status: StatusCode,
    payload: &T,
) -> Result<Response, serde_json::Error> {
    let body = serde_json::to_vec(payload)?;
    Ok((
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn success_shape() {
        let response = Envelope::default()
            .success(json!({"a": 1}), StatusCode::OK)
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        let body = body_json(response).await;
        let keys: Vec<_> = body.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], json!({"a": 1}));
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn error_shape_keeps_null_details() {
        let response = Envelope::default().error(StatusCode::NOT_FOUND, "Not Found", None);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Not Found");
        assert!(body.as_object().unwrap().contains_key("details"));
        assert!(body["details"].is_null());
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn production_hides_server_details_only() {
        let envelope = Envelope::new(false);

        let body = body_json(envelope.error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            Some("boom".into()),
        ))
        .await;
        assert!(body["details"].is_null());

        let body = body_json(envelope.error(
            StatusCode::NOT_FOUND,
            "Not Found",
            Some("Path /x not found".into()),
        ))
        .await;
        assert_eq!(body["details"], "Path /x not found");
    }

    #[test]
    fn timestamp_round_trips() {
        let ts = timestamp();
        let parsed: DateTime<Utc> = DateTime::parse_from_rfc3339(&ts).unwrap().into();
        assert_eq!(format_timestamp(parsed), ts);
    }
}
