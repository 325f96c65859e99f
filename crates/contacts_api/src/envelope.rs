//! Uniform JSON response shapes and the boundary error translator.
//!
//! # Responsibility
//! - Render controller outcomes as `{statusCode, message, data?, error?, errors?}`.
//! - Render every failure that escapes the controller as
//!   `{statusCode, timestamp, path, message, errors}`.
//!
//! # Invariants
//! - The HTTP status line always equals the body `statusCode`.
//! - Every error response leaving the router has a JSON body.
//! - Persistence failures carry a generic message only.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Request;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use contacts_core::ServiceError;
use log::error;
use serde::{Serialize, Serializer};
use std::any::Any;

/// Response body returned by every contact endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    #[serde(serialize_with = "serialize_status")]
    pub status_code: StatusCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl<T> Envelope<T> {
    pub fn success(status_code: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            status_code,
            message: message.into(),
            data: Some(data),
            error: None,
            errors: None,
        }
    }

    pub fn failure(status_code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            data: None,
            error: None,
            errors: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status_code, Json(self)).into_response()
    }
}

/// Failure handed to the boundary translator instead of a controller
/// envelope.
///
/// The response produced by `into_response` is a marker; the
/// `translate_failures` middleware replaces it with the rendered body once
/// the request path is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: String,
    pub errors: Vec<String>,
}

impl ApiFailure {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// 400 "Validation failed" carrying per-field messages.
    pub fn validation(errors: Vec<String>) -> Self {
        Self {
            errors,
            ..Self::new(StatusCode::BAD_REQUEST, "Validation failed")
        }
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }

    /// Renders the final JSON error body for `path`.
    pub fn render(&self, path: &str) -> Response {
        let body = FailureBody {
            status_code: self.status,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            path,
            message: &self.message,
            errors: &self.errors,
        };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let mut response = self.status.into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl From<ServiceError> for ApiFailure {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Validation(errors) => {
                Self::validation(errors.into_iter().map(|error| error.message).collect())
            }
            ServiceError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, value.to_string()),
            ServiceError::Conflict(_) => Self::new(StatusCode::CONFLICT, value.to_string()),
            ServiceError::BadInput(_) => Self::new(StatusCode::BAD_REQUEST, value.to_string()),
            ServiceError::Persistence(message) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

impl From<JsonRejection> for ApiFailure {
    fn from(value: JsonRejection) -> Self {
        Self::validation(vec![value.body_text()])
    }
}

impl From<QueryRejection> for ApiFailure {
    fn from(value: QueryRejection) -> Self {
        Self::validation(vec![value.body_text()])
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureBody<'a> {
    #[serde(serialize_with = "serialize_status")]
    status_code: StatusCode,
    timestamp: String,
    path: &'a str,
    message: &'a str,
    errors: &'a [String],
}

fn serialize_status<S: Serializer>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(status.as_u16())
}

/// Boundary middleware turning every escaped failure into a JSON body.
///
/// Handles `ApiFailure` markers and any non-JSON error response produced
/// by the router itself (405, extractor rejections, 500 from layers).
pub async fn translate_failures(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    if let Some(failure) = response.extensions().get::<ApiFailure>() {
        return failure.render(&path);
    }

    let status = response.status();
    let is_error = status.is_client_error() || status.is_server_error();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    if is_error && !is_json {
        let message = status.canonical_reason().unwrap_or("Request failed");
        return ApiFailure::new(status, message).render(&path);
    }

    response
}

/// Response used by the panic-catching layer.
pub fn panic_failure(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };
    error!(
        "event=handler_panic module=http status=error error_code=panic detail_len={}",
        detail.len()
    );
    ApiFailure::internal().into_response()
}
