//! Errors surfaced to clients as HTTP responses, plus the error types of the
//! router's own fallible operations.

use bytes::Bytes;
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Optional structured data attached to an [`HttpError`]
pub type ErrorPayload = serde_json::Map<String, serde_json::Value>;

/// An error that is written to the client as a JSON body:
///
/// ```json
/// {"statusCode": 400, "error": "Bad Request", "payload": {"field": "name"}}
/// ```
///
/// `payload` is omitted when absent.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{status}: {message}")]
pub struct HttpError {
    message: String,
    status: StatusCode,
    payload: Option<ErrorPayload>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    #[serde(rename = "statusCode")]
    status_code: u16,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a ErrorPayload>,
}

impl HttpError {
    pub fn new(message: impl Into<String>, status: StatusCode, payload: Option<ErrorPayload>) -> Self {
        Self { message: message.into(), status, payload }
    }

    /// 400
    pub fn bad_request(payload: Option<ErrorPayload>) -> Self {
        Self::new("Bad Request", StatusCode::BAD_REQUEST, payload)
    }

    /// 401
    pub fn unauthorized(payload: Option<ErrorPayload>) -> Self {
        Self::new("Unauthorized", StatusCode::UNAUTHORIZED, payload)
    }

    /// 404
    pub fn not_found() -> Self {
        Self::new("Not Found", StatusCode::NOT_FOUND, None)
    }

    /// 405
    pub fn method_not_allowed() -> Self {
        Self::new("Method Not Allowed", StatusCode::METHOD_NOT_ALLOWED, None)
    }

    /// 500
    pub fn internal() -> Self {
        Self::new("Internal Server Error", StatusCode::INTERNAL_SERVER_ERROR, None)
    }

    /// Replaces the default message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn with_payload(mut self, payload: ErrorPayload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn payload(&self) -> Option<&ErrorPayload> {
        self.payload.as_ref()
    }

    /// The JSON body written to the client
    pub fn to_json(&self) -> Bytes {
        let body = ErrorBody { status_code: self.status.as_u16(), error: &self.message, payload: self.payload.as_ref() };
        // a string and a JSON object always serialize
        serde_json::to_vec(&body).map(Bytes::from).unwrap_or_default()
    }
}

/// A path template that could not be turned into a route
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("can't compile path template '{template}': {source}")]
    Compile {
        template: String,
        #[source]
        source: regex::Error,
    },

    #[error("path template '{template}' has {variables} placeholders but {captures} capture groups")]
    CaptureMismatch { template: String, variables: usize, captures: usize },
}

/// Failure to decode a request body
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("Content-Type is not JSON")]
    NotJson,

    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure to parse a form body
#[derive(Debug, Error)]
pub enum FormError {
    #[error("invalid url-encoded form: {0}")]
    UrlEncoded(#[from] serde_urlencoded::de::Error),

    #[error("multipart Content-Type has no boundary")]
    MissingBoundary,

    #[error("multipart part has no Content-Disposition header")]
    MissingContentDisposition,

    #[error("invalid multipart body: {reason}")]
    InvalidMultipart { reason: &'static str },

    #[error("form body size {size} exceeds the limit {max_size}")]
    TooLarge { size: usize, max_size: usize },
}
