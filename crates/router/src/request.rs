//! The per-request context handed to every handler of a chain.
//!
//! A [`RequestContext`] moves through four stages:
//!
//! - [`Stage::Created`]: query and form bodies are parsed, nothing is bound yet
//! - [`Stage::Bound`]: path variables of the matched route are available
//! - [`Stage::Handling`]: the handler chain is running
//! - [`Stage::Sent`]: a response reached the [`ResponseWriter`]; every later
//!   send is dropped

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode, Uri, Version};
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::content_type::ContentType;
use crate::error::{BodyError, HttpError};
use crate::form::Form;
use crate::params::{PathParams, Query};
use crate::response::{ResponseData, ResponseWriter};
use crate::router::pattern::normalize_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Created,
    Bound,
    Handling,
    Sent,
}

pub struct RequestContext<'w> {
    method: Method,
    uri: Uri,
    version: Version,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    query: Query,
    form: Form,
    params: PathParams,
    data: HashMap<String, Box<dyn Any + Send>>,
    response_headers: HeaderMap,
    writer: &'w mut dyn ResponseWriter,
    stage: Stage,
}

impl<'w> RequestContext<'w> {
    /// Creates the context of `request`, writing its response through `writer`.
    ///
    /// The path is percent-decoded (invalid UTF-8 is replaced) and normalized,
    /// the query string decoded and url-encoded or multipart bodies parsed
    /// into [`Form`]. A body that fails to parse as a
    /// form is logged and leaves the form empty.
    pub fn new(request: Request<Bytes>, writer: &'w mut dyn ResponseWriter) -> Self {
        let (parts, body) = request.into_parts();

        let path = normalize_path(&percent_decode_str(parts.uri.path()).decode_utf8_lossy());
        let query = Query::parse(parts.uri.query());
        let form = Form::parse(&parts.headers, &body).unwrap_or_else(|e| {
            warn!(cause = %e, path = %path, "can't parse form body, ignore it");
            Form::default()
        });

        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            path,
            headers: parts.headers,
            body,
            query,
            form,
            params: PathParams::empty(),
            data: HashMap::new(),
            response_headers: HeaderMap::new(),
            writer,
            stage: Stage::Created,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// The decoded, normalized request path, without trailing slash
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw request body
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Deserializes the query string into `T`
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, serde_urlencoded::de::Error> {
        self.query.deserialize()
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// The value of path variable `name`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Whether a response has been written
    pub fn is_sent(&self) -> bool {
        self.stage == Stage::Sent
    }

    pub(crate) fn bind(&mut self, params: PathParams) {
        self.params = params;
        if self.stage < Stage::Bound {
            self.stage = Stage::Bound;
        }
    }

    pub(crate) fn begin_handling(&mut self) {
        if self.stage < Stage::Handling {
            self.stage = Stage::Handling;
        }
    }

    /// Stores `value` under `key`, replacing what was there
    pub fn set<T: Any + Send>(&mut self, key: impl Into<String>, value: T) {
        self.data.insert(key.into(), Box::new(value));
    }

    /// The value under `key`, if there is one and it is a `T`
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.data.get(key).and_then(|value| value.downcast_ref::<T>())
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.data.get_mut(key).and_then(|value| value.downcast_mut::<T>())
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.data.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    /// Headers written with the response; a `Content-Type` set here decides
    /// how [`send`](Self::send) serializes its data
    pub fn response_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.response_headers
    }

    /// Decodes the body as JSON.
    ///
    /// Fails when the request `Content-Type` is not JSON or the body does not parse.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        let is_json = self
            .headers
            .get(CONTENT_TYPE)
            .and_then(ContentType::from_header)
            .is_some_and(|content_type| content_type == ContentType::Json);
        if !is_json {
            return Err(BodyError::NotJson);
        }

        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Sends `data` with `200 OK`
    pub fn send(&mut self, data: impl ResponseData) {
        self.send_with_status(data, StatusCode::OK);
    }

    /// Sends `data` with `status`.
    ///
    /// A preset `Content-Type` response header picks the encoding; without
    /// one, structured data is sent as JSON and anything else as text. Data
    /// that fails to serialize turns into a `500` error response.
    pub fn send_with_status(&mut self, data: impl ResponseData, status: StatusCode) {
        if self.is_sent() {
            warn!(method = %self.method, path = %self.path, %status, "response already sent, drop this one");
            return;
        }

        let (content_type, body) = match self.response_headers.get(CONTENT_TYPE) {
            Some(preset) => {
                let body = if ContentType::from_header(preset) == Some(ContentType::Json) {
                    data.to_json()
                } else {
                    data.to_text()
                };
                (preset.clone(), body)
            }
            None if data.is_structured() => (ContentType::Json.header_value(), data.to_json()),
            None => (ContentType::Text.header_value(), data.to_text()),
        };

        match body {
            Ok(body) => self.write_response(status, content_type, body),
            Err(e) => {
                warn!(cause = %e, method = %self.method, path = %self.path, "failed to serialize output data");
                self.error(HttpError::internal().with_message("Failed to serialize output data"));
            }
        }
    }

    /// Sends `error` as its JSON body with the error's status
    pub fn error(&mut self, error: HttpError) {
        if self.is_sent() {
            warn!(method = %self.method, path = %self.path, status = %error.status(), "response already sent, drop this error");
            return;
        }

        debug!(status = %error.status(), error = error.message(), "send error response");
        let body = error.to_json();
        self.write_response(error.status(), ContentType::Json.header_value(), body);
    }

    fn write_response(&mut self, status: StatusCode, content_type: HeaderValue, body: Bytes) {
        let mut response = Response::new(body);
        *response.status_mut() = status;

        let mut headers = std::mem::take(&mut self.response_headers);
        headers.insert(CONTENT_TYPE, content_type);
        *response.headers_mut() = headers;

        self.writer.write(response);
        self.stage = Stage::Sent;
    }
}

impl fmt::Debug for RequestContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("params", &self.params)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}
