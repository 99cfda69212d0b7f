//! Request head decoding.
//!
//! Parses the request line and header fields with `httparse`, converts them
//! into `http::request::Parts` and works out how many body bytes follow.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header size: 8KB
//! - Only HTTP/1.0 and HTTP/1.1

use bytes::BytesMut;
use http::request::Parts;
use http::{HeaderName, HeaderValue, Request};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, PayloadSize};

/// Maximum number of headers allowed in a request
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decodes a request head into its [`Parts`] and the [`PayloadSize`] announced by it.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderDecoder;

impl Decoder for HeaderDecoder {
    type Item = (Parts, PayloadSize);
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // shortest valid head is "GET / HTTP/1.1\r\n\r\n"
        if src.len() < 14 {
            return Ok(None);
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut req = httparse::Request::new(&mut headers);

        let parsed_result = req.parse(src).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            e => ParseError::invalid_header(e.to_string()),
        });

        match parsed_result? {
            Status::Complete(body_offset) => {
                trace!(head_size = body_offset, "parsed request head");
                ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

                let version = match req.version {
                    Some(0) => http::Version::HTTP_10,
                    Some(1) => http::Version::HTTP_11,
                    _ => return Err(ParseError::InvalidVersion(req.version)),
                };

                let mut builder = Request::builder()
                    .method(req.method.ok_or(ParseError::InvalidMethod)?)
                    .uri(req.path.ok_or(ParseError::InvalidUri)?)
                    .version(version);

                if let Some(header_map) = builder.headers_mut() {
                    header_map.reserve(req.headers.len());
                    for header in req.headers.iter() {
                        let name = HeaderName::from_bytes(header.name.as_bytes()).map_err(ParseError::invalid_header)?;
                        let value = HeaderValue::from_bytes(header.value).map_err(ParseError::invalid_header)?;
                        header_map.append(name, value);
                    }
                }

                let (parts, ()) = builder
                    .body(())
                    .map_err(|e| match e {
                        e if e.is::<http::method::InvalidMethod>() => ParseError::InvalidMethod,
                        e if e.is::<http::uri::InvalidUri>() => ParseError::InvalidUri,
                        e => ParseError::invalid_header(e),
                    })?
                    .into_parts();

                let payload_size = parse_payload(&parts)?;

                // the head is fully converted, drop it from the buffer
                let _ = src.split_to(body_offset);

                Ok(Some((parts, payload_size)))
            }
            Status::Partial => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                Ok(None)
            }
        }
    }
}

/// Determines the body size announced by the head, refer to RFC 9112 section 6.
///
/// Only `Content-Length` framing is accepted; any `Transfer-Encoding` is rejected.
fn parse_payload(parts: &Parts) -> Result<PayloadSize, ParseError> {
    let te_header = parts.headers.get(http::header::TRANSFER_ENCODING);
    let cl_header = parts.headers.get(http::header::CONTENT_LENGTH);

    match (te_header, cl_header) {
        (None, None) => Ok(PayloadSize::new_empty()),

        (Some(te_value), None) => {
            Err(ParseError::unsupported_transfer_encoding(String::from_utf8_lossy(te_value.as_bytes())))
        }

        (None, Some(cl_value)) => {
            let cl_str = cl_value.to_str().map_err(|_e| ParseError::invalid_content_length("value can't to_str"))?;

            let length =
                cl_str.trim().parse::<u64>().map_err(|_e| ParseError::invalid_content_length(format!("value {cl_str} is not u64")))?;

            Ok(PayloadSize::new_length(length))
        }

        (Some(_), Some(_)) => Err(ParseError::invalid_content_length("transfer_encoding and content_length both present in headers")),
    }
}
