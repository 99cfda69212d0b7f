//! Request decoding.
//!
//! [`RequestDecoder`] works in two phases: the head is parsed by
//! [`HeaderDecoder`], then the body announced by `Content-Length` is buffered
//! until it is complete. Only a whole request is handed out, never a partial
//! body, so the handler side can stay synchronous.

use bytes::{Bytes, BytesMut};
use http::header::EXPECT;
use http::request::Parts;
use http::Request;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::header_decoder::HeaderDecoder;
use crate::ensure;
use crate::protocol::{Message, ParseError, PayloadSize};

/// Default ceiling for a buffered request body: 32 MiB
pub const DEFAULT_MAX_BODY_SIZE: u64 = 32 << 20;

/// A decoder yielding complete requests with fully buffered bodies.
///
/// The decoder keeps the parsed head in `pending` while the body is still
/// arriving:
/// - `None`: currently parsing a head
/// - `Some(_)`: waiting for the remaining body bytes
#[derive(Debug)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    max_body_size: u64,
    pending: Option<(Parts, u64)>,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` with the default body ceiling
    pub fn new() -> Self {
        Self::with_max_body_size(DEFAULT_MAX_BODY_SIZE)
    }

    /// Creates a new `RequestDecoder` rejecting bodies larger than `max_body_size`
    pub fn with_max_body_size(max_body_size: u64) -> Self {
        Self { header_decoder: HeaderDecoder, max_body_size, pending: None }
    }

    pub fn max_body_size(&self) -> u64 {
        self.max_body_size
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for RequestDecoder {
    type Item = Message;
    type Error = ParseError;

    /// Attempts to decode the next item from the buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Message::ExpectContinue))`: a head asking for `100 Continue` was parsed
    /// - `Ok(Some(Message::Request(_)))`: a complete request is available
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: the request is malformed or too large
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.pending.is_none() {
            let Some((parts, payload_size)) = self.header_decoder.decode(src)? else {
                return Ok(None);
            };

            let length = match payload_size {
                PayloadSize::Empty => return Ok(Some(Message::Request(Request::from_parts(parts, Bytes::new())))),
                PayloadSize::Length(length) => length,
            };

            ensure!(length <= self.max_body_size, ParseError::too_large_body(length, self.max_body_size));

            let expect_continue = is_expect_continue(&parts);
            self.pending = Some((parts, length));

            if expect_continue && (src.len() as u64) < length {
                return Ok(Some(Message::ExpectContinue));
            }
        }

        let remaining = match &self.pending {
            Some((_, length)) => *length,
            None => return Ok(None),
        };

        let available = src.len() as u64;
        if available < remaining {
            trace!(available, remaining, "waiting for more body bytes");
            // request body sizes are bounded by max_body_size
            #[allow(clippy::cast_possible_truncation, reason = "length is bounded by max_body_size")]
            src.reserve((remaining - available) as usize);
            return Ok(None);
        }

        let Some((parts, length)) = self.pending.take() else {
            return Ok(None);
        };

        #[allow(clippy::cast_possible_truncation, reason = "length is bounded by max_body_size")]
        let body = src.split_to(length as usize).freeze();
        Ok(Some(Message::Request(Request::from_parts(parts, body))))
    }
}

fn is_expect_continue(parts: &Parts) -> bool {
    parts
        .headers
        .get(EXPECT)
        .is_some_and(|value| value.as_bytes().len() >= 4 && value.as_bytes()[0..4].eq_ignore_ascii_case(b"100-"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use indoc::indoc;

    #[test]
    fn decode_get_without_body() {
        let str = indoc! {r##"
        GET /users/42?verbose=true HTTP/1.1
        Host: 127.0.0.1:8080

        "##};

        let mut buf = BytesMut::from(str);
        let mut decoder = RequestDecoder::new();

        let request = decoder.decode(&mut buf).unwrap().unwrap().into_request().unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.uri().path(), "/users/42");
        assert!(request.body().is_empty());
        assert!(decoder.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn decode_body_arriving_in_pieces() {
        let head = "POST /items HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 14\r\n\r\n{\"name\":";

        let mut buf = BytesMut::from(head);
        let mut decoder = RequestDecoder::new();

        assert!(decoder.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(br#""pen"}"#);
        let request = decoder.decode(&mut buf).unwrap().unwrap().into_request().unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(&request.body()[..], br#"{"name":"pen"}"#);
    }

    #[test]
    fn decode_pipelined_requests() {
        let str = "GET /a HTTP/1.1\r\nHost: x\r\n\r\nGET /b HTTP/1.1\r\nHost: x\r\n\r\n";

        let mut buf = BytesMut::from(str);
        let mut decoder = RequestDecoder::new();

        let first = decoder.decode(&mut buf).unwrap().unwrap().into_request().unwrap();
        let second = decoder.decode(&mut buf).unwrap().unwrap().into_request().unwrap();

        assert_eq!(first.uri().path(), "/a");
        assert_eq!(second.uri().path(), "/b");
        assert!(buf.is_empty());
    }

    #[test]
    fn reject_body_over_ceiling() {
        let str = indoc! {r##"
        POST /items HTTP/1.1
        Content-Length: 11

        hello world"##};

        let mut buf = BytesMut::from(str);
        let mut decoder = RequestDecoder::with_max_body_size(10);

        let result = decoder.decode(&mut buf);
        assert!(matches!(result, Err(ParseError::TooLargeBody { current_size: 11, max_size: 10 })));
    }

    #[test]
    fn expect_continue_before_body() {
        let str = indoc! {r##"
        PUT /items/1 HTTP/1.1
        Expect: 100-continue
        Content-Length: 5

        "##};

        let mut buf = BytesMut::from(str);
        let mut decoder = RequestDecoder::new();

        let message = decoder.decode(&mut buf).unwrap().unwrap();
        assert!(!message.is_request());

        assert!(decoder.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"hello");
        let request = decoder.decode(&mut buf).unwrap().unwrap().into_request().unwrap();
        assert_eq!(&request.body()[..], b"hello");
    }
}
