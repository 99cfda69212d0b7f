use bytes::Bytes;
use http::{Method, Request, Response};

/// An item produced by the request decoder.
#[derive(Debug)]
pub enum Message {
    /// The head announced `Expect: 100-continue` and a body; the client waits
    /// for an interim response before sending it.
    ExpectContinue,
    /// A complete request with its body fully buffered.
    Request(Request<Bytes>),
}

impl Message {
    /// Returns true if this message carries a complete request
    #[inline]
    pub fn is_request(&self) -> bool {
        matches!(self, Message::Request(_))
    }

    /// Consumes the message and returns the request, if any
    pub fn into_request(self) -> Option<Request<Bytes>> {
        match self {
            Message::Request(request) => Some(request),
            Message::ExpectContinue => None,
        }
    }
}

/// A response handed to the encoder.
///
/// Responses to `HEAD` requests keep their `Content-Length` but no body bytes
/// are written.
#[derive(Debug)]
pub struct ResponseMessage {
    response: Response<Bytes>,
    omit_body: bool,
}

impl ResponseMessage {
    /// A response written with its body
    pub fn new(response: Response<Bytes>) -> Self {
        Self { response, omit_body: false }
    }

    /// A response answering a request with `method`
    pub fn for_method(method: &Method, response: Response<Bytes>) -> Self {
        Self { response, omit_body: method == Method::HEAD }
    }

    #[inline]
    pub fn omit_body(&self) -> bool {
        self.omit_body
    }

    pub fn into_parts(self) -> (Response<Bytes>, bool) {
        (self.response, self.omit_body)
    }
}

impl From<Response<Bytes>> for ResponseMessage {
    fn from(response: Response<Bytes>) -> Self {
        Self::new(response)
    }
}

/// Size information of a request body, derived from the request head.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Body with a known length in bytes
    Length(u64),
    /// No body
    Empty,
}

impl PayloadSize {
    #[inline]
    pub fn new_length(length: u64) -> Self {
        if length == 0 { PayloadSize::Empty } else { PayloadSize::Length(length) }
    }

    #[inline]
    pub fn new_empty() -> Self {
        PayloadSize::Empty
    }

    /// Returns true if no body follows the head
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty)
    }

    /// Number of body bytes that follow the head
    #[inline]
    pub fn len(&self) -> u64 {
        match self {
            PayloadSize::Length(length) => *length,
            PayloadSize::Empty => 0,
        }
    }
}
