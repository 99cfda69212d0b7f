//! HTTP codec module for decoding requests and encoding responses
//!
//! - [`RequestDecoder`]: parses a request head, then buffers the body announced
//!   by `Content-Length` and yields a complete `Request<Bytes>`
//! - [`ResponseEncoder`]: writes a `Response<Bytes>` as status line, headers and body
//!
//! # Example
//!
//! ```no_run
//! use micro_router_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut request_buffer = BytesMut::from("GET / HTTP/1.1\r\nHost: localhost\r\n\r\n");
//! let message = decoder.decode(&mut request_buffer);
//! ```

mod header_decoder;
mod request_decoder;
mod response_encoder;

pub use header_decoder::HeaderDecoder;
pub use request_decoder::RequestDecoder;
pub use request_decoder::DEFAULT_MAX_BODY_SIZE;
pub use response_encoder::ResponseEncoder;
