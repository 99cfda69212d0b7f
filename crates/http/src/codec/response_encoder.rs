//! Response encoding.
//!
//! Serializes a fully built `Response<Bytes>` into the status line, header
//! fields and body. `Content-Length` always reflects the actual body length.

use bytes::{BufMut, Bytes, BytesMut};
use http::{header, HeaderValue, Response, Version};
use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::{ResponseMessage, SendError};

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<Response<Bytes>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Response<Bytes>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<ResponseMessage>::encode(self, ResponseMessage::new(item), dst)
    }
}

impl Encoder<ResponseMessage> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: ResponseMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (response, omit_body) = item.into_parts();
        let (mut parts, body) = response.into_parts();

        dst.reserve(INIT_HEADER_SIZE + body.len());
        match parts.version {
            Version::HTTP_10 | Version::HTTP_11 => {
                write!(
                    FastWrite(dst),
                    "HTTP/1.1 {} {}\r\n",
                    parts.status.as_str(),
                    parts.status.canonical_reason().unwrap_or("Unknown")
                )?;
            }
            version => {
                error!(http_version = ?version, "unsupported http version");
                return Err(SendError::UnsupportedVersion { version });
            }
        }

        parts.headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));

        for (header_name, header_value) in &parts.headers {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        if !omit_body {
            dst.put_slice(&body);
        }
        Ok(())
    }
}

/// Writer over `BytesMut` used for the formatted status line
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
