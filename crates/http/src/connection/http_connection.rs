use std::sync::Arc;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use http::header::CONNECTION;
use http::{Request, Response, StatusCode, Version};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{error, info, trace};

use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::handler::Handler;
use crate::protocol::{HttpError, Message, ResponseMessage, SendError};

/// An HTTP connection that reads requests and writes responses until the peer
/// goes away, a request asks to close, or the request stream is malformed.
///
/// Every request is handed to the [`Handler`] on a blocking worker thread, so
/// exactly one worker serves one request at a time.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
}

impl<R, W> std::fmt::Debug for HttpConnection<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnection").field("max_body_size", &self.framed_read.decoder().max_body_size()).finish()
    }
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_decoder(reader, writer, RequestDecoder::new())
    }

    /// Creates a connection rejecting request bodies larger than `max_body_size` with `413`
    pub fn with_max_body_size(reader: R, writer: W, max_body_size: u64) -> Self {
        Self::with_decoder(reader, writer, RequestDecoder::with_max_body_size(max_body_size))
    }

    fn with_decoder(reader: R, writer: W, decoder: RequestDecoder) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, decoder, 8 * 1024),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
        }
    }

    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler + 'static,
    {
        loop {
            match self.framed_read.next().await {
                Some(Ok(Message::ExpectContinue)) => {
                    let writer = self.framed_write.get_mut();
                    writer.write_all(b"HTTP/1.1 100 Continue\r\n\r\n").await.map_err(SendError::io)?;
                    writer.flush().await.map_err(SendError::io)?;
                    info!("receive expect request header, sent continue response");
                }

                Some(Ok(Message::Request(request))) => {
                    let keep_alive = is_keep_alive(&request);
                    let method = request.method().clone();
                    let response = call_handler(&handler, request).await;
                    self.framed_write.send(ResponseMessage::for_method(&method, response)).await?;

                    if !keep_alive {
                        trace!("request asked to close the connection");
                        return Ok(());
                    }
                }

                Some(Err(e)) => {
                    error!("can't receive next request, cause {}", e);
                    let error_response = build_error_response(e.status_code());
                    self.framed_write.send(error_response).await?;
                    return Err(e.into());
                }

                None => {
                    info!("cant read more request, break this connection down");
                    return Ok(());
                }
            }
        }
    }
}

async fn call_handler<H>(handler: &Arc<H>, request: Request<Bytes>) -> Response<Bytes>
where
    H: Handler + 'static,
{
    let handler = Arc::clone(handler);
    match tokio::task::spawn_blocking(move || handler.call(request)).await {
        Ok(response) => response,
        Err(e) => {
            error!(cause = %e, "request worker failed");
            build_error_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn is_keep_alive(request: &Request<Bytes>) -> bool {
    let connection = request.headers().get(CONNECTION).map(http::HeaderValue::as_bytes);
    match request.version() {
        Version::HTTP_10 => connection.is_some_and(|value| value.eq_ignore_ascii_case(b"keep-alive")),
        _ => !connection.is_some_and(|value| value.eq_ignore_ascii_case(b"close")),
    }
}

fn build_error_response(status_code: StatusCode) -> Response<Bytes> {
    let mut response = Response::new(Bytes::new());
    *response.status_mut() = status_code;
    response
}
