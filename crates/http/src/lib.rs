//! The HTTP/1.1 transport underneath `micro-router`.
//!
//! This crate reads requests off a socket, hands each complete request to a
//! synchronous [`handler::Handler`] running on a blocking worker thread, and
//! writes the returned response back. Request bodies are buffered in full up
//! to a configurable ceiling before the handler sees them, which keeps the
//! handler side free of any async machinery.
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use http::{Request, Response, StatusCode};
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn};
//! use micro_router_http::connection::HttpConnection;
//! use micro_router_http::handler::make_handler;
//!
//! #[tokio::main]
//! async fn main() {
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer);
//!             if let Err(e) = connection.process(handler).await {
//!                 error!("service has error, cause {}, connection shutdown", e);
//!             }
//!         });
//!     }
//! }
//!
//! fn hello_world(request: Request<Bytes>) -> Response<Bytes> {
//!     info!(path = request.uri().path(), "receive request");
//!     let mut response = Response::new(Bytes::from_static(b"Hello World!\r\n"));
//!     *response.status_mut() = StatusCode::OK;
//!     response
//! }
//! ```
//!
//! # Modules
//!
//! - [`connection`]: connection lifecycle (keep-alive, expect-continue, error responses)
//! - [`codec`]: request decoding and response encoding
//! - [`handler`]: the synchronous handler seam
//! - [`protocol`]: shared protocol types and errors
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 only
//! - `Transfer-Encoding` request bodies are rejected with `501 Not Implemented`
//! - Maximum header size: 8KB, maximum number of headers: 64

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
