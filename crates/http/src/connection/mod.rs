//! HTTP connection handling module
//!
//! [`HttpConnection`] owns one client connection: it decodes requests,
//! answers `Expect: 100-continue`, runs the handler for each request on a
//! blocking worker, writes the response and honors keep-alive. Malformed
//! requests are answered with an error status before the connection closes.

mod http_connection;

pub use http_connection::HttpConnection;
