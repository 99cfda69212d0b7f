//! The seam between the connection and request processing.
//!
//! Handlers are synchronous: the connection runs each call on a blocking
//! worker thread, so a handler may do blocking I/O without stalling other
//! connections.

use bytes::Bytes;
use http::{Request, Response};
use std::fmt;

pub trait Handler: Send + Sync {
    fn call(&self, req: Request<Bytes>) -> Response<Bytes>;
}

/// A [`Handler`] backed by a plain function or closure
pub struct HandlerFn<F> {
    f: F,
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFn").finish_non_exhaustive()
    }
}

impl<F> Handler for HandlerFn<F>
where
    F: Fn(Request<Bytes>) -> Response<Bytes> + Send + Sync,
{
    fn call(&self, req: Request<Bytes>) -> Response<Bytes> {
        (self.f)(req)
    }
}

pub fn make_handler<F>(f: F) -> HandlerFn<F>
where
    F: Fn(Request<Bytes>) -> Response<Bytes> + Send + Sync,
{
    HandlerFn { f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn handler_fn_calls_closure() {
        let handler = make_handler(|req: Request<Bytes>| {
            let mut response = Response::new(req.into_body());
            *response.status_mut() = StatusCode::ACCEPTED;
            response
        });

        let response = handler.call(Request::new(Bytes::from_static(b"ping")));

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(&response.body()[..], b"ping");
    }
}
