//! An HTTP request router with ordered, first-match-wins routes and
//! short-circuiting handler chains.
//!
//! Path templates such as `/users/{id}` are compiled once when the router is
//! built. Each request gets a fresh [`RequestContext`]; the matched route's
//! handlers run in order until one of them sends a response.
//!
//! # Example
//!
//! ```no_run
//! use micro_router::{handlers, HttpError, RequestContext, Router, RouterBuilder, Server};
//! use std::collections::HashMap;
//!
//! fn require_token(ctx: &mut RequestContext<'_>) {
//!     if ctx.headers().get("authorization").is_none() {
//!         ctx.error(HttpError::unauthorized(None));
//!     }
//! }
//!
//! fn get_user(ctx: &mut RequestContext<'_>) {
//!     let id = ctx.param("id").unwrap_or_default().to_owned();
//!     ctx.send(HashMap::from([("id", id)]));
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = RouterBuilder::group("/api", handlers![require_token]).get("/users/{id}", handlers![get_user]);
//!
//!     let router = Router::builder().get("/", handlers![|ctx| ctx.send("hello")]).use_group(api).build()?;
//!
//!     Server::builder().router(router).address("127.0.0.1:8080").build()?.start().await?;
//!     Ok(())
//! }
//! ```

mod content_type;
mod error;
mod form;
mod handler;
mod params;
mod pipeline;
mod request;
mod response;
mod server;

pub mod router;

pub use content_type::{CONTENT_TYPES, ContentType};
pub use error::{BodyError, ErrorPayload, FormError, HttpError, PatternError};
pub use form::{FilePart, Form, MAX_FORM_BODY_SIZE};
pub use handler::{BoxedHandler, RequestHandler, handler_fn};
pub use params::{PathParams, Query};
pub use request::{RequestContext, Stage};
pub use response::{BufferedResponse, Json, ResponseData, ResponseWriter};
pub use router::matcher::RouteMatch;
pub use router::{Route, Router, RouterBuilder};
pub use server::{Server, ServerBuildError, ServerBuilder};
