//! The route table and its builder.
//!
//! Routes are kept in registration order and matched first-come: when two
//! templates both fit a path, the one registered first decides whether the
//! request is found at all. See [`Router::find`] for the exact rules.
//!
//! Groups bundle routes under a path prefix and a chain of middleware that
//! runs before each route's own handlers:
//!
//! ```
//! use micro_router::{handlers, Router, RouterBuilder};
//!
//! let api = RouterBuilder::group("/api", handlers![|ctx| ctx.set("authorized", true)])
//!     .post("/items", handlers![|ctx| ctx.send("created")]);
//!
//! let router = Router::builder().use_group(api).build().unwrap();
//! assert_eq!(router.routes()[0].path(), "/api/items");
//! ```

pub mod matcher;
pub mod pattern;

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, Request, Response};
use micro_router_http::handler::Handler;
use tracing::info;

use crate::error::{HttpError, PatternError};
use crate::handler::BoxedHandler;
use crate::pipeline;
use crate::request::RequestContext;
use crate::response::{BufferedResponse, ResponseWriter};
use matcher::RouteMatch;
use pattern::{CompiledPattern, join_paths, normalize_path};

/// A compiled route: method, pattern and handler chain
pub struct Route {
    method: Method,
    pattern: CompiledPattern,
    handlers: Vec<BoxedHandler>,
}

impl Route {
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The normalized path template
    pub fn path(&self) -> &str {
        self.pattern.path()
    }

    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    pub fn variables(&self) -> &[String] {
        self.pattern.variables()
    }

    pub fn handlers(&self) -> &[BoxedHandler] {
        &self.handlers
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path())
            .field("variables", &self.variables())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

struct PendingRoute {
    method: Method,
    path: String,
    handlers: Vec<BoxedHandler>,
}

/// Collects routes in order; [`build`](Self::build) compiles them into a [`Router`].
///
/// A builder made by [`group`](Self::group) carries a prefix and middleware
/// that are applied when it is merged into another builder with
/// [`use_group`](Self::use_group).
pub struct RouterBuilder {
    prefix: String,
    middleware: Vec<BoxedHandler>,
    routes: Vec<PendingRoute>,
}

macro_rules! method_route {
    ($($name:ident => $method:ident),* $(,)?) => {
        $(
            #[doc = concat!("Registers a `", stringify!($method), "` route")]
            #[must_use]
            pub fn $name(self, path: impl Into<String>, handlers: Vec<BoxedHandler>) -> Self {
                self.route(Method::$method, path, handlers)
            }
        )*
    };
}

impl RouterBuilder {
    fn new() -> Self {
        Self { prefix: String::new(), middleware: Vec::new(), routes: Vec::new() }
    }

    /// An empty group whose routes get `prefix` and run `middleware` first
    pub fn group(prefix: impl Into<String>, middleware: Vec<BoxedHandler>) -> Self {
        Self { prefix: prefix.into(), middleware, routes: Vec::new() }
    }

    /// Appends a route; identical method and path pairs are not merged
    #[must_use]
    pub fn route(mut self, method: Method, path: impl Into<String>, handlers: Vec<BoxedHandler>) -> Self {
        self.routes.push(PendingRoute { method, path: path.into(), handlers });
        self
    }

    method_route! {
        get => GET,
        post => POST,
        put => PUT,
        delete => DELETE,
        patch => PATCH,
        head => HEAD,
        options => OPTIONS,
    }

    /// Appends every route of `group`, with the group prefix joined in front
    /// of its path and the group middleware in front of its handlers
    #[must_use]
    pub fn use_group(mut self, group: RouterBuilder) -> Self {
        let RouterBuilder { prefix, middleware, routes } = group;

        for route in routes {
            let mut handlers = Vec::with_capacity(middleware.len() + route.handlers.len());
            handlers.extend(middleware.iter().map(Arc::clone));
            handlers.extend(route.handlers);

            self.routes.push(PendingRoute { method: route.method, path: join_paths(&prefix, &route.path), handlers });
        }
        self
    }

    /// Compiles every route template
    pub fn build(self) -> Result<Router, PatternError> {
        let routes = self
            .routes
            .into_iter()
            .map(|route| {
                let pattern = pattern::compile(&route.path)?;
                Ok(Route { method: route.method, pattern, handlers: route.handlers })
            })
            .collect::<Result<Vec<_>, PatternError>>()?;

        Ok(Router { routes })
    }
}

impl fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterBuilder")
            .field("prefix", &self.prefix)
            .field("middleware", &self.middleware.len())
            .field("routes", &self.routes.len())
            .finish()
    }
}

/// An immutable, ordered route table.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Resolves `method` and an already decoded `path`; `path` is normalized first
    pub fn find(&self, method: &Method, path: &str) -> Result<RouteMatch<'_>, HttpError> {
        matcher::find(&self.routes, method, &normalize_path(path))
    }

    /// Routes `request` and runs the matched handler chain, writing the
    /// response through `writer`.
    ///
    /// `404` and `405` are written right away without running any handler.
    pub fn serve(&self, request: Request<Bytes>, writer: &mut dyn ResponseWriter) {
        let mut ctx = RequestContext::new(request, writer);
        info!("{} {}", ctx.method(), ctx.path());

        match matcher::find(&self.routes, ctx.method(), ctx.path()) {
            Ok(route_match) => {
                let (route, params) = route_match.into_parts();
                ctx.bind(params);
                pipeline::execute(route.handlers(), &mut ctx);
            }
            Err(e) => ctx.error(e),
        }
    }

    /// Serves `request` in memory and returns its response
    pub fn dispatch(&self, request: Request<Bytes>) -> Response<Bytes> {
        let mut buffered = BufferedResponse::new();
        self.serve(request, &mut buffered);
        buffered.into_response()
    }
}

impl Handler for Router {
    fn call(&self, req: Request<Bytes>) -> Response<Bytes> {
        self.dispatch(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::MockResponseWriter;
    use crate::{handler_fn, handlers};
    use http::StatusCode;
    use http::header::CONTENT_TYPE;
    use serde_json::{Value, json};
    use std::collections::HashMap;

    fn request(method: Method, uri: &str) -> Request<Bytes> {
        Request::builder().method(method).uri(uri).body(Bytes::new()).unwrap()
    }

    fn body_json(response: &Response<Bytes>) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    fn step(name: &'static str) -> BoxedHandler {
        handler_fn(move |ctx| {
            if !ctx.contains("steps") {
                ctx.set("steps", Vec::<&'static str>::new());
            }
            if let Some(steps) = ctx.get_mut::<Vec<&'static str>>("steps") {
                steps.push(name);
            }
        })
    }

    fn reply_steps() -> BoxedHandler {
        handler_fn(|ctx| {
            let steps = ctx.get::<Vec<&'static str>>("steps").cloned().unwrap_or_default();
            ctx.send(steps);
        })
    }

    fn echo_params() -> BoxedHandler {
        handler_fn(|ctx| {
            let params: HashMap<String, String> =
                ctx.params().iter().map(|(name, value)| (name.to_owned(), value.to_owned())).collect();
            ctx.send(params);
        })
    }

    #[test]
    fn extract_every_placeholder() {
        let router = Router::builder().get("/users/{user_id}/posts/{post_id}", vec![echo_params()]).build().unwrap();

        let response = router.dispatch(request(Method::GET, "/users/7/posts/intro"));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_json(&response), json!({"user_id": "7", "post_id": "intro"}));
    }

    #[test]
    fn encoded_segment_binds_decoded_value() {
        let router = Router::builder()
            .get("/users/{name}", handlers![|ctx| {
                let name = ctx.param("name").unwrap_or_default().to_owned();
                ctx.send(name);
            }])
            .build()
            .unwrap();

        let response = router.dispatch(request(Method::GET, "/users/John%20Doe"));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(&response.body()[..], b"John Doe");
    }

    #[test]
    fn repeated_placeholder_last_wins() {
        let router = Router::builder().get("/org/{id}/user/{id}", vec![echo_params()]).build().unwrap();

        let response = router.dispatch(request(Method::GET, "/org/1/user/2"));

        assert_eq!(body_json(&response), json!({"id": "2"}));
    }

    #[test]
    fn method_not_allowed() {
        let router = Router::builder().get("/users/{id}", handlers![|ctx| ctx.send("user")]).build().unwrap();

        let response = router.dispatch(request(Method::DELETE, "/users/42"));

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_json(&response), json!({"statusCode": 405, "error": "Method Not Allowed"}));
    }

    #[test]
    fn not_found() {
        let router = Router::builder().get("/users/{id}", handlers![|ctx| ctx.send("user")]).build().unwrap();

        let response = router.dispatch(request(Method::GET, "/no/such/route"));

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(&response), json!({"statusCode": 404, "error": "Not Found"}));
    }

    #[test]
    fn method_match_further_down_the_table() {
        let router = Router::builder()
            .get("/items/{id}", handlers![|ctx| ctx.send("get")])
            .post("/items/{item_id}", vec![echo_params()])
            .build()
            .unwrap();

        let response = router.dispatch(request(Method::POST, "/items/5"));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(&response), json!({"item_id": "5"}));
    }

    #[test]
    fn first_registered_route_wins() {
        let router = Router::builder()
            .get("/users/me", handlers![|ctx| ctx.send("me")])
            .get("/users/{id}", handlers![|ctx| ctx.send("by id")])
            .build()
            .unwrap();

        assert_eq!(&router.dispatch(request(Method::GET, "/users/me")).body()[..], b"me");
        assert_eq!(&router.dispatch(request(Method::GET, "/users/3")).body()[..], b"by id");
    }

    #[test]
    fn trailing_slash_both_ways() {
        let router = Router::builder()
            .get("/users/", handlers![|ctx| ctx.send("users")])
            .get("/teams", handlers![|ctx| ctx.send("teams")])
            .build()
            .unwrap();

        assert_eq!(&router.dispatch(request(Method::GET, "/users")).body()[..], b"users");
        assert_eq!(&router.dispatch(request(Method::GET, "/users/")).body()[..], b"users");
        assert_eq!(&router.dispatch(request(Method::GET, "/teams/")).body()[..], b"teams");
    }

    #[test]
    fn group_prefix_and_middleware_order() {
        let api = RouterBuilder::group("/api", vec![step("auth")]).post("/items", vec![step("create"), reply_steps()]);
        let router = Router::builder().use_group(api).build().unwrap();

        let response = router.dispatch(request(Method::POST, "/api/items"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(&response), json!(["auth", "create"]));

        let response = router.dispatch(request(Method::POST, "/items"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn nested_groups() {
        let v1 = RouterBuilder::group("/v1/", vec![step("version")]).get("/ping", vec![reply_steps()]);
        let api = RouterBuilder::group("api", vec![step("auth")]).use_group(v1);
        let router = Router::builder().get("/", handlers![|ctx| ctx.send("root")]).use_group(api).build().unwrap();

        assert_eq!(router.routes()[1].path(), "/api/v1/ping");

        let response = router.dispatch(request(Method::GET, "/api/v1/ping"));
        assert_eq!(body_json(&response), json!(["auth", "version"]));

        assert_eq!(&router.dispatch(request(Method::GET, "/")).body()[..], b"root");
    }

    #[test]
    fn middleware_can_short_circuit() {
        let guard = handler_fn(|ctx| {
            if ctx.headers().get("authorization").is_none() {
                ctx.error(HttpError::unauthorized(None));
            }
        });
        let api = RouterBuilder::group("/api", vec![guard]).get("/secret", handlers![|ctx| ctx.send("secret")]);
        let router = Router::builder().use_group(api).build().unwrap();

        let response = router.dispatch(request(Method::GET, "/api/secret"));
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let authorized = Request::builder()
            .method(Method::GET)
            .uri("/api/secret")
            .header("authorization", "Bearer token")
            .body(Bytes::new())
            .unwrap();
        let response = router.dispatch(authorized);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(&response.body()[..], b"secret");
    }

    #[test]
    fn double_send_reaches_writer_once() {
        let router = Router::builder()
            .put("/items/{id}", handlers![|ctx| ctx.send_with_status("first", StatusCode::ACCEPTED), |ctx| ctx.send("second")])
            .build()
            .unwrap();

        let mut writer = MockResponseWriter::new();
        writer.expect_write().withf(|response| response.status() == StatusCode::ACCEPTED).times(1).return_const(());

        router.serve(request(Method::PUT, "/items/1"), &mut writer);
    }

    #[test]
    fn chain_without_send_is_empty_ok() {
        let router = Router::builder().delete("/items/{id}", vec![step("noop")]).build().unwrap();

        let response = router.dispatch(request(Method::DELETE, "/items/1"));

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().is_empty());
    }

    #[test]
    fn find_reports_route_and_params() {
        let router = Router::builder()
            .patch("/files/{name}", Vec::new())
            .route(Method::OPTIONS, "/files", Vec::new())
            .build()
            .unwrap();

        let found = router.find(&Method::PATCH, "/files/a.txt/").unwrap();
        assert_eq!(found.route().path(), "/files/{name}");
        assert_eq!(found.params().get("name"), Some("a.txt"));
        assert!(found.handlers().is_empty());

        assert_eq!(router.find(&Method::OPTIONS, "files").unwrap().route().method(), Method::OPTIONS);
        assert_eq!(router.find(&Method::GET, "/files/a.txt").unwrap_err().status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(router.find(&Method::GET, "/dirs").unwrap_err().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn router_is_a_transport_handler() {
        let router = Router::builder().head("/health", handlers![|ctx| ctx.send(())]).build().unwrap();

        let response = Handler::call(&router, request(Method::HEAD, "/health"));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    }
}
