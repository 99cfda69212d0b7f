//! Resolves a method and path against an ordered route table.

use http::Method;
use tracing::debug;

use super::Route;
use crate::error::HttpError;
use crate::handler::BoxedHandler;
use crate::params::PathParams;

/// A route selected for a request, with its bound path variables
#[derive(Debug)]
pub struct RouteMatch<'r> {
    route: &'r Route,
    params: PathParams,
}

impl<'r> RouteMatch<'r> {
    pub fn route(&self) -> &'r Route {
        self.route
    }

    pub fn handlers(&self) -> &'r [BoxedHandler] {
        self.route.handlers()
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn into_parts(self) -> (&'r Route, PathParams) {
        (self.route, self.params)
    }
}

/// Finds the route serving `method` and the normalized `path`.
///
/// The first route whose pattern matches `path` decides between found and
/// `404 Not Found`. If one exists, the whole table is scanned for a route
/// matching both `path` and `method`; without one the result is
/// `405 Method Not Allowed`.
pub(crate) fn find<'r>(routes: &'r [Route], method: &Method, path: &str) -> Result<RouteMatch<'r>, HttpError> {
    let Some(first) = routes.iter().find(|route| route.pattern().is_match(path)) else {
        debug!(%method, path, "no route matches path");
        return Err(HttpError::not_found());
    };

    let matched = routes
        .iter()
        .filter(|route| route.method() == method)
        .find_map(|route| route.pattern().captures(path).map(|captures| (route, captures)));

    match matched {
        Some((route, captures)) => {
            debug!(%method, path, route = route.path(), "route matched");
            Ok(RouteMatch { route, params: captures.into_iter().collect() })
        }
        None => {
            debug!(%method, path, route = first.path(), "path matched but method not allowed");
            Err(HttpError::method_not_allowed())
        }
    }
}
