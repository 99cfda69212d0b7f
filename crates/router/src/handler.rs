//! Request handlers and the helpers to build handler chains.

use std::sync::Arc;

use crate::request::RequestContext;

/// One link of a route's handler chain.
///
/// A handler reads from and writes to the [`RequestContext`]. Once any handler
/// sends a response, the rest of the chain is skipped.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, ctx: &mut RequestContext<'_>);
}

impl<F> RequestHandler for F
where
    F: Fn(&mut RequestContext<'_>) + Send + Sync,
{
    #[inline]
    fn handle(&self, ctx: &mut RequestContext<'_>) {
        (self)(ctx);
    }
}

/// A shareable handler; the same middleware may sit in many chains
pub type BoxedHandler = Arc<dyn RequestHandler>;

/// Turns a closure or function into a [`BoxedHandler`]
pub fn handler_fn<F>(f: F) -> BoxedHandler
where
    F: Fn(&mut RequestContext<'_>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Builds a `Vec<BoxedHandler>` from closures or functions, in order.
///
/// ```
/// use micro_router::{handlers, RequestContext};
///
/// fn auth(ctx: &mut RequestContext<'_>) {
///     ctx.set("user", String::from("alice"));
/// }
///
/// let chain = handlers![auth, |ctx| ctx.send("hello")];
/// assert_eq!(chain.len(), 2);
/// ```
#[macro_export]
macro_rules! handlers {
    ($($handler:expr),* $(,)?) => {
        vec![$($crate::handler_fn($handler)),*]
    };
}
