//! Runs a route's handler chain against a request context.

use tracing::debug;

use crate::handler::BoxedHandler;
use crate::request::RequestContext;

/// Invokes `handlers` in order, stopping after the first one that sends a response.
///
/// A chain that finishes without sending leaves the transport default in place.
pub fn execute(handlers: &[BoxedHandler], ctx: &mut RequestContext<'_>) {
    ctx.begin_handling();

    for (index, handler) in handlers.iter().enumerate() {
        handler.handle(ctx);

        if ctx.is_sent() {
            let skipped = handlers.len() - index - 1;
            if skipped > 0 {
                debug!(path = ctx.path(), skipped, "response sent, skip the rest of the chain");
            }
            return;
        }
    }
}
