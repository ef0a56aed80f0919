use std::sync::Arc;

use crate::context::Context;

/// Anything that can take part in a request's handler chain
///
/// Middlewares and endpoint handlers share this one interface. A handler may
/// read or mutate the request context, write the response, call
/// [`Context::next`] to run the rest of the chain before its own trailing
/// logic, or call [`Context::abort`] to stop the chain.
///
/// Implemented for every `Fn(&mut Context)` closure:
///
/// ```rust
/// use chainroute::{handler, Context};
/// use http::StatusCode;
///
/// let hello = handler(|c: &mut Context| c.string(StatusCode::OK, "hello"));
/// # let _ = hello;
/// ```
pub trait Handler: Send + Sync + 'static {
    fn handle(&self, ctx: &mut Context);
}

impl<F> Handler for F
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    fn handle(&self, ctx: &mut Context) {
        self(ctx)
    }
}

/// A handler shared between the route table and every request chain using it
pub type SharedHandler = Arc<dyn Handler>;

/// Ordered sequence of handlers
pub type HandlersChain = Vec<SharedHandler>;

/// Wrap a handler for registration
pub fn handler<H: Handler>(h: H) -> SharedHandler {
    Arc::new(h)
}
