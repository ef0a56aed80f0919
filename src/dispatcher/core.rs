//! Dispatcher core module - hot path for request dispatch.

use http::{Method, StatusCode};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error};

use super::group::RouterGroup;
use crate::config::EngineConfig;
use crate::context::{Context, Request, Response};
use crate::group::{GroupId, GroupTree};
use crate::handler::{handler, Handler, HandlersChain, SharedHandler};
use crate::middleware::{Logger, Recovery};
use crate::router::{Route, RouteError, Router};

/// Synthetic endpoint used when no route matches
fn not_found(c: &mut Context) {
    debug!(
        request_id = %c.request_id,
        method = %c.method(),
        path = %c.path(),
        "No route matched - answering 404"
    );
    let body = format!("404 NOT FOUND: {}\n", c.path());
    c.string(StatusCode::NOT_FOUND, body);
}

/// The dispatch engine: route table, group tree and request entry point
///
/// Built once at start-up through `&mut` registration calls, then shared
/// read-only (e.g. behind an `Arc`) by every request-serving thread.
///
/// ```rust
/// use chainroute::{Context, Engine, Request};
/// use http::{Method, StatusCode};
///
/// # fn main() -> Result<(), chainroute::RouteError> {
/// let mut engine = Engine::new();
/// engine.get("/hello/:name", |c: &mut Context| {
///     let body = format!("hello {}", c.param("name").unwrap_or_default());
///     c.string(StatusCode::OK, body);
/// })?;
///
/// let res = engine.handle(Request::new(Method::GET, "/hello/geek"));
/// assert_eq!(res.status, StatusCode::OK);
/// assert_eq!(res.text(), "hello geek");
/// # Ok(())
/// # }
/// ```
pub struct Engine {
    router: Router,
    groups: GroupTree,
    not_found: SharedHandler,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine with no routes and no middlewares
    #[must_use]
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            groups: GroupTree::new(),
            not_found: handler(not_found),
        }
    }

    /// Create an engine whose root group runs the access logger and the
    /// recovery middleware
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.use_middleware(Logger::default()).use_middleware(Recovery);
        engine
    }

    /// Create an engine from configuration
    ///
    /// Installs the default middlewares when enabled and registers every
    /// configured static mount on the root group.
    pub fn from_config(config: &EngineConfig) -> Result<Self, RouteError> {
        let mut engine = Self::new();
        if config.default_middleware {
            engine
                .use_middleware(Logger::new(config.access_log.max_path_len))
                .use_middleware(Recovery);
        }
        for mount in &config.statics {
            engine.static_files(&mount.path, mount.root.clone())?;
        }
        Ok(engine)
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Registration view of the root group
    pub fn root(&mut self) -> RouterGroup<'_> {
        let id = self.groups.root();
        RouterGroup::new(self, id)
    }

    /// Derive a group from the root with the given prefix
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        let id = self.groups.derive(self.groups.root(), prefix);
        RouterGroup::new(self, id)
    }

    /// Registration view of a previously created group
    ///
    /// `None` when `id` was not issued by this engine.
    pub fn scope(&mut self, id: GroupId) -> Option<RouterGroup<'_>> {
        if !self.groups.contains(id) {
            return None;
        }
        Some(RouterGroup::new(self, id))
    }

    /// Attach a middleware to the root group (applies to every request)
    pub fn use_middleware(&mut self, middleware: impl Handler) -> &mut Self {
        let root = self.groups.root();
        self.groups.attach(root, [handler(middleware)]);
        self
    }

    /// Register `handlers` for `method` and `pattern` on the root group
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handlers: HandlersChain,
    ) -> Result<&mut Self, RouteError> {
        self.router.insert(method, pattern, handlers)?;
        Ok(self)
    }

    pub fn get(&mut self, pattern: &str, h: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(Method::GET, pattern, vec![handler(h)])
    }

    pub fn post(&mut self, pattern: &str, h: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(Method::POST, pattern, vec![handler(h)])
    }

    pub fn put(&mut self, pattern: &str, h: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(Method::PUT, pattern, vec![handler(h)])
    }

    pub fn patch(&mut self, pattern: &str, h: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(Method::PATCH, pattern, vec![handler(h)])
    }

    pub fn delete(&mut self, pattern: &str, h: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(Method::DELETE, pattern, vec![handler(h)])
    }

    pub fn head(&mut self, pattern: &str, h: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(Method::HEAD, pattern, vec![handler(h)])
    }

    pub fn options(&mut self, pattern: &str, h: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(Method::OPTIONS, pattern, vec![handler(h)])
    }

    /// Serve files below `root` at `relative_path/*filepath`
    pub fn static_files(
        &mut self,
        relative_path: &str,
        root: impl Into<PathBuf>,
    ) -> Result<&mut Self, RouteError> {
        self.root().static_files(relative_path, root)?;
        Ok(self)
    }

    pub(crate) fn groups_mut(&mut self) -> &mut GroupTree {
        &mut self.groups
    }

    pub(crate) fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn groups(&self) -> &GroupTree {
        &self.groups
    }

    /// Every registered route, ordered by pattern then method
    #[must_use]
    pub fn routes(&self) -> Vec<Arc<Route>> {
        self.router.routes()
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Build the request context with its fully assembled handler chain
    ///
    /// Group middlewares come first (in group-registration order), followed by
    /// the matched route's handlers or the synthetic not-found handler. Both
    /// lookups use the percent-decoded path, so `/files/a%20b` binds `a b`.
    #[must_use]
    pub fn prepare(&self, request: Request) -> Context {
        let mut ctx = Context::new(request);
        let mut handlers = self.groups.middlewares_for(ctx.path());

        match self.router.route(ctx.method(), ctx.path()) {
            Some(matched) => {
                handlers.extend(matched.route.handlers().iter().cloned());
                ctx.set_params(matched.path_params);
            }
            None => handlers.push(Arc::clone(&self.not_found)),
        }

        ctx.set_handlers(handlers);
        ctx
    }

    /// Run one request through its handler chain and produce the response
    ///
    /// This is the outermost fault guard: a panic no middleware recovered is
    /// trapped here and answered with a single 500 response.
    #[must_use]
    pub fn handle(&self, request: Request) -> Response {
        let mut ctx = self.prepare(request);

        if let Err(fault) = ctx.next_guarded() {
            error!(
                request_id = %ctx.request_id,
                method = %ctx.method(),
                path = %ctx.path(),
                panic_message = %fault.message,
                backtrace = %fault.backtrace,
                "Unrecovered handler panic - CRITICAL"
            );
            ctx.fail_internal();
        }

        ctx.into_response()
    }
}
