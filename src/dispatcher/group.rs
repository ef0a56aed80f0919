use http::Method;
use std::path::PathBuf;

use super::core::Engine;
use crate::group::GroupId;
use crate::handler::{handler, Handler, HandlersChain};
use crate::router::RouteError;
use crate::static_files::{StaticFiles, FILEPATH_PARAM};

/// Registration view of one route group
///
/// Borrows the engine mutably, so it lives only for the duration of the
/// registration calls made through it. Keep the [`GroupId`] to come back to
/// the same group later through [`Engine::scope`].
///
/// ```rust
/// use chainroute::{Context, Engine, Request};
/// use http::{Method, StatusCode};
///
/// # fn main() -> Result<(), chainroute::RouteError> {
/// let mut engine = Engine::new();
/// let mut v1 = engine.group("/v1");
/// v1.get("/hello", |c: &mut Context| c.string(StatusCode::OK, "v1 hello"))?;
/// let mut admin = v1.group("/admin");
/// admin.get("/stats", |c: &mut Context| c.string(StatusCode::OK, "stats"))?;
///
/// assert_eq!(engine.handle(Request::new(Method::GET, "/v1/admin/stats")).text(), "stats");
/// # Ok(())
/// # }
/// ```
pub struct RouterGroup<'a> {
    engine: &'a mut Engine,
    id: GroupId,
}

impl<'a> RouterGroup<'a> {
    pub(crate) fn new(engine: &'a mut Engine, id: GroupId) -> Self {
        Self { engine, id }
    }

    #[must_use]
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Full path prefix of this group
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.engine.groups().get(self.id).prefix()
    }

    /// Derive a nested group whose prefix is this prefix followed by `suffix`
    pub fn group(&mut self, suffix: &str) -> RouterGroup<'_> {
        let id = self.engine.groups_mut().derive(self.id, suffix);
        RouterGroup::new(self.engine, id)
    }

    /// Append a middleware to this group
    ///
    /// It runs for every request whose path starts with the group prefix,
    /// including routes registered before the call.
    pub fn use_middleware(&mut self, middleware: impl Handler) -> &mut Self {
        self.engine
            .groups_mut()
            .attach(self.id, [handler(middleware)]);
        self
    }

    /// Register `handlers` for `method` at `prefix + pattern`
    pub fn add_route(
        &mut self,
        method: Method,
        pattern: &str,
        handlers: HandlersChain,
    ) -> Result<&mut Self, RouteError> {
        let full = format!("{}{}", self.prefix(), pattern);
        self.engine.router_mut().insert(method, &full, handlers)?;
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

    /// Serve the directory `root` under `relative_path`
    ///
    /// Registers `GET <prefix><relative_path>/*filepath`.
    pub fn static_files(
        &mut self,
        relative_path: &str,
        root: impl Into<PathBuf>,
    ) -> Result<&mut Self, RouteError> {
        let pattern = format!(
            "{}/*{}",
            relative_path.trim_end_matches('/'),
            FILEPATH_PARAM
        );
        let files = StaticFiles::new(root);
        self.add_route(Method::GET, &pattern, vec![files.into_handler()])
    }
}
