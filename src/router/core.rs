//! Router core module - hot path for request routing.

use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::RouteError;
use super::trie::{split_path, split_pattern, Segment, TrieNode};
use crate::handler::HandlersChain;

/// Maximum number of path parameters before heap allocation.
/// Most routes have ≤4 path params (e.g., /users/:id/posts/:post_id).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Param names use `Arc<str>` because they come from the route table (known
/// at startup); values are per-request data from the URL. Keys are unique.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A registered route: its method, registered pattern and endpoint handlers
pub struct Route {
    method: Method,
    pattern: String,
    segments: Vec<Segment>,
    handlers: HandlersChain,
}

impl Route {
    pub(crate) fn new(method: Method, pattern: &str, handlers: HandlersChain) -> Self {
        let segments = split_pattern(pattern).into_iter().map(Segment::parse).collect();
        Self {
            method,
            pattern: pattern.to_string(),
            segments,
            handlers,
        }
    }

    /// HTTP method this route was registered for
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The full pattern string as registered (including any group prefix)
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Endpoint handlers bound to this route
    #[must_use]
    pub fn handlers(&self) -> &HandlersChain {
        &self.handlers
    }

    /// Bind parameters by walking the pattern in lock-step with the request
    fn extract_params(&self, parts: &[&str]) -> ParamVec {
        let mut params = ParamVec::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Static(_) => {}
                Segment::Param(name) => {
                    if let Some(value) = parts.get(i) {
                        set_param(&mut params, name, (*value).to_string());
                    }
                }
                Segment::CatchAll(name) => {
                    if let Some(name) = name {
                        let rest = parts.get(i..).map(|r| r.join("/")).unwrap_or_default();
                        set_param(&mut params, name, rest);
                    }
                    break;
                }
            }
        }
        params
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Insert or overwrite a parameter, keeping names unique
fn set_param(params: &mut ParamVec, name: &Arc<str>, value: String) {
    match params.iter().position(|(k, _)| **k == **name) {
        Some(i) => params[i].1 = value,
        None => params.push((Arc::clone(name), value)),
    }
}

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route (Arc to avoid cloning the handler chain)
    pub route: Arc<Route>,
    /// Path parameters extracted from the URL (e.g., `:id` → `{"id": "123"}`)
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to a HashMap
    /// Note: This allocates - use get_path_param() in hot paths instead
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Router that matches HTTP requests to handler chains using one prefix tree
/// per method
///
/// Built during start-up through [`Router::insert`]; read-only afterwards.
#[derive(Clone, Default)]
pub struct Router {
    roots: HashMap<Method, TrieNode>,
}

impl Router {
    /// Create an empty router
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handlers` to `pattern` for `method`
    ///
    /// The method's tree is created on first use. Registering the exact same
    /// pattern twice replaces its handlers; registering a different pattern
    /// that resolves to an already bound terminus is a [`RouteError`].
    pub fn insert(
        &mut self,
        method: Method,
        pattern: &str,
        handlers: HandlersChain,
    ) -> Result<(), RouteError> {
        let route = Arc::new(Route::new(method.clone(), pattern, handlers));
        let root = self.roots.entry(method.clone()).or_insert_with(TrieNode::root);
        let replaced = root.insert(&split_pattern(pattern), route)?;

        if replaced {
            warn!(method = %method, pattern = %pattern, "Replaced handlers of existing route");
        } else {
            info!(method = %method, pattern = %pattern, "Route registered");
        }
        Ok(())
    }

    /// Match an HTTP request to a route
    ///
    /// # Returns
    ///
    /// * `Some(RouteMatch)` - the bound route with extracted parameters
    /// * `None` - unknown method or no pattern matches the path
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let root = self.roots.get(method)?;
        let parts = split_path(path);
        let Some(route) = root.search(&parts) else {
            debug!(method = %method, path = %path, "No route matched");
            return None;
        };
        Some(RouteMatch {
            path_params: route.extract_params(&parts),
            route: Arc::clone(route),
        })
    }

    /// Every registered route, ordered by pattern then method
    #[must_use]
    pub fn routes(&self) -> Vec<Arc<Route>> {
        let mut out = Vec::new();
        for root in self.roots.values() {
            root.collect(&mut out);
        }
        let mut routes: Vec<Arc<Route>> = out.into_iter().map(Arc::clone).collect();
        routes.sort_by(|a, b| {
            a.pattern()
                .cmp(b.pattern())
                .then_with(|| a.method().as_str().cmp(b.method().as_str()))
        });
        routes
    }
}
