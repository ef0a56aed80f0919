//! Prefix tree implementation for HTTP route matching
//!
//! One tree exists per HTTP method. Each node represents a single path
//! segment; routes are stored at terminal nodes.
//!
//! - Static segments (e.g., `users`) match exactly
//! - Parameter segments (e.g., `:id`) match any single segment
//! - Wildcard segments (e.g., `*filepath`) match the rest of the path
//!
//! A node has at most one wildcard child. Two patterns that differ only in
//! parameter names therefore land on the same terminus, which is how
//! conflicting declarations are detected at insertion time rather than
//! silently shadowing each other at request time.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut root = TrieNode::root();
//! root.insert(&["users", ":id"], Arc::new(route))?;
//! let found = root.search(&["users", "42"]);
//! ```

use std::sync::Arc;

use super::core::Route;
use super::error::RouteError;

/// Parsed form of one pattern segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text that must match exactly
    Static(String),
    /// `:name` - binds exactly one path segment
    Param(Arc<str>),
    /// `*name` - binds the remainder of the path; a bare `*` binds nothing
    CatchAll(Option<Arc<str>>),
}

impl Segment {
    /// Classify a single (non-empty) pattern segment
    pub(crate) fn parse(part: &str) -> Self {
        if let Some(name) = part.strip_prefix(':') {
            Segment::Param(Arc::from(name))
        } else if let Some(name) = part.strip_prefix('*') {
            Segment::CatchAll((!name.is_empty()).then(|| Arc::from(name)))
        } else {
            Segment::Static(part.to_string())
        }
    }
}

/// Split a pattern or request path into its non-empty segments
///
/// Splitting stops after the first wildcard segment: anything following a
/// `*name` segment is discarded, since the wildcard already consumes the
/// remainder of the path.
pub(crate) fn split_pattern(pattern: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    for part in pattern.split('/').filter(|s| !s.is_empty()) {
        parts.push(part);
        if part.starts_with('*') {
            break;
        }
    }
    parts
}

/// Split a request path into its non-empty segments
///
/// Unlike [`split_pattern`] a `*` in a request path is ordinary text.
pub(crate) fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn is_wild(part: &str) -> bool {
    part.starts_with(':') || part.starts_with('*')
}

/// Node in the prefix tree
#[derive(Clone)]
pub(crate) struct TrieNode {
    /// The path segment this node represents (empty only for the root)
    segment: String,
    /// True if `segment` is a `:param` or `*wildcard` marker
    is_wild: bool,
    /// Route bound to this node; `None` means the node is not a terminus
    route: Option<Arc<Route>>,
    /// Child nodes in insertion order
    children: Vec<TrieNode>,
}

impl TrieNode {
    pub(crate) fn root() -> Self {
        Self::new("")
    }

    fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            is_wild: is_wild(segment),
            route: None,
            children: Vec::new(),
        }
    }

    /// Insert a route into the tree
    ///
    /// Returns `Ok(true)` when an identical pattern was already bound and its
    /// handlers have been replaced.
    pub(crate) fn insert(&mut self, parts: &[&str], route: Arc<Route>) -> Result<bool, RouteError> {
        let Some((part, remaining)) = parts.split_first() else {
            if let Some(existing) = &self.route {
                if existing.pattern() != route.pattern() {
                    return Err(RouteError::Conflict {
                        method: route.method().clone(),
                        pattern: route.pattern().to_string(),
                        existing: existing.pattern().to_string(),
                    });
                }
            }
            return Ok(self.route.replace(route).is_some());
        };

        let index = match self.find_child(part, &route)? {
            Some(index) => index,
            None => {
                self.children.push(TrieNode::new(part));
                self.children.len() - 1
            }
        };
        self.children[index].insert(remaining, route)
    }

    /// Child to descend into while inserting `part`
    fn find_child(&self, part: &str, route: &Route) -> Result<Option<usize>, RouteError> {
        if !is_wild(part) {
            return Ok(self
                .children
                .iter()
                .position(|child| !child.is_wild && child.segment == part));
        }

        let Some(index) = self.children.iter().position(|child| child.is_wild) else {
            return Ok(None);
        };
        let existing = &self.children[index].segment;
        if existing.starts_with('*') != part.starts_with('*') {
            return Err(RouteError::MixedWildcard {
                method: route.method().clone(),
                pattern: route.pattern().to_string(),
                segment: part.to_string(),
                existing: existing.clone(),
            });
        }
        Ok(Some(index))
    }

    /// Search for the route matching the given request segments
    ///
    /// Static children are tried before the wildcard child; the first branch
    /// that reaches a bound terminus wins.
    pub(crate) fn search(&self, parts: &[&str]) -> Option<&Arc<Route>> {
        if parts.is_empty() || self.segment.starts_with('*') {
            return self.route.as_ref();
        }

        let part = parts[0];
        let remaining = &parts[1..];

        let statics = self
            .children
            .iter()
            .filter(|child| !child.is_wild && child.segment == part);
        let wild = self.children.iter().filter(|child| child.is_wild);

        statics.chain(wild).find_map(|child| child.search(remaining))
    }

    /// Collect every route bound in this subtree
    pub(crate) fn collect<'a>(&'a self, out: &mut Vec<&'a Arc<Route>>) {
        if let Some(route) = &self.route {
            out.push(route);
        }
        for child in &self.children {
            child.collect(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn route(pattern: &str) -> Arc<Route> {
        Arc::new(Route::new(Method::GET, pattern, Vec::new()))
    }

    fn insert(root: &mut TrieNode, pattern: &str) -> Result<bool, RouteError> {
        root.insert(&split_pattern(pattern), route(pattern))
    }

    fn lookup<'a>(root: &'a TrieNode, path: &str) -> Option<&'a str> {
        root.search(&split_path(path)).map(|r| r.pattern())
    }

    #[test]
    fn test_split_pattern_stops_at_wildcard() {
        assert_eq!(split_pattern("/assets/*filepath/ignored"), vec!["assets", "*filepath"]);
        assert_eq!(split_pattern("//a///b/"), vec!["a", "b"]);
        assert!(split_pattern("/").is_empty());
    }

    #[test]
    fn test_split_path_keeps_star_text() {
        assert_eq!(split_path("/a/*b/c"), vec!["a", "*b", "c"]);
    }

    #[test]
    fn test_segment_parse() {
        assert_eq!(Segment::parse("users"), Segment::Static("users".into()));
        assert_eq!(Segment::parse(":id"), Segment::Param(Arc::from("id")));
        assert_eq!(Segment::parse("*path"), Segment::CatchAll(Some(Arc::from("path"))));
        assert_eq!(Segment::parse("*"), Segment::CatchAll(None));
    }

    #[test]
    fn test_root_pattern() {
        let mut root = TrieNode::root();
        insert(&mut root, "/").unwrap();
        assert_eq!(lookup(&root, "/"), Some("/"));
        assert_eq!(lookup(&root, ""), Some("/"));
        assert_eq!(lookup(&root, "/x"), None);
    }

    #[test]
    fn test_intermediate_node_is_not_a_terminus() {
        let mut root = TrieNode::root();
        insert(&mut root, "/a/b/c").unwrap();
        assert_eq!(lookup(&root, "/a/b"), None);
        assert_eq!(lookup(&root, "/a/b/c"), Some("/a/b/c"));
    }

    #[test]
    fn test_same_pattern_replaces() {
        let mut root = TrieNode::root();
        assert!(!insert(&mut root, "/a/:id").unwrap());
        assert!(insert(&mut root, "/a/:id").unwrap());
    }

    #[test]
    fn test_param_rename_conflicts() {
        let mut root = TrieNode::root();
        insert(&mut root, "/user/:id").unwrap();
        let err = insert(&mut root, "/user/:name").unwrap_err();
        assert!(matches!(err, RouteError::Conflict { .. }));
    }

    #[test]
    fn test_mixed_wildcard_kinds_conflict() {
        let mut root = TrieNode::root();
        insert(&mut root, "/files/:name").unwrap();
        let err = insert(&mut root, "/files/*path").unwrap_err();
        assert!(matches!(err, RouteError::MixedWildcard { .. }));
    }

    #[test]
    fn test_shared_param_node_with_divergent_tails() {
        let mut root = TrieNode::root();
        insert(&mut root, "/users/:user_id/posts").unwrap();
        insert(&mut root, "/users/:id/comments").unwrap();
        assert_eq!(lookup(&root, "/users/1/posts"), Some("/users/:user_id/posts"));
        assert_eq!(lookup(&root, "/users/1/comments"), Some("/users/:id/comments"));
    }

    #[test]
    fn test_static_preferred_over_param_in_either_order() {
        let mut a = TrieNode::root();
        insert(&mut a, "/user/:id").unwrap();
        insert(&mut a, "/user/list").unwrap();

        let mut b = TrieNode::root();
        insert(&mut b, "/user/list").unwrap();
        insert(&mut b, "/user/:id").unwrap();

        for root in [&a, &b] {
            assert_eq!(lookup(root, "/user/list"), Some("/user/list"));
            assert_eq!(lookup(root, "/user/42"), Some("/user/:id"));
        }
    }

    #[test]
    fn test_backtracks_from_static_branch() {
        let mut root = TrieNode::root();
        insert(&mut root, "/a/b/c").unwrap();
        insert(&mut root, "/a/:x/d").unwrap();
        assert_eq!(lookup(&root, "/a/b/d"), Some("/a/:x/d"));
        assert_eq!(lookup(&root, "/a/b/c"), Some("/a/b/c"));
    }

    #[test]
    fn test_wildcard_consumes_remainder() {
        let mut root = TrieNode::root();
        insert(&mut root, "/assets/*filepath").unwrap();
        assert_eq!(lookup(&root, "/assets/css/a.css"), Some("/assets/*filepath"));
        assert_eq!(lookup(&root, "/assets/a"), Some("/assets/*filepath"));
        assert_eq!(lookup(&root, "/assets"), None);
    }

    #[test]
    fn test_collect_lists_termini() {
        let mut root = TrieNode::root();
        insert(&mut root, "/").unwrap();
        insert(&mut root, "/a").unwrap();
        insert(&mut root, "/a/:b").unwrap();
        let mut out = Vec::new();
        root.collect(&mut out);
        let mut patterns: Vec<&str> = out.iter().map(|r| r.pattern()).collect();
        patterns.sort_unstable();
        assert_eq!(patterns, vec!["/", "/a", "/a/:b"]);
    }
}
