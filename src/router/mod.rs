//! # Router Module
//!
//! The router module provides path matching and route resolution for chainroute.
//! It keeps one prefix tree per HTTP method and resolves request paths against
//! registered patterns.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Binding path patterns to endpoint handler chains at start-up
//! - Rejecting conflicting pattern declarations while the table is built
//! - Matching incoming (method, path) pairs to registered routes
//! - Extracting path parameters from matched routes
//!
//! ## Pattern Syntax
//!
//! | Segment form | Matches | Binds |
//! |---|---|---|
//! | `literal` | exact text | — |
//! | `:name` | exactly one path segment | `name` → segment value |
//! | `*name` | remainder of path (must be final segment) | `name` → joined remainder |
//!
//! ## Example
//!
//! ```rust
//! use chainroute::router::Router;
//! use http::Method;
//!
//! # fn main() -> Result<(), chainroute::router::RouteError> {
//! let mut router = Router::new();
//! router.insert(Method::GET, "/pets/:id", Vec::new())?;
//!
//! let matched = router.route(&Method::GET, "/pets/123").unwrap();
//! assert_eq!(matched.get_path_param("id"), Some("123"));
//! assert!(router.route(&Method::GET, "/pets/123/owner").is_none());
//! # Ok(())
//! # }
//! ```
//!
//! ## Matching Order
//!
//! Static children are tried before the wildcard child at every level, so
//! `/user/list` and `/user/:id` can coexist. Patterns that only differ in
//! parameter names (`/user/:id` vs `/user/:name`) are rejected at insertion.

mod core;
mod error;
mod trie;

pub use core::{ParamVec, Route, RouteMatch, Router, MAX_INLINE_PARAMS};
pub use error::RouteError;
pub use trie::Segment;
