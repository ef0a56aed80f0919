//! # chainroute
//!
//! **chainroute** is the request-dispatch core of a small HTTP framework: a
//! per-method trie router with `:param` and `*wildcard` segments, nested
//! route groups carrying middlewares, and a chain executor with `next`,
//! `abort` and panic isolation.
//!
//! It owns no sockets. A listener (or a test) builds a [`Request`], hands it
//! to [`Engine::handle`] and writes the returned [`Response`] back.
//!
//! ## Architecture
//!
//! - **[`router`]** - one segment trie per HTTP method; conflict detection at
//!   registration, static-before-wildcard lookup at dispatch
//! - **[`group`]** - prefix scopes with their own middleware lists
//! - **[`context`]** - per-request state and the chain cursor
//! - **[`dispatcher`]** - the [`Engine`] tying it all together
//! - **[`middleware`]** - access [`Logger`](middleware::Logger) and panic
//!   [`Recovery`](middleware::Recovery)
//! - **[`static_files`]** - `*filepath` file serving
//! - **[`config`]** / **[`logging`]** - start-up configuration and tracing setup
//! - **[`cli`]** - the `chainroute` command: route listing and one-shot dispatch
//!
//! ### Request Handling Flow
//!
//! ```text
//! Request ──▶ Engine::prepare
//!               ├─ group middlewares whose prefix matches the path
//!               └─ trie lookup ──▶ route handlers + params
//!                              └─▶ not-found handler (404)
//!          ──▶ Context::next_guarded ──▶ h0 ──next──▶ h1 ──▶ ... ──▶ endpoint
//!          ──▶ Response (+ x-request-id)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use chainroute::{Context, Engine, Request};
//! use http::{Method, StatusCode};
//!
//! # fn main() -> Result<(), chainroute::RouteError> {
//! let mut engine = Engine::with_defaults();
//! engine.get("/", |c: &mut Context| c.string(StatusCode::OK, "Hello chainroute\n"))?;
//!
//! let mut v1 = engine.group("/v1");
//! v1.get("/hello/:name", |c: &mut Context| {
//!     let body = format!("hello {}, you're at {}\n", c.param("name").unwrap_or_default(), c.path());
//!     c.string(StatusCode::OK, body);
//! })?;
//! v1.get("/assets/*filepath", |c: &mut Context| {
//!     let body = serde_json::json!({ "filepath": c.param("filepath") });
//!     c.json(StatusCode::OK, &body);
//! })?;
//!
//! let res = engine.handle(Request::new(Method::GET, "/v1/hello/geek"));
//! assert_eq!(res.status, StatusCode::OK);
//! assert_eq!(res.text(), "hello geek, you're at /v1/hello/geek\n");
//!
//! let res = engine.handle(Request::new(Method::GET, "/nope"));
//! assert_eq!(res.status, StatusCode::NOT_FOUND);
//! assert_eq!(res.text(), "404 NOT FOUND: /nope\n");
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Registration needs `&mut Engine`; dispatch needs only `&Engine`. Once the
//! route table is built the engine can be shared across threads (e.g. in an
//! `Arc`) with no locking. Each request gets its own [`Context`].

pub mod cli;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod group;
mod handler;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod static_files;

pub use context::{ChainState, Context, HandlerFault, Request, Response};
pub use dispatcher::{Engine, RouterGroup};
pub use group::GroupId;
pub use handler::{handler, Handler, HandlersChain, SharedHandler};
pub use ids::RequestId;
pub use router::{Route, RouteError};
