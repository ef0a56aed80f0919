//! # Middleware Module
//!
//! Middlewares are ordinary [`Handler`](crate::Handler)s attached to a route
//! group. They run before the route handlers and may call
//! [`Context::next`](crate::Context::next) to run the rest of the chain first,
//! then act on the result.
//!
//! ## Built-in Middleware
//!
//! - [`Logger`] - one access log line per request with status and latency
//! - [`Recovery`] - traps panics downstream and answers 500
//!
//! [`Engine::with_defaults`](crate::Engine::with_defaults) installs both on
//! the root group, logger first.
//!
//! ## Custom Middleware
//!
//! ```rust
//! use chainroute::{Context, Engine};
//! use http::StatusCode;
//!
//! let mut engine = Engine::new();
//! engine.group("/admin").use_middleware(|c: &mut Context| {
//!     if c.header("authorization").is_none() {
//!         c.fail(StatusCode::UNAUTHORIZED, "missing credentials");
//!     }
//! });
//! ```

mod logger;
mod recovery;

pub use logger::Logger;
pub use recovery::Recovery;
