//! # Dispatcher Module
//!
//! The dispatcher ties the router, the group tree and the chain executor
//! together into the [`Engine`], the single entry point that turns a
//! [`Request`](crate::Request) into a [`Response`](crate::Response).
//!
//! ## Lifecycle
//!
//! 1. **Registration** (start-up, `&mut Engine`): routes and middlewares are
//!    added through the engine itself or through [`RouterGroup`] views.
//!    Registration errors ([`RouteError`](crate::RouteError)) are returned to
//!    the caller so a bad route table fails start-up.
//! 2. **Dispatch** (`&Engine`, any number of threads):
//!    - collect middlewares of every group whose prefix matches the path
//!    - look the path up in the method's trie
//!    - append the route handlers, or a not-found handler answering
//!      `404 NOT FOUND: <path>`
//!    - run the chain under a panic guard and return the response
//!
//! ## Fault Isolation
//!
//! [`Recovery`](crate::middleware::Recovery) traps panics inside the chain
//! and answers 500. The engine applies the same guard around the whole chain,
//! so a panic never escapes [`Engine::handle`] even without the middleware.

mod core;
mod group;

pub use core::Engine;
pub use group::RouterGroup;
