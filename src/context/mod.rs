//! # Context Module
//!
//! Per-request state and the chain executor.
//!
//! A [`Context`] is created for every request, receives the handler chain the
//! dispatcher assembled, and drives it with a single cursor:
//!
//! - [`Context::next`] advances through the chain; wrap-style middlewares call it
//!   themselves and run their trailing logic once it returns
//! - [`Context::abort`] stops the chain after the current handler
//! - [`Context::next_guarded`] runs the rest of the chain under a panic trap so a
//!   middleware can turn a fault into one 500 response
//!
//! ```text
//! NotStarted (cursor -1) ──next──▶ Running ──cursor ≥ len──▶ Finished
//!                                     │
//!                                     └──abort──▶ Aborted
//! ```
//!
//! Aborted and Finished are terminal.

mod core;
mod request;
mod response;

pub use core::{ChainState, Context, HandlerFault};
pub use request::{HeaderVec, Request, MAX_INLINE_HEADERS};
pub use response::Response;
