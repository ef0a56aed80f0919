//! # CLI Module
//!
//! Command-line front end for poking at an engine without a network
//! listener. It builds the bundled demo application (plus any static mounts
//! from the config file) and then either lists the route table or pushes one
//! synthetic request through the dispatcher.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! ```bash
//! chainroute --config chainroute.toml routes
//! ```
//!
//! ### `request`
//!
//! ```bash
//! chainroute request GET /v1/hello/geek
//! chainroute request POST /v1/login \
//!     --header content-type:application/x-www-form-urlencoded \
//!     --body 'username=geek&password=1234'
//! ```
//!
//! Prints the status line, the response headers and the body.

mod commands;
mod demo;

pub use commands::{run_cli, Cli, Commands};
pub use demo::demo_engine;
