//! # Route Group Module
//!
//! Route groups are nested path-prefix scopes. Each group carries its own
//! middleware list; a request picks up the middlewares of every group whose
//! prefix is a prefix of its path, in the order the groups were created.
//!
//! ```text
//! ""            [Logger, Recovery]
//! ├── "/api"    [A]
//! │   └── "/api/v1"  [B]
//! └── "/admin"  [Auth]
//!
//! GET /api/v1/items  →  Logger, Recovery, A, B, <route handlers>
//! ```
//!
//! Groups only shape the path prefix used at registration and the middleware
//! set applied at dispatch; they never alter the trie itself.

mod core;

pub use core::{GroupId, GroupTree, RouteGroup};
