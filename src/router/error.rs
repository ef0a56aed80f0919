use std::fmt;

use http::Method;

/// Route registration error
///
/// Returned by every registration call when a pattern cannot be bound into the
/// trie. These are start-up faults: the route table they describe can never be
/// served correctly, so callers should propagate them and refuse to serve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Two different patterns resolve to the same trie terminus
    ///
    /// For example `/user/:id` and `/user/:name` on the same method.
    Conflict {
        /// HTTP method both patterns were registered for
        method: Method,
        /// The pattern being registered
        pattern: String,
        /// The pattern already bound to the terminus
        existing: String,
    },
    /// A `:param` and a `*wildcard` segment were declared at the same position
    MixedWildcard {
        /// HTTP method both patterns were registered for
        method: Method,
        /// The pattern being registered
        pattern: String,
        /// The offending segment of `pattern`
        segment: String,
        /// The wildcard segment already present at that position
        existing: String,
    },
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteError::Conflict {
                method,
                pattern,
                existing,
            } => write!(
                f,
                "route conflict on {method}: \"{pattern}\" and \"{existing}\" bind the same route"
            ),
            RouteError::MixedWildcard {
                method,
                pattern,
                segment,
                existing,
            } => write!(
                f,
                "route conflict on {method}: segment \"{segment}\" of \"{pattern}\" \
                 collides with wildcard \"{existing}\" at the same position"
            ),
        }
    }
}

impl std::error::Error for RouteError {}
