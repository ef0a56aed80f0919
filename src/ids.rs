//! Request correlation ids.
//!
//! Every dispatched request carries a [`RequestId`]. A caller that already
//! has one (a proxy, another service) passes it in the [`REQUEST_ID_HEADER`]
//! header and it is kept; anything else gets a fresh ULID. The id goes on
//! every log event of the request and back out on the response.

use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

use crate::context::{Request, Response};

/// Header the id is read from and echoed back in
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Sortable per-request id (a ULID, so ids minted later compare greater)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RequestId(Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Id for an incoming request: the caller's if it sent a valid one
    #[must_use]
    pub fn from_request(request: &Request) -> Self {
        request
            .get_header(REQUEST_ID_HEADER)
            .map(str::trim)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(Self::new)
    }

    /// Milliseconds since the Unix epoch at which the id was minted
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }

    pub(crate) fn stamp(&self, response: &mut Response) {
        response.set_header(REQUEST_ID_HEADER, self.to_string());
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}
