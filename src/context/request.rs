use http::Method;
use percent_encoding::percent_decode_str;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::sync::Arc;

/// Maximum inline headers before heap allocation
/// Most requests have ≤16 headers
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage for the hot path
///
/// Header names use `Arc<str>` because they are often repeated
/// (Content-Type, Authorization, etc.); values are per-request data.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Incoming request as handed over by the listener
///
/// The listener is an external collaborator: it parses the wire format and
/// builds one of these per request before calling
/// [`Engine::handle`](crate::Engine::handle).
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request target exactly as received (path plus optional query string)
    pub target: String,
    /// HTTP headers
    pub headers: HeaderVec,
    /// Raw request body
    pub body: Vec<u8>,
}

impl Request {
    /// Create a request for `target` (e.g. `/users?limit=10`) with no headers or body
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    /// Replace the body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Path component of the target (everything before `?`)
    #[must_use]
    pub fn path(&self) -> &str {
        match self.target.split_once('?') {
            Some((path, _)) => path,
            None => &self.target,
        }
    }

    /// Percent-decoded path, the form routes and group prefixes match against
    ///
    /// Invalid UTF-8 in the decoded bytes is replaced rather than rejected.
    #[must_use]
    pub fn decoded_path(&self) -> Cow<'_, str> {
        percent_decode_str(self.path()).decode_utf8_lossy()
    }

    /// Raw query string (everything after `?`), if any
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, query)| query)
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Look up a URL-decoded query parameter; the first occurrence wins
    #[must_use]
    pub fn query(&self, key: &str) -> Option<String> {
        let query = self.query_string()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Look up a field of an `application/x-www-form-urlencoded` body
    ///
    /// Returns `None` when the body is declared with another content type.
    #[must_use]
    pub fn form_value(&self, key: &str) -> Option<String> {
        if let Some(content_type) = self.get_header("content-type") {
            if !content_type
                .to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
            {
                return None;
            }
        }
        url::form_urlencoded::parse(&self.body)
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}
