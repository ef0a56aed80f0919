use std::borrow::Cow;
use std::time::Instant;

use tracing::{info, info_span};

use crate::config::DEFAULT_MAX_PATH_LEN;
use crate::context::Context;
use crate::handler::Handler;

/// Access logger
///
/// Runs the rest of the chain, then emits one `info` event with the method,
/// request target, final status and latency. Targets longer than
/// `max_path_len` characters are cut short and suffixed with `...`.
#[derive(Debug, Clone, Copy)]
pub struct Logger {
    max_path_len: usize,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PATH_LEN)
    }
}

impl Logger {
    #[must_use]
    pub fn new(max_path_len: usize) -> Self {
        Self { max_path_len }
    }

    #[must_use]
    pub fn max_path_len(&self) -> usize {
        self.max_path_len
    }
}

fn truncate(target: &str, max: usize) -> Cow<'_, str> {
    match target.char_indices().nth(max) {
        Some((cut, _)) => Cow::Owned(format!("{}...", &target[..cut])),
        None => Cow::Borrowed(target),
    }
}

impl Handler for Logger {
    fn handle(&self, c: &mut Context) {
        let span = info_span!("request", request_id = %c.request_id, method = %c.method());
        let _entered = span.enter();

        let start = Instant::now();
        c.next();
        let latency = start.elapsed();

        info!(
            request_id = %c.request_id,
            method = %c.method(),
            uri = %truncate(&c.request().target, self.max_path_len),
            status = c.status().as_u16(),
            latency_us = u64::try_from(latency.as_micros()).unwrap_or(u64::MAX),
            "Request completed"
        );
    }
}
