use tracing::error;

use crate::context::Context;
use crate::handler::Handler;

/// Panic recovery
///
/// Runs the rest of the chain under a panic guard. A trapped panic is logged
/// with its message and backtrace, whatever the failed chain had written is
/// discarded, and the client gets a single `500 ERROR: <target>` response.
/// No handler after the faulting one runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recovery;

impl Handler for Recovery {
    fn handle(&self, c: &mut Context) {
        if let Err(fault) = c.next_guarded() {
            error!(
                request_id = %c.request_id,
                method = %c.method(),
                path = %c.path(),
                panic_message = %fault.message,
                backtrace = %fault.backtrace,
                "Handler panicked - recovered"
            );
            c.fail_internal();
        }
    }
}
