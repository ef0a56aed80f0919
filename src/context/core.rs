//! Chain executor - per-request state and cursor over the handler chain.

use http::{Method, StatusCode};
use serde::Serialize;
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Once};
use tracing::{error, warn};

use super::request::Request;
use super::response::Response;
use crate::handler::{HandlersChain, SharedHandler};
use crate::ids::RequestId;
use crate::router::ParamVec;

/// Where a context's chain execution currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// `next` has not been called yet (cursor is -1)
    NotStarted,
    /// A handler at a valid position is executing
    Running,
    /// `abort` was called; no further handler will run
    Aborted,
    /// The cursor moved past the last handler
    Finished,
}

thread_local! {
    /// Number of `next_guarded` frames active on this thread
    static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
    /// Backtrace taken by the panic hook, waiting for the guard to collect it
    static PANIC_TRACE: Cell<Option<Backtrace>> = const { Cell::new(None) };
}

static TRACE_HOOK: Once = Once::new();

/// Wrap the process panic hook so a guarded panic records its backtrace
/// while the faulting frames are still on the stack
///
/// Panics outside a guard only go to the previous hook. The hook is
/// installed once per process.
fn install_trace_hook() {
    TRACE_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if GUARD_DEPTH.with(Cell::get) > 0 {
                PANIC_TRACE.with(|slot| slot.set(Some(Backtrace::force_capture())));
            }
            previous(info);
        }));
    });
}

/// Keeps `GUARD_DEPTH` balanced even when the guarded call unwinds
struct GuardDepth;

impl GuardDepth {
    fn enter() -> Self {
        GUARD_DEPTH.with(|d| d.set(d.get() + 1));
        GuardDepth
    }
}

impl Drop for GuardDepth {
    fn drop(&mut self) {
        GUARD_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// A panic trapped while running the remainder of a chain
pub struct HandlerFault {
    /// Panic payload rendered as text
    pub message: String,
    /// Stack of the panicking thread, taken at the panic site
    pub backtrace: Backtrace,
}

impl HandlerFault {
    fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        // None when another hook replaced ours after install
        let backtrace = PANIC_TRACE
            .with(Cell::take)
            .unwrap_or_else(Backtrace::capture);
        Self { message, backtrace }
    }
}

impl fmt::Debug for HandlerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFault")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Per-request state owned by the chain executor
///
/// Created fresh for every request, handed to each handler in turn, and
/// turned into a [`Response`] once the chain has run.
pub struct Context {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    request: Request,
    /// Percent-decoded request path
    path: String,
    params: ParamVec,
    handlers: HandlersChain,
    /// Position of the handler currently running; -1 before the first
    index: isize,
    aborted: bool,
    response: Response,
    written: bool,
}

impl Context {
    /// Create a context for `request` with an empty chain
    ///
    /// The request id is taken from a valid `x-request-id` header when
    /// present, otherwise a new one is generated.
    #[must_use]
    pub fn new(request: Request) -> Self {
        let request_id = RequestId::from_request(&request);
        let path = request.decoded_path().into_owned();
        Self {
            request_id,
            request,
            path,
            params: ParamVec::new(),
            handlers: HandlersChain::new(),
            index: -1,
            aborted: false,
            response: Response::default(),
            written: false,
        }
    }

    pub(crate) fn set_handlers(&mut self, handlers: HandlersChain) {
        self.handlers = handlers;
    }

    pub(crate) fn set_params(&mut self, params: ParamVec) {
        self.params = params;
    }

    // ------------------------------------------------------------------
    // Chain control
    // ------------------------------------------------------------------

    /// Run the handlers after the current position
    ///
    /// Middlewares that need to act after downstream handlers call this and
    /// continue once it returns. Handlers that never call it still let the
    /// chain proceed after they return.
    pub fn next(&mut self) {
        self.index += 1;
        while !self.aborted {
            let Some(handler) = self.current_handler() else {
                break;
            };
            handler.handle(self);
            self.index += 1;
        }
    }

    fn current_handler(&self) -> Option<SharedHandler> {
        let index = usize::try_from(self.index).ok()?;
        self.handlers.get(index).map(Arc::clone)
    }

    /// Like [`next`](Self::next), but traps a panic raised anywhere downstream
    ///
    /// The cursor is left on the faulting handler. The caller decides how to
    /// answer, normally with [`fail_internal`](Self::fail_internal).
    pub fn next_guarded(&mut self) -> Result<(), HandlerFault> {
        install_trace_hook();
        let result = {
            let _depth = GuardDepth::enter();
            panic::catch_unwind(AssertUnwindSafe(|| self.next()))
        };
        result.map_err(HandlerFault::from_panic)
    }

    /// Stop the chain: no handler after the current position will run
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Current chain cursor (-1 before the chain starts)
    #[must_use]
    pub fn index(&self) -> isize {
        self.index
    }

    #[must_use]
    pub fn state(&self) -> ChainState {
        if self.aborted {
            return ChainState::Aborted;
        }
        match usize::try_from(self.index) {
            Err(_) => ChainState::NotStarted,
            Ok(i) if i < self.handlers.len() => ChainState::Running,
            Ok(_) => ChainState::Finished,
        }
    }

    // ------------------------------------------------------------------
    // Request accessors
    // ------------------------------------------------------------------

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.request.method
    }

    /// Percent-decoded request path without the query string
    ///
    /// This is what routes and group prefixes are matched against. The raw
    /// form stays available through [`Request::target`].
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Get a path parameter bound by the matched route
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn params(&self) -> &ParamVec {
        &self.params
    }

    /// URL-decoded query parameter
    #[must_use]
    pub fn query(&self, key: &str) -> Option<String> {
        self.request.query(key)
    }

    /// Field of a URL-encoded form body
    #[must_use]
    pub fn post_form(&self, key: &str) -> Option<String> {
        self.request.form_value(key)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.get_header(name)
    }

    // ------------------------------------------------------------------
    // Response
    // ------------------------------------------------------------------

    /// Status of the response written so far (200 until something is written)
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.response.status
    }

    /// True once a response body has been written
    #[must_use]
    pub fn is_written(&self) -> bool {
        self.written
    }

    #[must_use]
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Set a response header
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.response.set_header(name, value.into());
    }

    /// Set the status without writing a body
    ///
    /// Ignored once the response has been written.
    pub fn set_status(&mut self, status: StatusCode) {
        if self.written {
            self.warn_rewrite(status);
            return;
        }
        self.response.status = status;
    }

    /// Write the response: status, optional content type and body
    ///
    /// Only the first write takes effect; later writes are dropped and logged.
    pub fn write(&mut self, status: StatusCode, content_type: Option<&str>, body: Vec<u8>) {
        if self.written {
            self.warn_rewrite(status);
            return;
        }
        if let Some(content_type) = content_type {
            self.response.set_header("content-type", content_type.to_string());
        }
        self.response.status = status;
        self.response.body = body;
        self.written = true;
    }

    fn warn_rewrite(&self, status: StatusCode) {
        warn!(
            request_id = %self.request_id,
            path = %self.path(),
            written_status = self.response.status.as_u16(),
            attempted_status = status.as_u16(),
            "Response already written - ignoring second write"
        );
    }

    /// Write a `text/plain` response
    pub fn string(&mut self, status: StatusCode, body: impl Into<String>) {
        self.write(status, Some("text/plain"), body.into().into_bytes());
    }

    /// Write an `application/json` response
    ///
    /// A value that cannot be serialized turns into a 500 failure.
    pub fn json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(body) => self.write(status, Some("application/json"), body),
            Err(e) => self.fail(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
        }
    }

    /// Write raw bytes without touching the content type
    pub fn data(&mut self, status: StatusCode, body: Vec<u8>) {
        self.write(status, None, body);
    }

    /// Answer with a failure response and abort the chain
    ///
    /// The body only names the status and request target; `info` goes to the
    /// log.
    pub fn fail(&mut self, status: StatusCode, info: &str) {
        error!(
            request_id = %self.request_id,
            status = status.as_u16(),
            uri = %self.request.target,
            info = %info,
            "Request failed"
        );
        let body = format!("{} ERROR: {}", status.as_u16(), self.request.target);
        self.string(status, body);
        self.abort();
    }

    /// Answer a trapped fault with the single 500 response
    ///
    /// Anything the faulting chain had written is discarded first so the
    /// client sees exactly one well-formed failure.
    pub fn fail_internal(&mut self) {
        self.response = Response::default();
        self.written = false;
        self.fail(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
    }

    /// Finish the request and hand back the response
    #[must_use]
    pub fn into_response(mut self) -> Response {
        self.request_id.stamp(&mut self.response);
        self.response
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.request_id)
            .field("method", &self.request.method)
            .field("target", &self.request.target)
            .field("params", &self.params)
            .field("handlers", &self.handlers.len())
            .field("index", &self.index)
            .field("aborted", &self.aborted)
            .field("status", &self.response.status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::handler;
    use std::sync::Mutex;

    type Trace = Arc<Mutex<Vec<String>>>;

    fn recorder(trace: &Trace, name: &'static str) -> SharedHandler {
        let trace = Arc::clone(trace);
        handler(move |_c: &mut Context| trace.lock().unwrap().push(name.to_string()))
    }

    fn ctx_with(handlers: HandlersChain) -> Context {
        let mut ctx = Context::new(Request::new(Method::GET, "/t?q=1"));
        ctx.set_handlers(handlers);
        ctx
    }

    #[test]
    fn test_runs_all_handlers_in_order() {
        let trace: Trace = Arc::default();
        let mut ctx = ctx_with(vec![
            recorder(&trace, "a"),
            recorder(&trace, "b"),
            recorder(&trace, "c"),
        ]);
        assert_eq!(ctx.state(), ChainState::NotStarted);
        assert_eq!(ctx.index(), -1);
        ctx.next();
        assert_eq!(*trace.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(ctx.state(), ChainState::Finished);
    }

    #[test]
    fn test_wrapping_handler_runs_trailing_logic_last() {
        let trace: Trace = Arc::default();
        let t = Arc::clone(&trace);
        let wrap = handler(move |c: &mut Context| {
            t.lock().unwrap().push("before".into());
            c.next();
            t.lock().unwrap().push("after".into());
        });
        let mut ctx = ctx_with(vec![wrap, recorder(&trace, "inner")]);
        ctx.next();
        assert_eq!(*trace.lock().unwrap(), vec!["before", "inner", "after"]);
    }

    #[test]
    fn test_abort_stops_later_handlers() {
        let trace: Trace = Arc::default();
        let t = Arc::clone(&trace);
        let stop = handler(move |c: &mut Context| {
            t.lock().unwrap().push("stop".into());
            c.abort();
        });
        let mut ctx = ctx_with(vec![recorder(&trace, "a"), stop, recorder(&trace, "b")]);
        ctx.next();
        assert_eq!(*trace.lock().unwrap(), vec!["a", "stop"]);
        assert_eq!(ctx.state(), ChainState::Aborted);
        // no way back once aborted
        ctx.next();
        assert_eq!(trace.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_abort_after_next_keeps_downstream_work() {
        let trace: Trace = Arc::default();
        let t = Arc::clone(&trace);
        let late_abort = handler(move |c: &mut Context| {
            c.next();
            c.abort();
            t.lock().unwrap().push("late".into());
        });
        let mut ctx = ctx_with(vec![late_abort, recorder(&trace, "down")]);
        ctx.next();
        assert_eq!(*trace.lock().unwrap(), vec!["down", "late"]);
    }

    #[test]
    fn test_next_guarded_traps_panic() {
        let boom = handler(|_c: &mut Context| panic!("boom"));
        let mut ctx = ctx_with(vec![boom]);
        let fault = ctx.next_guarded().unwrap_err();
        assert_eq!(fault.message, "boom");
        assert_eq!(ctx.index(), 0);
    }

    #[inline(never)]
    fn exploding_endpoint(_c: &mut Context) {
        panic!("kaboom");
    }

    #[test]
    fn test_fault_backtrace_points_at_panic_site() {
        let mut ctx = ctx_with(vec![handler(exploding_endpoint)]);
        let fault = ctx.next_guarded().unwrap_err();
        assert_eq!(fault.message, "kaboom");
        assert_eq!(
            fault.backtrace.status(),
            std::backtrace::BacktraceStatus::Captured
        );
        let trace = fault.backtrace.to_string();
        assert!(trace.contains("exploding_endpoint"), "{trace}");
    }

    #[test]
    fn test_guard_depth_restored_after_fault() {
        let mut ctx = ctx_with(vec![handler(exploding_endpoint)]);
        assert!(ctx.next_guarded().is_err());
        assert_eq!(GUARD_DEPTH.with(Cell::get), 0);
        assert!(PANIC_TRACE.with(Cell::take).is_none());
    }

    #[test]
    fn test_first_write_wins() {
        let mut ctx = ctx_with(Vec::new());
        ctx.string(StatusCode::CREATED, "one");
        ctx.string(StatusCode::BAD_REQUEST, "two");
        ctx.set_status(StatusCode::IM_A_TEAPOT);
        assert!(ctx.is_written());
        let res = ctx.into_response();
        assert_eq!(res.status, StatusCode::CREATED);
        assert_eq!(res.text(), "one");
        assert_eq!(res.get_header("content-type"), Some("text/plain"));
        assert!(res.get_header("x-request-id").is_some());
    }

    #[test]
    fn test_fail_internal_replaces_partial_response() {
        let mut ctx = ctx_with(Vec::new());
        ctx.set_header("x-partial", "1");
        ctx.string(StatusCode::OK, "half");
        ctx.fail_internal();
        assert!(ctx.is_aborted());
        let res = ctx.into_response();
        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.text(), "500 ERROR: /t?q=1");
        assert_eq!(res.get_header("x-partial"), None);
    }

    #[test]
    fn test_json_response() {
        let mut ctx = ctx_with(Vec::new());
        ctx.json(StatusCode::OK, &serde_json::json!({ "name": "geek" }));
        let res = ctx.into_response();
        assert_eq!(res.get_header("content-type"), Some("application/json"));
        assert_eq!(res.text(), r#"{"name":"geek"}"#);
    }

    #[test]
    fn test_path_is_percent_decoded_target_is_not() {
        let ctx = Context::new(Request::new(Method::GET, "/files/a%20b.css?v=1"));
        assert_eq!(ctx.path(), "/files/a b.css");
        assert_eq!(ctx.request().target, "/files/a%20b.css?v=1");
    }

    #[test]
    fn test_request_accessors() {
        let ctx = ctx_with(Vec::new());
        assert_eq!(*ctx.method(), Method::GET);
        assert_eq!(ctx.path(), "/t");
        assert_eq!(ctx.query("q").as_deref(), Some("1"));
        assert_eq!(ctx.param("missing"), None);
    }

    #[test]
    fn test_request_id_taken_from_header() {
        let id = RequestId::new();
        let ctx = Context::new(
            Request::new(Method::GET, "/").with_header("X-Request-Id", id.to_string()),
        );
        assert_eq!(ctx.request_id, id);
    }
}
