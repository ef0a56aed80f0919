#![allow(dead_code)]

use chainroute::{Context, Engine, Handler, Request, Response};
use http::Method;
use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Ordered record of which handlers ran
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Middleware that records `name` and lets the chain continue
    pub fn recorder(&self, name: &'static str) -> impl Handler {
        let trace = self.clone();
        move |_c: &mut Context| trace.push(name)
    }

    /// Middleware that records `name >` before and `< name` after the rest of the chain
    pub fn wrapper(&self, name: &'static str) -> impl Handler {
        let trace = self.clone();
        move |c: &mut Context| {
            trace.push(format!("{name} >"));
            c.next();
            trace.push(format!("< {name}"));
        }
    }
}

pub fn get(engine: &Engine, target: &str) -> Response {
    engine.handle(Request::new(Method::GET, target))
}

/// In-memory log sink for asserting on emitted events
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Thread-local JSON subscriber writing into [`CapturedLogs`]
pub struct TestTracing {
    pub logs: CapturedLogs,
    _guard: tracing::subscriber::DefaultGuard,
}

impl TestTracing {
    pub fn init() -> Self {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(logs.clone())
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        Self {
            logs,
            _guard: guard,
        }
    }

    pub fn output(&self) -> String {
        self.logs.contents()
    }
}
