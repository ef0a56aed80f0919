use http::StatusCode;
use serde_json::json;

use crate::config::EngineConfig;
use crate::context::Context;
use crate::dispatcher::Engine;
use crate::router::RouteError;

#[allow(clippy::panic)]
fn panic_route(c: &mut Context) {
    let names = ["geek"];
    let idx = names.len() + c.path().len();
    match names.get(idx) {
        Some(name) => c.string(StatusCode::OK, *name),
        None => panic!("index out of range: {idx}"),
    }
}

/// Build the demo application on top of an engine configured from `config`
///
/// | Route | Behaviour |
/// |-------|-----------|
/// | `GET /` | plain greeting |
/// | `GET /panic` | panics inside the handler (answered 500) |
/// | `GET /v1/hello?name=` | greeting from the query string |
/// | `GET /v1/hello/:name` | greeting from the path |
/// | `POST /v1/login` | echoes the form fields as JSON |
/// | `GET /v1/assets/*filepath` | echoes the captured file path as JSON |
pub fn demo_engine(config: &EngineConfig) -> Result<Engine, RouteError> {
    let mut engine = Engine::from_config(config)?;

    engine
        .get("/", |c: &mut Context| {
            c.string(StatusCode::OK, "Hello chainroute\n");
        })?
        .get("/panic", panic_route)?;

    let mut v1 = engine.group("/v1");
    v1.get("/hello", |c: &mut Context| {
        let name = c.query("name").unwrap_or_default();
        let body = format!("hello {name}, you're at {}\n", c.path());
        c.string(StatusCode::OK, body);
    })?
    .get("/hello/:name", |c: &mut Context| {
        let body = format!(
            "hello {}, you're at {}\n",
            c.param("name").unwrap_or_default(),
            c.path()
        );
        c.string(StatusCode::OK, body);
    })?
    .post("/login", |c: &mut Context| {
        let body = json!({
            "username": c.post_form("username"),
            "password": c.post_form("password"),
        });
        c.json(StatusCode::OK, &body);
    })?
    .get("/assets/*filepath", |c: &mut Context| {
        let body = json!({ "filepath": c.param("filepath") });
        c.json(StatusCode::OK, &body);
    })?;

    Ok(engine)
}
