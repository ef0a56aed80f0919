use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use http::Method;
use std::io::{self, Write};
use std::path::PathBuf;

use super::demo::demo_engine;
use crate::config::EngineConfig;
use crate::context::{Request, Response};
use crate::dispatcher::Engine;

/// Command-line interface for chainroute
#[derive(Parser)]
#[command(name = "chainroute")]
#[command(about = "Inspect and exercise a chainroute engine", long_about = None)]
pub struct Cli {
    /// Engine configuration file (TOML); defaults apply when absent
    #[arg(short, long, global = true, default_value = "chainroute.toml")]
    pub config: PathBuf,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List every registered route, sorted by pattern then method
    Routes,
    /// Dispatch one synthetic request and print the response
    Request {
        /// HTTP method, e.g. GET
        method: String,

        /// Request target: path plus optional query string
        target: String,

        /// Request header as `name:value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body
        #[arg(short, long)]
        body: Option<String>,
    },
}

/// Execute a parsed command line
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let mut config = EngineConfig::load(&cli.config)?;
    config.apply_env();
    let engine = demo_engine(&config).context("Failed to build route table")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Routes => print_routes(&engine, &mut out)?,
        Commands::Request {
            method,
            target,
            headers,
            body,
        } => {
            let request = build_request(&method, target, &headers, body)?;
            let response = engine.handle(request);
            print_response(&response, &mut out)?;
        }
    }
    Ok(())
}

fn build_request(
    method: &str,
    target: String,
    headers: &[String],
    body: Option<String>,
) -> anyhow::Result<Request> {
    let method = Method::from_bytes(method.to_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method: {method}"))?;

    let mut request = Request::new(method, target);
    for header in headers {
        let Some((name, value)) = header.split_once(':') else {
            bail!("Invalid header (expected name:value): {header}");
        };
        request = request.with_header(name.trim(), value.trim());
    }
    if let Some(body) = body {
        request = request.with_body(body);
    }
    Ok(request)
}

fn print_routes(engine: &Engine, out: &mut impl Write) -> io::Result<()> {
    for route in engine.routes() {
        writeln!(out, "{:<8} {}", route.method().as_str(), route.pattern())?;
    }
    Ok(())
}

fn print_response(response: &Response, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", response.status)?;
    for (name, value) in &response.headers {
        writeln!(out, "{name}: {value}")?;
    }
    writeln!(out)?;
    out.write_all(&response.body)?;
    out.flush()
}
