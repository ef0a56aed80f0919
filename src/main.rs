use chainroute::cli::{run_cli, Cli};
use chainroute::logging::{init_logging, LogConfig};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(&LogConfig::from_env())?;
    run_cli(cli)
}
