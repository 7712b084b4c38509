mod cli;
mod config;
mod issues;
mod model;
mod tracker;
mod util;

use anyhow::{bail, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jiradash=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("fetch") => cli::handle_fetch(&args[1..]).await,
        Some("create") => cli::handle_create(&args[1..]).await,
        Some("modify") => cli::handle_modify(&args[1..]).await,
        Some("log") => cli::handle_log(&args[1..]).await,
        Some("help") | Some("--help") | Some("-h") | None => {
            cli::print_help();
            Ok(())
        }
        Some(other) => bail!("Unknown command {other:?}. Run `jiradash help` for usage."),
    }
}
