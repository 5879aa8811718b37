//! ft - serve a directory over TCP, or GET/PUT a single file against a server

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::debug;
use std::sync::Arc;

use ft::cli::Args;
use ft::logger::{JsonlLogger, NoopLogger, TransferLogger};
use ft::net::{client, server};

fn main() -> Result<()> {
    // Set up Ctrl-C handler
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupted by user. Exiting (Ctrl-C)...");
        // Exit immediately with 130 (128 + SIGINT)
        std::process::exit(130);
    })
    .context("Error setting Ctrl-C handler")?;

    let args = Args::parse();
    let settings = args.settings()?;

    env_logger::Builder::new()
        .filter_level(settings.log_level())
        .parse_default_env()
        .init();
    debug!("{:?}", settings);

    if args.server {
        if !args.request.is_empty() {
            bail!("Error, server mode takes no positional arguments");
        }
        let config = settings.server_config()?;
        let logger: Arc<dyn TransferLogger> = match settings.log_file {
            Some(ref p) => Arc::new(JsonlLogger::new(p)?),
            None => Arc::new(NoopLogger),
        };
        return server::serve(&config, logger.as_ref());
    }

    let config = settings.client_config()?;
    let request = args.client_request()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    client::execute(&config, &request, &mut out)?;
    Ok(())
}
