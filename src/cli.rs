//! Command-line surface: server flags and the `GET`/`PUT` client request

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::config::Settings;
use crate::location::Location;
use crate::net::client::Request;
use crate::protocol::Command;

/// Command-line arguments
#[derive(Parser, Debug, Default)]
#[command(
    author,
    version,
    about = "ft - minimal remote file transfer",
    override_usage = "ft [OPTIONS] GET HOST:PATH\n       ft [OPTIONS] PUT SOURCE HOST:PATH\n       ft -s -r ROOT [OPTIONS]"
)]
pub struct Args {
    /// Run as server
    #[arg(short = 's', long)]
    pub server: bool,

    /// TCP port (default 6789)
    #[arg(short = 'p', long, value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Root directory served (server only)
    #[arg(short = 'r', long)]
    pub root: Option<PathBuf>,

    /// Report connections and transfers
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Debug output (implies verbose)
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Resolve requested paths and keep them inside the root (server only)
    #[arg(long)]
    pub strict_paths: bool,

    /// Read settings from a TOML file; flags override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Append one JSON line per served session to this file (server only)
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// GET HOST:PATH | PUT SOURCE HOST:PATH
    #[arg(value_name = "REQUEST")]
    pub request: Vec<String>,
}

impl Args {
    /// File settings (if any) with command-line flags layered on top.
    pub fn settings(&self) -> Result<Settings> {
        let mut s = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(port) = self.port {
            s.port = port;
        }
        if let Some(root) = &self.root {
            s.root = Some(root.clone());
        }
        if let Some(log_file) = &self.log_file {
            s.log_file = Some(log_file.clone());
        }
        s.verbose |= self.verbose;
        s.debug |= self.debug;
        s.strict_paths |= self.strict_paths;
        Ok(s)
    }

    pub fn client_request(&self) -> Result<Request> {
        parse_request(&self.request)
    }
}

/// Validate the positional arguments of client mode.
pub fn parse_request(words: &[String]) -> Result<Request> {
    let Some(first) = words.first() else {
        bail!("Error, parameter missing: expected GET HOST:PATH or PUT SOURCE HOST:PATH");
    };
    match (Command::from_bytes(first.as_bytes()), words.len()) {
        (Command::Get, 2) => Ok(Request::Get {
            location: Location::parse(&words[1])?,
        }),
        (Command::Put, 3) => Ok(Request::Put {
            source: PathBuf::from(&words[1]),
            location: Location::parse(&words[2])?,
        }),
        (Command::Get, _) => bail!("Error, usage: GET HOST:PATH"),
        (Command::Put, _) => bail!("Error, usage: PUT SOURCE HOST:PATH"),
        (Command::Invalid, _) => bail!("Error, unknown command {:?} (expected GET or PUT)", first),
    }
}
