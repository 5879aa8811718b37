//! Blocking TCP transport: the server session driver and the client request driver.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::io::Write;
use std::net::{Shutdown, TcpListener, TcpStream};
use std::path::{Path, PathBuf};

use crate::config::{ClientConfig, ServerConfig};
use crate::error::ProtocolError;
use crate::handshake::{read_handshake, write_handshake};
use crate::location::Location;
use crate::logger::TransferLogger;
use crate::protocol::{Command, TransferDirection};
use crate::transfer::{copy_until_close, receive_file, send_file};

fn peer_name(stream: &TcpStream) -> String {
    stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string())
}

pub mod server {
    use super::*;

    /// Where a connection is in its lifetime; used to label failures.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Phase {
        AwaitHandshake,
        Authorize,
        Sending,
        Receiving,
    }

    /// Outcome of one successful connection.
    #[derive(Debug, Clone)]
    pub struct SessionReport {
        pub peer: String,
        pub command: Command,
        pub path: PathBuf,
        pub bytes: u64,
    }

    pub fn serve(config: &ServerConfig, logger: &dyn TransferLogger) -> Result<()> {
        let bind = format!("0.0.0.0:{}", config.port);
        let listener = TcpListener::bind(&bind).with_context(|| format!("bind {}", bind))?;
        serve_listener(listener, config, logger)
    }

    /// Accept forever, one connection at a time. A failed connection is
    /// logged and closed; it never ends the loop.
    pub fn serve_listener(
        listener: TcpListener,
        config: &ServerConfig,
        logger: &dyn TransferLogger,
    ) -> Result<()> {
        let local = listener
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "?".to_string());
        info!(
            "ft server listening on {} root={}",
            local,
            config.root.display()
        );
        for conn in listener.incoming() {
            match conn {
                Ok(mut stream) => {
                    let peer = peer_name(&stream);
                    debug!("conn from {}", peer);
                    match handle_conn(&mut stream, config) {
                        Ok(report) => {
                            info!(
                                "{} {} {} ({} bytes)",
                                report.peer,
                                report.command,
                                report.path.display(),
                                report.bytes
                            );
                            logger.completed(
                                &report.peer,
                                &report.command.to_string(),
                                &report.path,
                                report.bytes,
                            );
                        }
                        Err(e) => {
                            warn!("{}: {:#}", peer, e);
                            logger.failed(&peer, &format!("{:#}", e));
                        }
                    }
                    let _ = stream.shutdown(Shutdown::Both);
                }
                Err(e) => {
                    warn!("accept error: {}", e);
                }
            }
        }
        Ok(())
    }

    /// Run a single connection: handshake, authorize, then stream the file.
    /// Nothing is ever written back on failure; the caller just closes.
    pub fn handle_conn(stream: &mut TcpStream, config: &ServerConfig) -> Result<SessionReport> {
        let peer = peer_name(stream);
        let mut phase = Phase::AwaitHandshake;
        debug!("{} {:?}", peer, phase);

        let handshake = read_handshake(&mut *stream).with_context(|| format!("{:?}", phase))?;
        let command = handshake.command;

        phase = Phase::Authorize;
        debug!("{} {:?} {} {}", peer, phase, command, handshake.location);
        let location = Location::parse(&handshake.location).with_context(|| format!("{:?}", phase))?;
        let path = config
            .policy
            .resolve(&location.path, &config.root)
            .with_context(|| format!("{:?}", phase))?;

        let direction = TransferDirection::for_server(command)
            .ok_or_else(|| ProtocolError::InvalidCommand(command.to_string()))?;
        let bytes = match direction {
            TransferDirection::SendFromFile => {
                phase = Phase::Sending;
                debug!("{} {:?} {}", peer, phase, path.display());
                let sent = send_file(stream, &path).with_context(|| format!("{:?}", phase))?;
                let _ = stream.shutdown(Shutdown::Write);
                sent
            }
            TransferDirection::ReceiveToFile => {
                phase = Phase::Receiving;
                debug!(
                    "{} {:?} {} (prefix {} bytes)",
                    peer,
                    phase,
                    path.display(),
                    handshake.payload_prefix.len()
                );
                receive_file(stream, &handshake.payload_prefix, &path)
                    .with_context(|| format!("{:?}", phase))?
            }
        };

        Ok(SessionReport {
            peer,
            command,
            path,
            bytes,
        })
    }
}

pub mod client {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Request {
        Get { location: Location },
        Put { source: PathBuf, location: Location },
    }

    impl Request {
        pub fn command(&self) -> Command {
            match self {
                Request::Get { .. } => Command::Get,
                Request::Put { .. } => Command::Put,
            }
        }

        pub fn location(&self) -> &Location {
            match self {
                Request::Get { location } | Request::Put { location, .. } => location,
            }
        }
    }

    pub fn connect(config: &ClientConfig, location: &Location) -> Result<TcpStream> {
        let addr = location.socket_addr(config.port);
        debug!("connecting {}", addr);
        let stream = TcpStream::connect(&addr).with_context(|| format!("connect {}", addr))?;
        let _ = stream.set_nodelay(true);
        Ok(stream)
    }

    /// Fetch `location` and copy every received byte to `out`.
    ///
    /// The stream carries file content only, but a failed request is just an
    /// early close, so an empty result can mean "empty file" or "refused".
    pub fn get<W: Write + ?Sized>(
        config: &ClientConfig,
        location: &Location,
        out: &mut W,
    ) -> Result<u64> {
        let mut stream = connect(config, location)?;
        write_handshake(&mut stream, Command::Get, &location.to_string())
            .context("send handshake")?;
        stream
            .shutdown(Shutdown::Write)
            .context("half-close after handshake")?;
        let received =
            copy_until_close(&mut stream, out).with_context(|| format!("receive {}", location))?;
        out.flush()?;
        debug!("GET {} done ({} bytes)", location, received);
        Ok(received)
    }

    /// Upload `source` to `location`, then wait for the server to close.
    pub fn put(config: &ClientConfig, source: &Path, location: &Location) -> Result<u64> {
        let meta = std::fs::metadata(source)
            .with_context(|| format!("cannot open source {}", source.display()))?;
        if !meta.is_file() {
            anyhow::bail!("source is not a regular file: {}", source.display());
        }

        let mut stream = connect(config, location)?;
        write_handshake(&mut stream, Command::Put, &location.to_string())
            .context("send handshake")?;
        let sent = send_file(&mut stream, source).with_context(|| format!("send {}", location))?;
        stream
            .shutdown(Shutdown::Write)
            .context("half-close after upload")?;
        copy_until_close(&mut stream, &mut std::io::sink())
            .context("waiting for server to close")?;
        debug!("PUT {} -> {} done ({} bytes)", source.display(), location, sent);
        Ok(sent)
    }

    pub fn execute<W: Write + ?Sized>(
        config: &ClientConfig,
        request: &Request,
        out: &mut W,
    ) -> Result<u64> {
        match request {
            Request::Get { location } => get(config, location, out),
            Request::Put { source, location } => put(config, source, location),
        }
    }
}
