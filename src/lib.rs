//! ft - minimal remote file transfer
//!
//! A client sends `GET` or `PUT` plus an `address:path` location, each
//! terminated by a NUL byte, then file content flows as raw bytes until the
//! sending side closes. The server serves paths under a configured root.

pub mod authorize;
pub mod cli;
pub mod config;
pub mod error;
pub mod handshake;
pub mod location;
pub mod logger;
pub mod net;
pub mod protocol;
pub mod transfer;
