//! Handshake decoding over an unframed byte stream
//!
//! A client opens every connection with `command\0location\0` and, for `PUT`,
//! follows immediately with raw file content. Nothing is length-prefixed, so
//! the fields may arrive split across any number of reads, and the read that
//! completes the location may already carry the start of the file. Those
//! trailing bytes are returned as `payload_prefix` and must be written before
//! anything else is read from the stream.

use std::io::{self, Read, Write};
use std::ops::Range;

use crate::error::ProtocolError;
use crate::protocol::{Command, DELIMITER, HANDSHAKE_CAPACITY, MAX_COMMAND_LEN, MAX_LOCATION_LEN};

/// Longest location accepted on the wire (its delimiter takes the last byte).
pub const MAX_LOCATION_FIELD: usize = MAX_LOCATION_LEN - 1;

/// Decoded connection preamble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    pub command: Command,
    pub location: String,
    /// Content bytes that arrived in the same reads as the handshake.
    pub payload_prefix: Vec<u8>,
}

#[derive(Debug)]
pub enum FieldError {
    /// No delimiter within the allowed length; carries the bytes seen so far.
    Overflow(Vec<u8>),
    /// Stream ended before the delimiter.
    Closed,
    Io(io::Error),
}

/// Bounded accumulator that splits delimiter-terminated fields off a reader.
///
/// Bytes are only ever scanned once: `scanned` tracks how far the delimiter
/// search has progressed, `start` marks the beginning of the unresolved field.
pub struct FieldReader<R> {
    inner: R,
    buf: Vec<u8>,
    filled: usize,
    start: usize,
    scanned: usize,
}

impl<R: Read> FieldReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_capacity(inner, HANDSHAKE_CAPACITY)
    }

    pub fn with_capacity(inner: R, capacity: usize) -> Self {
        Self {
            inner,
            buf: vec![0u8; capacity],
            filled: 0,
            start: 0,
            scanned: 0,
        }
    }

    pub fn is_full(&self) -> bool {
        self.filled == self.buf.len()
    }

    /// Bytes buffered but not yet claimed by a field.
    pub fn buffered(&self) -> &[u8] {
        &self.buf[self.start..self.filled]
    }

    /// Read more bytes into the free tail of the buffer.
    /// Returns 0 at end of stream, or when the buffer is already full.
    pub fn fill(&mut self) -> io::Result<usize> {
        if self.is_full() {
            return Ok(0);
        }
        loop {
            match self.inner.read(&mut self.buf[self.filled..]) {
                Ok(n) => {
                    self.filled += n;
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn scan(&mut self) -> Option<Range<usize>> {
        let hit = self.buf[self.scanned..self.filled]
            .iter()
            .position(|&b| b == DELIMITER);
        match hit {
            Some(off) => {
                let end = self.scanned + off;
                let field = self.start..end;
                self.start = end + 1;
                self.scanned = end + 1;
                Some(field)
            }
            None => {
                self.scanned = self.filled;
                None
            }
        }
    }

    /// Return the next field (without its delimiter), reading as needed.
    pub fn read_field(&mut self, max_len: usize) -> Result<Vec<u8>, FieldError> {
        loop {
            if let Some(field) = self.scan() {
                let bytes = self.buf[field].to_vec();
                if bytes.len() > max_len {
                    return Err(FieldError::Overflow(bytes));
                }
                return Ok(bytes);
            }
            if self.buffered().len() > max_len || self.is_full() {
                return Err(FieldError::Overflow(self.buffered().to_vec()));
            }
            match self.fill() {
                Ok(0) => return Err(FieldError::Closed),
                Ok(_) => {}
                Err(e) => return Err(FieldError::Io(e)),
            }
        }
    }

    /// Hand over everything buffered past the last resolved field.
    pub fn take_buffered(&mut self) -> Vec<u8> {
        let rest = self.buffered().to_vec();
        self.start = self.filled;
        self.scanned = self.filled;
        rest
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

/// Decode `command\0location\0` from `stream`.
///
/// The reader never asks the stream for more than it needs to find the
/// second delimiter, but whatever arrived with it is returned as the payload
/// prefix rather than dropped.
pub fn read_handshake<R: Read>(stream: R) -> Result<Handshake, ProtocolError> {
    let mut reader = FieldReader::new(stream);

    let token = reader.read_field(MAX_COMMAND_LEN).map_err(|e| match e {
        FieldError::Overflow(seen) => {
            ProtocolError::InvalidCommand(String::from_utf8_lossy(&seen).into_owned())
        }
        FieldError::Closed => ProtocolError::PrematureClose,
        FieldError::Io(e) => ProtocolError::Io(e),
    })?;
    let command = Command::from_bytes(&token);
    if !command.is_valid() {
        return Err(ProtocolError::InvalidCommand(
            String::from_utf8_lossy(&token).into_owned(),
        ));
    }

    let raw = reader.read_field(MAX_LOCATION_FIELD).map_err(|e| match e {
        FieldError::Overflow(_) => ProtocolError::LocationTooLong {
            max: MAX_LOCATION_FIELD,
        },
        FieldError::Closed => ProtocolError::PrematureClose,
        FieldError::Io(e) => ProtocolError::Io(e),
    })?;
    let location = String::from_utf8(raw).map_err(|e| {
        ProtocolError::MalformedLocation(String::from_utf8_lossy(e.as_bytes()).into_owned())
    })?;

    Ok(Handshake {
        command,
        location,
        payload_prefix: reader.take_buffered(),
    })
}

/// Build the handshake bytes a client sends.
pub fn encode_handshake(command: Command, location: &str) -> Result<Vec<u8>, ProtocolError> {
    if !command.is_valid() {
        return Err(ProtocolError::InvalidCommand(command.to_string()));
    }
    if location.as_bytes().contains(&DELIMITER) {
        return Err(ProtocolError::MalformedLocation(location.replace('\0', "\\0")));
    }
    if location.len() > MAX_LOCATION_FIELD {
        return Err(ProtocolError::LocationTooLong {
            max: MAX_LOCATION_FIELD,
        });
    }
    let token = command.as_bytes();
    let mut out = Vec::with_capacity(token.len() + location.len() + 2);
    out.extend_from_slice(token);
    out.push(DELIMITER);
    out.extend_from_slice(location.as_bytes());
    out.push(DELIMITER);
    Ok(out)
}

pub fn write_handshake<W: Write>(
    stream: &mut W,
    command: Command,
    location: &str,
) -> Result<(), ProtocolError> {
    let bytes = encode_handshake(command, location)?;
    stream.write_all(&bytes)?;
    Ok(())
}
