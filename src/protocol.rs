//! Shared protocol constants for the ft handshake and raw transfer

use std::fmt;

// Default TCP port for both server and client
pub const DEFAULT_PORT: u16 = 6789;

// Terminates the command field and the location field
pub const DELIMITER: u8 = 0;

// Upper bound on bytes buffered while decoding a handshake
pub const HANDSHAKE_CAPACITY: usize = 8192;

// File content is streamed in chunks of this size in both directions
pub const CHUNK_SIZE: usize = 8192;

// Location plus its delimiter must fit in this many bytes
pub const MAX_LOCATION_LEN: usize = 4096;

// Longest valid command token ("GET" / "PUT")
pub const MAX_COMMAND_LEN: usize = 3;

/// Command token sent as the first handshake field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Get,
    Put,
    Invalid,
}

impl Command {
    /// Exact, case-sensitive match on the token bytes.
    pub fn from_bytes(token: &[u8]) -> Self {
        match token {
            b"GET" => Command::Get,
            b"PUT" => Command::Put,
            _ => Command::Invalid,
        }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            Command::Get => b"GET",
            Command::Put => b"PUT",
            Command::Invalid => b"",
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, Command::Invalid)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Get => f.write_str("GET"),
            Command::Put => f.write_str("PUT"),
            Command::Invalid => f.write_str("<invalid>"),
        }
    }
}

/// Which way file bytes flow for the acting side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    SendFromFile,
    ReceiveToFile,
}

impl TransferDirection {
    pub fn for_server(command: Command) -> Option<Self> {
        match command {
            Command::Get => Some(TransferDirection::SendFromFile),
            Command::Put => Some(TransferDirection::ReceiveToFile),
            Command::Invalid => None,
        }
    }

    pub fn for_client(command: Command) -> Option<Self> {
        match command {
            Command::Get => Some(TransferDirection::ReceiveToFile),
            Command::Put => Some(TransferDirection::SendFromFile),
            Command::Invalid => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_exact_match() {
        assert_eq!(Command::from_bytes(b"GET"), Command::Get);
        assert_eq!(Command::from_bytes(b"PUT"), Command::Put);
        assert_eq!(Command::from_bytes(b"get"), Command::Invalid);
        assert_eq!(Command::from_bytes(b"GETS"), Command::Invalid);
        assert_eq!(Command::from_bytes(b""), Command::Invalid);
    }

    #[test]
    fn test_directions_mirror_each_other() {
        assert_eq!(
            TransferDirection::for_server(Command::Get),
            Some(TransferDirection::SendFromFile)
        );
        assert_eq!(
            TransferDirection::for_client(Command::Get),
            Some(TransferDirection::ReceiveToFile)
        );
        assert_eq!(
            TransferDirection::for_server(Command::Put),
            Some(TransferDirection::ReceiveToFile)
        );
        assert_eq!(TransferDirection::for_client(Command::Invalid), None);
    }

    #[test]
    fn test_handshake_fits_capacity() {
        assert!(MAX_COMMAND_LEN + 1 + MAX_LOCATION_LEN < HANDSHAKE_CAPACITY);
    }
}
