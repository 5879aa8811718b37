//! `address:path` parsing for transfer targets

use std::fmt;

use crate::error::ProtocolError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub address: String,
    pub path: String,
}

impl Location {
    /// Split on the first `:`. Everything after it, colons included, is the path.
    pub fn parse(s: &str) -> Result<Self, ProtocolError> {
        let (address, path) = s
            .split_once(':')
            .ok_or_else(|| ProtocolError::MalformedLocation(s.to_string()))?;
        if address.is_empty() || path.is_empty() {
            return Err(ProtocolError::MalformedLocation(s.to_string()));
        }
        Ok(Location {
            address: address.to_string(),
            path: path.to_string(),
        })
    }

    /// `address:port` suitable for `TcpStream::connect`.
    pub fn socket_addr(&self, port: u16) -> String {
        format!("{}:{}", self.address, port)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_on_first_colon() {
        let loc = Location::parse("127.0.0.1:/srv/root/a:b.txt").unwrap();
        assert_eq!(loc.address, "127.0.0.1");
        assert_eq!(loc.path, "/srv/root/a:b.txt");
        assert_eq!(loc.to_string(), "127.0.0.1:/srv/root/a:b.txt");
        assert_eq!(loc.socket_addr(6789), "127.0.0.1:6789");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            Location::parse("no-colon-here"),
            Err(ProtocolError::MalformedLocation(_))
        ));
        assert!(Location::parse(":/path").is_err());
        assert!(Location::parse("host:").is_err());
        assert!(Location::parse("").is_err());
    }
}
