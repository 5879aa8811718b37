//! Runtime settings: optional TOML file, overridden by command-line flags.

use anyhow::{bail, Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::authorize::PathPolicy;
use crate::protocol::DEFAULT_PORT;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub port: u16,
    pub root: Option<PathBuf>,
    pub verbose: bool,
    pub debug: bool,
    pub strict_paths: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            root: None,
            verbose: false,
            debug: false,
            strict_paths: false,
            log_file: None,
        }
    }
}

/// Everything the server needs, fixed at startup.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub root: PathBuf,
    pub port: u16,
    pub policy: PathPolicy,
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub port: u16,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let s: Settings =
            toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
        Ok(s)
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else if self.verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        }
    }

    fn checked_port(&self) -> Result<u16> {
        if self.port == 0 {
            bail!("Illegal port number: 0");
        }
        Ok(self.port)
    }

    pub fn server_config(&self) -> Result<ServerConfig> {
        let Some(root) = self.root.clone() else {
            bail!("server mode requires a root directory (-r/--root)");
        };
        if !root.is_dir() {
            bail!("Root path is not a directory: {}", root.display());
        }
        Ok(ServerConfig {
            root,
            port: self.checked_port()?,
            policy: if self.strict_paths {
                PathPolicy::Confined
            } else {
                PathPolicy::Prefix
            },
        })
    }

    pub fn client_config(&self) -> Result<ClientConfig> {
        Ok(ClientConfig {
            port: self.checked_port()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ft.toml");
        std::fs::write(&path, "root = \"/srv/root\"\nverbose = true\n").unwrap();
        let s = Settings::load(&path).unwrap();
        assert_eq!(s.port, DEFAULT_PORT);
        assert_eq!(s.root, Some(PathBuf::from("/srv/root")));
        assert!(s.verbose);
        assert!(!s.strict_paths);
        assert_eq!(s.log_level(), LevelFilter::Info);
    }

    #[test]
    fn test_server_config_requires_root_dir() {
        let mut s = Settings::default();
        assert!(s.server_config().is_err());

        let temp_dir = TempDir::new().unwrap();
        s.root = Some(temp_dir.path().to_path_buf());
        s.strict_paths = true;
        let cfg = s.server_config().unwrap();
        assert_eq!(cfg.policy, PathPolicy::Confined);
        assert_eq!(cfg.port, DEFAULT_PORT);

        s.root = Some(temp_dir.path().join("missing"));
        assert!(s.server_config().is_err());
    }

    #[test]
    fn test_port_zero_rejected() {
        let s = Settings {
            port: 0,
            ..Settings::default()
        };
        assert!(s.client_config().is_err());
    }

    #[test]
    fn test_debug_wins_over_verbose() {
        let s = Settings {
            verbose: true,
            debug: true,
            ..Settings::default()
        };
        assert_eq!(s.log_level(), LevelFilter::Debug);
    }
}
