//! Decides whether a requested path may be served from the configured root.
//!
//! The default policy is a plain string prefix test on the path exactly as the
//! client sent it. It performs no normalisation, so `root/../elsewhere` and
//! `rootsibling/file` both pass. `PathPolicy::Confined` is an opt-in hardened
//! mode that resolves the path against the filesystem first.

use std::path::{Component, Path, PathBuf};

use crate::error::ProtocolError;

/// Allowed iff `path` begins with the exact string `root`.
pub fn authorize(path: &str, root: &str) -> bool {
    path.starts_with(root)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathPolicy {
    #[default]
    Prefix,
    Confined,
}

impl PathPolicy {
    /// Return the filesystem path to open, or `IllegalPath`.
    pub fn resolve(&self, path: &str, root: &Path) -> Result<PathBuf, ProtocolError> {
        match self {
            PathPolicy::Prefix => {
                if authorize(path, &root.to_string_lossy()) {
                    Ok(PathBuf::from(path))
                } else {
                    Err(ProtocolError::IllegalPath(path.to_string()))
                }
            }
            PathPolicy::Confined => confine(path, root),
        }
    }
}

fn confine(path: &str, root: &Path) -> Result<PathBuf, ProtocolError> {
    let illegal = || ProtocolError::IllegalPath(path.to_string());
    let requested = Path::new(path);
    if requested
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(illegal());
    }

    let canon_root = root.canonicalize().map_err(|_| illegal())?;

    // Existing targets resolve fully; new files resolve through their parent.
    let resolved = if let Ok(canon) = requested.canonicalize() {
        canon
    } else {
        let parent = requested.parent().ok_or_else(illegal)?;
        let file_name = requested.file_name().ok_or_else(illegal)?;
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        parent.canonicalize().map_err(|_| illegal())?.join(file_name)
    };

    if !resolved.starts_with(&canon_root) {
        return Err(illegal());
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_prefix_rule() {
        assert!(authorize("/srv/root/sub/a.bin", "/srv/root"));
        assert!(authorize("/srv/root", "/srv/root"));
        assert!(!authorize("/srv/other/a.bin", "/srv/root"));
        assert!(!authorize("srv/root/a.bin", "/srv/root"));
    }

    #[test]
    fn test_prefix_rule_is_not_normalised() {
        // Known weakness of the default policy, kept for compatibility.
        assert!(authorize("/srv/root/../etc/passwd", "/srv/root"));
        assert!(authorize("/srv/rootkit/file", "/srv/root"));
    }

    #[test]
    fn test_prefix_policy_returns_path_verbatim() {
        let got = PathPolicy::Prefix
            .resolve("/srv/root/x", Path::new("/srv/root"))
            .unwrap();
        assert_eq!(got, PathBuf::from("/srv/root/x"));
        assert!(matches!(
            PathPolicy::Prefix.resolve("/tmp/x", Path::new("/srv/root")),
            Err(ProtocolError::IllegalPath(_))
        ));
    }

    #[test]
    fn test_confined_accepts_new_and_existing_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("sub/existing.txt"), b"x").unwrap();

        let existing = root.join("sub/existing.txt");
        let got = PathPolicy::Confined
            .resolve(&existing.to_string_lossy(), root)
            .unwrap();
        assert!(got.ends_with("sub/existing.txt"));

        let fresh = root.join("sub/new.bin");
        let got = PathPolicy::Confined
            .resolve(&fresh.to_string_lossy(), root)
            .unwrap();
        assert!(got.ends_with("sub/new.bin"));
    }

    #[test]
    fn test_confined_rejects_escapes() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(temp_dir.path().join("rootkit")).unwrap();

        let traversal = format!("{}/../secret", root.display());
        assert!(PathPolicy::Confined.resolve(&traversal, &root).is_err());

        let sibling = temp_dir.path().join("rootkit/file");
        assert!(authorize(&sibling.to_string_lossy(), &root.to_string_lossy()));
        assert!(PathPolicy::Confined
            .resolve(&sibling.to_string_lossy(), &root)
            .is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_confined_rejects_symlink_escape() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        let outside = temp_dir.path().join("outside");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&outside).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();

        let via_link = root.join("link/file");
        assert!(PathPolicy::Confined
            .resolve(&via_link.to_string_lossy(), &root)
            .is_err());
    }
}
