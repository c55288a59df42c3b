// File retrieval from a materialized working copy

use crate::error::{Error, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Resolve `relative` below `root`, refusing anything that leaves the root.
pub fn resolve_file(root: &Path, relative: &str) -> Result<PathBuf> {
    let relative = relative.trim();
    if relative.is_empty() {
        return Err(Error::invalid_input("file path is required"));
    }

    let rel = Path::new(relative);
    let escapes = rel.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(Error::invalid_input(format!(
            "path must stay inside the repository: {}",
            relative
        )));
    }

    let canonical = match root.join(rel).canonicalize() {
        Ok(p) => p,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::not_found(format!("file {}", relative)))
        }
        Err(e) => return Err(e.into()),
    };

    // symlinks may still point outside
    let root_canonical = root.canonicalize()?;
    if !canonical.starts_with(&root_canonical) {
        return Err(Error::invalid_input(format!(
            "path must stay inside the repository: {}",
            relative
        )));
    }

    if !canonical.is_file() {
        return Err(Error::not_found(format!("file {}", relative)));
    }

    Ok(canonical)
}

/// Read a file of the working copy as text (invalid UTF-8 is replaced)
pub fn read_file(root: &Path, relative: &str) -> Result<String> {
    let path = resolve_file(root, relative)?;
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/index.js"), "console.log('hi');\n").unwrap();
        dir
    }

    #[test]
    fn test_read_existing_file() {
        let dir = repo();
        let content = read_file(dir.path(), "src/index.js").unwrap();
        assert_eq!(content, "console.log('hi');\n");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = repo();
        let err = read_file(dir.path(), "src/missing.js").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_directory_is_not_found() {
        let dir = repo();
        let err = read_file(dir.path(), "src").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_empty_path_is_invalid() {
        let dir = repo();
        let err = read_file(dir.path(), "  ").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_traversal_is_rejected() {
        let dir = repo();
        for bad in ["../secret", "src/../../secret", "/etc/passwd"] {
            let err = read_file(dir.path(), bad).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)), "{}", bad);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_is_rejected() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.txt"), "nope").unwrap();
        let dir = repo();
        std::os::unix::fs::symlink(outside.path().join("secret.txt"), dir.path().join("link.txt"))
            .unwrap();

        let err = read_file(dir.path(), "link.txt").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let dir = repo();
        fs::write(dir.path().join("bin.dat"), [0x66, 0x6f, 0xff, 0x6f]).unwrap();
        let content = read_file(dir.path(), "bin.dat").unwrap();
        assert_eq!(content, "fo\u{FFFD}o");
    }
}
