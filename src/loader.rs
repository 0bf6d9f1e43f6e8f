//! Where template bytes come from.
//!
//! The parser asks a [`Loader`] for partials while parsing and the renderer
//! asks it for parent templates while rendering.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{Error, Result};
use crate::utils::normalize;

/// Reads the raw bytes of a template given its path.
pub trait Loader: Sync + Send {
    /// Returns the content found at `path`
    fn load(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Reads templates from the file system. I/O errors are returned unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileSystemLoader;

impl Loader for FileSystemLoader {
    fn load(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(Error::io_error)
    }
}

/// Serves templates from memory, mostly useful for tests and for embedding
/// templates in a binary.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemoryLoader {
    /// Creates an empty loader
    pub fn new() -> Self {
        MemoryLoader::default()
    }

    /// Adds (or replaces) the content for a path
    pub fn insert<P: AsRef<Path>, C: Into<Vec<u8>>>(&mut self, path: P, content: C) {
        self.files.insert(normalize(path.as_ref()), content.into());
    }

    /// Adds several files at once
    ///
    /// ```rust
    /// # use moustache::MemoryLoader;
    /// let loader = MemoryLoader::new().with_files(vec![
    ///     ("layout.html", "<title>{{*title}}{{/title}}</title>"),
    ///     ("page.html", "{{<layout}}{{*title}}Home{{/title}}"),
    /// ]);
    /// ```
    pub fn with_files<P, C>(mut self, files: Vec<(P, C)>) -> Self
    where
        P: AsRef<Path>,
        C: Into<Vec<u8>>,
    {
        for (path, content) in files {
            self.insert(path, content);
        }
        self
    }

    /// Removes a path, returning whether it was there
    pub fn remove<P: AsRef<Path>>(&mut self, path: P) -> bool {
        self.files.remove(&normalize(path.as_ref())).is_some()
    }
}

impl Loader for MemoryLoader {
    fn load(&self, path: &Path) -> Result<Vec<u8>> {
        self.files.get(&normalize(path)).cloned().ok_or_else(|| {
            Error::io_error(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("No template at `{}`", path.display()),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn memory_loader_normalizes_paths() {
        let loader = MemoryLoader::new().with_files(vec![("a/b.html", "hello")]);
        assert_eq!(loader.load(Path::new("./a/c/../b.html")).unwrap(), b"hello".to_vec());
    }

    #[test]
    fn memory_loader_missing_file_is_an_io_error() {
        let loader = MemoryLoader::new();
        let err = loader.load(Path::new("nope.html")).unwrap_err();
        match err.kind {
            ErrorKind::Io(kind) => assert_eq!(kind, std::io::ErrorKind::NotFound),
            _ => panic!("expected an io error"),
        }
    }

    #[test]
    fn file_system_loader_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.html");
        std::fs::write(&path, "Hello {{name}}").unwrap();

        assert_eq!(FileSystemLoader.load(&path).unwrap(), b"Hello {{name}}".to_vec());
        assert!(FileSystemLoader.load(&dir.path().join("missing.html")).is_err());
    }
}
