//! Access to the files a dataset definition refers to.
//!
//! [`FsDataSource`] resolves paths against a data directory.
//! [`InMemoryDataSource`] serves tables from memory, which is how tests and
//! embedders feed the pipeline without touching the filesystem.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;

use crate::DatasetError;

/// A readable collection of dataset files addressed by relative path.
pub trait DataSource: Send + Sync {
    /// Opens a file for reading.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file is missing or unreadable.
    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>, DatasetError>;

    /// A stable identity for the file, used as the cache key for anything
    /// loaded from it.
    fn identity(&self, path: &str) -> String;

    /// Reads a whole file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file is missing, unreadable, or not
    /// valid UTF-8.
    fn read_to_string(&self, path: &str) -> Result<String, DatasetError> {
        let mut reader = self.open(path)?;
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|source| DatasetError::Io {
                path: path.to_string(),
                source,
            })?;
        Ok(content)
    }
}

/// Files under a directory on disk.
#[derive(Debug, Clone)]
pub struct FsDataSource {
    root: PathBuf,
}

impl FsDataSource {
    /// Creates a source rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl DataSource for FsDataSource {
    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>, DatasetError> {
        let full = self.resolve(path);
        log::debug!("Opening {}", full.display());
        match std::fs::File::open(&full) {
            Ok(file) => Ok(Box::new(std::io::BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(DatasetError::NotFound {
                path: full.display().to_string(),
            }),
            Err(source) => Err(DatasetError::Io {
                path: full.display().to_string(),
                source,
            }),
        }
    }

    fn identity(&self, path: &str) -> String {
        self.resolve(path).display().to_string()
    }
}

/// Files held in memory, keyed by relative path.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    files: BTreeMap<String, Vec<u8>>,
}

impl InMemoryDataSource {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a file.
    #[must_use]
    pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    /// Adds (or replaces) a file in place.
    pub fn insert(&mut self, path: &str, content: impl Into<Vec<u8>>) {
        self.files.insert(path.to_string(), content.into());
    }
}

impl DataSource for InMemoryDataSource {
    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>, DatasetError> {
        self.files
            .get(path)
            .map(|bytes| Box::new(std::io::Cursor::new(bytes.clone())) as Box<dyn Read + Send>)
            .ok_or_else(|| DatasetError::NotFound {
                path: path.to_string(),
            })
    }

    fn identity(&self, path: &str) -> String {
        format!("memory:{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_reads_files() {
        let source = InMemoryDataSource::new().with_file("a.csv", "x,y\n1,2\n");
        assert_eq!(source.read_to_string("a.csv").unwrap(), "x,y\n1,2\n");
        assert_eq!(source.identity("a.csv"), "memory:a.csv");
    }

    #[test]
    fn missing_files_are_not_found() {
        let source = InMemoryDataSource::new();
        assert!(matches!(
            source.open("nope.csv"),
            Err(DatasetError::NotFound { .. })
        ));

        let fs = FsDataSource::new("/definitely/not/a/real/dir");
        assert!(matches!(
            fs.open("nope.csv"),
            Err(DatasetError::NotFound { .. })
        ));
    }

    #[test]
    fn fs_identity_is_the_resolved_path() {
        let fs = FsDataSource::new("data");
        assert_eq!(
            fs.identity("zones.csv"),
            PathBuf::from("data").join("zones.csv").display().to_string()
        );
    }
}
