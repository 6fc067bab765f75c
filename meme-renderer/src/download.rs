//! Destinations for exported files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Receives an exported file.
pub trait DownloadSink {
    /// Store `bytes` under `file_name`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be stored.
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Writes downloads into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl DirectorySink {
    /// Create a sink writing into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Vec::new(),
        }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, oldest first.
    #[must_use]
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<()> {
        // A file name with separators could escape the directory.
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid file name: {file_name:?}"),
            ));
        }
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes)?;
        tracing::debug!("Wrote {}", path.display());
        self.saved.push(path);
        Ok(())
    }
}

/// Keeps downloads in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Files received, in order.
    pub files: Vec<(String, Vec<u8>)>,
}

impl DownloadSink for MemorySink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> io::Result<()> {
        self.files.push((file_name.to_string(), bytes.to_vec()));
        Ok(())
    }
}
