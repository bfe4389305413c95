//! Atomic JSON storage for generated circuit designs.
//!
//! Writes go to a temporary sibling file, are fsynced, then renamed over the
//! target while an exclusive lock file is held.

use circa_core::design::CircuitDesign;
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

/// Errors that can occur while saving or loading a design.
#[derive(Debug)]
pub enum DesignStorageError {
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON serialization/deserialization error.
    JsonError(serde_json::Error),
    /// File locking error.
    LockError(String),
}

impl std::fmt::Display for DesignStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DesignStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            DesignStorageError::JsonError(e) => write!(f, "JSON error: {}", e),
            DesignStorageError::LockError(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for DesignStorageError {}

impl From<std::io::Error> for DesignStorageError {
    fn from(e: std::io::Error) -> Self {
        DesignStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for DesignStorageError {
    fn from(e: serde_json::Error) -> Self {
        DesignStorageError::JsonError(e)
    }
}

/// A handle to a design file on disk.
pub struct DesignStorage {
    path: PathBuf,
}

impl DesignStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads a design, returning `None` if the file does not exist.
    pub fn load(&self) -> Result<Option<CircuitDesign>, DesignStorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Saves `design` as pretty-printed UTF-8 JSON, atomically.
    pub fn save(&self, design: &CircuitDesign) -> Result<(), DesignStorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let _lock = FileLock::acquire(&self.path)?;

        let json = serde_json::to_string_pretty(design)?;
        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.write_all(b"\n")?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        tracing::info!(
            path = %self.path.display(),
            blocks = design.blocks.len(),
            "Saved circuit design"
        );
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf, DesignStorageError> {
        let file_name = self.path.file_name().ok_or_else(|| {
            DesignStorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no file name",
            ))
        })?;
        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(self.path.with_file_name(tmp_name))
    }
}

/// A file lock guard that releases the lock when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, DesignStorageError> {
        let lock_path = path.with_extension("lock");

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive().map_err(|e| {
                DesignStorageError::LockError(format!("Failed to acquire lock: {}", e))
            })?;
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock happens when the handle closes; removing the file is best effort.
        let _ = fs::remove_file(&self.lock_path);
    }
}
