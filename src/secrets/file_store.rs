//! secrets::file_store
//!
//! File-based persistence: one file per record inside a directory.
//!
//! # Security
//!
//! - Records live in `~/.birdhouse/` by default
//! - File permissions are set to 0600 on Unix (owner read/write only)
//! - All writes are atomic (write to temp file, then rename)
//! - Contents are never logged, printed, or included in error messages

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use super::traits::{SecretError, SecretStore};

/// Directory name under the home directory used when none is configured.
pub const DEFAULT_DIR_NAME: &str = ".birdhouse";

/// File-based record storage.
///
/// # Example
///
/// ```ignore
/// use birdhouse::secrets::{FileSecretStore, SecretStore};
///
/// let store = FileSecretStore::new()?;
/// store.write("twitter.config", br#"{"access_token":"..."}"#)?;
/// ```
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    directory: PathBuf,
}

impl FileSecretStore {
    /// Create a store in the default directory, `~/.birdhouse`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, SecretError> {
        let home = dirs::home_dir()
            .ok_or_else(|| SecretError::ReadError("cannot determine home directory".into()))?;
        Ok(Self {
            directory: home.join(DEFAULT_DIR_NAME),
        })
    }

    /// Create a store rooted at a custom directory.
    pub fn with_directory(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The directory holding the records.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the file backing a record.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, SecretError> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(SecretError::WriteError(format!(
                "invalid record name '{}'",
                name
            )));
        }
        Ok(self.directory.join(name))
    }

    /// Verify a record's permissions (Unix only).
    ///
    /// Returns true if the file doesn't exist or has 0600 permissions.
    #[cfg(unix)]
    pub fn verify_permissions(&self, name: &str) -> Result<bool, SecretError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Ok(true);
        }

        let metadata = fs::metadata(&path)
            .map_err(|e| SecretError::ReadError(format!("cannot read file metadata: {}", e)))?;

        let mode = metadata.permissions().mode() & 0o777;
        Ok(mode == 0o600)
    }

    /// Verify a record's permissions (non-Unix always returns true).
    #[cfg(not(unix))]
    pub fn verify_permissions(&self, _name: &str) -> Result<bool, SecretError> {
        Ok(true)
    }
}

fn map_io(kind: ErrorKind, message: String) -> SecretError {
    if kind == ErrorKind::PermissionDenied {
        SecretError::PermissionDenied(message)
    } else {
        SecretError::WriteError(message)
    }
}

impl SecretStore for FileSecretStore {
    fn name(&self) -> &'static str {
        "file"
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>, SecretError> {
        let path = self.path_for(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(
                SecretError::PermissionDenied(format!("cannot read {}: {}", path.display(), e)),
            ),
            Err(e) => Err(SecretError::ReadError(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<(), SecretError> {
        let path = self.path_for(name)?;

        fs::create_dir_all(&self.directory).map_err(|e| {
            map_io(e.kind(), format!("cannot create directory: {}", e))
        })?;

        let temp_path = self.directory.join(format!(".{}.tmp", name));

        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| map_io(e.kind(), format!("cannot create temp file: {}", e)))?;

            // Restrict before any content lands on disk.
            #[cfg(unix)]
            {
                let permissions = fs::Permissions::from_mode(0o600);
                file.set_permissions(permissions).map_err(|e| {
                    SecretError::WriteError(format!("cannot set permissions: {}", e))
                })?;
            }

            file.write_all(bytes)
                .map_err(|e| SecretError::WriteError(format!("cannot write record: {}", e)))?;

            file.sync_all()
                .map_err(|e| SecretError::WriteError(format!("cannot sync to disk: {}", e)))?;
        }

        fs::rename(&temp_path, &path)
            .map_err(|e| SecretError::WriteError(format!("cannot rename temp file: {}", e)))?;

        Ok(())
    }

    fn delete(&self, name: &str) -> Result<(), SecretError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SecretError::DeleteError(format!(
                "cannot delete {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
