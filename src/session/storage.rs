//! Token storage backends.
//!
//! A backend persists exactly one opaque token under a fixed key. The file
//! backend stores `{"token": "..."}` at a configured path.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Fixed key under which the token is persisted.
pub const TOKEN_KEY: &str = "token";

/// Persistence for the session token.
pub trait TokenStorage: Send + Sync {
    /// Reads the persisted token, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn load(&self) -> Result<Option<String>>;

    /// Persists the token, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be written.
    fn store(&self, token: &str) -> Result<()>;

    /// Removes the persisted token. Removing an absent token succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be modified.
    fn remove(&self) -> Result<()>;
}

/// Process-local token storage.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    /// Creates an empty storage.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Creates a storage that already holds a token.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>> {
        self.slot.lock().map_err(|e| Error::OperationFailed {
            operation: "token_storage_lock".to_string(),
            cause: e.to_string(),
        })
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.lock()?.clone())
    }

    fn store(&self, token: &str) -> Result<()> {
        *self.lock()? = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}

/// On-disk layout of the token file.
#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    #[serde(rename = "token")]
    token: String,
}

/// File-backed token storage.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Creates a storage rooted at `path`. The file is created on first store.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the token file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(operation: &str, path: &Path, e: impl std::fmt::Display) -> Error {
        Error::OperationFailed {
            operation: operation.to_string(),
            cause: format!("{}: {e}", path.display()),
        }
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error("read_token_file", &self.path, e)),
        };

        let file: TokenFile = serde_json::from_str(&contents)
            .map_err(|e| Self::io_error("parse_token_file", &self.path, e))?;
        Ok(Some(file.token).filter(|t| !t.is_empty()))
    }

    fn store(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Self::io_error("create_token_dir", parent, e))?;
        }

        let body = serde_json::to_string(&TokenFile {
            token: token.to_string(),
        })
        .map_err(|e| Self::io_error("serialize_token_file", &self.path, e))?;

        // Write-then-rename so readers never observe a half-written file.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, body).map_err(|e| Self::io_error("write_token_file", &tmp, e))?;
        restrict_permissions(&tmp)?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| Self::io_error("write_token_file", &self.path, e))
    }

    fn remove(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error("remove_token_file", &self.path, e)),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| FileTokenStorage::io_error("chmod_token_file", path, e))
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
const fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
