//! Storage for the oracle access credential.

use async_trait::async_trait;
use derive_more::{Display, Error};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

/// An opaque secret. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The secret itself, for building an auth header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Persists and retrieves credentials by key.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetches the credential stored under `key`; fails if there is none.
    async fn get(&self, key: &str) -> Result<Credential, CredentialError>;

    /// Stores `value` under `key`.
    ///
    /// Failures are logged and never reach the caller.
    async fn set(&self, key: &str, value: Credential);
}

/// Credentials kept in a TOML table on disk (`key = "value"` per line).
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileCredentialStore {
    /// Uses the file at `path`; it is created on the first `set`.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_table(&self) -> Result<BTreeMap<String, String>, CredentialError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Credential file does not exist yet");
                return Ok(BTreeMap::new());
            }
            Err(e) => {
                return Err(CredentialError::new(format!(
                    "Failed to read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        toml::from_str(&content).map_err(|e| {
            CredentialError::new(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    async fn write_entry(&self, key: &str, value: &Credential) -> Result<(), CredentialError> {
        let _guard = self.write_lock.lock().await;

        let mut table = self.read_table().await?;
        table.insert(key.to_string(), value.expose().to_string());

        let content = toml::to_string(&table)
            .map_err(|e| CredentialError::new(format!("Failed to encode credentials: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                CredentialError::new(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        tokio::fs::write(&self.path, content).await.map_err(|e| {
            CredentialError::new(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let owner_only = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = tokio::fs::set_permissions(&self.path, owner_only).await {
                warn!(error = %e, "Could not restrict credential file permissions");
            }
        }

        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn get(&self, key: &str) -> Result<Credential, CredentialError> {
        let mut table = self.read_table().await?;
        table
            .remove(key)
            .map(Credential::new)
            .ok_or_else(|| CredentialError::new(format!("No credential stored for {}", key)))
    }

    #[instrument(skip(self, value), fields(path = %self.path.display()))]
    async fn set(&self, key: &str, value: Credential) {
        match self.write_entry(key, &value).await {
            Ok(()) => info!("Credential saved"),
            Err(e) => warn!(error = %e, "Failed to save credential"),
        }
    }
}

/// Credentials held in process memory only.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, Credential>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding one credential.
    pub fn with_entry(key: impl Into<String>, value: Credential) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value);
        Self {
            entries: Mutex::new(entries),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Credential, CredentialError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CredentialError::new("Credential store lock poisoned".to_string()))?;
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| CredentialError::new(format!("No credential stored for {}", key)))
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: Credential) {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), value);
            }
            Err(_) => warn!("Credential store lock poisoned; credential not saved"),
        }
    }
}

/// Credential lookup or persistence error.
#[derive(Debug, Clone, Display, Error)]
#[display("Credential error: {} at {}:{}", message, file, line)]
pub struct CredentialError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl CredentialError {
    /// Creates a new credential error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "Credential error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
