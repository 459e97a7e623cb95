use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use kamotsu_common::channel::Channel;

/// Current session nickname, stored as plain text.
pub const NICKNAME_KEY: &str = "nickname";
/// Current session account (JSON), absent when the session has none.
pub const ACCOUNT_KEY: &str = "account";
/// Every account ever created, unique by nickname (JSON list).
pub const ALL_ACCOUNTS_KEY: &str = "all_accounts";
/// All messages across channels, in posting order (JSON list).
pub const MESSAGES_KEY: &str = "messages";

/// Key of the rate-limit record for one (channel, nickname) pair.
pub fn rate_limit_key(channel: Channel, nickname: &str) -> String {
    format!("rateLimit_{}_{}", channel.label(), nickname)
}

/// Errors from persisting a value.
#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Encode(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to write {}: {source}", path.display()),
            Self::Encode(e) => write!(f, "failed to encode value: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Encode(e) => Some(e),
        }
    }
}

/// String key/value persistence behind the board.
///
/// Implementations assume a single writer. Two processes sharing one
/// backing file will overwrite each other's snapshots; that is not guarded
/// against.
pub trait Store {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Read a JSON value, falling back to `T::default()` when it is missing or
/// cannot be decoded.
pub fn load_json<T: DeserializeOwned + Default>(store: &impl Store, key: &str) -> T {
    load_json_opt(store, key).unwrap_or_default()
}

/// Read a JSON value; a corrupt value is logged and treated as missing.
pub fn load_json_opt<T: DeserializeOwned>(store: &impl Store, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, "discarding unreadable stored value: {e}");
            None
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &mut impl Store,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let encoded = serde_json::to_string(value).map_err(StoreError::Encode)?;
    store.set(key, encoded)
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Memory store with writes that can be made to fail, for exercising
/// rollback paths.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FaultyStore {
    pub inner: MemoryStore,
    pub fail_remove: bool,
    pub fail_set: Option<&'static str>,
}

#[cfg(test)]
impl FaultyStore {
    fn fault(key: &str) -> StoreError {
        StoreError::Io {
            path: PathBuf::from(key),
            source: std::io::Error::other("injected write failure"),
        }
    }
}

#[cfg(test)]
impl Store for FaultyStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        if self.fail_set == Some(key) {
            return Err(Self::fault(key));
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.fail_remove {
            return Err(Self::fault(key));
        }
        self.inner.remove(key)
    }
}

/// Store backed by one JSON object file (key to string value).
///
/// The whole file is rewritten on every mutation, through a temporary file
/// renamed into place.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable one is logged and also starts empty.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "store file is corrupt, starting empty: {e}");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "cannot read store file, starting empty: {e}");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let data = serde_json::to_string_pretty(&self.entries).map_err(StoreError::Encode)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, data).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let previous = self.entries.insert(key.to_string(), value);
        if let Err(e) = self.flush() {
            match previous {
                Some(v) => self.entries.insert(key.to_string(), v),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let Some(previous) = self.entries.remove(key) else {
            return Ok(());
        };
        if let Err(e) = self.flush() {
            self.entries.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}
