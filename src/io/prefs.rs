//! Namespaced key/value preference storage.
//!
//! Values are stored as strings; a [`Codec`] turns typed values into
//! strings and back. Reads never fail: a missing or undecodable value
//! yields the caller's default.

use std::fmt::Display;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Error type for preference writes
#[derive(Debug, thiserror::Error)]
pub enum PrefsError {
    #[error("could not write preferences to {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize preference: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Raw string storage, grouped by namespace
pub trait PreferenceStore {
    fn get_raw(&self, namespace: &str, key: &str) -> Option<String>;
    fn set_raw(&mut self, namespace: &str, key: &str, value: String) -> Result<(), PrefsError>;
    fn remove(&mut self, namespace: &str, key: &str) -> Result<(), PrefsError>;
}

/// Serialize/deserialize hooks for one value type.
///
/// Implementations must round-trip: `decode(&encode(v)?) == Some(v)`.
pub trait Codec<T> {
    fn encode(&self, value: &T) -> Result<String, PrefsError>;
    fn decode(&self, raw: &str) -> Option<T>;
}

/// JSON via serde. The default for structured values.
pub struct JsonCodec<T>(PhantomData<T>);

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        JsonCodec(PhantomData)
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        JsonCodec::new()
    }
}

impl<T: Serialize + DeserializeOwned> Codec<T> for JsonCodec<T> {
    fn encode(&self, value: &T) -> Result<String, PrefsError> {
        Ok(serde_json::to_string(value)?)
    }

    fn decode(&self, raw: &str) -> Option<T> {
        serde_json::from_str(raw).ok()
    }
}

/// `Display` out, `FromStr` in. Keeps scalars and enums readable on disk.
pub struct DisplayCodec<T>(PhantomData<T>);

impl<T> DisplayCodec<T> {
    pub fn new() -> Self {
        DisplayCodec(PhantomData)
    }
}

impl<T> Default for DisplayCodec<T> {
    fn default() -> Self {
        DisplayCodec::new()
    }
}

impl<T: Display + FromStr> Codec<T> for DisplayCodec<T> {
    fn encode(&self, value: &T) -> Result<String, PrefsError> {
        Ok(value.to_string())
    }

    fn decode(&self, raw: &str) -> Option<T> {
        raw.parse().ok()
    }
}

/// Read a typed value, falling back to `default` when it is missing or
/// doesn't decode.
pub fn get<T, S, C>(store: &S, namespace: &str, key: &str, default: T, codec: &C) -> T
where
    S: PreferenceStore + ?Sized,
    C: Codec<T>,
{
    let Some(raw) = store.get_raw(namespace, key) else {
        return default;
    };
    match codec.decode(&raw) {
        Some(value) => value,
        None => {
            debug!(namespace, key, raw = %raw, "undecodable preference; using default");
            default
        }
    }
}

/// Write a typed value
pub fn set<T, S, C>(
    store: &mut S,
    namespace: &str,
    key: &str,
    value: &T,
    codec: &C,
) -> Result<(), PrefsError>
where
    S: PreferenceStore + ?Sized,
    C: Codec<T>,
{
    let raw = codec.encode(value)?;
    store.set_raw(namespace, key, raw)
}

type Namespaces = IndexMap<String, IndexMap<String, String>>;

fn lookup(data: &Namespaces, namespace: &str, key: &str) -> Option<String> {
    data.get(namespace).and_then(|ns| ns.get(key)).cloned()
}

fn remove_entry(data: &mut Namespaces, namespace: &str, key: &str) -> bool {
    let Some(ns) = data.get_mut(namespace) else {
        return false;
    };
    let removed = ns.shift_remove(key).is_some();
    if ns.is_empty() {
        data.shift_remove(namespace);
    }
    removed
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Volatile store, for tests and one-shot sessions
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Namespaces,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get_raw(&self, namespace: &str, key: &str) -> Option<String> {
        lookup(&self.data, namespace, key)
    }

    fn set_raw(&mut self, namespace: &str, key: &str, value: String) -> Result<(), PrefsError> {
        self.data
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, namespace: &str, key: &str) -> Result<(), PrefsError> {
        remove_entry(&mut self.data, namespace, key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Store persisted as a JSON object of namespaces, rewritten atomically on
/// every change. Key order on disk follows insertion order.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: Namespaces,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable or malformed one is logged and treated as empty.
    pub fn open(path: &Path) -> Self {
        let data = match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(data) => data,
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "malformed preferences file; ignoring"
                    );
                    Namespaces::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Namespaces::new(),
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "could not read preferences file; ignoring"
                );
                Namespaces::new()
            }
        };
        JsonFileStore {
            path: path.to_path_buf(),
            data,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PrefsError> {
        let content = serde_json::to_string_pretty(&self.data)?;
        crate::io::atomic_write(&self.path, content.as_bytes()).map_err(|e| {
            PrefsError::WriteError {
                path: self.path.clone(),
                source: e,
            }
        })
    }
}

impl PreferenceStore for JsonFileStore {
    fn get_raw(&self, namespace: &str, key: &str) -> Option<String> {
        lookup(&self.data, namespace, key)
    }

    fn set_raw(&mut self, namespace: &str, key: &str, value: String) -> Result<(), PrefsError> {
        self.data
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, namespace: &str, key: &str) -> Result<(), PrefsError> {
        if remove_entry(&mut self.data, namespace, key) {
            self.flush()?;
        }
        Ok(())
    }
}
