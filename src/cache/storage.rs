//! Cache storage trait and file-backed implementation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// On-disk shape of a cache entry.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEntry<T> {
  /// The key the entry was stored under
  pub key: String,
  /// Write time in milliseconds since the Unix epoch
  pub stored_at: i64,
  /// The cached payload
  pub value: T,
}

/// Raw storage backend for cache entries.
///
/// Backends only move bytes. Miss/expiry semantics, the create-and-retry on a
/// missing location and idempotent deletes all live in `CacheStore`, so
/// backends report `io::ErrorKind::NotFound` faithfully instead of hiding it.
pub trait CacheStorage: Send + Sync + 'static {
  /// Read the serialized entry for `key`. `Ok(None)` if no entry exists.
  fn read(&self, key: &str) -> io::Result<Option<String>>;

  /// Replace the serialized entry for `key`.
  fn write(&self, key: &str, contents: &str) -> io::Result<()>;

  /// Create the storage location (directory, namespace) if it is missing.
  fn create_location(&self) -> io::Result<()>;

  /// Remove the entry for `key`.
  fn remove(&self, key: &str) -> io::Result<()>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn read(&self, _key: &str) -> io::Result<Option<String>> {
    Ok(None) // Always miss
  }

  fn write(&self, _key: &str, _contents: &str) -> io::Result<()> {
    Ok(()) // Discard
  }

  fn create_location(&self) -> io::Result<()> {
    Ok(())
  }

  fn remove(&self, _key: &str) -> io::Result<()> {
    Ok(())
  }
}

/// One JSON file per key inside a cache directory.
///
/// File names are the SHA-256 of the key, so arbitrary keys
/// (`actions:5f1c...`, `boards:me`) map to stable, filesystem-safe names.
#[derive(Debug, Clone)]
pub struct FileStorage {
  dir: PathBuf,
}

impl FileStorage {
  /// Create a file storage rooted at `dir`. The directory is created lazily on first write.
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  /// Directory holding the entry files.
  pub fn dir(&self) -> &Path {
    &self.dir
  }

  /// Path of the file backing `key`.
  pub fn entry_path(&self, key: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    self.dir.join(format!("{}.json", hex::encode(hasher.finalize())))
  }
}

impl CacheStorage for FileStorage {
  fn read(&self, key: &str) -> io::Result<Option<String>> {
    match fs::read_to_string(self.entry_path(key)) {
      Ok(contents) => Ok(Some(contents)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e),
    }
  }

  fn write(&self, key: &str, contents: &str) -> io::Result<()> {
    fs::write(self.entry_path(key), contents)
  }

  fn create_location(&self) -> io::Result<()> {
    fs::create_dir_all(&self.dir)
  }

  fn remove(&self, key: &str) -> io::Result<()> {
    fs::remove_file(self.entry_path(key))
  }
}
