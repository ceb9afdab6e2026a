//! Staleness-aware cache store with fire-and-forget background refresh.

use chrono::{Duration, Utc};
use color_eyre::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashSet;
use std::future::Future;
use std::io;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, error, warn};

use super::policy::{CachePolicy, Freshness};
use super::storage::{CacheStorage, FileStorage, StoredEntry};

/// Faults the cache surfaces to its caller.
///
/// Read-side problems never appear here: they are reported and treated as a miss.
#[derive(Debug, Error)]
pub enum CacheError {
  #[error("failed to write cache entry '{key}': {source}")]
  Write {
    key: String,
    #[source]
    source: io::Error,
  },
  #[error("failed to delete cache entry '{key}': {source}")]
  Delete {
    key: String,
    #[source]
    source: io::Error,
  },
  #[error("failed to serialize cache entry '{key}': {source}")]
  Serialize {
    key: String,
    #[source]
    source: serde_json::Error,
  },
}

/// Cache store that classifies entries as fresh, stale, or expired.
///
/// Constructed once and cloned into whatever needs caching; clones share the
/// storage backend and the set of in-flight background refreshes.
pub struct CacheStore<S: CacheStorage = FileStorage> {
  storage: Arc<S>,
  policy: CachePolicy,
  /// Keys with a background refresh currently running
  in_flight: Arc<Mutex<HashSet<String>>>,
}

impl<S: CacheStorage> CacheStore<S> {
  /// Create a cache store with the default policy (24h lifetime, stale after 1h).
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
      policy: CachePolicy::default(),
      in_flight: Arc::new(Mutex::new(HashSet::new())),
    }
  }

  /// Set the freshness policy.
  pub fn with_policy(mut self, policy: CachePolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn policy(&self) -> CachePolicy {
    self.policy
  }

  pub fn storage(&self) -> &S {
    &self.storage
  }

  /// Look up `key` without ever triggering a refresh.
  ///
  /// Returns `None` for absent, expired (evicted on the spot), unreadable or
  /// malformed entries.
  pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
    self.lookup(key).map(|(value, _)| value)
  }

  /// Look up `key`, refreshing it in the background when it is stale.
  ///
  /// A stale value is returned immediately while `producer` runs on a spawned
  /// task and overwrites the entry on success. Refresh failures and panics are
  /// logged and never reach the caller. At most one refresh per key is in
  /// flight; later calls while one is running just serve the stale value.
  pub fn get_with_refresh<T, F, Fut>(&self, key: &str, producer: F) -> Option<T>
  where
    T: Serialize + DeserializeOwned + Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
  {
    let (value, freshness) = self.lookup(key)?;
    if freshness == Freshness::Stale {
      self.spawn_refresh(key, producer);
    }
    Some(value)
  }

  /// Store `value` under `key`, replacing any previous entry.
  ///
  /// A missing storage location is created and the write retried once.
  pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
    let entry = StoredEntry {
      key: key.to_string(),
      stored_at: Utc::now().timestamp_millis(),
      value,
    };
    let contents = serde_json::to_string(&entry).map_err(|source| CacheError::Serialize {
      key: key.to_string(),
      source,
    })?;

    let written = match self.storage.write(key, &contents) {
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        debug!(key, "cache location missing, creating it");
        self
          .storage
          .create_location()
          .and_then(|()| self.storage.write(key, &contents))
      }
      other => other,
    };

    written.map_err(|source| CacheError::Write {
      key: key.to_string(),
      source,
    })
  }

  /// Remove the entry for `key`. Removing an absent entry succeeds.
  pub fn delete(&self, key: &str) -> Result<(), CacheError> {
    match self.storage.remove(key) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(source) => Err(CacheError::Delete {
        key: key.to_string(),
        source,
      }),
    }
  }

  /// Read-through fetch.
  ///
  /// Serves the cached value (refreshing stale entries in the background)
  /// unless `force_fresh` is set. On a miss or a forced fetch the producer runs
  /// in the foreground, its error is returned unchanged, and the result is stored.
  pub async fn fetch<T, F, Fut>(&self, key: &str, force_fresh: bool, producer: F) -> Result<T>
  where
    T: Serialize + DeserializeOwned + Send + 'static,
    F: FnOnce() -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
  {
    if !force_fresh {
      if let Some(value) = self.get_with_refresh(key, producer.clone()) {
        debug!(key, "served from cache");
        return Ok(value);
      }
    }

    let value = producer().await?;
    self.set(key, &value)?;
    Ok(value)
  }

  /// Wait until no background refresh is running, or `timeout` elapses.
  ///
  /// Refreshes are never awaited by the `get` that started them; a short-lived
  /// process calls this before exiting so they are not cut off by runtime shutdown.
  /// Returns false if refreshes were still running at the deadline.
  pub async fn settle(&self, timeout: std::time::Duration) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
      let pending = self
        .in_flight
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .len();
      if pending == 0 {
        return true;
      }
      if tokio::time::Instant::now() >= deadline {
        warn!(pending, "background refreshes still running at shutdown");
        return false;
      }
      tokio::time::sleep(std::time::Duration::from_millis(25)).await;
    }
  }

  fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<(T, Freshness)> {
    let contents = match self.storage.read(key) {
      Ok(Some(contents)) => contents,
      Ok(None) => {
        debug!(key, "cache miss");
        return None;
      }
      Err(e) => {
        warn!(key, error = %e, "cache read failed, treating as miss");
        return None;
      }
    };

    let entry: StoredEntry<T> = match serde_json::from_str(&contents) {
      Ok(entry) => entry,
      Err(e) => {
        warn!(key, error = %e, "malformed cache entry, treating as miss");
        return None;
      }
    };

    let age = Utc::now()
      .timestamp_millis()
      .checked_sub(entry.stored_at)
      .and_then(Duration::try_milliseconds);
    let Some(age) = age else {
      warn!(key, stored_at = entry.stored_at, "cache entry timestamp out of range, treating as miss");
      return None;
    };
    match self.policy.classify(age) {
      Freshness::Expired => {
        debug!(key, age_ms = age.num_milliseconds(), "cache entry expired, evicting");
        if let Err(e) = self.delete(key) {
          warn!(key, error = %e, "failed to evict expired cache entry");
        }
        None
      }
      freshness => Some((entry.value, freshness)),
    }
  }

  fn spawn_refresh<T, F, Fut>(&self, key: &str, producer: F)
  where
    T: Serialize + Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
  {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
      warn!(key, "no async runtime, skipping background refresh");
      return;
    };
    let Some(guard) = InFlight::claim(&self.in_flight, key) else {
      debug!(key, "background refresh already in flight");
      return;
    };

    debug!(key, "cache entry stale, refreshing in background");
    let store = self.clone();
    runtime.spawn(async move {
      let key = guard.key.as_str();

      // Inner task so a panicking producer surfaces as a JoinError here.
      match tokio::spawn(async move { producer().await }).await {
        Ok(Ok(value)) => match store.set(key, &value) {
          Ok(()) => debug!(key, "background refresh stored"),
          Err(e) => warn!(key, error = %e, "background refresh could not be stored"),
        },
        Ok(Err(e)) => warn!(key, error = %e, "background refresh failed"),
        Err(e) if e.is_panic() => error!(key, "background refresh panicked"),
        Err(e) => warn!(key, error = %e, "background refresh was cancelled"),
      }
    });
  }
}

impl<S: CacheStorage> Clone for CacheStore<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      policy: self.policy,
      in_flight: Arc::clone(&self.in_flight),
    }
  }
}

/// Marks a key as having a refresh in flight until dropped.
struct InFlight {
  keys: Arc<Mutex<HashSet<String>>>,
  key: String,
}

impl InFlight {
  fn claim(keys: &Arc<Mutex<HashSet<String>>>, key: &str) -> Option<Self> {
    let mut set = keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if !set.insert(key.to_string()) {
      return None;
    }
    Some(Self {
      keys: Arc::clone(keys),
      key: key.to_string(),
    })
  }
}

impl Drop for InFlight {
  fn drop(&mut self) {
    let mut set = self
      .keys
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    set.remove(&self.key);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use color_eyre::eyre::eyre;
  use std::collections::VecDeque;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::time::Duration as StdDuration;
  use tempfile::TempDir;
  use tokio::sync::Notify;

  fn create_test_store() -> (CacheStore<FileStorage>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let store = CacheStore::new(FileStorage::new(temp_dir.path().join("cache")));
    (store, temp_dir)
  }

  /// Write an entry directly to storage, backdated by `age`.
  fn seed<S: CacheStorage, T: Serialize>(store: &CacheStore<S>, key: &str, value: T, age: Duration) {
    let entry = StoredEntry {
      key: key.to_string(),
      stored_at: Utc::now().timestamp_millis() - age.num_milliseconds(),
      value,
    };
    let contents = serde_json::to_string(&entry).expect("serialize");
    store.storage().create_location().expect("create location");
    store.storage().write(key, &contents).expect("seed write");
  }

  fn stored_value(store: &CacheStore<FileStorage>, key: &str) -> Option<String> {
    let contents = store.storage().read(key).expect("read")?;
    let entry: StoredEntry<String> = serde_json::from_str(&contents).expect("parse");
    Some(entry.value)
  }

  async fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
      if condition() {
        return true;
      }
      tokio::time::sleep(StdDuration::from_millis(10)).await;
    }
    condition()
  }

  fn counting_producer(
    calls: &Arc<AtomicUsize>,
    value: &'static str,
  ) -> impl FnOnce() -> std::future::Ready<Result<String>> + Clone + Send + 'static {
    let calls = Arc::clone(calls);
    move || {
      calls.fetch_add(1, Ordering::SeqCst);
      std::future::ready(Ok(value.to_string()))
    }
  }

  #[tokio::test]
  async fn test_fresh_entry_served_without_refresh() {
    let (store, _temp_dir) = create_test_store();
    let calls = Arc::new(AtomicUsize::new(0));
    seed(&store, "boards:me", "cached", Duration::minutes(30));

    let value: Option<String> =
      store.get_with_refresh("boards:me", counting_producer(&calls, "refreshed"));

    assert_eq!(value.as_deref(), Some("cached"));
    tokio::time::sleep(StdDuration::from_millis(50)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(stored_value(&store, "boards:me").as_deref(), Some("cached"));
  }

  #[tokio::test]
  async fn test_stale_entry_served_and_refreshed() {
    let (store, _temp_dir) = create_test_store();
    let calls = Arc::new(AtomicUsize::new(0));
    seed(&store, "boards:me", "cached", Duration::milliseconds(7_200_000));

    let value: Option<String> =
      store.get_with_refresh("boards:me", counting_producer(&calls, "refreshed"));

    assert_eq!(value.as_deref(), Some("cached"));
    assert!(
      wait_until(|| stored_value(&store, "boards:me").as_deref() == Some("refreshed")).await,
      "background refresh should overwrite the entry"
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // The refreshed entry is fresh again
    let value: Option<String> =
      store.get_with_refresh("boards:me", counting_producer(&calls, "again"));
    assert_eq!(value.as_deref(), Some("refreshed"));
    tokio::time::sleep(StdDuration::from_millis(50)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_settle_waits_for_refresh() {
    let (store, _temp_dir) = create_test_store();
    seed(&store, "boards:me", "cached", Duration::hours(2));

    let value: Option<String> = store.get_with_refresh("boards:me", || async {
      tokio::time::sleep(StdDuration::from_millis(100)).await;
      Ok("refreshed".to_string())
    });
    assert_eq!(value.as_deref(), Some("cached"));

    assert!(store.settle(StdDuration::from_secs(5)).await);
    assert_eq!(stored_value(&store, "boards:me").as_deref(), Some("refreshed"));
  }

  #[tokio::test]
  async fn test_settle_times_out() {
    let (store, _temp_dir) = create_test_store();
    seed(&store, "boards:me", "cached", Duration::hours(2));

    let _: Option<String> = store.get_with_refresh("boards:me", || async {
      std::future::pending::<()>().await;
      Ok("never".to_string())
    });

    assert!(!store.settle(StdDuration::from_millis(100)).await);
  }

  #[tokio::test]
  async fn test_expired_entry_is_evicted() {
    let (store, _temp_dir) = create_test_store();
    let calls = Arc::new(AtomicUsize::new(0));
    seed(&store, "boards:me", "cached", Duration::milliseconds(90_000_000));

    let value: Option<String> =
      store.get_with_refresh("boards:me", counting_producer(&calls, "refreshed"));

    assert!(value.is_none());
    assert!(store.storage().read("boards:me").expect("read").is_none());
    tokio::time::sleep(StdDuration::from_millis(50)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn test_failed_refresh_keeps_stale_value() {
    let (store, _temp_dir) = create_test_store();
    let attempted = Arc::new(Notify::new());
    seed(&store, "boards:me", "cached", Duration::hours(2));

    let signal = Arc::clone(&attempted);
    let value: Option<String> = store.get_with_refresh("boards:me", move || async move {
      signal.notify_one();
      Err(eyre!("rate limited"))
    });

    assert_eq!(value.as_deref(), Some("cached"));
    tokio::time::timeout(StdDuration::from_secs(2), attempted.notified())
      .await
      .expect("producer should run");
    tokio::time::sleep(StdDuration::from_millis(50)).await;
    assert_eq!(stored_value(&store, "boards:me").as_deref(), Some("cached"));
  }

  #[tokio::test]
  async fn test_panicking_refresh_is_contained() {
    let (store, _temp_dir) = create_test_store();
    let calls = Arc::new(AtomicUsize::new(0));
    seed(&store, "boards:me", "cached", Duration::hours(2));

    async fn exploding() -> Result<String> {
      panic!("producer blew up")
    }

    let value: Option<String> = store.get_with_refresh("boards:me", exploding);
    assert_eq!(value.as_deref(), Some("cached"));

    // The in-flight marker is released after the panic, so a later call refreshes.
    assert!(
      wait_until(|| {
        let _: Option<String> =
          store.get_with_refresh("boards:me", counting_producer(&calls, "refreshed"));
        calls.load(Ordering::SeqCst) > 0
      })
      .await
    );
    assert!(wait_until(|| stored_value(&store, "boards:me").as_deref() == Some("refreshed")).await);
  }

  #[tokio::test]
  async fn test_concurrent_refreshes_are_coalesced() {
    let (store, _temp_dir) = create_test_store();
    let calls = Arc::new(AtomicUsize::new(0));
    let release = Arc::new(Notify::new());
    seed(&store, "boards:me", "cached", Duration::hours(2));

    for _ in 0..3 {
      let calls = Arc::clone(&calls);
      let release = Arc::clone(&release);
      let value: Option<String> = store.get_with_refresh("boards:me", move || async move {
        calls.fetch_add(1, Ordering::SeqCst);
        release.notified().await;
        Ok("refreshed".to_string())
      });
      assert_eq!(value.as_deref(), Some("cached"));
    }

    assert!(wait_until(|| calls.load(Ordering::SeqCst) == 1).await);
    release.notify_one();
    assert!(wait_until(|| stored_value(&store, "boards:me").as_deref() == Some("refreshed")).await);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_stale_read_without_runtime_still_serves() {
    let (store, _temp_dir) = create_test_store();
    let calls = Arc::new(AtomicUsize::new(0));
    seed(&store, "boards:me", "cached", Duration::hours(2));

    let value: Option<String> =
      store.get_with_refresh("boards:me", counting_producer(&calls, "refreshed"));

    assert_eq!(value.as_deref(), Some("cached"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn test_get_missing_key_is_none() {
    let (store, _temp_dir) = create_test_store();
    assert!(store.get::<String>("nothing").is_none());
  }

  #[test]
  fn test_malformed_entry_is_miss() {
    let (store, _temp_dir) = create_test_store();
    store.storage().create_location().expect("create");
    store.storage().write("boards:me", "{not json").expect("write");
    assert!(store.get::<String>("boards:me").is_none());

    // Wrong payload shape is also a miss
    seed(&store, "boards:me", 42, Duration::zero());
    assert!(store.get::<Vec<String>>("boards:me").is_none());
  }

  #[test]
  fn test_out_of_range_stored_at_is_miss() {
    let (store, _temp_dir) = create_test_store();
    store.storage().create_location().expect("create");
    store
      .storage()
      .write("k", r#"{"key":"k","storedAt":-9223372036854775808,"value":"ancient"}"#)
      .expect("write");

    assert_eq!(store.get::<String>("k"), None);
    assert_eq!(
      store.get_with_refresh("k", || async { Ok("fresh".to_string()) }),
      None
    );
  }

  #[test]
  fn test_set_creates_missing_directory() {
    let (store, temp_dir) = create_test_store();
    assert!(!temp_dir.path().join("cache").exists());

    store.set("boards:me", &"value").expect("set should succeed");

    assert!(store.storage().entry_path("boards:me").exists());
    assert_eq!(store.get::<String>("boards:me").as_deref(), Some("value"));
  }

  #[test]
  fn test_set_replaces_entry_and_stamps_time() {
    let (store, _temp_dir) = create_test_store();
    let before = Utc::now().timestamp_millis();
    store.set("k", &"first").expect("set");
    store.set("k", &"second").expect("set");
    let after = Utc::now().timestamp_millis();

    let contents = store.storage().read("k").expect("read").expect("entry");
    let entry: StoredEntry<String> = serde_json::from_str(&contents).expect("parse");
    assert_eq!(entry.key, "k");
    assert_eq!(entry.value, "second");
    assert!(entry.stored_at >= before && entry.stored_at <= after);
  }

  #[test]
  fn test_delete_is_idempotent() {
    let (store, _temp_dir) = create_test_store();
    store.set("k", &"value").expect("set");
    store.delete("k").expect("first delete");
    store.delete("k").expect("second delete");
    assert!(store.get::<String>("k").is_none());
  }

  /// Storage that fails according to a script, for fault paths the filesystem can't easily produce.
  #[derive(Default)]
  struct ScriptedStorage {
    read_error: Option<io::ErrorKind>,
    write_errors: Mutex<VecDeque<io::ErrorKind>>,
    remove_error: Option<io::ErrorKind>,
    creates: AtomicUsize,
    writes: AtomicUsize,
  }

  impl ScriptedStorage {
    fn failing_writes(kinds: &[io::ErrorKind]) -> Self {
      Self {
        write_errors: Mutex::new(kinds.iter().copied().collect()),
        ..Default::default()
      }
    }
  }

  impl CacheStorage for ScriptedStorage {
    fn read(&self, _key: &str) -> io::Result<Option<String>> {
      match self.read_error {
        Some(kind) => Err(kind.into()),
        None => Ok(None),
      }
    }

    fn write(&self, _key: &str, _contents: &str) -> io::Result<()> {
      self.writes.fetch_add(1, Ordering::SeqCst);
      match self.write_errors.lock().expect("lock").pop_front() {
        Some(kind) => Err(kind.into()),
        None => Ok(()),
      }
    }

    fn create_location(&self) -> io::Result<()> {
      self.creates.fetch_add(1, Ordering::SeqCst);
      Ok(())
    }

    fn remove(&self, _key: &str) -> io::Result<()> {
      match self.remove_error {
        Some(kind) => Err(kind.into()),
        None => Ok(()),
      }
    }
  }

  #[test]
  fn test_read_fault_is_miss() {
    let store = CacheStore::new(ScriptedStorage {
      read_error: Some(io::ErrorKind::PermissionDenied),
      ..Default::default()
    });
    assert!(store.get::<String>("k").is_none());
  }

  #[test]
  fn test_set_retries_exactly_once() {
    let store = CacheStore::new(ScriptedStorage::failing_writes(&[
      io::ErrorKind::NotFound,
      io::ErrorKind::NotFound,
    ]));

    let err = store.set("k", &"v").expect_err("second failure propagates");
    assert!(matches!(err, CacheError::Write { .. }));
    assert_eq!(store.storage().writes.load(Ordering::SeqCst), 2);
    assert_eq!(store.storage().creates.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_set_other_fault_propagates_immediately() {
    let store = CacheStore::new(ScriptedStorage::failing_writes(&[
      io::ErrorKind::PermissionDenied,
    ]));

    let err = store.set("k", &"v").expect_err("fault propagates");
    assert!(err.to_string().contains("failed to write cache entry 'k'"));
    assert_eq!(store.storage().writes.load(Ordering::SeqCst), 1);
    assert_eq!(store.storage().creates.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn test_delete_fault_propagates() {
    let store = CacheStore::new(ScriptedStorage {
      remove_error: Some(io::ErrorKind::PermissionDenied),
      ..Default::default()
    });
    assert!(matches!(store.delete("k"), Err(CacheError::Delete { .. })));

    let store = CacheStore::new(ScriptedStorage {
      remove_error: Some(io::ErrorKind::NotFound),
      ..Default::default()
    });
    assert!(store.delete("k").is_ok());
  }

  #[tokio::test]
  async fn test_fetch_miss_runs_producer_and_stores() {
    let (store, _temp_dir) = create_test_store();
    let calls = Arc::new(AtomicUsize::new(0));

    let value: String = store
      .fetch("boards:me", false, counting_producer(&calls, "network"))
      .await
      .expect("fetch");
    assert_eq!(value, "network");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let value: String = store
      .fetch("boards:me", false, counting_producer(&calls, "network again"))
      .await
      .expect("fetch");
    assert_eq!(value, "network");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_fetch_force_fresh_bypasses_cache() {
    let (store, _temp_dir) = create_test_store();
    let calls = Arc::new(AtomicUsize::new(0));
    store.set("boards:me", &"cached").expect("set");

    let value: String = store
      .fetch("boards:me", true, counting_producer(&calls, "network"))
      .await
      .expect("fetch");

    assert_eq!(value, "network");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(stored_value(&store, "boards:me").as_deref(), Some("network"));
  }

  #[tokio::test]
  async fn test_fetch_propagates_producer_error() {
    let (store, _temp_dir) = create_test_store();

    let result: Result<String> = store
      .fetch("boards:me", false, || async { Err(eyre!("unauthorized")) })
      .await;

    let err = result.expect_err("error propagates");
    assert_eq!(err.to_string(), "unauthorized");
    assert!(store.get::<String>("boards:me").is_none());
  }

  #[tokio::test]
  async fn test_noop_storage_always_fetches() {
    let store = CacheStore::new(crate::cache::storage::NoopStorage);
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
      let value: String = store
        .fetch("boards:me", false, counting_producer(&calls, "network"))
        .await
        .expect("fetch");
      assert_eq!(value, "network");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
  }
}
