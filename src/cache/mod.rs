//! Time-based staleness cache backed by durable storage.
//!
//! Every entry carries its write time. On read, an entry is:
//! - fresh (age <= stale_after): served as-is
//! - stale (stale_after < age <= lifetime): served, and refreshed in the background
//! - expired (age > lifetime): deleted and reported as absent
//!
//! Read faults and corrupt entries are misses, never errors; the cache is an
//! optimization over the remote API, not a source of truth.

mod policy;
mod storage;
mod store;

pub use policy::{CachePolicy, Freshness};
pub use storage::{CacheStorage, FileStorage, NoopStorage, StoredEntry};
pub use store::{CacheError, CacheStore};
