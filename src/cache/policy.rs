//! Age thresholds deciding whether a cached entry is served, refreshed, or dropped.

use chrono::Duration;

/// Freshness class of a cached entry, derived from its age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
  /// Served as-is, no side effects
  Fresh,
  /// Served, but due for a background refresh
  Stale,
  /// Past the lifetime; treated as absent and evicted
  Expired,
}

/// Lifetime and staleness thresholds for cache entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
  lifetime: Duration,
  stale_after: Duration,
}

impl Default for CachePolicy {
  fn default() -> Self {
    Self {
      lifetime: Duration::hours(24),
      stale_after: Duration::hours(1),
    }
  }
}

impl CachePolicy {
  /// Create a policy. A `stale_after` longer than `lifetime` is clamped to `lifetime`.
  pub fn new(lifetime: Duration, stale_after: Duration) -> Self {
    Self {
      lifetime,
      stale_after: stale_after.min(lifetime),
    }
  }

  pub fn lifetime(&self) -> Duration {
    self.lifetime
  }

  pub fn stale_after(&self) -> Duration {
    self.stale_after
  }

  /// Classify an entry by its age.
  ///
  /// Both bounds are inclusive on the younger side: an entry exactly
  /// `stale_after` old is still fresh, one exactly `lifetime` old is still stale.
  pub fn classify(&self, age: Duration) -> Freshness {
    if age > self.lifetime {
      Freshness::Expired
    } else if age > self.stale_after {
      Freshness::Stale
    } else {
      Freshness::Fresh
    }
  }
}
