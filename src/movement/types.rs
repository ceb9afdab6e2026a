use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A card moving from one list to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRecord {
  pub card_name: String,
  pub old_location: String,
  pub new_location: String,
  /// ISO 8601 instant of the move
  pub timestamp: String,
}

/// Borrowed identity of a record; equal keys are the same observation.
pub type IdentityKey<'a> = (&'a str, &'a str, &'a str, &'a str);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
  #[error("invalid timestamp '{timestamp}' on movement of card '{card_name}'")]
  InvalidTimestamp {
    card_name: String,
    timestamp: String,
  },
}

impl MovementRecord {
  pub fn new(
    card_name: impl Into<String>,
    old_location: impl Into<String>,
    new_location: impl Into<String>,
    timestamp: impl Into<String>,
  ) -> Self {
    Self {
      card_name: card_name.into(),
      old_location: old_location.into(),
      new_location: new_location.into(),
      timestamp: timestamp.into(),
    }
  }

  pub fn identity(&self) -> IdentityKey<'_> {
    (
      &self.card_name,
      &self.old_location,
      &self.new_location,
      &self.timestamp,
    )
  }

  /// Parse `timestamp` as an RFC 3339 instant, normalized to UTC.
  pub fn parsed_timestamp(&self) -> Result<DateTime<Utc>, MergeError> {
    DateTime::parse_from_rfc3339(&self.timestamp)
      .map(|dt| dt.with_timezone(&Utc))
      .map_err(|_| MergeError::InvalidTimestamp {
        card_name: self.card_name.clone(),
        timestamp: self.timestamp.clone(),
      })
  }
}
