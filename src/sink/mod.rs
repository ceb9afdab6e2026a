//! Durable destinations for the movement collection.
//!
//! Sinks are always read in full and rewritten in full; they never append.

mod file;
mod sheets;

pub use file::FileSink;
pub use sheets::SheetSink;

use color_eyre::Result;
use futures::future::BoxFuture;

use crate::movement::MovementRecord;

/// A destination holding the complete movement collection.
pub trait MovementSink: Send + Sync {
  /// Human-readable name for logs and reports.
  fn name(&self) -> String;

  /// Read the whole persisted collection. Nothing persisted yet is an empty collection.
  fn read_all(&self) -> BoxFuture<'_, Result<Vec<MovementRecord>>>;

  /// Replace the persisted collection with `records`.
  fn write_all<'a>(&'a self, records: &'a [MovementRecord]) -> BoxFuture<'a, Result<()>>;
}
