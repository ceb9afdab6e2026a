//! One sync run: fetch a board's card movements and reconcile every sink with them.

use color_eyre::{eyre::eyre, Result};
use tracing::info;

use crate::cache::CacheStorage;
use crate::movement::{merge, MovementRecord};
use crate::sink::MovementSink;
use crate::trello::CachedTrelloClient;

/// Outcome of reconciling one sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReport {
  pub sink: String,
  /// Movements that were not in the sink before
  pub added: usize,
  /// Size of the collection the sink now holds
  pub total: usize,
  /// Whether the sink was rewritten; false when nothing was new
  pub written: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
  pub board: String,
  /// Movements derived from the board's actions
  pub observed: usize,
  pub sinks: Vec<SinkReport>,
}

/// Resolve `board_identifier`, derive its movements and reconcile each sink in turn.
///
/// The first failing sink aborts the run.
pub async fn run<S: CacheStorage>(
  client: &CachedTrelloClient<S>,
  board_identifier: &str,
  sinks: &[Box<dyn MovementSink>],
) -> Result<SyncReport> {
  let board = client.resolve_board(board_identifier).await?;
  let movements = client.get_movements(&board).await?;

  let mut reports = Vec::with_capacity(sinks.len());
  for sink in sinks {
    reports.push(reconcile(sink.as_ref(), &movements).await?);
  }

  Ok(SyncReport {
    board: board.name,
    observed: movements.len(),
    sinks: reports,
  })
}

/// Merge `incoming` into whatever `sink` holds and persist the result.
///
/// Nothing is written when every incoming movement is already present.
pub async fn reconcile(sink: &dyn MovementSink, incoming: &[MovementRecord]) -> Result<SinkReport> {
  let name = sink.name();
  let existing = sink.read_all().await?;

  let outcome = merge(existing, incoming.to_vec())
    .map_err(|e| eyre!("Failed to merge movements into {}: {}", name, e))?;

  if outcome.is_unchanged() {
    info!(sink = %name, total = outcome.records.len(), "no new movements, skipping write");
    return Ok(SinkReport {
      sink: name,
      added: 0,
      total: outcome.records.len(),
      written: false,
    });
  }

  sink.write_all(&outcome.records).await?;
  info!(
    sink = %name,
    added = outcome.added,
    total = outcome.records.len(),
    "wrote movements"
  );

  Ok(SinkReport {
    sink: name,
    added: outcome.added,
    total: outcome.records.len(),
    written: true,
  })
}
