//! Cached Trello client that wraps TrelloClient with transparent caching.

use color_eyre::{eyre::eyre, Result};
use tracing::{debug, info};

use crate::cache::{CacheStorage, CacheStore, FileStorage};
use crate::movement::MovementRecord;

use super::cache::TrelloQueryKey;
use super::client::TrelloClient;
use super::types::{Board, CardAction};

/// Trello client with transparent caching support.
///
/// Reads go through the staleness cache: fresh entries are served directly,
/// stale ones are served and refreshed in the background, and misses (or any
/// read when `force_fresh` is set) hit the API and repopulate the cache.
pub struct CachedTrelloClient<S: CacheStorage = FileStorage> {
  inner: TrelloClient,
  cache: CacheStore<S>,
  member: String,
  force_fresh: bool,
}

impl<S: CacheStorage> CachedTrelloClient<S> {
  pub fn new(inner: TrelloClient, cache: CacheStore<S>, member: impl Into<String>) -> Self {
    Self {
      inner,
      cache,
      member: member.into(),
      force_fresh: false,
    }
  }

  /// Bypass cached values and always refetch.
  pub fn with_force_fresh(mut self, force_fresh: bool) -> Self {
    self.force_fresh = force_fresh;
    self
  }

  pub fn cache(&self) -> &CacheStore<S> {
    &self.cache
  }

  /// Get the member's boards with caching.
  pub async fn get_boards(&self) -> Result<Vec<Board>> {
    let query_key = TrelloQueryKey::Boards {
      member: self.member.clone(),
    };
    debug!(query = %query_key.description(), "loading");
    let inner = self.inner.clone();
    let member = self.member.clone();

    self
      .cache
      .fetch(&query_key.cache_key(), self.force_fresh, move || async move {
        inner.get_boards(&member).await
      })
      .await
  }

  /// Get list-move actions for a board with caching.
  pub async fn get_board_actions(&self, board_id: &str) -> Result<Vec<CardAction>> {
    let query_key = TrelloQueryKey::BoardActions {
      board_id: board_id.to_string(),
    };
    debug!(query = %query_key.description(), "loading");
    let inner = self.inner.clone();
    let board_id = board_id.to_string();

    self
      .cache
      .fetch(&query_key.cache_key(), self.force_fresh, move || async move {
        inner.get_board_actions(&board_id).await
      })
      .await
  }

  /// Find a board by id, or by case-insensitive name among open boards.
  pub async fn resolve_board(&self, identifier: &str) -> Result<Board> {
    let boards = self.get_boards().await?;

    if let Some(board) = boards.iter().find(|b| b.id == identifier) {
      return Ok(board.clone());
    }

    let mut by_name = boards
      .into_iter()
      .filter(|b| !b.closed && b.name.eq_ignore_ascii_case(identifier));
    match (by_name.next(), by_name.next()) {
      (Some(board), None) => Ok(board),
      (Some(_), Some(_)) => Err(eyre!(
        "Board name '{}' is ambiguous; pass the board id instead",
        identifier
      )),
      (None, _) => Err(eyre!("No open board matches '{}'", identifier)),
    }
  }

  /// Movement records derived from a board's list-move actions.
  pub async fn get_movements(&self, board: &Board) -> Result<Vec<MovementRecord>> {
    let actions = self.get_board_actions(&board.id).await?;
    let movements: Vec<MovementRecord> = actions.iter().filter_map(CardAction::movement).collect();
    info!(
      board = %board.name,
      actions = actions.len(),
      movements = movements.len(),
      "derived card movements"
    );
    Ok(movements)
  }
}
