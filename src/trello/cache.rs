//! Cache keys for Trello API calls.

/// Query key types for Trello API calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrelloQueryKey {
  /// Boards visible to a member
  Boards { member: String },
  /// Card actions recorded on a board
  BoardActions { board_id: String },
}

impl TrelloQueryKey {
  /// Key the cached response is stored under.
  pub fn cache_key(&self) -> String {
    match self {
      Self::Boards { member } => format!("boards:{}", member),
      Self::BoardActions { board_id } => format!("actions:{}", board_id),
    }
  }

  pub fn description(&self) -> String {
    match self {
      Self::Boards { member } => format!("boards of {}", member),
      Self::BoardActions { board_id } => format!("actions on board {}", board_id),
    }
  }
}
