//! Serde-deserializable types matching Trello API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::Deserialize;

use super::types::{Board, CardAction};

// ============================================================================
// Common nested field types
// ============================================================================

/// Any `{id, name}` reference embedded in action data (card, list, board).
#[derive(Debug, Deserialize)]
pub struct ApiNamedRef {
  pub id: String,
  #[serde(default)]
  pub name: String,
}

// ============================================================================
// Boards endpoint response
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiBoard {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub closed: bool,
}

// ============================================================================
// Board actions endpoint response
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiActionData {
  pub card: Option<ApiNamedRef>,
  pub list_before: Option<ApiNamedRef>,
  pub list_after: Option<ApiNamedRef>,
}

#[derive(Debug, Deserialize)]
pub struct ApiAction {
  pub id: String,
  #[serde(rename = "type")]
  pub action_type: String,
  pub date: String,
  #[serde(default)]
  pub data: ApiActionData,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl From<ApiBoard> for Board {
  fn from(board: ApiBoard) -> Self {
    Board {
      id: board.id,
      name: board.name,
      closed: board.closed,
    }
  }
}

impl From<ApiAction> for CardAction {
  fn from(action: ApiAction) -> Self {
    let data = action.data;
    CardAction {
      id: action.id,
      action_type: action.action_type,
      date: action.date,
      card_name: data.card.map(|c| c.name).unwrap_or_default(),
      list_before: data.list_before.map(|l| l.name),
      list_after: data.list_after.map(|l| l.name),
    }
  }
}
