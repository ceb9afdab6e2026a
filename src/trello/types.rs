use serde::{Deserialize, Serialize};

use crate::movement::MovementRecord;

/// Board summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
  pub id: String,
  pub name: String,
  pub closed: bool,
}

/// An action recorded on a board, reduced to what movement tracking needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardAction {
  pub id: String,
  pub action_type: String,
  /// ISO 8601 time of the action
  pub date: String,
  pub card_name: String,
  /// List the card left, for list moves
  pub list_before: Option<String>,
  /// List the card entered, for list moves
  pub list_after: Option<String>,
}

impl CardAction {
  /// The list move this action records, if it is one.
  pub fn movement(&self) -> Option<MovementRecord> {
    if self.action_type != "updateCard" {
      return None;
    }
    match (&self.list_before, &self.list_after) {
      (Some(before), Some(after)) => Some(MovementRecord::new(
        self.card_name.clone(),
        before.clone(),
        after.clone(),
        self.date.clone(),
      )),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn action(action_type: &str, before: Option<&str>, after: Option<&str>) -> CardAction {
    CardAction {
      id: "a1".to_string(),
      action_type: action_type.to_string(),
      date: "2024-03-14T12:00:00.000Z".to_string(),
      card_name: "Write docs".to_string(),
      list_before: before.map(String::from),
      list_after: after.map(String::from),
    }
  }

  #[test]
  fn test_list_move_becomes_movement() {
    let movement = action("updateCard", Some("Doing"), Some("Done"))
      .movement()
      .expect("movement");
    assert_eq!(
      movement,
      MovementRecord::new("Write docs", "Doing", "Done", "2024-03-14T12:00:00.000Z")
    );
  }

  #[test]
  fn test_other_actions_ignored() {
    assert!(action("updateCard", None, None).movement().is_none());
    assert!(action("updateCard", Some("Doing"), None).movement().is_none());
    assert!(action("createCard", Some("Doing"), Some("Done")).movement().is_none());
  }
}
