use color_eyre::{eyre::eyre, Result};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::{TrelloConfig, TrelloCredentials};

use super::api_types::{ApiAction, ApiBoard};
use super::types::{Board, CardAction};

/// Largest page the actions endpoint serves.
const MAX_PAGE_SIZE: usize = 1000;

/// Trello REST API client
#[derive(Clone)]
pub struct TrelloClient {
  http: reqwest::Client,
  base_url: String,
  credentials: TrelloCredentials,
  page_size: usize,
}

impl TrelloClient {
  pub fn new(config: &TrelloConfig, credentials: TrelloCredentials) -> Result<Self> {
    let http = reqwest::Client::builder()
      .user_agent(concat!("cardtrail/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url: config.url.trim_end_matches('/').to_string(),
      credentials,
      page_size: MAX_PAGE_SIZE,
    })
  }

  #[cfg(test)]
  pub fn with_page_size(mut self, page_size: usize) -> Self {
    self.page_size = page_size;
    self
  }

  /// Build an authenticated endpoint URL.
  fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/{}", self.base_url, path.trim_start_matches('/')))
      .map_err(|e| eyre!("Invalid Trello URL for {}: {}", path, e))?;
    url
      .query_pairs_mut()
      .extend_pairs(params)
      .append_pair("key", &self.credentials.key)
      .append_pair("token", &self.credentials.token);
    Ok(url)
  }

  async fn get_json<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T> {
    // without_url keeps the token out of error messages
    let response = self
      .http
      .get(url)
      .send()
      .await
      .map_err(|e| eyre!("Failed to get {}: {}", what, e.without_url()))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(eyre!(
        "Failed to get {}: Trello returned {}: {}",
        what,
        status,
        body.trim()
      ));
    }

    response
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse {}: {}", what, e.without_url()))
  }

  /// Get all boards visible to a member
  pub async fn get_boards(&self, member: &str) -> Result<Vec<Board>> {
    let url = self.endpoint(
      &format!("members/{}/boards", member),
      &[("fields", "name,closed")],
    )?;

    let boards: Vec<ApiBoard> = self.get_json(url, "boards").await?;
    Ok(boards.into_iter().map(Board::from).collect())
  }

  /// Get every list-move action on a board, newest first
  pub async fn get_board_actions(&self, board_id: &str) -> Result<Vec<CardAction>> {
    let mut all_actions: Vec<CardAction> = Vec::new();
    let limit = self.page_size.to_string();
    let mut before: Option<String> = None;

    loop {
      let mut params = vec![("filter", "updateCard:idList"), ("limit", limit.as_str())];
      if let Some(id) = before.as_deref() {
        params.push(("before", id));
      }
      let url = self.endpoint(&format!("boards/{}/actions", board_id), &params)?;

      let page: Vec<ApiAction> = self.get_json(url, "board actions").await?;
      let page_len = page.len();
      debug!(board_id, page_len, "fetched actions page");

      before = page.last().map(|action| action.id.clone());
      all_actions.extend(page.into_iter().map(CardAction::from));

      // A short page is the last one
      if page_len < self.page_size || before.is_none() {
        break;
      }
    }

    Ok(all_actions)
  }
}
