use color_eyre::{eyre::eyre, Result};
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use super::MovementSink;
use crate::config::SheetsConfig;
use crate::movement::MovementRecord;

/// Header row written above the movement rows.
const HEADER: [&str; 4] = ["Card", "From", "To", "Timestamp"];

#[derive(Debug, Deserialize)]
struct ApiValueRange {
  #[serde(default)]
  values: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiValueRangeUpdate<'a> {
  range: &'a str,
  major_dimension: &'static str,
  values: Vec<Vec<&'a str>>,
}

/// Movement collection stored as rows of a Google Sheets tab.
pub struct SheetSink {
  http: reqwest::Client,
  base_url: String,
  spreadsheet_id: String,
  tab: String,
  token: String,
}

impl SheetSink {
  pub fn new(config: &SheetsConfig, spreadsheet_id: impl Into<String>, token: String) -> Result<Self> {
    let http = reqwest::Client::builder()
      .user_agent(concat!("cardtrail/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url: config.url.trim_end_matches('/').to_string(),
      spreadsheet_id: spreadsheet_id.into(),
      tab: config.tab.clone(),
      token,
    })
  }

  /// A1 range covering the four movement columns.
  fn columns_range(&self) -> String {
    a1_range(&self.tab, "A:D")
  }

  /// URL of `.../{spreadsheet}/values/{range}{suffix}`, with the range percent-encoded.
  fn values_url(&self, range: &str, suffix: &str) -> Result<Url> {
    let mut url =
      Url::parse(&self.base_url).map_err(|e| eyre!("Invalid Sheets URL {}: {}", self.base_url, e))?;
    url
      .path_segments_mut()
      .map_err(|()| eyre!("Sheets URL cannot have path segments: {}", self.base_url))?
      .push(&self.spreadsheet_id)
      .push("values")
      .push(&format!("{}{}", range, suffix));
    Ok(url)
  }

  async fn check(response: reqwest::Response, what: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(eyre!(
      "Failed to {}: Sheets returned {}: {}",
      what,
      status,
      body.trim()
    ))
  }

  async fn read(&self) -> Result<Vec<MovementRecord>> {
    let url = self.values_url(&self.columns_range(), "")?;
    let response = self
      .http
      .get(url)
      .bearer_auth(&self.token)
      .send()
      .await
      .map_err(|e| eyre!("Failed to read sheet: {}", e))?;
    let range: ApiValueRange = Self::check(response, "read sheet")
      .await?
      .json()
      .await
      .map_err(|e| eyre!("Failed to parse sheet values: {}", e))?;

    Ok(parse_rows(&range.values))
  }

  /// Overwrite the tab with header + `records`, then clear whatever lies below.
  ///
  /// Rows are written before anything is cleared, so a failed write leaves the
  /// previous collection in place.
  async fn write(&self, records: &[MovementRecord]) -> Result<()> {
    let start = a1_range(&self.tab, "A1");
    let mut url = self.values_url(&start, "")?;
    url.query_pairs_mut().append_pair("valueInputOption", "RAW");

    let mut values: Vec<Vec<&str>> = Vec::with_capacity(records.len() + 1);
    values.push(HEADER.to_vec());
    values.extend(records.iter().map(|r| {
      vec![
        r.card_name.as_str(),
        r.old_location.as_str(),
        r.new_location.as_str(),
        r.timestamp.as_str(),
      ]
    }));
    let body = ApiValueRangeUpdate {
      range: &start,
      major_dimension: "ROWS",
      values,
    };

    let response = self
      .http
      .put(url)
      .bearer_auth(&self.token)
      .json(&body)
      .send()
      .await
      .map_err(|e| eyre!("Failed to write sheet: {}", e))?;
    Self::check(response, "write sheet").await?;

    // Header is row 1, so the first row past the collection is len + 2
    let tail = a1_range(&self.tab, &format!("A{}:D", records.len() + 2));
    if let Err(e) = self.clear(&tail).await {
      warn!(range = %tail, error = %e, "collection written but trailing rows not cleared");
    }
    Ok(())
  }

  async fn clear(&self, range: &str) -> Result<()> {
    let url = self.values_url(range, ":clear")?;
    let response = self
      .http
      .post(url)
      .bearer_auth(&self.token)
      .json(&serde_json::json!({}))
      .send()
      .await
      .map_err(|e| eyre!("Failed to clear sheet: {}", e))?;
    Self::check(response, "clear sheet").await?;
    Ok(())
  }
}

impl MovementSink for SheetSink {
  fn name(&self) -> String {
    format!("sheet {}/{}", self.spreadsheet_id, self.tab)
  }

  fn read_all(&self) -> BoxFuture<'_, Result<Vec<MovementRecord>>> {
    self.read().boxed()
  }

  fn write_all<'a>(&'a self, records: &'a [MovementRecord]) -> BoxFuture<'a, Result<()>> {
    self.write(records).boxed()
  }
}

/// Turn sheet rows into records, skipping the header, blank rows and short rows.
fn parse_rows(rows: &[Vec<String>]) -> Vec<MovementRecord> {
  let mut records = Vec::with_capacity(rows.len());
  for (index, row) in rows.iter().enumerate() {
    if index == 0 && is_header(row) {
      continue;
    }
    if row.iter().all(|cell| cell.trim().is_empty()) {
      continue;
    }
    match row.as_slice() {
      [card, from, to, timestamp, ..] => records.push(MovementRecord::new(
        card.as_str(),
        from.as_str(),
        to.as_str(),
        timestamp.as_str(),
      )),
      // Sheets numbers rows from 1
      _ => warn!(row = index + 1, cells = row.len(), "skipping incomplete sheet row"),
    }
  }
  records
}

/// A1 notation for `cells` on `tab`, quoting the tab name so any name is safe.
fn a1_range(tab: &str, cells: &str) -> String {
  format!("'{}'!{}", tab.replace('\'', "''"), cells)
}

fn is_header(row: &[String]) -> bool {
  row.len() >= HEADER.len()
    && row
      .iter()
      .zip(HEADER)
      .all(|(cell, name)| cell.trim().eq_ignore_ascii_case(name))
}
