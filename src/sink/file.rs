use color_eyre::{eyre::eyre, Result};
use futures::future::{BoxFuture, FutureExt};
use std::io;
use std::path::PathBuf;

use super::MovementSink;
use crate::movement::MovementRecord;

/// Movement collection stored as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct FileSink {
  path: PathBuf,
}

impl FileSink {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  async fn read(&self) -> Result<Vec<MovementRecord>> {
    let contents = match tokio::fs::read_to_string(&self.path).await {
      Ok(contents) => contents,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(eyre!("Failed to read {}: {}", self.path.display(), e)),
    };

    if contents.trim().is_empty() {
      return Ok(Vec::new());
    }

    serde_json::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse {}: {}", self.path.display(), e))
  }

  async fn write(&self, records: &[MovementRecord]) -> Result<()> {
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| eyre!("Failed to create directory {}: {}", parent.display(), e))?;
    }

    let mut json = serde_json::to_string_pretty(records)
      .map_err(|e| eyre!("Failed to serialize movements: {}", e))?;
    json.push('\n');

    // Write beside the target and rename so readers never see a partial file
    let tmp = self.path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json)
      .await
      .map_err(|e| eyre!("Failed to write {}: {}", tmp.display(), e))?;
    tokio::fs::rename(&tmp, &self.path)
      .await
      .map_err(|e| eyre!("Failed to replace {}: {}", self.path.display(), e))
  }
}

impl MovementSink for FileSink {
  fn name(&self) -> String {
    format!("file {}", self.path.display())
  }

  fn read_all(&self) -> BoxFuture<'_, Result<Vec<MovementRecord>>> {
    self.read().boxed()
  }

  fn write_all<'a>(&'a self, records: &'a [MovementRecord]) -> BoxFuture<'a, Result<()>> {
    self.write(records).boxed()
  }
}
