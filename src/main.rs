use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use tracing::{debug, info};

use cardtrail::cache::{CacheStorage, CacheStore, FileStorage, NoopStorage};
use cardtrail::config::{self, Config, TrelloCredentials};
use cardtrail::logging;
use cardtrail::sink::{FileSink, MovementSink, SheetSink};
use cardtrail::sync;
use cardtrail::trello::{CachedTrelloClient, TrelloClient};

/// How long to wait for background cache refreshes before exiting.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(name = "cardtrail")]
#[command(about = "Record Trello card list moves in a local file and a Google Sheet")]
#[command(version)]
struct Args {
  /// Board id or name
  board: String,

  /// Google Sheets spreadsheet id to mirror the movements into
  spreadsheet: Option<String>,

  /// Ignore cached Trello data and refetch everything
  #[arg(short, long)]
  fresh: bool,

  /// Path to config file (default: $XDG_CONFIG_HOME/cardtrail/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Movement file to write (default: $XDG_DATA_HOME/cardtrail/movements.json)
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Do not read or write the on-disk cache
  #[arg(long)]
  no_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let config = Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config.logging)?;

  let credentials = TrelloCredentials::from_env()?;
  let trello = TrelloClient::new(&config.trello, credentials)?;

  let output = match args.output.clone() {
    Some(path) => path,
    None => config.output.resolved_path()?,
  };
  let mut sinks: Vec<Box<dyn MovementSink>> = vec![Box::new(FileSink::new(output))];
  if let Some(spreadsheet) = args.spreadsheet.as_deref() {
    let sheet = SheetSink::new(&config.sheets, spreadsheet, config::sheets_token()?)?;
    sinks.push(Box::new(sheet));
  }

  if args.no_cache || !config.cache.enabled {
    debug!("cache disabled");
    let cache = CacheStore::new(NoopStorage);
    run(trello, cache, &config, &args, &sinks).await
  } else {
    let storage = FileStorage::new(config.cache.resolved_dir()?);
    let policy = config.cache.policy();
    debug!(
      dir = %storage.dir().display(),
      lifetime_minutes = policy.lifetime().num_minutes(),
      stale_after_minutes = policy.stale_after().num_minutes(),
      "using file cache"
    );
    let cache = CacheStore::new(storage).with_policy(policy);
    run(trello, cache, &config, &args, &sinks).await
  }
}

async fn run<S: CacheStorage>(
  trello: TrelloClient,
  cache: CacheStore<S>,
  config: &Config,
  args: &Args,
  sinks: &[Box<dyn MovementSink>],
) -> Result<()> {
  let client = CachedTrelloClient::new(trello, cache, config.trello.member.as_str())
    .with_force_fresh(args.fresh);

  let result = sync::run(&client, &args.board, sinks).await;
  client.cache().settle(SETTLE_TIMEOUT).await;
  let report = result?;

  for sink in &report.sinks {
    if sink.written {
      println!("{}: added {} (total {})", sink.sink, sink.added, sink.total);
    } else {
      println!("{}: up to date ({} movements)", sink.sink, sink.total);
    }
  }
  info!(
    board = %report.board,
    observed = report.observed,
    sinks = report.sinks.len(),
    "sync complete"
  );

  Ok(())
}
