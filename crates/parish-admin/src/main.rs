//! `parish-admin` — operator CLI for the Parish named-record store.
//!
//! Drives the persistence facade against either backend: the ephemeral
//! in-process store (`--provider memory`, useful for rehearsing an import)
//! or the running site server (`--provider api --url http://…`).
//!
//! # Usage
//!
//! ```
//! parish-admin --provider api --url http://localhost:8080 get "homepage content"
//! parish-admin --config ~/.config/parish/admin.toml backup site-backup.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use parish_core::record::RecordMap;
use parish_facade::{ApiBackend, Facade, LoadOutcome, MemoryBackend, StorageBackend};
use serde::Deserialize;
use serde_json::Value;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "parish-admin", about = "Operator CLI for the Parish data store")]
struct Args {
  /// Path to a TOML config file (provider, url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Storage backend: "memory" or "api".
  #[arg(long, env = "PARISH_PROVIDER")]
  provider: Option<String>,

  /// Base URL of the site server (api provider only).
  #[arg(long, env = "PARISH_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the record stored under KEY.
  Get { key: String },
  /// Store a JSON value under KEY, replacing any prior value.
  Set { key: String, value: String },
  /// Remove the record under KEY.
  Delete { key: String },
  /// Remove every record. Asks for confirmation unless --yes is given.
  Clear {
    #[arg(long)]
    yes: bool,
  },
  /// Print every record as one JSON mapping.
  Export,
  /// Upsert the records in FILE (a JSON mapping) into the store.
  Import { file: PathBuf },
  /// Write a pretty-printed backup of every record to FILE.
  Backup { file: PathBuf },
  /// Restore a backup file previously written by `backup`.
  Restore { file: PathBuf },
  /// Print backend statistics.
  Stats,
  /// Check that a record exists under KEY.
  Validate { key: String },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  provider: String,
  #[serde(default)]
  url:      String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults. The backend is
  // chosen exactly once, here.
  let provider = args
    .provider
    .or_else(|| (!file_cfg.provider.is_empty()).then(|| file_cfg.provider.clone()))
    .unwrap_or_else(|| "memory".to_string());
  let url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| "http://localhost:8080".to_string());

  match provider.as_str() {
    "memory" => run(Facade::new(MemoryBackend::new()), args.command).await,
    "api" => run(Facade::new(ApiBackend::new(url)?), args.command).await,
    other => bail!("unknown provider {other:?} (expected \"memory\" or \"api\")"),
  }
}

// ─── Command dispatch ─────────────────────────────────────────────────────────

async fn run<B: StorageBackend>(facade: Facade<B>, command: Command) -> Result<()> {
  match command {
    Command::Get { key } => match facade.try_load(&key).await {
      LoadOutcome::Found(value) => print_json(&value)?,
      LoadOutcome::Absent => bail!("no data under {key:?}"),
      LoadOutcome::Failed => bail!("read failed — see logs"),
    },

    Command::Set { key, value } => {
      let parsed: Value = serde_json::from_str(&value)
        .with_context(|| format!("value is not valid JSON: {value:?}"))?;
      if !facade.save(&key, &parsed).await {
        bail!("save failed — see logs");
      }
      println!("saved {key:?}");
    }

    Command::Delete { key } => {
      if !facade.delete(&key).await {
        bail!("delete failed — see logs");
      }
      println!("deleted {key:?}");
    }

    Command::Clear { yes } => {
      if !yes && !confirm("This removes every record. Type 'yes' to continue: ")? {
        println!("aborted");
        return Ok(());
      }
      if !facade.clear().await {
        bail!("clear failed — see logs");
      }
      println!("cleared");
    }

    Command::Export => {
      let records = facade.export_data().await;
      print_json(&records)?;
    }

    Command::Import { file } => {
      let raw = std::fs::read_to_string(&file)
        .with_context(|| format!("reading {}", file.display()))?;
      let records: RecordMap =
        serde_json::from_str(&raw).context("file is not a JSON mapping")?;
      if !facade.import_data(&records).await {
        bail!("import failed — see logs");
      }
      println!("imported {} records", records.len());
    }

    Command::Backup { file } => {
      let bytes = facade.backup_to_file().await;
      std::fs::write(&file, bytes)
        .with_context(|| format!("writing {}", file.display()))?;
      println!("backup written to {}", file.display());
    }

    Command::Restore { file } => {
      let bytes = std::fs::read(&file)
        .with_context(|| format!("reading {}", file.display()))?;
      if !facade.restore_from_file(&bytes).await {
        bail!("restore failed — see logs");
      }
      println!("restored from {}", file.display());
    }

    Command::Stats => {
      let stats = facade.statistics().await;
      print_json(&stats)?;
    }

    Command::Validate { key } => {
      let validation = facade.validate_data(&key).await;
      print_json(&validation)?;
      if !validation.is_valid {
        std::process::exit(1);
      }
    }
  }

  Ok(())
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn print_json(value: &impl serde::Serialize) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

/// Prompt on stdout and read one line from stdin.
fn confirm(prompt: &str) -> Result<bool> {
  use std::io::{self, BufRead, Write};
  print!("{prompt}");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim() == "yes")
}
