//! The [`Facade`] wrapper — error-swallowing convenience over any backend.

use chrono::{DateTime, Utc};
use parish_core::record::RecordMap;
use serde::Serialize;
use serde_json::Value;

use crate::backend::StorageBackend;

/// The tagged result of a load, for call sites that need to tell an absent
/// record from a broken backend. [`Facade::load`] collapses all three arms
/// into the caller's default.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
  Found(Value),
  Absent,
  Failed,
}

/// Result of [`Facade::validate_data`] — an existence check, not a schema
/// validator.
#[derive(Debug, Clone, Serialize)]
pub struct Validation {
  pub is_valid: bool,
  pub errors:   Vec<String>,
}

/// Best-effort introspection from [`Facade::statistics`]. The size fields are
/// only present for backends that can count locally.
#[derive(Debug, Clone, Serialize)]
pub struct Statistics {
  pub provider:    &'static str,
  pub timestamp:   DateTime<Utc>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub total_items: Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub total_size:  Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub keys:        Option<Vec<String>>,
}

// ─── Facade ──────────────────────────────────────────────────────────────────

/// Uniform save/load/delete/export/import interface over a [`StorageBackend`].
///
/// Every operation catches backend errors, logs them, and returns a safe
/// default — callers never need error handling, and correspondingly cannot
/// distinguish failure causes without the logs (or [`Facade::try_load`]).
pub struct Facade<B> {
  backend: B,
}

impl<B: StorageBackend> Facade<B> {
  pub fn new(backend: B) -> Self { Self { backend } }

  pub fn provider(&self) -> &'static str { self.backend.provider() }

  /// Store `value` under `key`, replacing any prior value wholesale.
  /// Returns `false` on failure; never raises.
  pub async fn save(&self, key: &str, value: &Value) -> bool {
    match self.backend.put(key, value).await {
      Ok(()) => true,
      Err(e) => {
        tracing::error!(key, error = %e, "error saving data");
        false
      }
    }
  }

  /// Load the value under `key` with absence and failure kept apart.
  pub async fn try_load(&self, key: &str) -> LoadOutcome {
    match self.backend.get(key).await {
      Ok(Some(value)) => LoadOutcome::Found(value),
      Ok(None) => LoadOutcome::Absent,
      Err(e) => {
        tracing::error!(key, error = %e, "error loading data");
        LoadOutcome::Failed
      }
    }
  }

  /// Load the value under `key`, or `default` when the key was never saved
  /// or the backend failed. The two cases are indistinguishable here.
  pub async fn load(&self, key: &str, default: Value) -> Value {
    match self.try_load(key).await {
      LoadOutcome::Found(value) => value,
      LoadOutcome::Absent | LoadOutcome::Failed => default,
    }
  }

  /// Remove `key`. Returns `true` even when the key did not exist.
  pub async fn delete(&self, key: &str) -> bool {
    match self.backend.remove(key).await {
      Ok(()) => true,
      Err(e) => {
        tracing::error!(key, error = %e, "error deleting data");
        false
      }
    }
  }

  /// Remove every record. Irreversible; confirmation is the caller's job.
  pub async fn clear(&self) -> bool {
    match self.backend.clear().await {
      Ok(()) => true,
      Err(e) => {
        tracing::error!(error = %e, "error clearing data");
        false
      }
    }
  }

  /// Every record currently stored, or an empty mapping on failure.
  pub async fn export_data(&self) -> RecordMap {
    match self.backend.export().await {
      Ok(records) => records,
      Err(e) => {
        tracing::error!(error = %e, "error exporting data");
        RecordMap::new()
      }
    }
  }

  /// Upsert each entry of `records`; existing keys are overwritten, keys
  /// absent from the mapping are untouched.
  pub async fn import_data(&self, records: &RecordMap) -> bool {
    match self.backend.import(records).await {
      Ok(()) => true,
      Err(e) => {
        tracing::error!(error = %e, "error importing data");
        false
      }
    }
  }

  /// The full export, pretty-printed — the payload of a backup download.
  pub async fn backup_to_file(&self) -> Vec<u8> {
    let records = self.export_data().await;
    serde_json::to_vec_pretty(&records).unwrap_or_else(|_| b"{}".to_vec())
  }

  /// Parse a backup produced by [`Facade::backup_to_file`] and import it.
  /// Returns `false` when the bytes are not a JSON object.
  pub async fn restore_from_file(&self, bytes: &[u8]) -> bool {
    let records: RecordMap = match serde_json::from_slice(bytes) {
      Ok(records) => records,
      Err(e) => {
        tracing::error!(error = %e, "error restoring from file");
        return false;
      }
    };
    self.import_data(&records).await
  }

  /// Minimal existence check for `key`.
  pub async fn validate_data(&self, key: &str) -> Validation {
    let errors = match self.try_load(key).await {
      LoadOutcome::Found(_) => Vec::new(),
      LoadOutcome::Absent => vec!["Data not found".to_string()],
      LoadOutcome::Failed => vec!["Data could not be read".to_string()],
    };
    Validation { is_valid: errors.is_empty(), errors }
  }

  /// Backend introspection, best-effort; shape varies by backend.
  pub async fn statistics(&self) -> Statistics {
    let local = self.backend.local_stats();
    Statistics {
      provider:    self.backend.provider(),
      timestamp:   Utc::now(),
      total_items: local.as_ref().map(|s| s.total_items),
      total_size:  local.as_ref().map(|s| s.total_size),
      keys:        local.map(|s| s.keys),
    }
  }
}
