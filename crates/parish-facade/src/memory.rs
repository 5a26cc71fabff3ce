//! [`MemoryBackend`] — the ephemeral per-process store.
//!
//! The Rust counterpart of per-device browser storage: records live only as
//! long as the process and are never shared between processes.

use std::sync::{Mutex, PoisonError};

use parish_core::record::RecordMap;
use serde_json::Value;

use crate::{
  backend::{LocalStats, StorageBackend},
  error::BackendError,
};

#[derive(Debug, Default)]
pub struct MemoryBackend {
  records: Mutex<RecordMap>,
}

impl MemoryBackend {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> std::sync::MutexGuard<'_, RecordMap> {
    // A poisoned map is still a usable map.
    self.records.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl StorageBackend for MemoryBackend {
  fn provider(&self) -> &'static str { "memory" }

  async fn put(&self, key: &str, value: &Value) -> Result<(), BackendError> {
    self.lock().insert(key.to_string(), value.clone());
    Ok(())
  }

  async fn get(&self, key: &str) -> Result<Option<Value>, BackendError> {
    Ok(self.lock().get(key).cloned())
  }

  async fn remove(&self, key: &str) -> Result<(), BackendError> {
    self.lock().remove(key);
    Ok(())
  }

  async fn clear(&self) -> Result<(), BackendError> {
    self.lock().clear();
    Ok(())
  }

  async fn export(&self) -> Result<RecordMap, BackendError> {
    Ok(self.lock().clone())
  }

  async fn import(&self, records: &RecordMap) -> Result<(), BackendError> {
    let mut guard = self.lock();
    for (key, value) in records {
      guard.insert(key.clone(), value.clone());
    }
    Ok(())
  }

  fn local_stats(&self) -> Option<LocalStats> {
    let guard = self.lock();
    Some(LocalStats {
      total_items: guard.len(),
      total_size:  guard.values().map(|v| v.to_string().len()).sum(),
      keys:        guard.keys().cloned().collect(),
    })
  }
}
