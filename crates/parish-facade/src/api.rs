//! [`ApiBackend`] — named records stored behind the remote `/api/data`
//! service.
//!
//! Save, load and delete map to HTTP verbs on a per-key resource path;
//! success and failure are signalled by status alone, and a read returns the
//! raw stored JSON.

use std::time::Duration;

use parish_core::record::RecordMap;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{backend::StorageBackend, error::BackendError};

pub struct ApiBackend {
  client:   Client,
  base_url: String,
}

impl ApiBackend {
  /// `base_url` is the server root, e.g. `http://localhost:8080`.
  pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api/data{}", self.base_url.trim_end_matches('/'), path)
  }
}

impl StorageBackend for ApiBackend {
  fn provider(&self) -> &'static str { "api" }

  async fn put(&self, key: &str, value: &Value) -> Result<(), BackendError> {
    let resp = self
      .client
      .post(self.url(&format!("/{key}")))
      .json(value)
      .send()
      .await?;
    if !resp.status().is_success() {
      return Err(BackendError::Status(resp.status()));
    }
    Ok(())
  }

  async fn get(&self, key: &str) -> Result<Option<Value>, BackendError> {
    let resp = self.client.get(self.url(&format!("/{key}"))).send().await?;
    match resp.status() {
      StatusCode::NOT_FOUND => Ok(None),
      status if status.is_success() => Ok(Some(resp.json().await?)),
      status => Err(BackendError::Status(status)),
    }
  }

  async fn remove(&self, key: &str) -> Result<(), BackendError> {
    let resp = self
      .client
      .delete(self.url(&format!("/{key}")))
      .send()
      .await?;
    if !resp.status().is_success() {
      return Err(BackendError::Status(resp.status()));
    }
    Ok(())
  }

  async fn clear(&self) -> Result<(), BackendError> {
    let resp = self.client.post(self.url("/clear")).send().await?;
    if !resp.status().is_success() {
      return Err(BackendError::Status(resp.status()));
    }
    Ok(())
  }

  async fn export(&self) -> Result<RecordMap, BackendError> {
    let resp = self.client.get(self.url("/export")).send().await?;
    if !resp.status().is_success() {
      return Err(BackendError::Status(resp.status()));
    }
    Ok(resp.json().await?)
  }

  async fn import(&self, records: &RecordMap) -> Result<(), BackendError> {
    let resp = self
      .client
      .post(self.url("/import"))
      .json(records)
      .send()
      .await?;
    if !resp.status().is_success() {
      return Err(BackendError::Status(resp.status()));
    }
    Ok(())
  }
}
