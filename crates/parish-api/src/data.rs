//! Handlers for `/data` endpoints — the server side of the persistence
//! facade's remote backend.
//!
//! Success and failure are signalled by HTTP status alone; `GET /data/:key`
//! returns the raw stored JSON.

use axum::{
  Json,
  extract::{Path, State},
};
use parish_core::{record::RecordMap, store::SiteStore};
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};

/// `POST /data/:key` — save the request body under `key`, replacing any
/// prior value wholesale.
pub async fn save<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
  Json(value): Json<Value>,
) -> Result<Json<Value>, ApiError>
where
  S: SiteStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .put_record(&key, &value)
    .await
    .map_err(|e| ApiError::store("Failed to save data", e))?;
  Ok(Json(json!({ "success": true })))
}

/// `GET /data/:key` — the raw stored JSON, or 404.
pub async fn load<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  S: SiteStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let value = state
    .store
    .get_record(&key)
    .await
    .map_err(|e| ApiError::store("Failed to retrieve data", e))?
    .ok_or_else(|| ApiError::NotFound(format!("no data under {key:?}")))?;
  Ok(Json(value))
}

/// `DELETE /data/:key` — idempotent.
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(key): Path<String>,
) -> Result<Json<Value>, ApiError>
where
  S: SiteStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .delete_record(&key)
    .await
    .map_err(|e| ApiError::store("Failed to delete data", e))?;
  Ok(Json(json!({ "success": true })))
}

/// `POST /data/clear` — remove every named record.
pub async fn clear<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Value>, ApiError>
where
  S: SiteStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .clear_records()
    .await
    .map_err(|e| ApiError::store("Failed to clear data", e))?;
  Ok(Json(json!({ "success": true })))
}

/// `GET /data/export` — mapping of every key to its stored value.
pub async fn export<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<RecordMap>, ApiError>
where
  S: SiteStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let records = state
    .store
    .export_records()
    .await
    .map_err(|e| ApiError::store("Failed to export data", e))?;
  Ok(Json(records))
}

/// `POST /data/import` — additive upsert of the posted mapping.
pub async fn import<S>(
  State(state): State<AppState<S>>,
  Json(records): Json<RecordMap>,
) -> Result<Json<Value>, ApiError>
where
  S: SiteStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .import_records(&records)
    .await
    .map_err(|e| ApiError::store("Failed to import data", e))?;
  Ok(Json(json!({ "success": true })))
}
