//! Handlers for `/forms` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/forms` | Body: [`SubmitBody`]; returns 201 + submission id |
//! | `GET`    | `/forms` | Optional `formName`, `formType`, `status`, `limit`, `offset` |
//! | `GET`    | `/forms/:id` | Submission plus its flattened field responses |
//! | `PATCH`  | `/forms/:id` | Body: `{"status":"..."}` |
//! | `DELETE` | `/forms/:id` | Removes the submission and its responses |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::IntoResponse,
};
use parish_core::{
  store::SiteStore,
  submission::{NewSubmission, SubmissionQuery, DEFAULT_PAGE_LIMIT},
  validate::normalize_optional,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Submitter network metadata, best-effort: a forwarded-for header chain if
/// one is present, falling back to `"unknown"`.
pub(crate) fn client_meta(headers: &HeaderMap) -> (String, String) {
  let ip = headers
    .get("x-forwarded-for")
    .or_else(|| headers.get("x-client-ip"))
    .and_then(|v| v.to_str().ok())
    .unwrap_or("unknown")
    .to_string();

  let user_agent = headers
    .get(header::USER_AGENT)
    .and_then(|v| v.to_str().ok())
    .unwrap_or("unknown")
    .to_string();

  (ip, user_agent)
}

// ─── Submit ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /forms`. `data` may be a JSON object or a
/// JSON-encoded string of one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBody {
  pub form_name: Option<String>,
  pub form_type: Option<String>,
  pub email:     Option<String>,
  pub name:      Option<String>,
  pub phone:     Option<String>,
  pub data:      Option<Value>,
}

/// `POST /forms` — accept any named form payload.
pub async fn submit<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Json(body): Json<SubmitBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SiteStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let form_name = body.form_name.as_deref().map(str::trim).unwrap_or("");
  let form_type = body.form_type.as_deref().map(str::trim).unwrap_or("");
  let data = match body.data {
    Some(data) if !form_name.is_empty() && !form_type.is_empty() => data,
    _ => {
      return Err(ApiError::BadRequest(
        "Missing required fields: formName, formType, data".into(),
      ));
    }
  };

  // A string payload is a JSON-encoded object from a form that serialised
  // its data; decode it before storage.
  let data = match data {
    Value::String(raw) => serde_json::from_str(&raw)
      .map_err(|_| ApiError::BadRequest("data is not valid JSON".into()))?,
    value => value,
  };

  let (ip_address, user_agent) = client_meta(&headers);

  let submission = state
    .store
    .create_submission(NewSubmission {
      form_name: form_name.to_string(),
      form_type: form_type.to_string(),
      email: normalize_optional(body.email),
      name: normalize_optional(body.name),
      phone: normalize_optional(body.phone),
      data,
      ip_address,
      user_agent,
    })
    .await
    .map_err(|e| ApiError::store("Failed to submit form", e))?;

  tracing::info!(submission_id = %submission.id, form_name = %submission.form_name,
    "form submission saved");

  Ok((
    StatusCode::CREATED,
    Json(json!({
      "success": true,
      "message": "Form submitted successfully",
      "submissionId": submission.id,
    })),
  ))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
  pub form_name: Option<String>,
  pub form_type: Option<String>,
  pub status:    Option<String>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}

/// `GET /forms?formName=&formType=&status=&limit=&offset=`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError>
where
  S: SiteStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let limit = params.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
  let offset = params.offset.unwrap_or(0);

  let page = state
    .store
    .list_submissions(&SubmissionQuery {
      form_name: params.form_name,
      form_type: params.form_type,
      status:    params.status,
      limit:     Some(limit),
      offset:    Some(offset),
    })
    .await
    .map_err(|e| ApiError::store("Failed to fetch submissions", e))?;

  Ok(Json(json!({
    "success": true,
    "submissions": page.submissions,
    "count": page.submissions.len(),
    "total": page.total,
    "offset": offset,
    "limit": limit,
  })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /forms/:id` — the submission plus its flattened field responses.
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError>
where
  S: SiteStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let submission = state
    .store
    .get_submission(id)
    .await
    .map_err(|e| ApiError::store("Failed to fetch submission", e))?
    .ok_or_else(|| ApiError::NotFound(format!("submission {id} not found")))?;

  // The projection is a convenience index; a failed read degrades to an
  // empty list rather than failing the request.
  let field_responses = match state.store.get_field_responses(id).await {
    Ok(responses) => responses,
    Err(e) => {
      tracing::warn!(submission_id = %id, error = %e,
        "failed to fetch field responses");
      Vec::new()
    }
  };

  Ok(Json(json!({
    "success": true,
    "submission": submission,
    "fieldResponses": field_responses,
  })))
}

// ─── Status update ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: Option<String>,
}

/// `PATCH /forms/:id` — body: `{"status":"..."}`.
pub async fn set_status<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Value>, ApiError>
where
  S: SiteStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let status = match body.status.as_deref().map(str::trim) {
    Some(s) if !s.is_empty() => s.to_string(),
    _ => return Err(ApiError::BadRequest("Status is required".into())),
  };

  state
    .store
    .get_submission(id)
    .await
    .map_err(|e| ApiError::store("Failed to update submission", e))?
    .ok_or_else(|| ApiError::NotFound(format!("submission {id} not found")))?;

  let submission = state
    .store
    .set_submission_status(id, &status)
    .await
    .map_err(|e| ApiError::store("Failed to update submission", e))?;

  Ok(Json(json!({
    "success": true,
    "message": "Submission status updated",
    "submission": submission,
  })))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /forms/:id`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError>
where
  S: SiteStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .get_submission(id)
    .await
    .map_err(|e| ApiError::store("Failed to delete submission", e))?
    .ok_or_else(|| ApiError::NotFound(format!("submission {id} not found")))?;

  state
    .store
    .delete_submission(id)
    .await
    .map_err(|e| ApiError::store("Failed to delete submission", e))?;

  Ok(Json(json!({
    "success": true,
    "message": "Submission deleted successfully",
  })))
}
