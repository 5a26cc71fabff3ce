//! Handlers for `/registrations` endpoints.
//!
//! Account creation enforces email format, a minimum password length,
//! password confirmation, and email uniqueness. Passwords are argon2-hashed
//! before the store sees anything; no read path carries hash material.

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use parish_core::{
  registration::{
    NewRegistration, RegistrationOutcome, RegistrationQuery,
    RegistrationSummary, RegistrationUpdate, DEFAULT_REGISTRATION_TYPE,
  },
  store::SiteStore,
  validate::{email_format, normalize_optional, MIN_PASSWORD_LEN},
};
use rand_core::OsRng;
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{AppState, error::ApiError, forms::client_meta};

// ─── Register ─────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /registrations`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
  pub name:              Option<String>,
  pub email:             Option<String>,
  pub phone:             Option<String>,
  pub password:          Option<String>,
  pub confirm_password:  Option<String>,
  pub registration_type: Option<String>,
  pub date_of_birth:     Option<String>,
  pub address:           Option<String>,
  pub city:              Option<String>,
  pub state:             Option<String>,
  pub country:           Option<String>,
  pub postal_code:       Option<String>,
}

/// `POST /registrations` — create a new account.
pub async fn register<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SiteStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let name = body.name.as_deref().map(str::trim).unwrap_or("");
  let email = body.email.as_deref().map(str::trim).unwrap_or("");
  let password = body.password.as_deref().unwrap_or("");

  if name.is_empty() || email.is_empty() || password.is_empty() {
    return Err(ApiError::BadRequest(
      "Missing required fields: name, email, password".into(),
    ));
  }
  if !email_format(email) {
    return Err(ApiError::BadRequest("Invalid email format".into()));
  }
  if password.len() < MIN_PASSWORD_LEN {
    return Err(ApiError::BadRequest(format!(
      "Password must be at least {MIN_PASSWORD_LEN} characters long"
    )));
  }
  if body.confirm_password.as_deref() != Some(password) {
    return Err(ApiError::BadRequest("Passwords do not match".into()));
  }

  let email = email.to_lowercase();

  // Friendly pre-check; the store's unique constraint closes the race.
  let existing = state
    .store
    .find_registration_by_email(&email)
    .await
    .map_err(|e| ApiError::store("Failed to create registration", e))?;
  if existing.is_some() {
    return Err(ApiError::Conflict("Email already registered".into()));
  }

  let salt = SaltString::generate(&mut OsRng);
  let password_hash = Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map_err(|e| {
      ApiError::store("Failed to create registration", HashError(e.to_string()))
    })?
    .to_string();

  let (ip_address, user_agent) = client_meta(&headers);

  let outcome = state
    .store
    .create_registration(NewRegistration {
      name: name.to_string(),
      email,
      phone: normalize_optional(body.phone),
      password_hash,
      registration_type: body
        .registration_type
        .unwrap_or_else(|| DEFAULT_REGISTRATION_TYPE.to_string()),
      date_of_birth: normalize_optional(body.date_of_birth),
      address: normalize_optional(body.address),
      city: normalize_optional(body.city),
      state: normalize_optional(body.state),
      country: normalize_optional(body.country),
      postal_code: normalize_optional(body.postal_code),
      ip_address,
      user_agent,
    })
    .await
    .map_err(|e| ApiError::store("Failed to create registration", e))?;

  let registration = match outcome {
    RegistrationOutcome::Created(r) => r,
    RegistrationOutcome::EmailTaken => {
      return Err(ApiError::Conflict("Email already registered".into()));
    }
  };

  tracing::info!(registration_id = %registration.id, "registration created");

  Ok((
    StatusCode::CREATED,
    Json(json!({
      "success": true,
      "message": "Registration successful! Please verify your email.",
      "user": registration,
      "userId": registration.id,
    })),
  ))
}

/// Argon2's error type does not implement `std::error::Error`; wrap its
/// message so it can ride in [`ApiError::Store`].
#[derive(Debug, thiserror::Error)]
#[error("password hashing failed: {0}")]
struct HashError(String);

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<String>,
  /// Registration type filter; the original API called this `type`.
  #[serde(rename = "type")]
  pub registration_type: Option<String>,
}

/// `GET /registrations?status=&type=` — non-sensitive fields only.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError>
where
  S: SiteStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let registrations = state
    .store
    .list_registrations(&RegistrationQuery {
      status:            params.status,
      registration_type: params.registration_type,
    })
    .await
    .map_err(|e| ApiError::store("Failed to fetch registrations", e))?;

  let summaries: Vec<RegistrationSummary> =
    registrations.iter().map(RegistrationSummary::from).collect();

  Ok(Json(json!({
    "success": true,
    "registrations": summaries,
    "count": summaries.len(),
  })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /registrations/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError>
where
  S: SiteStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let registration = state
    .store
    .get_registration(id)
    .await
    .map_err(|e| ApiError::store("Failed to fetch registration", e))?
    .ok_or_else(|| ApiError::NotFound(format!("registration {id} not found")))?;

  Ok(Json(json!({ "success": true, "registration": registration })))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /registrations/:id` — body: [`RegistrationUpdate`].
pub async fn update_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(update): Json<RegistrationUpdate>,
) -> Result<Json<Value>, ApiError>
where
  S: SiteStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .get_registration(id)
    .await
    .map_err(|e| ApiError::store("Failed to update registration", e))?
    .ok_or_else(|| ApiError::NotFound(format!("registration {id} not found")))?;

  let registration = state
    .store
    .update_registration(id, update)
    .await
    .map_err(|e| ApiError::store("Failed to update registration", e))?;

  Ok(Json(json!({
    "success": true,
    "message": "Registration updated successfully",
    "registration": registration,
  })))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /registrations/:id`
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
    .get_registration(id)
    .await
    .map_err(|e| ApiError::store("Failed to delete registration", e))?
    .ok_or_else(|| ApiError::NotFound(format!("registration {id} not found")))?;

  state
    .store
    .delete_registration(id)
    .await
    .map_err(|e| ApiError::store("Failed to delete registration", e))?;

  Ok(Json(json!({
    "success": true,
    "message": "Registration deleted successfully",
  })))
}
