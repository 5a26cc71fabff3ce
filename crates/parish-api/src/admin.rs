//! Demo admin credential check.
//!
//! This is a stand-in for a real authentication system: a fixed directory of
//! admin accounts from configuration, verified with argon2, no session state.
//! No other endpoint requires it.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{Json, extract::State};
use parish_core::store::SiteStore;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};

/// One configured admin account.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminAccount {
  pub email:         String,
  pub name:          String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// The fixed set of accounts accepted by the login endpoint.
#[derive(Debug, Clone, Default)]
pub struct AdminDirectory {
  accounts: Vec<AdminAccount>,
}

impl AdminDirectory {
  pub fn new(accounts: Vec<AdminAccount>) -> Self { Self { accounts } }

  /// Verify a credential pair; email comparison is case-insensitive.
  pub fn verify(&self, email: &str, password: &str) -> Option<&AdminAccount> {
    let account = self
      .accounts
      .iter()
      .find(|a| a.email.eq_ignore_ascii_case(email))?;

    let parsed_hash = PasswordHash::new(&account.password_hash).ok()?;
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed_hash)
      .ok()?;

    Some(account)
  }
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    Option<String>,
  pub password: Option<String>,
}

/// `POST /admin/login` — `{email, password}`.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<Value>, ApiError>
where
  S: SiteStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let email = body.email.as_deref().map(str::trim).unwrap_or("");
  let password = body.password.as_deref().unwrap_or("");

  if email.is_empty() || password.is_empty() {
    return Err(ApiError::BadRequest("Missing email or password".into()));
  }

  let account = state
    .admin
    .verify(email, password)
    .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".into()))?;

  Ok(Json(json!({
    "success": true,
    "admin": {
      "email": account.email,
      "name": account.name,
      "role": "admin",
    },
  })))
}
