//! Account registrations.
//!
//! [`Registration`] deliberately carries no password material: the argon2
//! hash enters the store through [`NewRegistration`] and is never read back
//! out, so no response payload can leak it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration type applied when the caller does not supply one.
pub const DEFAULT_REGISTRATION_TYPE: &str = "member";

/// Status assigned to every registration at creation.
pub const STATUS_ACTIVE: &str = "active";

// ─── Registration ────────────────────────────────────────────────────────────

/// One registered account, as read back from the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
  pub id:                  Uuid,
  pub name:                String,
  /// Stored lowercased; uniqueness is case-insensitive.
  pub email:               String,
  pub phone:               Option<String>,
  pub registration_type:   String,
  pub status:              String,
  pub email_verified:      bool,
  pub email_verified_at:   Option<DateTime<Utc>>,
  pub date_of_birth:       Option<String>,
  pub address:             Option<String>,
  pub city:                Option<String>,
  pub state:               Option<String>,
  pub country:             Option<String>,
  pub postal_code:         Option<String>,
  pub bio:                 Option<String>,
  pub profile_picture_url: Option<String>,
  pub ip_address:          String,
  pub user_agent:          String,
  pub created_at:          DateTime<Utc>,
  pub updated_at:          DateTime<Utc>,
}

/// Outcome of a create attempt. A uniqueness violation on the email column
/// is a domain outcome rather than a store failure, so callers can map it to
/// a conflict response without inspecting backend error types.
#[derive(Debug, Clone)]
pub enum RegistrationOutcome {
  Created(Registration),
  EmailTaken,
}

/// The non-sensitive subset returned by admin list views.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationSummary {
  pub id:                Uuid,
  pub name:              String,
  pub email:             String,
  pub phone:             Option<String>,
  pub registration_type: String,
  pub status:            String,
  pub email_verified:    bool,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

impl From<&Registration> for RegistrationSummary {
  fn from(r: &Registration) -> Self {
    Self {
      id:                r.id,
      name:              r.name.clone(),
      email:             r.email.clone(),
      phone:             r.phone.clone(),
      registration_type: r.registration_type.clone(),
      status:            r.status.clone(),
      email_verified:    r.email_verified,
      created_at:        r.created_at,
      updated_at:        r.updated_at,
    }
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::SiteStore::create_registration`]. The password
/// hash is write-only: it has no counterpart on [`Registration`].
#[derive(Debug, Clone)]
pub struct NewRegistration {
  pub name:              String,
  /// Already normalised (trimmed, lowercased) by the caller.
  pub email:             String,
  pub phone:             Option<String>,
  /// Argon2 PHC string. Never exposed on any read path.
  pub password_hash:     String,
  pub registration_type: String,
  pub date_of_birth:     Option<String>,
  pub address:           Option<String>,
  pub city:              Option<String>,
  pub state:             Option<String>,
  pub country:           Option<String>,
  pub postal_code:       Option<String>,
  pub ip_address:        String,
  pub user_agent:        String,
}

/// Filters for [`crate::store::SiteStore::list_registrations`].
#[derive(Debug, Clone, Default)]
pub struct RegistrationQuery {
  pub status:            Option<String>,
  pub registration_type: Option<String>,
}

/// A partial update; `None` fields are left untouched. Setting
/// `email_verified` to `true` also stamps `email_verified_at`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationUpdate {
  pub name:                Option<String>,
  pub phone:               Option<String>,
  pub status:              Option<String>,
  #[serde(alias = "email_verified")]
  pub email_verified:      Option<bool>,
  pub date_of_birth:       Option<String>,
  pub address:             Option<String>,
  pub city:                Option<String>,
  pub state:               Option<String>,
  pub country:             Option<String>,
  pub postal_code:         Option<String>,
  pub bio:                 Option<String>,
  pub profile_picture_url: Option<String>,
}

impl RegistrationUpdate {
  /// `true` when the update would change nothing.
  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.phone.is_none()
      && self.status.is_none()
      && self.email_verified.is_none()
      && self.date_of_birth.is_none()
      && self.address.is_none()
      && self.city.is_none()
      && self.state.is_none()
      && self.country.is_none()
      && self.postal_code.is_none()
      && self.bio.is_none()
      && self.profile_picture_url.is_none()
  }
}
