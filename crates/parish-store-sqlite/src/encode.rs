//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. The submission `data`
//! column holds compact JSON. UUIDs are stored as hyphenated lowercase
//! strings.

use chrono::{DateTime, Utc};
use parish_core::{
  registration::Registration,
  submission::{FieldResponse, FormSubmission},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_dt_opt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `form_submissions` row.
pub struct RawSubmission {
  pub id:         String,
  pub form_name:  String,
  pub form_type:  String,
  pub email:      Option<String>,
  pub name:       Option<String>,
  pub phone:      Option<String>,
  pub data:       String,
  pub status:     String,
  pub ip_address: String,
  pub user_agent: String,
  pub created_at: String,
}

impl RawSubmission {
  pub fn into_submission(self) -> Result<FormSubmission> {
    Ok(FormSubmission {
      id:         decode_uuid(&self.id)?,
      form_name:  self.form_name,
      form_type:  self.form_type,
      email:      self.email,
      name:       self.name,
      phone:      self.phone,
      data:       serde_json::from_str(&self.data)?,
      status:     self.status,
      ip_address: self.ip_address,
      user_agent: self.user_agent,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `form_responses` row.
pub struct RawFieldResponse {
  pub id:                 String,
  pub form_submission_id: String,
  pub field_name:         String,
  pub field_value:        String,
  pub field_type:         String,
}

impl RawFieldResponse {
  pub fn into_field_response(self) -> Result<FieldResponse> {
    Ok(FieldResponse {
      id:                 decode_uuid(&self.id)?,
      form_submission_id: decode_uuid(&self.form_submission_id)?,
      field_name:         self.field_name,
      field_value:        self.field_value,
      field_type:         self.field_type,
    })
  }
}

/// Raw strings read directly from a `registrations` row. The password hash
/// column is never part of this projection.
pub struct RawRegistration {
  pub id:                  String,
  pub name:                String,
  pub email:               String,
  pub phone:               Option<String>,
  pub registration_type:   String,
  pub status:              String,
  pub email_verified:      bool,
  pub email_verified_at:   Option<String>,
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
  pub created_at:          String,
  pub updated_at:          String,
}

impl RawRegistration {
  pub fn into_registration(self) -> Result<Registration> {
    Ok(Registration {
      id:                  decode_uuid(&self.id)?,
      name:                self.name,
      email:               self.email,
      phone:               self.phone,
      registration_type:   self.registration_type,
      status:              self.status,
      email_verified:      self.email_verified,
      email_verified_at:   decode_dt_opt(self.email_verified_at.as_deref())?,
      date_of_birth:       self.date_of_birth,
      address:             self.address,
      city:                self.city,
      state:               self.state,
      country:             self.country,
      postal_code:         self.postal_code,
      bio:                 self.bio,
      profile_picture_url: self.profile_picture_url,
      ip_address:          self.ip_address,
      user_agent:          self.user_agent,
      created_at:          decode_dt(&self.created_at)?,
      updated_at:          decode_dt(&self.updated_at)?,
    })
  }
}
