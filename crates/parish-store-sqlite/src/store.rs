//! [`SqliteStore`] — the SQLite implementation of [`SiteStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use serde_json::Value;
use uuid::Uuid;

use parish_core::{
  record::RecordMap,
  registration::{
    NewRegistration, Registration, RegistrationOutcome, RegistrationQuery,
    RegistrationUpdate, STATUS_ACTIVE,
  },
  store::SiteStore,
  submission::{
    flatten_fields, FieldResponse, FormSubmission, NewSubmission,
    SubmissionPage, SubmissionQuery, DEFAULT_PAGE_LIMIT, STATUS_NEW,
  },
};

use crate::{
  encode::{
    encode_dt, encode_uuid, RawFieldResponse, RawRegistration, RawSubmission,
  },
  schema::SCHEMA,
  Error, Result,
};

const SUBMISSION_COLS: &str =
  "id, form_name, form_type, email, name, phone, data, status, ip_address, \
   user_agent, created_at";

const REGISTRATION_COLS: &str =
  "id, name, email, phone, registration_type, status, email_verified, \
   email_verified_at, date_of_birth, address, city, state, country, \
   postal_code, bio, profile_picture_url, ip_address, user_agent, \
   created_at, updated_at";

fn submission_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSubmission> {
  Ok(RawSubmission {
    id:         row.get(0)?,
    form_name:  row.get(1)?,
    form_type:  row.get(2)?,
    email:      row.get(3)?,
    name:       row.get(4)?,
    phone:      row.get(5)?,
    data:       row.get(6)?,
    status:     row.get(7)?,
    ip_address: row.get(8)?,
    user_agent: row.get(9)?,
    created_at: row.get(10)?,
  })
}

fn registration_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRegistration> {
  Ok(RawRegistration {
    id:                  row.get(0)?,
    name:                row.get(1)?,
    email:               row.get(2)?,
    phone:               row.get(3)?,
    registration_type:   row.get(4)?,
    status:              row.get(5)?,
    email_verified:      row.get(6)?,
    email_verified_at:   row.get(7)?,
    date_of_birth:       row.get(8)?,
    address:             row.get(9)?,
    city:                row.get(10)?,
    state:               row.get(11)?,
    country:             row.get(12)?,
    postal_code:         row.get(13)?,
    bio:                 row.get(14)?,
    profile_picture_url: row.get(15)?,
    ip_address:          row.get(16)?,
    user_agent:          row.get(17)?,
    created_at:          row.get(18)?,
    updated_at:          row.get(19)?,
  })
}

/// `true` when the wrapped SQLite error is a constraint violation — used to
/// map duplicate-email inserts to [`Error::EmailTaken`].
fn is_constraint_violation(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if e.code == rusqlite::ErrorCode::ConstraintViolation
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Parish site store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. One store is
/// opened at startup and shared by handle for the life of the process.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Write the flattened field rows for a submission. Called after the
  /// submission row has committed; the caller treats a failure here as
  /// non-fatal.
  async fn insert_field_responses(
    &self,
    submission_id: Uuid,
    data: &Value,
  ) -> Result<()> {
    let fields = flatten_fields(data);
    if fields.is_empty() {
      return Ok(());
    }

    let owner_str = encode_uuid(submission_id);
    let rows: Vec<_> = fields
      .into_iter()
      .map(|f| (encode_uuid(Uuid::new_v4()), f))
      .collect();

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "INSERT INTO form_responses
             (id, form_submission_id, field_name, field_value, field_type)
           VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for (id, field) in &rows {
          stmt.execute(rusqlite::params![
            id,
            owner_str,
            field.field_name,
            field.field_value,
            field.field_type,
          ])?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}

#[cfg(test)]
impl SqliteStore {
  /// Test hook: run arbitrary DDL, e.g. to break the projection table and
  /// exercise the best-effort secondary write.
  pub(crate) async fn execute_batch_raw(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SiteStore impl ──────────────────────────────────────────────────────────

impl SiteStore for SqliteStore {
  type Error = Error;

  // ── Form submissions ──────────────────────────────────────────────────────

  async fn create_submission(&self, input: NewSubmission) -> Result<FormSubmission> {
    let submission = FormSubmission {
      id:         Uuid::new_v4(),
      form_name:  input.form_name,
      form_type:  input.form_type,
      email:      input.email,
      name:       input.name,
      phone:      input.phone,
      data:       input.data,
      status:     STATUS_NEW.to_owned(),
      ip_address: input.ip_address,
      user_agent: input.user_agent,
      created_at: Utc::now(),
    };

    let id_str      = encode_uuid(submission.id);
    let form_name   = submission.form_name.clone();
    let form_type   = submission.form_type.clone();
    let email       = submission.email.clone();
    let name        = submission.name.clone();
    let phone       = submission.phone.clone();
    let data_str    = submission.data.to_string();
    let status      = submission.status.clone();
    let ip_address  = submission.ip_address.clone();
    let user_agent  = submission.user_agent.clone();
    let created_str = encode_dt(submission.created_at);

    // Durability boundary: once this insert succeeds, the submission is
    // accepted regardless of what happens to the projection below.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO form_submissions (
             id, form_name, form_type, email, name, phone,
             data, status, ip_address, user_agent, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str, form_name, form_type, email, name, phone,
            data_str, status, ip_address, user_agent, created_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    if let Err(e) = self
      .insert_field_responses(submission.id, &submission.data)
      .await
    {
      tracing::warn!(
        submission_id = %submission.id,
        error = %e,
        "failed to store field responses; submission kept"
      );
    }

    Ok(submission)
  }

  async fn get_submission(&self, id: Uuid) -> Result<Option<FormSubmission>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SUBMISSION_COLS} FROM form_submissions WHERE id = ?1"
              ),
              rusqlite::params![id_str],
              submission_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn get_field_responses(
    &self,
    submission_id: Uuid,
  ) -> Result<Vec<FieldResponse>> {
    let id_str = encode_uuid(submission_id);

    let raws: Vec<RawFieldResponse> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, form_submission_id, field_name, field_value, field_type
           FROM form_responses
           WHERE form_submission_id = ?1
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawFieldResponse {
              id:                 row.get(0)?,
              form_submission_id: row.get(1)?,
              field_name:         row.get(2)?,
              field_value:        row.get(3)?,
              field_type:         row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawFieldResponse::into_field_response)
      .collect()
  }

  async fn list_submissions(&self, query: &SubmissionQuery) -> Result<SubmissionPage> {
    let form_name  = query.form_name.clone();
    let form_type  = query.form_type.clone();
    let status     = query.status.clone();
    let limit_val  = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT) as i64;
    let offset_val = query.offset.unwrap_or(0) as i64;

    // NULL filters match everything, so both statements keep a fixed
    // parameter list regardless of which filters are set.
    const FILTER: &str = "(?1 IS NULL OR form_name = ?1)
                          AND (?2 IS NULL OR form_type = ?2)
                          AND (?3 IS NULL OR status = ?3)";

    let (raws, total): (Vec<RawSubmission>, i64) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM form_submissions WHERE {FILTER}"),
          rusqlite::params![
            form_name.as_deref(),
            form_type.as_deref(),
            status.as_deref(),
          ],
          |row| row.get(0),
        )?;

        // rowid breaks created_at ties so pages never overlap or gap.
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBMISSION_COLS}
           FROM form_submissions
           WHERE {FILTER}
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?4 OFFSET ?5"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              form_name.as_deref(),
              form_type.as_deref(),
              status.as_deref(),
              limit_val,
              offset_val,
            ],
            submission_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total))
      })
      .await?;

    let submissions = raws
      .into_iter()
      .map(RawSubmission::into_submission)
      .collect::<Result<Vec<_>>>()?;

    Ok(SubmissionPage { submissions, total: total as u64 })
  }

  async fn set_submission_status(
    &self,
    id: Uuid,
    status: &str,
  ) -> Result<FormSubmission> {
    let id_str     = encode_uuid(id);
    let status_str = status.to_owned();

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE form_submissions SET status = ?2 WHERE id = ?1",
          rusqlite::params![id_str, status_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::SubmissionNotFound(id));
    }

    self
      .get_submission(id)
      .await?
      .ok_or(Error::SubmissionNotFound(id))
  }

  async fn delete_submission(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        // Responses first; they reference the submission row.
        conn.execute(
          "DELETE FROM form_responses WHERE form_submission_id = ?1",
          rusqlite::params![id_str],
        )?;
        Ok(conn.execute(
          "DELETE FROM form_submissions WHERE id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::SubmissionNotFound(id));
    }
    Ok(())
  }

  // ── Registrations ─────────────────────────────────────────────────────────

  async fn create_registration(&self, input: NewRegistration) -> Result<RegistrationOutcome> {
    let now = Utc::now();
    let registration = Registration {
      id:                  Uuid::new_v4(),
      name:                input.name,
      email:               input.email,
      phone:               input.phone,
      registration_type:   input.registration_type,
      status:              STATUS_ACTIVE.to_owned(),
      email_verified:      false,
      email_verified_at:   None,
      date_of_birth:       input.date_of_birth,
      address:             input.address,
      city:                input.city,
      state:               input.state,
      country:             input.country,
      postal_code:         input.postal_code,
      bio:                 None,
      profile_picture_url: None,
      ip_address:          input.ip_address,
      user_agent:          input.user_agent,
      created_at:          now,
      updated_at:          now,
    };

    let id_str        = encode_uuid(registration.id);
    let name          = registration.name.clone();
    let email         = registration.email.clone();
    let phone         = registration.phone.clone();
    let password_hash = input.password_hash;
    let reg_type      = registration.registration_type.clone();
    let status        = registration.status.clone();
    let date_of_birth = registration.date_of_birth.clone();
    let address       = registration.address.clone();
    let city          = registration.city.clone();
    let state         = registration.state.clone();
    let country       = registration.country.clone();
    let postal_code   = registration.postal_code.clone();
    let ip_address    = registration.ip_address.clone();
    let user_agent    = registration.user_agent.clone();
    let now_str       = encode_dt(now);

    let outcome = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO registrations (
             id, name, email, phone, password_hash, registration_type,
             status, email_verified, email_verified_at, date_of_birth,
             address, city, state, country, postal_code,
             ip_address, user_agent, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, NULL, ?8,
                     ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16)",
          rusqlite::params![
            id_str, name, email, phone, password_hash, reg_type,
            status, date_of_birth,
            address, city, state, country, postal_code,
            ip_address, user_agent, now_str,
          ],
        )?;
        Ok(())
      })
      .await;

    match outcome {
      Ok(()) => Ok(RegistrationOutcome::Created(registration)),
      Err(e) if is_constraint_violation(&e) => Ok(RegistrationOutcome::EmailTaken),
      Err(e) => Err(e.into()),
    }
  }

  async fn find_registration_by_email(&self, email: &str) -> Result<Option<Registration>> {
    let email_str = email.trim().to_lowercase();

    let raw: Option<RawRegistration> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {REGISTRATION_COLS} FROM registrations WHERE email = ?1"
              ),
              rusqlite::params![email_str],
              registration_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRegistration::into_registration).transpose()
  }

  async fn get_registration(&self, id: Uuid) -> Result<Option<Registration>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawRegistration> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {REGISTRATION_COLS} FROM registrations WHERE id = ?1"
              ),
              rusqlite::params![id_str],
              registration_from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRegistration::into_registration).transpose()
  }

  async fn list_registrations(&self, query: &RegistrationQuery) -> Result<Vec<Registration>> {
    let status   = query.status.clone();
    let reg_type = query.registration_type.clone();

    let raws: Vec<RawRegistration> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REGISTRATION_COLS}
           FROM registrations
           WHERE (?1 IS NULL OR status = ?1)
             AND (?2 IS NULL OR registration_type = ?2)
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![status.as_deref(), reg_type.as_deref()],
            registration_from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawRegistration::into_registration)
      .collect()
  }

  async fn update_registration(
    &self,
    id: Uuid,
    update: RegistrationUpdate,
  ) -> Result<Registration> {
    let mut registration = self
      .get_registration(id)
      .await?
      .ok_or(Error::RegistrationNotFound(id))?;

    let now = Utc::now();
    if let Some(v) = update.name { registration.name = v; }
    if let Some(v) = update.phone { registration.phone = Some(v); }
    if let Some(v) = update.status { registration.status = v; }
    if let Some(v) = update.email_verified {
      registration.email_verified = v;
      if v {
        registration.email_verified_at = Some(now);
      }
    }
    if let Some(v) = update.date_of_birth { registration.date_of_birth = Some(v); }
    if let Some(v) = update.address { registration.address = Some(v); }
    if let Some(v) = update.city { registration.city = Some(v); }
    if let Some(v) = update.state { registration.state = Some(v); }
    if let Some(v) = update.country { registration.country = Some(v); }
    if let Some(v) = update.postal_code { registration.postal_code = Some(v); }
    if let Some(v) = update.bio { registration.bio = Some(v); }
    if let Some(v) = update.profile_picture_url {
      registration.profile_picture_url = Some(v);
    }
    registration.updated_at = now;

    let id_str            = encode_uuid(id);
    let name              = registration.name.clone();
    let phone             = registration.phone.clone();
    let status            = registration.status.clone();
    let email_verified    = registration.email_verified;
    let email_verified_at = registration.email_verified_at.map(encode_dt);
    let date_of_birth     = registration.date_of_birth.clone();
    let address           = registration.address.clone();
    let city              = registration.city.clone();
    let state             = registration.state.clone();
    let country           = registration.country.clone();
    let postal_code       = registration.postal_code.clone();
    let bio               = registration.bio.clone();
    let profile_picture   = registration.profile_picture_url.clone();
    let updated_str       = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE registrations SET
             name = ?2, phone = ?3, status = ?4, email_verified = ?5,
             email_verified_at = ?6, date_of_birth = ?7, address = ?8,
             city = ?9, state = ?10, country = ?11, postal_code = ?12,
             bio = ?13, profile_picture_url = ?14, updated_at = ?15
           WHERE id = ?1",
          rusqlite::params![
            id_str, name, phone, status, email_verified,
            email_verified_at, date_of_birth, address,
            city, state, country, postal_code,
            bio, profile_picture, updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(registration)
  }

  async fn delete_registration(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM registrations WHERE id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      return Err(Error::RegistrationNotFound(id));
    }
    Ok(())
  }

  // ── Named records ─────────────────────────────────────────────────────────

  async fn put_record(&self, key: &str, value: &Value) -> Result<()> {
    let key_str   = key.to_owned();
    let value_str = value.to_string();
    let now_str   = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO data_store (key, value, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)
           ON CONFLICT(key) DO UPDATE SET
             value = excluded.value,
             updated_at = excluded.updated_at",
          rusqlite::params![key_str, value_str, now_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_record(&self, key: &str) -> Result<Option<Value>> {
    let key_str = key.to_owned();

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM data_store WHERE key = ?1",
              rusqlite::params![key_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(|s| serde_json::from_str(&s)).transpose().map_err(Error::Json)
  }

  async fn delete_record(&self, key: &str) -> Result<()> {
    let key_str = key.to_owned();

    // Idempotent: deleting an absent key is a success.
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM data_store WHERE key = ?1",
          rusqlite::params![key_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn clear_records(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute("DELETE FROM data_store", [])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn export_records(&self) -> Result<RecordMap> {
    let pairs: Vec<(String, String)> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT key, value FROM data_store ORDER BY key")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut records = RecordMap::new();
    for (key, value_str) in pairs {
      records.insert(key, serde_json::from_str(&value_str)?);
    }
    Ok(records)
  }

  async fn import_records(&self, records: &RecordMap) -> Result<()> {
    if records.is_empty() {
      return Ok(());
    }

    let rows: Vec<(String, String)> = records
      .iter()
      .map(|(k, v)| (k.clone(), v.to_string()))
      .collect();
    let now_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "INSERT INTO data_store (key, value, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?3)
           ON CONFLICT(key) DO UPDATE SET
             value = excluded.value,
             updated_at = excluded.updated_at",
        )?;
        for (key, value) in &rows {
          stmt.execute(rusqlite::params![key, value, now_str])?;
        }
        Ok(())
      })
      .await?;
    Ok(())
  }
}
