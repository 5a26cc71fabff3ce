//! The `SiteStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `parish-store-sqlite`).
//! Higher layers (`parish-api`, binaries) depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use serde_json::Value;
use uuid::Uuid;

use crate::{
  record::RecordMap,
  registration::{
    NewRegistration, Registration, RegistrationOutcome, RegistrationQuery,
    RegistrationUpdate,
  },
  submission::{
    FieldResponse, FormSubmission, NewSubmission, SubmissionPage,
    SubmissionQuery,
  },
};

/// Abstraction over the Parish site datastore.
///
/// One handle is constructed at startup and shared by reference with every
/// component that needs it; there is no teardown mid-process.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SiteStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Form submissions ──────────────────────────────────────────────────

  /// Persist a submission and return the stored record.
  ///
  /// The submission row itself is the durability boundary: once it is in,
  /// the call succeeds. The flattened field-response projection is written
  /// afterwards on a best-effort basis — a failure there is logged and
  /// neither fails the call nor rolls the submission back.
  fn create_submission(
    &self,
    input: NewSubmission,
  ) -> impl Future<Output = Result<FormSubmission, Self::Error>> + Send + '_;

  /// Retrieve a submission by id. Returns `None` if not found.
  fn get_submission(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<FormSubmission>, Self::Error>> + Send + '_;

  /// The flattened field rows belonging to a submission. The projection is
  /// derived and may be incomplete; `FormSubmission::data` is authoritative.
  fn get_field_responses(
    &self,
    submission_id: Uuid,
  ) -> impl Future<Output = Result<Vec<FieldResponse>, Self::Error>> + Send + '_;

  /// Page through submissions, newest first. Filters are conjunctive.
  fn list_submissions<'a>(
    &'a self,
    query: &'a SubmissionQuery,
  ) -> impl Future<Output = Result<SubmissionPage, Self::Error>> + Send + 'a;

  /// Replace a submission's status and return the updated record.
  fn set_submission_status<'a>(
    &'a self,
    id: Uuid,
    status: &'a str,
  ) -> impl Future<Output = Result<FormSubmission, Self::Error>> + Send + 'a;

  /// Delete a submission and its field responses.
  fn delete_submission(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Registrations ─────────────────────────────────────────────────────

  /// Persist a registration. A uniqueness violation on the (lowercased)
  /// email yields [`RegistrationOutcome::EmailTaken`] — the backstop for the
  /// check-then-insert race; the friendly pre-check lives in the API layer.
  fn create_registration(
    &self,
    input: NewRegistration,
  ) -> impl Future<Output = Result<RegistrationOutcome, Self::Error>> + Send + '_;

  /// Case-insensitive lookup by email.
  fn find_registration_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Registration>, Self::Error>> + Send + 'a;

  fn get_registration(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Registration>, Self::Error>> + Send + '_;

  /// List registrations, newest first. Filters are conjunctive.
  fn list_registrations<'a>(
    &'a self,
    query: &'a RegistrationQuery,
  ) -> impl Future<Output = Result<Vec<Registration>, Self::Error>> + Send + 'a;

  /// Apply a partial update and return the updated record.
  fn update_registration(
    &self,
    id: Uuid,
    update: RegistrationUpdate,
  ) -> impl Future<Output = Result<Registration, Self::Error>> + Send + '_;

  fn delete_registration(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Named records ─────────────────────────────────────────────────────

  /// Save a named record, replacing any prior value wholesale.
  fn put_record<'a>(
    &'a self,
    key: &'a str,
    value: &'a Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Load a named record. Returns `None` if the key was never saved.
  fn get_record<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send + 'a;

  /// Remove a named record. Succeeds even when the key is absent.
  fn delete_record<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove every named record.
  fn clear_records(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Every named record currently stored.
  fn export_records(
    &self,
  ) -> impl Future<Output = Result<RecordMap, Self::Error>> + Send + '_;

  /// Upsert each entry of `records`. Keys absent from the mapping are left
  /// untouched (additive merge, not replace-all).
  fn import_records<'a>(
    &'a self,
    records: &'a RecordMap,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
