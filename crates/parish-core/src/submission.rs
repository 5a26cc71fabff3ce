//! Form submissions — the durable record of a visitor-submitted form.
//!
//! A submission's `data` blob is the single source of truth for what was
//! submitted. Field responses are a flattened, denormalised projection
//! derived from its top-level keys; they exist for query convenience only
//! and may be incomplete if the best-effort secondary write fails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Status assigned to every submission at creation. No transition logic is
/// defined beyond the admin status update.
pub const STATUS_NEW: &str = "new";

/// Page size applied when a list query does not specify one.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

// ─── Submission ──────────────────────────────────────────────────────────────

/// One durable record of a visitor-submitted form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSubmission {
  pub id:         Uuid,
  /// Logical form identifier, e.g. `"contact"` or `"volunteer"`.
  pub form_name:  String,
  /// Category tag for the form, e.g. `"inquiry"`.
  pub form_type:  String,
  pub email:      Option<String>,
  pub name:       Option<String>,
  pub phone:      Option<String>,
  /// The submitted field set, verbatim. Authoritative.
  pub data:       Value,
  pub status:     String,
  pub ip_address: String,
  pub user_agent: String,
  /// Server-assigned; never changes after creation.
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::SiteStore::create_submission`].
/// `id`, `status` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewSubmission {
  pub form_name:  String,
  pub form_type:  String,
  pub email:      Option<String>,
  pub name:       Option<String>,
  pub phone:      Option<String>,
  pub data:       Value,
  pub ip_address: String,
  pub user_agent: String,
}

// ─── Field responses ─────────────────────────────────────────────────────────

/// One flattened field of a submission's `data` object, stored as its own
/// row. Never updated or deleted independently of the owning submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldResponse {
  pub id:                 Uuid,
  pub form_submission_id: Uuid,
  pub field_name:         String,
  /// String values verbatim; every other JSON value JSON-encoded.
  pub field_value:        String,
  /// Runtime type tag of the original value — see [`type_tag`].
  pub field_type:         String,
}

/// A field response before the store assigns ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatField {
  pub field_name:  String,
  pub field_value: String,
  pub field_type:  &'static str,
}

/// The type tag recorded alongside each flattened field. Mirrors JavaScript
/// `typeof`: null, arrays and objects all report `"object"`.
pub fn type_tag(value: &Value) -> &'static str {
  match value {
    Value::String(_) => "string",
    Value::Number(_) => "number",
    Value::Bool(_) => "boolean",
    Value::Null | Value::Array(_) | Value::Object(_) => "object",
  }
}

/// Derive the flattened projection of a submission's `data`: one row per
/// top-level key. Anything other than a JSON object yields no rows.
pub fn flatten_fields(data: &Value) -> Vec<FlatField> {
  let Value::Object(map) = data else {
    return Vec::new();
  };

  map
    .iter()
    .map(|(name, value)| FlatField {
      field_name:  name.clone(),
      field_value: match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
      },
      field_type:  type_tag(value),
    })
    .collect()
}

// ─── Queries ─────────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::SiteStore::list_submissions`].
/// Filters are conjunctive; no filter means "match all".
#[derive(Debug, Clone, Default)]
pub struct SubmissionQuery {
  pub form_name: Option<String>,
  pub form_type: Option<String>,
  pub status:    Option<String>,
  pub limit:     Option<usize>,
  pub offset:    Option<usize>,
}

/// One page of submissions, newest first.
#[derive(Debug, Clone)]
pub struct SubmissionPage {
  pub submissions: Vec<FormSubmission>,
  /// Count of submissions matching the filters, ignoring pagination.
  pub total:       u64,
}
