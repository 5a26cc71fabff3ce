//! Named records — key-tagged JSON documents.
//!
//! A named record is a `(key, value)` pair where the key is a caller-chosen
//! namespace string (e.g. `"homepage content"`) and the value is an arbitrary
//! JSON document. Records are overwritten wholesale on every save; there is
//! no partial update and no versioning. The full set is enumerable for
//! export/backup and re-creatable via import/restore.

use serde_json::{Map, Value};

/// Every named record currently stored, keyed by name. This is the shape of
/// an export and the input to an import.
pub type RecordMap = Map<String, Value>;
