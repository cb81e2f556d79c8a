//! Student — the managed record, tied to a faculty.

use serde::{Deserialize, Serialize};

/// A student row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
  pub id:         i64,
  pub first_name: String,
  pub last_name:  String,
  /// Required foreign key into the faculty table.
  pub faculty_id: i64,
  /// Free-text major/track.
  pub direction:  String,
  /// Opaque URI supplied by the image picker; never interpreted.
  pub avatar:     Option<String>,
}

/// Input for inserting a student; the id is store-assigned.
#[derive(Debug, Clone)]
pub struct NewStudent {
  pub first_name: String,
  pub last_name:  String,
  pub faculty_id: i64,
  pub direction:  String,
  pub avatar:     Option<String>,
}

/// Display projection joining a student with its faculty's current name.
/// Recomputed on every query, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentWithFaculty {
  pub id:           i64,
  pub first_name:   String,
  pub last_name:    String,
  pub faculty_name: String,
  pub direction:    String,
}
