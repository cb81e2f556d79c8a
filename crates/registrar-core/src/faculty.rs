//! Faculty — the organizational unit students belong to.

use serde::{Deserialize, Serialize};

/// A faculty row. Referenced by zero or more students through
/// `Student::faculty_id`; deletion is restricted while references exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faculty {
  pub id:   i64,
  pub name: String,
}

/// Input for inserting a faculty; the id is store-assigned.
#[derive(Debug, Clone)]
pub struct NewFaculty {
  pub name: String,
}
