//! Domain-level error types.

use thiserror::Error;

/// Faults that are properties of the data model itself, independent of any
/// particular storage backend.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
  /// Restrict-on-delete: the faculty is still referenced by students.
  #[error("faculty {id} is referenced by {students} student(s)")]
  FacultyInUse { id: i64, students: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
