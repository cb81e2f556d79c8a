//! The `RecordStore` and `SessionStore` traits.
//!
//! Implemented by storage backends (e.g. `registrar-store-sqlite`). The
//! repository and view-model layers depend on these abstractions, not on
//! any concrete backend.

use std::future::Future;

use crate::{
  faculty::{Faculty, NewFaculty},
  live::Live,
  student::{NewStudent, Student, StudentWithFaculty},
  user::{NewUser, User},
};

// ─── Record store ────────────────────────────────────────────────────────────

/// Abstraction over the relational store holding users, faculties, and
/// students.
///
/// Point operations either complete or fault immediately; the store never
/// retries. The `watch_*` methods register a live query: the returned
/// [`Live`] yields the current snapshot immediately and a consistent fresh
/// snapshot after every committed write touching the queried tables, in
/// write order. There is no cross-query ordering guarantee.
///
/// All methods return `Send` futures so the traits can be used from
/// multi-threaded async runtimes.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user and return it with its assigned id.
  fn insert_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Exact, case-sensitive username lookup. `None` if absent.
  fn find_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Replace the stored avatar for `username`. Zero rows affected is
  /// silent.
  fn update_user_avatar<'a>(
    &'a self,
    username: &'a str,
    avatar: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Live list of every user, ordered by id.
  fn watch_users(
    &self,
  ) -> impl Future<Output = Result<Live<Vec<User>>, Self::Error>> + Send + '_;

  // ── Faculties ─────────────────────────────────────────────────────────

  /// Persist a new faculty and return it with its assigned id.
  fn insert_faculty(
    &self,
    input: NewFaculty,
  ) -> impl Future<Output = Result<Faculty, Self::Error>> + Send + '_;

  /// Replace the row matching `faculty.id`. Zero rows affected is silent.
  fn update_faculty(
    &self,
    faculty: Faculty,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete by id. An absent id is a no-op; a faculty still referenced by
  /// students is a fault (restrict-on-delete).
  fn delete_faculty(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Point lookup. `None` if absent.
  fn faculty_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Faculty>, Self::Error>> + Send + '_;

  /// Live list of every faculty, ordered by id.
  fn watch_faculties(
    &self,
  ) -> impl Future<Output = Result<Live<Vec<Faculty>>, Self::Error>> + Send + '_;

  // ── Students ──────────────────────────────────────────────────────────

  /// Persist a new student and return it with its assigned id.
  fn insert_student(
    &self,
    input: NewStudent,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  /// Replace the row matching `student.id`. Zero rows affected is silent.
  fn update_student(
    &self,
    student: Student,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete by id. An absent id is a no-op.
  fn delete_student(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Point lookup. `None` if absent.
  fn student_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// Point lookup through the faculty join. `None` if absent.
  fn student_with_faculty_by_id(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<StudentWithFaculty>, Self::Error>> + Send + '_;

  /// Live join of students with their faculty's current name, ordered by
  /// student id. Re-emits on writes to either table.
  fn watch_students_with_faculty(
    &self,
  ) -> impl Future<Output = Result<Live<Vec<StudentWithFaculty>>, Self::Error>> + Send + '_;

  /// Live case-insensitive substring search over `first_name last_name`,
  /// through the faculty join.
  fn watch_student_search<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Live<Vec<StudentWithFaculty>>, Self::Error>> + Send + 'a;
}

// ─── Session store ───────────────────────────────────────────────────────────

/// The persisted "currently signed-in username" slot.
///
/// Explicit and injectable rather than ambient: initialises empty, is
/// cleared by sign-out, and survives process restarts. The record outlives
/// any single user row — it is not invalidated when the named user
/// disappears.
pub trait SessionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The signed-in username, or `None` while signed out.
  fn signed_in_username(
    &self,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;

  /// Mark `username` as signed in.
  fn sign_in<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Clear the slot.
  fn sign_out(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Live view of the slot; emits on every sign-in and sign-out.
  fn watch_session(
    &self,
  ) -> impl Future<Output = Result<Live<Option<String>>, Self::Error>> + Send + '_;
}

// ─── Combined backend ────────────────────────────────────────────────────────

/// A backend providing both the record tables and the session slot, with a
/// single error type. Blanket-implemented; consumers that need both halves
/// bound on this.
pub trait Store: RecordStore + SessionStore<Error = <Self as RecordStore>::Error> {}

impl<T> Store for T where T: RecordStore + SessionStore<Error = <T as RecordStore>::Error> {}

/// The error type of a combined [`Store`] backend.
pub type StoreError<S> = <S as RecordStore>::Error;
