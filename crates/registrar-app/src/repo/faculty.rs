//! Faculty repository.

use std::sync::Arc;

use registrar_core::{
  faculty::{Faculty, NewFaculty},
  live::Live,
  store::RecordStore,
};

/// Mediates faculty access for the management screens.
pub struct FacultyRepository<S> {
  store: Arc<S>,
}

impl<S: RecordStore> FacultyRepository<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// Live list of every faculty, ordered by id.
  pub async fn all_faculties(&self) -> Result<Live<Vec<Faculty>>, S::Error> {
    self.store.watch_faculties().await
  }

  pub async fn insert_faculty(&self, input: NewFaculty) -> Result<Faculty, S::Error> {
    self.store.insert_faculty(input).await
  }

  pub async fn update_faculty(&self, faculty: Faculty) -> Result<(), S::Error> {
    self.store.update_faculty(faculty).await
  }

  /// Delete by id; restricted while students reference the faculty.
  pub async fn delete_faculty(&self, id: i64) -> Result<(), S::Error> {
    self.store.delete_faculty(id).await
  }

  /// One-shot point lookup, for edit-mode prefill.
  pub async fn faculty_by_id(&self, id: i64) -> Result<Option<Faculty>, S::Error> {
    self.store.faculty_by_id(id).await
  }
}
