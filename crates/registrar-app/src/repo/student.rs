//! Student repository.

use std::sync::Arc;

use registrar_core::{
  faculty::Faculty,
  live::Live,
  store::RecordStore,
  student::{NewStudent, Student, StudentWithFaculty},
};

/// Mediates student access for the list and add/edit screens.
pub struct StudentRepository<S> {
  store: Arc<S>,
}

impl<S: RecordStore> StudentRepository<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  /// Live join of every student with its faculty's current name.
  pub async fn students_with_faculty(
    &self,
  ) -> Result<Live<Vec<StudentWithFaculty>>, S::Error> {
    self.store.watch_students_with_faculty().await
  }

  /// Live substring search over `first_name last_name`.
  pub async fn search_students(
    &self,
    query: &str,
  ) -> Result<Live<Vec<StudentWithFaculty>>, S::Error> {
    self.store.watch_student_search(query).await
  }

  pub async fn add_student(&self, input: NewStudent) -> Result<Student, S::Error> {
    self.store.insert_student(input).await
  }

  pub async fn update_student(&self, student: Student) -> Result<(), S::Error> {
    self.store.update_student(student).await
  }

  pub async fn delete_student(&self, id: i64) -> Result<(), S::Error> {
    self.store.delete_student(id).await
  }

  /// One-shot point lookup, for edit-mode prefill.
  pub async fn student_by_id(&self, id: i64) -> Result<Option<Student>, S::Error> {
    self.store.student_by_id(id).await
  }

  /// One-shot point lookup through the faculty join.
  pub async fn student_with_faculty_by_id(
    &self,
    id: i64,
  ) -> Result<Option<StudentWithFaculty>, S::Error> {
    self.store.student_with_faculty_by_id(id).await
  }

  /// Live faculty list, for the selection UI on the add/edit screen.
  pub async fn faculties(&self) -> Result<Live<Vec<Faculty>>, S::Error> {
    self.store.watch_faculties().await
  }
}
