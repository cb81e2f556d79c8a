//! Student view-state: live join list with store-side search, plus the
//! add/edit screen contract.

use std::sync::{Arc, Mutex, PoisonError};

use registrar_core::{
  faculty::Faculty,
  live::Live,
  store::RecordStore,
  student::{NewStudent, Student, StudentWithFaculty},
};
use tokio::{sync::watch, task::JoinHandle};

use crate::repo::StudentRepository;

// ─── List screen ─────────────────────────────────────────────────────────────

/// Publishes the student-with-faculty list for the management screen.
///
/// Search policy for this entity is store-side: every query replaces the
/// model's subscription with the store's live search, so each keystroke is
/// a store round-trip. The faculty screen uses the opposite, client-side
/// policy.
pub struct StudentModel<S> {
  repo: StudentRepository<S>,
  out:  Arc<watch::Sender<Vec<StudentWithFaculty>>>,
  feed: Mutex<JoinHandle<()>>,
}

impl<S: RecordStore> StudentModel<S> {
  /// Subscribe to the live join. The first snapshot is in place before
  /// this returns.
  pub async fn new(repo: StudentRepository<S>) -> Result<Self, S::Error> {
    let live = repo.students_with_faculty().await?;
    let (out, _) = watch::channel(Vec::new());
    let out = Arc::new(out);
    let feed = Mutex::new(follow_into(live, Arc::clone(&out)).await);
    Ok(Self { repo, out, feed })
  }

  /// Observable student list, filtered by the most recent query.
  pub fn students(&self) -> Live<Vec<StudentWithFaculty>> {
    Live::new(self.out.subscribe())
  }

  /// Replace the subscription: a blank query observes the full join, any
  /// other query observes the store's live substring search.
  pub async fn search(&self, query: &str) -> Result<(), S::Error> {
    let live = if query.trim().is_empty() {
      self.repo.students_with_faculty().await?
    } else {
      self.repo.search_students(query).await?
    };
    let next = follow_into(live, Arc::clone(&self.out)).await;
    let prev = std::mem::replace(
      &mut *self.feed.lock().unwrap_or_else(PoisonError::into_inner),
      next,
    );
    prev.abort();
    Ok(())
  }

  pub async fn add_student(&self, input: NewStudent) -> Result<Student, S::Error> {
    self.repo.add_student(input).await
  }

  pub async fn update_student(&self, student: Student) -> Result<(), S::Error> {
    self.repo.update_student(student).await
  }

  pub async fn delete_student(&self, id: i64) -> Result<(), S::Error> {
    self.repo.delete_student(id).await
  }

  /// Point lookup through the join, for the detail/edit flow.
  pub async fn student_with_faculty_by_id(
    &self,
    id: i64,
  ) -> Result<Option<StudentWithFaculty>, S::Error> {
    self.repo.student_with_faculty_by_id(id).await
  }
}

impl<S> Drop for StudentModel<S> {
  fn drop(&mut self) {
    self
      .feed
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .abort();
  }
}

/// Forward `live` into `out`: deliver the first snapshot before returning,
/// then keep forwarding from a task until either side goes away.
async fn follow_into(
  mut live: Live<Vec<StudentWithFaculty>>,
  out: Arc<watch::Sender<Vec<StudentWithFaculty>>>,
) -> JoinHandle<()> {
  if let Some(first) = live.next().await {
    out.send_replace(first);
  }
  tokio::spawn(async move {
    while let Some(snapshot) = live.next().await {
      out.send_replace(snapshot);
    }
  })
}

// ─── Add/edit screen ─────────────────────────────────────────────────────────

/// State for the add/edit screen: the faculty selection list and the
/// currently selected faculty.
pub struct StudentEntryModel<S> {
  repo:     StudentRepository<S>,
  selected: watch::Sender<Option<Faculty>>,
}

impl<S: RecordStore> StudentEntryModel<S> {
  pub fn new(repo: StudentRepository<S>) -> Self {
    let (selected, _) = watch::channel(None);
    Self { repo, selected }
  }

  /// Live faculty list for the selection control.
  pub async fn faculties(&self) -> Result<Live<Vec<Faculty>>, S::Error> {
    self.repo.faculties().await
  }

  pub fn select_faculty(&self, faculty: Faculty) {
    self.selected.send_replace(Some(faculty));
  }

  /// Observable currently-selected faculty; `None` until one is picked.
  pub fn selected_faculty(&self) -> Live<Option<Faculty>> {
    Live::new(self.selected.subscribe())
  }

  pub async fn add_student(&self, input: NewStudent) -> Result<Student, S::Error> {
    self.repo.add_student(input).await
  }

  pub async fn update_student(&self, student: Student) -> Result<(), S::Error> {
    self.repo.update_student(student).await
  }

  pub async fn delete_student(&self, id: i64) -> Result<(), S::Error> {
    self.repo.delete_student(id).await
  }

  /// Edit-mode prefill; an absent id leaves the form on its defaults.
  pub async fn student_by_id(&self, id: i64) -> Result<Option<Student>, S::Error> {
    self.repo.student_by_id(id).await
  }
}
