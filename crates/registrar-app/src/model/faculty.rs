//! Faculty view-state: live list with client-side search.

use std::sync::{Arc, Mutex, PoisonError};

use registrar_core::{
  faculty::{Faculty, NewFaculty},
  live::Live,
  store::RecordStore,
};
use tokio::{sync::watch, task::JoinHandle};

use crate::repo::FacultyRepository;

/// Publishes the faculty list for the management screen.
///
/// Search policy for this entity is client-side: the model keeps the latest
/// full snapshot from the live store query and re-filters it in memory on
/// every keystroke — no store round-trip, at the cost of the snapshot
/// briefly lagging the store. The student screens use the opposite,
/// store-side policy.
pub struct FacultyModel<S> {
  repo:  FacultyRepository<S>,
  inner: Arc<Inner>,
  out:   Arc<watch::Sender<Vec<Faculty>>>,
  feed:  JoinHandle<()>,
}

struct Inner {
  query: Mutex<String>,
  all:   Mutex<Vec<Faculty>>,
}

impl Inner {
  fn publish(&self, out: &watch::Sender<Vec<Faculty>>) {
    let all = lock(&self.all);
    let query = lock(&self.query);
    out.send_replace(filter(&all, &query));
  }
}

impl<S: RecordStore> FacultyModel<S> {
  /// Subscribe to the live faculty list and republish it filtered through
  /// the current query. The first snapshot is in place before this returns.
  pub async fn new(repo: FacultyRepository<S>) -> Result<Self, S::Error> {
    let mut live = repo.all_faculties().await?;
    let inner = Arc::new(Inner {
      query: Mutex::new(String::new()),
      all:   Mutex::new(Vec::new()),
    });
    let (out, _) = watch::channel(Vec::new());
    let out = Arc::new(out);

    if let Some(first) = live.next().await {
      *lock(&inner.all) = first;
      inner.publish(&out);
    }

    let feed = tokio::spawn({
      let inner = Arc::clone(&inner);
      let out = Arc::clone(&out);
      async move {
        while let Some(snapshot) = live.next().await {
          *lock(&inner.all) = snapshot;
          inner.publish(&out);
        }
      }
    });

    Ok(Self { repo, inner, out, feed })
  }

  /// Observable filtered faculty list.
  pub fn faculties(&self) -> Live<Vec<Faculty>> {
    Live::new(self.out.subscribe())
  }

  /// Re-filter the in-memory snapshot; an empty query shows everything.
  pub fn search(&self, query: &str) {
    *lock(&self.inner.query) = query.to_owned();
    self.inner.publish(&self.out);
  }

  pub async fn add_faculty(&self, name: &str) -> Result<Faculty, S::Error> {
    self.repo.insert_faculty(NewFaculty { name: name.to_owned() }).await
  }

  pub async fn update_faculty(&self, faculty: Faculty) -> Result<(), S::Error> {
    self.repo.update_faculty(faculty).await
  }

  pub async fn delete_faculty(&self, id: i64) -> Result<(), S::Error> {
    self.repo.delete_faculty(id).await
  }

  /// Point lookup for edit-mode prefill; an absent id leaves the form on
  /// its defaults.
  pub async fn faculty_by_id(&self, id: i64) -> Result<Option<Faculty>, S::Error> {
    self.repo.faculty_by_id(id).await
  }
}

impl<S> Drop for FacultyModel<S> {
  fn drop(&mut self) {
    self.feed.abort();
  }
}

fn filter(all: &[Faculty], query: &str) -> Vec<Faculty> {
  if query.is_empty() {
    return all.to_vec();
  }
  let needle = query.to_lowercase();
  all
    .iter()
    .filter(|f| f.name.to_lowercase().contains(&needle))
    .cloned()
    .collect()
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use registrar_store_sqlite::SqliteStore;

  use super::*;

  async fn model() -> FacultyModel<SqliteStore> {
    let store = Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"));
    FacultyModel::new(FacultyRepository::new(store))
      .await
      .expect("faculty model")
  }

  fn names(faculties: &[Faculty]) -> Vec<&str> {
    faculties.iter().map(|f| f.name.as_str()).collect()
  }

  /// Consume snapshots until one has `len` entries.
  async fn settle(live: &mut Live<Vec<Faculty>>, len: usize) -> Vec<Faculty> {
    loop {
      let snapshot = live.next().await.expect("publisher alive");
      if snapshot.len() == len {
        return snapshot;
      }
    }
  }

  #[tokio::test]
  async fn empty_query_lists_everything_in_insertion_order() {
    let m = model().await;
    for name in ["Physics", "Mathematics", "Biology"] {
      m.add_faculty(name).await.unwrap();
    }

    let mut live = m.faculties();
    let snapshot = settle(&mut live, 3).await;
    assert_eq!(names(&snapshot), ["Physics", "Mathematics", "Biology"]);

    m.search("");
    assert_eq!(live.next().await.unwrap().len(), 3);
  }

  #[tokio::test]
  async fn search_filters_case_insensitively_in_memory() {
    let m = model().await;
    m.add_faculty("Physics").await.unwrap();
    m.add_faculty("Mathematics").await.unwrap();

    let mut live = m.faculties();
    settle(&mut live, 2).await;

    m.search("MATH");
    assert_eq!(names(&live.next().await.unwrap()), ["Mathematics"]);

    m.search("s");
    assert_eq!(
      names(&live.next().await.unwrap()),
      ["Physics", "Mathematics"]
    );
  }

  #[tokio::test]
  async fn store_writes_republish_through_the_active_filter() {
    let m = model().await;
    m.add_faculty("Physics").await.unwrap();

    let mut live = m.faculties();
    settle(&mut live, 1).await;

    m.search("bio");
    assert_eq!(live.next().await.unwrap().len(), 0);

    // A write arriving while a filter is active is folded into it.
    m.add_faculty("Biology").await.unwrap();
    assert_eq!(names(&settle(&mut live, 1).await), ["Biology"]);
  }

  #[tokio::test]
  async fn edit_mode_lookup_returns_none_for_missing_ids() {
    let m = model().await;
    assert_eq!(m.faculty_by_id(42).await.unwrap(), None);
  }
}
