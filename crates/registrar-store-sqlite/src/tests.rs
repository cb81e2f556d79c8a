//! Integration tests for `SqliteStore` against an in-memory database.

use registrar_core::{
  Error as DomainError,
  faculty::{Faculty, NewFaculty},
  store::{RecordStore, SessionStore},
  student::NewStudent,
  user::NewUser,
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

fn faculty(name: &str) -> NewFaculty {
  NewFaculty { name: name.into() }
}

fn student(first: &str, last: &str, faculty_id: i64) -> NewStudent {
  NewStudent {
    first_name: first.into(),
    last_name:  last.into(),
    faculty_id,
    direction:  "Software Engineering".into(),
    avatar:     None,
  }
}

fn user(first: &str, last: &str, username: &str, password: &str) -> NewUser {
  NewUser {
    first_name: first.into(),
    last_name:  last.into(),
    username:   username.into(),
    password:   password.into(),
  }
}

// ─── Faculties ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_faculty() {
  let s = store().await;

  let inserted = s.insert_faculty(faculty("Physics")).await.unwrap();
  let fetched = s.faculty_by_id(inserted.id).await.unwrap();
  assert_eq!(fetched, Some(inserted));
}

#[tokio::test]
async fn ids_are_assigned_from_one_upwards() {
  let s = store().await;

  let a = s.insert_faculty(faculty("Physics")).await.unwrap();
  let b = s.insert_faculty(faculty("Mathematics")).await.unwrap();
  assert_eq!(a.id, 1);
  assert_eq!(b.id, 2);
}

#[tokio::test]
async fn faculty_lookup_missing_returns_none() {
  let s = store().await;
  assert_eq!(s.faculty_by_id(42).await.unwrap(), None);
}

#[tokio::test]
async fn update_missing_faculty_is_silent() {
  let s = store().await;
  s.update_faculty(Faculty { id: 42, name: "Ghost".into() })
    .await
    .unwrap();
  assert_eq!(s.faculty_by_id(42).await.unwrap(), None);
}

#[tokio::test]
async fn delete_missing_faculty_is_a_noop() {
  let s = store().await;
  s.insert_faculty(faculty("Physics")).await.unwrap();

  s.delete_faculty(42).await.unwrap();

  let live = s.watch_faculties().await.unwrap();
  assert_eq!(live.current().len(), 1);
}

#[tokio::test]
async fn delete_referenced_faculty_is_restricted() {
  let s = store().await;
  let f = s.insert_faculty(faculty("Physics")).await.unwrap();
  s.insert_student(student("Ana", "Petrova", f.id)).await.unwrap();

  let err = s.delete_faculty(f.id).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(DomainError::FacultyInUse { id, students: 1 }) if id == f.id
  ));

  // The row must survive the failed delete.
  assert!(s.faculty_by_id(f.id).await.unwrap().is_some());
}

#[tokio::test]
async fn delete_faculty_after_students_leave_succeeds() {
  let s = store().await;
  let f = s.insert_faculty(faculty("Physics")).await.unwrap();
  let st = s.insert_student(student("Ana", "Petrova", f.id)).await.unwrap();

  s.delete_student(st.id).await.unwrap();
  s.delete_faculty(f.id).await.unwrap();
  assert_eq!(s.faculty_by_id(f.id).await.unwrap(), None);
}

#[tokio::test]
async fn faculties_are_listed_in_insertion_order() {
  let s = store().await;
  for name in ["Physics", "Mathematics", "Biology"] {
    s.insert_faculty(faculty(name)).await.unwrap();
  }

  let live = s.watch_faculties().await.unwrap();
  let names: Vec<_> = live.current().into_iter().map(|f| f.name).collect();
  assert_eq!(names, ["Physics", "Mathematics", "Biology"]);
}

#[tokio::test]
async fn watch_faculties_emits_on_every_write() {
  let s = store().await;
  let mut live = s.watch_faculties().await.unwrap();

  // Initial snapshot arrives without any write.
  assert_eq!(live.next().await.unwrap(), []);

  let f = s.insert_faculty(faculty("Physics")).await.unwrap();
  assert_eq!(live.next().await.unwrap(), [f.clone()]);

  s.update_faculty(Faculty { id: f.id, name: "Applied Physics".into() })
    .await
    .unwrap();
  assert_eq!(live.next().await.unwrap()[0].name, "Applied Physics");

  s.delete_faculty(f.id).await.unwrap();
  assert_eq!(live.next().await.unwrap(), []);
}

#[tokio::test]
async fn dropped_watcher_does_not_disturb_later_writes() {
  let s = store().await;
  let live = s.watch_faculties().await.unwrap();
  drop(live);

  s.insert_faculty(faculty("Physics")).await.unwrap();

  let live = s.watch_faculties().await.unwrap();
  assert_eq!(live.current().len(), 1);
}

// ─── Students and the faculty join ───────────────────────────────────────────

#[tokio::test]
async fn join_row_carries_the_faculty_name() {
  let s = store().await;
  let f = s.insert_faculty(faculty("Physics")).await.unwrap();
  let st = s.insert_student(student("Ana", "Petrova", f.id)).await.unwrap();

  let row = s
    .student_with_faculty_by_id(st.id)
    .await
    .unwrap()
    .expect("joined row");
  assert_eq!(row.faculty_name, "Physics");
  assert_eq!(row.first_name, "Ana");
  assert_eq!(row.direction, "Software Engineering");
}

#[tokio::test]
async fn join_reflects_faculty_rename_without_reinserting() {
  let s = store().await;
  let f = s.insert_faculty(faculty("Physics")).await.unwrap();
  s.insert_student(student("Ana", "Petrova", f.id)).await.unwrap();

  let mut live = s.watch_students_with_faculty().await.unwrap();
  assert_eq!(live.next().await.unwrap()[0].faculty_name, "Physics");

  s.update_faculty(Faculty { id: f.id, name: "Astronomy".into() })
    .await
    .unwrap();
  assert_eq!(live.next().await.unwrap()[0].faculty_name, "Astronomy");
}

#[tokio::test]
async fn update_student_moves_it_between_faculties() {
  let s = store().await;
  let physics = s.insert_faculty(faculty("Physics")).await.unwrap();
  let biology = s.insert_faculty(faculty("Biology")).await.unwrap();
  let mut st = s
    .insert_student(student("Ana", "Petrova", physics.id))
    .await
    .unwrap();

  st.faculty_id = biology.id;
  s.update_student(st.clone()).await.unwrap();

  let row = s
    .student_with_faculty_by_id(st.id)
    .await
    .unwrap()
    .expect("joined row");
  assert_eq!(row.faculty_name, "Biology");
}

#[tokio::test]
async fn delete_missing_student_is_a_noop() {
  let s = store().await;
  s.delete_student(42).await.unwrap();
  assert_eq!(s.student_by_id(42).await.unwrap(), None);
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_matches_substrings_case_insensitively() {
  let s = store().await;
  let f = s.insert_faculty(faculty("Physics")).await.unwrap();
  s.insert_student(student("Ana", "Petrova", f.id)).await.unwrap();
  s.insert_student(student("Boris", "Ivanov", f.id)).await.unwrap();

  let live = s.watch_student_search("PETRO").await.unwrap();
  let hits = live.current();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].first_name, "Ana");
}

#[tokio::test]
async fn search_spans_first_and_last_name() {
  let s = store().await;
  let f = s.insert_faculty(faculty("Physics")).await.unwrap();
  s.insert_student(student("Ana", "Petrova", f.id)).await.unwrap();

  let live = s.watch_student_search("na Pet").await.unwrap();
  assert_eq!(live.current().len(), 1);
}

#[tokio::test]
async fn search_with_empty_query_returns_everything() {
  let s = store().await;
  let f = s.insert_faculty(faculty("Physics")).await.unwrap();
  s.insert_student(student("Ana", "Petrova", f.id)).await.unwrap();
  s.insert_student(student("Boris", "Ivanov", f.id)).await.unwrap();

  let live = s.watch_student_search("").await.unwrap();
  assert_eq!(live.current().len(), 2);
}

#[tokio::test]
async fn search_results_stay_live() {
  let s = store().await;
  let f = s.insert_faculty(faculty("Physics")).await.unwrap();

  let mut live = s.watch_student_search("iva").await.unwrap();
  assert_eq!(live.next().await.unwrap(), []);

  s.insert_student(student("Ana", "Petrova", f.id)).await.unwrap();
  assert_eq!(live.next().await.unwrap(), []);

  s.insert_student(student("Boris", "Ivanov", f.id)).await.unwrap();
  let hits = live.next().await.unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].last_name, "Ivanov");
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_find_user_by_username() {
  let s = store().await;
  let inserted = s
    .insert_user(user("Ana", "Petrova", "ana", "password1"))
    .await
    .unwrap();

  let found = s.find_user_by_username("ana").await.unwrap();
  assert_eq!(found, Some(inserted));
}

#[tokio::test]
async fn username_lookup_is_case_sensitive() {
  let s = store().await;
  s.insert_user(user("Ana", "Petrova", "ana", "password1"))
    .await
    .unwrap();

  assert!(s.find_user_by_username("Ana").await.unwrap().is_none());
}

#[tokio::test]
async fn avatar_update_is_visible_to_lookups_and_watchers() {
  let s = store().await;
  s.insert_user(user("Ana", "Petrova", "ana", "password1"))
    .await
    .unwrap();

  let mut live = s.watch_users().await.unwrap();
  assert_eq!(live.next().await.unwrap()[0].avatar, None);

  s.update_user_avatar("ana", "content://avatars/1").await.unwrap();

  let found = s.find_user_by_username("ana").await.unwrap().unwrap();
  assert_eq!(found.avatar.as_deref(), Some("content://avatars/1"));
  assert_eq!(
    live.next().await.unwrap()[0].avatar.as_deref(),
    Some("content://avatars/1")
  );
}

#[tokio::test]
async fn avatar_update_for_missing_user_is_silent() {
  let s = store().await;
  s.update_user_avatar("nobody", "content://avatars/1")
    .await
    .unwrap();
}

// ─── Session ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_starts_empty() {
  let s = store().await;
  assert_eq!(s.signed_in_username().await.unwrap(), None);
}

#[tokio::test]
async fn sign_in_and_sign_out_roundtrip() {
  let s = store().await;

  s.sign_in("ana").await.unwrap();
  assert_eq!(s.signed_in_username().await.unwrap(), Some("ana".into()));

  // Signing in again replaces the slot.
  s.sign_in("boris").await.unwrap();
  assert_eq!(s.signed_in_username().await.unwrap(), Some("boris".into()));

  s.sign_out().await.unwrap();
  assert_eq!(s.signed_in_username().await.unwrap(), None);
}

#[tokio::test]
async fn watch_session_sees_every_transition() {
  let s = store().await;
  let mut live = s.watch_session().await.unwrap();
  assert_eq!(live.next().await.unwrap(), None);

  s.sign_in("ana").await.unwrap();
  assert_eq!(live.next().await.unwrap(), Some("ana".into()));

  s.sign_out().await.unwrap();
  assert_eq!(live.next().await.unwrap(), None);
}

#[tokio::test]
async fn session_survives_a_reopen() {
  let path =
    std::env::temp_dir().join(format!("registrar-session-{}.db", std::process::id()));

  {
    let s = SqliteStore::open(&path).await.expect("file store");
    s.sign_in("ana").await.unwrap();
  }
  {
    let s = SqliteStore::open(&path).await.expect("file store");
    assert_eq!(s.signed_in_username().await.unwrap(), Some("ana".into()));
  }

  for suffix in ["", "-wal", "-shm"] {
    let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
  }
}
