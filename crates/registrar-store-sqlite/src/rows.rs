//! Row-to-domain mapping and the SELECT helpers shared between one-shot
//! reads and live-query refreshes.

use registrar_core::{
  faculty::Faculty,
  student::{Student, StudentWithFaculty},
  user::User,
};
use rusqlite::{Connection, OptionalExtension as _, Row};

use crate::schema::SESSION_USERNAME_KEY;

// ─── Row mapping ─────────────────────────────────────────────────────────────

pub(crate) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
  Ok(User {
    id:         row.get(0)?,
    first_name: row.get(1)?,
    last_name:  row.get(2)?,
    username:   row.get(3)?,
    password:   row.get(4)?,
    avatar:     row.get(5)?,
  })
}

pub(crate) fn faculty_from_row(row: &Row<'_>) -> rusqlite::Result<Faculty> {
  Ok(Faculty { id: row.get(0)?, name: row.get(1)? })
}

pub(crate) fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
  Ok(Student {
    id:         row.get(0)?,
    first_name: row.get(1)?,
    last_name:  row.get(2)?,
    faculty_id: row.get(3)?,
    direction:  row.get(4)?,
    avatar:     row.get(5)?,
  })
}

pub(crate) fn student_with_faculty_from_row(
  row: &Row<'_>,
) -> rusqlite::Result<StudentWithFaculty> {
  Ok(StudentWithFaculty {
    id:           row.get(0)?,
    first_name:   row.get(1)?,
    last_name:    row.get(2)?,
    faculty_name: row.get(3)?,
    direction:    row.get(4)?,
  })
}

// ─── Snapshot queries ────────────────────────────────────────────────────────

pub(crate) fn query_users(conn: &Connection) -> rusqlite::Result<Vec<User>> {
  let mut stmt = conn.prepare(
    "SELECT id, first_name, last_name, username, password, avatar
     FROM users ORDER BY id",
  )?;
  let rows = stmt
    .query_map([], user_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub(crate) fn query_faculties(conn: &Connection) -> rusqlite::Result<Vec<Faculty>> {
  let mut stmt = conn.prepare("SELECT id, name FROM faculties ORDER BY id")?;
  let rows = stmt
    .query_map([], faculty_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub(crate) fn query_students_with_faculty(
  conn: &Connection,
) -> rusqlite::Result<Vec<StudentWithFaculty>> {
  let mut stmt = conn.prepare(
    "SELECT s.id, s.first_name, s.last_name, f.name, s.direction
     FROM students s
     JOIN faculties f ON f.id = s.faculty_id
     ORDER BY s.id",
  )?;
  let rows = stmt
    .query_map([], student_with_faculty_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

/// Substring match on the display name. SQLite's LIKE is case-insensitive
/// for ASCII; an empty query degenerates to the full list.
pub(crate) fn query_student_search(
  conn: &Connection,
  query: &str,
) -> rusqlite::Result<Vec<StudentWithFaculty>> {
  let pattern = format!("%{query}%");
  let mut stmt = conn.prepare(
    "SELECT s.id, s.first_name, s.last_name, f.name, s.direction
     FROM students s
     JOIN faculties f ON f.id = s.faculty_id
     WHERE (s.first_name || ' ' || s.last_name) LIKE ?1
     ORDER BY s.id",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![pattern], student_with_faculty_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub(crate) fn query_session(conn: &Connection) -> rusqlite::Result<Option<String>> {
  conn
    .query_row(
      "SELECT value FROM session WHERE key = ?1",
      rusqlite::params![SESSION_USERNAME_KEY],
      |row| row.get(0),
    )
    .optional()
}
