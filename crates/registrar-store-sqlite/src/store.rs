//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`] and
//! [`SessionStore`].

use std::{path::Path, sync::Arc};

use registrar_core::{
  Error as DomainError,
  faculty::{Faculty, NewFaculty},
  live::Live,
  store::{RecordStore, SessionStore},
  student::{NewStudent, Student, StudentWithFaculty},
  user::{NewUser, User},
};
use rusqlite::OptionalExtension as _;
use tokio::sync::watch;

use crate::{
  Error, Result,
  notify::{Refresh, Registry, Tables},
  rows,
  schema::{SCHEMA, SESSION_USERNAME_KEY},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A registrar store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted, and all
/// clones share one live-query registry. Writers are serialized by the
/// connection's dedicated thread; readers never block them.
#[derive(Clone)]
pub struct SqliteStore {
  conn:     tokio_rusqlite::Connection,
  registry: Arc<Registry>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, registry: Arc::new(Registry::default()) };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, registry: Arc::new(Registry::default()) };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `write` on the connection thread and, when it reports a change,
  /// refresh every live query reading one of `touched` before returning.
  async fn write<R>(
    &self,
    touched: Tables,
    write: impl FnOnce(&rusqlite::Connection) -> rusqlite::Result<(R, bool)>
    + Send
    + 'static,
  ) -> Result<R>
  where
    R: Send + 'static,
  {
    let registry = Arc::clone(&self.registry);
    let out = self
      .conn
      .call(move |conn| {
        let (out, changed) = write(conn)?;
        if changed {
          registry.notify(conn, touched)?;
        }
        Ok(out)
      })
      .await?;
    Ok(out)
  }

  /// Register a live query over `tables`: run it once for the initial
  /// snapshot, then re-run it after every intersecting write.
  async fn observe<T, Q>(&self, tables: Tables, query: Q) -> Result<Live<T>>
  where
    T: Clone + Default + Send + Sync + 'static,
    Q: Fn(&rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
  {
    let (tx, rx) = watch::channel(T::default());
    let registry = Arc::clone(&self.registry);
    self
      .conn
      .call(move |conn| {
        let snapshot = query(conn)?;
        let _ = tx.send(snapshot);
        // Registering on the connection thread means no write can slip in
        // between the initial snapshot and the subscription.
        let refresh: Refresh = Box::new(move |conn| {
          if tx.is_closed() {
            return Ok(false);
          }
          Ok(tx.send(query(conn)?).is_ok())
        });
        registry.register(tables, refresh);
        Ok(())
      })
      .await?;
    Ok(Live::new(rx))
  }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn insert_user(&self, input: NewUser) -> Result<User> {
    tracing::debug!(username = %input.username, "inserting user");
    self
      .write(Tables::USERS, move |conn| {
        conn.execute(
          "INSERT INTO users (first_name, last_name, username, password, avatar)
           VALUES (?1, ?2, ?3, ?4, NULL)",
          rusqlite::params![
            input.first_name,
            input.last_name,
            input.username,
            input.password,
          ],
        )?;
        let user = User {
          id:         conn.last_insert_rowid(),
          first_name: input.first_name,
          last_name:  input.last_name,
          username:   input.username,
          password:   input.password,
          avatar:     None,
        };
        Ok((user, true))
      })
      .await
  }

  async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
    let username = username.to_owned();
    let user = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, first_name, last_name, username, password, avatar
               FROM users WHERE username = ?1",
              rusqlite::params![username],
              rows::user_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(user)
  }

  async fn update_user_avatar(&self, username: &str, avatar: &str) -> Result<()> {
    let username = username.to_owned();
    let avatar = avatar.to_owned();
    self
      .write(Tables::USERS, move |conn| {
        let n = conn.execute(
          "UPDATE users SET avatar = ?2 WHERE username = ?1",
          rusqlite::params![username, avatar],
        )?;
        Ok(((), n > 0))
      })
      .await
  }

  async fn watch_users(&self) -> Result<Live<Vec<User>>> {
    self.observe(Tables::USERS, rows::query_users).await
  }

  // ── Faculties ─────────────────────────────────────────────────────────────

  async fn insert_faculty(&self, input: NewFaculty) -> Result<Faculty> {
    tracing::debug!(name = %input.name, "inserting faculty");
    self
      .write(Tables::FACULTIES, move |conn| {
        conn.execute(
          "INSERT INTO faculties (name) VALUES (?1)",
          rusqlite::params![input.name],
        )?;
        let faculty = Faculty { id: conn.last_insert_rowid(), name: input.name };
        Ok((faculty, true))
      })
      .await
  }

  async fn update_faculty(&self, faculty: Faculty) -> Result<()> {
    self
      .write(Tables::FACULTIES, move |conn| {
        let n = conn.execute(
          "UPDATE faculties SET name = ?2 WHERE id = ?1",
          rusqlite::params![faculty.id, faculty.name],
        )?;
        Ok(((), n > 0))
      })
      .await
  }

  async fn delete_faculty(&self, id: i64) -> Result<()> {
    let referenced: usize = self
      .write(Tables::FACULTIES, move |conn| {
        let students: i64 = conn.query_row(
          "SELECT COUNT(*) FROM students WHERE faculty_id = ?1",
          rusqlite::params![id],
          |row| row.get(0),
        )?;
        if students > 0 {
          return Ok((students as usize, false));
        }
        let n = conn.execute(
          "DELETE FROM faculties WHERE id = ?1",
          rusqlite::params![id],
        )?;
        Ok((0, n > 0))
      })
      .await?;

    if referenced > 0 {
      return Err(Error::Core(DomainError::FacultyInUse {
        id,
        students: referenced,
      }));
    }
    Ok(())
  }

  async fn faculty_by_id(&self, id: i64) -> Result<Option<Faculty>> {
    let faculty = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, name FROM faculties WHERE id = ?1",
              rusqlite::params![id],
              rows::faculty_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(faculty)
  }

  async fn watch_faculties(&self) -> Result<Live<Vec<Faculty>>> {
    self.observe(Tables::FACULTIES, rows::query_faculties).await
  }

  // ── Students ──────────────────────────────────────────────────────────────

  async fn insert_student(&self, input: NewStudent) -> Result<Student> {
    tracing::debug!(
      first_name = %input.first_name,
      last_name = %input.last_name,
      "inserting student"
    );
    self
      .write(Tables::STUDENTS, move |conn| {
        conn.execute(
          "INSERT INTO students (first_name, last_name, faculty_id, direction, avatar)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            input.first_name,
            input.last_name,
            input.faculty_id,
            input.direction,
            input.avatar,
          ],
        )?;
        let student = Student {
          id:         conn.last_insert_rowid(),
          first_name: input.first_name,
          last_name:  input.last_name,
          faculty_id: input.faculty_id,
          direction:  input.direction,
          avatar:     input.avatar,
        };
        Ok((student, true))
      })
      .await
  }

  async fn update_student(&self, student: Student) -> Result<()> {
    self
      .write(Tables::STUDENTS, move |conn| {
        let n = conn.execute(
          "UPDATE students
           SET first_name = ?2, last_name = ?3, faculty_id = ?4,
               direction = ?5, avatar = ?6
           WHERE id = ?1",
          rusqlite::params![
            student.id,
            student.first_name,
            student.last_name,
            student.faculty_id,
            student.direction,
            student.avatar,
          ],
        )?;
        Ok(((), n > 0))
      })
      .await
  }

  async fn delete_student(&self, id: i64) -> Result<()> {
    self
      .write(Tables::STUDENTS, move |conn| {
        let n = conn.execute(
          "DELETE FROM students WHERE id = ?1",
          rusqlite::params![id],
        )?;
        Ok(((), n > 0))
      })
      .await
  }

  async fn student_by_id(&self, id: i64) -> Result<Option<Student>> {
    let student = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, first_name, last_name, faculty_id, direction, avatar
               FROM students WHERE id = ?1",
              rusqlite::params![id],
              rows::student_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(student)
  }

  async fn student_with_faculty_by_id(
    &self,
    id: i64,
  ) -> Result<Option<StudentWithFaculty>> {
    let row = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT s.id, s.first_name, s.last_name, f.name, s.direction
               FROM students s
               JOIN faculties f ON f.id = s.faculty_id
               WHERE s.id = ?1",
              rusqlite::params![id],
              rows::student_with_faculty_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(row)
  }

  async fn watch_students_with_faculty(
    &self,
  ) -> Result<Live<Vec<StudentWithFaculty>>> {
    self
      .observe(
        Tables::STUDENTS | Tables::FACULTIES,
        rows::query_students_with_faculty,
      )
      .await
  }

  async fn watch_student_search(
    &self,
    query: &str,
  ) -> Result<Live<Vec<StudentWithFaculty>>> {
    let query = query.to_owned();
    self
      .observe(Tables::STUDENTS | Tables::FACULTIES, move |conn| {
        rows::query_student_search(conn, &query)
      })
      .await
  }
}

// ─── SessionStore impl ───────────────────────────────────────────────────────

impl SessionStore for SqliteStore {
  type Error = Error;

  async fn signed_in_username(&self) -> Result<Option<String>> {
    let username = self.conn.call(|conn| Ok(rows::query_session(conn)?)).await?;
    Ok(username)
  }

  async fn sign_in(&self, username: &str) -> Result<()> {
    tracing::info!(username, "session sign-in");
    let username = username.to_owned();
    self
      .write(Tables::SESSION, move |conn| {
        conn.execute(
          "INSERT INTO session (key, value) VALUES (?1, ?2)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value",
          rusqlite::params![SESSION_USERNAME_KEY, username],
        )?;
        Ok(((), true))
      })
      .await
  }

  async fn sign_out(&self) -> Result<()> {
    tracing::info!("session sign-out");
    self
      .write(Tables::SESSION, move |conn| {
        let n = conn.execute(
          "DELETE FROM session WHERE key = ?1",
          rusqlite::params![SESSION_USERNAME_KEY],
        )?;
        Ok(((), n > 0))
      })
      .await
  }

  async fn watch_session(&self) -> Result<Live<Option<String>>> {
    self.observe(Tables::SESSION, rows::query_session).await
  }
}
