//! `registrar` — terminal front end for the registrar data layer.
//!
//! # Usage
//!
//! ```
//! registrar signup Ana Petrova ana password1
//! registrar login ana password1
//! registrar faculty add Physics
//! registrar student add --first-name Ana --last-name Petrova \
//!     --faculty-id 1 --direction "Software Engineering"
//! registrar student list --query petro --follow
//! ```
//!
//! The session is persisted in the store, so login survives across
//! invocations until `registrar logout`.

mod settings;

use std::sync::Arc;

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use registrar_app::{
  model::{AuthModel, FacultyModel, ProfileModel, StudentEntryModel, StudentModel},
  repo::{FacultyRepository, StudentRepository, UserRepository},
};
use registrar_core::{
  auth::AuthState,
  faculty::Faculty,
  live::Live,
  store::SessionStore as _,
  student::{NewStudent, Student, StudentWithFaculty},
};
use registrar_store_sqlite::SqliteStore;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use settings::Settings;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "registrar", about = "Student and faculty records over a local store")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "registrar.toml")]
  config: std::path::PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create an account and sign it in.
  Signup {
    first_name: String,
    last_name:  String,
    username:   String,
    password:   String,
  },
  /// Sign in with an existing account.
  Login { username: String, password: String },
  /// Clear the persisted session.
  Logout,
  /// Show the signed-in username.
  Whoami,
  /// Store an avatar URI for the signed-in user.
  Avatar { uri: String },
  /// Faculty management.
  #[command(subcommand)]
  Faculty(FacultyCommand),
  /// Student management.
  #[command(subcommand)]
  Student(StudentCommand),
}

#[derive(Subcommand)]
enum FacultyCommand {
  /// Add a faculty.
  Add { name: String },
  /// List faculties, optionally filtered.
  List {
    /// Case-insensitive substring filter on the name.
    #[arg(short, long, default_value = "")]
    query: String,
    /// Keep printing fresh snapshots as the table changes.
    #[arg(long)]
    follow: bool,
    /// Print as JSON.
    #[arg(long)]
    json: bool,
  },
  /// Rename a faculty.
  Update { id: i64, name: String },
  /// Delete a faculty (restricted while students reference it).
  Rm { id: i64 },
}

#[derive(Subcommand)]
enum StudentCommand {
  /// Add a student.
  Add {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name:  String,
    #[arg(long)]
    faculty_id: i64,
    #[arg(long)]
    direction:  String,
    #[arg(long)]
    avatar:     Option<String>,
  },
  /// List students with their faculty, optionally searched.
  List {
    /// Case-insensitive substring search over first and last name.
    #[arg(short, long, default_value = "")]
    query: String,
    /// Keep printing fresh snapshots as the tables change.
    #[arg(long)]
    follow: bool,
    /// Print as JSON.
    #[arg(long)]
    json: bool,
  },
  /// Replace a student row.
  Update {
    id: i64,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name:  String,
    #[arg(long)]
    faculty_id: i64,
    #[arg(long)]
    direction:  String,
    #[arg(long)]
    avatar:     Option<String>,
  },
  /// Delete a student.
  Rm { id: i64 },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config).context("failed to load configuration")?;

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;
  tracing::debug!(path = %settings.store_path.display(), "store opened");
  let store = Arc::new(store);

  match cli.command {
    Command::Signup { first_name, last_name, username, password } => {
      require_nonempty(&[
        ("first name", &first_name),
        ("last name", &last_name),
        ("username", &username),
        ("password", &password),
      ])?;
      let auth = AuthModel::new(UserRepository::new(store));
      auth.signup(&first_name, &last_name, &username, &password).await;
      report_auth(&auth)
    }
    Command::Login { username, password } => {
      let auth = AuthModel::new(UserRepository::new(store));
      auth.login(&username, &password).await;
      report_auth(&auth)
    }
    Command::Logout => {
      AuthModel::new(UserRepository::new(store)).logout().await;
      println!("Signed out.");
      Ok(())
    }
    Command::Whoami => {
      match store.signed_in_username().await? {
        Some(username) => println!("{username}"),
        None => println!("(not signed in)"),
      }
      Ok(())
    }
    Command::Avatar { uri } => {
      let profile = ProfileModel::new(UserRepository::new(store)).await?;
      let Some(user) = profile.user().current() else {
        bail!("not signed in");
      };
      profile.save_avatar(&uri).await?;
      println!("Avatar updated for {}.", user.username);
      Ok(())
    }
    Command::Faculty(cmd) => run_faculty(store, cmd).await,
    Command::Student(cmd) => run_student(store, cmd).await,
  }
}

// ─── Subcommand handlers ──────────────────────────────────────────────────────

async fn run_faculty(store: Arc<SqliteStore>, cmd: FacultyCommand) -> Result<()> {
  let model = FacultyModel::new(FacultyRepository::new(store)).await?;
  match cmd {
    FacultyCommand::Add { name } => {
      require_nonempty(&[("name", &name)])?;
      let faculty = model.add_faculty(&name).await?;
      println!("Added faculty #{}: {}", faculty.id, faculty.name);
    }
    FacultyCommand::List { query, follow, json } => {
      model.search(&query);
      let mut live = model.faculties();
      render_snapshots(&mut live, follow, json, print_faculties).await?;
    }
    FacultyCommand::Update { id, name } => {
      require_nonempty(&[("name", &name)])?;
      model.update_faculty(Faculty { id, name }).await?;
      println!("Updated faculty #{id}.");
    }
    FacultyCommand::Rm { id } => {
      model.delete_faculty(id).await?;
      println!("Deleted faculty #{id}.");
    }
  }
  Ok(())
}

async fn run_student(store: Arc<SqliteStore>, cmd: StudentCommand) -> Result<()> {
  match cmd {
    StudentCommand::Add { first_name, last_name, faculty_id, direction, avatar } => {
      require_nonempty(&[
        ("first name", &first_name),
        ("last name", &last_name),
        ("direction", &direction),
      ])?;
      let entry = StudentEntryModel::new(StudentRepository::new(store));
      let faculties = entry.faculties().await?.current();
      let faculty = faculties
        .into_iter()
        .find(|f| f.id == faculty_id)
        .with_context(|| format!("no faculty #{faculty_id}"))?;
      entry.select_faculty(faculty.clone());

      let student = entry
        .add_student(NewStudent {
          first_name,
          last_name,
          faculty_id: faculty.id,
          direction,
          avatar,
        })
        .await?;
      println!(
        "Added student #{}: {} {} ({})",
        student.id, student.first_name, student.last_name, faculty.name
      );
    }
    StudentCommand::List { query, follow, json } => {
      let model = StudentModel::new(StudentRepository::new(store)).await?;
      model.search(&query).await?;
      let mut live = model.students();
      render_snapshots(&mut live, follow, json, print_students).await?;
    }
    StudentCommand::Update { id, first_name, last_name, faculty_id, direction, avatar } => {
      let entry = StudentEntryModel::new(StudentRepository::new(store));
      entry
        .update_student(Student {
          id,
          first_name,
          last_name,
          faculty_id,
          direction,
          avatar,
        })
        .await?;
      println!("Updated student #{id}.");
    }
    StudentCommand::Rm { id } => {
      let entry = StudentEntryModel::new(StudentRepository::new(store));
      entry.delete_student(id).await?;
      println!("Deleted student #{id}.");
    }
  }
  Ok(())
}

// ─── Rendering ────────────────────────────────────────────────────────────────

/// Print the current snapshot; with `follow`, keep printing each fresh one
/// until interrupted.
async fn render_snapshots<T, F>(
  live: &mut Live<Vec<T>>,
  follow: bool,
  json: bool,
  print: F,
) -> Result<()>
where
  T: Clone + Serialize,
  F: Fn(&[T]),
{
  while let Some(snapshot) = live.next().await {
    if json {
      println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
      print(&snapshot);
    }
    if !follow {
      break;
    }
  }
  Ok(())
}

fn print_faculties(faculties: &[Faculty]) {
  if faculties.is_empty() {
    println!("(no faculties)");
    return;
  }
  for f in faculties {
    println!("{:>4}  {}", f.id, f.name);
  }
}

fn print_students(students: &[StudentWithFaculty]) {
  if students.is_empty() {
    println!("(no students)");
    return;
  }
  for s in students {
    println!(
      "{:>4}  {} {}  [{}]  {}",
      s.id, s.first_name, s.last_name, s.faculty_name, s.direction
    );
  }
}

fn report_auth(auth: &AuthModel<SqliteStore>) -> Result<()> {
  match auth.state().current() {
    AuthState::Success(message) => {
      println!("{message}");
      Ok(())
    }
    AuthState::Error(message) => bail!("{message}"),
    AuthState::Idle => bail!("no auth attempt completed"),
  }
}

/// Form-level validation: required fields must not be blank.
fn require_nonempty(fields: &[(&str, &str)]) -> Result<()> {
  for (label, value) in fields {
    if value.trim().is_empty() {
      bail!("{label} must not be empty");
    }
  }
  Ok(())
}
