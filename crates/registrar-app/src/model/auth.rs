//! Auth view-state: the login/signup state machine.

use registrar_core::{
  auth::{AuthState, CredentialVerifier, PlaintextCredentials},
  live::Live,
  store::{Store, StoreError},
  user::NewUser,
};
use tokio::sync::watch;

use crate::repo::UserRepository;

/// Message for a failed credential check; identical for unknown usernames
/// and wrong passwords, so a caller cannot probe which accounts exist.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password!";
/// Message for signup with a taken username.
pub const USER_EXISTS: &str = "User already exists!";
/// Message for a completed signup.
pub const REGISTRATION_OK: &str = "Registration successful!";
/// Message shown when the store itself fails mid-flow.
pub const STORAGE_FAILURE: &str = "Something went wrong, please try again.";

/// Drives login and signup and publishes the resulting [`AuthState`].
///
/// Starts at `Idle`; each attempt replaces the current state, and nothing
/// transitions back to `Idle` on its own.
pub struct AuthModel<S, V = PlaintextCredentials> {
  users: UserRepository<S, V>,
  state: watch::Sender<AuthState>,
}

impl<S: Store, V: CredentialVerifier> AuthModel<S, V> {
  pub fn new(users: UserRepository<S, V>) -> Self {
    let (state, _) = watch::channel(AuthState::Idle);
    Self { users, state }
  }

  /// Observable auth state.
  pub fn state(&self) -> Live<AuthState> {
    Live::new(self.state.subscribe())
  }

  /// Live view of the signed-in username, for navigation gating.
  pub async fn session(&self) -> Result<Live<Option<String>>, StoreError<S>> {
    self.users.session().await
  }

  /// Attempt to log in.
  ///
  /// The session write completes before the success state is published, so
  /// a session observer never lags the visible transition.
  pub async fn login(&self, username: &str, password: &str) {
    match self.users.verify_credentials(username, password).await {
      Ok(Some(user)) => {
        if let Err(e) = self.users.sign_in(&user.username).await {
          tracing::error!(error = %e, "persisting the session failed");
          self.state.send_replace(AuthState::Error(STORAGE_FAILURE.into()));
          return;
        }
        self.state.send_replace(AuthState::Success(format!(
          "Welcome {} {}",
          user.first_name, user.last_name
        )));
      }
      Ok(None) => {
        self
          .state
          .send_replace(AuthState::Error(INVALID_CREDENTIALS.into()));
      }
      Err(e) => {
        tracing::error!(error = %e, "credential check failed");
        self.state.send_replace(AuthState::Error(STORAGE_FAILURE.into()));
      }
    }
  }

  /// Register a new account and sign it in.
  ///
  /// A taken username rejects the attempt without inserting anything.
  pub async fn signup(
    &self,
    first_name: &str,
    last_name: &str,
    username: &str,
    password: &str,
  ) {
    let existing = match self.users.user_by_username(username).await {
      Ok(existing) => existing,
      Err(e) => {
        tracing::error!(error = %e, "username lookup failed");
        self.state.send_replace(AuthState::Error(STORAGE_FAILURE.into()));
        return;
      }
    };
    if existing.is_some() {
      self.state.send_replace(AuthState::Error(USER_EXISTS.into()));
      return;
    }

    let input = NewUser {
      first_name: first_name.to_owned(),
      last_name:  last_name.to_owned(),
      username:   username.to_owned(),
      password:   password.to_owned(),
    };
    let signed_up = async {
      self.users.insert_user(input).await?;
      self.users.sign_in(username).await
    };
    match signed_up.await {
      Ok(()) => {
        self
          .state
          .send_replace(AuthState::Success(REGISTRATION_OK.into()));
      }
      Err(e) => {
        tracing::error!(error = %e, "signup failed");
        self.state.send_replace(AuthState::Error(STORAGE_FAILURE.into()));
      }
    }
  }

  /// Clear the persisted session (home-screen logout).
  pub async fn logout(&self) {
    if let Err(e) = self.users.sign_out().await {
      tracing::error!(error = %e, "logout failed");
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use registrar_core::store::SessionStore as _;
  use registrar_store_sqlite::SqliteStore;

  use super::*;

  async fn setup() -> (Arc<SqliteStore>, AuthModel<SqliteStore>) {
    let store = Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"));
    let model = AuthModel::new(UserRepository::new(Arc::clone(&store)));
    (store, model)
  }

  #[tokio::test]
  async fn state_starts_idle() {
    let (_store, m) = setup().await;
    assert_eq!(m.state().current(), AuthState::Idle);
  }

  #[tokio::test]
  async fn signup_then_login_succeeds_with_a_greeting() {
    let (_store, m) = setup().await;

    m.signup("Ana", "Petrova", "ana", "password1").await;
    assert_eq!(m.state().current(), AuthState::Success(REGISTRATION_OK.into()));

    m.login("ana", "password1").await;
    match m.state().current() {
      AuthState::Success(message) => {
        assert!(message.contains("Ana"));
        assert!(message.contains("Petrova"));
      }
      other => panic!("expected success, got {other:?}"),
    }
  }

  #[tokio::test]
  async fn wrong_password_and_unknown_user_read_the_same() {
    let (_store, m) = setup().await;
    m.signup("Ana", "Petrova", "ana", "password1").await;

    m.login("ana", "wrong").await;
    assert_eq!(m.state().current(), AuthState::Error(INVALID_CREDENTIALS.into()));

    m.login("nobody", "password1").await;
    assert_eq!(m.state().current(), AuthState::Error(INVALID_CREDENTIALS.into()));
  }

  #[tokio::test]
  async fn duplicate_signup_is_rejected_without_an_insert() {
    let (store, m) = setup().await;

    m.signup("Ana", "Petrova", "ana", "password1").await;
    m.signup("Another", "Ana", "ana", "password2").await;
    assert_eq!(m.state().current(), AuthState::Error(USER_EXISTS.into()));

    let users = UserRepository::new(store).users().await.unwrap();
    assert_eq!(users.current().len(), 1);
  }

  #[tokio::test]
  async fn signup_signs_the_new_account_in() {
    let (store, m) = setup().await;
    m.signup("Ana", "Petrova", "ana", "password1").await;
    assert_eq!(store.signed_in_username().await.unwrap(), Some("ana".into()));
  }

  #[tokio::test]
  async fn login_persists_the_session_before_reporting_success() {
    let (store, m) = setup().await;
    m.signup("Ana", "Petrova", "ana", "password1").await;
    m.logout().await;

    m.login("ana", "password1").await;
    assert!(matches!(m.state().current(), AuthState::Success(_)));
    assert_eq!(store.signed_in_username().await.unwrap(), Some("ana".into()));
  }

  #[tokio::test]
  async fn failed_login_leaves_the_session_alone() {
    let (store, m) = setup().await;
    m.signup("Ana", "Petrova", "ana", "password1").await;
    m.logout().await;

    m.login("ana", "wrong").await;
    assert_eq!(store.signed_in_username().await.unwrap(), None);
  }

  #[tokio::test]
  async fn logout_clears_the_session() {
    let (_store, m) = setup().await;
    m.signup("Ana", "Petrova", "ana", "password1").await;

    m.logout().await;
    let mut session = m.session().await.unwrap();
    assert_eq!(session.next().await.unwrap(), None);
  }
}
