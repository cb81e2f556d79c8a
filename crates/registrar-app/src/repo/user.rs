//! User repository: accounts plus the signed-in session.

use std::sync::Arc;

use registrar_core::{
  auth::{CredentialVerifier, PlaintextCredentials},
  live::Live,
  store::{Store, StoreError},
  user::{NewUser, User},
};

/// Mediates account and session access for the auth, home, and profile
/// screens.
pub struct UserRepository<S, V = PlaintextCredentials> {
  store:    Arc<S>,
  verifier: V,
}

impl<S: Store> UserRepository<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, verifier: PlaintextCredentials }
  }
}

impl<S: Store, V: CredentialVerifier> UserRepository<S, V> {
  /// Swap the credential scheme without touching call sites.
  pub fn with_verifier(store: Arc<S>, verifier: V) -> Self {
    Self { store, verifier }
  }

  /// Live list of every user, ordered by id.
  pub async fn users(&self) -> Result<Live<Vec<User>>, StoreError<S>> {
    self.store.watch_users().await
  }

  /// Exact username lookup. `None` if absent.
  pub async fn user_by_username(
    &self,
    username: &str,
  ) -> Result<Option<User>, StoreError<S>> {
    self.store.find_user_by_username(username).await
  }

  /// Look up `username` and verify `password` against the stored
  /// credential.
  ///
  /// Unknown usernames and wrong passwords are indistinguishable to the
  /// caller; both come back as `None`.
  pub async fn verify_credentials(
    &self,
    username: &str,
    password: &str,
  ) -> Result<Option<User>, StoreError<S>> {
    let user = self.store.find_user_by_username(username).await?;
    Ok(user.filter(|u| self.verifier.verify(password, &u.password)))
  }

  /// Persist a new account. Username uniqueness is the caller's check.
  pub async fn insert_user(&self, input: NewUser) -> Result<User, StoreError<S>> {
    self.store.insert_user(input).await
  }

  /// Mark `username` as the signed-in session user.
  pub async fn sign_in(&self, username: &str) -> Result<(), StoreError<S>> {
    self.store.sign_in(username).await
  }

  /// Clear the session.
  pub async fn sign_out(&self) -> Result<(), StoreError<S>> {
    self.store.sign_out().await
  }

  /// Live view of the signed-in username; `None` while signed out.
  pub async fn session(&self) -> Result<Live<Option<String>>, StoreError<S>> {
    self.store.watch_session().await
  }

  /// Store the picked avatar URI verbatim.
  pub async fn update_avatar(
    &self,
    username: &str,
    avatar: &str,
  ) -> Result<(), StoreError<S>> {
    self.store.update_user_avatar(username, avatar).await
  }
}
