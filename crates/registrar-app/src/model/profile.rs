//! Profile view-state: the signed-in user and avatar updates.

use std::sync::Arc;

use registrar_core::{
  auth::{CredentialVerifier, PlaintextCredentials},
  live::Live,
  store::{Store, StoreError},
  user::User,
};
use tokio::{sync::watch, task::JoinHandle};

use crate::repo::UserRepository;

/// Publishes the signed-in user for the profile screen.
///
/// The observable is the session slot joined with the live user list, so
/// both sign-in/sign-out transitions and avatar updates republish without
/// any re-fetch by the consumer.
pub struct ProfileModel<S, V = PlaintextCredentials> {
  users: UserRepository<S, V>,
  out:   Arc<watch::Sender<Option<User>>>,
  feed:  JoinHandle<()>,
}

impl<S: Store, V: CredentialVerifier> ProfileModel<S, V> {
  /// Subscribe to the session and user observables. The first combined
  /// snapshot is in place before this returns.
  pub async fn new(users: UserRepository<S, V>) -> Result<Self, StoreError<S>> {
    let mut session = users.session().await?;
    let mut all_users = users.users().await?;

    let mut username = session.next().await.unwrap_or(None);
    let mut snapshot = all_users.next().await.unwrap_or_default();

    let (out, _) = watch::channel(resolve(username.as_deref(), &snapshot));
    let out = Arc::new(out);

    let feed = tokio::spawn({
      let out = Arc::clone(&out);
      async move {
        loop {
          tokio::select! {
            changed = session.next() => match changed {
              Some(current) => username = current,
              None => break,
            },
            changed = all_users.next() => match changed {
              Some(current) => snapshot = current,
              None => break,
            },
          }
          out.send_replace(resolve(username.as_deref(), &snapshot));
        }
      }
    });

    Ok(Self { users, out, feed })
  }

  /// Observable signed-in user. `None` while signed out — or when the
  /// session names a user that no longer exists, which consumers treat the
  /// same way.
  pub fn user(&self) -> Live<Option<User>> {
    Live::new(self.out.subscribe())
  }

  /// Store the picked avatar URI for the signed-in user; a no-op while
  /// signed out. The value is opaque to the data layer.
  pub async fn save_avatar(&self, avatar: &str) -> Result<(), StoreError<S>> {
    let Some(user) = self.out.borrow().clone() else {
      return Ok(());
    };
    tracing::debug!(username = %user.username, "saving avatar");
    self.users.update_avatar(&user.username, avatar).await
  }
}

impl<S, V> Drop for ProfileModel<S, V> {
  fn drop(&mut self) {
    self.feed.abort();
  }
}

fn resolve(username: Option<&str>, users: &[User]) -> Option<User> {
  let username = username?;
  users.iter().find(|u| u.username == username).cloned()
}

#[cfg(test)]
mod tests {
  use registrar_core::{
    store::{RecordStore as _, SessionStore as _},
    user::NewUser,
  };
  use registrar_store_sqlite::SqliteStore;

  use super::*;

  async fn setup() -> Arc<SqliteStore> {
    let store = Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"));
    let repo = UserRepository::new(Arc::clone(&store));
    repo
      .insert_user(NewUser {
        first_name: "Ana".into(),
        last_name:  "Petrova".into(),
        username:   "ana".into(),
        password:   "password1".into(),
      })
      .await
      .unwrap();
    store
  }

  #[tokio::test]
  async fn resolves_the_signed_in_user() {
    let store = setup().await;
    store.sign_in("ana").await.unwrap();

    let profile = ProfileModel::new(UserRepository::new(store)).await.unwrap();
    let user = profile.user().current().expect("signed-in user");
    assert_eq!(user.username, "ana");
  }

  #[tokio::test]
  async fn yields_none_while_signed_out() {
    let store = setup().await;
    let profile = ProfileModel::new(UserRepository::new(store)).await.unwrap();
    assert_eq!(profile.user().current(), None);
  }

  #[tokio::test]
  async fn sign_in_and_out_flow_through_the_observable() {
    let store = setup().await;
    let profile = ProfileModel::new(UserRepository::new(Arc::clone(&store)))
      .await
      .unwrap();
    let mut live = profile.user();
    assert_eq!(live.next().await.unwrap(), None);

    store.sign_in("ana").await.unwrap();
    assert_eq!(live.next().await.unwrap().map(|u| u.username), Some("ana".into()));

    store.sign_out().await.unwrap();
    assert_eq!(live.next().await.unwrap(), None);
  }

  #[tokio::test]
  async fn save_avatar_republishes_the_profile() {
    let store = setup().await;
    store.sign_in("ana").await.unwrap();

    let profile = ProfileModel::new(UserRepository::new(store)).await.unwrap();
    let mut live = profile.user();
    assert_eq!(live.next().await.unwrap().and_then(|u| u.avatar), None);

    profile.save_avatar("content://avatars/7").await.unwrap();
    assert_eq!(
      live.next().await.unwrap().and_then(|u| u.avatar).as_deref(),
      Some("content://avatars/7")
    );
  }

  #[tokio::test]
  async fn save_avatar_is_a_noop_while_signed_out() {
    let store = setup().await;
    let profile = ProfileModel::new(UserRepository::new(Arc::clone(&store)))
      .await
      .unwrap();

    profile.save_avatar("content://avatars/7").await.unwrap();

    let untouched = store.find_user_by_username("ana").await.unwrap().unwrap();
    assert_eq!(untouched.avatar, None);
  }
}
