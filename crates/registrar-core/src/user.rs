//! User — the account record behind signup, login, and the profile screen.

use serde::{Deserialize, Serialize};

/// A registered account.
///
/// Created at signup; only the avatar is mutated afterwards, and rows are
/// never deleted in-app. The username is unique case-sensitively — checked
/// by the signup flow before insert, not by the storage schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:         i64,
  pub first_name: String,
  pub last_name:  String,
  pub username:   String,
  /// Stored verbatim; compared through
  /// [`CredentialVerifier`](crate::auth::CredentialVerifier).
  pub password:   String,
  /// Opaque URI supplied by the image picker; never interpreted.
  pub avatar:     Option<String>,
}

/// Input for inserting a user; the id is store-assigned.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub first_name: String,
  pub last_name:  String,
  pub username:   String,
  pub password:   String,
}
