//! View-state holders, one per screen family.
//!
//! Each holds UI-facing state in a watch channel, owns its store
//! subscriptions through tasks aborted on drop, and converts repository
//! failures into renderable states — raw faults never reach a UI surface.

mod auth;
mod faculty;
mod profile;
mod student;

pub use auth::{
  AuthModel, INVALID_CREDENTIALS, REGISTRATION_OK, STORAGE_FAILURE, USER_EXISTS,
};
pub use faculty::FacultyModel;
pub use profile::ProfileModel;
pub use student::{StudentEntryModel, StudentModel};
