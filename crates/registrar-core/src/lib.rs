//! Core types and trait definitions for the registrar data layer.
//!
//! This crate is deliberately free of database and terminal dependencies.
//! All other crates depend on it; the heaviest thing it pulls in is
//! `tokio::sync`.

pub mod auth;
pub mod error;
pub mod faculty;
pub mod live;
pub mod store;
pub mod student;
pub mod user;

pub use error::{Error, Result};
pub use live::Live;
