//! # Users Module
//!
//! Persistent user records keyed by email and Google subject id, with
//! find-or-create-or-update semantics for sign-in callbacks.

pub mod directory;
pub mod models;

pub use directory::UserDirectory;
pub use models::User;
