//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - The Google OAuth redirect and callback endpoints
//! - Session cookie delivery and clearing
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;


pub use extractors::AuthedUser;
pub use routes::auth_routes;
