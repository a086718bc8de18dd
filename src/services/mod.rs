//! External-facing service adapters

pub mod google;
pub mod session;

pub use google::{GoogleClient, GoogleError, GoogleIdentity};
pub use session::{Claims, SessionService};
