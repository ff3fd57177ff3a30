//! Application services shared by the HTTP layer and the CLI.
//!
//! - `permissions`: the in-memory permission matrix and checks
//! - `session`: resolves the caller's stored profile from a token subject
//! - `notifier`: renders templates into in-app notifications
//! - `users`: admin user operations and their invariants

mod notifier;
mod permissions;
mod session;
mod users;

pub use notifier::*;
pub use permissions::*;
pub use session::*;
pub use users::*;
