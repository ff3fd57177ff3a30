//! Authentication module for Facility Desk.
//!
//! Accounts sign in with email and password and receive a JWT. Every
//! protected route validates the bearer token; the role used for
//! authorization is always read from the stored profile, never the token.

mod jwt;
mod middleware;
mod password;

pub use jwt::*;
pub use middleware::*;
pub use password::*;
