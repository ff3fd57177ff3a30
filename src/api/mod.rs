//! HTTP API layer for Facility Desk.
//!
//! REST endpoints for tickets, organization structure, inventory, settings
//! and user administration.

pub mod extract;
pub mod handlers;
mod routes;
pub mod types;

pub use routes::{build_router, ApiDoc};
