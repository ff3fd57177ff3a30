//! HTTP request handlers, grouped by resource.

pub mod auth;
pub mod import;
pub mod inventory;
pub mod notifications;
pub mod organization;
pub mod reports;
pub mod settings;
pub mod tickets;
pub mod users;
