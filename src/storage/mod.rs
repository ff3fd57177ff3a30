//! Storage layer for Facility Desk.
//!
//! Provides database access via SQLx with SQLite.

mod inventory;
mod models;
mod organization;
mod repository;
mod settings;
mod tickets;

pub use repository::DeskRepository;
