//! Domain types for Facility Desk.
//!
//! This module contains the core business entities and value objects.

mod inventory;
mod notification;
mod organization;
mod permission;
mod profile;
mod report;
mod role;
mod settings;
mod ticket;

pub use inventory::*;
pub use notification::*;
pub use organization::*;
pub use permission::*;
pub use profile::*;
pub use report::*;
pub use role::*;
pub use settings::*;
pub use ticket::*;
