//! Domain model for the contact directory and its mailing jobs.
//!
//! # Responsibility
//! - Define the records persisted by the repository layer.
//! - Keep parsing/validation of persisted text forms next to the types.
//!
//! # Invariants
//! - Contacts and reminders are identified by storage-assigned integer ids.
//! - Templates are identified by their unique name.

pub mod contact;
pub mod intake;
pub mod reminder;
pub mod tag;
pub mod template;
