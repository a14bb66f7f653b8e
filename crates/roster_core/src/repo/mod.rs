//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts, one trait per table.
//! - Isolate SQLite query details from service orchestration, so services
//!   can be driven by any store handle passed in.
//!
//! # Invariants
//! - Repository writes validate input before persistence.
//! - Repository APIs return semantic errors (`ContactNotFound`,
//!   `ReminderNotFound`) in addition to DB transport errors.

pub mod contact_repo;
pub mod intake_repo;
pub mod reminder_repo;
pub mod tag_repo;
pub mod template_repo;
