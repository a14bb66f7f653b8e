//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Take every store and mail handle as an explicit argument, so hosts
//!   (CLI, schedulers, tests) decide what backs them.

pub mod directory_service;
pub mod dispatch;
pub mod intake_service;
pub mod mail_merge_service;
pub mod provision;
pub mod reminder_service;
pub mod resolver;
