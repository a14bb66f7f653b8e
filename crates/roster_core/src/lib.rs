//! Core domain logic for the Roster contact directory.
//!
//! Contacts, tag-filtered mail merges and recurring meeting reminders over a
//! SQLite store. Every operation receives its store and mail handles
//! explicitly; hosts decide when to call in.

pub mod config;
pub mod db;
pub mod logging;
pub mod mail;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{load_config, ConfigError, RosterConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use mail::outbox::{QueuedMessage, SqliteOutbox};
pub use mail::render::{render_body, RenderContext};
pub use mail::{MailError, MailTransport, OutgoingMessage};
pub use model::contact::{
    Contact, ContactId, ContactStatus, ContactValidationError, NewContact, PublicProfile, TagSet,
};
pub use model::intake::{IntakeResponse, IntakeResponseId, IntakeSubmission};
pub use model::reminder::{
    parse_next_fire, NewReminder, Recurrence, Reminder, ReminderId, ReminderState,
    ReminderValidationError,
};
pub use model::tag::{TagMatchMode, TagReference};
pub use model::template::MailTemplate;
pub use repo::contact_repo::{ContactRepository, RepoError, RepoResult, SqliteContactRepository};
pub use repo::intake_repo::{IntakeRepository, SqliteIntakeRepository};
pub use repo::reminder_repo::{ReminderRepository, SqliteReminderRepository};
pub use repo::tag_repo::{SqliteTagRepository, TagRepository};
pub use repo::template_repo::{SqliteTemplateRepository, TemplateRepository};
pub use service::directory_service::{DirectoryService, DirectoryServiceError};
pub use service::dispatch::{dispatch, DispatchFailure, DispatchReport};
pub use service::intake_service::{IntakeImportReport, IntakeService, IntakeServiceError};
pub use service::mail_merge_service::{MailMergeError, MailMergeRequest, MailMergeService};
pub use service::provision::{provision_directory, ProvisionReport};
pub use service::reminder_service::{
    FiredReminder, ReminderRunReport, ReminderService, ReminderServiceError, ReminderSettings,
};
pub use service::resolver::{resolve_recipients, Recipient};
