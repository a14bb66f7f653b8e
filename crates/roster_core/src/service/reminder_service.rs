//! Meeting reminder use-case service.
//!
//! # Responsibility
//! - Create and list recurring meeting reminders.
//! - Run the due check invoked by an external daily trigger.
//!
//! # Invariants
//! - A due reminder's next fire is written right after its own send loop and
//!   before the next reminder is looked at, so a repeated trigger after the
//!   same due moment sends nothing.
//! - Next fire advances one step from the previous next fire per run.
//! - The follow-up fire time is computed before sending; a reminder whose
//!   schedule cannot advance is reported and left untouched.
//! - Recurrence `None` turns the reminder idle after it fires once.

use crate::mail::MailTransport;
use crate::model::reminder::{NewReminder, Reminder, ReminderId, ReminderValidationError};
use crate::model::tag::TagMatchMode;
use crate::repo::contact_repo::{ContactRepository, RepoError};
use crate::repo::reminder_repo::ReminderRepository;
use crate::service::dispatch::{dispatch, DispatchReport};
use crate::service::resolver::resolve_from_repo;
use chrono::NaiveDateTime;
use log::{error, info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub const DEFAULT_SUBJECT_PREFIX: &str = "Reminder: ";

/// Service error for reminder use-cases.
#[derive(Debug)]
pub enum ReminderServiceError {
    Validation(ReminderValidationError),
    ReminderNotFound(ReminderId),
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for ReminderServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ReminderNotFound(id) => write!(f, "reminder not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent reminder state: {details}"),
        }
    }
}

impl Error for ReminderServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ReminderValidationError> for ReminderServiceError {
    fn from(value: ReminderValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ReminderServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ReminderNotFound(id) => Self::ReminderNotFound(id),
            RepoError::ReminderValidation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Tunables for reminder dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderSettings {
    pub match_mode: TagMatchMode,
    /// Prepended to the meeting name to form the subject.
    pub subject_prefix: String,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            match_mode: TagMatchMode::default(),
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
        }
    }
}

/// One reminder that fired during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FiredReminder {
    pub reminder_id: ReminderId,
    pub meeting_name: String,
    pub dispatch: DispatchReport,
    /// Value written back; `None` means the reminder went idle.
    pub next_fire: Option<NaiveDateTime>,
}

/// A due reminder that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedReminder {
    pub reminder_id: ReminderId,
    pub reason: String,
}

/// Outcome of one due check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReminderRunReport {
    /// Rows looked at, idle ones included.
    pub checked: usize,
    pub fired: Vec<FiredReminder>,
    pub skipped: Vec<SkippedReminder>,
}

impl ReminderRunReport {
    pub fn total_sent(&self) -> usize {
        self.fired.iter().map(|fired| fired.dispatch.sent).sum()
    }

    pub fn total_failed(&self) -> usize {
        self.fired.iter().map(|fired| fired.dispatch.failed()).sum()
    }
}

/// Reminder facade over reminder and contact repositories.
pub struct ReminderService<R: ReminderRepository, C: ContactRepository> {
    reminders: R,
    contacts: C,
    settings: ReminderSettings,
}

impl<R: ReminderRepository, C: ContactRepository> ReminderService<R, C> {
    pub fn new(reminders: R, contacts: C, settings: ReminderSettings) -> Self {
        Self {
            reminders,
            contacts,
            settings,
        }
    }

    pub fn add_reminder(&self, reminder: &NewReminder) -> Result<Reminder, ReminderServiceError> {
        let id = self.reminders.create_reminder(reminder)?;
        info!(
            "event=reminder_add module=reminder status=ok reminder_id={} recurrence={}",
            id, reminder.recurrence
        );
        self.reminders
            .get_reminder(id)?
            .ok_or(ReminderServiceError::InconsistentState(
                "created reminder not found in read-back",
            ))
    }

    /// Creates a reminder from raw form text.
    pub fn add_reminder_from_form(
        &self,
        meeting_name: &str,
        next_fire: &str,
        recurrence: &str,
        recipient_tags: &str,
        message: &str,
    ) -> Result<Reminder, ReminderServiceError> {
        let reminder =
            NewReminder::from_form(meeting_name, next_fire, recurrence, recipient_tags, message)?;
        self.add_reminder(&reminder)
    }

    pub fn get_reminder(&self, id: ReminderId) -> Result<Option<Reminder>, ReminderServiceError> {
        Ok(self.reminders.get_reminder(id)?)
    }

    pub fn list_reminders(&self) -> Result<Vec<Reminder>, ReminderServiceError> {
        Ok(self.reminders.list_reminders()?)
    }

    /// Sends every reminder due at `now` and advances its next fire.
    pub fn run_due<M: MailTransport + ?Sized>(
        &self,
        now: NaiveDateTime,
        transport: &mut M,
    ) -> Result<ReminderRunReport, ReminderServiceError> {
        let reminders = self.reminders.list_reminders()?;
        let mut report = ReminderRunReport {
            checked: reminders.len(),
            ..ReminderRunReport::default()
        };

        for reminder in reminders.iter().filter(|reminder| reminder.is_due(now)) {
            let next_fire = match reminder.following_fire() {
                Ok(next_fire) => next_fire,
                Err(err) => {
                    warn!(
                        "event=reminder_fire module=reminder status=skipped reminder_id={} error={}",
                        reminder.id, err
                    );
                    report.skipped.push(SkippedReminder {
                        reminder_id: reminder.id,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            let dispatch_report = self.fire(reminder, transport)?;

            if let Err(err) = self.reminders.set_next_fire(reminder.id, next_fire) {
                error!(
                    "event=reminder_advance module=reminder status=error reminder_id={} run_id={} error={}",
                    reminder.id, dispatch_report.run_id, err
                );
                return Err(err.into());
            }

            info!(
                "event=reminder_fire module=reminder status=ok reminder_id={} run_id={} sent={} failed={} state={}",
                reminder.id,
                dispatch_report.run_id,
                dispatch_report.sent,
                dispatch_report.failed(),
                if next_fire.is_some() { "scheduled" } else { "idle" }
            );
            report.fired.push(FiredReminder {
                reminder_id: reminder.id,
                meeting_name: reminder.meeting_name.clone(),
                dispatch: dispatch_report,
                next_fire,
            });
        }

        info!(
            "event=reminder_run module=reminder status=ok checked={} fired={} skipped={} sent={} failed={}",
            report.checked,
            report.fired.len(),
            report.skipped.len(),
            report.total_sent(),
            report.total_failed()
        );
        Ok(report)
    }

    fn fire<M: MailTransport + ?Sized>(
        &self,
        reminder: &Reminder,
        transport: &mut M,
    ) -> Result<DispatchReport, ReminderServiceError> {
        let recipients = resolve_from_repo(
            &self.contacts,
            &reminder.recipient_tags,
            self.settings.match_mode,
        )?;
        let subject = format!("{}{}", self.settings.subject_prefix, reminder.meeting_name);
        Ok(dispatch(
            transport,
            Uuid::new_v4(),
            &recipients,
            subject.as_str(),
            reminder.message.as_str(),
        ))
    }
}
