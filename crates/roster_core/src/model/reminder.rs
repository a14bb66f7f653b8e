//! Meeting reminder model and recurrence arithmetic.
//!
//! # Responsibility
//! - Define the recurring reminder row and its `Scheduled`/`Idle` states.
//! - Compute the next fire time from the previous one.
//!
//! # Invariants
//! - Next fire always advances from the previous next fire, never from "now".
//! - `Recurrence::None` clears next fire instead of recomputing it.
//! - Monthly steps use `NaiveDateTime::checked_add_months`, which clamps to
//!   the last valid day of the target month (Jan 31 -> Feb 28/29).

use chrono::{Days, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned reminder identifier.
pub type ReminderId = i64;

/// Persisted text format for next-fire timestamps (local wall clock).
pub const NEXT_FIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ACCEPTED_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Rule that advances next fire after each dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recurrence {
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }

    /// Parses user input case-insensitively. Blank input is an error, not
    /// an implicit `None`.
    pub fn parse(value: &str) -> Result<Self, ReminderValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ReminderValidationError::BlankRecurrence);
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(ReminderValidationError::UnknownRecurrence(
                trimmed.to_string(),
            )),
        }
    }

    /// Returns the fire time one step after `previous`, or `None` for
    /// non-recurring reminders.
    pub fn advance(
        self,
        previous: NaiveDateTime,
    ) -> Result<Option<NaiveDateTime>, ReminderValidationError> {
        let next = match self {
            Self::None => return Ok(None),
            Self::Daily => previous.checked_add_days(Days::new(1)),
            Self::Weekly => previous.checked_add_days(Days::new(7)),
            Self::Monthly => previous.checked_add_months(Months::new(1)),
        };
        next.map(Some)
            .ok_or(ReminderValidationError::NextFireOutOfRange(previous))
    }
}

impl Display for Recurrence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scheduling state derived from next fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    Scheduled,
    Idle,
}

/// Validation failures for reminder input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderValidationError {
    BlankMeetingName,
    BlankRecurrence,
    UnknownRecurrence(String),
    InvalidNextFire(String),
    NextFireOutOfRange(NaiveDateTime),
}

impl Display for ReminderValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankMeetingName => write!(f, "meeting name must not be blank"),
            Self::BlankRecurrence => {
                write!(f, "recurrence must be one of None|Daily|Weekly|Monthly")
            }
            Self::UnknownRecurrence(value) => write!(
                f,
                "unknown recurrence `{value}`; expected None|Daily|Weekly|Monthly"
            ),
            Self::InvalidNextFire(value) => write!(
                f,
                "cannot parse next reminder `{value}`; expected YYYY-MM-DD[ HH:MM[:SS]]"
            ),
            Self::NextFireOutOfRange(value) => {
                write!(f, "next reminder after {value} is out of calendar range")
            }
        }
    }
}

impl Error for ReminderValidationError {}

/// Parses user-entered next fire text.
///
/// Accepts `YYYY-MM-DD` (midnight), `YYYY-MM-DD HH:MM[:SS]` and the `T`
/// separated variants.
pub fn parse_next_fire(value: &str) -> Result<NaiveDateTime, ReminderValidationError> {
    let trimmed = value.trim();
    for format in ACCEPTED_INPUT_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ReminderValidationError::InvalidNextFire(trimmed.to_string()))
}

/// Formats a next fire value for persistence.
pub fn format_next_fire(value: NaiveDateTime) -> String {
    value.format(NEXT_FIRE_FORMAT).to_string()
}

/// Reminder fields supplied by callers before storage assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReminder {
    pub meeting_name: String,
    pub next_fire: NaiveDateTime,
    pub recurrence: Recurrence,
    pub recipient_tags: Vec<String>,
    pub message: String,
}

impl NewReminder {
    /// Builds a reminder from raw form text, failing fast on bad input.
    pub fn from_form(
        meeting_name: &str,
        next_fire: &str,
        recurrence: &str,
        recipient_tags: &str,
        message: &str,
    ) -> Result<Self, ReminderValidationError> {
        let reminder = Self {
            meeting_name: meeting_name.trim().to_string(),
            next_fire: parse_next_fire(next_fire)?,
            recurrence: Recurrence::parse(recurrence)?,
            recipient_tags: crate::model::tag::split_tag_list(recipient_tags),
            message: message.to_string(),
        };
        reminder.validate()?;
        Ok(reminder)
    }

    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        if self.meeting_name.trim().is_empty() {
            return Err(ReminderValidationError::BlankMeetingName);
        }
        Ok(())
    }
}

/// Persisted meeting reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub meeting_name: String,
    /// `None` means the reminder is idle and never fires.
    pub next_fire: Option<NaiveDateTime>,
    pub recurrence: Recurrence,
    pub recipient_tags: Vec<String>,
    pub message: String,
}

impl Reminder {
    pub fn state(&self) -> ReminderState {
        if self.next_fire.is_some() {
            ReminderState::Scheduled
        } else {
            ReminderState::Idle
        }
    }

    /// Due when scheduled and `now` has reached next fire.
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.next_fire.is_some_and(|next| now >= next)
    }

    /// Next fire value to store after a dispatch of this reminder.
    pub fn following_fire(&self) -> Result<Option<NaiveDateTime>, ReminderValidationError> {
        match self.next_fire {
            Some(previous) => self.recurrence.advance(previous),
            None => Ok(None),
        }
    }
}
