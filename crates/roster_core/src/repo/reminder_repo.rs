//! Meeting reminder repository.
//!
//! # Responsibility
//! - Persist reminder rows and their next fire value.
//! - Decode persisted text columns into typed reminders.
//!
//! # Invariants
//! - `next_fire` is stored as `YYYY-MM-DD HH:MM:SS` text or `NULL` (idle).
//! - Unparseable persisted values surface as `RepoError::InvalidData`.

use crate::model::reminder::{
    format_next_fire, NewReminder, Recurrence, Reminder, ReminderId, NEXT_FIRE_FORMAT,
};
use crate::model::tag::split_tag_list;
use crate::repo::contact_repo::{RepoError, RepoResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row};

const REMINDER_SELECT_SQL: &str = "SELECT
    id,
    meeting_name,
    next_fire,
    recurrence,
    recipient_tags,
    message
FROM reminders";

/// Repository interface for meeting reminders.
pub trait ReminderRepository {
    fn create_reminder(&self, reminder: &NewReminder) -> RepoResult<ReminderId>;
    fn get_reminder(&self, id: ReminderId) -> RepoResult<Option<Reminder>>;
    /// Returns every reminder in id order, idle rows included.
    fn list_reminders(&self) -> RepoResult<Vec<Reminder>>;
    /// Writes a new next fire value; `None` makes the reminder idle.
    fn set_next_fire(&self, id: ReminderId, next_fire: Option<NaiveDateTime>) -> RepoResult<()>;
}

/// SQLite-backed reminder store.
pub struct SqliteReminderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReminderRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ReminderRepository for SqliteReminderRepository<'_> {
    fn create_reminder(&self, reminder: &NewReminder) -> RepoResult<ReminderId> {
        reminder.validate()?;

        self.conn.execute(
            "INSERT INTO reminders (
                meeting_name,
                next_fire,
                recurrence,
                recipient_tags,
                message
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                reminder.meeting_name.trim(),
                format_next_fire(reminder.next_fire),
                reminder.recurrence.as_str(),
                reminder.recipient_tags.join(","),
                reminder.message.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_reminder(&self, id: ReminderId) -> RepoResult<Option<Reminder>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REMINDER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_reminder_row(row)?));
        }
        Ok(None)
    }

    fn list_reminders(&self) -> RepoResult<Vec<Reminder>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REMINDER_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut reminders = Vec::new();
        while let Some(row) = rows.next()? {
            reminders.push(parse_reminder_row(row)?);
        }
        Ok(reminders)
    }

    fn set_next_fire(&self, id: ReminderId, next_fire: Option<NaiveDateTime>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE reminders SET next_fire = ?2 WHERE id = ?1;",
            params![id, next_fire.map(format_next_fire)],
        )?;
        if changed == 0 {
            return Err(RepoError::ReminderNotFound(id));
        }
        Ok(())
    }
}

fn parse_reminder_row(row: &Row<'_>) -> RepoResult<Reminder> {
    let id: ReminderId = row.get("id")?;

    let next_fire = match row.get::<_, Option<String>>("next_fire")? {
        Some(text) if !text.trim().is_empty() => Some(
            NaiveDateTime::parse_from_str(text.trim(), NEXT_FIRE_FORMAT).map_err(|_| {
                RepoError::InvalidData(format!(
                    "invalid next_fire `{text}` in reminders.next_fire (id={id})"
                ))
            })?,
        ),
        _ => None,
    };

    let recurrence_text: String = row.get("recurrence")?;
    let recurrence = Recurrence::parse(&recurrence_text).map_err(|err| {
        RepoError::InvalidData(format!("{err} in reminders.recurrence (id={id})"))
    })?;

    let tags_text: String = row.get("recipient_tags")?;

    Ok(Reminder {
        id,
        meeting_name: row.get("meeting_name")?,
        next_fire,
        recurrence,
        recipient_tags: split_tag_list(&tags_text),
        message: row.get("message")?,
    })
}
