//! Contact repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `contacts` table.
//! - Own the shared repository error type.
//!
//! # Invariants
//! - Write paths call `NewContact::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - A missing `contacts` table reads as an empty directory.

use crate::db::{table_exists, DbError};
use crate::model::contact::{
    Contact, ContactId, ContactStatus, ContactValidationError, NewContact, TagSet,
};
use crate::model::reminder::{ReminderId, ReminderValidationError};
use log::warn;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    full_name,
    title,
    email,
    phone,
    location,
    bio,
    photo_url,
    email_tags,
    website_display,
    status,
    last_updated
FROM contacts";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every table-backed repository.
#[derive(Debug)]
pub enum RepoError {
    ContactValidation(ContactValidationError),
    ReminderValidation(ReminderValidationError),
    Db(DbError),
    ContactNotFound(ContactId),
    ReminderNotFound(ReminderId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContactValidation(err) => write!(f, "{err}"),
            Self::ReminderValidation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::ContactNotFound(id) => write!(f, "contact not found: {id}"),
            Self::ReminderNotFound(id) => write!(f, "reminder not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ContactValidation(err) => Some(err),
            Self::ReminderValidation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::ContactNotFound(_) | Self::ReminderNotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ContactValidationError> for RepoError {
    fn from(value: ContactValidationError) -> Self {
        Self::ContactValidation(value)
    }
}

impl From<ReminderValidationError> for RepoError {
    fn from(value: ReminderValidationError) -> Self {
        Self::ReminderValidation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for directory contacts.
pub trait ContactRepository {
    /// Appends one contact and returns its assigned id.
    fn create_contact(&self, contact: &NewContact) -> RepoResult<ContactId>;
    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>>;
    /// Returns every contact in id (row) order.
    fn list_contacts(&self) -> RepoResult<Vec<Contact>>;
    fn update_status(&self, id: ContactId, status: ContactStatus) -> RepoResult<()>;
    /// Replaces the full tag set of one contact.
    fn set_tags(&self, id: ContactId, tags: &TagSet) -> RepoResult<()>;
    fn count_contacts(&self) -> RepoResult<u64>;
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteContactRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ContactRepository for SqliteContactRepository<'_> {
    fn create_contact(&self, contact: &NewContact) -> RepoResult<ContactId> {
        insert_contact(self.conn, contact)
    }

    fn get_contact(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_contact_row(row)?));
        }
        Ok(None)
    }

    fn list_contacts(&self) -> RepoResult<Vec<Contact>> {
        if !table_exists(self.conn, "contacts")? {
            warn!("event=contacts_list module=repo status=degraded reason=missing_table");
            return Ok(Vec::new());
        }

        let mut stmt = self
            .conn
            .prepare(&format!("{CONTACT_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut contacts = Vec::new();
        while let Some(row) = rows.next()? {
            contacts.push(parse_contact_row(row)?);
        }
        Ok(contacts)
    }

    fn update_status(&self, id: ContactId, status: ContactStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE contacts
             SET
                status = ?2,
                last_updated = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id, status.as_str()],
        )?;
        if changed == 0 {
            return Err(RepoError::ContactNotFound(id));
        }
        Ok(())
    }

    fn set_tags(&self, id: ContactId, tags: &TagSet) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE contacts
             SET
                email_tags = ?2,
                last_updated = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id, tags.joined()],
        )?;
        if changed == 0 {
            return Err(RepoError::ContactNotFound(id));
        }
        Ok(())
    }

    fn count_contacts(&self) -> RepoResult<u64> {
        if !table_exists(self.conn, "contacts")? {
            return Ok(0);
        }
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM contacts;", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

/// Inserts one contact on any connection or open transaction.
///
/// Shared with intake import, which appends inside its own transaction.
pub(crate) fn insert_contact(conn: &Connection, contact: &NewContact) -> RepoResult<ContactId> {
    contact.validate()?;

    conn.execute(
        "INSERT INTO contacts (
            full_name,
            title,
            email,
            phone,
            location,
            bio,
            photo_url,
            email_tags,
            website_display,
            status
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
        params![
            contact.full_name.trim(),
            contact.title.as_str(),
            contact.email.trim(),
            contact.phone.as_str(),
            contact.location.as_str(),
            contact.bio.as_str(),
            contact.photo_url.as_str(),
            contact.tags.joined(),
            i64::from(contact.website_display),
            contact.status.as_str(),
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let id: ContactId = row.get("id")?;

    let status_text: String = row.get("status")?;
    let status = ContactStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in contacts.status (id={id})"
        ))
    })?;

    let website_display = match row.get::<_, i64>("website_display")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid website_display value `{other}` in contacts.website_display (id={id})"
            )));
        }
    };

    let tags_text: String = row.get("email_tags")?;

    Ok(Contact {
        id,
        full_name: row.get("full_name")?,
        title: row.get("title")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        location: row.get("location")?,
        bio: row.get("bio")?,
        photo_url: row.get("photo_url")?,
        tags: TagSet::parse(&tags_text),
        website_display,
        status,
        last_updated: row.get("last_updated")?,
    })
}
