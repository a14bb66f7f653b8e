//! Intake response repository.
//!
//! # Responsibility
//! - Append raw form responses on behalf of the form host.
//! - Import one response into `contacts` together with its processed marker.
//!
//! # Invariants
//! - Claiming the marker and appending the contact share one immediate
//!   transaction, so a response becomes at most one contact.
//! - A response whose marker is already set is never imported again.
//! - A missing `intake_responses` table reads as "nothing pending".

use crate::db::table_exists;
use crate::model::contact::{ContactId, NewContact};
use crate::model::intake::{
    IntakeResponse, IntakeResponseId, IntakeSubmission, MARKER_DONE, MARKER_REJECTED,
};
use crate::repo::contact_repo::{insert_contact, RepoResult};
use log::warn;
use rusqlite::{params, Connection, Row, TransactionBehavior};

const INTAKE_SELECT_SQL: &str = "SELECT
    id,
    submitted_at,
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
    processed
FROM intake_responses";

const PENDING_PREDICATE: &str = "(processed IS NULL OR TRIM(processed) = '')";

/// Repository interface for intake responses.
pub trait IntakeRepository {
    fn submit(&self, submission: &IntakeSubmission) -> RepoResult<IntakeResponseId>;
    /// Returns responses without a processed marker in id order.
    fn list_pending(&self) -> RepoResult<Vec<IntakeResponse>>;
    fn get_response(&self, id: IntakeResponseId) -> RepoResult<Option<IntakeResponse>>;
    /// Claims a pending response and appends `contact` atomically.
    ///
    /// Returns `None` when the response was already processed.
    fn import_response(
        &mut self,
        id: IntakeResponseId,
        contact: &NewContact,
    ) -> RepoResult<Option<ContactId>>;
    /// Marks a pending response as rejected. Returns whether a row changed.
    fn reject_response(&self, id: IntakeResponseId) -> RepoResult<bool>;
}

/// SQLite-backed intake store.
pub struct SqliteIntakeRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteIntakeRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl IntakeRepository for SqliteIntakeRepository<'_> {
    fn submit(&self, submission: &IntakeSubmission) -> RepoResult<IntakeResponseId> {
        self.conn.execute(
            "INSERT INTO intake_responses (
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
                submission.full_name.as_str(),
                submission.title.as_str(),
                submission.email.as_str(),
                submission.phone.as_str(),
                submission.location.as_str(),
                submission.bio.as_str(),
                submission.photo_url.as_str(),
                submission.email_tags.as_str(),
                submission.website_display.as_str(),
                submission.status.as_str(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list_pending(&self) -> RepoResult<Vec<IntakeResponse>> {
        if !table_exists(self.conn, "intake_responses")? {
            warn!("event=intake_list module=repo status=degraded reason=missing_table");
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&format!(
            "{INTAKE_SELECT_SQL} WHERE {PENDING_PREDICATE} ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut responses = Vec::new();
        while let Some(row) = rows.next()? {
            responses.push(parse_intake_row(row)?);
        }
        Ok(responses)
    }

    fn get_response(&self, id: IntakeResponseId) -> RepoResult<Option<IntakeResponse>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{INTAKE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_intake_row(row)?));
        }
        Ok(None)
    }

    fn import_response(
        &mut self,
        id: IntakeResponseId,
        contact: &NewContact,
    ) -> RepoResult<Option<ContactId>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let claimed = tx.execute(
            &format!(
                "UPDATE intake_responses
                 SET processed = ?2
                 WHERE id = ?1 AND {PENDING_PREDICATE};"
            ),
            params![id, MARKER_DONE],
        )?;
        if claimed == 0 {
            return Ok(None);
        }

        let contact_id = insert_contact(&tx, contact)?;
        tx.commit()?;
        Ok(Some(contact_id))
    }

    fn reject_response(&self, id: IntakeResponseId) -> RepoResult<bool> {
        let changed = self.conn.execute(
            &format!(
                "UPDATE intake_responses
                 SET processed = ?2
                 WHERE id = ?1 AND {PENDING_PREDICATE};"
            ),
            params![id, MARKER_REJECTED],
        )?;
        Ok(changed > 0)
    }
}

fn parse_intake_row(row: &Row<'_>) -> RepoResult<IntakeResponse> {
    Ok(IntakeResponse {
        id: row.get("id")?,
        submitted_at: row.get("submitted_at")?,
        submission: IntakeSubmission {
            full_name: row.get("full_name")?,
            title: row.get("title")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            location: row.get("location")?,
            bio: row.get("bio")?,
            photo_url: row.get("photo_url")?,
            email_tags: row.get("email_tags")?,
            website_display: row.get("website_display")?,
            status: row.get("status")?,
        },
        processed: row.get("processed")?,
    })
}
