//! SQLite outbox transport.
//!
//! Queues rendered messages in the `outbox` table for a relay process to
//! deliver. This is the transport used by the CLI host.

use crate::mail::{MailError, MailTransport, OutgoingMessage};
use crate::repo::contact_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection};
use serde::Serialize;
use uuid::Uuid;

/// Queued message as stored in the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueuedMessage {
    pub id: i64,
    pub run_id: Uuid,
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
    /// Unix epoch milliseconds.
    pub queued_at: i64,
}

/// Transport that appends each message to the `outbox` table.
pub struct SqliteOutbox<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOutbox<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Lists queued messages, optionally restricted to one run.
    pub fn list_queued(&self, run_id: Option<Uuid>) -> RepoResult<Vec<QueuedMessage>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, recipient, subject, html_body, queued_at
             FROM outbox
             WHERE (?1 IS NULL OR run_id = ?1)
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([run_id.map(|id| id.to_string())])?;
        let mut messages = Vec::new();
        while let Some(row) = rows.next()? {
            let run_text: String = row.get("run_id")?;
            let run_id = Uuid::parse_str(&run_text).map_err(|_| {
                RepoError::InvalidData(format!("invalid uuid value `{run_text}` in outbox.run_id"))
            })?;
            messages.push(QueuedMessage {
                id: row.get("id")?,
                run_id,
                recipient: row.get("recipient")?,
                subject: row.get("subject")?,
                html_body: row.get("html_body")?,
                queued_at: row.get("queued_at")?,
            });
        }
        Ok(messages)
    }
}

impl MailTransport for SqliteOutbox<'_> {
    fn send(&mut self, message: &OutgoingMessage) -> Result<(), MailError> {
        if !message.to.contains('@') {
            return Err(MailError::Rejected {
                to: message.to.clone(),
                reason: "recipient address has no `@`".to_string(),
            });
        }

        self.conn
            .execute(
                "INSERT INTO outbox (run_id, recipient, subject, html_body)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    message.run_id.to_string(),
                    message.to.as_str(),
                    message.subject.as_str(),
                    message.html_body.as_str(),
                ],
            )
            .map_err(|err| MailError::Transport(Box::new(err)))?;
        Ok(())
    }
}
