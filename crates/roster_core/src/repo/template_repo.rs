//! Mail template repository.
//!
//! # Invariants
//! - `name` is the unique key; saving an existing name updates in place.
//! - Listing skips rows with a blank name and keeps insertion order.

use crate::model::template::MailTemplate;
use crate::repo::contact_repo::RepoResult;
use rusqlite::{params, Connection, Row};

/// Repository interface for mail merge templates.
pub trait TemplateRepository {
    /// Inserts or updates a template by name.
    fn save_template(&self, template: &MailTemplate) -> RepoResult<()>;
    fn get_template(&self, name: &str) -> RepoResult<Option<MailTemplate>>;
    fn list_templates(&self) -> RepoResult<Vec<MailTemplate>>;
}

/// SQLite-backed template store.
pub struct SqliteTemplateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTemplateRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TemplateRepository for SqliteTemplateRepository<'_> {
    fn save_template(&self, template: &MailTemplate) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO mail_templates (name, subject, body)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                subject = excluded.subject,
                body = excluded.body;",
            params![
                template.name.as_str(),
                template.subject.as_str(),
                template.body.as_str(),
            ],
        )?;
        Ok(())
    }

    fn get_template(&self, name: &str) -> RepoResult<Option<MailTemplate>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, subject, body
             FROM mail_templates
             WHERE name = ?1;",
        )?;
        let mut rows = stmt.query([name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_template_row(row)?));
        }
        Ok(None)
    }

    fn list_templates(&self) -> RepoResult<Vec<MailTemplate>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, subject, body
             FROM mail_templates
             WHERE TRIM(name) <> ''
             ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut templates = Vec::new();
        while let Some(row) = rows.next()? {
            templates.push(parse_template_row(row)?);
        }
        Ok(templates)
    }
}

fn parse_template_row(row: &Row<'_>) -> RepoResult<MailTemplate> {
    Ok(MailTemplate {
        name: row.get("name")?,
        subject: row.get("subject")?,
        body: row.get("body")?,
    })
}
