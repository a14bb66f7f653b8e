//! Tag catalogue repository.
//!
//! # Invariants
//! - `list_tags` returns distinct, non-blank tags in row order.
//! - A missing `tag_reference` table reads as an empty catalogue.

use crate::db::table_exists;
use crate::model::tag::TagReference;
use crate::repo::contact_repo::RepoResult;
use log::warn;
use rusqlite::{params, Connection};
use std::collections::HashSet;

/// Repository interface for the tag catalogue.
pub trait TagRepository {
    fn add_tag_reference(&self, reference: &TagReference) -> RepoResult<()>;
    fn list_tag_references(&self) -> RepoResult<Vec<TagReference>>;
    fn list_tags(&self) -> RepoResult<Vec<String>>;
}

/// SQLite-backed tag catalogue.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn add_tag_reference(&self, reference: &TagReference) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO tag_reference (category, tag, description, example_usage)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                reference.category.as_str(),
                reference.tag.trim(),
                reference.description.as_str(),
                reference.example_usage.as_str(),
            ],
        )?;
        Ok(())
    }

    fn list_tag_references(&self) -> RepoResult<Vec<TagReference>> {
        if !table_exists(self.conn, "tag_reference")? {
            warn!("event=tags_list module=repo status=degraded reason=missing_table");
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            "SELECT category, tag, description, example_usage
             FROM tag_reference
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut references = Vec::new();
        while let Some(row) = rows.next()? {
            references.push(TagReference {
                category: row.get("category")?,
                tag: row.get("tag")?,
                description: row.get("description")?,
                example_usage: row.get("example_usage")?,
            });
        }
        Ok(references)
    }

    fn list_tags(&self) -> RepoResult<Vec<String>> {
        let mut seen = HashSet::new();
        let tags = self
            .list_tag_references()?
            .into_iter()
            .map(|reference| reference.tag)
            .filter(|tag| !tag.trim().is_empty())
            .filter(|tag| seen.insert(tag.clone()))
            .collect();
        Ok(tags)
    }
}
