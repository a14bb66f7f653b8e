//! Directory use-case service.
//!
//! # Responsibility
//! - Provide contact create/read/update entry points for host callers.
//! - Derive tag-based email lists and the public website projection.
//!
//! # Invariants
//! - Every write goes through repository validation.
//! - Read-back after a write must find the written row.

use crate::model::contact::{Contact, ContactId, ContactStatus, NewContact, PublicProfile, TagSet};
use crate::model::tag::TagMatchMode;
use crate::repo::contact_repo::{ContactRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for directory use-cases.
#[derive(Debug)]
pub enum DirectoryServiceError {
    ContactNotFound(ContactId),
    Repo(RepoError),
    InconsistentState(&'static str),
}

impl Display for DirectoryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContactNotFound(id) => write!(f, "contact not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => {
                write!(f, "inconsistent directory state: {details}")
            }
        }
    }
}

impl Error for DirectoryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DirectoryServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ContactNotFound(id) => Self::ContactNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Directory service facade over a contact repository.
pub struct DirectoryService<R: ContactRepository> {
    repo: R,
    match_mode: TagMatchMode,
}

impl<R: ContactRepository> DirectoryService<R> {
    pub fn new(repo: R, match_mode: TagMatchMode) -> Self {
        Self { repo, match_mode }
    }

    /// Appends a contact and returns the stored row.
    pub fn add_contact(&self, contact: &NewContact) -> Result<Contact, DirectoryServiceError> {
        let id = self.repo.create_contact(contact)?;
        info!("event=contact_add module=directory status=ok contact_id={id}");
        self.repo
            .get_contact(id)?
            .ok_or(DirectoryServiceError::InconsistentState(
                "created contact not found in read-back",
            ))
    }

    pub fn get_contact(&self, id: ContactId) -> Result<Option<Contact>, DirectoryServiceError> {
        Ok(self.repo.get_contact(id)?)
    }

    pub fn list_contacts(&self) -> Result<Vec<Contact>, DirectoryServiceError> {
        Ok(self.repo.list_contacts()?)
    }

    pub fn update_status(
        &self,
        id: ContactId,
        status: ContactStatus,
    ) -> Result<Contact, DirectoryServiceError> {
        self.repo.update_status(id, status)?;
        info!("event=contact_status module=directory status=ok contact_id={id} value={status}");
        self.read_back(id)
    }

    /// Replaces the tag set of one contact.
    pub fn set_tags(&self, id: ContactId, tags: TagSet) -> Result<Contact, DirectoryServiceError> {
        self.repo.set_tags(id, &tags)?;
        info!(
            "event=contact_tags module=directory status=ok contact_id={id} tag_count={}",
            tags.len()
        );
        self.read_back(id)
    }

    /// Emails of active contacts carrying `tag`, one entry per matching row.
    ///
    /// Unlike mail-merge resolution this keeps duplicate addresses, so the
    /// list mirrors the table.
    pub fn emails_by_tag(&self, tag: &str) -> Result<Vec<String>, DirectoryServiceError> {
        let target = tag.trim();
        let emails: Vec<String> = self
            .repo
            .list_contacts()?
            .into_iter()
            .filter(|contact| contact.is_active())
            .filter(|contact| self.match_mode.matches(&contact.tags, target))
            .map(|contact| contact.email)
            .collect();
        info!(
            "event=emails_by_tag module=directory status=ok match={} count={}",
            self.match_mode,
            emails.len()
        );
        Ok(emails)
    }

    /// Website projection of every contact flagged for display.
    pub fn list_public_profiles(&self) -> Result<Vec<PublicProfile>, DirectoryServiceError> {
        Ok(self
            .repo
            .list_contacts()?
            .iter()
            .filter(|contact| contact.website_display)
            .map(PublicProfile::from)
            .collect())
    }

    fn read_back(&self, id: ContactId) -> Result<Contact, DirectoryServiceError> {
        self.repo
            .get_contact(id)?
            .ok_or(DirectoryServiceError::InconsistentState(
                "updated contact not found in read-back",
            ))
    }
}
