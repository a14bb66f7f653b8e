//! Contact domain model.
//!
//! # Responsibility
//! - Define the directory record shared by resolver, mail merge and intake.
//! - Own status and tag-set parsing for persisted text columns.
//!
//! # Invariants
//! - `id` is assigned by storage, monotonic, and never reused.
//! - `status` is always one of `Active|Inactive|Transitioning`.
//! - `full_name` and `email` are non-blank for every persisted contact.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned contact identifier.
pub type ContactId = i64;

/// Delimiter used when tags are persisted as one text column.
pub const TAG_DELIMITER: char = ',';

/// Membership state of a directory contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactStatus {
    Active,
    Inactive,
    Transitioning,
}

impl ContactStatus {
    /// Returns the persisted text form (`Active|Inactive|Transitioning`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Transitioning => "Transitioning",
        }
    }

    /// Parses the persisted text form. Matching is exact.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Active" => Some(Self::Active),
            "Inactive" => Some(Self::Inactive),
            "Transitioning" => Some(Self::Transitioning),
            _ => None,
        }
    }
}

impl Display for ContactStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered tag labels of one contact.
///
/// Tags are case-sensitive free-form labels. Order is kept as entered and
/// duplicates are not removed; blank entries are dropped on parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Builds a tag set from individual labels, trimming and dropping blanks.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            tags.into_iter()
                .map(|tag| tag.as_ref().trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
        )
    }

    /// Parses the comma-delimited persisted form.
    pub fn parse(joined: &str) -> Self {
        Self::new(joined.split(TAG_DELIMITER))
    }

    /// Returns the comma-delimited persisted form.
    pub fn joined(&self) -> String {
        self.0.join(",")
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Exact, case-sensitive membership check.
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|value| value == tag)
    }
}

/// Validation failures for contact input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    BlankFullName,
    BlankEmail,
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankFullName => write!(f, "contact full name must not be blank"),
            Self::BlankEmail => write!(f, "contact email must not be blank"),
        }
    }
}

impl Error for ContactValidationError {}

/// Contact fields supplied by callers before storage assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
    pub full_name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub photo_url: String,
    pub tags: TagSet,
    pub website_display: bool,
    pub status: ContactStatus,
}

impl NewContact {
    /// Creates an active, website-visible contact with only name and email set.
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            title: String::new(),
            email: email.into(),
            phone: String::new(),
            location: String::new(),
            bio: String::new(),
            photo_url: String::new(),
            tags: TagSet::default(),
            website_display: true,
            status: ContactStatus::Active,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_status(mut self, status: ContactStatus) -> Self {
        self.status = status;
        self
    }

    /// Validates caller input before persistence.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        if self.full_name.trim().is_empty() {
            return Err(ContactValidationError::BlankFullName);
        }
        if self.email.trim().is_empty() {
            return Err(ContactValidationError::BlankEmail);
        }
        Ok(())
    }
}

/// Persisted directory contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub full_name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub photo_url: String,
    pub tags: TagSet,
    pub website_display: bool,
    pub status: ContactStatus,
    /// Unix epoch milliseconds of the last write to this row.
    pub last_updated: i64,
}

impl Contact {
    pub fn is_active(&self) -> bool {
        self.status == ContactStatus::Active
    }
}

/// Website-facing projection of a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicProfile {
    pub full_name: String,
    pub title: String,
    pub location: String,
    pub bio: String,
    pub photo_url: String,
}

impl From<&Contact> for PublicProfile {
    fn from(contact: &Contact) -> Self {
        Self {
            full_name: contact.full_name.clone(),
            title: contact.title.clone(),
            location: contact.location.clone(),
            bio: contact.bio.clone(),
            photo_url: contact.photo_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ContactStatus, ContactValidationError, NewContact, TagSet};

    #[test]
    fn tag_set_parse_trims_and_drops_blanks() {
        let tags = TagSet::parse(" pastor, ,state-leader,,massachusetts ");
        assert_eq!(tags.joined(), "pastor,state-leader,massachusetts");
        assert_eq!(tags.len(), 3);
    }

    #[test]
    fn tag_set_membership_is_case_sensitive() {
        let tags = TagSet::parse("Board-Member");
        assert!(tags.contains("Board-Member"));
        assert!(!tags.contains("board-member"));
    }

    #[test]
    fn status_parse_rejects_unknown_values() {
        assert_eq!(ContactStatus::parse("Active"), Some(ContactStatus::Active));
        assert_eq!(ContactStatus::parse("active"), None);
    }

    #[test]
    fn validate_rejects_blank_email() {
        let err = NewContact::new("Jane Doe", "  ").validate().unwrap_err();
        assert_eq!(err, ContactValidationError::BlankEmail);
    }
}
