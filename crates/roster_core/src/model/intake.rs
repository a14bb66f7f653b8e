//! Raw intake form responses awaiting import into the directory.
//!
//! Field values are kept exactly as the form host delivered them; parsing
//! into a [`NewContact`] happens at import time.

use crate::model::contact::{ContactStatus, NewContact, TagSet};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type IntakeResponseId = i64;

/// Marker written once a response became a contact.
pub const MARKER_DONE: &str = "DONE";
/// Marker written when a response cannot be imported.
pub const MARKER_REJECTED: &str = "REJECTED";

/// Form fields as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeSubmission {
    pub full_name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub photo_url: String,
    pub email_tags: String,
    /// `TRUE` or `FALSE`.
    pub website_display: String,
    /// `Active`, `Inactive` or `Transitioning`.
    pub status: String,
}

/// Persisted response row with its processing marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeResponse {
    pub id: IntakeResponseId,
    /// Unix epoch milliseconds.
    pub submitted_at: i64,
    pub submission: IntakeSubmission,
    /// `None` while pending.
    pub processed: Option<String>,
}

impl IntakeResponse {
    pub fn is_pending(&self) -> bool {
        self.processed
            .as_deref()
            .map_or(true, |marker| marker.trim().is_empty())
    }
}

/// Reasons a submission cannot become a contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeRejection {
    MissingField(&'static str),
    InvalidStatus(String),
    InvalidWebsiteDisplay(String),
}

impl Display for IntakeRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field `{field}` is blank"),
            Self::InvalidStatus(value) => write!(f, "invalid status `{value}`"),
            Self::InvalidWebsiteDisplay(value) => {
                write!(f, "invalid website display `{value}`; expected TRUE|FALSE")
            }
        }
    }
}

impl Error for IntakeRejection {}

impl IntakeSubmission {
    /// Converts form text into a contact draft.
    pub fn to_new_contact(&self) -> Result<NewContact, IntakeRejection> {
        let required = [
            ("full_name", &self.full_name),
            ("title", &self.title),
            ("email", &self.email),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(IntakeRejection::MissingField(field));
            }
        }

        let status = ContactStatus::parse(self.status.trim())
            .ok_or_else(|| IntakeRejection::InvalidStatus(self.status.clone()))?;
        let website_display = match self.website_display.trim() {
            "TRUE" => true,
            "FALSE" => false,
            other => return Err(IntakeRejection::InvalidWebsiteDisplay(other.to_string())),
        };

        Ok(NewContact {
            full_name: self.full_name.trim().to_string(),
            title: self.title.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            location: self.location.trim().to_string(),
            bio: self.bio.trim().to_string(),
            photo_url: self.photo_url.trim().to_string(),
            tags: TagSet::parse(&self.email_tags),
            website_display,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{IntakeRejection, IntakeSubmission};
    use crate::model::contact::ContactStatus;

    fn submission() -> IntakeSubmission {
        IntakeSubmission {
            full_name: "Ana Lima".to_string(),
            title: "Local Leader".to_string(),
            email: "ana@example.org".to_string(),
            email_tags: "local-leader, maine".to_string(),
            website_display: "FALSE".to_string(),
            status: "Transitioning".to_string(),
            ..IntakeSubmission::default()
        }
    }

    #[test]
    fn converts_form_text_into_contact() {
        let contact = submission().to_new_contact().unwrap();
        assert_eq!(contact.status, ContactStatus::Transitioning);
        assert!(!contact.website_display);
        assert_eq!(contact.tags.joined(), "local-leader,maine");
    }

    #[test]
    fn rejects_unknown_status_and_display_values() {
        let mut bad_status = submission();
        bad_status.status = "Retired".to_string();
        assert!(matches!(
            bad_status.to_new_contact(),
            Err(IntakeRejection::InvalidStatus(_))
        ));

        let mut bad_display = submission();
        bad_display.website_display = "yes".to_string();
        assert!(matches!(
            bad_display.to_new_contact(),
            Err(IntakeRejection::InvalidWebsiteDisplay(_))
        ));
    }
}
