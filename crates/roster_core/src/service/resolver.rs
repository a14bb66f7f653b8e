//! Tag-filtered recipient resolution.
//!
//! # Invariants
//! - Only `Active` contacts with a non-blank email are returned.
//! - Output holds no duplicate emails; the first row wins.
//! - Output keeps table row order.

use crate::model::contact::{Contact, ContactId};
use crate::model::tag::TagMatchMode;
use crate::repo::contact_repo::{ContactRepository, RepoResult};
use std::collections::HashSet;

/// A contact selected to receive one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub contact_id: ContactId,
    pub full_name: String,
    pub email: String,
}

/// Selects active contacts matching at least one target tag.
///
/// No targets or no matches yield an empty list.
pub fn resolve_recipients(
    contacts: &[Contact],
    targets: &[String],
    mode: TagMatchMode,
) -> Vec<Recipient> {
    let mut seen = HashSet::new();
    contacts
        .iter()
        .filter(|contact| contact.is_active())
        .filter(|contact| !contact.email.trim().is_empty())
        .filter(|contact| {
            targets
                .iter()
                .any(|target| mode.matches(&contact.tags, target.as_str()))
        })
        .filter(|contact| seen.insert(contact.email.as_str()))
        .map(|contact| Recipient {
            contact_id: contact.id,
            full_name: contact.full_name.clone(),
            email: contact.email.clone(),
        })
        .collect()
}

/// Loads the full contact table and resolves recipients from it.
pub fn resolve_from_repo<R: ContactRepository>(
    repo: &R,
    targets: &[String],
    mode: TagMatchMode,
) -> RepoResult<Vec<Recipient>> {
    let contacts = repo.list_contacts()?;
    Ok(resolve_recipients(&contacts, targets, mode))
}

#[cfg(test)]
mod tests {
    use super::resolve_recipients;
    use crate::model::contact::{Contact, ContactStatus, TagSet};
    use crate::model::tag::TagMatchMode;

    fn contact(id: i64, email: &str, tags: &str, status: ContactStatus) -> Contact {
        Contact {
            id,
            full_name: format!("Contact {id}"),
            title: String::new(),
            email: email.to_string(),
            phone: String::new(),
            location: String::new(),
            bio: String::new(),
            photo_url: String::new(),
            tags: TagSet::parse(tags),
            website_display: true,
            status,
            last_updated: 0,
        }
    }

    #[test]
    fn filters_inactive_and_dedupes_by_email_in_row_order() {
        let contacts = vec![
            contact(1, "a@x.org", "pastor", ContactStatus::Active),
            contact(2, "b@x.org", "pastor", ContactStatus::Inactive),
            contact(3, "a@x.org", "pastor,board-member", ContactStatus::Active),
            contact(4, "c@x.org", "board-member", ContactStatus::Active),
        ];
        let targets = vec!["pastor".to_string(), "board-member".to_string()];

        let recipients = resolve_recipients(&contacts, &targets, TagMatchMode::Substring);
        let ids: Vec<_> = recipients.iter().map(|r| r.contact_id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn match_mode_decides_substring_over_match() {
        let contacts = vec![contact(1, "d@x.org", "domaine", ContactStatus::Active)];
        let targets = vec!["maine".to_string()];

        assert_eq!(
            resolve_recipients(&contacts, &targets, TagMatchMode::Substring).len(),
            1
        );
        assert!(resolve_recipients(&contacts, &targets, TagMatchMode::Exact).is_empty());
    }

    #[test]
    fn empty_targets_and_blank_emails_yield_nothing() {
        let contacts = vec![
            contact(1, "", "pastor", ContactStatus::Active),
            contact(2, "e@x.org", "pastor", ContactStatus::Active),
        ];
        assert!(resolve_recipients(&contacts, &[], TagMatchMode::Substring).is_empty());

        let recipients =
            resolve_recipients(&contacts, &["pastor".to_string()], TagMatchMode::Substring);
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].email, "e@x.org");
    }
}
