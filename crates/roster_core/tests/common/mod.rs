#![allow(dead_code)]

use roster_core::{
    ContactRepository, ContactStatus, MailError, MailTransport, NewContact, OutgoingMessage,
    SqliteContactRepository, TagSet,
};
use rusqlite::Connection;

/// In-memory transport that records messages and can refuse chosen recipients.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Vec<OutgoingMessage>,
    pub reject: Vec<String>,
}

impl RecordingTransport {
    pub fn rejecting(emails: &[&str]) -> Self {
        Self {
            sent: Vec::new(),
            reject: emails.iter().map(|email| email.to_string()).collect(),
        }
    }

    pub fn recipients(&self) -> Vec<&str> {
        self.sent
            .iter()
            .map(|message| message.to.as_str())
            .collect()
    }
}

impl MailTransport for RecordingTransport {
    fn send(&mut self, message: &OutgoingMessage) -> Result<(), MailError> {
        if self.reject.contains(&message.to) {
            return Err(MailError::Rejected {
                to: message.to.clone(),
                reason: "mailbox unavailable".to_string(),
            });
        }
        self.sent.push(message.clone());
        Ok(())
    }
}

pub fn add_contact(
    conn: &Connection,
    name: &str,
    email: &str,
    tags: &str,
    status: ContactStatus,
) -> i64 {
    let repo = SqliteContactRepository::new(conn);
    repo.create_contact(
        &NewContact::new(name, email)
            .with_tags(TagSet::parse(tags))
            .with_status(status),
    )
    .unwrap()
}
