//! Outgoing mail contracts.
//!
//! # Responsibility
//! - Define the transport seam every dispatch goes through.
//! - Render per-recipient message bodies.
//!
//! # Invariants
//! - Transports send exactly one message per `send` call.
//! - A transport error concerns one message only; callers decide whether to
//!   continue with the rest of a batch.

pub mod outbox;
pub mod render;

use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// One fully rendered message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Correlates every message of one mail merge or reminder run.
    pub run_id: Uuid,
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Failure to hand one message to the transport.
#[derive(Debug)]
pub enum MailError {
    /// Transport refused the message (bad address, quota, policy).
    Rejected { to: String, reason: String },
    /// Transport backend is unavailable.
    Transport(Box<dyn Error + Send + Sync>),
}

impl Display for MailError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected { to, reason } => write!(f, "message to {to} rejected: {reason}"),
            Self::Transport(err) => write!(f, "mail transport failure: {err}"),
        }
    }
}

impl Error for MailError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Rejected { .. } => None,
            Self::Transport(err) => Some(err.as_ref()),
        }
    }
}

/// External mail transport.
pub trait MailTransport {
    fn send(&mut self, message: &OutgoingMessage) -> Result<(), MailError>;
}

impl<T: MailTransport + ?Sized> MailTransport for &mut T {
    fn send(&mut self, message: &OutgoingMessage) -> Result<(), MailError> {
        (**self).send(message)
    }
}
