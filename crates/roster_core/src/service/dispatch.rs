//! Per-recipient message dispatch.
//!
//! # Invariants
//! - One transport call per recipient, in recipient order.
//! - A failed send is logged and tallied; the batch continues.

use crate::mail::render::{render_body, RenderContext};
use crate::mail::{MailTransport, OutgoingMessage};
use crate::service::resolver::Recipient;
use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

/// One recipient the transport did not accept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchFailure {
    pub email: String,
    pub reason: String,
}

/// Outcome of one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub run_id: Uuid,
    pub sent: usize,
    pub failures: Vec<DispatchFailure>,
}

impl DispatchReport {
    pub fn empty(run_id: Uuid) -> Self {
        Self {
            run_id,
            sent: 0,
            failures: Vec::new(),
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Human-readable tally, e.g. `Sent 3 emails.` or
    /// `Sent 2 emails, 1 failed.`
    pub fn summary(&self) -> String {
        if self.failures.is_empty() {
            format!("Sent {} emails.", self.sent)
        } else {
            format!("Sent {} emails, {} failed.", self.sent, self.failed())
        }
    }
}

/// Renders and sends one message per recipient.
pub fn dispatch<T: MailTransport + ?Sized>(
    transport: &mut T,
    run_id: Uuid,
    recipients: &[Recipient],
    subject: &str,
    body: &str,
) -> DispatchReport {
    let mut report = DispatchReport::empty(run_id);

    for recipient in recipients {
        let message = OutgoingMessage {
            run_id,
            to: recipient.email.clone(),
            subject: subject.to_string(),
            html_body: render_body(
                body,
                RenderContext {
                    full_name: recipient.full_name.as_str(),
                    email: recipient.email.as_str(),
                },
            ),
        };

        match transport.send(&message) {
            Ok(()) => report.sent += 1,
            Err(err) => {
                warn!(
                    "event=mail_send module=dispatch status=error run_id={} contact_id={} error={}",
                    run_id, recipient.contact_id, err
                );
                report.failures.push(DispatchFailure {
                    email: recipient.email.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    info!(
        "event=dispatch module=dispatch status=ok run_id={} sent={} failed={}",
        run_id,
        report.sent,
        report.failed()
    );
    report
}
