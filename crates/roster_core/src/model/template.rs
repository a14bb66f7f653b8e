//! Stored mail merge template.

use serde::{Deserialize, Serialize};

/// Named subject/body pair. `name` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailTemplate {
    pub name: String,
    pub subject: String,
    /// HTML body that may carry `{{Full Name}}` / `{{Email}}` tokens.
    pub body: String,
}

impl MailTemplate {
    pub fn new(
        name: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}
