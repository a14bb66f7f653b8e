//! Mail merge use-case service.
//!
//! # Responsibility
//! - Send one personalized message per tag-selected contact.
//! - Manage the named template store used by merges.
//!
//! # Invariants
//! - Subjects are sent verbatim; only bodies are rendered.
//! - One failed send never aborts the rest of a merge.

use crate::mail::MailTransport;
use crate::model::tag::TagMatchMode;
use crate::model::template::MailTemplate;
use crate::repo::contact_repo::{ContactRepository, RepoError};
use crate::repo::template_repo::TemplateRepository;
use crate::service::dispatch::{dispatch, DispatchReport};
use crate::service::resolver::resolve_from_repo;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Service error for mail merge use-cases.
#[derive(Debug)]
pub enum MailMergeError {
    NoTargetTags,
    BlankTemplateName,
    TemplateNotFound(String),
    Repo(RepoError),
}

impl Display for MailMergeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoTargetTags => write!(f, "mail merge needs at least one target tag"),
            Self::BlankTemplateName => write!(f, "template name must not be blank"),
            Self::TemplateNotFound(name) => write!(f, "mail template not found: `{name}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MailMergeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for MailMergeError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Ad-hoc merge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMergeRequest {
    pub tags: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Mail merge facade over contact and template repositories.
pub struct MailMergeService<C: ContactRepository, T: TemplateRepository> {
    contacts: C,
    templates: T,
    match_mode: TagMatchMode,
}

impl<C: ContactRepository, T: TemplateRepository> MailMergeService<C, T> {
    pub fn new(contacts: C, templates: T, match_mode: TagMatchMode) -> Self {
        Self {
            contacts,
            templates,
            match_mode,
        }
    }

    /// Sends `request.body` to every active contact matching a target tag.
    pub fn send_mail_merge<M: MailTransport + ?Sized>(
        &self,
        transport: &mut M,
        request: &MailMergeRequest,
    ) -> Result<DispatchReport, MailMergeError> {
        let targets: Vec<String> = request
            .tags
            .iter()
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect();
        if targets.is_empty() {
            return Err(MailMergeError::NoTargetTags);
        }

        let run_id = Uuid::new_v4();
        let recipients = resolve_from_repo(&self.contacts, &targets, self.match_mode)?;
        info!(
            "event=mail_merge module=mail_merge status=start run_id={} tag_count={} recipients={}",
            run_id,
            targets.len(),
            recipients.len()
        );

        let report = dispatch(
            transport,
            run_id,
            &recipients,
            request.subject.as_str(),
            request.body.as_str(),
        );
        info!(
            "event=mail_merge module=mail_merge status=ok run_id={} sent={} failed={}",
            run_id,
            report.sent,
            report.failed()
        );
        Ok(report)
    }

    /// Sends a stored template to every contact matching a target tag.
    pub fn send_template_merge<M: MailTransport + ?Sized>(
        &self,
        transport: &mut M,
        template_name: &str,
        tags: Vec<String>,
    ) -> Result<DispatchReport, MailMergeError> {
        let template = self
            .get_template(template_name)?
            .ok_or_else(|| MailMergeError::TemplateNotFound(template_name.trim().to_string()))?;
        self.send_mail_merge(
            transport,
            &MailMergeRequest {
                tags,
                subject: template.subject,
                body: template.body,
            },
        )
    }

    /// Inserts a template or replaces subject/body of an existing one.
    pub fn save_template(
        &self,
        name: &str,
        subject: &str,
        body: &str,
    ) -> Result<MailTemplate, MailMergeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MailMergeError::BlankTemplateName);
        }
        let template = MailTemplate::new(name, subject, body);
        self.templates.save_template(&template)?;
        info!(
            "event=template_save module=mail_merge status=ok name_len={}",
            name.len()
        );
        Ok(template)
    }

    pub fn get_template(&self, name: &str) -> Result<Option<MailTemplate>, MailMergeError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MailMergeError::BlankTemplateName);
        }
        Ok(self.templates.get_template(name)?)
    }

    pub fn list_templates(&self) -> Result<Vec<MailTemplate>, MailMergeError> {
        Ok(self.templates.list_templates()?)
    }
}
