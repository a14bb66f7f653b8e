//! Intake import use-case service.
//!
//! # Responsibility
//! - Accept raw form submissions from the intake host.
//! - Import pending submissions into the directory exactly once.
//!
//! # Invariants
//! - Re-running the import is idempotent: processed rows are skipped.
//! - Invalid submissions are marked `REJECTED` and reported, never imported.

use crate::model::contact::ContactId;
use crate::model::intake::{IntakeResponseId, IntakeSubmission};
use crate::repo::contact_repo::RepoError;
use crate::repo::intake_repo::IntakeRepository;
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for intake use-cases.
#[derive(Debug)]
pub enum IntakeServiceError {
    Repo(RepoError),
}

impl Display for IntakeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for IntakeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for IntakeServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Submission turned into a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedResponse {
    pub response_id: IntakeResponseId,
    pub contact_id: ContactId,
}

/// Submission that could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedResponse {
    pub response_id: IntakeResponseId,
    pub reason: String,
}

/// Outcome of one import pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntakeImportReport {
    pub imported: Vec<ImportedResponse>,
    pub rejected: Vec<RejectedResponse>,
    /// Rows another pass claimed between listing and import.
    pub already_processed: usize,
}

/// Intake facade over an intake repository.
pub struct IntakeService<R: IntakeRepository> {
    repo: R,
}

impl<R: IntakeRepository> IntakeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends a raw submission as a pending response.
    pub fn submit(
        &self,
        submission: &IntakeSubmission,
    ) -> Result<IntakeResponseId, IntakeServiceError> {
        let id = self.repo.submit(submission)?;
        info!("event=intake_submit module=intake status=ok response_id={id}");
        Ok(id)
    }

    /// Imports every pending response.
    pub fn import_pending(&mut self) -> Result<IntakeImportReport, IntakeServiceError> {
        let pending = self.repo.list_pending()?;
        let mut report = IntakeImportReport::default();

        for response in pending {
            let contact = match response.submission.to_new_contact() {
                Ok(contact) => contact,
                Err(rejection) => {
                    warn!(
                        "event=intake_import module=intake status=rejected response_id={} reason={}",
                        response.id, rejection
                    );
                    if self.repo.reject_response(response.id)? {
                        report.rejected.push(RejectedResponse {
                            response_id: response.id,
                            reason: rejection.to_string(),
                        });
                    } else {
                        report.already_processed += 1;
                    }
                    continue;
                }
            };

            match self.repo.import_response(response.id, &contact)? {
                Some(contact_id) => report.imported.push(ImportedResponse {
                    response_id: response.id,
                    contact_id,
                }),
                None => report.already_processed += 1,
            }
        }

        info!(
            "event=intake_import module=intake status=ok imported={} rejected={} already_processed={}",
            report.imported.len(),
            report.rejected.len(),
            report.already_processed
        );
        Ok(report)
    }

    /// Form-submit event handler: imports whatever is pending.
    pub fn handle_submission_event(&mut self) -> Result<IntakeImportReport, IntakeServiceError> {
        self.import_pending()
    }
}
