use async_trait::async_trait;

use crate::{CollaboratorError, SubmissionRecord};

/// Source of the set number used by the most recent CATI interview of a survey.
///
/// Implemented by the persistence API client. The engine derives the next
/// set from this value; see `resolve_set_number`.
#[async_trait]
pub trait SetNumberSource: Send + Sync {
    /// Returns the last used set number, or `None` if no interview has been
    /// recorded for the survey yet.
    async fn last_set_number(&self, survey_id: &str) -> Result<Option<u32>, CollaboratorError>;
}

/// Receiver of finished interviews.
///
/// Implemented by the submission endpoint client. Failures are returned to
/// the caller so the interviewer can retry.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Store a completed interview.
    async fn complete_interview(&self, record: &SubmissionRecord) -> Result<(), CollaboratorError>;

    /// Store an abandoned interview, including the answers collected so far.
    async fn abandon_interview(&self, record: &SubmissionRecord) -> Result<(), CollaboratorError>;
}
