//! In-memory collaborators for running interviews without a backend.
//!
//! `InMemoryStore` plays both the persistence API (last used set number)
//! and the submission endpoint. Completed or abandoned records update the
//! last used set of their survey, so consecutive sessions rotate through
//! the sets the same way they do against the real backend.
//!
//! # Example
//!
//! ```rust,ignore
//! use interview_flow::{InMemoryStore, InterviewSession, SessionOptions, InterviewMode};
//!
//! let store = InMemoryStore::new().with_last_set("tracker", 1);
//! let session = InterviewSession::start(
//!     survey,
//!     SessionOptions::new("sess-1", InterviewMode::Cati),
//!     None,
//!     &store,
//! )
//! .await?;
//! assert_eq!(session.set_number(), Some(2));
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::{CollaboratorError, SetNumberSource, SubmissionRecord, SubmissionSink};

/// A store that keeps everything in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    last_sets: Mutex<HashMap<String, u32>>,
    submissions: Mutex<Vec<SubmissionRecord>>,
    unavailable: bool,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a previous interview of `survey_id` used `set_number`.
    pub fn with_last_set(self, survey_id: impl Into<String>, set_number: u32) -> Self {
        self.last_sets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(survey_id.into(), set_number);
        self
    }

    /// Make every call fail as if the backend were unreachable.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// All records received so far, in arrival order.
    pub fn submissions(&self) -> Vec<SubmissionRecord> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Look up a stored record by session id.
    pub fn find(&self, session_id: &str) -> Option<SubmissionRecord> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|record| record.session_id == session_id)
            .cloned()
    }

    fn ensure_available(&self) -> Result<(), CollaboratorError> {
        if self.unavailable {
            return Err(CollaboratorError::Unavailable("in-memory store offline".into()));
        }
        Ok(())
    }

    fn store(&self, record: &SubmissionRecord) -> Result<(), CollaboratorError> {
        self.ensure_available()?;
        if let Some(set_number) = record.set_number {
            self.last_sets
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(record.survey_id.clone(), set_number);
        }
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl SetNumberSource for InMemoryStore {
    async fn last_set_number(&self, survey_id: &str) -> Result<Option<u32>, CollaboratorError> {
        self.ensure_available()?;
        Ok(self
            .last_sets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(survey_id)
            .copied())
    }
}

#[async_trait]
impl SubmissionSink for InMemoryStore {
    async fn complete_interview(&self, record: &SubmissionRecord) -> Result<(), CollaboratorError> {
        self.store(record)
    }

    async fn abandon_interview(&self, record: &SubmissionRecord) -> Result<(), CollaboratorError> {
        self.store(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_last_set_per_survey() {
        let store = InMemoryStore::new().with_last_set("a", 3);
        assert_eq!(store.last_set_number("a").await.unwrap(), Some(3));
        assert_eq!(store.last_set_number("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unavailable_store_fails_lookups() {
        let store = InMemoryStore::new().unavailable();
        let err = store.last_set_number("a").await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
