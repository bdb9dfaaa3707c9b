use std::path::PathBuf;

use crate::{CollaboratorError, DefinitionError, InterviewMode, QuestionId};

/// Error type for starting and driving an interview session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session id was obtained from the backend, so nothing can be recorded.
    #[error("Interview session has no id")]
    MissingSessionId,

    #[error("Survey '{survey}' is not fielded in {mode} mode")]
    UnsupportedMode { survey: String, mode: InterviewMode },

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("Unknown question: {0}")]
    UnknownQuestion(QuestionId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The submission endpoint rejected or did not receive the record.
    #[error("Submission failed: {0}")]
    Submission(#[from] CollaboratorError),
}

impl SessionError {
    /// Check if the caller can recover by correcting an answer.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// A response that blocks forward navigation or submission.
///
/// Always recoverable: the interviewer corrects the answer to the named question.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Question '{question}' is required")]
    Required { question: QuestionId },

    #[error("Answer {value} to question '{question}' is outside the target audience")]
    OutOfTargetAudience { question: QuestionId, value: f64 },

    #[error("Question '{question}' allows at most {max} selections, got {selected}")]
    TooManySelections {
        question: QuestionId,
        max: usize,
        selected: usize,
    },

    #[error("'{value}' is not an option of question '{question}'")]
    InvalidOption { question: QuestionId, value: String },

    #[error("Question '{question}' expects a {expected} answer, got {actual}")]
    WrongType {
        question: QuestionId,
        expected: &'static str,
        actual: &'static str,
    },
}

impl ValidationError {
    /// The question that needs attention.
    pub fn question(&self) -> &QuestionId {
        match self {
            Self::Required { question }
            | Self::OutOfTargetAudience { question, .. }
            | Self::TooManySelections { question, .. }
            | Self::InvalidOption { question, .. }
            | Self::WrongType { question, .. } => question,
        }
    }
}

/// Error type for loading engine configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid AC master data: {0}")]
    AcMaster(#[from] serde_json::Error),

    #[error("Rules for survey '{0}' are defined more than once")]
    DuplicateSurvey(String),
}

/// Error type for microphone access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordingError {
    /// Another recording session holds the device.
    #[error("Audio device '{device}' is already recording for session {holder}")]
    DeviceBusy { device: String, holder: String },
}
