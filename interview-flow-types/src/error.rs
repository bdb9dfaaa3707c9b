use crate::QuestionId;

/// Error type for malformed survey definitions.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    /// The definition is not valid JSON or does not match the expected shape.
    #[error("Invalid survey definition: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Question {index} of section {section} has an empty id")]
    EmptyId { section: usize, index: usize },

    #[error("Duplicate question id: {0}")]
    DuplicateQuestion(QuestionId),

    #[error("Question '{question}' lists option value '{value}' more than once")]
    DuplicateOption { question: QuestionId, value: String },

    /// A condition references a question that does not exist in the survey.
    #[error("Question '{question}' has a condition on unknown question '{target}'")]
    UnknownConditionTarget {
        question: QuestionId,
        target: QuestionId,
    },
}

/// Error returned by external collaborators (persistence API, submission endpoint).
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    /// The collaborator could not be reached or timed out.
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    /// Collaborator-specific failure (transport, decoding, ...).
    #[error("Collaborator error: {0}")]
    Backend(#[from] anyhow::Error),
}

impl CollaboratorError {
    /// Create a backend error from any error type.
    pub fn backend(err: impl Into<anyhow::Error>) -> Self {
        Self::Backend(err.into())
    }

    /// Check if this error represents an unreachable collaborator.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
