//! Core types for the interview-flow crate.
//!
//! This crate provides the foundational types for describing interviews:
//! - `SurveyDefinition` and `Section` - The top-level survey structure
//! - `Question`, `QuestionKind` and `Condition` - Individual questions and their display rules
//! - `Responses` and `QuestionId` - Collected answers keyed by question
//! - `SubmissionRecord` - The final ordered record of an interview
//! - `SetNumberSource` and `SubmissionSink` traits - For external collaborators

mod question_id;
pub use question_id::QuestionId;

mod response_value;
pub use response_value::ResponseValue;

mod responses;
pub use responses::{ResponseError, Responses};

mod visibility;
pub use visibility::Visibility;

pub mod localized_text;
pub use localized_text::LocalizedText;

mod condition;
pub use condition::{Condition, ConditionOperator, LogicConnector};

mod question;
pub use question::{
    ChoiceQuestion, MultipleChoiceQuestion, NumericQuestion, Question, QuestionKind,
    QuestionOption, RatingQuestion,
};

mod survey_definition;
pub use survey_definition::{InterviewMode, LocatedQuestion, Section, SurveyDefinition, SurveyMode};

mod submission;
pub use submission::{
    InterviewStatus, LocationFix, LocationSource, PollingStation, ResponseEntry, SubmissionRecord,
};

mod error;
pub use error::{CollaboratorError, DefinitionError};

mod traits;
pub use traits::{SetNumberSource, SubmissionSink};
