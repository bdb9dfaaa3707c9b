use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{DefinitionError, Question, QuestionId};

/// How an interview is conducted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewMode {
    /// Face-to-face, in person.
    Capi,

    /// Over the telephone.
    Cati,
}

impl fmt::Display for InterviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capi => f.write_str("CAPI"),
            Self::Cati => f.write_str("CATI"),
        }
    }
}

/// The modes a survey is fielded in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyMode {
    Capi,
    Cati,
    #[default]
    MultiMode,
}

impl SurveyMode {
    /// Check if interviews in `mode` may be started for this survey.
    pub fn supports(self, mode: InterviewMode) -> bool {
        matches!(
            (self, mode),
            (Self::MultiMode, _)
                | (Self::Capi, InterviewMode::Capi)
                | (Self::Cati, InterviewMode::Cati)
        )
    }
}

/// A titled group of questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Section {
    pub fn new(title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            title: title.into(),
            questions,
        }
    }
}

/// A question together with its position in the survey.
#[derive(Debug, Clone, Copy)]
pub struct LocatedQuestion<'a> {
    pub section_index: usize,
    pub question_index: usize,
    pub question: &'a Question,
}

/// The top-level structure containing all sections and questions of a survey.
///
/// A survey definition is presentation-agnostic; the engine decides which
/// of its questions are shown, and in which order, for a given session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyDefinition {
    /// Survey identifier, used to look up survey-specific rules.
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub mode: SurveyMode,

    #[serde(default)]
    pub sections: Vec<Section>,
}

impl SurveyDefinition {
    /// Create an empty multi-mode survey.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mode: SurveyMode::MultiMode,
            sections: Vec::new(),
        }
    }

    /// Parse a survey definition from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let definition: Self = serde_json::from_str(json)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Set the fielding mode.
    pub fn with_mode(mut self, mode: SurveyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Append a section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// All questions in survey order, with their section and question indices.
    pub fn questions(&self) -> impl Iterator<Item = LocatedQuestion<'_>> {
        self.sections
            .iter()
            .enumerate()
            .flat_map(|(section_index, section)| {
                section
                    .questions
                    .iter()
                    .enumerate()
                    .map(move |(question_index, question)| LocatedQuestion {
                        section_index,
                        question_index,
                        question,
                    })
            })
    }

    /// Look up a question by id.
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions()
            .map(|located| located.question)
            .find(|question| question.id() == id)
    }

    /// Look up a question and its position by id.
    pub fn locate(&self, id: &QuestionId) -> Option<LocatedQuestion<'_>> {
        self.questions().find(|located| located.question.id() == id)
    }

    /// The distinct alternate set numbers used by this survey, ascending.
    pub fn set_numbers(&self) -> Vec<u32> {
        self.questions()
            .filter_map(|located| located.question.set_membership())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Check if the survey has any questions.
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.questions.is_empty())
    }

    /// Get the total number of questions.
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    /// Check structural consistency: ids are unique and non-empty, option
    /// values are unique per question, and conditions only reference
    /// questions of this survey.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let mut seen = HashSet::new();
        for located in self.questions() {
            let id = located.question.id();
            if id.is_empty() {
                return Err(DefinitionError::EmptyId {
                    section: located.section_index,
                    index: located.question_index,
                });
            }
            if !seen.insert(id) {
                return Err(DefinitionError::DuplicateQuestion(id.clone()));
            }

            let mut values = HashSet::new();
            for option in located.question.options() {
                if !values.insert(option.value.as_str()) {
                    return Err(DefinitionError::DuplicateOption {
                        question: id.clone(),
                        value: option.value.clone(),
                    });
                }
            }
        }

        for located in self.questions() {
            for condition in located.question.conditions() {
                if !seen.contains(&condition.question_id) {
                    return Err(DefinitionError::UnknownConditionTarget {
                        question: located.question.id().clone(),
                        target: condition.question_id.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
