use serde::{Deserialize, Serialize};

use crate::{Condition, InterviewMode, LocalizedText, QuestionId, localized_text::normalize};

/// A single question in a survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Identifier, referenced by conditions and used as the response key.
    id: QuestionId,

    /// The prompt text, possibly carrying inline translations.
    text: String,

    /// Free-text question number as printed on the questionnaire (e.g. "12a").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    question_number: Option<String>,

    /// The kind of question (determines input type).
    #[serde(flatten)]
    kind: QuestionKind,

    /// Options for choice questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    options: Vec<QuestionOption>,

    #[serde(default)]
    required: bool,

    #[serde(rename = "enabledForCAPI", default = "enabled")]
    enabled_for_capi: bool,

    #[serde(rename = "enabledForCATI", default = "enabled")]
    enabled_for_cati: bool,

    /// Whether this question belongs to one of the survey's alternate sets.
    #[serde(default)]
    sets_for_this_question: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    set_number: Option<u32>,

    /// Display conditions, folded left to right.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    conditions: Vec<Condition>,

    /// Injected by the platform (consent, call status) rather than part of the questionnaire.
    #[serde(default)]
    system: bool,
}

fn enabled() -> bool {
    true
}

impl Question {
    /// Create a new question enabled for both modes.
    pub fn new(id: impl Into<QuestionId>, text: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            question_number: None,
            kind,
            options: Vec::new(),
            required: false,
            enabled_for_capi: true,
            enabled_for_cati: true,
            sets_for_this_question: false,
            set_number: None,
            conditions: Vec::new(),
            system: false,
        }
    }

    // === Builder ===

    /// Set the printed question number.
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.question_number = Some(number.into());
        self
    }

    /// Set the options of a choice question.
    pub fn with_options(mut self, options: Vec<QuestionOption>) -> Self {
        self.options = options;
        self
    }

    /// Append a display condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Mark the question as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restrict the question to the given modes.
    pub fn with_modes(mut self, capi: bool, cati: bool) -> Self {
        self.enabled_for_capi = capi;
        self.enabled_for_cati = cati;
        self
    }

    /// Tag the question as belonging to alternate set `set_number`.
    pub fn in_set(mut self, set_number: u32) -> Self {
        self.sets_for_this_question = true;
        self.set_number = Some(set_number);
        self
    }

    /// Mark the question as platform-injected.
    pub fn system(mut self) -> Self {
        self.system = true;
        self
    }

    // === Accessors ===

    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    /// Get the raw prompt text, including translation markup.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the prompt text split into languages.
    pub fn localized_text(&self) -> LocalizedText {
        LocalizedText::parse(&self.text)
    }

    pub fn question_number(&self) -> Option<&str> {
        self.question_number.as_deref()
    }

    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    pub fn options(&self) -> &[QuestionOption] {
        &self.options
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_system(&self) -> bool {
        self.system
    }

    /// Check if the question may be asked in the given mode.
    pub fn is_enabled_for(&self, mode: InterviewMode) -> bool {
        match mode {
            InterviewMode::Capi => self.enabled_for_capi,
            InterviewMode::Cati => self.enabled_for_cati,
        }
    }

    /// The alternate set this question belongs to, if any.
    ///
    /// A set number without the `setsForThisQuestion` flag is ignored.
    pub fn set_membership(&self) -> Option<u32> {
        if self.sets_for_this_question {
            self.set_number
        } else {
            None
        }
    }

    /// Find the option whose stored value or display text matches `raw`
    /// after normalisation.
    pub fn find_option(&self, raw: &str) -> Option<&QuestionOption> {
        let wanted = normalize(raw);
        self.options
            .iter()
            .find(|option| normalize(&option.value) == wanted)
            .or_else(|| {
                self.options
                    .iter()
                    .find(|option| normalize(&option.text) == wanted)
            })
    }
}

/// The kind of question, determining input type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Pick exactly one option.
    SingleChoice(ChoiceQuestion),

    /// Pick any number of options.
    MultipleChoice(MultipleChoiceQuestion),

    /// Pick one option from a dropdown list.
    Dropdown(ChoiceQuestion),

    /// Numeric input with optional target-audience bounds.
    Numeric(NumericQuestion),

    /// Free text input.
    Text,

    /// Rating on a 1..=scale scale.
    Rating(RatingQuestion),

    /// Constituency and polling station selection.
    PollingStation,
}

impl QuestionKind {
    /// Check if answers refer to the question's options.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            Self::SingleChoice(_) | Self::MultipleChoice(_) | Self::Dropdown(_)
        )
    }

    /// Check if at most one option may be picked.
    pub fn is_single_answer(&self) -> bool {
        matches!(self, Self::SingleChoice(_) | Self::Dropdown(_))
    }

    /// Check if the option order should be shuffled per session.
    pub fn shuffles_options(&self) -> bool {
        match self {
            Self::SingleChoice(choice) | Self::Dropdown(choice) => choice.shuffle_options,
            Self::MultipleChoice(multi) => multi.shuffle_options,
            _ => false,
        }
    }
}

/// Configuration for single-choice and dropdown questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceQuestion {
    #[serde(default)]
    pub shuffle_options: bool,
}

impl ChoiceQuestion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shuffled() -> Self {
        Self {
            shuffle_options: true,
        }
    }
}

/// Configuration for multiple-choice questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleChoiceQuestion {
    #[serde(default)]
    pub shuffle_options: bool,

    /// Optional upper bound on the number of selections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<usize>,
}

impl MultipleChoiceQuestion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a selection limit.
    pub fn with_max_selections(max: usize) -> Self {
        Self {
            shuffle_options: false,
            max_selections: Some(max),
        }
    }
}

/// Configuration for numeric questions.
///
/// Answers outside `min..=max` are out of the survey's target audience.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericQuestion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl NumericQuestion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with bounds.
    pub fn with_bounds(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// Check if `value` lies inside the bounds.
    pub fn accepts(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

/// Configuration for rating questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingQuestion {
    pub scale: u32,
}

impl Default for RatingQuestion {
    fn default() -> Self {
        Self { scale: 5 }
    }
}

/// One selectable option of a choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// The value stored in responses.
    pub value: String,

    /// The display text, possibly carrying inline translations.
    pub text: String,

    /// Optional short code used by reporting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl QuestionOption {
    /// Create an option.
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            code: None,
        }
    }

    /// Create an option whose stored value equals its display text.
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            value: text.clone(),
            text,
            code: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gender() -> Question {
        Question::new(
            "q_gender",
            "Gender {लिंग}",
            QuestionKind::SingleChoice(ChoiceQuestion::new()),
        )
        .with_options(vec![
            QuestionOption::new("1", "Male {पुरुष}"),
            QuestionOption::new("2", "Female {महिला}"),
        ])
    }

    #[test]
    fn find_option_by_value_or_text() {
        let question = gender();
        assert_eq!(question.find_option("2").unwrap().value, "2");
        assert_eq!(question.find_option(" female ").unwrap().value, "2");
        assert_eq!(question.find_option("MALE {पुरुष}").unwrap().value, "1");
        assert!(question.find_option("other").is_none());
    }

    #[test]
    fn set_number_requires_flag() {
        let json = r#"{"id": "q9", "text": "Q9", "type": "text", "setNumber": 2}"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.set_membership(), None);
        assert_eq!(Question::new("q9", "Q9", QuestionKind::Text).in_set(2).set_membership(), Some(2));
    }

    #[test]
    fn deserializes_wire_format() {
        let json = r#"{
            "id": "q_age",
            "text": "Age",
            "questionNumber": "3",
            "type": "numeric",
            "min": 18,
            "required": true,
            "enabledForCATI": false
        }"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.question_number(), Some("3"));
        assert!(question.is_required());
        assert!(question.is_enabled_for(InterviewMode::Capi));
        assert!(!question.is_enabled_for(InterviewMode::Cati));
        let QuestionKind::Numeric(numeric) = question.kind() else {
            panic!("expected numeric kind");
        };
        assert!(!numeric.accepts(17.0));
        assert!(numeric.accepts(18.0));
    }

    #[test]
    fn shuffling_is_per_kind() {
        assert!(QuestionKind::SingleChoice(ChoiceQuestion::shuffled()).shuffles_options());
        assert!(!QuestionKind::Text.shuffles_options());
    }

    #[test]
    fn dropdown_takes_a_single_answer() {
        assert!(QuestionKind::Dropdown(ChoiceQuestion::new()).is_single_answer());
        assert!(!QuestionKind::MultipleChoice(MultipleChoiceQuestion::default()).is_single_answer());
    }
}
