//! Survey-specific rules, loaded from configuration alongside the survey.
//!
//! Two kinds of rule exist:
//! - a reorder table that re-sequences the visible questions into a fixed
//!   canonical order of question numbers;
//! - a bye-election rule that limits one question to the constituencies
//!   holding a bye-election.
//!
//! The bye-election constituencies can also be taken from the AC master
//! data, a JSON object keyed by constituency name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ConfigError, LocatedQuestion, Question};

/// Rules for one survey.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyRules {
    pub survey_id: String,

    /// Canonical question order. Empty means the survey order is kept.
    #[serde(default)]
    pub reorder: Vec<ReorderEntry>,

    #[serde(default)]
    pub bye_election: Option<ByeElectionRule>,
}

impl SurveyRules {
    pub fn new(survey_id: impl Into<String>) -> Self {
        Self {
            survey_id: survey_id.into(),
            reorder: Vec::new(),
            bye_election: None,
        }
    }

    /// Set the reorder table.
    pub fn with_reorder(mut self, entries: Vec<ReorderEntry>) -> Self {
        self.reorder = entries;
        self
    }

    /// Set the bye-election rule.
    pub fn with_bye_election(mut self, rule: ByeElectionRule) -> Self {
        self.bye_election = Some(rule);
        self
    }

    /// Check if `question` may be shown to a respondent in `constituency`.
    pub fn permits(&self, question: &Question, constituency: Option<&str>) -> bool {
        self.bye_election
            .as_ref()
            .is_none_or(|rule| rule.permits(question, constituency))
    }

    /// Re-sequence visible questions according to the reorder table.
    ///
    /// Questions before the first numbered questionnaire question (consent,
    /// call status, ...) stay where they are. After that, questions matching
    /// the table are emitted in table order, followed by the unmatched ones
    /// in their original relative order.
    pub fn reorder<'a>(&self, mut visible: Vec<LocatedQuestion<'a>>) -> Vec<LocatedQuestion<'a>> {
        if self.reorder.is_empty() {
            return visible;
        }

        let split = visible
            .iter()
            .position(|located| is_numbered(located.question))
            .unwrap_or(visible.len());
        let mut remaining: Vec<Option<LocatedQuestion<'a>>> =
            visible.split_off(split).into_iter().map(Some).collect();

        for entry in &self.reorder {
            let key = entry.key();
            for slot in &mut remaining {
                let matches = slot
                    .as_ref()
                    .is_some_and(|located| number_of(located.question) == Some(key.as_str()));
                if matches && let Some(located) = slot.take() {
                    visible.push(located);
                }
            }
        }

        let unmatched = remaining.iter().flatten().count();
        visible.extend(remaining.into_iter().flatten());
        debug!(survey = %self.survey_id, unmatched, "reordered visible questions");
        visible
    }
}

fn number_of(question: &Question) -> Option<&str> {
    question
        .question_number()
        .map(str::trim)
        .filter(|number| !number.is_empty())
}

fn is_numbered(question: &Question) -> bool {
    !question.is_system() && number_of(question).is_some()
}

/// One position in a reorder table: a question number and an optional
/// sub-question letter, matched against `"{question_number}{sub_question}"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderEntry {
    pub question_number: String,

    #[serde(default)]
    pub sub_question: Option<String>,
}

impl ReorderEntry {
    pub fn new(question_number: impl Into<String>) -> Self {
        Self {
            question_number: question_number.into(),
            sub_question: None,
        }
    }

    pub fn with_sub(question_number: impl Into<String>, sub_question: impl Into<String>) -> Self {
        Self {
            question_number: question_number.into(),
            sub_question: Some(sub_question.into()),
        }
    }

    /// The question number this entry matches.
    pub fn key(&self) -> String {
        let number = self.question_number.trim();
        match self.sub_question.as_deref().map(str::trim) {
            Some(sub) => format!("{number}{sub}"),
            None => number.to_string(),
        }
    }
}

/// Shows the question numbered `question_number` only in the listed constituencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByeElectionRule {
    pub question_number: String,

    #[serde(default)]
    pub constituencies: Vec<String>,
}

impl ByeElectionRule {
    /// Gate `question_number` to every constituency flagged in the AC master.
    pub fn from_ac_master(question_number: impl Into<String>, master: &AcMaster) -> Self {
        Self {
            question_number: question_number.into(),
            constituencies: master
                .iter()
                .filter(|(_, entry)| entry.has_bye_election)
                .map(|(name, _)| name.clone())
                .collect(),
        }
    }

    pub fn permits(&self, question: &Question, constituency: Option<&str>) -> bool {
        if number_of(question) != Some(self.question_number.trim()) {
            return true;
        }
        let Some(constituency) = constituency.map(|c| c.trim().to_lowercase()) else {
            return false;
        };
        self.constituencies
            .iter()
            .any(|listed| listed.trim().to_lowercase() == constituency)
    }
}

/// One constituency in the AC master data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcMasterEntry {
    #[serde(default)]
    pub mp_name: String,

    #[serde(default)]
    pub mla_name: String,

    #[serde(default)]
    pub has_bye_election: bool,
}

/// AC master data keyed by constituency name.
pub type AcMaster = BTreeMap<String, AcMasterEntry>;

/// Parse AC master data from JSON.
pub fn parse_ac_master(json: &str) -> Result<AcMaster, ConfigError> {
    let master: AcMaster = serde_json::from_str(json)?;
    debug!(constituencies = master.len(), "loaded AC master data");
    Ok(master)
}
