//! The visible question sequence.
//!
//! Filters run in a fixed order: interview mode, alternate set, survey
//! rules, display conditions. The survey's reorder table is applied last,
//! to the questions that survived every filter.

use tracing::trace;

use crate::{
    InterviewMode, LocatedQuestion, Responses, SurveyDefinition, SurveyRules, condition, sets,
};

/// Session facts that decide which questions are in play.
#[derive(Debug, Clone, Copy)]
pub struct SequenceContext<'a> {
    pub mode: InterviewMode,
    pub set_number: Option<u32>,
    pub constituency: Option<&'a str>,
    pub rules: Option<&'a SurveyRules>,
}

impl<'a> SequenceContext<'a> {
    /// A context with no set, constituency or survey rules.
    pub fn new(mode: InterviewMode) -> Self {
        Self {
            mode,
            set_number: None,
            constituency: None,
            rules: None,
        }
    }

    pub fn with_set_number(mut self, set_number: Option<u32>) -> Self {
        self.set_number = set_number;
        self
    }

    pub fn with_constituency(mut self, constituency: Option<&'a str>) -> Self {
        self.constituency = constituency;
        self
    }

    pub fn with_rules(mut self, rules: Option<&'a SurveyRules>) -> Self {
        self.rules = rules;
        self
    }

    /// Check every filter except display conditions.
    pub fn admits(&self, located: &LocatedQuestion<'_>) -> bool {
        let question = located.question;
        question.is_enabled_for(self.mode)
            && sets::permits(question, self.mode, self.set_number)
            && self
                .rules
                .is_none_or(|rules| rules.permits(question, self.constituency))
    }
}

/// Compute the ordered list of questions to show for the current responses.
///
/// Must be called again after every response change: later questions may
/// depend on any earlier answer.
pub fn visible_questions<'d>(
    definition: &'d SurveyDefinition,
    responses: &Responses,
    context: &SequenceContext<'_>,
) -> Vec<LocatedQuestion<'d>> {
    let visible: Vec<_> = definition
        .questions()
        .filter(|located| context.admits(located))
        .filter(|located| {
            let shown = condition::is_visible(located.question, responses, definition);
            if !shown {
                trace!(question = %located.question.id(), "hidden by conditions");
            }
            shown
        })
        .collect();

    match context.rules {
        Some(rules) => rules.reorder(visible),
        None => visible,
    }
}

/// Every question the session may ever show, in presentation order,
/// regardless of display conditions.
///
/// Gives each question a stable rank, so a cursor whose question was just
/// hidden can find the question that follows it on screen.
pub fn presentation_order<'d>(
    definition: &'d SurveyDefinition,
    context: &SequenceContext<'_>,
) -> Vec<LocatedQuestion<'d>> {
    let admitted: Vec<_> = definition
        .questions()
        .filter(|located| context.admits(located))
        .collect();

    match context.rules {
        Some(rules) => rules.reorder(admitted),
        None => admitted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Condition, Question, QuestionKind, Section};

    fn survey() -> SurveyDefinition {
        SurveyDefinition::new("s", "Sequence").with_section(Section::new(
            "",
            vec![
                Question::new("q1", "Q1", QuestionKind::Text),
                Question::new("q2", "Q2", QuestionKind::Text)
                    .with_condition(Condition::equals("q1", "male")),
                Question::new("capi_only", "Show card", QuestionKind::Text).with_modes(true, false),
                Question::new("set1", "Variant A", QuestionKind::Text).in_set(1),
                Question::new("set2", "Variant B", QuestionKind::Text).in_set(2),
            ],
        ))
    }

    fn ids(definition: &SurveyDefinition, responses: &Responses, context: SequenceContext<'_>) -> Vec<String> {
        visible_questions(definition, responses, &context)
            .iter()
            .map(|l| l.question.id().to_string())
            .collect()
    }

    #[test]
    fn conditional_question_appears_in_place() {
        let survey = survey();
        let context = SequenceContext::new(InterviewMode::Capi);
        let mut responses = Responses::new();

        responses.insert("q1", "female");
        assert_eq!(ids(&survey, &responses, context), ["q1", "capi_only", "set1", "set2"]);

        responses.insert("q1", "male");
        assert_eq!(
            ids(&survey, &responses, context),
            ["q1", "q2", "capi_only", "set1", "set2"]
        );
    }

    #[test]
    fn cati_drops_capi_questions_and_other_sets() {
        let survey = survey();
        let context = SequenceContext::new(InterviewMode::Cati).with_set_number(Some(2));
        assert_eq!(ids(&survey, &Responses::new(), context), ["q1", "set2"]);
    }

    #[test]
    fn presentation_order_ignores_conditions() {
        let survey = survey();
        let context = SequenceContext::new(InterviewMode::Cati).with_set_number(Some(1));
        let order: Vec<_> = presentation_order(&survey, &context)
            .iter()
            .map(|l| l.question.id().to_string())
            .collect();
        assert_eq!(order, ["q1", "q2", "set1"]);
    }
}
