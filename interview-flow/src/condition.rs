//! Condition evaluation.
//!
//! A question's conditions are folded left to right: the first condition
//! seeds the result, and every following condition joins the running
//! result with its own connector (`AND` or `OR`). There is no operator
//! precedence, so `A OR B AND C` means `(A OR B) AND C`.
//!
//! Evaluation never fails. A condition on an unanswered question is
//! `Pending`, and a numeric comparison on text that does not parse is
//! `Hidden`; both keep the question off screen.

use crate::localized_text::{normalize, strip_translations};
use crate::{
    Condition, ConditionOperator, LogicConnector, Question, ResponseValue, Responses,
    SurveyDefinition, Visibility,
};

/// Evaluate all conditions of `question` against the current responses.
pub fn evaluate(
    question: &Question,
    responses: &Responses,
    definition: &SurveyDefinition,
) -> Visibility {
    let mut conditions = question.conditions().iter();
    let Some(first) = conditions.next() else {
        return Visibility::Visible;
    };

    let seed = evaluate_condition(first, responses, definition);
    conditions.fold(seed, |acc, condition| {
        let outcome = evaluate_condition(condition, responses, definition);
        match condition.logic {
            LogicConnector::And => acc.and(outcome),
            LogicConnector::Or => acc.or(outcome),
        }
    })
}

/// Check if `question` should be shown given the current responses.
pub fn is_visible(question: &Question, responses: &Responses, definition: &SurveyDefinition) -> bool {
    evaluate(question, responses, definition).is_visible()
}

/// Evaluate a single condition.
pub fn evaluate_condition(
    condition: &Condition,
    responses: &Responses,
    definition: &SurveyDefinition,
) -> Visibility {
    let Some(response) = responses.get(&condition.question_id) else {
        return Visibility::Pending;
    };
    let target = definition.question(&condition.question_id);
    Visibility::from(test(condition, response, target))
}

fn test(condition: &Condition, response: &ResponseValue, target: Option<&Question>) -> bool {
    use ConditionOperator::*;

    match condition.operator {
        IsEmpty => response.is_blank(),
        IsNotEmpty => !response.is_blank(),
        GreaterThan => compare_numeric(response, &condition.value, |lhs, rhs| lhs > rhs),
        LessThan => compare_numeric(response, &condition.value, |lhs, rhs| lhs < rhs),
        Equals | IsSelected => any_element(response, &condition.value, target, |a, b| a == b),
        NotEquals | IsNotSelected => !any_element(response, &condition.value, target, |a, b| a == b),
        Contains => any_element(response, &condition.value, target, |a, b| a.contains(b)),
        NotContains => !any_element(response, &condition.value, target, |a, b| a.contains(b)),
    }
}

/// Normalised comparison form of `raw`. When the target question has a
/// matching option, its display text is used, so stored values and
/// display texts compare equal.
fn canonical(raw: &str, target: Option<&Question>) -> String {
    target
        .and_then(|question| question.find_option(raw))
        .map(|option| normalize(&option.text))
        .unwrap_or_else(|| normalize(raw))
}

fn any_element(
    response: &ResponseValue,
    expected: &str,
    target: Option<&Question>,
    matches: impl Fn(&str, &str) -> bool,
) -> bool {
    let expected = canonical(expected, target);
    response
        .elements()
        .iter()
        .any(|element| matches(&canonical(element, target), &expected))
}

fn parse_number(raw: &str) -> Option<f64> {
    strip_translations(raw).parse::<f64>().ok()
}

fn compare_numeric(response: &ResponseValue, expected: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    let Some(rhs) = parse_number(expected) else {
        return false;
    };
    match response {
        ResponseValue::Number(lhs) => cmp(*lhs, rhs),
        other => other
            .elements()
            .iter()
            .filter_map(|element| parse_number(element))
            .any(|lhs| cmp(lhs, rhs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChoiceQuestion, MultipleChoiceQuestion, QuestionKind, QuestionOption, Section};

    fn survey(dependent: Question) -> SurveyDefinition {
        SurveyDefinition::new("s", "conditions").with_section(Section::new(
            "",
            vec![
                Question::new(
                    "gender",
                    "Gender",
                    QuestionKind::SingleChoice(ChoiceQuestion::new()),
                )
                .with_options(vec![
                    QuestionOption::new("1", "Male {पुरुष}"),
                    QuestionOption::new("2", "Female {महिला}"),
                ]),
                Question::new(
                    "issues",
                    "Issues",
                    QuestionKind::MultipleChoice(MultipleChoiceQuestion::new()),
                )
                .with_options(vec![
                    QuestionOption::plain("Jobs"),
                    QuestionOption::plain("Roads"),
                    QuestionOption::plain("Water"),
                ]),
                Question::new("age", "Age", QuestionKind::Text),
                Question::new("comment", "Comment", QuestionKind::Text),
                dependent,
            ],
        ))
    }

    fn visible_with(condition: Condition, answers: &[(&str, ResponseValue)]) -> Visibility {
        let dependent = Question::new("dep", "Dependent", QuestionKind::Text).with_condition(condition);
        let definition = survey(dependent.clone());
        let mut responses = Responses::new();
        for (id, value) in answers {
            responses.insert(*id, value.clone());
        }
        evaluate(&dependent, &responses, &definition)
    }

    #[test]
    fn no_conditions_is_always_visible() {
        let question = Question::new("free", "Free", QuestionKind::Text);
        let definition = survey(question.clone());
        assert!(is_visible(&question, &Responses::new(), &definition));
    }

    #[test]
    fn missing_answer_is_pending() {
        let outcome = visible_with(Condition::equals("comment", "x"), &[]);
        assert_eq!(outcome, Visibility::Pending);
        assert!(!outcome.is_visible());
    }

    #[test]
    fn equals_matches_option_value_or_display_text() {
        let by_text = Condition::equals("gender", "female");
        assert!(visible_with(by_text.clone(), &[("gender", "2".into())]).is_visible());
        assert!(visible_with(by_text, &[("gender", "1".into())]).is_hidden());

        let by_value = Condition::equals("gender", "2");
        assert!(visible_with(by_value, &[("gender", "Female {महिला}".into())]).is_visible());
    }

    #[test]
    fn not_equals_is_the_complement() {
        let condition = Condition::new("gender", ConditionOperator::NotEquals, "Male");
        assert!(visible_with(condition.clone(), &[("gender", "2".into())]).is_visible());
        assert!(visible_with(condition, &[("gender", "1".into())]).is_hidden());
    }

    #[test]
    fn multi_select_matches_any_element() {
        let selected = Condition::new("issues", ConditionOperator::IsSelected, "roads");
        let answer = ResponseValue::from(vec!["Jobs", "Roads"]);
        assert!(visible_with(selected, &[("issues", answer.clone())]).is_visible());

        let not_selected = Condition::new("issues", ConditionOperator::IsNotSelected, "Water");
        assert!(visible_with(not_selected, &[("issues", answer)]).is_visible());
    }

    #[test]
    fn contains_is_substring_after_normalisation() {
        let condition = Condition::new("comment", ConditionOperator::Contains, "WATER");
        assert!(visible_with(condition.clone(), &[("comment", "no  water supply".into())]).is_visible());
        let negated = Condition::new("comment", ConditionOperator::NotContains, "water");
        assert!(visible_with(negated, &[("comment", "roads".into())]).is_visible());
    }

    #[test]
    fn numeric_comparisons() {
        let adult = Condition::new("age", ConditionOperator::GreaterThan, "17");
        assert!(visible_with(adult.clone(), &[("age", ResponseValue::from(18))]).is_visible());
        assert!(visible_with(adult.clone(), &[("age", " 21 ".into())]).is_visible());
        assert!(visible_with(adult, &[("age", ResponseValue::from(17))]).is_hidden());

        let young = Condition::new("age", ConditionOperator::LessThan, "30");
        assert!(visible_with(young, &[("age", ResponseValue::from(29.5))]).is_visible());
    }

    #[test]
    fn unparsable_numbers_hide_without_error() {
        let bad_answer = Condition::new("age", ConditionOperator::GreaterThan, "17");
        assert!(visible_with(bad_answer, &[("age", "twenty".into())]).is_hidden());

        let bad_value = Condition::new("age", ConditionOperator::LessThan, "abc");
        assert!(visible_with(bad_value, &[("age", ResponseValue::from(5))]).is_hidden());
    }

    #[test]
    fn emptiness_checks() {
        let empty = Condition::new("comment", ConditionOperator::IsEmpty, "");
        assert!(visible_with(empty.clone(), &[("comment", "  ".into())]).is_visible());
        assert!(visible_with(empty, &[]).is_pending());

        let not_empty = Condition::new("issues", ConditionOperator::IsNotEmpty, "");
        let none: ResponseValue = Vec::<String>::new().into();
        assert!(visible_with(not_empty, &[("issues", none)]).is_hidden());
    }

    #[test]
    fn or_chain_is_visible_if_either_holds() {
        let dependent = Question::new("dep", "Dependent", QuestionKind::Text)
            .with_condition(Condition::equals("gender", "Male"))
            .with_condition(Condition::equals("comment", "yes").or());
        let definition = survey(dependent.clone());

        let mut responses = Responses::new();
        responses.insert("gender", "2");
        responses.insert("comment", "yes");
        assert!(is_visible(&dependent, &responses, &definition));

        responses.insert("comment", "no");
        assert!(!is_visible(&dependent, &responses, &definition));
    }

    #[test]
    fn mixed_chain_folds_left_to_right() {
        // (gender = Male OR comment = yes) AND age > 50
        let dependent = Question::new("dep", "Dependent", QuestionKind::Text)
            .with_condition(Condition::equals("gender", "Male"))
            .with_condition(Condition::equals("comment", "yes").or())
            .with_condition(Condition::new("age", ConditionOperator::GreaterThan, "50"));
        let definition = survey(dependent.clone());

        let mut responses = Responses::new();
        responses.insert("gender", "1");
        responses.insert("comment", "no");
        responses.insert("age", 30);
        assert!(!is_visible(&dependent, &responses, &definition));

        // Reordered: gender = Male OR (comment = yes AND age > 50) would be
        // visible here; the fold does not regroup.
        let reordered = Question::new("dep", "Dependent", QuestionKind::Text)
            .with_condition(Condition::equals("comment", "yes"))
            .with_condition(Condition::new("age", ConditionOperator::GreaterThan, "50"))
            .with_condition(Condition::equals("gender", "Male").or());
        assert!(is_visible(&reordered, &responses, &definition));
    }

    #[test]
    fn pending_is_overridden_by_a_satisfied_or() {
        let dependent = Question::new("dep", "Dependent", QuestionKind::Text)
            .with_condition(Condition::equals("comment", "yes"))
            .with_condition(Condition::equals("gender", "Female").or());
        let definition = survey(dependent.clone());

        let mut responses = Responses::new();
        responses.insert("gender", "2");
        assert_eq!(evaluate(&dependent, &responses, &definition), Visibility::Visible);

        responses.insert("gender", "1");
        assert_eq!(evaluate(&dependent, &responses, &definition), Visibility::Pending);
    }
}
