//! Interview session controller.
//!
//! A session owns everything that changes during one interview: the
//! collected responses, per-answer timing, the shuffled option orders and
//! the cursor. The survey definition is shared and never mutated.
//! Visibility is recomputed from scratch on every query, so any response
//! change is reflected immediately.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::location::LocationState;
use crate::sequence::{SequenceContext, presentation_order, visible_questions};
use crate::{
    InterviewMode, InterviewStatus, LocatedQuestion, LocationFix, PollingStation, Question,
    QuestionId, QuestionKind, ResponseEntry, ResponseValue, Responses, SessionError,
    SetNumberSource, SubmissionRecord, SubmissionSink, SurveyDefinition, SurveyRules,
    ValidationError, Visibility, condition, sets,
};

/// How a session is started.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Id issued by the backend when the interview was created.
    pub session_id: String,
    pub mode: InterviewMode,
    pub constituency: Option<String>,
    pub polling_station: Option<PollingStation>,

    /// Display language: `0` is the primary language, `n` the n-th inline translation.
    pub language: usize,

    /// Seed for option shuffling. Random when `None`.
    pub shuffle_seed: Option<u64>,
}

impl SessionOptions {
    pub fn new(session_id: impl Into<String>, mode: InterviewMode) -> Self {
        Self {
            session_id: session_id.into(),
            mode,
            constituency: None,
            polling_station: None,
            language: 0,
            shuffle_seed: None,
        }
    }

    pub fn with_constituency(mut self, constituency: impl Into<String>) -> Self {
        self.constituency = Some(constituency.into());
        self
    }

    pub fn with_polling_station(mut self, station: PollingStation) -> Self {
        self.polling_station = Some(station);
        self
    }

    pub fn with_language(mut self, language: usize) -> Self {
        self.language = language;
        self
    }

    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }
}

/// A single interview in progress.
#[derive(Debug)]
pub struct InterviewSession {
    options: SessionOptions,
    survey: Arc<SurveyDefinition>,
    rules: Option<SurveyRules>,
    set_number: Option<u32>,
    responses: Responses,
    response_times: HashMap<QuestionId, chrono::Duration>,
    started_at: DateTime<Utc>,
    last_answer_at: DateTime<Utc>,
    option_orders: HashMap<QuestionId, Vec<usize>>,
    rng: StdRng,
    location: LocationState,
    current: Option<QuestionId>,
}

impl InterviewSession {
    /// Start a new interview, resolving the CATI question set once.
    pub async fn start(
        survey: Arc<SurveyDefinition>,
        options: SessionOptions,
        rules: Option<SurveyRules>,
        set_source: &dyn SetNumberSource,
    ) -> Result<Self, SessionError> {
        Self::check(&survey, &options)?;
        let set_number = sets::resolve_set_number(options.mode, &survey, set_source).await;
        let session = Self::build(survey, options, rules, set_number, Responses::new());
        info!(
            session = %session.options.session_id,
            survey = %session.survey.id,
            mode = %session.options.mode,
            set_number = ?session.set_number,
            "interview started"
        );
        Ok(session)
    }

    /// Reopen an interview with a known set number and previously collected responses.
    pub fn resume(
        survey: Arc<SurveyDefinition>,
        options: SessionOptions,
        rules: Option<SurveyRules>,
        set_number: Option<u32>,
        responses: Responses,
    ) -> Result<Self, SessionError> {
        Self::check(&survey, &options)?;
        Ok(Self::build(survey, options, rules, set_number, responses))
    }

    fn check(survey: &SurveyDefinition, options: &SessionOptions) -> Result<(), SessionError> {
        if options.session_id.trim().is_empty() {
            return Err(SessionError::MissingSessionId);
        }
        if !survey.mode.supports(options.mode) {
            return Err(SessionError::UnsupportedMode {
                survey: survey.id.clone(),
                mode: options.mode,
            });
        }
        survey.validate()?;
        Ok(())
    }

    fn build(
        survey: Arc<SurveyDefinition>,
        options: SessionOptions,
        rules: Option<SurveyRules>,
        set_number: Option<u32>,
        responses: Responses,
    ) -> Self {
        let rng = match options.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let now = Utc::now();
        let mut session = Self {
            options,
            survey,
            rules,
            set_number,
            responses,
            response_times: HashMap::new(),
            started_at: now,
            last_answer_at: now,
            option_orders: HashMap::new(),
            rng,
            location: LocationState::Missing,
            current: None,
        };
        session.current = session
            .visible_questions()
            .first()
            .map(|located| located.question.id().clone());
        session
    }

    // === Accessors ===

    pub fn id(&self) -> &str {
        &self.options.session_id
    }

    pub fn mode(&self) -> InterviewMode {
        self.options.mode
    }

    pub fn survey(&self) -> &SurveyDefinition {
        &self.survey
    }

    /// The question set assigned to this session. Fixed for its lifetime.
    pub fn set_number(&self) -> Option<u32> {
        self.set_number
    }

    pub fn responses(&self) -> &Responses {
        &self.responses
    }

    pub fn location(&self) -> LocationState {
        self.location
    }

    fn context(&self) -> SequenceContext<'_> {
        SequenceContext::new(self.options.mode)
            .with_set_number(self.set_number)
            .with_constituency(self.options.constituency.as_deref())
            .with_rules(self.rules.as_ref())
    }

    // === Sequence ===

    /// The ordered questions to show for the current responses.
    pub fn visible_questions(&self) -> Vec<LocatedQuestion<'_>> {
        visible_questions(&self.survey, &self.responses, &self.context())
    }

    /// Three-valued condition outcome for one question, ignoring mode and set filters.
    pub fn visibility(&self, id: &QuestionId) -> Option<Visibility> {
        self.survey
            .question(id)
            .map(|question| condition::evaluate(question, &self.responses, &self.survey))
    }

    /// The question under the cursor.
    ///
    /// If it has become hidden, the cursor moves on to the next visible
    /// question that follows it in presentation order (after any reorder).
    pub fn current(&self) -> Option<&Question> {
        let visible = self.visible_questions();
        self.current_position(&visible).map(|i| visible[i].question)
    }

    fn current_position(&self, visible: &[LocatedQuestion<'_>]) -> Option<usize> {
        let Some(current) = self.current.as_ref() else {
            return (!visible.is_empty()).then_some(0);
        };
        if let Some(i) = visible.iter().position(|l| l.question.id() == current) {
            return Some(i);
        }

        let ranks: HashMap<&QuestionId, usize> = presentation_order(&self.survey, &self.context())
            .iter()
            .enumerate()
            .map(|(rank, located)| (located.question.id(), rank))
            .collect();
        let last = visible.len().checked_sub(1);
        let Some(&anchor) = ranks.get(current) else {
            return last;
        };
        visible
            .iter()
            .enumerate()
            .filter_map(|(i, l)| ranks.get(l.question.id()).map(|&rank| (rank, i)))
            .filter(|&(rank, _)| rank > anchor)
            .min()
            .map(|(_, i)| i)
            .or(last)
    }

    /// Validate the current question and move to the next visible one.
    ///
    /// Returns the new current question id, or `None` at the end of the sequence.
    pub fn advance(&mut self) -> Result<Option<QuestionId>, ValidationError> {
        let next = {
            let visible = self.visible_questions();
            let Some(position) = self.current_position(&visible) else {
                return Ok(None);
            };
            self.validate_question(visible[position].question)?;
            visible
                .get(position + 1)
                .map(|located| located.question.id().clone())
        };
        if let Some(id) = &next {
            debug!(session = %self.options.session_id, question = %id, "advanced");
            self.current = Some(id.clone());
        }
        Ok(next)
    }

    /// Move to the previous visible question. Returns its id, or `None` at the start.
    pub fn go_back(&mut self) -> Option<QuestionId> {
        let previous = {
            let visible = self.visible_questions();
            let position = self.current_position(&visible)?;
            position
                .checked_sub(1)
                .map(|i| visible[i].question.id().clone())
        };
        if let Some(id) = &previous {
            self.current = Some(id.clone());
        }
        previous
    }

    /// Move the cursor to a specific visible question (e.g. the one a validation error names).
    pub fn focus(&mut self, id: &QuestionId) -> Result<(), SessionError> {
        let visible = self
            .visible_questions()
            .iter()
            .any(|l| l.question.id() == id);
        if !visible {
            return Err(SessionError::UnknownQuestion(id.clone()));
        }
        self.current = Some(id.clone());
        Ok(())
    }

    // === Answers ===

    /// Record an answer. Re-answering replaces the previous value.
    pub fn answer(
        &mut self,
        id: impl Into<QuestionId>,
        value: impl Into<ResponseValue>,
    ) -> Result<(), SessionError> {
        let id = id.into();
        let value = value.into();
        let question = self
            .survey
            .question(&id)
            .ok_or_else(|| SessionError::UnknownQuestion(id.clone()))?;
        check_options(question, &value)?;

        let now = Utc::now();
        self.response_times.insert(id.clone(), now - self.last_answer_at);
        self.last_answer_at = now;
        debug!(session = %self.options.session_id, question = %id, "answered");
        self.responses.insert(id, value);
        Ok(())
    }

    /// Remove an answer.
    pub fn clear(&mut self, id: &QuestionId) -> Option<ResponseValue> {
        self.response_times.remove(id);
        self.responses.remove(id)
    }

    /// Check one question's answer against its requirements.
    pub fn validate_question(&self, question: &Question) -> Result<(), ValidationError> {
        let id = question.id();
        let Some(value) = self.responses.get(id).filter(|v| !v.is_blank()) else {
            if question.is_required() {
                return Err(ValidationError::Required {
                    question: id.clone(),
                });
            }
            return Ok(());
        };

        match question.kind() {
            QuestionKind::Numeric(numeric) => {
                let number = self.responses.get_number(id).map_err(|_| {
                    ValidationError::WrongType {
                        question: id.clone(),
                        expected: "Number",
                        actual: value.type_name(),
                    }
                })?;
                if !numeric.accepts(number) {
                    return Err(ValidationError::OutOfTargetAudience {
                        question: id.clone(),
                        value: number,
                    });
                }
            }
            QuestionKind::MultipleChoice(multi) => {
                if let Some(max) = multi.max_selections
                    && let Ok(selected) = self.responses.get_choices(id)
                    && selected.len() > max
                {
                    return Err(ValidationError::TooManySelections {
                        question: id.clone(),
                        max,
                        selected: selected.len(),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Validate every visible question; the error names the first offending one.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.visible_questions()
            .iter()
            .try_for_each(|located| self.validate_question(located.question))
    }

    // === Presentation ===

    /// Question text in the session language.
    pub fn display_text(&self, question: &Question) -> String {
        question
            .localized_text()
            .select(self.options.language)
            .to_string()
    }

    /// The order in which to present a question's options.
    ///
    /// Shuffling questions get a random order, drawn once per session and
    /// reused on every later call; others keep the definition order.
    pub fn option_order(&mut self, id: &QuestionId) -> Result<Vec<usize>, SessionError> {
        let question = self
            .survey
            .question(id)
            .ok_or_else(|| SessionError::UnknownQuestion(id.clone()))?;
        let count = question.options().len();
        if !question.kind().shuffles_options() {
            return Ok((0..count).collect());
        }
        if let Some(order) = self.option_orders.get(id) {
            return Ok(order.clone());
        }
        let mut order: Vec<usize> = (0..count).collect();
        order.shuffle(&mut self.rng);
        self.option_orders.insert(id.clone(), order.clone());
        Ok(order)
    }

    // === Location ===

    pub fn set_location(&mut self, fix: LocationFix) {
        self.location = LocationState::Acquired(fix);
    }

    /// Continue without a location after acquisition failed.
    pub fn waive_location(&mut self) {
        info!(session = %self.options.session_id, "continuing without location");
        self.location = LocationState::Waived;
    }

    // === Completion ===

    /// Validate and build the record of a completed interview.
    pub fn complete(&self) -> Result<SubmissionRecord, ValidationError> {
        self.validate()?;
        Ok(self.record(InterviewStatus::Completed, None))
    }

    /// Build the record of an abandoned interview with the answers so far.
    pub fn abandon(&self, reason: impl Into<String>) -> SubmissionRecord {
        self.record(InterviewStatus::Abandoned, Some(reason.into()))
    }

    fn record(&self, status: InterviewStatus, abandon_reason: Option<String>) -> SubmissionRecord {
        let responses = self
            .visible_questions()
            .iter()
            .map(|located| self.entry(located))
            .collect();

        SubmissionRecord {
            session_id: self.options.session_id.clone(),
            survey_id: self.survey.id.clone(),
            mode: self.options.mode,
            status,
            abandon_reason,
            set_number: self.set_number,
            constituency: self.options.constituency.clone(),
            polling_station: self.options.polling_station.clone(),
            location: self.location.fix(),
            started_at: self.started_at,
            ended_at: Utc::now(),
            responses,
        }
    }

    fn entry(&self, located: &LocatedQuestion<'_>) -> ResponseEntry {
        let question = located.question;
        let id = question.id();
        let response = self.responses.get(id).filter(|v| !v.is_blank()).cloned();
        let response_time_ms = self
            .response_times
            .get(id)
            .and_then(|d| u64::try_from(d.num_milliseconds()).ok())
            .unwrap_or(0);

        ResponseEntry {
            section_index: located.section_index,
            question_index: located.question_index,
            question_id: id.clone(),
            question_number: question.question_number().map(str::to_string),
            question_text: question.localized_text().primary().to_string(),
            options: question.options().to_vec(),
            is_skipped: response.is_none(),
            response,
            response_time_ms,
            is_required: question.is_required(),
        }
    }
}

fn check_options(question: &Question, value: &ResponseValue) -> Result<(), ValidationError> {
    if !question.kind().is_choice() {
        return Ok(());
    }
    if question.kind().is_single_answer()
        && let ResponseValue::Choices(selected) = value
        && selected.len() > 1
    {
        return Err(ValidationError::TooManySelections {
            question: question.id().clone(),
            max: 1,
            selected: selected.len(),
        });
    }
    if question.options().is_empty() {
        return Ok(());
    }
    for element in value.elements() {
        if element.trim().is_empty() {
            continue;
        }
        if question.find_option(&element).is_none() {
            return Err(ValidationError::InvalidOption {
                question: question.id().clone(),
                value: element.into_owned(),
            });
        }
    }
    Ok(())
}

/// Send a finished record to the sink matching its status.
pub async fn submit(
    record: &SubmissionRecord,
    sink: &dyn SubmissionSink,
) -> Result<(), SessionError> {
    match record.status {
        InterviewStatus::Completed => sink.complete_interview(record).await?,
        InterviewStatus::Abandoned => sink.abandon_interview(record).await?,
    }
    info!(
        session = %record.session_id,
        status = ?record.status,
        answered = record.answered(),
        "interview submitted"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ChoiceQuestion, Condition, MultipleChoiceQuestion, NumericQuestion, QuestionOption,
        ReorderEntry, Section,
    };

    fn survey() -> Arc<SurveyDefinition> {
        Arc::new(
            SurveyDefinition::new("household", "Household").with_section(Section::new(
                "",
                vec![
                    Question::new("q1", "Gender {लिंग}", QuestionKind::SingleChoice(ChoiceQuestion::new()))
                        .with_options(vec![
                            QuestionOption::plain("male"),
                            QuestionOption::plain("female"),
                        ])
                        .required(),
                    Question::new("q2", "Occupation", QuestionKind::Text)
                        .with_condition(Condition::equals("q1", "male")),
                    Question::new("q3", "Age", QuestionKind::Numeric(NumericQuestion::with_bounds(Some(18.0), None)))
                        .required(),
                    Question::new(
                        "q4",
                        "Issues",
                        QuestionKind::MultipleChoice(MultipleChoiceQuestion {
                            shuffle_options: true,
                            max_selections: Some(2),
                        }),
                    )
                    .with_options(vec![
                        QuestionOption::plain("Jobs"),
                        QuestionOption::plain("Roads"),
                        QuestionOption::plain("Water"),
                        QuestionOption::plain("Power"),
                    ]),
                ],
            )),
        )
    }

    fn session() -> InterviewSession {
        InterviewSession::resume(
            survey(),
            SessionOptions::new("sess-1", InterviewMode::Capi).with_shuffle_seed(7),
            None,
            None,
            Responses::new(),
        )
        .unwrap()
    }

    fn visible_ids(session: &InterviewSession) -> Vec<String> {
        session
            .visible_questions()
            .iter()
            .map(|l| l.question.id().to_string())
            .collect()
    }

    #[test]
    fn empty_session_id_is_rejected() {
        let result = InterviewSession::resume(
            survey(),
            SessionOptions::new(" ", InterviewMode::Capi),
            None,
            None,
            Responses::new(),
        );
        assert!(matches!(result, Err(SessionError::MissingSessionId)));
    }

    #[test]
    fn changing_an_answer_reveals_question_in_place() {
        let mut session = session();
        session.answer("q1", "female").unwrap();
        assert_eq!(visible_ids(&session), ["q1", "q3", "q4"]);

        session.answer("q1", "male").unwrap();
        assert_eq!(visible_ids(&session), ["q1", "q2", "q3", "q4"]);
    }

    #[test]
    fn advance_blocks_on_required_question() {
        let mut session = session();
        assert_eq!(session.current().unwrap().id().as_str(), "q1");
        let err = session.advance().unwrap_err();
        assert_eq!(err.question().as_str(), "q1");

        session.answer("q1", "female").unwrap();
        assert_eq!(session.advance().unwrap().unwrap().as_str(), "q3");
        assert_eq!(session.go_back().unwrap().as_str(), "q1");
    }

    #[test]
    fn out_of_target_audience_blocks_navigation() {
        let mut session = session();
        session.answer("q1", "female").unwrap();
        session.advance().unwrap();
        session.answer("q3", 16).unwrap();
        assert!(matches!(
            session.advance(),
            Err(ValidationError::OutOfTargetAudience { .. })
        ));
        session.answer("q3", 34).unwrap();
        assert_eq!(session.advance().unwrap().unwrap().as_str(), "q4");
        assert_eq!(session.advance().unwrap(), None);
    }

    #[test]
    fn cursor_moves_on_when_its_question_is_hidden() {
        let mut session = session();
        session.answer("q1", "male").unwrap();
        session.advance().unwrap();
        assert_eq!(session.current().unwrap().id().as_str(), "q2");

        session.answer("q1", "female").unwrap();
        assert_eq!(session.current().unwrap().id().as_str(), "q3");
    }

    #[test]
    fn hidden_cursor_follows_reordered_sequence() {
        let survey = SurveyDefinition::new("tracker", "Tracker").with_section(Section::new(
            "",
            vec![
                Question::new("q1", "Voted before?", QuestionKind::SingleChoice(ChoiceQuestion::new()))
                    .with_number("1")
                    .with_options(vec![QuestionOption::plain("yes"), QuestionOption::plain("no")]),
                Question::new("q2", "For whom?", QuestionKind::Text)
                    .with_number("2")
                    .with_condition(Condition::equals("q1", "yes")),
                Question::new("q3", "Age", QuestionKind::Text).with_number("3"),
                Question::new("q4", "District", QuestionKind::Text).with_number("4"),
            ],
        ));
        let rules = SurveyRules::new("tracker").with_reorder(vec![
            ReorderEntry::new("4"),
            ReorderEntry::new("1"),
            ReorderEntry::new("2"),
            ReorderEntry::new("3"),
        ]);
        let mut session = InterviewSession::resume(
            Arc::new(survey),
            SessionOptions::new("sess-3", InterviewMode::Cati),
            Some(rules),
            None,
            Responses::new(),
        )
        .unwrap();

        assert_eq!(session.current().unwrap().id().as_str(), "q4");
        session.answer("q4", "North").unwrap();
        assert_eq!(session.advance().unwrap().unwrap().as_str(), "q1");
        session.answer("q1", "yes").unwrap();
        assert_eq!(session.advance().unwrap().unwrap().as_str(), "q2");

        session.answer("q1", "no").unwrap();
        assert_eq!(visible_ids(&session), ["q4", "q1", "q3"]);
        assert_eq!(session.current().unwrap().id().as_str(), "q3");
        assert_eq!(session.go_back().unwrap().as_str(), "q1");
    }

    #[test]
    fn unknown_question_and_invalid_option_are_rejected() {
        let mut session = session();
        assert!(matches!(
            session.answer("nope", "x"),
            Err(SessionError::UnknownQuestion(_))
        ));
        assert!(matches!(
            session.answer("q1", "other"),
            Err(SessionError::Validation(ValidationError::InvalidOption { .. }))
        ));
    }

    #[test]
    fn too_many_selections() {
        let mut session = session();
        session.answer("q1", "female").unwrap();
        session.answer("q3", 30).unwrap();
        session.answer("q4", vec!["Jobs", "Roads", "Water"]).unwrap();
        assert!(matches!(
            session.validate(),
            Err(ValidationError::TooManySelections { max: 2, selected: 3, .. })
        ));
    }

    #[test]
    fn single_choice_takes_one_answer() {
        let mut session = session();
        assert!(matches!(
            session.answer("q1", vec!["male", "female"]),
            Err(SessionError::Validation(ValidationError::TooManySelections {
                max: 1,
                selected: 2,
                ..
            }))
        ));
        assert!(session.answer("q1", vec!["female"]).is_ok());
    }

    #[test]
    fn numeric_text_answers_are_accepted() {
        let mut session = session();
        session.answer("q1", "female").unwrap();
        session.answer("q3", " 42 ").unwrap();
        assert!(session.validate().is_ok());

        session.answer("q3", "forty").unwrap();
        assert!(matches!(
            session.validate(),
            Err(ValidationError::WrongType { expected: "Number", .. })
        ));
    }

    #[test]
    fn option_order_is_memoised_per_session() {
        let mut session = session();
        let id = QuestionId::new("q4");
        let first = session.option_order(&id).unwrap();
        let mut sorted = first.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, [0, 1, 2, 3]);
        assert_eq!(session.option_order(&id).unwrap(), first);

        assert_eq!(session.option_order(&QuestionId::new("q1")).unwrap(), [0, 1]);
    }

    #[test]
    fn display_text_uses_session_language() {
        let hindi = InterviewSession::resume(
            survey(),
            SessionOptions::new("sess-2", InterviewMode::Capi).with_language(1),
            None,
            None,
            Responses::new(),
        )
        .unwrap();
        let question = hindi.survey().question(&QuestionId::new("q1")).unwrap();
        assert_eq!(hindi.display_text(question), "लिंग");
        let occupation = hindi.survey().question(&QuestionId::new("q2")).unwrap();
        assert_eq!(hindi.display_text(occupation), "Occupation");
    }

    #[test]
    fn complete_requires_valid_answers_and_abandon_does_not() {
        let mut session = session();
        assert!(session.complete().is_err());

        let abandoned = session.abandon("respondent busy");
        assert_eq!(abandoned.status, InterviewStatus::Abandoned);
        assert!(abandoned.responses.iter().all(|e| e.is_skipped));

        session.answer("q1", "male").unwrap();
        session.answer("q3", 40).unwrap();
        let record = session.complete().unwrap();
        assert_eq!(record.status, InterviewStatus::Completed);
        let skipped: Vec<_> = record
            .responses
            .iter()
            .filter(|e| e.is_skipped)
            .map(|e| e.question_id.as_str())
            .collect();
        assert_eq!(skipped, ["q2", "q4"]);
        assert_eq!(record.responses[0].question_text, "Gender");
    }
}
