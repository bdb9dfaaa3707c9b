//! A telephone election tracker with split-sample question sets.
//!
//! Consecutive CATI interviews alternate between set 1 (issue salience)
//! and set 2 (leadership preference). Q16 is only asked in the
//! constituency holding a bye-election; that gating and the canonical
//! question order live in [`TRACKER_CONFIG`].

use interview_flow_types::{
    ChoiceQuestion, Condition, ConditionOperator, MultipleChoiceQuestion, NumericQuestion,
    Question, QuestionKind, QuestionOption, RatingQuestion, Section, SurveyDefinition, SurveyMode,
};

pub const TRACKER_ID: &str = "ac-tracker-2025";

/// The one constituency where Q16 is asked.
pub const BYE_ELECTION_SEAT: &str = "Basirhat Dakshin";

/// Engine config for the tracker: canonical order and bye-election gating.
pub const TRACKER_CONFIG: &str = r#"
[location]
gps_timeout_ms = 20000

[[surveys]]
survey_id = "ac-tracker-2025"
reorder = [
    { question_number = "2" },
    { question_number = "1" },
    { question_number = "3" },
    { question_number = "4" },
    { question_number = "4", sub_question = "a" },
    { question_number = "16" },
    { question_number = "5", sub_question = "a" },
    { question_number = "5", sub_question = "b" },
    { question_number = "6" },
]

[surveys.bye_election]
question_number = "16"
constituencies = ["Basirhat Dakshin"]
"#;

fn parties() -> Vec<QuestionOption> {
    vec![
        QuestionOption::new("aitc", "AITC {তৃণমূল}"),
        QuestionOption::new("bjp", "BJP {বিজেপি}"),
        QuestionOption::new("left", "Left Front {বামফ্রন্ট}"),
        QuestionOption::new("inc", "Congress {কংগ্রেস}"),
        QuestionOption::new("undecided", "Undecided {ঠিক করিনি}"),
    ]
}

fn yes_no() -> Vec<QuestionOption> {
    vec![QuestionOption::plain("Yes"), QuestionOption::plain("No")]
}

pub fn election_tracker() -> SurveyDefinition {
    let call = Section::new(
        "Call",
        vec![
            Question::new(
                "consent",
                "May we ask you a few questions about the coming election?",
                QuestionKind::SingleChoice(ChoiceQuestion::new()),
            )
            .with_options(yes_no())
            .required()
            .system(),
            Question::new(
                "call_status",
                "Call status",
                QuestionKind::Dropdown(ChoiceQuestion::new()),
            )
            .with_options(vec![
                QuestionOption::new("completed", "Completed"),
                QuestionOption::new("callback", "Call back later"),
                QuestionOption::new("refused", "Refused"),
            ])
            .with_modes(false, true)
            .system(),
        ],
    );

    let voting = Section::new(
        "Voting",
        vec![
            Question::new(
                "age",
                "How old are you? {আপনার বয়স কত?}",
                QuestionKind::Numeric(NumericQuestion::with_bounds(Some(18.0), None)),
            )
            .with_number("1")
            .required(),
            Question::new(
                "gender",
                "Gender {লিঙ্গ}",
                QuestionKind::SingleChoice(ChoiceQuestion::new()),
            )
            .with_number("2")
            .with_options(vec![
                QuestionOption::new("male", "Male {পুরুষ}"),
                QuestionOption::new("female", "Female {মহিলা}"),
            ])
            .required(),
            Question::new(
                "vote_2021",
                "Whom did you vote for in 2021?",
                QuestionKind::SingleChoice(ChoiceQuestion::new()),
            )
            .with_number("3")
            .with_options(parties()),
            Question::new(
                "vote_intent",
                "Whom will you vote for this time?",
                QuestionKind::SingleChoice(ChoiceQuestion::shuffled()),
            )
            .with_number("4")
            .with_options(parties())
            .required(),
            Question::new(
                "undecided_lean",
                "Which party are you leaning towards?",
                QuestionKind::SingleChoice(ChoiceQuestion::shuffled()),
            )
            .with_number("4a")
            .with_options(parties())
            .with_condition(Condition::equals("vote_intent", "undecided")),
            Question::new(
                "issues",
                "Which issues matter most to you?",
                QuestionKind::MultipleChoice(MultipleChoiceQuestion::with_max_selections(2)),
            )
            .with_number("5a")
            .with_options(vec![
                QuestionOption::plain("Jobs"),
                QuestionOption::plain("Prices"),
                QuestionOption::plain("Law and order"),
                QuestionOption::plain("Corruption"),
            ])
            .in_set(1),
            Question::new(
                "preferred_cm",
                "Who would you prefer as Chief Minister?",
                QuestionKind::Text,
            )
            .with_number("5b")
            .in_set(2),
            Question::new(
                "government_rating",
                "How would you rate the state government?",
                QuestionKind::Rating(RatingQuestion { scale: 5 }),
            )
            .with_number("6")
            .with_condition(Condition::new(
                "age",
                ConditionOperator::GreaterThan,
                "25",
            ))
            .with_condition(Condition::equals("vote_2021", "aitc").or()),
            Question::new(
                "show_card",
                "Point to your party's symbol on the card",
                QuestionKind::SingleChoice(ChoiceQuestion::new()),
            )
            .with_number("7")
            .with_options(parties())
            .with_modes(true, false),
        ],
    );

    let bye_election = Section::new(
        "Bye-election",
        vec![
            Question::new(
                "bye_vote",
                "Will you vote in the bye-election?",
                QuestionKind::SingleChoice(ChoiceQuestion::new()),
            )
            .with_number("16")
            .with_options(yes_no()),
        ],
    );

    SurveyDefinition::new(TRACKER_ID, "Assembly Election Tracker")
        .with_mode(SurveyMode::MultiMode)
        .with_section(call)
        .with_section(voting)
        .with_section(bye_election)
}
