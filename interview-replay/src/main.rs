//! interview-replay - run recorded answers through the sequencing engine
//!
//! Loads a survey definition and a set of answers, then prints the
//! question sequence an interviewer would see. Useful for checking display
//! conditions, set rotation and reorder tables without a device.
//!
//! ```text
//! interview-replay --builtin tracker --mode cati --last-set 1 \
//!     --constituency "Basirhat Dakshin" --responses answers.json
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use interview_flow::{
    ByeElectionRule, EngineConfig, InMemoryStore, InterviewMode, InterviewSession, Responses,
    SessionOptions, SurveyDefinition, SurveyRules, parse_ac_master,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Capi,
    Cati,
}

impl From<Mode> for InterviewMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Capi => InterviewMode::Capi,
            Mode::Cati => InterviewMode::Cati,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Builtin {
    Household,
    Tracker,
}

/// Command-line arguments for interview-replay
#[derive(Parser, Debug)]
#[command(name = "interview-replay")]
#[command(about = "Print the visible question sequence for a set of answers")]
#[command(version)]
struct Args {
    /// Survey definition JSON
    #[arg(required_unless_present = "builtin")]
    survey: Option<PathBuf>,

    /// Use a bundled survey instead of a file
    #[arg(long, value_enum, conflicts_with = "survey")]
    builtin: Option<Builtin>,

    /// Answers as a JSON object keyed by question id
    #[arg(short, long)]
    responses: Option<PathBuf>,

    /// Engine config (TOML); falls back to $INTERVIEW_FLOW_CONFIG
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value = "capi")]
    mode: Mode,

    /// Set number used by the previous CATI interview
    #[arg(long)]
    last_set: Option<u32>,

    #[arg(long, env = "INTERVIEW_CONSTITUENCY")]
    constituency: Option<String>,

    /// AC master JSON; its bye-election flags replace the configured list
    #[arg(long)]
    ac_master: Option<PathBuf>,

    /// Question gated by the AC master bye-election flags
    #[arg(long, default_value = "16", requires = "ac_master")]
    bye_election_question: String,

    /// 0 for the primary language, n for the n-th inline translation
    #[arg(short, long, default_value = "0")]
    language: usize,

    /// Validate and print the submission record as JSON
    #[arg(long)]
    complete: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "interview_flow=info,interview_replay=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let survey = load_survey(&args)?;
    let config = EngineConfig::resolve(args.config.as_deref()).context("Failed to load config")?;
    let mut rules = config.rules_for(&survey.id).cloned();
    if let Some(path) = &args.ac_master {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let master = parse_ac_master(&json)
            .with_context(|| format!("Invalid AC master data in {}", path.display()))?;
        let rule = ByeElectionRule::from_ac_master(args.bye_election_question.clone(), &master);
        info!(constituencies = rule.constituencies.len(), "bye-election list from AC master");
        rules = Some(
            rules
                .unwrap_or_else(|| SurveyRules::new(survey.id.clone()))
                .with_bye_election(rule),
        );
    }
    if rules.is_none() {
        info!(survey = %survey.id, "no survey rules configured");
    }

    let store = match args.last_set {
        Some(set) => InMemoryStore::new().with_last_set(survey.id.clone(), set),
        None => InMemoryStore::new(),
    };

    let mut options = SessionOptions::new("replay", args.mode.into()).with_language(args.language);
    if let Some(constituency) = &args.constituency {
        options = options.with_constituency(constituency.clone());
    }

    let mut session = InterviewSession::start(Arc::new(survey), options, rules, &store)
        .await
        .context("Failed to start interview")?;

    if let Some(path) = &args.responses {
        for (id, value) in load_responses(path)? {
            if let Err(err) = session.answer(id.clone(), value) {
                warn!(question = %id, "skipping answer: {err}");
            }
        }
    }

    print_sequence(&session);

    if args.complete {
        let record = session.complete().context("Interview is incomplete")?;
        println!("{}", record.to_json()?);
    }
    Ok(())
}

fn load_survey(args: &Args) -> Result<SurveyDefinition> {
    if let Some(builtin) = args.builtin {
        return match builtin {
            Builtin::Household => {
                example_surveys::household().context("Bundled household survey is invalid")
            }
            Builtin::Tracker => Ok(example_surveys::election_tracker()),
        };
    }
    let Some(path) = &args.survey else {
        bail!("no survey given");
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    SurveyDefinition::from_json(&json)
        .with_context(|| format!("Invalid survey definition in {}", path.display()))
}

fn load_responses(path: &Path) -> Result<Responses> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid responses in {}", path.display()))
}

fn print_sequence(session: &InterviewSession) {
    match session.set_number() {
        Some(set) => println!("{} ({}, set {set})", session.survey().name, session.mode()),
        None => println!("{} ({})", session.survey().name, session.mode()),
    }

    let current = session.current().map(|question| question.id().clone());
    for located in session.visible_questions() {
        let question = located.question;
        let marker = if current.as_ref() == Some(question.id()) { ">" } else { " " };
        let number = question.question_number().unwrap_or("-");
        let answer = session
            .responses()
            .get(question.id())
            .map(|value| value.elements().join(", "))
            .unwrap_or_default();
        println!(
            "{marker} {number:>4}  {:<20} {}  [{answer}]",
            question.id().as_str(),
            session.display_text(question)
        );
    }
}
