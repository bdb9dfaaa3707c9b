//! # interview-flow
//!
//! Question visibility and sequencing for CAPI/CATI interviews.
//! Presentation-agnostic: a UI asks the session which question to show,
//! records answers, and submits the final record.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use interview_flow::{InMemoryStore, InterviewMode, InterviewSession, SessionOptions, SurveyDefinition};
//!
//! let survey = Arc::new(SurveyDefinition::from_json(&json)?);
//! let store = InMemoryStore::new();
//! let mut session = InterviewSession::start(
//!     survey,
//!     SessionOptions::new("sess-42", InterviewMode::Cati).with_constituency("Kolkata Port"),
//!     config.rules_for("ac-tracker-2025").cloned(),
//!     &store,
//! )
//! .await?;
//!
//! session.answer("q_gender", "male")?;
//! session.advance()?;
//! let record = session.complete()?;
//! interview_flow::submit(&record, &store).await?;
//! ```
//!
//! ## Pipeline
//!
//! For every query the session runs, in order:
//! - mode filter (`enabledForCAPI` / `enabledForCATI`)
//! - set filter (CATI split-sample sets, see [`sets`])
//! - survey rules (bye-election gating, see [`rules`])
//! - display conditions (see [`condition`])
//! - the survey's reorder table (see [`rules`])

// Re-export all types from interview-flow-types
pub use interview_flow_types::*;

pub mod condition;
pub mod config;
pub mod location;
pub mod recording;
pub mod rules;
pub mod sequence;
pub mod session;
pub mod sets;

mod error;
pub use error::{ConfigError, RecordingError, SessionError, ValidationError};

pub use config::{EngineConfig, LocationConfig};
pub use location::{LocationChain, LocationError, LocationState, LocationStrategy};
pub use recording::{AudioDevice, RecordingGuard};
pub use rules::{
    AcMaster, AcMasterEntry, ByeElectionRule, ReorderEntry, SurveyRules, parse_ac_master,
};
pub use sequence::{SequenceContext, presentation_order, visible_questions};
pub use session::{InterviewSession, SessionOptions, submit};

// In-memory collaborators for tests and offline runs
mod memory;
pub use memory::InMemoryStore;
