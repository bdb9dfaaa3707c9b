use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{InterviewMode, QuestionId, QuestionOption, ResponseValue, Responses};

/// The polling station selected for an interview.
///
/// Stations sit under an assembly constituency and a station group; each
/// carries the interview round it was assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollingStation {
    pub code: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ac_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
}

impl PollingStation {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ac_number: None,
            group: None,
            round: None,
        }
    }

    /// Place the station under an assembly constituency and station group.
    pub fn in_group(mut self, ac_number: impl Into<String>, group: impl Into<String>) -> Self {
        self.ac_number = Some(ac_number.into());
        self.group = Some(group.into());
        self
    }

    pub fn with_round(mut self, round: u32) -> Self {
        self.round = Some(round);
        self
    }
}

/// Where a location fix came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    Network,
    Gps,
    MapsService,
    Manual,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Gps => "gps",
            Self::MapsService => "maps_service",
            Self::Manual => "manual",
        };
        f.write_str(name)
    }
}

/// A geographic position attached to an interview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,

    /// Accuracy radius in metres, when the source reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,

    pub source: LocationSource,
}

/// Terminal state of an interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    Completed,
    Abandoned,
}

/// One answered (or skipped) question in a submission, with a snapshot of
/// the question as it was shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEntry {
    pub section_index: usize,
    pub question_index: usize,
    pub question_id: QuestionId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_number: Option<String>,

    /// Primary-language question text at submission time.
    pub question_text: String,

    /// Options at submission time.
    #[serde(default)]
    pub options: Vec<QuestionOption>,

    #[serde(default)]
    pub response: Option<ResponseValue>,

    /// Time from the previous answer (or session start) to this answer.
    #[serde(default)]
    pub response_time_ms: u64,

    pub is_required: bool,
    pub is_skipped: bool,
}

/// The final, ordered record of an interview sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub session_id: String,
    pub survey_id: String,
    pub mode: InterviewMode,
    pub status: InterviewStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abandon_reason: Option<String>,

    /// The alternate set used for this session, kept for audit.
    #[serde(default)]
    pub set_number: Option<u32>,

    #[serde(default)]
    pub constituency: Option<String>,

    #[serde(default)]
    pub polling_station: Option<PollingStation>,

    #[serde(default)]
    pub location: Option<LocationFix>,

    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,

    pub responses: Vec<ResponseEntry>,
}

impl SubmissionRecord {
    /// Rebuild the response set from the non-skipped entries.
    pub fn restore_responses(&self) -> Responses {
        self.responses
            .iter()
            .filter(|entry| !entry.is_skipped)
            .filter_map(|entry| {
                entry
                    .response
                    .clone()
                    .map(|value| (entry.question_id.clone(), value))
            })
            .collect()
    }

    /// Number of questions answered in this record.
    pub fn answered(&self) -> usize {
        self.responses.iter().filter(|e| !e.is_skipped).count()
    }

    /// Serialize to the JSON wire format.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from the JSON wire format.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
