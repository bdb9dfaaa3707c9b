//! A face-to-face household survey, shipped as JSON the way the backend
//! serves it.
//!
//! Display conditions:
//! - occupation (Q2) only for male respondents;
//! - water source (Q5) only when tap water is not among the amenities;
//! - pension (Q6) for respondents over 59 or female respondents.
//!
//! Q7 is disabled for telephone interviews.

use interview_flow_types::{DefinitionError, SurveyDefinition};

pub const HOUSEHOLD_JSON: &str = include_str!("../data/household.json");

pub fn household() -> Result<SurveyDefinition, DefinitionError> {
    SurveyDefinition::from_json(HOUSEHOLD_JSON)
}
