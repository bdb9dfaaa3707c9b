//! Alternate question sets for CATI split-sample designs.
//!
//! Questions tagged with a set number belong to one of several variants of
//! the questionnaire. Each CATI session gets exactly one set, assigned in
//! round-robin order across sessions of the same survey. CAPI sessions do
//! not use sets and see every tagged question.

use tracing::{debug, warn};

use crate::{InterviewMode, Question, SetNumberSource, SurveyDefinition};

/// Resolve the set number for a new session.
///
/// Returns `None` for CAPI sessions and for surveys without sets. A failed
/// lookup falls back to the lowest set instead of failing the session.
pub async fn resolve_set_number(
    mode: InterviewMode,
    definition: &SurveyDefinition,
    source: &dyn SetNumberSource,
) -> Option<u32> {
    if mode == InterviewMode::Capi {
        return None;
    }

    let available = definition.set_numbers();
    if available.is_empty() {
        return None;
    }

    let last = match source.last_set_number(&definition.id).await {
        Ok(last) => last,
        Err(err) => {
            warn!(survey = %definition.id, error = %err, "set number lookup failed, using lowest set");
            None
        }
    };

    let next = next_set(&available, last);
    debug!(survey = %definition.id, ?last, ?next, "resolved question set");
    next
}

/// Pick the set after `last` from the ascending list `available`, wrapping
/// around to the lowest.
///
/// A `last` that is not itself in the list still advances to the next
/// larger set, so removing a set from a survey does not reset the rotation.
pub fn next_set(available: &[u32], last: Option<u32>) -> Option<u32> {
    let lowest = available.first().copied()?;
    let Some(last) = last else {
        return Some(lowest);
    };
    Some(
        available
            .iter()
            .copied()
            .find(|&set| set > last)
            .unwrap_or(lowest),
    )
}

/// Check if `question` belongs in a session with the given mode and set.
///
/// Untagged questions are always permitted.
pub fn permits(question: &Question, mode: InterviewMode, set_number: Option<u32>) -> bool {
    match (mode, question.set_membership(), set_number) {
        (InterviewMode::Capi, _, _) => true,
        (InterviewMode::Cati, None, _) => true,
        (InterviewMode::Cati, Some(_), None) => true,
        (InterviewMode::Cati, Some(tagged), Some(session)) => tagged == session,
    }
}
