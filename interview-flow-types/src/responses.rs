use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{QuestionId, ResponseValue};

/// Error type for response access operations.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("Missing response for question: {0}")]
    Missing(QuestionId),

    #[error("Type mismatch for question '{id}': expected {expected}, got {actual}")]
    TypeMismatch {
        id: QuestionId,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Responses collected so far in an interview, keyed by question id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Responses {
    values: HashMap<QuestionId, ResponseValue>,
}

impl Responses {
    /// Create a new empty responses collection.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Insert a response value for the given question, returning the previous one.
    pub fn insert(
        &mut self,
        id: impl Into<QuestionId>,
        value: impl Into<ResponseValue>,
    ) -> Option<ResponseValue> {
        self.values.insert(id.into(), value.into())
    }

    /// Get the response for the given question.
    pub fn get(&self, id: &QuestionId) -> Option<&ResponseValue> {
        self.values.get(id)
    }

    /// Check if a response exists for the given question.
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.values.contains_key(id)
    }

    /// Remove the response for the given question.
    pub fn remove(&mut self, id: &QuestionId) -> Option<ResponseValue> {
        self.values.remove(id)
    }

    /// Get an iterator over all id-value pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &ResponseValue)> {
        self.values.iter()
    }

    /// Get the number of responses.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no responses.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // === Convenience accessors ===

    /// Get a numeric response. Text that parses as a number is accepted.
    pub fn get_number(&self, id: &QuestionId) -> Result<f64, ResponseError> {
        match self.get(id) {
            Some(ResponseValue::Number(n)) => Ok(*n),
            Some(ResponseValue::Text(text)) => {
                text.trim()
                    .parse()
                    .map_err(|_| ResponseError::TypeMismatch {
                        id: id.clone(),
                        expected: "Number",
                        actual: "Text",
                    })
            }
            Some(other) => Err(ResponseError::TypeMismatch {
                id: id.clone(),
                expected: "Number",
                actual: other.type_name(),
            }),
            None => Err(ResponseError::Missing(id.clone())),
        }
    }

    /// Get the selected option values of a multiple-choice response.
    pub fn get_choices(&self, id: &QuestionId) -> Result<&[String], ResponseError> {
        match self.get(id) {
            Some(ResponseValue::Choices(values)) => Ok(values),
            Some(other) => Err(ResponseError::TypeMismatch {
                id: id.clone(),
                expected: "Choices",
                actual: other.type_name(),
            }),
            None => Err(ResponseError::Missing(id.clone())),
        }
    }

    /// Check if the given question has a non-blank answer.
    ///
    /// Returns `false` if the response is missing, blank text or an empty selection.
    pub fn has_value(&self, id: &QuestionId) -> bool {
        self.get(id).is_some_and(|value| !value.is_blank())
    }
}

impl IntoIterator for Responses {
    type Item = (QuestionId, ResponseValue);
    type IntoIter = std::collections::hash_map::IntoIter<QuestionId, ResponseValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Responses {
    type Item = (&'a QuestionId, &'a ResponseValue);
    type IntoIter = std::collections::hash_map::Iter<'a, QuestionId, ResponseValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl FromIterator<(QuestionId, ResponseValue)> for Responses {
    fn from_iter<T: IntoIterator<Item = (QuestionId, ResponseValue)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
