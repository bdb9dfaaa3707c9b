use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::QuestionId;

/// A display rule for a question, based on the answer to another question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// The question whose answer is inspected.
    pub question_id: QuestionId,

    /// How the answer is compared against `value`.
    pub operator: ConditionOperator,

    /// The comparison value. Ignored by `is_empty` / `is_not_empty`.
    ///
    /// Definitions may carry numbers or booleans here; they are kept in
    /// their JSON text form.
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub value: String,

    /// How this condition joins the result of the conditions before it.
    #[serde(default)]
    pub logic: LogicConnector,
}

impl Condition {
    /// Create a condition joined with `AND`.
    pub fn new(
        question_id: impl Into<QuestionId>,
        operator: ConditionOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            question_id: question_id.into(),
            operator,
            value: value.into(),
            logic: LogicConnector::And,
        }
    }

    /// Shorthand for an `equals` condition.
    pub fn equals(question_id: impl Into<QuestionId>, value: impl Into<String>) -> Self {
        Self::new(question_id, ConditionOperator::Equals, value)
    }

    /// Join this condition with `OR` instead of `AND`.
    pub fn or(mut self) -> Self {
        self.logic = LogicConnector::Or;
        self
    }
}

/// Comparison performed by a `Condition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
    IsSelected,
    IsNotSelected,
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::IsEmpty => "is_empty",
            Self::IsNotEmpty => "is_not_empty",
            Self::IsSelected => "is_selected",
            Self::IsNotSelected => "is_not_selected",
        };
        f.write_str(name)
    }
}

/// Connector between a condition and the running result of the ones before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicConnector {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,

    #[serde(rename = "OR", alias = "or")]
    Or,
}

fn scalar_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Text(text)) => text,
        Some(Scalar::Integer(n)) => n.to_string(),
        Some(Scalar::Float(n)) => n.to_string(),
        Some(Scalar::Bool(b)) => b.to_string(),
        None => String::new(),
    })
}
