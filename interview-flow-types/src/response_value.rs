use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// A single response value collected during an interview.
///
/// This is the value stored in `Responses` for each answered question.
/// On the wire it is a plain JSON string, number or array of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    /// A numeric value (from numeric and rating questions).
    Number(f64),

    /// A text value (free text, or the stored value of a single-choice option).
    Text(String),

    /// The stored values of every selected option of a multiple-choice question.
    Choices(Vec<String>),
}

impl ResponseValue {
    /// Try to get this value as a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get this value as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get this value as a list of selected option values.
    pub fn as_choices(&self) -> Option<&[String]> {
        match self {
            Self::Choices(values) => Some(values),
            _ => None,
        }
    }

    /// The individual elements of this value, rendered as text.
    ///
    /// Scalars yield one element, multi-select responses one per selection.
    pub fn elements(&self) -> Vec<Cow<'_, str>> {
        match self {
            Self::Text(s) => vec![Cow::Borrowed(s.as_str())],
            Self::Number(n) => vec![Cow::Owned(n.to_string())],
            Self::Choices(values) => values.iter().map(|v| Cow::Borrowed(v.as_str())).collect(),
        }
    }

    /// Whether this value counts as "no answer": blank text or no selections.
    ///
    /// Numbers are never blank.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) => false,
            Self::Choices(values) => values.iter().all(|v| v.trim().is_empty()),
        }
    }

    /// Get the type name of this value for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "Text",
            Self::Number(_) => "Number",
            Self::Choices(_) => "Choices",
        }
    }
}

impl From<String> for ResponseValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ResponseValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for ResponseValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for ResponseValue {
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for ResponseValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<Vec<String>> for ResponseValue {
    fn from(values: Vec<String>) -> Self {
        Self::Choices(values)
    }
}

impl From<Vec<&str>> for ResponseValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Choices(values.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_shapes() {
        let text: ResponseValue = serde_json::from_str("\"yes\"").unwrap();
        assert_eq!(text, ResponseValue::Text("yes".into()));

        let number: ResponseValue = serde_json::from_str("42").unwrap();
        assert_eq!(number, ResponseValue::Number(42.0));

        let choices: ResponseValue = serde_json::from_str("[\"a\", \"b\"]").unwrap();
        assert_eq!(choices, ResponseValue::from(vec!["a", "b"]));
    }

    #[test]
    fn number_elements_render_without_trailing_zero() {
        assert_eq!(ResponseValue::from(5).elements(), vec!["5"]);
        assert_eq!(ResponseValue::from(2.5).elements(), vec!["2.5"]);
    }

    #[test]
    fn blank_values() {
        assert!(ResponseValue::from("   ").is_blank());
        assert!(ResponseValue::Choices(Vec::new()).is_blank());
        assert!(!ResponseValue::from(0).is_blank());
        assert!(!ResponseValue::from(vec!["x"]).is_blank());
    }
}
