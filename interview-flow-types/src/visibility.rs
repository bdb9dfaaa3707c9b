/// Outcome of evaluating a question's display conditions.
///
/// Three-valued: a condition whose referenced question has not been
/// answered yet is `Pending` rather than simply false. Callers that only
/// need a yes/no decision treat `Pending` as hidden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Conditions are satisfied.
    #[default]
    Visible,

    /// Conditions were evaluated against answers and failed.
    Hidden,

    /// The outcome depends on a question that has no answer yet.
    Pending,
}

impl Visibility {
    /// Check if the question should be shown.
    pub fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }

    /// Check if the conditions definitively failed.
    pub fn is_hidden(self) -> bool {
        matches!(self, Self::Hidden)
    }

    /// Check if the outcome is still waiting on an answer.
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Kleene conjunction: `Hidden` dominates, then `Pending`.
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::Hidden, _) | (_, Self::Hidden) => Self::Hidden,
            (Self::Pending, _) | (_, Self::Pending) => Self::Pending,
            (Self::Visible, Self::Visible) => Self::Visible,
        }
    }

    /// Kleene disjunction: `Visible` dominates, then `Pending`.
    pub fn or(self, other: Self) -> Self {
        match (self, other) {
            (Self::Visible, _) | (_, Self::Visible) => Self::Visible,
            (Self::Pending, _) | (_, Self::Pending) => Self::Pending,
            (Self::Hidden, Self::Hidden) => Self::Hidden,
        }
    }
}

impl From<bool> for Visibility {
    fn from(met: bool) -> Self {
        if met { Self::Visible } else { Self::Hidden }
    }
}
