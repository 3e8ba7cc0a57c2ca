// ABOUTME: One-shot apply state for the settings controller.
// ABOUTME: Pending until the stored snapshot has been applied to the controls, then Applied for good.

use std::fmt;

/// Whether the stored snapshot has been pushed into the controls yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyState {
    #[default]
    Pending,
    Applied,
}

impl fmt::Display for ApplyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyState::Pending => write!(f, "Pending"),
            ApplyState::Applied => write!(f, "Applied"),
        }
    }
}

impl ApplyState {
    /// Control changes are only persisted once applied.
    pub fn writes_enabled(self) -> bool {
        self == ApplyState::Applied
    }

    /// Returns the next state after a snapshot application, or None if one
    /// already happened.
    pub fn finish_apply(self) -> Option<ApplyState> {
        match self {
            ApplyState::Pending => Some(ApplyState::Applied),
            ApplyState::Applied => None,
        }
    }
}
