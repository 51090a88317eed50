use serde::{Deserialize, Serialize};

/// Dialog shown for the selected entity. "No dialog" is the absence of a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogMode {
    View,
    Edit,
    Suspend,
    Approve,
    Reject,
    Delete,
}

impl DialogMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Suspend => "suspend",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Delete => "delete",
        }
    }

    pub fn mutates(&self) -> bool {
        !matches!(self, Self::View)
    }

    /// Past tense used in commit notifications.
    pub fn past_tense(&self) -> &'static str {
        match self {
            Self::View => "viewed",
            Self::Edit => "updated",
            Self::Suspend => "suspended",
            Self::Approve => "approved",
            Self::Reject => "rejected",
            Self::Delete => "deleted",
        }
    }
}
