use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::approval::ApprovalStatus;
use crate::selection::DialogMode;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub String);

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Business,
    Distributor,
    Location,
    Approval,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Business => "business",
            Self::Distributor => "distributor",
            Self::Location => "location",
            Self::Approval => "approval",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status change requested through `EntityRepository::set_status`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntityStatus {
    Suspended,
    Approved,
    Rejected { reason: Option<String> },
}

/// A record managed from one of the console screens.
///
/// Implementors describe which dialog modes their screen offers and how edits and status
/// changes land on the record; repositories use `apply_patch` and `apply_status` so the
/// engine never touches entity fields directly.
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    /// All-optional edit fields; `Default` is the empty edit.
    type Patch: Clone + fmt::Debug + Default + Send + Sync;

    const KIND: EntityKind;
    const SUPPORTED_MODES: &'static [DialogMode];

    fn id(&self) -> &EntityId;

    /// Human-readable name used in notifications.
    fn label(&self) -> String;

    fn apply_patch(&mut self, patch: &Self::Patch);

    /// Returns `false` when this kind has no notion of the requested status.
    fn apply_status(&mut self, status: &EntityStatus) -> bool;

    fn approval_status(&self) -> Option<ApprovalStatus> {
        None
    }

    fn supports(mode: DialogMode) -> bool {
        Self::SUPPORTED_MODES.contains(&mode)
    }
}
