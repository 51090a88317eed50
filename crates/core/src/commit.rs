use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entity::{Entity, EntityId, EntityKind, EntityStatus};
use crate::wizard::{BranchValue, FieldValue, StepId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{kind} `{id}` was not found")]
    NotFound { kind: EntityKind, id: EntityId },
    #[error("{kind} `{id}` does not accept status {status:?}")]
    Unsupported { kind: EntityKind, id: EntityId, status: EntityStatus },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Store of one entity kind. Calls complete (or fail) before the caller transitions any
/// dialog state.
#[async_trait]
pub trait EntityRepository<E: Entity>: Send + Sync {
    async fn get(&self, id: &EntityId) -> Result<Option<E>, RepositoryError>;
    async fn update(&self, id: &EntityId, patch: E::Patch) -> Result<E, RepositoryError>;
    async fn remove(&self, id: &EntityId) -> Result<(), RepositoryError>;
    async fn set_status(&self, id: &EntityId, status: EntityStatus) -> Result<(), RepositoryError>;
}

/// Everything a finished wizard hands over.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WizardSubmission {
    pub wizard: String,
    pub fields: BTreeMap<String, FieldValue>,
    pub branch_flags: BTreeMap<String, BranchValue>,
    pub visited_steps: Vec<StepId>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub reference: String,
}

#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn submit(
        &self,
        submission: WizardSubmission,
    ) -> Result<SubmissionReceipt, RepositoryError>;
}

/// What happens to an open dialog or wizard when its commit fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitPolicy {
    /// `false` keeps the selection or session so the user can retry.
    pub close_on_failure: bool,
}
