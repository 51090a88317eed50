use tracing::info;

use crate::commit::{EntityRepository, RepositoryError};
use crate::domain::approval::{ApprovalItem, ApprovalStatus};
use crate::domain::entity::{Entity, EntityId, EntityStatus};
use crate::errors::EngineError;
use crate::notify::{Notification, NotificationSink};
use crate::selection::DialogMode;

/// Moves a pending entity to `approved` or `rejected`.
///
/// The current status is read first; anything but `pending` fails with `InvalidTransition` and
/// the repository is not written.
pub(crate) async fn transition<E, R>(
    repository: &R,
    id: &EntityId,
    status: EntityStatus,
) -> Result<E, EngineError>
where
    E: Entity,
    R: EntityRepository<E> + ?Sized,
{
    let (target, mode) = match &status {
        EntityStatus::Approved => (ApprovalStatus::Approved, DialogMode::Approve),
        EntityStatus::Rejected { .. } => (ApprovalStatus::Rejected, DialogMode::Reject),
        EntityStatus::Suspended => {
            return Err(EngineError::UnsupportedMode { kind: E::KIND, mode: DialogMode::Suspend })
        }
    };

    let mut entity = repository
        .get(id)
        .await?
        .ok_or_else(|| RepositoryError::NotFound { kind: E::KIND, id: id.clone() })?;
    let Some(current) = entity.approval_status() else {
        return Err(EngineError::UnsupportedMode { kind: E::KIND, mode });
    };
    if !current.can_transition_to(target) {
        return Err(EngineError::InvalidTransition { id: id.clone(), from: current, to: target });
    }

    repository.set_status(id, status.clone()).await?;
    entity.apply_status(&status);

    info!(
        event_name = "approval.transitioned",
        entity_id = %id,
        from = ?current,
        to = ?target,
        "approval status changed"
    );
    Ok(entity)
}

/// Review actions on submitted businesses, distributors and deals.
pub struct ApprovalLifecycle<'a, R: ?Sized, N: ?Sized> {
    repository: &'a R,
    notifier: &'a N,
}

impl<'a, R, N> ApprovalLifecycle<'a, R, N>
where
    R: EntityRepository<ApprovalItem> + ?Sized,
    N: NotificationSink + ?Sized,
{
    pub fn new(repository: &'a R, notifier: &'a N) -> Self {
        Self { repository, notifier }
    }

    pub async fn approve(&self, id: &EntityId) -> Result<ApprovalItem, EngineError> {
        let item = transition(self.repository, id, EntityStatus::Approved).await?;
        self.notifier.notify(
            Notification::success("approval.approved", format!("Approved {}", item.label()))
                .with_metadata("entity_id", id.0.clone()),
        );
        Ok(item)
    }

    /// Rejects a pending item. A blank reason is stored as no reason.
    pub async fn reject(
        &self,
        id: &EntityId,
        reason: Option<String>,
    ) -> Result<ApprovalItem, EngineError> {
        let reason = reason.filter(|reason| !reason.trim().is_empty());
        let item = transition(self.repository, id, EntityStatus::Rejected { reason }).await?;
        let mut notification =
            Notification::success("approval.rejected", format!("Rejected {}", item.label()))
                .with_metadata("entity_id", id.0.clone());
        if let Some(reason) = &item.rejection_reason {
            notification = notification.with_metadata("reason", reason.clone());
        }
        self.notifier.notify(notification);
        Ok(item)
    }
}
