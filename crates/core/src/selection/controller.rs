use tracing::{debug, info, warn};

use crate::commit::{CommitPolicy, EntityRepository, RepositoryError};
use crate::domain::entity::{Entity, EntityId, EntityStatus};
use crate::errors::EngineError;
use crate::notify::{Notification, NotificationSink};
use crate::selection::approval::transition;
use crate::selection::DialogMode;

/// The one open dialog: which entity, which mode, and what the user has staged in it.
#[derive(Clone, Debug)]
pub struct Selection<E: Entity> {
    pub entity_id: EntityId,
    pub mode: DialogMode,
    pub patch: E::Patch,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitOutcome<E> {
    Viewed,
    Updated(E),
    Suspended(E),
    Deleted(E),
    Approved(E),
    Rejected(E),
}

/// Holds at most one `(entity, mode)` pair for one entity kind.
///
/// "No mode" and "no entity" are the same state: the selection is either fully present or
/// absent. Opening replaces whatever was open before.
#[derive(Clone, Debug)]
pub struct SelectionController<E: Entity> {
    selection: Option<Selection<E>>,
    policy: CommitPolicy,
}

impl<E: Entity> Default for SelectionController<E> {
    fn default() -> Self {
        Self { selection: None, policy: CommitPolicy::default() }
    }
}

impl<E: Entity> SelectionController<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: CommitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn selection(&self) -> Option<&Selection<E>> {
        self.selection.as_ref()
    }

    pub fn selected_id(&self) -> Option<&EntityId> {
        self.selection.as_ref().map(|selection| &selection.entity_id)
    }

    pub fn mode(&self) -> Option<DialogMode> {
        self.selection.as_ref().map(|selection| selection.mode)
    }

    pub fn is_open(&self) -> bool {
        self.selection.is_some()
    }

    /// Selects `entity_id` in `mode`, discarding any previous selection and its staged edits.
    ///
    /// Fails only when this entity kind has no such dialog; the previous selection is then kept.
    pub fn open(
        &mut self,
        entity_id: impl Into<EntityId>,
        mode: DialogMode,
    ) -> Result<(), EngineError> {
        if !E::supports(mode) {
            return Err(EngineError::UnsupportedMode { kind: E::KIND, mode });
        }

        let entity_id = entity_id.into();
        debug!(
            event_name = "selection.opened",
            kind = %E::KIND,
            entity_id = %entity_id,
            mode = mode.as_str(),
            replaced = self.selection.is_some(),
            "dialog opened"
        );
        self.selection =
            Some(Selection { entity_id, mode, patch: E::Patch::default(), reason: None });
        Ok(())
    }

    pub fn close(&mut self) -> Option<Selection<E>> {
        self.selection.take()
    }

    /// Replaces the edits staged for an `edit` dialog.
    pub fn stage_patch(&mut self, patch: E::Patch) -> Result<(), EngineError> {
        let selection = self.selection.as_mut().ok_or(EngineError::NoSelection)?;
        if selection.mode != DialogMode::Edit {
            return Err(EngineError::UnsupportedMode { kind: E::KIND, mode: selection.mode });
        }
        selection.patch = patch;
        Ok(())
    }

    /// Sets the reason attached by a `reject` dialog.
    pub fn stage_reason(&mut self, reason: impl Into<String>) -> Result<(), EngineError> {
        let selection = self.selection.as_mut().ok_or(EngineError::NoSelection)?;
        if selection.mode != DialogMode::Reject {
            return Err(EngineError::UnsupportedMode { kind: E::KIND, mode: selection.mode });
        }
        let reason = reason.into();
        selection.reason = (!reason.trim().is_empty()).then_some(reason);
        Ok(())
    }

    /// Fetches the selected entity for display.
    pub async fn load<R>(&self, repository: &R) -> Result<E, EngineError>
    where
        R: EntityRepository<E> + ?Sized,
    {
        let id = self.selected_id().ok_or(EngineError::NoSelection)?;
        fetch(repository, id).await
    }

    /// Applies the open dialog to `repository` and closes it.
    ///
    /// `view` closes without touching the repository. Every other mode writes first and only
    /// closes on success; a repository failure is reported to `notifier` and leaves the dialog
    /// open for a retry unless the policy closes on failure.
    pub async fn commit<R, N>(
        &mut self,
        repository: &R,
        notifier: &N,
    ) -> Result<CommitOutcome<E>, EngineError>
    where
        R: EntityRepository<E> + ?Sized,
        N: NotificationSink + ?Sized,
    {
        let selection = self.selection.as_ref().ok_or(EngineError::NoSelection)?;
        let id = selection.entity_id.clone();
        let mode = selection.mode;

        if !mode.mutates() {
            self.selection = None;
            debug!(event_name = "selection.closed", kind = %E::KIND, entity_id = %id, "view closed");
            return Ok(CommitOutcome::Viewed);
        }

        let patch = selection.patch.clone();
        let reason = selection.reason.clone();
        let result = apply(repository, &id, mode, patch, reason).await;

        match result {
            Ok(outcome) => {
                let label = outcome_label(&outcome).unwrap_or_else(|| id.0.clone());
                info!(
                    event_name = "selection.committed",
                    kind = %E::KIND,
                    entity_id = %id,
                    mode = mode.as_str(),
                    "dialog committed"
                );
                notifier.notify(
                    Notification::success(
                        "selection.committed",
                        format!("{label} {}", mode.past_tense()),
                    )
                    .with_metadata("kind", E::KIND.as_str())
                    .with_metadata("entity_id", id.0.clone())
                    .with_metadata("mode", mode.as_str()),
                );
                self.selection = None;
                Ok(outcome)
            }
            Err(error) => {
                warn!(
                    event_name = "selection.commit_failed",
                    kind = %E::KIND,
                    entity_id = %id,
                    mode = mode.as_str(),
                    error = %error,
                    "dialog commit failed"
                );
                if error.is_external() {
                    notifier.notify(
                        Notification::error(
                            "selection.commit_failed",
                            format!("Could not {} {}: {error}", mode.as_str(), id),
                        )
                        .with_metadata("kind", E::KIND.as_str())
                        .with_metadata("entity_id", id.0.clone())
                        .with_metadata("mode", mode.as_str()),
                    );
                    if self.policy.close_on_failure {
                        self.selection = None;
                    }
                }
                Err(error)
            }
        }
    }
}

async fn fetch<E, R>(repository: &R, id: &EntityId) -> Result<E, EngineError>
where
    E: Entity,
    R: EntityRepository<E> + ?Sized,
{
    repository
        .get(id)
        .await?
        .ok_or_else(|| RepositoryError::NotFound { kind: E::KIND, id: id.clone() }.into())
}

async fn apply<E, R>(
    repository: &R,
    id: &EntityId,
    mode: DialogMode,
    patch: E::Patch,
    reason: Option<String>,
) -> Result<CommitOutcome<E>, EngineError>
where
    E: Entity,
    R: EntityRepository<E> + ?Sized,
{
    match mode {
        DialogMode::View => Ok(CommitOutcome::Viewed),
        DialogMode::Edit => Ok(CommitOutcome::Updated(repository.update(id, patch).await?)),
        DialogMode::Suspend => {
            let mut entity = fetch(repository, id).await?;
            repository.set_status(id, EntityStatus::Suspended).await?;
            entity.apply_status(&EntityStatus::Suspended);
            Ok(CommitOutcome::Suspended(entity))
        }
        DialogMode::Delete => {
            let entity = fetch(repository, id).await?;
            repository.remove(id).await?;
            Ok(CommitOutcome::Deleted(entity))
        }
        DialogMode::Approve => {
            Ok(CommitOutcome::Approved(transition(repository, id, EntityStatus::Approved).await?))
        }
        DialogMode::Reject => Ok(CommitOutcome::Rejected(
            transition(repository, id, EntityStatus::Rejected { reason }).await?,
        )),
    }
}

fn outcome_label<E: Entity>(outcome: &CommitOutcome<E>) -> Option<String> {
    match outcome {
        CommitOutcome::Viewed => None,
        CommitOutcome::Updated(entity)
        | CommitOutcome::Suspended(entity)
        | CommitOutcome::Deleted(entity)
        | CommitOutcome::Approved(entity)
        | CommitOutcome::Rejected(entity) => Some(entity.label()),
    }
}

#[cfg(test)]
mod tests {
    use crate::commit::CommitPolicy;
    use crate::domain::approval::{ApprovalItem, ApprovalPayload, ApprovalStatus};
    use crate::domain::directory::{AccountStatus, Business, BusinessPatch, ListingPlan};
    use crate::domain::entity::{EntityId, EntityKind};
    use crate::errors::EngineError;
    use crate::notify::{InMemoryNotificationSink, NotificationKind};
    use crate::selection::testing::MemoryRepository;
    use crate::selection::DialogMode;

    use super::{CommitOutcome, SelectionController};

    fn business(id: &str, name: &str) -> Business {
        Business {
            id: EntityId::from(id),
            name: name.to_owned(),
            category: "Bakery".to_owned(),
            owner: "Priya Natarajan".to_owned(),
            city: "Austin".to_owned(),
            plan: ListingPlan::Free,
            status: AccountStatus::Active,
        }
    }

    fn businesses() -> MemoryRepository<Business> {
        MemoryRepository::with(vec![
            business("biz-1", "Blue Door Bakery"),
            business("biz-2", "Lone Star Tacos"),
        ])
    }

    #[test]
    fn second_open_replaces_the_first() {
        let mut controller = SelectionController::<Business>::new();
        controller.open("biz-1", DialogMode::Edit).expect("edit supported");
        controller
            .stage_patch(BusinessPatch { name: Some("Renamed".to_owned()), ..Default::default() })
            .expect("edit dialog");
        controller.open("biz-2", DialogMode::View).expect("view supported");

        let selection = controller.selection().expect("open");
        assert_eq!(selection.entity_id, EntityId::from("biz-2"));
        assert_eq!(selection.mode, DialogMode::View);
        assert_eq!(selection.patch, BusinessPatch::default());
    }

    #[test]
    fn unsupported_mode_keeps_previous_selection() {
        let mut controller = SelectionController::<Business>::new();
        controller.open("biz-1", DialogMode::View).expect("view supported");

        let error = controller.open("biz-2", DialogMode::Approve).expect_err("no approve");

        assert_eq!(
            error,
            EngineError::UnsupportedMode { kind: EntityKind::Business, mode: DialogMode::Approve }
        );
        assert_eq!(controller.selected_id(), Some(&EntityId::from("biz-1")));
    }

    #[test]
    fn close_clears_entity_and_mode_together() {
        let mut controller = SelectionController::<Business>::new();
        controller.open("biz-1", DialogMode::Delete).expect("delete supported");
        controller.close();

        assert!(controller.selected_id().is_none());
        assert!(controller.mode().is_none());
        assert_eq!(controller.stage_reason("x"), Err(EngineError::NoSelection));
    }

    #[tokio::test]
    async fn commit_after_close_reports_no_selection() {
        let repository = businesses();
        let notifier = InMemoryNotificationSink::default();
        let mut controller = SelectionController::<Business>::new();
        controller.open("biz-1", DialogMode::Edit).expect("edit supported");
        controller.close();

        let error = controller.commit(&repository, &notifier).await.expect_err("closed");

        assert_eq!(error, EngineError::NoSelection);
        assert!(repository.writes().is_empty());
    }

    #[tokio::test]
    async fn view_commit_never_writes_or_notifies() {
        let repository = businesses();
        let notifier = InMemoryNotificationSink::default();
        let mut controller = SelectionController::<Business>::new();
        controller.open("biz-1", DialogMode::View).expect("view supported");

        let outcome = controller.commit(&repository, &notifier).await.expect("view");

        assert_eq!(outcome, CommitOutcome::Viewed);
        assert!(repository.writes().is_empty());
        assert!(notifier.notifications().is_empty());
        assert!(!controller.is_open());
    }

    #[tokio::test]
    async fn edit_commit_applies_staged_patch() {
        let repository = businesses();
        let notifier = InMemoryNotificationSink::default();
        let mut controller = SelectionController::<Business>::new();
        controller.open("biz-1", DialogMode::Edit).expect("edit supported");
        controller
            .stage_patch(BusinessPatch { plan: Some(ListingPlan::Premium), ..Default::default() })
            .expect("edit dialog");

        let outcome = controller.commit(&repository, &notifier).await.expect("edit");

        assert!(matches!(outcome, CommitOutcome::Updated(ref b) if b.plan == ListingPlan::Premium));
        assert_eq!(repository.stored("biz-1").map(|b| b.plan), Some(ListingPlan::Premium));
        assert_eq!(notifier.messages(), vec!["Blue Door Bakery updated".to_owned()]);
        assert!(!controller.is_open());
    }

    #[tokio::test]
    async fn suspend_and_delete_write_then_close() {
        let repository = businesses();
        let notifier = InMemoryNotificationSink::default();
        let mut controller = SelectionController::<Business>::new();

        controller.open("biz-1", DialogMode::Suspend).expect("suspend supported");
        controller.commit(&repository, &notifier).await.expect("suspend");
        controller.open("biz-2", DialogMode::Delete).expect("delete supported");
        controller.commit(&repository, &notifier).await.expect("delete");

        assert_eq!(repository.stored("biz-1").map(|b| b.status), Some(AccountStatus::Suspended));
        assert!(repository.stored("biz-2").is_none());
        assert_eq!(repository.writes(), vec!["set_status", "remove"]);
        assert_eq!(
            notifier.messages(),
            vec!["Blue Door Bakery suspended".to_owned(), "Lone Star Tacos deleted".to_owned()]
        );
    }

    #[tokio::test]
    async fn repository_failure_keeps_dialog_open() {
        let repository = businesses();
        repository.set_offline(true);
        let notifier = InMemoryNotificationSink::default();
        let mut controller = SelectionController::<Business>::new();
        controller.open("biz-1", DialogMode::Delete).expect("delete supported");

        let error = controller.commit(&repository, &notifier).await.expect_err("offline");

        assert!(error.is_external());
        assert_eq!(controller.mode(), Some(DialogMode::Delete));
        assert_eq!(notifier.notifications()[0].kind, NotificationKind::Error);

        repository.set_offline(false);
        controller.commit(&repository, &notifier).await.expect("retry succeeds");
        assert!(repository.stored("biz-1").is_none());
    }

    #[tokio::test]
    async fn close_on_failure_policy_closes_after_error() {
        let repository = businesses();
        repository.set_offline(true);
        let notifier = InMemoryNotificationSink::default();
        let mut controller = SelectionController::<Business>::new()
            .with_policy(CommitPolicy { close_on_failure: true });
        controller.open("biz-1", DialogMode::Suspend).expect("suspend supported");

        let _ = controller.commit(&repository, &notifier).await;

        assert!(!controller.is_open());
    }

    #[tokio::test]
    async fn reject_dialog_carries_reason_and_stays_open_on_invalid_transition() {
        let repository = MemoryRepository::with(vec![ApprovalItem::pending(
            "appr-3",
            "dist-2",
            ApprovalPayload::Deal {
                business_name: "Lone Star Tacos".to_owned(),
                offer_title: "Taco Tuesday".to_owned(),
                coupon_code: None,
            },
        )]);
        let notifier = InMemoryNotificationSink::default();
        let mut controller = SelectionController::<ApprovalItem>::new();

        controller.open("appr-3", DialogMode::Reject).expect("reject supported");
        controller.stage_reason("incomplete address").expect("reject dialog");
        let outcome = controller.commit(&repository, &notifier).await.expect("reject");
        assert!(matches!(outcome, CommitOutcome::Rejected(ref item)
            if item.rejection_reason.as_deref() == Some("incomplete address")));

        controller.open("appr-3", DialogMode::Approve).expect("approve supported");
        let error = controller.commit(&repository, &notifier).await.expect_err("already final");
        assert!(matches!(
            error,
            EngineError::InvalidTransition { from: ApprovalStatus::Rejected, .. }
        ));
        assert_eq!(controller.mode(), Some(DialogMode::Approve));
        assert_eq!(notifier.notifications().len(), 1);
    }

    #[tokio::test]
    async fn load_returns_selected_entity() {
        let repository = businesses();
        let mut controller = SelectionController::<Business>::new();

        assert_eq!(controller.load(&repository).await.err(), Some(EngineError::NoSelection));
        controller.open("biz-2", DialogMode::View).expect("view supported");
        let loaded = controller.load(&repository).await.expect("load");
        assert_eq!(loaded.name, "Lone Star Tacos");
    }
}
