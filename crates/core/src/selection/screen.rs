use serde::Serialize;

use crate::commit::{CommitPolicy, EntityRepository};
use crate::domain::approval::ApprovalItem;
use crate::domain::directory::{Business, Distributor, Location, User};
use crate::domain::entity::{Entity, EntityId, EntityKind};
use crate::errors::EngineError;
use crate::notify::NotificationSink;
use crate::selection::{CommitOutcome, DialogMode, SelectionController};

/// The dialog currently open on a console screen, whatever its entity kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActiveDialog {
    pub kind: EntityKind,
    pub entity_id: EntityId,
    pub mode: DialogMode,
}

mod slots {
    use crate::domain::approval::ApprovalItem;
    use crate::domain::directory::{Business, Distributor, Location, User};
    use crate::selection::SelectionController;

    /// Per-kind controllers of one screen. Only `ConsoleScreen` hands out mutable access.
    #[derive(Clone, Debug, Default)]
    pub struct Slots {
        pub(super) users: SelectionController<User>,
        pub(super) businesses: SelectionController<Business>,
        pub(super) distributors: SelectionController<Distributor>,
        pub(super) locations: SelectionController<Location>,
        pub(super) approvals: SelectionController<ApprovalItem>,
    }
}

use slots::Slots;

/// Entity kinds that have a slot on the admin console screen.
pub trait ScreenEntity: Entity {
    fn slot(slots: &Slots) -> &SelectionController<Self>;
    fn slot_mut(slots: &mut Slots) -> &mut SelectionController<Self>;
}

/// One management screen listing several entity kinds.
///
/// Each kind keeps its own controller, but at most one dialog is open across all of them:
/// opening any dialog closes whatever else was open on the screen. Separate screens are
/// separate values with no shared state.
#[derive(Clone, Debug, Default)]
pub struct ConsoleScreen {
    slots: Slots,
}

macro_rules! screen_slot {
    ($entity:ty, $field:ident) => {
        impl ScreenEntity for $entity {
            fn slot(slots: &Slots) -> &SelectionController<Self> {
                &slots.$field
            }

            fn slot_mut(slots: &mut Slots) -> &mut SelectionController<Self> {
                &mut slots.$field
            }
        }
    };
}

screen_slot!(User, users);
screen_slot!(Business, businesses);
screen_slot!(Distributor, distributors);
screen_slot!(Location, locations);
screen_slot!(ApprovalItem, approvals);

impl ConsoleScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CommitPolicy) -> Self {
        Self {
            slots: Slots {
                users: SelectionController::new().with_policy(policy),
                businesses: SelectionController::new().with_policy(policy),
                distributors: SelectionController::new().with_policy(policy),
                locations: SelectionController::new().with_policy(policy),
                approvals: SelectionController::new().with_policy(policy),
            },
        }
    }

    /// Read-only view of one kind's controller; dialogs are opened through the screen.
    pub fn controller<E: ScreenEntity>(&self) -> &SelectionController<E> {
        E::slot(&self.slots)
    }

    pub fn stage_patch<E: ScreenEntity>(&mut self, patch: E::Patch) -> Result<(), EngineError> {
        E::slot_mut(&mut self.slots).stage_patch(patch)
    }

    pub fn stage_reason<E: ScreenEntity>(
        &mut self,
        reason: impl Into<String>,
    ) -> Result<(), EngineError> {
        E::slot_mut(&mut self.slots).stage_reason(reason)
    }

    pub async fn load<E, R>(&self, repository: &R) -> Result<E, EngineError>
    where
        E: ScreenEntity,
        R: EntityRepository<E> + ?Sized,
    {
        E::slot(&self.slots).load(repository).await
    }

    /// Opens `mode` on `entity_id`, closing any dialog open for another kind.
    pub fn open<E: ScreenEntity>(
        &mut self,
        entity_id: impl Into<EntityId>,
        mode: DialogMode,
    ) -> Result<(), EngineError> {
        if !E::supports(mode) {
            return Err(EngineError::UnsupportedMode { kind: E::KIND, mode });
        }
        self.close();
        E::slot_mut(&mut self.slots).open(entity_id, mode)
    }

    pub fn close(&mut self) {
        self.slots.users.close();
        self.slots.businesses.close();
        self.slots.distributors.close();
        self.slots.locations.close();
        self.slots.approvals.close();
    }

    pub fn active(&self) -> Option<ActiveDialog> {
        [
            describe(&self.slots.users),
            describe(&self.slots.businesses),
            describe(&self.slots.distributors),
            describe(&self.slots.locations),
            describe(&self.slots.approvals),
        ]
        .into_iter()
        .flatten()
        .next()
    }

    /// Commits the dialog open for kind `E`; `NoSelection` if the open dialog belongs to another kind.
    pub async fn commit<E, R, N>(
        &mut self,
        repository: &R,
        notifier: &N,
    ) -> Result<CommitOutcome<E>, EngineError>
    where
        E: ScreenEntity,
        R: EntityRepository<E> + ?Sized,
        N: NotificationSink + ?Sized,
    {
        E::slot_mut(&mut self.slots).commit(repository, notifier).await
    }
}

fn describe<E: Entity>(controller: &SelectionController<E>) -> Option<ActiveDialog> {
    controller.selection().map(|selection| ActiveDialog {
        kind: E::KIND,
        entity_id: selection.entity_id.clone(),
        mode: selection.mode,
    })
}
