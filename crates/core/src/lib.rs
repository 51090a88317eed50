pub mod commit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod notify;
pub mod selection;
pub mod wizard;

pub use commit::{
    CommitPolicy, EntityRepository, RepositoryError, SubmissionReceipt, SubmissionSink,
    WizardSubmission,
};
pub use domain::approval::{ApprovalItem, ApprovalKind, ApprovalPayload, ApprovalStatus};
pub use domain::directory::{
    AccountStatus, Business, BusinessPatch, Distributor, DistributorPatch, ListingPlan, Location,
    LocationPatch, User, UserPatch, UserRole,
};
pub use domain::entity::{Entity, EntityId, EntityKind, EntityStatus};
pub use errors::EngineError;
pub use notify::{
    InMemoryNotificationSink, Notification, NotificationKind, NotificationSink,
    TracingNotificationSink,
};
pub use selection::{
    ActiveDialog, ApprovalController, ApprovalLifecycle, CommitOutcome, ConsoleScreen, DialogMode,
    ScreenEntity, Selection, SelectionController,
};
pub use wizard::{
    BranchValue, FieldValue, FileHandle, GateOutcome, StepId, StepNavigator, StepProgress,
    ValidationGate, Wizard, WizardDefinition, WizardSession,
};
