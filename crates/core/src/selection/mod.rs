pub mod approval;
pub mod controller;
pub mod mode;
pub mod screen;

#[cfg(test)]
pub(crate) mod testing;

use crate::domain::approval::ApprovalItem;

pub use approval::ApprovalLifecycle;
pub use controller::{CommitOutcome, Selection, SelectionController};
pub use mode::DialogMode;
pub use screen::{ActiveDialog, ConsoleScreen, ScreenEntity};

/// Selection controller for the approval queue; `approve`/`reject` commits go through the
/// pending-only lifecycle rules.
pub type ApprovalController = SelectionController<ApprovalItem>;
