use thiserror::Error;

use crate::commit::RepositoryError;
use crate::domain::approval::ApprovalStatus;
use crate::domain::entity::{EntityId, EntityKind};
use crate::selection::DialogMode;
use crate::wizard::StepId;

/// Every failure the engine can report. All variants are recoverable by the caller and the
/// engine is left exactly as it was before the failed call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("required fields are missing: {fields:?}")]
    ValidationFailed { fields: Vec<String> },
    #[error("no step follows `{step}`; submit the wizard instead")]
    TerminalReached { step: StepId },
    #[error("steps remain after `{step}`; advance before submitting")]
    StepsRemaining { step: StepId },
    #[error("no step precedes `{step}`")]
    NoPriorStep { step: StepId },
    #[error("setting `{flag}` would skip the current step `{step}`")]
    FlagHidesCurrentStep { step: StepId, flag: String },
    #[error("no entity is selected")]
    NoSelection,
    #[error("no wizard session is open")]
    NoSession,
    #[error("cannot move `{id}` from {from:?} to {to:?}")]
    InvalidTransition { id: EntityId, from: ApprovalStatus, to: ApprovalStatus },
    #[error("{kind:?} entities do not support the {mode:?} dialog")]
    UnsupportedMode { kind: EntityKind, mode: DialogMode },
    #[error("invalid wizard definition: {0}")]
    InvalidDefinition(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationFailed { .. } => "VALIDATION_FAILED",
            Self::TerminalReached { .. } => "TERMINAL_REACHED",
            Self::StepsRemaining { .. } => "STEPS_REMAINING",
            Self::NoPriorStep { .. } => "NO_PRIOR_STEP",
            Self::FlagHidesCurrentStep { .. } => "FLAG_HIDES_CURRENT_STEP",
            Self::NoSelection => "NO_SELECTION",
            Self::NoSession => "NO_SESSION",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::UnsupportedMode { .. } => "UNSUPPORTED_MODE",
            Self::InvalidDefinition(_) => "INVALID_DEFINITION",
            Self::Repository(_) => "REPOSITORY_ERROR",
        }
    }

    /// Whether the failure originated outside the engine.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::Repository(_))
    }

    /// Always true: a failed call leaves sessions and selections as they were.
    pub fn is_recoverable(&self) -> bool {
        true
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::ValidationFailed { fields } => {
                format!("Please complete the required fields: {}.", fields.join(", "))
            }
            Self::TerminalReached { .. } => "This is the last step. Submit to finish.".to_owned(),
            Self::StepsRemaining { .. } => "Please finish the remaining steps.".to_owned(),
            Self::NoPriorStep { .. } => "You are on the first step.".to_owned(),
            Self::FlagHidesCurrentStep { .. } => {
                "That choice removes the step you are on. Go back first.".to_owned()
            }
            Self::NoSelection | Self::NoSession => "Nothing is open right now.".to_owned(),
            Self::InvalidTransition { .. } => "This item has already been reviewed.".to_owned(),
            Self::UnsupportedMode { .. } => "That action is not available here.".to_owned(),
            Self::InvalidDefinition(_) => "An unexpected internal error occurred.".to_owned(),
            Self::Repository(_) => {
                "The change could not be saved. Please retry shortly.".to_owned()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::commit::RepositoryError;
    use crate::domain::approval::ApprovalStatus;
    use crate::domain::entity::EntityId;
    use crate::wizard::StepId;

    use super::EngineError;

    #[test]
    fn validation_failure_lists_fields_in_user_message() {
        let error = EngineError::ValidationFailed {
            fields: vec!["businessName".to_owned(), "category".to_owned()],
        };

        assert_eq!(error.code(), "VALIDATION_FAILED");
        assert_eq!(
            error.user_message(),
            "Please complete the required fields: businessName, category."
        );
    }

    #[test]
    fn repository_errors_are_external_and_hide_details() {
        let error = EngineError::from(RepositoryError::Unavailable("db lock timeout".to_owned()));

        assert!(error.is_external());
        assert_eq!(error.code(), "REPOSITORY_ERROR");
        assert!(!error.user_message().contains("db lock timeout"));
        assert!(error.to_string().contains("db lock timeout"));
    }

    #[test]
    fn local_usage_errors_are_not_external() {
        let errors = [
            EngineError::NoSelection,
            EngineError::NoPriorStep { step: StepId::from("plan") },
            EngineError::TerminalReached { step: StepId::from("payment") },
            EngineError::FlagHidesCurrentStep {
                step: StepId::from("payment"),
                flag: "listingType".to_owned(),
            },
            EngineError::InvalidTransition {
                id: EntityId::from("appr-3"),
                from: ApprovalStatus::Approved,
                to: ApprovalStatus::Rejected,
            },
        ];

        assert!(errors.iter().all(|error| !error.is_external() && error.is_recoverable()));
        assert_eq!(errors[3].code(), "FLAG_HIDES_CURRENT_STEP");
        assert_eq!(errors[4].code(), "INVALID_TRANSITION");
    }
}
