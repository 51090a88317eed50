use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::EngineError;
use crate::wizard::definition::WizardDefinition;
use crate::wizard::gate::{GateOutcome, ValidationGate};
use crate::wizard::session::{BranchValue, StepId, WizardSession};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepProgress {
    /// 1-based position of the current step among the steps that will be visited.
    pub position: usize,
    pub total: usize,
}

/// Walks a [`WizardDefinition`] forwards and backwards, honouring its skip table.
#[derive(Clone, Debug)]
pub struct StepNavigator {
    definition: WizardDefinition,
}

impl StepNavigator {
    pub fn new(definition: WizardDefinition) -> Result<Self, EngineError> {
        definition.validate()?;
        Ok(Self { definition })
    }

    pub fn definition(&self) -> &WizardDefinition {
        &self.definition
    }

    /// Fresh session positioned on the first step with nothing entered.
    pub fn start(&self) -> WizardSession {
        let first = self.definition.steps[0].clone();
        WizardSession::new(self.definition.name.clone(), first)
    }

    pub fn next_step(&self, session: &WizardSession) -> Result<Option<StepId>, EngineError> {
        let index = self.current_index(session)?;
        Ok(self.definition.steps[index + 1..]
            .iter()
            .find(|step| !self.definition.is_skipped(step, session))
            .cloned())
    }

    pub fn previous_step(&self, session: &WizardSession) -> Result<Option<StepId>, EngineError> {
        let index = self.current_index(session)?;
        Ok(self.definition.steps[..index]
            .iter()
            .rev()
            .find(|step| !self.definition.is_skipped(step, session))
            .cloned())
    }

    pub fn is_terminal(&self, session: &WizardSession) -> Result<bool, EngineError> {
        Ok(self.next_step(session)?.is_none())
    }

    pub fn can_advance(&self, session: &WizardSession) -> GateOutcome {
        ValidationGate::new(&self.definition).can_advance(session)
    }

    /// Gate over every step the session would visit, so data cleared or newly required on an
    /// earlier step still blocks submission.
    pub fn can_submit(&self, session: &WizardSession) -> GateOutcome {
        ValidationGate::new(&self.definition).check_steps(session, &self.visible_steps(session))
    }

    /// Moves to the next non-skipped step once the current step's required fields are present.
    ///
    /// Returns `TerminalReached` when no step remains; the caller submits instead. Nothing in
    /// the session changes on any error.
    pub fn advance(&self, session: &mut WizardSession) -> Result<StepId, EngineError> {
        if let GateOutcome::Fails(fields) = self.can_advance(session) {
            debug!(
                event_name = "wizard.advance_blocked",
                wizard = %session.wizard,
                step = %session.current_step,
                missing = ?fields,
                "required fields missing"
            );
            return Err(EngineError::ValidationFailed { fields });
        }

        let Some(next) = self.next_step(session)? else {
            return Err(EngineError::TerminalReached { step: session.current_step.clone() });
        };

        debug!(
            event_name = "wizard.step_advanced",
            wizard = %session.wizard,
            from = %session.current_step,
            to = %next,
            "wizard advanced"
        );
        session.current_step = next.clone();
        Ok(next)
    }

    /// Records a branch flag unless the new value would skip the step the session is on.
    ///
    /// A rejected change leaves the flags as they were; go back to an earlier step first.
    pub fn set_branch_flag(
        &self,
        session: &mut WizardSession,
        key: impl Into<String>,
        value: impl Into<BranchValue>,
    ) -> Result<(), EngineError> {
        let key = key.into();
        let previous = session.branch_flags.insert(key.clone(), value.into());
        if !self.definition.is_skipped(&session.current_step, session) {
            return Ok(());
        }

        match previous {
            Some(previous) => session.branch_flags.insert(key.clone(), previous),
            None => session.branch_flags.remove(&key),
        };
        debug!(
            event_name = "wizard.flag_rejected",
            wizard = %session.wizard,
            step = %session.current_step,
            flag = %key,
            "flag would skip the current step"
        );
        Err(EngineError::FlagHidesCurrentStep { step: session.current_step.clone(), flag: key })
    }

    /// Moves back to the nearest earlier non-skipped step. Entered data is kept.
    pub fn retreat(&self, session: &mut WizardSession) -> Result<StepId, EngineError> {
        let Some(previous) = self.previous_step(session)? else {
            return Err(EngineError::NoPriorStep { step: session.current_step.clone() });
        };

        debug!(
            event_name = "wizard.step_retreated",
            wizard = %session.wizard,
            from = %session.current_step,
            to = %previous,
            "wizard retreated"
        );
        session.current_step = previous.clone();
        Ok(previous)
    }

    /// Steps that would be visited under the session's current flags, in order.
    pub fn visible_steps(&self, session: &WizardSession) -> Vec<StepId> {
        self.definition
            .steps
            .iter()
            .filter(|step| {
                *step == &session.current_step || !self.definition.is_skipped(step, session)
            })
            .cloned()
            .collect()
    }

    pub fn progress(&self, session: &WizardSession) -> StepProgress {
        let visible = self.visible_steps(session);
        let position = visible
            .iter()
            .position(|step| step == &session.current_step)
            .map_or(0, |index| index + 1);
        StepProgress { position, total: visible.len() }
    }

    fn current_index(&self, session: &WizardSession) -> Result<usize, EngineError> {
        self.definition.position(&session.current_step).ok_or_else(|| {
            EngineError::InvalidDefinition(format!(
                "step `{}` is not part of wizard `{}`",
                session.current_step, self.definition.name
            ))
        })
    }
}
