use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::wizard::session::{BranchValue, StepId, WizardSession};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagCondition {
    pub flag: String,
    pub equals: BranchValue,
}

impl FlagCondition {
    pub fn new(flag: impl Into<String>, equals: impl Into<BranchValue>) -> Self {
        Self { flag: flag.into(), equals: equals.into() }
    }

    /// An unset flag never satisfies a condition.
    pub fn holds(&self, session: &WizardSession) -> bool {
        session.flag(&self.flag) == Some(&self.equals)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRule {
    pub step: StepId,
    pub when: FlagCondition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    Text,
    File,
    Flag,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRequirement {
    pub step: StepId,
    pub field: String,
    pub kind: RequirementKind,
    #[serde(default)]
    pub when: Option<FlagCondition>,
    #[serde(default)]
    pub unless: Option<FlagCondition>,
}

impl FieldRequirement {
    pub fn applies(&self, session: &WizardSession) -> bool {
        let wanted = self.when.as_ref().map_or(true, |condition| condition.holds(session));
        let waived = self.unless.as_ref().is_some_and(|condition| condition.holds(session));
        wanted && !waived
    }

    pub fn is_satisfied(&self, session: &WizardSession) -> bool {
        match self.kind {
            RequirementKind::Text => {
                session.field(&self.field).is_some_and(|value| value.is_present_text())
            }
            RequirementKind::File => {
                session.field(&self.field).is_some_and(|value| value.is_selected_file())
            }
            RequirementKind::Flag => session.flag(&self.field).is_some(),
        }
    }
}

/// Declarative description of a wizard: step order, which steps branch flags skip, and which
/// fields each step needs before the user may move on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardDefinition {
    pub name: String,
    pub steps: Vec<StepId>,
    #[serde(default)]
    pub skip_rules: Vec<SkipRule>,
    #[serde(default)]
    pub requirements: Vec<FieldRequirement>,
}

impl WizardDefinition {
    pub fn new(name: impl Into<String>, steps: &[&str]) -> Self {
        Self {
            name: name.into(),
            steps: steps.iter().map(|step| StepId::from(*step)).collect(),
            skip_rules: Vec::new(),
            requirements: Vec::new(),
        }
    }

    pub fn skip_when(
        mut self,
        step: &str,
        flag: impl Into<String>,
        equals: impl Into<BranchValue>,
    ) -> Self {
        self.skip_rules
            .push(SkipRule { step: StepId::from(step), when: FlagCondition::new(flag, equals) });
        self
    }

    pub fn require(mut self, step: &str, field: impl Into<String>, kind: RequirementKind) -> Self {
        self.requirements.push(FieldRequirement {
            step: StepId::from(step),
            field: field.into(),
            kind,
            when: None,
            unless: None,
        });
        self
    }

    pub fn require_when(
        mut self,
        step: &str,
        field: impl Into<String>,
        kind: RequirementKind,
        when: FlagCondition,
    ) -> Self {
        self.requirements.push(FieldRequirement {
            step: StepId::from(step),
            field: field.into(),
            kind,
            when: Some(when),
            unless: None,
        });
        self
    }

    pub fn require_unless(
        mut self,
        step: &str,
        field: impl Into<String>,
        kind: RequirementKind,
        unless: FlagCondition,
    ) -> Self {
        self.requirements.push(FieldRequirement {
            step: StepId::from(step),
            field: field.into(),
            kind,
            when: None,
            unless: Some(unless),
        });
        self
    }

    pub fn first_step(&self) -> Option<&StepId> {
        self.steps.first()
    }

    pub fn position(&self, step: &StepId) -> Option<usize> {
        self.steps.iter().position(|candidate| candidate == step)
    }

    /// A step is skipped when any of its rules holds for the session's current flags.
    pub fn is_skipped(&self, step: &StepId, session: &WizardSession) -> bool {
        self.skip_rules.iter().any(|rule| &rule.step == step && rule.when.holds(session))
    }

    pub fn requirements_for<'a>(
        &'a self,
        step: &'a StepId,
    ) -> impl Iterator<Item = &'a FieldRequirement> + 'a {
        self.requirements.iter().filter(move |requirement| &requirement.step == step)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let Some(first) = self.steps.first() else {
            return Err(EngineError::InvalidDefinition(format!(
                "wizard `{}` has no steps",
                self.name
            )));
        };

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step) {
                return Err(EngineError::InvalidDefinition(format!(
                    "wizard `{}` lists step `{step}` twice",
                    self.name
                )));
            }
        }

        for rule in &self.skip_rules {
            if !seen.contains(&rule.step) {
                return Err(EngineError::InvalidDefinition(format!(
                    "skip rule in `{}` names unknown step `{}`",
                    self.name, rule.step
                )));
            }
            if &rule.step == first {
                return Err(EngineError::InvalidDefinition(format!(
                    "first step `{first}` of `{}` cannot be skipped",
                    self.name
                )));
            }
        }

        for requirement in &self.requirements {
            if !seen.contains(&requirement.step) {
                return Err(EngineError::InvalidDefinition(format!(
                    "requirement `{}` in `{}` names unknown step `{}`",
                    requirement.field, self.name, requirement.step
                )));
            }
        }

        Ok(())
    }
}
