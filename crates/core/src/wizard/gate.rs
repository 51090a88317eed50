use serde::{Deserialize, Serialize};

use crate::wizard::definition::WizardDefinition;
use crate::wizard::session::{StepId, WizardSession};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "fields", rename_all = "snake_case")]
pub enum GateOutcome {
    Ok,
    /// Required-but-empty field keys, in declaration order.
    Fails(Vec<String>),
}

impl GateOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Presence checks for the current step, or for several steps at submit time. Values are never inspected beyond being non-blank
/// text, a selected file, or a set flag.
pub struct ValidationGate<'a> {
    definition: &'a WizardDefinition,
}

impl<'a> ValidationGate<'a> {
    pub fn new(definition: &'a WizardDefinition) -> Self {
        Self { definition }
    }

    pub fn can_advance(&self, session: &WizardSession) -> GateOutcome {
        self.check_steps(session, std::slice::from_ref(&session.current_step))
    }

    /// Missing fields across `steps`, each key reported once in step order.
    pub fn check_steps(&self, session: &WizardSession, steps: &[StepId]) -> GateOutcome {
        let mut missing = Vec::new();
        for requirement in steps.iter().flat_map(|step| self.definition.requirements_for(step)) {
            if !requirement.applies(session) || requirement.is_satisfied(session) {
                continue;
            }
            if !missing.contains(&requirement.field) {
                missing.push(requirement.field.clone());
            }
        }

        if missing.is_empty() {
            GateOutcome::Ok
        } else {
            GateOutcome::Fails(missing)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::wizard::catalog;
    use crate::wizard::navigator::StepNavigator;
    use crate::wizard::session::{FileHandle, StepId};

    use super::{GateOutcome, ValidationGate};

    #[test]
    fn details_requires_offer_fields_only_for_paid_listings() {
        let definition = catalog::listing();
        let gate = ValidationGate::new(&definition);
        let mut session = StepNavigator::new(definition.clone()).expect("valid").start();
        session.current_step = StepId::from("details");
        session.set_field("businessName", "Blue Door Bakery");
        session.set_field("category", "Bakery");
        session.set_field("description", "Sourdough and pastries");
        session.set_field("coverImage", FileHandle { name: "front.jpg".to_owned(), size_bytes: 1 });

        session.set_branch_flag("listingType", "free");
        assert_eq!(gate.can_advance(&session), GateOutcome::Ok);

        session.set_branch_flag("listingType", "paid");
        assert_eq!(
            gate.can_advance(&session),
            GateOutcome::Fails(vec![
                "offerTitle".to_owned(),
                "offerDetails".to_owned(),
                "couponCode".to_owned(),
            ])
        );
    }

    #[test]
    fn reports_exactly_the_empty_fields_and_mutates_nothing() {
        let definition = catalog::listing();
        let gate = ValidationGate::new(&definition);
        let mut session = StepNavigator::new(definition.clone()).expect("valid").start();
        session.current_step = StepId::from("contact");
        session.set_field("phone", "512-555-0134");
        session.set_field("email", "  ");
        let before = session.clone();

        assert_eq!(
            gate.can_advance(&session),
            GateOutcome::Fails(vec!["email".to_owned(), "address".to_owned()])
        );
        assert_eq!(session, before);
    }

    #[test]
    fn saved_card_waives_card_fields() {
        let definition = catalog::listing();
        let gate = ValidationGate::new(&definition);
        let mut session = StepNavigator::new(definition.clone()).expect("valid").start();
        session.current_step = StepId::from("payment");
        session.set_branch_flag("listingType", "paid");

        assert!(!gate.can_advance(&session).is_ok());
        session.set_branch_flag("useExistingCard", true);
        assert!(gate.can_advance(&session).is_ok());
    }
}
