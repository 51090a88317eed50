//! Wizards offered by the directory consoles.

use crate::wizard::definition::{FlagCondition, RequirementKind, WizardDefinition};

pub const LISTING: &str = "listing";
pub const SIGNUP: &str = "signup";
pub const PREMIUM_UPGRADE: &str = "premium_upgrade";

const CARD_FIELDS: &[&str] = &["cardholderName", "cardNumber", "expiry", "cvc"];

/// New business listing: `plan -> details -> contact -> payment`, payment only for paid plans.
pub fn listing() -> WizardDefinition {
    let paid = FlagCondition::new("listingType", "paid");
    let definition = WizardDefinition::new(LISTING, &["plan", "details", "contact", "payment"])
        .skip_when("payment", "listingType", "free")
        .require("plan", "listingType", RequirementKind::Flag)
        .require("details", "businessName", RequirementKind::Text)
        .require("details", "category", RequirementKind::Text)
        .require("details", "description", RequirementKind::Text)
        .require("details", "coverImage", RequirementKind::File)
        .require_when("details", "offerTitle", RequirementKind::Text, paid.clone())
        .require_when("details", "offerDetails", RequirementKind::Text, paid.clone())
        .require_when("details", "couponCode", RequirementKind::Text, paid)
        .require("contact", "phone", RequirementKind::Text)
        .require("contact", "email", RequirementKind::Text)
        .require("contact", "address", RequirementKind::Text);

    with_card_fields(definition, "payment")
}

/// Partner signup; the organization step only applies to distribution partners.
pub fn signup() -> WizardDefinition {
    WizardDefinition::new(SIGNUP, &["role", "account", "organization", "confirm"])
        .skip_when("organization", "role", "business")
        .require("role", "role", RequirementKind::Flag)
        .require("account", "fullName", RequirementKind::Text)
        .require("account", "email", RequirementKind::Text)
        .require("account", "password", RequirementKind::Text)
        .require("organization", "organizationName", RequirementKind::Text)
        .require("organization", "region", RequirementKind::Text)
}

/// Upgrade an existing listing to premium. A trial needs no payment details.
pub fn premium_upgrade() -> WizardDefinition {
    let definition = WizardDefinition::new(PREMIUM_UPGRADE, &["plan", "payment", "review"])
        .skip_when("payment", "billingCycle", "trial")
        .require("plan", "billingCycle", RequirementKind::Flag);

    with_card_fields(definition, "payment")
}

pub fn by_name(name: &str) -> Option<WizardDefinition> {
    match name {
        LISTING => Some(listing()),
        SIGNUP => Some(signup()),
        PREMIUM_UPGRADE => Some(premium_upgrade()),
        _ => None,
    }
}

fn with_card_fields(definition: WizardDefinition, step: &str) -> WizardDefinition {
    CARD_FIELDS.iter().fold(definition, |definition, field| {
        definition.require_unless(
            step,
            *field,
            RequirementKind::Text,
            FlagCondition::new("useExistingCard", true),
        )
    })
}
