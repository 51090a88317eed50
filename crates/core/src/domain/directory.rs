use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{Entity, EntityId, EntityKind, EntityStatus};
use crate::selection::DialogMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Suspended,
}

impl AccountStatus {
    fn apply(&mut self, status: &EntityStatus) -> bool {
        match status {
            EntityStatus::Suspended => {
                *self = Self::Suspended;
                true
            }
            EntityStatus::Approved | EntityStatus::Rejected { .. } => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Business,
    Distributor,
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: AccountStatus,
    pub joined_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

impl Entity for User {
    type Patch = UserPatch;

    const KIND: EntityKind = EntityKind::User;
    const SUPPORTED_MODES: &'static [DialogMode] =
        &[DialogMode::View, DialogMode::Edit, DialogMode::Suspend];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn apply_patch(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
    }

    fn apply_status(&mut self, status: &EntityStatus) -> bool {
        self.status.apply(status)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingPlan {
    Free,
    Premium,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    pub id: EntityId,
    pub name: String,
    pub category: String,
    pub owner: String,
    pub city: String,
    pub plan: ListingPlan,
    pub status: AccountStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BusinessPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub owner: Option<String>,
    pub city: Option<String>,
    pub plan: Option<ListingPlan>,
}

impl Entity for Business {
    type Patch = BusinessPatch;

    const KIND: EntityKind = EntityKind::Business;
    const SUPPORTED_MODES: &'static [DialogMode] =
        &[DialogMode::View, DialogMode::Edit, DialogMode::Suspend, DialogMode::Delete];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        self.name.clone()
    }

    fn apply_patch(&mut self, patch: &BusinessPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(owner) = &patch.owner {
            self.owner = owner.clone();
        }
        if let Some(city) = &patch.city {
            self.city = city.clone();
        }
        if let Some(plan) = patch.plan {
            self.plan = plan;
        }
    }

    fn apply_status(&mut self, status: &EntityStatus) -> bool {
        self.status.apply(status)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distributor {
    pub id: EntityId,
    pub name: String,
    pub organization: String,
    pub region: String,
    pub businesses_onboarded: u32,
    pub status: AccountStatus,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistributorPatch {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub region: Option<String>,
}

impl Entity for Distributor {
    type Patch = DistributorPatch;

    const KIND: EntityKind = EntityKind::Distributor;
    const SUPPORTED_MODES: &'static [DialogMode] =
        &[DialogMode::View, DialogMode::Edit, DialogMode::Suspend];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        format!("{} ({})", self.name, self.organization)
    }

    fn apply_patch(&mut self, patch: &DistributorPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(organization) = &patch.organization {
            self.organization = organization.clone();
        }
        if let Some(region) = &patch.region {
            self.region = region.clone();
        }
    }

    fn apply_status(&mut self, status: &EntityStatus) -> bool {
        self.status.apply(status)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: EntityId,
    pub city: String,
    pub region: String,
    pub business_count: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocationPatch {
    pub city: Option<String>,
    pub region: Option<String>,
}

impl Entity for Location {
    type Patch = LocationPatch;

    const KIND: EntityKind = EntityKind::Location;
    const SUPPORTED_MODES: &'static [DialogMode] =
        &[DialogMode::View, DialogMode::Edit, DialogMode::Delete];

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn label(&self) -> String {
        format!("{}, {}", self.city, self.region)
    }

    fn apply_patch(&mut self, patch: &LocationPatch) {
        if let Some(city) = &patch.city {
            self.city = city.clone();
        }
        if let Some(region) = &patch.region {
            self.region = region.clone();
        }
    }

    fn apply_status(&mut self, _status: &EntityStatus) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::domain::entity::{Entity, EntityId, EntityStatus};
    use crate::selection::DialogMode;

    use super::{AccountStatus, Location, LocationPatch, User, UserPatch, UserRole};

    fn user() -> User {
        User {
            id: EntityId::from("user-1"),
            name: "Priya Natarajan".to_owned(),
            email: "priya@example.com".to_owned(),
            role: UserRole::Business,
            status: AccountStatus::Active,
            joined_at: Utc::now(),
        }
    }

    #[test]
    fn patch_only_overwrites_supplied_fields() {
        let mut user = user();
        user.apply_patch(&UserPatch {
            email: Some("priya@newmail.com".to_owned()),
            ..UserPatch::default()
        });

        assert_eq!(user.name, "Priya Natarajan");
        assert_eq!(user.email, "priya@newmail.com");
    }

    #[test]
    fn users_can_be_suspended_but_not_approved() {
        let mut user = user();

        assert!(!user.apply_status(&EntityStatus::Approved));
        assert_eq!(user.status, AccountStatus::Active);
        assert!(user.apply_status(&EntityStatus::Suspended));
        assert_eq!(user.status, AccountStatus::Suspended);
    }

    #[test]
    fn locations_have_no_status_and_no_suspend_dialog() {
        let mut location = Location {
            id: EntityId::from("loc-1"),
            city: "Austin".to_owned(),
            region: "TX".to_owned(),
            business_count: 12,
        };
        location.apply_patch(&LocationPatch::default());

        assert!(!location.apply_status(&EntityStatus::Suspended));
        assert!(!Location::supports(DialogMode::Suspend));
        assert!(Location::supports(DialogMode::Delete));
        assert!(User::supports(DialogMode::Suspend));
        assert!(!User::supports(DialogMode::Approve));
    }
}
