use chrono::{DateTime, Utc};
use serde::Serialize;

use listly_core::config::FixtureDataset;
use listly_core::domain::approval::{ApprovalItem, ApprovalPayload, ApprovalStatus};
use listly_core::domain::directory::{
    AccountStatus, Business, Distributor, ListingPlan, Location, User, UserRole,
};
use listly_core::domain::entity::EntityId;

use crate::repositories::{InMemoryEntityRepository, InMemorySubmissionStore};

const DEC_01: i64 = 1_733_011_200;
const JAN_01: i64 = 1_735_689_600;
const JAN_08: i64 = 1_736_294_400;
const FEB_01: i64 = 1_738_368_000;

/// Deterministic mock directory behind the management consoles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DirectoryFixtures {
    pub users: Vec<User>,
    pub businesses: Vec<Business>,
    pub distributors: Vec<Distributor>,
    pub locations: Vec<Location>,
    pub approvals: Vec<ApprovalItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub dataset: &'static str,
    pub users: usize,
    pub businesses: usize,
    pub distributors: usize,
    pub locations: usize,
    pub approvals: usize,
    pub pending_approvals: Vec<String>,
}

impl DirectoryFixtures {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn demo() -> Self {
        Self {
            users: vec![
                user("user-1", "Priya Natarajan", "priya@bluedoor.com", UserRole::Business, JAN_01),
                user("user-2", "Marcus Reyes", "marcus@hcc.org", UserRole::Distributor, JAN_08),
                user("user-3", "Dana Okafor", "dana@listly.example", UserRole::Admin, DEC_01),
                user("user-4", "Tom Lindqvist", "tom@lonestar.com", UserRole::Business, FEB_01),
            ],
            businesses: vec![
                Business {
                    plan: ListingPlan::Premium,
                    ..business("biz-1", "Blue Door Bakery", "Bakery", "Priya Natarajan", "Austin")
                },
                business("biz-2", "Lone Star Tacos", "Restaurant", "Tom Lindqvist", "San Antonio"),
                business("biz-3", "Riverbend Cycles", "Retail", "Ana Duarte", "Austin"),
            ],
            distributors: vec![
                distributor("dist-1", "Marcus Reyes", "Hill Country Chamber", "Central TX", 14),
                distributor("dist-2", "Leah Whitfield", "Gulf Coast Partners", "South TX", 6),
            ],
            locations: vec![
                location("loc-1", "Austin", "TX", 2),
                location("loc-2", "San Antonio", "TX", 1),
                location("loc-3", "Houston", "TX", 0),
            ],
            approvals: vec![
                approval(
                    "appr-1",
                    "dist-1",
                    1_739_008_800,
                    ApprovalPayload::Business {
                        business_name: "Greenway Florist".to_owned(),
                        category: "Florist".to_owned(),
                        city: "Round Rock".to_owned(),
                    },
                ),
                approval(
                    "appr-2",
                    "user-4",
                    1_739_095_200,
                    ApprovalPayload::Deal {
                        business_name: "Lone Star Tacos".to_owned(),
                        offer_title: "Taco Tuesday 2-for-1".to_owned(),
                        coupon_code: Some("TACO2".to_owned()),
                    },
                ),
                approval(
                    "appr-3",
                    "user-2",
                    1_739_181_600,
                    ApprovalPayload::Distributor {
                        applicant_name: "Jordan Blake".to_owned(),
                        organization: "Bayou Business Network".to_owned(),
                        region: "East TX".to_owned(),
                    },
                ),
            ],
        }
    }

    pub fn for_dataset(dataset: FixtureDataset) -> Self {
        match dataset {
            FixtureDataset::Demo => Self::demo(),
            FixtureDataset::Empty => Self::empty(),
        }
    }

    pub fn summary(&self, dataset: FixtureDataset) -> SeedSummary {
        SeedSummary {
            dataset: dataset.as_str(),
            users: self.users.len(),
            businesses: self.businesses.len(),
            distributors: self.distributors.len(),
            locations: self.locations.len(),
            approvals: self.approvals.len(),
            pending_approvals: self
                .approvals
                .iter()
                .filter(|item| item.status == ApprovalStatus::Pending)
                .map(|item| item.id.0.clone())
                .collect(),
        }
    }
}

/// One in-memory repository per entity kind plus the wizard submission store.
#[derive(Default)]
pub struct DirectoryRepositories {
    pub users: InMemoryEntityRepository<User>,
    pub businesses: InMemoryEntityRepository<Business>,
    pub distributors: InMemoryEntityRepository<Distributor>,
    pub locations: InMemoryEntityRepository<Location>,
    pub approvals: InMemoryEntityRepository<ApprovalItem>,
    pub submissions: InMemorySubmissionStore,
}

impl DirectoryRepositories {
    pub fn seeded(fixtures: &DirectoryFixtures) -> Self {
        Self {
            users: InMemoryEntityRepository::with_entities(fixtures.users.clone()),
            businesses: InMemoryEntityRepository::with_entities(fixtures.businesses.clone()),
            distributors: InMemoryEntityRepository::with_entities(fixtures.distributors.clone()),
            locations: InMemoryEntityRepository::with_entities(fixtures.locations.clone()),
            approvals: InMemoryEntityRepository::with_entities(fixtures.approvals.clone()),
            submissions: InMemorySubmissionStore::default(),
        }
    }
}

fn at(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or_default()
}

fn user(id: &str, name: &str, email: &str, role: UserRole, joined: i64) -> User {
    User {
        id: EntityId::from(id),
        name: name.to_owned(),
        email: email.to_owned(),
        role,
        status: AccountStatus::Active,
        joined_at: at(joined),
    }
}

fn business(id: &str, name: &str, category: &str, owner: &str, city: &str) -> Business {
    Business {
        id: EntityId::from(id),
        name: name.to_owned(),
        category: category.to_owned(),
        owner: owner.to_owned(),
        city: city.to_owned(),
        plan: ListingPlan::Free,
        status: AccountStatus::Active,
    }
}

fn distributor(
    id: &str,
    name: &str,
    organization: &str,
    region: &str,
    onboarded: u32,
) -> Distributor {
    Distributor {
        id: EntityId::from(id),
        name: name.to_owned(),
        organization: organization.to_owned(),
        region: region.to_owned(),
        businesses_onboarded: onboarded,
        status: AccountStatus::Active,
    }
}

fn location(id: &str, city: &str, region: &str, business_count: u32) -> Location {
    Location {
        id: EntityId::from(id),
        city: city.to_owned(),
        region: region.to_owned(),
        business_count,
    }
}

fn approval(
    id: &str,
    submitted_by: &str,
    submitted: i64,
    payload: ApprovalPayload,
) -> ApprovalItem {
    ApprovalItem { submitted_at: at(submitted), ..ApprovalItem::pending(id, submitted_by, payload) }
}
