pub mod fixtures;
pub mod repositories;

pub use fixtures::{DirectoryFixtures, DirectoryRepositories, SeedSummary};
pub use repositories::{InMemoryEntityRepository, InMemorySubmissionStore};
