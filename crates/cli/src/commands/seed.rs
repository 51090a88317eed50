use listly_core::config::{AppConfig, LoadOptions};
use listly_db::{DirectoryFixtures, DirectoryRepositories, SeedSummary};

use crate::commands::{runtime, CommandResult};

pub fn run() -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    let runtime = match runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    let dataset = config.fixtures.dataset;
    let fixtures = DirectoryFixtures::for_dataset(dataset);
    let summary = fixtures.summary(dataset);
    let checks = runtime.block_on(verify(&fixtures, &summary));

    let failed_checks = checks
        .iter()
        .filter_map(|(check, passed)| (!passed).then_some(*check))
        .collect::<Vec<_>>();
    if !failed_checks.is_empty() {
        return CommandResult::failure(
            "seed",
            "seed_verification",
            verification_message(&failed_checks),
            6,
        );
    }

    let message = format!(
        "{} dataset loaded: {} users, {} businesses, {} distributors, {} locations, {} approvals ({} pending)",
        summary.dataset,
        summary.users,
        summary.businesses,
        summary.distributors,
        summary.locations,
        summary.approvals,
        summary.pending_approvals.len()
    );
    CommandResult::success_with_details("seed", message, serde_json::to_value(&summary).ok())
}

/// Seeds fresh repositories and checks every kind came back with the fixture count.
async fn verify(
    fixtures: &DirectoryFixtures,
    summary: &SeedSummary,
) -> Vec<(&'static str, bool)> {
    let repositories = DirectoryRepositories::seeded(fixtures);
    vec![
        ("users", repositories.users.len().await == summary.users),
        ("businesses", repositories.businesses.len().await == summary.businesses),
        ("distributors", repositories.distributors.len().await == summary.distributors),
        ("locations", repositories.locations.len().await == summary.locations),
        ("approvals", repositories.approvals.len().await == summary.approvals),
        ("submissions", repositories.submissions.is_empty().await),
    ]
}

fn verification_message(failed_checks: &[&str]) -> String {
    format!("seed verification failed for: {}", failed_checks.join(", "))
}
