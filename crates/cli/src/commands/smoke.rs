use std::time::Instant;

use listly_core::commit::CommitPolicy;
use listly_core::config::{AppConfig, LoadOptions};
use listly_core::domain::approval::{ApprovalItem, ApprovalStatus};
use listly_core::domain::directory::{AccountStatus, Business};
use listly_core::domain::entity::EntityId;
use listly_core::errors::EngineError;
use listly_core::notify::InMemoryNotificationSink;
use listly_core::selection::{
    ApprovalController, ApprovalLifecycle, CommitOutcome, ConsoleScreen, DialogMode,
    SelectionController,
};
use listly_core::wizard::{catalog, FileHandle, StepId, Wizard};
use listly_db::{DirectoryFixtures, DirectoryRepositories};
use serde::Serialize;

use crate::commands::{runtime, CommandResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum SmokeStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct SmokeCheck {
    name: &'static str,
    status: SmokeStatus,
    elapsed_ms: u64,
    message: String,
}

#[derive(Debug, Serialize)]
struct SmokeReport {
    command: &'static str,
    status: SmokeStatus,
    summary: String,
    total_elapsed_ms: u64,
    checks: Vec<SmokeCheck>,
}

type ScenarioResult = Result<String, String>;

/// End-to-end flows replayed against a freshly seeded demo directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scenario {
    WizardFreeListing,
    WizardPaidListing,
    WizardRoundTrip,
    SelectionExclusiveOpen,
    SelectionViewCommitNoWrites,
    SelectionClosedCommit,
    SelectionRetryAfterFailure,
    ApprovalRejectWithReason,
    ApprovalTerminal,
}

impl Scenario {
    const ALL: [Scenario; 9] = [
        Self::WizardFreeListing,
        Self::WizardPaidListing,
        Self::WizardRoundTrip,
        Self::SelectionExclusiveOpen,
        Self::SelectionViewCommitNoWrites,
        Self::SelectionClosedCommit,
        Self::SelectionRetryAfterFailure,
        Self::ApprovalRejectWithReason,
        Self::ApprovalTerminal,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::WizardFreeListing => "wizard_free_listing",
            Self::WizardPaidListing => "wizard_paid_listing",
            Self::WizardRoundTrip => "wizard_round_trip",
            Self::SelectionExclusiveOpen => "selection_exclusive_open",
            Self::SelectionViewCommitNoWrites => "selection_view_commit_no_writes",
            Self::SelectionClosedCommit => "selection_closed_commit",
            Self::SelectionRetryAfterFailure => "selection_retry_after_failure",
            Self::ApprovalRejectWithReason => "approval_reject_appr_3",
            Self::ApprovalTerminal => "approval_terminal",
        }
    }

    async fn run(
        self,
        repositories: &DirectoryRepositories,
        policy: CommitPolicy,
    ) -> ScenarioResult {
        match self {
            Self::WizardFreeListing => wizard_free_listing(repositories).await,
            Self::WizardPaidListing => wizard_paid_listing(repositories).await,
            Self::WizardRoundTrip => wizard_round_trip(),
            Self::SelectionExclusiveOpen => selection_exclusive_open(policy),
            Self::SelectionViewCommitNoWrites => selection_view_commit(repositories).await,
            Self::SelectionClosedCommit => selection_closed_commit(repositories).await,
            Self::SelectionRetryAfterFailure => selection_retry(repositories, policy).await,
            Self::ApprovalRejectWithReason => approval_reject(repositories).await,
            Self::ApprovalTerminal => approval_terminal(repositories).await,
        }
    }
}

pub fn run() -> CommandResult {
    let started = Instant::now();
    let mut checks = Vec::new();

    let config = match timed_check(|| AppConfig::load(LoadOptions::default())) {
        Ok((elapsed_ms, config)) => {
            checks.push(SmokeCheck {
                name: "config_validation",
                status: SmokeStatus::Pass,
                elapsed_ms,
                message: "configuration loaded and validated".to_owned(),
            });
            config
        }
        Err((elapsed_ms, error)) => {
            checks.push(SmokeCheck {
                name: "config_validation",
                status: SmokeStatus::Fail,
                elapsed_ms,
                message: error.to_string(),
            });
            checks.extend(Scenario::ALL.into_iter().map(|scenario| skipped(scenario.name())));
            return finalize_report(checks, started.elapsed().as_millis() as u64);
        }
    };

    let runtime = match runtime() {
        Ok(runtime) => runtime,
        Err(error) => {
            let mut scenarios = Scenario::ALL.into_iter();
            if let Some(first) = scenarios.next() {
                checks.push(SmokeCheck {
                    name: first.name(),
                    status: SmokeStatus::Fail,
                    elapsed_ms: 0,
                    message: format!("failed to initialize async runtime: {error}"),
                });
            }
            checks.extend(scenarios.map(|scenario| skipped(scenario.name())));
            return finalize_report(checks, started.elapsed().as_millis() as u64);
        }
    };

    let fixtures = DirectoryFixtures::demo();
    for scenario in Scenario::ALL {
        let repositories = DirectoryRepositories::seeded(&fixtures);
        let outcome =
            timed_check(|| runtime.block_on(scenario.run(&repositories, config.commit)));
        let check = match outcome {
            Ok((elapsed_ms, message)) => {
                SmokeCheck { name: scenario.name(), status: SmokeStatus::Pass, elapsed_ms, message }
            }
            Err((elapsed_ms, message)) => {
                SmokeCheck { name: scenario.name(), status: SmokeStatus::Fail, elapsed_ms, message }
            }
        };
        checks.push(check);
    }

    finalize_report(checks, started.elapsed().as_millis() as u64)
}

async fn wizard_free_listing(repositories: &DirectoryRepositories) -> ScenarioResult {
    let notifier = InMemoryNotificationSink::default();
    let mut wizard = Wizard::new(catalog::listing()).map_err(describe)?;
    wizard.open();
    wizard.set_branch_flag("listingType", "free").map_err(describe)?;

    let mut visited = vec![wizard.advance().map_err(describe)?];
    fill_details(&mut wizard)?;
    visited.push(wizard.advance().map_err(describe)?);
    fill_contact(&mut wizard)?;
    expect_terminal(&mut wizard)?;
    ensure(visited == steps(&["details", "contact"]), format!("unexpected path {visited:?}"))?;

    let receipt = wizard.submit(&repositories.submissions, &notifier).await.map_err(describe)?;
    ensure(!wizard.is_open(), "wizard should close after submit")?;
    ensure(repositories.submissions.len().await == 1, "submission should be recorded")?;
    ensure(notifier.notifications().len() == 1, "submit should notify once")?;
    Ok(format!("free listing skipped payment and was submitted as {}", receipt.reference))
}

async fn wizard_paid_listing(repositories: &DirectoryRepositories) -> ScenarioResult {
    let notifier = InMemoryNotificationSink::default();
    let mut wizard = Wizard::new(catalog::listing()).map_err(describe)?;
    wizard.open();
    wizard.set_branch_flag("listingType", "paid").map_err(describe)?;

    let mut visited = vec![wizard.advance().map_err(describe)?];
    fill_details(&mut wizard)?;
    fill(
        &mut wizard,
        &[
            ("offerTitle", "Grand opening"),
            ("offerDetails", "10% off every order"),
            ("couponCode", "OPEN10"),
        ],
    )?;
    visited.push(wizard.advance().map_err(describe)?);
    fill_contact(&mut wizard)?;
    visited.push(wizard.advance().map_err(describe)?);
    fill(
        &mut wizard,
        &[
            ("cardholderName", "Priya Natarajan"),
            ("cardNumber", "4242424242424242"),
            ("expiry", "12/29"),
            ("cvc", "123"),
        ],
    )?;
    expect_terminal(&mut wizard)?;
    ensure(
        visited == steps(&["details", "contact", "payment"]),
        format!("unexpected path {visited:?}"),
    )?;

    let receipt = wizard.submit(&repositories.submissions, &notifier).await.map_err(describe)?;
    let recorded = repositories.submissions.submissions().await;
    let visible = recorded.last().map(|(_, submission)| submission.visited_steps.clone());
    ensure(
        visible == Some(steps(&["plan", "details", "contact", "payment"])),
        format!("submission recorded steps {visible:?}"),
    )?;
    Ok(format!("paid listing visited payment and was submitted as {}", receipt.reference))
}

fn wizard_round_trip() -> ScenarioResult {
    let mut wizard = Wizard::new(catalog::listing()).map_err(describe)?;
    wizard.open();
    wizard.set_branch_flag("listingType", "paid").map_err(describe)?;
    wizard.advance().map_err(describe)?;
    wizard.set_field("businessName", "Blue Door Bakery").map_err(describe)?;

    let back = wizard.retreat().map_err(describe)?;
    ensure(back == StepId::from("plan"), format!("retreat landed on {back}"))?;
    match wizard.retreat() {
        Err(EngineError::NoPriorStep { .. }) => {}
        other => return Err(format!("retreat from the first step returned {other:?}")),
    }

    wizard.set_branch_flag("listingType", "free").map_err(describe)?;
    wizard.advance().map_err(describe)?;
    let kept = wizard
        .session()
        .and_then(|session| session.field("businessName"))
        .is_some_and(|value| value.is_present_text());
    ensure(kept, "fields should survive a round trip")?;

    let total = wizard.progress().map(|progress| progress.total);
    ensure(total == Some(3), format!("free listing should show 3 steps, saw {total:?}"))?;
    Ok("retreat kept entered fields and the plan switch hid payment".to_owned())
}

fn selection_exclusive_open(policy: CommitPolicy) -> ScenarioResult {
    let mut screen = ConsoleScreen::with_policy(policy);
    screen.open::<Business>("biz-1", DialogMode::Edit).map_err(describe)?;
    screen.open::<ApprovalItem>("appr-1", DialogMode::View).map_err(describe)?;

    ensure(!screen.controller::<Business>().is_open(), "business dialog should be closed")?;
    let active = screen.active().ok_or_else(|| "a dialog should be open".to_owned())?;
    ensure(
        active.entity_id == EntityId::from("appr-1") && active.mode == DialogMode::View,
        format!("unexpected active dialog {active:?}"),
    )?;

    match screen.open::<ApprovalItem>("appr-1", DialogMode::Delete) {
        Err(EngineError::UnsupportedMode { .. }) => {}
        other => return Err(format!("deleting an approval returned {other:?}")),
    }
    ensure(screen.active() == Some(active), "rejected open should keep the current dialog")?;
    Ok("opening a second dialog closed the first".to_owned())
}

async fn selection_view_commit(repositories: &DirectoryRepositories) -> ScenarioResult {
    let notifier = InMemoryNotificationSink::default();
    let before = repositories.businesses.list().await;
    let mut screen = ConsoleScreen::new();
    screen.open::<Business>("biz-2", DialogMode::View).map_err(describe)?;

    let outcome = screen
        .commit::<Business, _, _>(&repositories.businesses, &notifier)
        .await
        .map_err(describe)?;
    ensure(outcome == CommitOutcome::Viewed, format!("view commit returned {outcome:?}"))?;
    ensure(screen.active().is_none(), "view commit should close the dialog")?;
    ensure(repositories.businesses.list().await == before, "view commit should not write")?;
    ensure(notifier.notifications().is_empty(), "view commit should not notify")?;
    Ok("view commit closed without writing".to_owned())
}

async fn selection_closed_commit(repositories: &DirectoryRepositories) -> ScenarioResult {
    let notifier = InMemoryNotificationSink::default();
    let mut controller = SelectionController::<Business>::new();
    controller.open("biz-3", DialogMode::Delete).map_err(describe)?;
    controller.close();

    match controller.commit(&repositories.businesses, &notifier).await {
        Err(EngineError::NoSelection) => {}
        other => return Err(format!("commit after close returned {other:?}")),
    }
    ensure(repositories.businesses.len().await == 3, "closed dialog should not delete")?;
    Ok("commit after close reported no selection".to_owned())
}

async fn selection_retry(
    repositories: &DirectoryRepositories,
    policy: CommitPolicy,
) -> ScenarioResult {
    let notifier = InMemoryNotificationSink::default();
    let mut controller = SelectionController::<Business>::new().with_policy(policy);
    controller.open("biz-1", DialogMode::Suspend).map_err(describe)?;

    repositories.businesses.set_offline(true);
    let failed = controller.commit(&repositories.businesses, &notifier).await;
    repositories.businesses.set_offline(false);
    match failed {
        Err(error) if error.is_external() => {}
        other => return Err(format!("offline commit returned {other:?}")),
    }
    ensure(notifier.notifications().len() == 1, "failure should notify once")?;

    if policy.close_on_failure {
        ensure(!controller.is_open(), "policy closes the dialog on failure")?;
        controller.open("biz-1", DialogMode::Suspend).map_err(describe)?;
    } else {
        ensure(controller.is_open(), "dialog should stay open for a retry")?;
    }

    let outcome =
        controller.commit(&repositories.businesses, &notifier).await.map_err(describe)?;
    match outcome {
        CommitOutcome::Suspended(business) if business.status == AccountStatus::Suspended => {
            Ok(format!("{} suspended on retry", business.name))
        }
        other => Err(format!("retry returned {other:?}")),
    }
}

async fn approval_reject(repositories: &DirectoryRepositories) -> ScenarioResult {
    let notifier = InMemoryNotificationSink::default();
    let mut controller = ApprovalController::new();
    controller.open("appr-3", DialogMode::Reject).map_err(describe)?;
    controller.stage_reason("incomplete address").map_err(describe)?;

    let outcome = controller.commit(&repositories.approvals, &notifier).await.map_err(describe)?;
    let item = match outcome {
        CommitOutcome::Rejected(item) => item,
        other => return Err(format!("reject returned {other:?}")),
    };
    ensure(item.status == ApprovalStatus::Rejected, "appr-3 should be rejected")?;
    ensure(
        item.rejection_reason.as_deref() == Some("incomplete address"),
        format!("reason recorded as {:?}", item.rejection_reason),
    )?;

    let lifecycle = ApprovalLifecycle::new(&repositories.approvals, &notifier);
    match lifecycle.reject(&EntityId::from("appr-3"), None).await {
        Err(EngineError::InvalidTransition { .. }) => {}
        other => return Err(format!("second reject returned {other:?}")),
    }
    Ok("appr-3 rejected with reason and stayed rejected".to_owned())
}

async fn approval_terminal(repositories: &DirectoryRepositories) -> ScenarioResult {
    let notifier = InMemoryNotificationSink::default();
    let lifecycle = ApprovalLifecycle::new(&repositories.approvals, &notifier);
    let approved = lifecycle.approve(&EntityId::from("appr-1")).await.map_err(describe)?;
    ensure(approved.status == ApprovalStatus::Approved, "appr-1 should be approved")?;

    let mut controller = ApprovalController::new();
    controller.open("appr-1", DialogMode::Reject).map_err(describe)?;
    match controller.commit(&repositories.approvals, &notifier).await {
        Err(EngineError::InvalidTransition { .. }) => {}
        other => return Err(format!("rejecting an approved item returned {other:?}")),
    }
    ensure(controller.is_open(), "invalid transition should keep the dialog open")?;
    ensure(notifier.notifications().len() == 1, "invalid transition should not notify")?;
    Ok("approved items cannot be reviewed again".to_owned())
}

fn fill_details(wizard: &mut Wizard) -> Result<(), String> {
    fill(
        wizard,
        &[
            ("businessName", "Blue Door Bakery"),
            ("category", "Bakery"),
            ("description", "Sourdough and pastries baked every morning"),
        ],
    )?;
    let cover = FileHandle { name: "storefront.jpg".to_owned(), size_bytes: 48_213 };
    wizard.set_field("coverImage", cover).map_err(describe)
}

fn fill_contact(wizard: &mut Wizard) -> Result<(), String> {
    fill(
        wizard,
        &[
            ("phone", "512-555-0142"),
            ("email", "hello@bluedoor.com"),
            ("address", "401 Congress Ave, Austin TX"),
        ],
    )
}

fn fill(wizard: &mut Wizard, fields: &[(&str, &str)]) -> Result<(), String> {
    for (key, value) in fields {
        wizard.set_field(*key, *value).map_err(describe)?;
    }
    Ok(())
}

fn expect_terminal(wizard: &mut Wizard) -> Result<(), String> {
    match wizard.advance() {
        Err(EngineError::TerminalReached { .. }) => Ok(()),
        other => Err(format!("expected the last step, advance returned {other:?}")),
    }
}

fn steps(ids: &[&str]) -> Vec<StepId> {
    ids.iter().map(|id| StepId::from(*id)).collect()
}

fn ensure(condition: bool, message: impl Into<String>) -> Result<(), String> {
    if condition {
        Ok(())
    } else {
        Err(message.into())
    }
}

fn describe(error: EngineError) -> String {
    format!("{}: {error}", error.code())
}

fn timed_check<T, E>(check: impl FnOnce() -> Result<T, E>) -> Result<(u64, T), (u64, E)> {
    let started = Instant::now();
    match check() {
        Ok(value) => Ok((started.elapsed().as_millis() as u64, value)),
        Err(error) => Err((started.elapsed().as_millis() as u64, error)),
    }
}

fn skipped(name: &'static str) -> SmokeCheck {
    SmokeCheck {
        name,
        status: SmokeStatus::Skipped,
        elapsed_ms: 0,
        message: "skipped due to previous failure".to_owned(),
    }
}

fn finalize_report(checks: Vec<SmokeCheck>, total_elapsed_ms: u64) -> CommandResult {
    let passed = checks.iter().filter(|check| check.status == SmokeStatus::Pass).count();
    let total = checks.len();
    let failed = checks.iter().any(|check| check.status == SmokeStatus::Fail);

    let report = SmokeReport {
        command: "smoke",
        status: if failed { SmokeStatus::Fail } else { SmokeStatus::Pass },
        summary: format!("smoke: {passed}/{total} checks passed in {total_elapsed_ms}ms"),
        total_elapsed_ms,
        checks,
    };

    let human = report.summary.clone();
    let machine = serde_json::to_string(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"smoke\",\"status\":\"fail\",\"summary\":\"serialization failed\",\"error\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    });

    CommandResult { exit_code: if failed { 6 } else { 0 }, output: format!("{human}\n{machine}") }
}

#[cfg(test)]
mod tests {
    use listly_core::commit::CommitPolicy;
    use listly_db::{DirectoryFixtures, DirectoryRepositories};

    use super::{finalize_report, skipped, Scenario, SmokeCheck, SmokeStatus};

    #[tokio::test]
    async fn every_scenario_passes_on_demo_fixtures() {
        let fixtures = DirectoryFixtures::demo();
        for policy in [CommitPolicy::default(), CommitPolicy { close_on_failure: true }] {
            for scenario in Scenario::ALL {
                let repositories = DirectoryRepositories::seeded(&fixtures);
                let result = scenario.run(&repositories, policy).await;
                assert!(result.is_ok(), "{} failed: {result:?}", scenario.name());
            }
        }
    }

    #[test]
    fn any_failed_check_fails_the_report() {
        let result = finalize_report(
            vec![
                SmokeCheck {
                    name: "config_validation",
                    status: SmokeStatus::Fail,
                    elapsed_ms: 1,
                    message: "bad level".to_owned(),
                },
                skipped("wizard_free_listing"),
            ],
            3,
        );

        assert_eq!(result.exit_code, 6);
        assert!(result.output.starts_with("smoke: 0/2 checks passed in 3ms\n"));
        assert!(result.output.contains("\"status\":\"skipped\""));
    }
}
