pub mod catalog;
pub mod definition;
pub mod gate;
pub mod navigator;
pub mod session;


use chrono::Utc;
use tracing::{info, warn};

use crate::commit::{CommitPolicy, SubmissionReceipt, SubmissionSink, WizardSubmission};
use crate::errors::EngineError;
use crate::notify::{Notification, NotificationSink};

pub use definition::{FieldRequirement, FlagCondition, RequirementKind, SkipRule, WizardDefinition};
pub use gate::{GateOutcome, ValidationGate};
pub use navigator::{StepNavigator, StepProgress};
pub use session::{BranchValue, FieldValue, FileHandle, StepId, WizardSession};

/// A wizard dialog: at most one open session over one definition.
#[derive(Clone, Debug)]
pub struct Wizard {
    navigator: StepNavigator,
    policy: CommitPolicy,
    session: Option<WizardSession>,
}

impl Wizard {
    pub fn new(definition: WizardDefinition) -> Result<Self, EngineError> {
        Ok(Self {
            navigator: StepNavigator::new(definition)?,
            policy: CommitPolicy::default(),
            session: None,
        })
    }

    pub fn with_policy(mut self, policy: CommitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn navigator(&self) -> &StepNavigator {
        &self.navigator
    }

    /// Opens a fresh session, discarding any session already open.
    pub fn open(&mut self) -> &WizardSession {
        self.session.insert(self.navigator.start())
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&WizardSession> {
        self.session.as_ref()
    }

    pub fn current_step(&self) -> Option<&StepId> {
        self.session.as_ref().map(|session| &session.current_step)
    }

    pub fn set_field(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Result<(), EngineError> {
        self.session_mut()?.set_field(key, value);
        Ok(())
    }

    pub fn set_branch_flag(
        &mut self,
        key: impl Into<String>,
        value: impl Into<BranchValue>,
    ) -> Result<(), EngineError> {
        let session = self.session.as_mut().ok_or(EngineError::NoSession)?;
        self.navigator.set_branch_flag(session, key, value)
    }

    pub fn can_advance(&self) -> Result<GateOutcome, EngineError> {
        let session = self.session.as_ref().ok_or(EngineError::NoSession)?;
        Ok(self.navigator.can_advance(session))
    }

    pub fn advance(&mut self) -> Result<StepId, EngineError> {
        let session = self.session.as_mut().ok_or(EngineError::NoSession)?;
        self.navigator.advance(session)
    }

    pub fn retreat(&mut self) -> Result<StepId, EngineError> {
        let session = self.session.as_mut().ok_or(EngineError::NoSession)?;
        self.navigator.retreat(session)
    }

    pub fn progress(&self) -> Option<StepProgress> {
        self.session.as_ref().map(|session| self.navigator.progress(session))
    }

    /// Discards the open session and everything entered in it.
    pub fn cancel(&mut self) -> Option<WizardSession> {
        let discarded = self.session.take();
        if let Some(session) = &discarded {
            info!(
                event_name = "wizard.cancelled",
                wizard = %session.wizard,
                step = %session.current_step,
                "wizard cancelled"
            );
        }
        discarded
    }

    /// Hands the finished session to `sink` and closes the wizard.
    ///
    /// Only allowed on the last visible step with the required fields of every visible step
    /// present. When the sink
    /// fails the session stays open (unless the policy says otherwise) and the error is
    /// returned after an error notification.
    pub async fn submit<S, N>(
        &mut self,
        sink: &S,
        notifier: &N,
    ) -> Result<SubmissionReceipt, EngineError>
    where
        S: SubmissionSink + ?Sized,
        N: NotificationSink + ?Sized,
    {
        let submission = {
            let session = self.session.as_ref().ok_or(EngineError::NoSession)?;
            if !self.navigator.is_terminal(session)? {
                return Err(EngineError::StepsRemaining { step: session.current_step.clone() });
            }
            if let GateOutcome::Fails(fields) = self.navigator.can_submit(session) {
                return Err(EngineError::ValidationFailed { fields });
            }

            WizardSubmission {
                wizard: session.wizard.clone(),
                fields: session.fields.clone(),
                branch_flags: session.branch_flags.clone(),
                visited_steps: self.navigator.visible_steps(session),
                submitted_at: Utc::now(),
            }
        };
        let wizard = submission.wizard.clone();

        match sink.submit(submission).await {
            Ok(receipt) => {
                info!(
                    event_name = "wizard.submitted",
                    wizard = %wizard,
                    reference = %receipt.reference,
                    "wizard submitted"
                );
                notifier.notify(
                    Notification::success(
                        "wizard.submitted",
                        format!("Submitted {wizard} (ref {})", receipt.reference),
                    )
                    .with_metadata("wizard", wizard.clone())
                    .with_metadata("reference", receipt.reference.clone()),
                );
                self.session = None;
                Ok(receipt)
            }
            Err(error) => {
                warn!(
                    event_name = "wizard.submit_failed",
                    wizard = %wizard,
                    error = %error,
                    "wizard submission failed"
                );
                notifier.notify(
                    Notification::error(
                        "wizard.submit_failed",
                        format!("Could not submit {wizard}: {error}"),
                    )
                    .with_metadata("wizard", wizard.clone()),
                );
                if self.policy.close_on_failure {
                    self.session = None;
                }
                Err(error.into())
            }
        }
    }

    fn session_mut(&mut self) -> Result<&mut WizardSession, EngineError> {
        self.session.as_mut().ok_or(EngineError::NoSession)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::commit::{
        CommitPolicy, RepositoryError, SubmissionReceipt, SubmissionSink, WizardSubmission,
    };
    use crate::errors::EngineError;
    use crate::notify::{InMemoryNotificationSink, NotificationKind};

    use super::{catalog, FileHandle, GateOutcome, StepId, Wizard};

    #[derive(Default)]
    struct RecordingSink {
        fail: bool,
        submissions: Mutex<Vec<WizardSubmission>>,
    }

    #[async_trait]
    impl SubmissionSink for RecordingSink {
        async fn submit(
            &self,
            submission: WizardSubmission,
        ) -> Result<SubmissionReceipt, RepositoryError> {
            if self.fail {
                return Err(RepositoryError::Unavailable("payment gateway down".to_owned()));
            }
            let mut submissions = self.submissions.lock().expect("lock");
            submissions.push(submission);
            Ok(SubmissionReceipt { reference: format!("SUB-{:04}", submissions.len()) })
        }
    }

    fn free_listing_at_contact() -> Wizard {
        let mut wizard = Wizard::new(catalog::listing()).expect("valid definition");
        wizard.open();
        wizard.set_branch_flag("listingType", "free").expect("open");
        wizard.advance().expect("plan -> details");
        wizard.set_field("businessName", "Blue Door Bakery").expect("open");
        wizard.set_field("category", "Bakery").expect("open");
        wizard.set_field("description", "Sourdough and pastries").expect("open");
        wizard
            .set_field("coverImage", FileHandle { name: "front.jpg".to_owned(), size_bytes: 4096 })
            .expect("open");
        wizard.advance().expect("details -> contact");
        wizard.set_field("phone", "512-555-0134").expect("open");
        wizard.set_field("email", "hello@bluedoor.example").expect("open");
        wizard.set_field("address", "12 Main St").expect("open");
        wizard
    }

    #[test]
    fn operations_need_an_open_session() {
        let mut wizard = Wizard::new(catalog::signup()).expect("valid definition");

        assert_eq!(wizard.advance(), Err(EngineError::NoSession));
        assert_eq!(wizard.set_field("email", "a@b.example"), Err(EngineError::NoSession));
        assert!(wizard.cancel().is_none());
        assert!(wizard.progress().is_none());
    }

    #[test]
    fn cancel_discards_everything() {
        let mut wizard = free_listing_at_contact();
        let discarded = wizard.cancel().expect("session was open");

        assert_eq!(discarded.current_step, StepId::from("contact"));
        assert!(!wizard.is_open());
        assert_eq!(wizard.open().fields.len(), 0);
        assert_eq!(wizard.current_step(), Some(&StepId::from("plan")));
    }

    #[tokio::test]
    async fn submit_hands_over_fields_and_closes() {
        let mut wizard = free_listing_at_contact();
        let sink = RecordingSink::default();
        let notifier = InMemoryNotificationSink::default();

        let receipt = wizard.submit(&sink, &notifier).await.expect("submit");

        assert_eq!(receipt.reference, "SUB-0001");
        assert!(!wizard.is_open());
        let submissions = sink.submissions.lock().expect("lock");
        assert_eq!(submissions[0].wizard, "listing");
        assert_eq!(submissions[0].fields.len(), 7);
        assert_eq!(
            submissions[0].visited_steps,
            vec![StepId::from("plan"), StepId::from("details"), StepId::from("contact")]
        );
        assert_eq!(notifier.notifications()[0].kind, NotificationKind::Success);
    }

    #[tokio::test]
    async fn submit_before_last_step_is_refused() {
        let mut wizard = Wizard::new(catalog::listing()).expect("valid definition");
        wizard.open();
        wizard.set_branch_flag("listingType", "paid").expect("open");
        let sink = RecordingSink::default();
        let notifier = InMemoryNotificationSink::default();

        let error = wizard.submit(&sink, &notifier).await.expect_err("not terminal");

        assert_eq!(error, EngineError::StepsRemaining { step: StepId::from("plan") });
        assert!(wizard.is_open());
        assert!(notifier.notifications().is_empty());
    }

    #[tokio::test]
    async fn submit_checks_the_last_step_gate() {
        let mut wizard = free_listing_at_contact();
        wizard.set_field("address", "").expect("open");
        let sink = RecordingSink::default();
        let notifier = InMemoryNotificationSink::default();

        let error = wizard.submit(&sink, &notifier).await.expect_err("address missing");

        assert_eq!(error, EngineError::ValidationFailed { fields: vec!["address".to_owned()] });
        assert!(sink.submissions.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn failed_submission_keeps_session_for_retry() {
        let mut wizard = free_listing_at_contact();
        let sink = RecordingSink { fail: true, ..RecordingSink::default() };
        let notifier = InMemoryNotificationSink::default();

        let error = wizard.submit(&sink, &notifier).await.expect_err("sink down");

        assert!(error.is_external());
        assert!(wizard.is_open());
        assert_eq!(wizard.current_step(), Some(&StepId::from("contact")));
        assert_eq!(wizard.can_advance(), Ok(GateOutcome::Ok));
        assert_eq!(notifier.notifications()[0].kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn close_on_failure_policy_discards_session() {
        let mut wizard =
            free_listing_at_contact().with_policy(CommitPolicy { close_on_failure: true });
        let sink = RecordingSink { fail: true, ..RecordingSink::default() };
        let notifier = InMemoryNotificationSink::default();

        let _ = wizard.submit(&sink, &notifier).await;

        assert!(!wizard.is_open());
    }

    #[tokio::test]
    async fn submit_rechecks_steps_already_passed() {
        let mut wizard = free_listing_at_contact();
        wizard.set_field("businessName", "  ").expect("open");
        let sink = RecordingSink::default();
        let notifier = InMemoryNotificationSink::default();

        let error = wizard.submit(&sink, &notifier).await.expect_err("name cleared");

        assert_eq!(error, EngineError::ValidationFailed { fields: vec!["businessName".to_owned()] });
        assert!(wizard.is_open());
        assert!(sink.submissions.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn switching_to_paid_after_details_requires_offer_fields() {
        let mut wizard = free_listing_at_contact();
        wizard.set_branch_flag("listingType", "paid").expect("contact stays visible");
        wizard.advance().expect("contact -> payment");
        for (field, value) in [
            ("cardholderName", "Priya Natarajan"),
            ("cardNumber", "4242424242424242"),
            ("expiry", "12/29"),
            ("cvc", "123"),
        ] {
            wizard.set_field(field, value).expect("open");
        }
        let sink = RecordingSink::default();
        let notifier = InMemoryNotificationSink::default();

        let error = wizard.submit(&sink, &notifier).await.expect_err("offer missing");

        assert_eq!(
            error,
            EngineError::ValidationFailed {
                fields: vec![
                    "offerTitle".to_owned(),
                    "offerDetails".to_owned(),
                    "couponCode".to_owned(),
                ]
            }
        );
        assert!(sink.submissions.lock().expect("lock").is_empty());
    }

    #[test]
    fn flag_hiding_the_open_step_is_refused() {
        let mut wizard = Wizard::new(catalog::signup()).expect("valid definition");
        wizard.open();
        wizard.set_branch_flag("role", "distributor").expect("open");
        wizard.advance().expect("role -> account");
        wizard.set_field("fullName", "Marco Alvarez").expect("open");
        wizard.set_field("email", "marco@northwind.example").expect("open");
        wizard.set_field("password", "s3cret-pass").expect("open");
        wizard.advance().expect("account -> organization");

        let error = wizard.set_branch_flag("role", "business").expect_err("hides organization");

        assert_eq!(
            error,
            EngineError::FlagHidesCurrentStep {
                step: StepId::from("organization"),
                flag: "role".to_owned(),
            }
        );
        assert_eq!(wizard.current_step(), Some(&StepId::from("organization")));
        assert_eq!(wizard.retreat(), Ok(StepId::from("account")));
        wizard.set_branch_flag("role", "business").expect("account stays visible");
        assert_eq!(wizard.advance(), Ok(StepId::from("confirm")));
        assert_eq!(wizard.retreat(), Ok(StepId::from("account")));
    }
}
