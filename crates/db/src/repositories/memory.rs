use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use listly_core::commit::{
    EntityRepository, RepositoryError, SubmissionReceipt, SubmissionSink, WizardSubmission,
};
use listly_core::domain::entity::{Entity, EntityId, EntityStatus};

/// Mock data source for one entity kind, ordered by id.
pub struct InMemoryEntityRepository<E: Entity> {
    entities: RwLock<BTreeMap<String, E>>,
    offline: AtomicBool,
}

impl<E: Entity> Default for InMemoryEntityRepository<E> {
    fn default() -> Self {
        Self { entities: RwLock::new(BTreeMap::new()), offline: AtomicBool::new(false) }
    }
}

impl<E: Entity> InMemoryEntityRepository<E> {
    pub fn with_entities(entities: impl IntoIterator<Item = E>) -> Self {
        let entities =
            entities.into_iter().map(|entity| (entity.id().0.clone(), entity)).collect();
        Self { entities: RwLock::new(entities), offline: AtomicBool::new(false) }
    }

    pub async fn list(&self) -> Vec<E> {
        self.entities.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }

    /// Makes every call fail with `Unavailable` until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(format!("{} store is offline", E::KIND)));
        }
        Ok(())
    }
}

fn not_found<E: Entity>(id: &EntityId) -> RepositoryError {
    RepositoryError::NotFound { kind: E::KIND, id: id.clone() }
}

#[async_trait]
impl<E: Entity> EntityRepository<E> for InMemoryEntityRepository<E> {
    async fn get(&self, id: &EntityId) -> Result<Option<E>, RepositoryError> {
        self.ensure_online()?;
        let entities = self.entities.read().await;
        Ok(entities.get(&id.0).cloned())
    }

    async fn update(&self, id: &EntityId, patch: E::Patch) -> Result<E, RepositoryError> {
        self.ensure_online()?;
        let mut entities = self.entities.write().await;
        let entity = entities.get_mut(&id.0).ok_or_else(|| not_found::<E>(id))?;
        entity.apply_patch(&patch);
        debug!(event_name = "store.entity_updated", kind = %E::KIND, entity_id = %id, "entity updated");
        Ok(entity.clone())
    }

    async fn remove(&self, id: &EntityId) -> Result<(), RepositoryError> {
        self.ensure_online()?;
        let mut entities = self.entities.write().await;
        entities.remove(&id.0).ok_or_else(|| not_found::<E>(id))?;
        debug!(event_name = "store.entity_removed", kind = %E::KIND, entity_id = %id, "entity removed");
        Ok(())
    }

    async fn set_status(&self, id: &EntityId, status: EntityStatus) -> Result<(), RepositoryError> {
        self.ensure_online()?;
        let mut entities = self.entities.write().await;
        let entity = entities.get_mut(&id.0).ok_or_else(|| not_found::<E>(id))?;
        if !entity.apply_status(&status) {
            return Err(RepositoryError::Unsupported { kind: E::KIND, id: id.clone(), status });
        }
        debug!(
            event_name = "store.status_changed",
            kind = %E::KIND,
            entity_id = %id,
            status = ?status,
            "entity status changed"
        );
        Ok(())
    }
}

/// Records finished wizards and hands out sequential `SUB-0001` style receipts.
#[derive(Default)]
pub struct InMemorySubmissionStore {
    submissions: RwLock<Vec<(SubmissionReceipt, WizardSubmission)>>,
    offline: AtomicBool,
}

impl InMemorySubmissionStore {
    pub async fn submissions(&self) -> Vec<(SubmissionReceipt, WizardSubmission)> {
        self.submissions.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.submissions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.submissions.read().await.is_empty()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl SubmissionSink for InMemorySubmissionStore {
    async fn submit(
        &self,
        submission: WizardSubmission,
    ) -> Result<SubmissionReceipt, RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable("submission store is offline".to_owned()));
        }

        let mut submissions = self.submissions.write().await;
        let receipt = SubmissionReceipt { reference: format!("SUB-{:04}", submissions.len() + 1) };
        debug!(
            event_name = "store.submission_recorded",
            wizard = %submission.wizard,
            reference = %receipt.reference,
            "wizard submission recorded"
        );
        submissions.push((receipt.clone(), submission));
        Ok(receipt)
    }
}
