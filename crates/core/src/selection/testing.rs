use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::commit::{EntityRepository, RepositoryError};
use crate::domain::entity::{Entity, EntityId, EntityStatus};

/// Repository fake that counts writes and can be switched offline.
pub struct MemoryRepository<E: Entity> {
    entities: Mutex<BTreeMap<EntityId, E>>,
    writes: Mutex<Vec<&'static str>>,
    offline: Mutex<bool>,
}

impl<E: Entity> MemoryRepository<E> {
    pub fn with(entities: Vec<E>) -> Self {
        Self {
            entities: Mutex::new(
                entities.into_iter().map(|entity| (entity.id().clone(), entity)).collect(),
            ),
            writes: Mutex::new(Vec::new()),
            offline: Mutex::new(false),
        }
    }

    pub fn stored(&self, id: &str) -> Option<E> {
        self.entities.lock().expect("lock").get(&EntityId::from(id)).cloned()
    }

    pub fn writes(&self) -> Vec<&'static str> {
        self.writes.lock().expect("lock").clone()
    }

    pub fn status_writes(&self) -> usize {
        self.writes().iter().filter(|write| **write == "set_status").count()
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().expect("lock") = offline;
    }

    fn check_online(&self) -> Result<(), RepositoryError> {
        if *self.offline.lock().expect("lock") {
            return Err(RepositoryError::Unavailable("connection refused".to_owned()));
        }
        Ok(())
    }

    fn record(&self, write: &'static str) {
        self.writes.lock().expect("lock").push(write);
    }

    fn not_found(id: &EntityId) -> RepositoryError {
        RepositoryError::NotFound { kind: E::KIND, id: id.clone() }
    }
}

#[async_trait]
impl<E: Entity> EntityRepository<E> for MemoryRepository<E> {
    async fn get(&self, id: &EntityId) -> Result<Option<E>, RepositoryError> {
        self.check_online()?;
        Ok(self.entities.lock().expect("lock").get(id).cloned())
    }

    async fn update(&self, id: &EntityId, patch: E::Patch) -> Result<E, RepositoryError> {
        self.check_online()?;
        self.record("update");
        let mut entities = self.entities.lock().expect("lock");
        let entity = entities.get_mut(id).ok_or_else(|| Self::not_found(id))?;
        entity.apply_patch(&patch);
        Ok(entity.clone())
    }

    async fn remove(&self, id: &EntityId) -> Result<(), RepositoryError> {
        self.check_online()?;
        self.record("remove");
        self.entities.lock().expect("lock").remove(id).map(|_| ()).ok_or_else(|| Self::not_found(id))
    }

    async fn set_status(&self, id: &EntityId, status: EntityStatus) -> Result<(), RepositoryError> {
        self.check_online()?;
        self.record("set_status");
        let mut entities = self.entities.lock().expect("lock");
        let entity = entities.get_mut(id).ok_or_else(|| Self::not_found(id))?;
        if entity.apply_status(&status) {
            Ok(())
        } else {
            Err(RepositoryError::Unsupported { kind: E::KIND, id: id.clone(), status })
        }
    }
}
