//! Nullable store: thread-safe in-memory governance storage for testing.

use crate::lock;
use civitas_store::{GovernanceStore, StoreError};
use civitas_types::ProposalId;
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory [`GovernanceStore`].
pub struct NullGovernanceStore {
    proposals: Mutex<HashMap<ProposalId, Vec<u8>>>,
    meta: Mutex<HashMap<String, Vec<u8>>>,
}

impl NullGovernanceStore {
    pub fn new() -> Self {
        Self {
            proposals: Mutex::new(HashMap::new()),
            meta: Mutex::new(HashMap::new()),
        }
    }

    /// Drop a stored proposal record (to simulate a damaged backend).
    pub fn remove_proposal(&self, id: ProposalId) {
        lock(&self.proposals).remove(&id);
    }
}

impl Default for NullGovernanceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GovernanceStore for NullGovernanceStore {
    fn put_proposal(&self, id: ProposalId, data: &[u8]) -> Result<(), StoreError> {
        lock(&self.proposals).insert(id, data.to_vec());
        Ok(())
    }

    fn get_proposal(&self, id: ProposalId) -> Result<Vec<u8>, StoreError> {
        lock(&self.proposals)
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("proposal {id}")))
    }

    fn put_meta(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        lock(&self.meta).insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(lock(&self.meta).get(key).cloned())
    }
}
