//! Governance storage trait.

use crate::StoreError;
use civitas_types::ProposalId;

/// Trait for storing governance state (proposal records and engine metadata).
///
/// Methods take `&self`: backends provide their own interior mutability and
/// write serialization, matching how the hosting ledger commits a call.
pub trait GovernanceStore {
    /// Store an encoded proposal record.
    fn put_proposal(&self, id: ProposalId, data: &[u8]) -> Result<(), StoreError>;

    /// Get an encoded proposal record.
    fn get_proposal(&self, id: ProposalId) -> Result<Vec<u8>, StoreError>;

    /// Store an opaque metadata blob under a string key.
    fn put_meta(&self, key: &str, data: &[u8]) -> Result<(), StoreError>;

    /// Get a metadata blob, or `None` if the key was never written.
    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
}
