//! Abstract storage traits for the Civitas governance engine.
//!
//! Every storage backend (embedded KV, ledger state trie, in-memory for testing)
//! implements these traits. The engine depends only on the traits and hands
//! them opaque, already-encoded bytes.

pub mod error;
pub mod governance;

pub use error::StoreError;
pub use governance::GovernanceStore;
