//! Fundamental types for the Civitas governance engine.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account identities, token amounts, timestamps, proposal ids, content hashes,
//! and the governance parameter record.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod id;
pub mod params;
pub mod time;

pub use address::AccountId;
pub use amount::TokenAmount;
pub use error::CivitasError;
pub use hash::ContentHash;
pub use id::ProposalId;
pub use params::GovernanceParams;
pub use time::Timestamp;
