//! Token-weighted governance for Civitas.
//!
//! Lifecycle: Pending → Active → Succeeded/Defeated → Queued → Executed/Expired,
//! with Canceled reachable from Pending or Active.
//!
//! Key principle: vote weight is balance-weighted and read from history. Every
//! voter on a proposal is weighed at the same instant (the moment voting opens),
//! so moving tokens after that instant changes nothing.
//! All governance parameters are governable, including the thresholds themselves.

pub mod checkpoint;
pub mod config;
pub mod delegation;
pub mod engine;
pub mod error;
pub mod host;
pub mod params;
pub mod proposal;
pub mod scheduler;
pub mod voting;

pub use checkpoint::{Checkpoint, CheckpointLedger, Lookup};
pub use config::GovernorConfig;
pub use delegation::{DelegationDirectory, DelegationRecord};
pub use engine::{ExecutionOutcome, Governor, GOVERNOR_STATE_META_KEY};
pub use error::{ErrorKind, ExecutorError, GovernanceError};
pub use host::{
    BalanceSource, DiscardEvents, EventSink, Executor, FixedOwner, GovernanceEvent, Host,
    OwnerGate,
};
pub use params::{GovernableParam, Origin, ParameterCall, ParameterStore};
pub use proposal::{ActionTarget, Proposal, ProposalDraft, ProposalState, Tally};
pub use voting::{Vote, VoteSupport};
