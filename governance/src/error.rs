use crate::proposal::ProposalState;
use civitas_store::StoreError;
use civitas_types::{AccountId, CivitasError, ProposalId, Timestamp, TokenAmount};
use thiserror::Error;

/// Failure reported by an [`Executor`](crate::host::Executor) when a
/// governed action cannot be carried out.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("target {0} is not known to the executor")]
    UnknownTarget(AccountId),

    #[error("action reverted: {0}")]
    Reverted(String),
}

#[derive(Debug, Error)]
pub enum GovernanceError {
    // ── Preconditions ────────────────────────────────────────────────────
    #[error("governance has not been initialized")]
    NotInitialized,

    #[error("governance is already initialized")]
    AlreadyInitialized,

    #[error("invalid vote support code {0} (expected 0, 1 or 2)")]
    InvalidSupport(u8),

    #[error("proposal {id} is {state}; cannot {action}")]
    InvalidState {
        id: ProposalId,
        state: ProposalState,
        action: &'static str,
    },

    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("invalid governance parameters: {0}")]
    InvalidParams(String),

    #[error("invalid proposal action: {0}")]
    InvalidAction(String),

    #[error("checkpoint for {account} at {at} precedes latest checkpoint at {latest}")]
    CheckpointOutOfOrder {
        account: AccountId,
        at: Timestamp,
        latest: Timestamp,
    },

    // ── Authorization ────────────────────────────────────────────────────
    #[error("voting power below proposal threshold: have {have}, need {need}")]
    BelowProposalThreshold { have: TokenAmount, need: TokenAmount },

    #[error("{0} is neither the proposer nor the owner")]
    NotProposerOrOwner(AccountId),

    #[error("{0} is not the owner")]
    NotOwner(AccountId),

    #[error("parameters can only be changed by an executed proposal (caller {0})")]
    NotGovernance(AccountId),

    // ── Duplicate actions ────────────────────────────────────────────────
    #[error("{voter} has already voted on proposal {proposal}")]
    AlreadyVoted {
        proposal: ProposalId,
        voter: AccountId,
    },

    // ── Zero effect ──────────────────────────────────────────────────────
    #[error("{0} has no voting power at the proposal snapshot")]
    ZeroWeight(AccountId),

    // ── Collaborators ────────────────────────────────────────────────────
    #[error("execution failed: {0}")]
    ExecutionFailed(#[from] ExecutorError),

    #[error("arithmetic overflow in governance computation")]
    Overflow,

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("encoding error: {0}")]
    Codec(String),
}

/// Coarse classification of a [`GovernanceError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Precondition,
    Authorization,
    Duplicate,
    ZeroEffect,
    Execution,
    Arithmetic,
    Storage,
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotInitialized
            | Self::AlreadyInitialized
            | Self::InvalidSupport(_)
            | Self::InvalidState { .. }
            | Self::ProposalNotFound(_)
            | Self::InvalidParams(_)
            | Self::InvalidAction(_)
            | Self::CheckpointOutOfOrder { .. } => ErrorKind::Precondition,
            Self::BelowProposalThreshold { .. }
            | Self::NotProposerOrOwner(_)
            | Self::NotOwner(_)
            | Self::NotGovernance(_) => ErrorKind::Authorization,
            Self::AlreadyVoted { .. } => ErrorKind::Duplicate,
            Self::ZeroWeight(_) => ErrorKind::ZeroEffect,
            Self::ExecutionFailed(_) => ErrorKind::Execution,
            Self::Overflow => ErrorKind::Arithmetic,
            Self::Store(_) | Self::Codec(_) => ErrorKind::Storage,
        }
    }
}

impl From<CivitasError> for GovernanceError {
    fn from(e: CivitasError) -> Self {
        match e {
            CivitasError::InvalidParams(msg) => Self::InvalidParams(msg),
            other => Self::InvalidAction(other.to_string()),
        }
    }
}

impl From<bincode::Error> for GovernanceError {
    fn from(e: bincode::Error) -> Self {
        Self::Codec(e.to_string())
    }
}
