//! External collaborators of the engine.
//!
//! The engine never moves tokens, never interprets action payloads and never
//! decides who the owner is. Each of those is a trait the host implements.

use crate::error::ExecutorError;
use crate::proposal::ActionTarget;
use crate::voting::VoteSupport;
use civitas_types::{AccountId, ContentHash, GovernanceParams, ProposalId, Timestamp, TokenAmount};

/// Source of live token balances, used to seed history for accounts that
/// have never had a checkpoint.
pub trait BalanceSource {
    fn raw_balance(&self, account: &AccountId) -> TokenAmount;
}

/// Carries out the action of an executed proposal.
pub trait Executor {
    /// Run the action. An `Err` aborts the execute call; the proposal stays
    /// executable so the call can be retried.
    fn invoke(
        &mut self,
        target: &AccountId,
        payload: &[u8],
        value: TokenAmount,
    ) -> Result<Vec<u8>, ExecutorError>;
}

/// Answers "is this caller the privileged owner".
pub trait OwnerGate {
    fn is_owner(&self, caller: &AccountId) -> bool;
}

/// Owner gate for a single fixed owner account.
#[derive(Clone, Debug)]
pub struct FixedOwner(pub AccountId);

impl OwnerGate for FixedOwner {
    fn is_owner(&self, caller: &AccountId) -> bool {
        &self.0 == caller
    }
}

/// Informational notifications. Nothing flows back into the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GovernanceEvent {
    ProposalCreated {
        id: ProposalId,
        proposer: AccountId,
        target: ActionTarget,
        content_hash: ContentHash,
        start_time: Timestamp,
        end_time: Timestamp,
    },
    ProposalCanceled {
        id: ProposalId,
        by: AccountId,
    },
    ProposalQueued {
        id: ProposalId,
        eta: Timestamp,
    },
    ProposalExecuted {
        id: ProposalId,
    },
    VoteCast {
        id: ProposalId,
        voter: AccountId,
        support: VoteSupport,
        weight: TokenAmount,
        reason: String,
    },
    DelegateChanged {
        delegator: AccountId,
        from: AccountId,
        to: AccountId,
    },
    ParametersUpdated {
        params: GovernanceParams,
    },
}

/// Receives [`GovernanceEvent`]s.
pub trait EventSink {
    fn emit(&mut self, event: GovernanceEvent);
}

/// Sink that drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardEvents;

impl EventSink for DiscardEvents {
    fn emit(&mut self, _event: GovernanceEvent) {}
}

/// The full set of collaborators an engine runs against.
pub struct Host {
    pub balances: Box<dyn BalanceSource>,
    pub executor: Box<dyn Executor>,
    pub events: Box<dyn EventSink>,
    pub owner_gate: Box<dyn OwnerGate>,
}
