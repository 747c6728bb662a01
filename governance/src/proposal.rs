//! Governance proposals and their lifecycle.
//!
//! Only two lifecycle facts are stored (`canceled`, `executed`) plus the
//! execution arming time. Every other state is derived on read from the
//! tallies, the current time and the current parameters, so no background
//! job is needed to move proposals along.

use civitas_types::{AccountId, ContentHash, GovernanceParams, ProposalId, Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Computed lifecycle state of a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    /// Created, voting delay not yet elapsed.
    Pending,
    /// Voting window open (inclusive at both ends).
    Active,
    /// Canceled by the proposer or the owner. Terminal.
    Canceled,
    /// Voting closed without quorum, or `for <= against`.
    Defeated,
    /// Voting closed with quorum and `for > against`; not yet armed.
    Succeeded,
    /// Armed for execution; waiting for or inside the execution window.
    Queued,
    /// Armed but not executed before the execution window closed.
    Expired,
    /// Action carried out. Terminal.
    Executed,
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Canceled => "canceled",
            Self::Defeated => "defeated",
            Self::Succeeded => "succeeded",
            Self::Queued => "queued",
            Self::Expired => "expired",
            Self::Executed => "executed",
        };
        f.write_str(name)
    }
}

/// What a proposal does when executed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionTarget {
    /// Amend the governance parameters themselves. The payload is an encoded
    /// [`ParameterCall`](crate::params::ParameterCall).
    ParameterStore,
    /// Any external action, handed to the [`Executor`](crate::host::Executor) verbatim.
    External(AccountId),
}

impl fmt::Display for ActionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParameterStore => f.write_str("parameter-store"),
            Self::External(target) => write!(f, "{target}"),
        }
    }
}

/// Caller-supplied body of a new proposal.
#[derive(Clone, Debug)]
pub struct ProposalDraft {
    pub title: String,
    pub description: String,
    pub target: ActionTarget,
    pub payload: Vec<u8>,
    pub value: TokenAmount,
}

impl ProposalDraft {
    /// Digest over every field, in declaration order.
    pub fn content_hash(&self) -> ContentHash {
        let target = self.target.to_string();
        let value = self.value.raw().to_le_bytes();
        ContentHash::digest([
            self.title.as_bytes(),
            self.description.as_bytes(),
            target.as_bytes(),
            self.payload.as_slice(),
            value.as_slice(),
        ])
    }
}

/// Weighted vote totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub for_votes: TokenAmount,
    pub against_votes: TokenAmount,
    pub abstain_votes: TokenAmount,
}

impl Tally {
    /// Participation counted toward quorum: for + against + abstain.
    pub fn total(&self) -> TokenAmount {
        self.for_votes
            .saturating_add(self.against_votes)
            .saturating_add(self.abstain_votes)
    }
}

/// A governance proposal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub proposer: AccountId,
    pub target: ActionTarget,
    pub payload: Vec<u8>,
    pub value: TokenAmount,
    pub content_hash: ContentHash,
    pub tally: Tally,
    pub created_at: Timestamp,
    /// Voting opens here. Also the vote-weight snapshot time.
    pub start_time: Timestamp,
    /// Voting closes after this instant.
    pub end_time: Timestamp,
    pub executed: bool,
    pub canceled: bool,
    /// Earliest execution time, set on the first execute call.
    pub armed_at: Option<Timestamp>,
}

impl Proposal {
    /// Instant at which every voter's weight is evaluated.
    pub fn snapshot_time(&self) -> Timestamp {
        self.start_time
    }

    /// Derive the lifecycle state at `now` under `params`.
    ///
    /// Pure: depends only on the stored fields, `now` and the parameters.
    pub fn state(&self, now: Timestamp, params: &GovernanceParams) -> ProposalState {
        if self.canceled {
            return ProposalState::Canceled;
        }
        if self.executed {
            return ProposalState::Executed;
        }
        if now < self.start_time {
            return ProposalState::Pending;
        }
        if now <= self.end_time {
            return ProposalState::Active;
        }
        if self.tally.total() < params.quorum_threshold {
            return ProposalState::Defeated;
        }
        if self.tally.for_votes <= self.tally.against_votes {
            return ProposalState::Defeated;
        }
        match self.armed_at {
            None => ProposalState::Succeeded,
            Some(eta) if eta.has_expired(params.execution_delay_secs, now) => {
                ProposalState::Expired
            }
            Some(_) => ProposalState::Queued,
        }
    }
}
