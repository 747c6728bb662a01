//! Vote records: at most one per (proposal, voter).

use crate::error::GovernanceError;
use crate::proposal::Tally;
use civitas_types::{AccountId, ProposalId, Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How a vote is counted. The discriminants are the wire support codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VoteSupport {
    Against = 0,
    For = 1,
    Abstain = 2,
}

impl TryFrom<u8> for VoteSupport {
    type Error = GovernanceError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Against),
            1 => Ok(Self::For),
            2 => Ok(Self::Abstain),
            other => Err(GovernanceError::InvalidSupport(other)),
        }
    }
}

impl From<VoteSupport> for u8 {
    fn from(support: VoteSupport) -> Self {
        support as u8
    }
}

/// A cast vote. Immutable once recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub support: VoteSupport,
    pub weight: TokenAmount,
    pub reason: String,
    pub cast_at: Timestamp,
}

impl Tally {
    /// The tally after adding `weight` to the `support` column.
    pub fn with_vote(
        &self,
        support: VoteSupport,
        weight: TokenAmount,
    ) -> Result<Tally, GovernanceError> {
        let mut next = *self;
        let column = match support {
            VoteSupport::Against => &mut next.against_votes,
            VoteSupport::For => &mut next.for_votes,
            VoteSupport::Abstain => &mut next.abstain_votes,
        };
        *column = column.checked_add(weight).ok_or(GovernanceError::Overflow)?;
        Ok(next)
    }
}

/// All votes, grouped by proposal.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VoteBook {
    votes: HashMap<ProposalId, HashMap<AccountId, Vote>>,
}

impl VoteBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_voted(&self, proposal: ProposalId, voter: &AccountId) -> bool {
        self.get(proposal, voter).is_some()
    }

    pub fn get(&self, proposal: ProposalId, voter: &AccountId) -> Option<&Vote> {
        self.votes.get(&proposal).and_then(|m| m.get(voter))
    }

    /// Fail with [`GovernanceError::AlreadyVoted`] if the pair already voted.
    pub fn ensure_not_voted(
        &self,
        proposal: ProposalId,
        voter: &AccountId,
    ) -> Result<(), GovernanceError> {
        if self.has_voted(proposal, voter) {
            return Err(GovernanceError::AlreadyVoted {
                proposal,
                voter: voter.clone(),
            });
        }
        Ok(())
    }

    /// Insert a vote. The pair must not have voted before.
    pub fn record(
        &mut self,
        proposal: ProposalId,
        voter: &AccountId,
        vote: Vote,
    ) -> Result<(), GovernanceError> {
        self.ensure_not_voted(proposal, voter)?;
        self.votes
            .entry(proposal)
            .or_default()
            .insert(voter.clone(), vote);
        Ok(())
    }

    /// Votes on one proposal, ordered by voter.
    pub fn votes_on(&self, proposal: ProposalId) -> Vec<(&AccountId, &Vote)> {
        let mut out: Vec<(&AccountId, &Vote)> = self
            .votes
            .get(&proposal)
            .map(|m| m.iter().collect())
            .unwrap_or_default();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    pub fn vote_count(&self, proposal: ProposalId) -> usize {
        self.votes.get(&proposal).map(|m| m.len()).unwrap_or(0)
    }
}
