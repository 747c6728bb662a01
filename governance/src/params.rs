//! Parameter store: the governance parameters, amendable only by governance.
//!
//! Reads are free. Writes require an [`Origin::Governed`] carrying an
//! [`ExecutionAuthority`], which only this crate can construct; the engine
//! hands one out exclusively while executing a proposal that targets
//! [`ActionTarget::ParameterStore`](crate::proposal::ActionTarget::ParameterStore).

use crate::error::GovernanceError;
use civitas_types::{AccountId, GovernanceParams, TokenAmount};
use serde::{Deserialize, Serialize};

/// One of the governable parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GovernableParam {
    VotingDelaySecs,
    VotingPeriodSecs,
    ProposalThreshold,
    QuorumThreshold,
    ExecutionDelaySecs,
}

impl GovernableParam {
    /// Human-readable name of this parameter.
    pub fn name(&self) -> &'static str {
        match self {
            Self::VotingDelaySecs => "voting_delay_secs",
            Self::VotingPeriodSecs => "voting_period_secs",
            Self::ProposalThreshold => "proposal_threshold",
            Self::QuorumThreshold => "quorum_threshold",
            Self::ExecutionDelaySecs => "execution_delay_secs",
        }
    }

    /// Current value of this parameter, widened to u128.
    pub fn read(&self, params: &GovernanceParams) -> u128 {
        match self {
            Self::VotingDelaySecs => params.voting_delay_secs as u128,
            Self::VotingPeriodSecs => params.voting_period_secs as u128,
            Self::ProposalThreshold => params.proposal_threshold.raw(),
            Self::QuorumThreshold => params.quorum_threshold.raw(),
            Self::ExecutionDelaySecs => params.execution_delay_secs as u128,
        }
    }

    fn write(&self, params: &mut GovernanceParams, value: u128) -> Result<(), GovernanceError> {
        let secs = || {
            u64::try_from(value).map_err(|_| {
                GovernanceError::InvalidParams(format!("{} does not fit in u64", self.name()))
            })
        };
        match self {
            Self::VotingDelaySecs => params.voting_delay_secs = secs()?,
            Self::VotingPeriodSecs => params.voting_period_secs = secs()?,
            Self::ProposalThreshold => params.proposal_threshold = TokenAmount::new(value),
            Self::QuorumThreshold => params.quorum_threshold = TokenAmount::new(value),
            Self::ExecutionDelaySecs => params.execution_delay_secs = secs()?,
        }
        Ok(())
    }
}

/// Payload of a proposal targeting the parameter store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterCall {
    /// Replace the whole record. `version` in the supplied record is ignored.
    ReplaceAll(GovernanceParams),
    /// Change a single parameter.
    Set { param: GovernableParam, value: u128 },
}

impl ParameterCall {
    pub fn encode(&self) -> Result<Vec<u8>, GovernanceError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(payload: &[u8]) -> Result<Self, GovernanceError> {
        bincode::deserialize(payload)
            .map_err(|e| GovernanceError::InvalidAction(format!("bad parameter call: {e}")))
    }

    /// The record that results from applying this call to `current`.
    pub fn apply_to(
        &self,
        current: &GovernanceParams,
    ) -> Result<GovernanceParams, GovernanceError> {
        let mut next = match self {
            Self::ReplaceAll(params) => params.clone(),
            Self::Set { param, value } => {
                let mut next = current.clone();
                param.write(&mut next, *value)?;
                next
            }
        };
        next.version = current.version.checked_add(1).ok_or(GovernanceError::Overflow)?;
        next.validate()?;
        Ok(next)
    }
}

/// Proof that a write comes from proposal execution.
#[derive(Debug)]
pub struct ExecutionAuthority {
    _private: (),
}

impl ExecutionAuthority {
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }
}

/// Who is asking to write the parameter store.
#[derive(Debug)]
pub enum Origin {
    /// A plain account. Always refused.
    Account(AccountId),
    /// The execution path of a succeeded proposal.
    Governed(ExecutionAuthority),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ParameterStore {
    current: GovernanceParams,
}

impl ParameterStore {
    pub fn new(initial: GovernanceParams) -> Self {
        Self { current: initial }
    }

    pub fn get(&self) -> &GovernanceParams {
        &self.current
    }

    /// Replace the record. Only [`Origin::Governed`] is accepted.
    pub fn update(
        &mut self,
        origin: &Origin,
        next: GovernanceParams,
    ) -> Result<&GovernanceParams, GovernanceError> {
        match origin {
            Origin::Account(caller) => Err(GovernanceError::NotGovernance(caller.clone())),
            Origin::Governed(_) => {
                next.validate()?;
                self.current = next;
                Ok(&self.current)
            }
        }
    }
}
