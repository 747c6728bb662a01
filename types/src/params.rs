//! Governance parameters: the five tunable values of the voting engine.
//!
//! Every field is itself governable: the record is only ever replaced by an
//! executed proposal that targets the parameter store.

use crate::amount::TokenAmount;
use crate::error::CivitasError;
use serde::{Deserialize, Serialize};

const DAY_SECS: u64 = 24 * 3600;

/// The governance parameter record.
///
/// Durations are in ledger seconds, thresholds in raw token units.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Seconds between proposal creation and the start of voting.
    /// The vote-weight snapshot is taken at the end of this delay.
    #[serde(default = "default_voting_delay")]
    pub voting_delay_secs: u64,

    /// Length of the voting window in seconds. Must be non-zero.
    #[serde(default = "default_voting_period")]
    pub voting_period_secs: u64,

    /// Minimum voting power required to create a proposal.
    #[serde(default)]
    pub proposal_threshold: TokenAmount,

    /// Minimum total participation (for + against + abstain) for an outcome to count.
    #[serde(default)]
    pub quorum_threshold: TokenAmount,

    /// Waiting period between arming a succeeded proposal and its execution.
    /// Also the length of the execution grace window before it expires.
    #[serde(default = "default_execution_delay")]
    pub execution_delay_secs: u64,

    /// Bumped every time the record is replaced through governance.
    #[serde(default)]
    pub version: u64,
}

fn default_voting_delay() -> u64 {
    DAY_SECS
}

fn default_voting_period() -> u64 {
    7 * DAY_SECS
}

fn default_execution_delay() -> u64 {
    2 * DAY_SECS
}

impl GovernanceParams {
    /// Check the record for values that would break proposal invariants.
    pub fn validate(&self) -> Result<(), CivitasError> {
        if self.voting_period_secs == 0 {
            return Err(CivitasError::InvalidParams(
                "voting period must be non-zero".to_string(),
            ));
        }
        // start = now + delay and end = start + period must both be representable
        // for any realistic ledger time.
        if self
            .voting_delay_secs
            .checked_add(self.voting_period_secs)
            .and_then(|span| span.checked_add(self.execution_delay_secs))
            .is_none()
        {
            return Err(CivitasError::InvalidParams(
                "delay + period + execution delay overflows".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            voting_delay_secs: default_voting_delay(),
            voting_period_secs: default_voting_period(),
            proposal_threshold: TokenAmount::ZERO,
            quorum_threshold: TokenAmount::ZERO,
            execution_delay_secs: default_execution_delay(),
            version: 0,
        }
    }
}
