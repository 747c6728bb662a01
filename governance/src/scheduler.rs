//! Execution scheduler: the arm-then-execute timelock.
//!
//! The first execute call on a succeeded proposal only arms it: the earliest
//! execution time becomes `now + execution_delay`. Calls before that time are
//! successful no-ops that never move the time. The first call at or after it
//! runs the action. A proposal left armed for another full `execution_delay`
//! reads as expired.

use crate::error::GovernanceError;
use crate::proposal::{Proposal, ProposalState};
use civitas_types::{GovernanceParams, Timestamp};

/// What an execute call should do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionStep {
    /// Not armed yet: arm with this earliest execution time.
    Arm { eta: Timestamp },
    /// Armed, delay still running.
    Wait { eta: Timestamp },
    /// Armed and due: run the action now.
    Run { eta: Timestamp },
}

/// Decide the next step for `proposal` at `now`.
///
/// Fails unless the proposal is `Succeeded` or `Queued`.
pub fn next_step(
    proposal: &Proposal,
    now: Timestamp,
    params: &GovernanceParams,
) -> Result<ExecutionStep, GovernanceError> {
    let state = proposal.state(now, params);
    match (state, proposal.armed_at) {
        (ProposalState::Succeeded, None) => {
            let eta = now
                .checked_add_secs(params.execution_delay_secs)
                .ok_or(GovernanceError::Overflow)?;
            Ok(ExecutionStep::Arm { eta })
        }
        (ProposalState::Queued, Some(eta)) if now >= eta => Ok(ExecutionStep::Run { eta }),
        (ProposalState::Queued, Some(eta)) => Ok(ExecutionStep::Wait { eta }),
        (state, _) => Err(GovernanceError::InvalidState {
            id: proposal.id,
            state,
            action: "execute",
        }),
    }
}
