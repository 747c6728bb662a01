//! Core governance engine: proposals, votes, delegation and execution.
//!
//! Every public mutator is atomic: all checks run before the first write, so
//! a returned error never leaves partial state behind. The hosting ledger is
//! expected to serialize calls; the engine itself takes `&mut self` and holds
//! no locks.

use crate::checkpoint::{Checkpoint, CheckpointLedger, Lookup};
use crate::config::GovernorConfig;
use crate::delegation::{DelegationDirectory, DelegationRecord};
use crate::error::GovernanceError;
use crate::host::{BalanceSource, EventSink, Executor, FixedOwner, GovernanceEvent, Host};
use crate::params::{ExecutionAuthority, Origin, ParameterCall, ParameterStore};
use crate::proposal::{ActionTarget, Proposal, ProposalDraft, ProposalState};
use crate::scheduler::{self, ExecutionStep};
use crate::voting::{Vote, VoteBook, VoteSupport};
use civitas_store::{GovernanceStore, StoreError};
use civitas_types::{AccountId, GovernanceParams, ProposalId, Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Meta-store key used for persisting the engine state.
pub const GOVERNOR_STATE_META_KEY: &str = "governor_state";

/// Result of a successful [`Governor::execute_proposal`] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// The proposal was armed; it can run from `eta`.
    Queued { eta: Timestamp },
    /// Already armed and `eta` not reached. Nothing changed.
    Waiting { eta: Timestamp },
    /// The action ran. `output` is whatever the executor returned.
    Executed { output: Vec<u8> },
}

/// Everything the engine persists. Proposals are stored one record each.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct GovernorState {
    initialized: bool,
    params: ParameterStore,
    proposal_count: u64,
    #[serde(skip)]
    proposals: BTreeMap<ProposalId, Proposal>,
    votes: VoteBook,
    balances: CheckpointLedger,
    delegation: DelegationDirectory,
}

/// The governance engine.
pub struct Governor {
    host: Host,
    state: GovernorState,
}

impl Governor {
    /// Create an uninitialized engine. Call [`Governor::initialize`] before use.
    pub fn new(host: Host) -> Self {
        Self {
            host,
            state: GovernorState::default(),
        }
    }

    /// Build and initialize an engine from configuration, with the configured
    /// owner as the owner gate.
    pub fn from_config(
        config: &GovernorConfig,
        balances: Box<dyn BalanceSource>,
        executor: Box<dyn Executor>,
        events: Box<dyn EventSink>,
    ) -> Result<Self, GovernanceError> {
        let mut governor = Self::new(Host {
            balances,
            executor,
            events,
            owner_gate: Box::new(FixedOwner(config.owner.clone())),
        });
        governor.initialize(&config.owner, config.params.clone())?;
        Ok(governor)
    }

    /// One-time setup by the owner.
    pub fn initialize(
        &mut self,
        caller: &AccountId,
        params: GovernanceParams,
    ) -> Result<(), GovernanceError> {
        if self.state.initialized {
            return Err(GovernanceError::AlreadyInitialized);
        }
        if !self.host.owner_gate.is_owner(caller) {
            return Err(GovernanceError::NotOwner(caller.clone()));
        }
        params.validate()?;
        tracing::info!(owner = %caller, ?params, "governance initialized");
        self.state.params = ParameterStore::new(params);
        self.state.initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    fn ensure_initialized(&self) -> Result<(), GovernanceError> {
        if self.state.initialized {
            Ok(())
        } else {
            Err(GovernanceError::NotInitialized)
        }
    }

    // ── Balances ─────────────────────────────────────────────────────────

    /// Hook for the token contract: `account`'s held balance is now `new_balance`.
    ///
    /// Appends (or collapses) a held-balance checkpoint and moves the
    /// difference along the account's current delegation.
    pub fn record_balance_change(
        &mut self,
        account: &AccountId,
        new_balance: TokenAmount,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.state.balances.check_order(account, now)?;
        let old_balance = self.state.balances.latest_value(account);
        self.state
            .delegation
            .on_balance_change(account, old_balance, new_balance, now)?;
        self.state.balances.record_change(account, new_balance, now)
    }

    /// Held balance of `account` at `at`.
    ///
    /// An account with no checkpoints at all reads its live balance; an
    /// account whose first checkpoint is after `at` reads zero.
    pub fn balance_at(&self, account: &AccountId, at: Timestamp) -> TokenAmount {
        match self.state.balances.lookup(account, at) {
            Lookup::Found(balance) => balance,
            Lookup::BeforeHistory => TokenAmount::ZERO,
            Lookup::NoHistory => self.host.balances.raw_balance(account),
        }
    }

    pub fn checkpoints(&self, account: &AccountId) -> &[Checkpoint<TokenAmount>] {
        self.state.balances.checkpoints(account)
    }

    // ── Delegation ───────────────────────────────────────────────────────

    /// Delegate `delegator`'s voting power to `target`. No-op if unchanged.
    pub fn delegate(
        &mut self,
        delegator: &AccountId,
        target: &AccountId,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.state.balances.check_order(delegator, now)?;
        let materialize = !self.state.balances.has_history(delegator);
        let own_balance = self.balance_at(delegator, now);

        let Some(change) = self
            .state
            .delegation
            .delegate(delegator, target, own_balance, now)?
        else {
            return Ok(());
        };
        if materialize {
            // First use of this account: pin its live balance into history.
            self.state
                .balances
                .record_change(delegator, own_balance, now)?;
        }

        tracing::info!(
            delegator = %change.delegator,
            from = %change.from,
            to = %change.to,
            amount = %change.amount,
            "delegate changed"
        );
        self.host.events.emit(GovernanceEvent::DelegateChanged {
            delegator: change.delegator,
            from: change.from,
            to: change.to,
        });
        Ok(())
    }

    /// Take voting power back: delegate to self.
    pub fn undelegate(
        &mut self,
        delegator: &AccountId,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.delegate(delegator, delegator, now)
    }

    pub fn current_delegate(&self, account: &AccountId) -> AccountId {
        self.state.delegation.current_delegate(account)
    }

    pub fn delegation(&self, account: &AccountId) -> Option<&DelegationRecord> {
        self.state.delegation.record(account)
    }

    pub fn delegated_power_at(&self, delegate: &AccountId, at: Timestamp) -> TokenAmount {
        self.state.delegation.delegated_power_at(delegate, at)
    }

    pub fn delegators_of(&self, delegate: &AccountId) -> Vec<&AccountId> {
        self.state.delegation.delegators_of(delegate)
    }

    /// Effective voting power of `account` at `at`.
    ///
    /// If the account had a delegate other than itself at `at`, this is that
    /// delegate's delegated-power series; otherwise the account's own held
    /// balance.
    pub fn voting_power_at(&self, account: &AccountId, at: Timestamp) -> TokenAmount {
        let delegate = self.state.delegation.delegate_at(account, at);
        if &delegate != account {
            self.state.delegation.delegated_power_at(&delegate, at)
        } else {
            self.balance_at(account, at)
        }
    }

    // ── Proposals ────────────────────────────────────────────────────────

    /// Submit a proposal. Voting opens after the voting delay and the vote
    /// weights of every voter are taken at that instant.
    pub fn create_proposal(
        &mut self,
        proposer: &AccountId,
        draft: ProposalDraft,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        self.ensure_initialized()?;
        let params = self.state.params.get();

        let power = self.voting_power_at(proposer, now);
        if power < params.proposal_threshold {
            return Err(GovernanceError::BelowProposalThreshold {
                have: power,
                need: params.proposal_threshold,
            });
        }
        if draft.target == ActionTarget::ParameterStore {
            if !draft.value.is_zero() {
                return Err(GovernanceError::InvalidAction(
                    "parameter store calls cannot carry value".to_string(),
                ));
            }
            ParameterCall::decode(&draft.payload)?;
        }

        let start_time = now
            .checked_add_secs(params.voting_delay_secs)
            .ok_or(GovernanceError::Overflow)?;
        let end_time = start_time
            .checked_add_secs(params.voting_period_secs)
            .ok_or(GovernanceError::Overflow)?;
        let count = self
            .state
            .proposal_count
            .checked_add(1)
            .ok_or(GovernanceError::Overflow)?;
        let id = ProposalId::new(count);

        let proposal = Proposal {
            id,
            content_hash: draft.content_hash(),
            title: draft.title,
            description: draft.description,
            proposer: proposer.clone(),
            target: draft.target,
            payload: draft.payload,
            value: draft.value,
            tally: Default::default(),
            created_at: now,
            start_time,
            end_time,
            executed: false,
            canceled: false,
            armed_at: None,
        };
        tracing::info!(
            proposal = %id,
            proposer = %proposer,
            target = %proposal.target,
            start = %start_time,
            end = %end_time,
            "proposal created"
        );
        self.host.events.emit(GovernanceEvent::ProposalCreated {
            id,
            proposer: proposer.clone(),
            target: proposal.target.clone(),
            content_hash: proposal.content_hash,
            start_time,
            end_time,
        });
        self.state.proposals.insert(id, proposal);
        self.state.proposal_count = count;
        Ok(id)
    }

    /// Cancel a pending or active proposal. Proposer or owner only.
    pub fn cancel_proposal(
        &mut self,
        caller: &AccountId,
        id: ProposalId,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.ensure_initialized()?;
        let proposal = self.proposal(id)?;
        if &proposal.proposer != caller && !self.host.owner_gate.is_owner(caller) {
            return Err(GovernanceError::NotProposerOrOwner(caller.clone()));
        }
        let state = proposal.state(now, self.state.params.get());
        if !matches!(state, ProposalState::Pending | ProposalState::Active) {
            return Err(GovernanceError::InvalidState {
                id,
                state,
                action: "cancel",
            });
        }

        self.proposal_mut(id)?.canceled = true;
        tracing::info!(proposal = %id, by = %caller, "proposal canceled");
        self.host.events.emit(GovernanceEvent::ProposalCanceled {
            id,
            by: caller.clone(),
        });
        Ok(())
    }

    // ── Voting ───────────────────────────────────────────────────────────

    /// Cast `voter`'s vote on an active proposal.
    ///
    /// The weight is the voter's voting power at the proposal's snapshot
    /// time, whenever within the window the vote is cast. Returns the weight.
    pub fn cast_vote(
        &mut self,
        voter: &AccountId,
        id: ProposalId,
        support: VoteSupport,
        reason: impl Into<String>,
        now: Timestamp,
    ) -> Result<TokenAmount, GovernanceError> {
        self.ensure_initialized()?;
        let proposal = self.proposal(id)?;
        self.state.votes.ensure_not_voted(id, voter)?;
        let state = proposal.state(now, self.state.params.get());
        if state != ProposalState::Active {
            return Err(GovernanceError::InvalidState {
                id,
                state,
                action: "vote",
            });
        }

        let weight = self.voting_power_at(voter, proposal.snapshot_time());
        if weight.is_zero() {
            return Err(GovernanceError::ZeroWeight(voter.clone()));
        }
        let tally = proposal.tally.with_vote(support, weight)?;
        let reason = reason.into();

        self.state.votes.record(
            id,
            voter,
            Vote {
                support,
                weight,
                reason: reason.clone(),
                cast_at: now,
            },
        )?;
        self.proposal_mut(id)?.tally = tally;

        tracing::debug!(proposal = %id, voter = %voter, ?support, weight = %weight, "vote cast");
        self.host.events.emit(GovernanceEvent::VoteCast {
            id,
            voter: voter.clone(),
            support,
            weight,
            reason,
        });
        Ok(weight)
    }

    // ── Execution ────────────────────────────────────────────────────────

    /// Arm, wait on, or run a succeeded proposal.
    ///
    /// First call arms the timelock. Calls before the execution time are
    /// no-ops. The first call at or after it runs the action; if the action
    /// fails the call fails and the proposal stays executable.
    pub fn execute_proposal(
        &mut self,
        id: ProposalId,
        now: Timestamp,
    ) -> Result<ExecutionOutcome, GovernanceError> {
        self.ensure_initialized()?;
        let step = scheduler::next_step(self.proposal(id)?, now, self.state.params.get())?;

        let eta = match step {
            ExecutionStep::Wait { eta } => return Ok(ExecutionOutcome::Waiting { eta }),
            ExecutionStep::Arm { eta } if eta > now => {
                self.proposal_mut(id)?.armed_at = Some(eta);
                tracing::info!(proposal = %id, eta = %eta, "proposal queued");
                self.host
                    .events
                    .emit(GovernanceEvent::ProposalQueued { id, eta });
                return Ok(ExecutionOutcome::Queued { eta });
            }
            // A zero execution delay makes the proposal due as soon as it is armed.
            ExecutionStep::Arm { eta } | ExecutionStep::Run { eta } => eta,
        };

        let newly_armed = self.proposal(id)?.armed_at.is_none();
        let output = self.run_action(id)?;

        let proposal = self.proposal_mut(id)?;
        proposal.armed_at = Some(eta);
        proposal.executed = true;
        tracing::info!(proposal = %id, "proposal executed");
        if newly_armed {
            self.host
                .events
                .emit(GovernanceEvent::ProposalQueued { id, eta });
        }
        self.host
            .events
            .emit(GovernanceEvent::ProposalExecuted { id });
        Ok(ExecutionOutcome::Executed { output })
    }

    fn run_action(&mut self, id: ProposalId) -> Result<Vec<u8>, GovernanceError> {
        let proposal = self.proposal(id)?;
        match &proposal.target {
            ActionTarget::ParameterStore => {
                if !proposal.value.is_zero() {
                    return Err(GovernanceError::InvalidAction(
                        "parameter store calls cannot carry value".to_string(),
                    ));
                }
                let call = ParameterCall::decode(&proposal.payload)?;
                let next = call.apply_to(self.state.params.get())?;
                let origin = Origin::Governed(ExecutionAuthority::new());
                let params = self.state.params.update(&origin, next)?.clone();
                tracing::info!(proposal = %id, version = params.version, "parameters updated");
                self.host
                    .events
                    .emit(GovernanceEvent::ParametersUpdated { params });
                Ok(Vec::new())
            }
            ActionTarget::External(target) => {
                let target = target.clone();
                let payload = proposal.payload.clone();
                let value = proposal.value;
                self.host
                    .executor
                    .invoke(&target, &payload, value)
                    .map_err(|e| {
                        tracing::warn!(proposal = %id, target = %target, error = %e, "action failed");
                        GovernanceError::from(e)
                    })
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn proposal(&self, id: ProposalId) -> Result<&Proposal, GovernanceError> {
        self.state
            .proposals
            .get(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    fn proposal_mut(&mut self, id: ProposalId) -> Result<&mut Proposal, GovernanceError> {
        self.state
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    /// Computed state of proposal `id` at `now`.
    pub fn state(&self, id: ProposalId, now: Timestamp) -> Result<ProposalState, GovernanceError> {
        Ok(self.proposal(id)?.state(now, self.state.params.get()))
    }

    /// All proposals in id order.
    pub fn proposals(&self) -> impl Iterator<Item = &Proposal> {
        self.state.proposals.values()
    }

    pub fn proposal_count(&self) -> u64 {
        self.state.proposal_count
    }

    pub fn vote(&self, id: ProposalId, voter: &AccountId) -> Option<&Vote> {
        self.state.votes.get(id, voter)
    }

    pub fn has_voted(&self, id: ProposalId, voter: &AccountId) -> bool {
        self.state.votes.has_voted(id, voter)
    }

    pub fn votes_on(&self, id: ProposalId) -> Vec<(&AccountId, &Vote)> {
        self.state.votes.votes_on(id)
    }

    pub fn params(&self) -> &GovernanceParams {
        self.state.params.get()
    }

    /// Write parameters directly as an account. Always refused: parameters
    /// only change through an executed proposal.
    pub fn set_params(
        &mut self,
        caller: &AccountId,
        params: GovernanceParams,
    ) -> Result<(), GovernanceError> {
        self.state
            .params
            .update(&Origin::Account(caller.clone()), params)
            .map(|_| ())
    }

    // ── Persistence ──────────────────────────────────────────────────────

    /// Write the full engine state to `store`.
    pub fn save_to(&self, store: &dyn GovernanceStore) -> Result<(), GovernanceError> {
        for (id, proposal) in &self.state.proposals {
            store.put_proposal(*id, &bincode::serialize(proposal)?)?;
        }
        store.put_meta(GOVERNOR_STATE_META_KEY, &bincode::serialize(&self.state)?)?;
        Ok(())
    }

    /// Restore an engine previously written with [`Governor::save_to`].
    pub fn load_from(store: &dyn GovernanceStore, host: Host) -> Result<Self, GovernanceError> {
        let bytes = store.get_meta(GOVERNOR_STATE_META_KEY)?.ok_or_else(|| {
            GovernanceError::Store(StoreError::NotFound(GOVERNOR_STATE_META_KEY.to_string()))
        })?;
        let mut state: GovernorState = bincode::deserialize(&bytes)?;
        for raw in 1..=state.proposal_count {
            let id = ProposalId::new(raw);
            let proposal: Proposal = bincode::deserialize(&store.get_proposal(id)?)?;
            if proposal.id != id {
                return Err(GovernanceError::Store(StoreError::Corruption(format!(
                    "record under {id} holds proposal {}",
                    proposal.id
                ))));
            }
            state.proposals.insert(id, proposal);
        }
        tracing::info!(proposals = state.proposal_count, "governance state loaded");
        Ok(Self { host, state })
    }
}
