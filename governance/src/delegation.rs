//! Delegation directory: who votes with whose tokens.
//!
//! Every account implicitly delegates to itself until it names another
//! delegate. Moving a delegation transfers the delegator's held balance out
//! of the old delegate's delegated-power series and into the new one's, both
//! at the instant of the change. Self-delegation carries no transfer.
//!
//! Alongside the overwrite-only [`DelegationRecord`], the directory keeps a
//! per-delegator history of delegate changes so that "who was A's delegate at
//! time T" can be answered for proposal snapshots.

use crate::checkpoint::{CheckpointLedger, History, Lookup};
use crate::error::GovernanceError;
use civitas_types::{AccountId, Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The current delegation of one account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationRecord {
    pub delegate: AccountId,
    pub changed_at: Timestamp,
}

/// Outcome of a delegation change that actually moved something.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelegationChange {
    pub delegator: AccountId,
    pub from: AccountId,
    pub to: AccountId,
    /// Balance moved between the two delegated-power series.
    pub amount: TokenAmount,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DelegationDirectory {
    /// delegator → current delegation. Absent means self.
    records: HashMap<AccountId, DelegationRecord>,
    /// delegator → timeline of delegates.
    history: HashMap<AccountId, History<AccountId>>,
    /// Reverse index: delegate → accounts currently delegating to it (never self).
    delegators: HashMap<AccountId, HashSet<AccountId>>,
    /// delegate → delegated power held over time.
    power: CheckpointLedger,
}

impl DelegationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The account's current delegate (itself if it never delegated).
    pub fn current_delegate(&self, account: &AccountId) -> AccountId {
        self.records
            .get(account)
            .map(|r| r.delegate.clone())
            .unwrap_or_else(|| account.clone())
    }

    pub fn record(&self, account: &AccountId) -> Option<&DelegationRecord> {
        self.records.get(account)
    }

    /// The account's delegate as of `at`.
    pub fn delegate_at(&self, account: &AccountId, at: Timestamp) -> AccountId {
        match self.history.get(account).map(|h| h.at(at)) {
            Some(Lookup::Found(delegate)) => delegate,
            _ => account.clone(),
        }
    }

    /// Delegated power flowing to `delegate` at `at`.
    pub fn delegated_power_at(&self, delegate: &AccountId, at: Timestamp) -> TokenAmount {
        self.power.value_at(delegate, at)
    }

    pub fn power_ledger(&self) -> &CheckpointLedger {
        &self.power
    }

    /// Accounts currently delegating to `delegate`, sorted for stable output.
    pub fn delegators_of(&self, delegate: &AccountId) -> Vec<&AccountId> {
        let mut out: Vec<&AccountId> = self
            .delegators
            .get(delegate)
            .map(|s| s.iter().collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    /// Point `delegator` at `target`, moving `own_balance` between series.
    ///
    /// Returns `None` when `target` already is the current delegate.
    /// All checks run before any series is written.
    pub fn delegate(
        &mut self,
        delegator: &AccountId,
        target: &AccountId,
        own_balance: TokenAmount,
        now: Timestamp,
    ) -> Result<Option<DelegationChange>, GovernanceError> {
        let from = self.current_delegate(delegator);
        if &from == target {
            return Ok(None);
        }

        let debit = if &from != delegator {
            Some(
                self.power
                    .latest_value(&from)
                    .checked_sub(own_balance)
                    .ok_or(GovernanceError::Overflow)?,
            )
        } else {
            None
        };
        let credit = if target != delegator {
            Some(
                self.power
                    .latest_value(target)
                    .checked_add(own_balance)
                    .ok_or(GovernanceError::Overflow)?,
            )
        } else {
            None
        };
        self.ensure_in_order(delegator, &from, target, now)?;

        if let Some(remaining) = debit {
            self.power.record_change(&from, remaining, now)?;
        }
        if let Some(total) = credit {
            self.power.record_change(target, total, now)?;
        }

        self.unlink(delegator, &from);
        if target != delegator {
            self.delegators
                .entry(target.clone())
                .or_default()
                .insert(delegator.clone());
        }
        self.records.insert(
            delegator.clone(),
            DelegationRecord {
                delegate: target.clone(),
                changed_at: now,
            },
        );
        self.history
            .entry(delegator.clone())
            .or_default()
            .push(now, target.clone())
            .map_err(|latest| GovernanceError::CheckpointOutOfOrder {
                account: delegator.clone(),
                at: now,
                latest,
            })?;

        Ok(Some(DelegationChange {
            delegator: delegator.clone(),
            from,
            to: target.clone(),
            amount: own_balance,
        }))
    }

    /// Reflect a change of `delegator`'s held balance in its delegate's series.
    ///
    /// No-op when the delegator votes for itself.
    pub fn on_balance_change(
        &mut self,
        delegator: &AccountId,
        old_balance: TokenAmount,
        new_balance: TokenAmount,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        let delegate = self.current_delegate(delegator);
        if &delegate == delegator || old_balance == new_balance {
            return Ok(());
        }
        if new_balance > old_balance {
            let delta = new_balance
                .checked_sub(old_balance)
                .ok_or(GovernanceError::Overflow)?;
            self.power.increase(&delegate, delta, now)
        } else {
            let delta = old_balance
                .checked_sub(new_balance)
                .ok_or(GovernanceError::Overflow)?;
            self.power.decrease(&delegate, delta, now)
        }
    }

    fn unlink(&mut self, delegator: &AccountId, from: &AccountId) {
        if let Some(set) = self.delegators.get_mut(from) {
            set.remove(delegator);
            if set.is_empty() {
                self.delegators.remove(from);
            }
        }
    }

    fn ensure_in_order(
        &self,
        delegator: &AccountId,
        from: &AccountId,
        target: &AccountId,
        now: Timestamp,
    ) -> Result<(), GovernanceError> {
        self.power.check_order(from, now)?;
        self.power.check_order(target, now)?;
        match self.history.get(delegator).and_then(|h| h.latest()) {
            Some(last) if last.timestamp > now => Err(GovernanceError::CheckpointOutOfOrder {
                account: delegator.clone(),
                at: now,
                latest: last.timestamp,
            }),
            _ => Ok(()),
        }
    }
}
