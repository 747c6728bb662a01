//! Checkpointed balance ledger: historical balance lookups by timestamp.
//!
//! Each account owns an append-only sequence of `(timestamp, value)` checkpoints.
//! Timestamps within a sequence are non-decreasing; a write at the same instant
//! as the latest checkpoint overwrites it instead of appending, so there is at
//! most one checkpoint per account per instant.
//!
//! Lookups return the value of the rightmost checkpoint whose timestamp is
//! `<= at`. The three possible outcomes are kept distinct ([`Lookup`]) because
//! callers treat "no history at all" differently from "history starts later".

use crate::error::GovernanceError;
use civitas_types::{AccountId, Timestamp, TokenAmount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A value recorded at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint<T> {
    pub timestamp: Timestamp,
    pub value: T,
}

/// Result of a historical lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup<T> {
    /// A checkpoint at or before the query time exists.
    Found(T),
    /// The series exists but its first checkpoint is after the query time.
    BeforeHistory,
    /// Nothing has ever been recorded for this series.
    NoHistory,
}

impl<T> Lookup<T> {
    /// The found value, or `None` for either flavour of miss.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            Lookup::BeforeHistory | Lookup::NoHistory => None,
        }
    }
}

/// An append-or-collapse sequence of checkpoints for one series.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct History<T> {
    checkpoints: Vec<Checkpoint<T>>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self {
            checkpoints: Vec::new(),
        }
    }
}

impl<T: Clone> History<T> {
    /// Record `value` at `at`.
    ///
    /// Returns the timestamp of the latest checkpoint if `at` precedes it.
    pub fn push(&mut self, at: Timestamp, value: T) -> Result<(), Timestamp> {
        match self.checkpoints.last_mut() {
            Some(last) if last.timestamp > at => return Err(last.timestamp),
            Some(last) if last.timestamp == at => {
                last.value = value;
                return Ok(());
            }
            _ => {}
        }
        self.checkpoints.push(Checkpoint {
            timestamp: at,
            value,
        });
        Ok(())
    }

    /// Value in effect at `at`.
    pub fn at(&self, at: Timestamp) -> Lookup<T> {
        if self.checkpoints.is_empty() {
            return Lookup::NoHistory;
        }
        match rightmost_at_or_before(&self.checkpoints, at) {
            Some(index) => Lookup::Found(self.checkpoints[index].value.clone()),
            None => Lookup::BeforeHistory,
        }
    }

    pub fn latest(&self) -> Option<&Checkpoint<T>> {
        self.checkpoints.last()
    }

    pub fn checkpoints(&self) -> &[Checkpoint<T>] {
        &self.checkpoints
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }
}

/// Index of the rightmost checkpoint with `timestamp <= at`, if any.
///
/// Plain comparison-based binary search over a non-decreasing sequence.
fn rightmost_at_or_before<T>(checkpoints: &[Checkpoint<T>], at: Timestamp) -> Option<usize> {
    // Invariant: every index < low has timestamp <= at, every index >= high has timestamp > at.
    let mut low = 0usize;
    let mut high = checkpoints.len();
    while low < high {
        let mid = low + (high - low) / 2;
        if checkpoints[mid].timestamp <= at {
            low = mid + 1;
        } else {
            high = mid;
        }
    }
    low.checked_sub(1)
}

/// Per-account token checkpoints.
///
/// Used twice by the engine: once for held balances and once for the
/// delegated-power series of delegates.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CheckpointLedger {
    series: HashMap<AccountId, History<TokenAmount>>,
}

impl CheckpointLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `account`'s new value at `at`, collapsing same-instant writes.
    pub fn record_change(
        &mut self,
        account: &AccountId,
        new_value: TokenAmount,
        at: Timestamp,
    ) -> Result<(), GovernanceError> {
        let history = self.series.entry(account.clone()).or_default();
        history
            .push(at, new_value)
            .map_err(|latest| GovernanceError::CheckpointOutOfOrder {
                account: account.clone(),
                at,
                latest,
            })?;
        tracing::debug!(account = %account, value = %new_value, at = %at, "checkpoint recorded");
        Ok(())
    }

    /// Fail if a write for `account` at `at` would go back in time.
    pub fn check_order(&self, account: &AccountId, at: Timestamp) -> Result<(), GovernanceError> {
        match self.series.get(account).and_then(|h| h.latest()) {
            Some(last) if last.timestamp > at => Err(GovernanceError::CheckpointOutOfOrder {
                account: account.clone(),
                at,
                latest: last.timestamp,
            }),
            _ => Ok(()),
        }
    }

    /// Value of `account`'s series at `at`.
    pub fn lookup(&self, account: &AccountId, at: Timestamp) -> Lookup<TokenAmount> {
        match self.series.get(account) {
            Some(history) => history.at(at),
            None => Lookup::NoHistory,
        }
    }

    /// Value at `at`, reading any miss as zero.
    pub fn value_at(&self, account: &AccountId, at: Timestamp) -> TokenAmount {
        self.lookup(account, at).found().unwrap_or(TokenAmount::ZERO)
    }

    /// Most recent value, or zero if nothing was ever recorded.
    pub fn latest_value(&self, account: &AccountId) -> TokenAmount {
        self.series
            .get(account)
            .and_then(|h| h.latest())
            .map(|c| c.value)
            .unwrap_or(TokenAmount::ZERO)
    }

    pub fn has_history(&self, account: &AccountId) -> bool {
        self.series.get(account).is_some_and(|h| !h.is_empty())
    }

    pub fn checkpoints(&self, account: &AccountId) -> &[Checkpoint<TokenAmount>] {
        self.series
            .get(account)
            .map(|h| h.checkpoints())
            .unwrap_or(&[])
    }

    pub fn checkpoint_count(&self, account: &AccountId) -> usize {
        self.series.get(account).map(|h| h.len()).unwrap_or(0)
    }

    /// Add `delta` to the series at `at`, starting from the latest value.
    pub fn increase(
        &mut self,
        account: &AccountId,
        delta: TokenAmount,
        at: Timestamp,
    ) -> Result<(), GovernanceError> {
        let updated = self
            .latest_value(account)
            .checked_add(delta)
            .ok_or(GovernanceError::Overflow)?;
        self.record_change(account, updated, at)
    }

    /// Subtract `delta` from the series at `at`, starting from the latest value.
    pub fn decrease(
        &mut self,
        account: &AccountId,
        delta: TokenAmount,
        at: Timestamp,
    ) -> Result<(), GovernanceError> {
        let updated = self
            .latest_value(account)
            .checked_sub(delta)
            .ok_or(GovernanceError::Overflow)?;
        self.record_change(account, updated, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str) -> AccountId {
        AccountId::new(format!("civ_{name}"))
    }

    fn ts(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    fn amt(raw: u128) -> TokenAmount {
        TokenAmount::new(raw)
    }

    #[test]
    fn empty_series_has_no_history() {
        let ledger = CheckpointLedger::new();
        assert_eq!(ledger.lookup(&account("a"), ts(10)), Lookup::NoHistory);
        assert_eq!(ledger.value_at(&account("a"), ts(10)), TokenAmount::ZERO);
    }

    #[test]
    fn query_before_first_checkpoint_is_before_history() {
        let mut ledger = CheckpointLedger::new();
        ledger.record_change(&account("a"), amt(100), ts(50)).unwrap();
        assert_eq!(ledger.lookup(&account("a"), ts(49)), Lookup::BeforeHistory);
        assert_eq!(ledger.lookup(&account("a"), ts(50)), Lookup::Found(amt(100)));
    }

    #[test]
    fn lookup_picks_rightmost_at_or_before() {
        let mut ledger = CheckpointLedger::new();
        let a = account("a");
        ledger.record_change(&a, amt(10), ts(10)).unwrap();
        ledger.record_change(&a, amt(20), ts(20)).unwrap();
        ledger.record_change(&a, amt(30), ts(30)).unwrap();

        assert_eq!(ledger.lookup(&a, ts(10)), Lookup::Found(amt(10)));
        assert_eq!(ledger.lookup(&a, ts(19)), Lookup::Found(amt(10)));
        assert_eq!(ledger.lookup(&a, ts(20)), Lookup::Found(amt(20)));
        assert_eq!(ledger.lookup(&a, ts(29)), Lookup::Found(amt(20)));
        assert_eq!(ledger.lookup(&a, ts(1_000)), Lookup::Found(amt(30)));
    }

    #[test]
    fn same_instant_writes_collapse() {
        let mut ledger = CheckpointLedger::new();
        let a = account("a");
        ledger.record_change(&a, amt(10), ts(10)).unwrap();
        ledger.record_change(&a, amt(15), ts(10)).unwrap();
        ledger.record_change(&a, amt(17), ts(10)).unwrap();

        assert_eq!(ledger.checkpoint_count(&a), 1);
        assert_eq!(ledger.lookup(&a, ts(10)), Lookup::Found(amt(17)));
    }

    #[test]
    fn out_of_order_write_rejected() {
        let mut ledger = CheckpointLedger::new();
        let a = account("a");
        ledger.record_change(&a, amt(10), ts(10)).unwrap();
        let err = ledger.record_change(&a, amt(5), ts(9)).unwrap_err();
        assert!(matches!(
            err,
            GovernanceError::CheckpointOutOfOrder { latest, .. } if latest == ts(10)
        ));
        assert_eq!(ledger.checkpoint_count(&a), 1);
    }

    #[test]
    fn increase_and_decrease_track_latest() {
        let mut ledger = CheckpointLedger::new();
        let d = account("delegate");
        ledger.increase(&d, amt(100), ts(1)).unwrap();
        ledger.increase(&d, amt(50), ts(2)).unwrap();
        ledger.decrease(&d, amt(30), ts(3)).unwrap();

        assert_eq!(ledger.value_at(&d, ts(1)), amt(100));
        assert_eq!(ledger.value_at(&d, ts(2)), amt(150));
        assert_eq!(ledger.value_at(&d, ts(3)), amt(120));
        assert_eq!(ledger.latest_value(&d), amt(120));
    }

    #[test]
    fn decrease_below_zero_is_overflow() {
        let mut ledger = CheckpointLedger::new();
        let d = account("delegate");
        ledger.increase(&d, amt(10), ts(1)).unwrap();
        assert!(matches!(
            ledger.decrease(&d, amt(11), ts(2)),
            Err(GovernanceError::Overflow)
        ));
        assert_eq!(ledger.latest_value(&d), amt(10));
    }

    #[test]
    fn binary_search_on_long_series() {
        let mut history = History::default();
        for i in 0..1_000u64 {
            history.push(ts(i * 2), i).unwrap();
        }
        assert_eq!(history.at(ts(0)), Lookup::Found(0));
        assert_eq!(history.at(ts(1)), Lookup::Found(0));
        assert_eq!(history.at(ts(999)), Lookup::Found(499));
        assert_eq!(history.at(ts(1_998)), Lookup::Found(999));
        assert_eq!(history.at(ts(u64::MAX)), Lookup::Found(999));
    }
}
