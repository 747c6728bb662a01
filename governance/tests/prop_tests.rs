use proptest::prelude::*;

use civitas_governance::{
    ActionTarget, CheckpointLedger, Governor, ProposalDraft, ProposalState, VoteSupport,
};
use civitas_nullables::{null_host, NullBalances, NullEventSink, NullExecutor};
use civitas_types::{AccountId, GovernanceParams, Timestamp, TokenAmount};

fn account(name: &str) -> AccountId {
    AccountId::new(format!("civ_{name}"))
}

fn governor() -> Governor {
    let owner = account("owner");
    let host = null_host(
        &NullBalances::new(),
        &NullExecutor::new(),
        &NullEventSink::new(),
        &owner,
    );
    let mut governor = Governor::new(host);
    let params = GovernanceParams {
        voting_delay_secs: 10,
        voting_period_secs: 100,
        proposal_threshold: TokenAmount::ZERO,
        quorum_threshold: TokenAmount::new(1),
        execution_delay_secs: 50,
        version: 0,
    };
    governor.initialize(&owner, params).unwrap();
    governor
}

fn draft() -> ProposalDraft {
    ProposalDraft {
        title: "t".to_string(),
        description: String::new(),
        target: ActionTarget::External(account("target")),
        payload: Vec::new(),
        value: TokenAmount::ZERO,
    }
}

/// (gap since previous write, new balance) pairs.
fn balance_writes() -> impl Strategy<Value = Vec<(u64, u128)>> {
    prop::collection::vec((0u64..50, 0u128..1_000_000), 1..20)
}

proptest! {
    /// Historical lookups agree with a linear scan over the written series.
    #[test]
    fn lookup_matches_linear_scan(writes in balance_writes(), probe in 0u64..1_200) {
        let holder = account("holder");
        let mut ledger = CheckpointLedger::new();
        let mut series: Vec<(u64, u128)> = Vec::new();
        let mut t = 100;
        for (gap, balance) in writes {
            t += gap;
            ledger.record_change(&holder, TokenAmount::new(balance), Timestamp::new(t)).unwrap();
            match series.last_mut() {
                Some(last) if last.0 == t => last.1 = balance,
                _ => series.push((t, balance)),
            }
        }
        let expected = series
            .iter()
            .rev()
            .find(|(at, _)| *at <= probe)
            .map_or(0, |(_, balance)| *balance);
        prop_assert_eq!(ledger.value_at(&holder, Timestamp::new(probe)).raw(), expected);
        prop_assert_eq!(ledger.checkpoint_count(&holder), series.len());
    }

    /// Between two consecutive writes the reported balance does not move.
    #[test]
    fn balance_constant_between_changes(
        before in 0u128..1_000_000,
        after in 0u128..1_000_000,
        gap in 2u64..500,
        offset in 0u64..500,
    ) {
        let mut gov = governor();
        let holder = account("holder");
        gov.record_balance_change(&holder, TokenAmount::new(before), Timestamp::new(1_000)).unwrap();
        gov.record_balance_change(&holder, TokenAmount::new(after), Timestamp::new(1_000 + gap)).unwrap();
        let probe = Timestamp::new(1_000 + offset % gap);
        prop_assert_eq!(gov.balance_at(&holder, probe), TokenAmount::new(before));
        prop_assert_eq!(gov.balance_at(&holder, Timestamp::new(1_000 + gap + offset)), TokenAmount::new(after));
    }

    /// A vote weighs the snapshot balance whenever in the window it is cast
    /// and whatever happens to the balance afterwards.
    #[test]
    fn vote_weight_fixed_at_snapshot(
        snapshot_balance in 1u128..1_000_000,
        later_balance in 0u128..1_000_000,
        move_after in 0u64..=100,
        vote_after in 0u64..=100,
    ) {
        let mut gov = governor();
        let voter = account("voter");
        gov.record_balance_change(&voter, TokenAmount::new(snapshot_balance), Timestamp::new(1_000)).unwrap();
        let id = gov.create_proposal(&voter, draft(), Timestamp::new(1_000)).unwrap();
        let start = gov.proposal(id).unwrap().start_time.as_secs();

        let moved_at = start + 1 + move_after;
        gov.record_balance_change(&voter, TokenAmount::new(later_balance), Timestamp::new(moved_at)).unwrap();
        let cast_at = Timestamp::new(start + vote_after);
        let weight = gov.cast_vote(&voter, id, VoteSupport::For, "", cast_at).unwrap();
        prop_assert_eq!(weight, TokenAmount::new(snapshot_balance));
    }

    /// Reading state twice at the same instant gives the same answer.
    #[test]
    fn state_is_pure(balance in 1u128..100, vote in 0u8..3, at in 900u64..1_300) {
        let mut gov = governor();
        let voter = account("voter");
        gov.record_balance_change(&voter, TokenAmount::new(balance), Timestamp::new(900)).unwrap();
        let id = gov.create_proposal(&voter, draft(), Timestamp::new(1_000)).unwrap();
        let support = VoteSupport::try_from(vote).unwrap();
        gov.cast_vote(&voter, id, support, "", Timestamp::new(1_050)).unwrap();

        let now = Timestamp::new(at);
        let first = gov.state(id, now).unwrap();
        prop_assert_eq!(first, gov.state(id, now).unwrap());
        if at > 1_110 {
            let expected = if support == VoteSupport::For {
                ProposalState::Succeeded
            } else {
                ProposalState::Defeated
            };
            prop_assert_eq!(first, expected);
        }
    }

    /// Delegating away and back moves exactly the delegator's balance out of
    /// and back into the delegate's series.
    #[test]
    fn delegate_roundtrip_restores_power(
        delegator_balance in 0u128..1_000_000,
        other_balance in 0u128..1_000_000,
        change in 0u128..1_000_000,
    ) {
        let mut gov = governor();
        let (alice, carol, bob) = (account("alice"), account("carol"), account("bob"));
        gov.record_balance_change(&alice, TokenAmount::new(delegator_balance), Timestamp::new(10)).unwrap();
        gov.record_balance_change(&carol, TokenAmount::new(other_balance), Timestamp::new(10)).unwrap();
        gov.delegate(&carol, &bob, Timestamp::new(20)).unwrap();
        let baseline = gov.delegated_power_at(&bob, Timestamp::new(20));

        gov.delegate(&alice, &bob, Timestamp::new(30)).unwrap();
        prop_assert_eq!(
            gov.delegated_power_at(&bob, Timestamp::new(30)).raw(),
            baseline.raw() + delegator_balance
        );
        gov.record_balance_change(&alice, TokenAmount::new(change), Timestamp::new(40)).unwrap();
        prop_assert_eq!(
            gov.delegated_power_at(&bob, Timestamp::new(40)).raw(),
            baseline.raw() + change
        );
        gov.undelegate(&alice, Timestamp::new(50)).unwrap();
        prop_assert_eq!(gov.delegated_power_at(&bob, Timestamp::new(50)), baseline);
        prop_assert_eq!(gov.balance_at(&alice, Timestamp::new(50)), TokenAmount::new(change));
    }
}
