//! Deterministic stand-ins for everything the governance engine talks to.
//!
//! The engine reaches the outside world only through the traits in
//! `civitas_governance::host` and `civitas_store`. The types here implement
//! them in memory. Handles are cheap clones over shared state, so a test hands
//! one clone to the engine and keeps another to steer failures and inspect
//! what happened. Time is passed explicitly; [`NullClock`] just produces it.

pub mod balances;
pub mod clock;
pub mod events;
pub mod executor;
pub mod store;

pub use balances::NullBalances;
pub use clock::NullClock;
pub use events::NullEventSink;
pub use executor::{Invocation, NullExecutor};
pub use store::NullGovernanceStore;

use civitas_governance::{FixedOwner, Host};
use civitas_types::AccountId;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, ignoring poisoning from a panicked test thread.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Build a [`Host`] from nullables, with `owner` as the only owner.
pub fn null_host(
    balances: &NullBalances,
    executor: &NullExecutor,
    events: &NullEventSink,
    owner: &AccountId,
) -> Host {
    Host {
        balances: Box::new(balances.clone()),
        executor: Box::new(executor.clone()),
        events: Box::new(events.clone()),
        owner_gate: Box::new(FixedOwner(owner.clone())),
    }
}
