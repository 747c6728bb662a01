//! Nullable token balances.

use crate::lock;
use civitas_governance::BalanceSource;
use civitas_types::{AccountId, TokenAmount};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory live balances. Clones share the same table.
#[derive(Clone, Default)]
pub struct NullBalances {
    balances: Arc<Mutex<HashMap<AccountId, TokenAmount>>>,
}

impl NullBalances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, account: &AccountId, amount: TokenAmount) {
        lock(&self.balances).insert(account.clone(), amount);
    }
}

impl BalanceSource for NullBalances {
    fn raw_balance(&self, account: &AccountId) -> TokenAmount {
        lock(&self.balances)
            .get(account)
            .copied()
            .unwrap_or(TokenAmount::ZERO)
    }
}
