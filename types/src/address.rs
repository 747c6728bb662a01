//! Account identity type with `civ_` prefix.

use crate::error::CivitasError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A participant identity, always prefixed with `civ_`.
///
/// The governance core never interprets the suffix; it is whatever the
/// hosting ledger uses to name accounts.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// The standard prefix for all account identities.
    pub const PREFIX: &'static str = "civ_";

    /// Create a new account id from a raw string.
    ///
    /// # Panics
    /// Panics if the string is not a well-formed id. Use [`AccountId::parse`]
    /// for untrusted input.
    pub fn new(raw: impl Into<String>) -> Self {
        match Self::parse(raw) {
            Ok(id) => id,
            Err(e) => panic!("{e}"),
        }
    }

    /// Parse an account id, rejecting missing prefixes and empty suffixes.
    pub fn parse(raw: impl Into<String>) -> Result<Self, CivitasError> {
        let s = raw.into();
        if s.starts_with(Self::PREFIX) && s.len() > Self::PREFIX.len() {
            Ok(Self(s))
        } else {
            Err(CivitasError::InvalidAccount(s))
        }
    }

    /// Return the raw id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = CivitasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountId {
    type Error = CivitasError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}
