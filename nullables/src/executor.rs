//! Nullable executor: records invocations instead of performing them.

use crate::lock;
use civitas_governance::{Executor, ExecutorError};
use civitas_types::{AccountId, TokenAmount};
use std::sync::{Arc, Mutex};

/// One recorded call to [`Executor::invoke`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub target: AccountId,
    pub payload: Vec<u8>,
    pub value: TokenAmount,
}

#[derive(Default)]
struct Inner {
    invocations: Vec<Invocation>,
    fail_with: Option<String>,
}

/// An executor that succeeds (echoing the payload) unless told to fail.
/// Clones share the same log.
#[derive(Clone, Default)]
pub struct NullExecutor {
    inner: Arc<Mutex<Inner>>,
}

impl NullExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call revert with `reason`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        lock(&self.inner).fail_with = Some(reason.into());
    }

    /// Make following calls succeed again.
    pub fn succeed(&self) {
        lock(&self.inner).fail_with = None;
    }

    /// Successful invocations so far.
    pub fn invocations(&self) -> Vec<Invocation> {
        lock(&self.inner).invocations.clone()
    }
}

impl Executor for NullExecutor {
    fn invoke(
        &mut self,
        target: &AccountId,
        payload: &[u8],
        value: TokenAmount,
    ) -> Result<Vec<u8>, ExecutorError> {
        let mut inner = lock(&self.inner);
        if let Some(reason) = &inner.fail_with {
            return Err(ExecutorError::Reverted(reason.clone()));
        }
        inner.invocations.push(Invocation {
            target: target.clone(),
            payload: payload.to_vec(),
            value,
        });
        Ok(payload.to_vec())
    }
}
