//! Credit balances owned by user records.
//!
//! The query service only needs two things from the user store: read a
//! balance, and apply a signed delta atomically. [`CreditLedger`] is that seam;
//! a database-backed implementation issues a single relative update
//! (`credits = credits + $delta`) rather than a read-modify-write.

use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[async_trait]
pub trait CreditLedger: Send + Sync {
    /// Current balance, or `None` if the user does not exist.
    async fn balance(&self, user_id: &str) -> Result<Option<i64>>;

    /// Atomically adds `delta` (negative to debit) to the user's balance.
    async fn adjust(&self, user_id: &str, delta: i64) -> Result<()>;
}

/// Ledger held in process memory. Used by the CLI and in tests.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    balances: Arc<RwLock<HashMap<String, i64>>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user_id: impl Into<String>, credits: i64) -> Self {
        self.set_balance(user_id, credits);
        self
    }

    pub fn set_balance(&self, user_id: impl Into<String>, credits: i64) {
        if let Ok(mut balances) = self.balances.write() {
            balances.insert(user_id.into(), credits);
        }
    }

    /// Balance snapshot for assertions; `None` for unknown users.
    pub fn get(&self, user_id: &str) -> Option<i64> {
        self.balances
            .read()
            .ok()
            .and_then(|balances| balances.get(user_id).copied())
    }
}

fn poisoned() -> Error {
    Error::internal_with_context(
        "credit ledger lock poisoned",
        crate::ErrorContext::new().with_source("credit_ledger"),
    )
}

#[async_trait]
impl CreditLedger for InMemoryLedger {
    async fn balance(&self, user_id: &str) -> Result<Option<i64>> {
        let balances = self.balances.read().map_err(|_| poisoned())?;
        Ok(balances.get(user_id).copied())
    }

    async fn adjust(&self, user_id: &str, delta: i64) -> Result<()> {
        let mut balances = self.balances.write().map_err(|_| poisoned())?;
        match balances.get_mut(user_id) {
            Some(credits) => {
                *credits = credits.saturating_add(delta);
                Ok(())
            }
            None => Err(Error::not_found(format!("user {}", user_id))),
        }
    }
}
