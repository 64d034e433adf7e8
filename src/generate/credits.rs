use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::foundation::error::{PaintoverError, PaintoverResult};

/// Stable identifier of an authenticated user.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signed-in user and their credit balance.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Account {
    /// Account owner.
    pub user: UserId,
    /// Remaining credits.
    pub credits: i64,
}

/// Callback invoked with the current account whenever it changes.
pub type AccountListener = Arc<dyn Fn(Option<&Account>) + Send + Sync>;

/// Handle for a registered listener; dropping it unregisters the listener.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

impl Subscription {
    /// Subscription that runs `release` once when dropped or released.
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Unregister now.
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_release();
    }
}

/// Per-user credit ledger and authentication state.
#[allow(async_fn_in_trait)]
pub trait CreditStore {
    /// Currently signed-in account, if any.
    fn current_account(&self) -> Option<Account>;

    /// Overwrite `user`'s balance.
    async fn set_balance(&self, user: &UserId, credits: i64) -> PaintoverResult<()>;

    /// Register `listener`; it is called immediately with the current account and on every change.
    fn subscribe(&self, listener: AccountListener) -> Subscription;
}

impl<C: CreditStore> CreditStore for &C {
    fn current_account(&self) -> Option<Account> {
        (**self).current_account()
    }

    async fn set_balance(&self, user: &UserId, credits: i64) -> PaintoverResult<()> {
        (**self).set_balance(user, credits).await
    }

    fn subscribe(&self, listener: AccountListener) -> Subscription {
        (**self).subscribe(listener)
    }
}

#[derive(Default)]
struct StoreState {
    current: Option<UserId>,
    balances: BTreeMap<UserId, i64>,
    listeners: BTreeMap<u64, AccountListener>,
    next_listener: u64,
}

impl StoreState {
    fn account(&self) -> Option<Account> {
        let user = self.current.clone()?;
        let credits = *self.balances.get(&user)?;
        Some(Account { user, credits })
    }
}

/// Shared in-memory [`CreditStore`] for tests, demos and the CLI.
///
/// Clones share the same ledger.
#[derive(Clone, Default)]
pub struct InMemoryCreditStore {
    state: Arc<Mutex<StoreState>>,
}

impl std::fmt::Debug for InMemoryCreditStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("InMemoryCreditStore")
            .field("current", &state.current)
            .field("accounts", &state.balances.len())
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl InMemoryCreditStore {
    /// Empty store with nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with `user` signed in holding `credits`.
    pub fn with_account(user: impl Into<String>, credits: i64) -> Self {
        let store = Self::new();
        store.sign_in(UserId(user.into()), credits);
        store
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sign `user` in, creating the account with `credits` if it does not exist yet.
    pub fn sign_in(&self, user: UserId, credits: i64) {
        {
            let mut state = self.lock();
            state.balances.entry(user.clone()).or_insert(credits);
            state.current = Some(user);
        }
        self.notify();
    }

    /// Sign the current user out.
    pub fn sign_out(&self) {
        self.lock().current = None;
        self.notify();
    }

    /// Balance of `user`, signed in or not.
    pub fn balance(&self, user: &UserId) -> Option<i64> {
        self.lock().balances.get(user).copied()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn notify(&self) {
        // Listeners run outside the lock so they may call back into the store.
        let (account, listeners): (Option<Account>, Vec<AccountListener>) = {
            let state = self.lock();
            (state.account(), state.listeners.values().cloned().collect())
        };
        for listener in listeners {
            listener(account.as_ref());
        }
    }
}

impl CreditStore for InMemoryCreditStore {
    fn current_account(&self) -> Option<Account> {
        self.lock().account()
    }

    async fn set_balance(&self, user: &UserId, credits: i64) -> PaintoverResult<()> {
        {
            let mut state = self.lock();
            let Some(balance) = state.balances.get_mut(user) else {
                return Err(PaintoverError::validation(format!("unknown account '{user}'")));
            };
            *balance = credits;
        }
        tracing::debug!(%user, credits, "balance updated");
        self.notify();
        Ok(())
    }

    fn subscribe(&self, listener: AccountListener) -> Subscription {
        let (id, account) = {
            let mut state = self.lock();
            let id = state.next_listener;
            state.next_listener += 1;
            state.listeners.insert(id, Arc::clone(&listener));
            (id, state.account())
        };
        listener(account.as_ref());

        let state = Arc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                state
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .listeners
                    .remove(&id);
            }
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/credits.rs"]
mod tests;
