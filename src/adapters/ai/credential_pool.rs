//! Credential Pool - ordered API keys with one shared rotation cursor.
//!
//! Every generation call leases the pool for its whole attempt loop, so
//! callers observe a single linear sequence of rotations and at most one
//! backend request is in flight at a time.

use secrecy::Secret;
use tokio::sync::{Mutex, MutexGuard};

/// Errors building a credential pool.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialPoolError {
    /// No credentials were supplied.
    #[error("credential pool requires at least one API key")]
    Empty,
}

/// Ordered set of interchangeable API keys.
#[derive(Debug)]
pub struct CredentialPool {
    size: usize,
    state: Mutex<PoolState>,
}

#[derive(Debug)]
struct PoolState {
    keys: Vec<Secret<String>>,
    cursor: usize,
}

impl CredentialPool {
    /// Creates a pool starting at the first key.
    pub fn new(keys: Vec<Secret<String>>) -> Result<Self, CredentialPoolError> {
        if keys.is_empty() {
            return Err(CredentialPoolError::Empty);
        }

        Ok(Self {
            size: keys.len(),
            state: Mutex::new(PoolState { keys, cursor: 0 }),
        })
    }

    /// Number of credentials.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Always false; construction rejects empty pools.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Index of the credential the next call will start with.
    pub async fn cursor(&self) -> usize {
        self.state.lock().await.cursor
    }

    /// Acquires exclusive use of the pool.
    ///
    /// The lease must be held across the full attempt loop of one call.
    pub async fn lease(&self) -> PoolLease<'_> {
        PoolLease {
            guard: self.state.lock().await,
        }
    }
}

/// Exclusive access to the pool for the duration of one call.
pub struct PoolLease<'a> {
    guard: MutexGuard<'a, PoolState>,
}

impl PoolLease<'_> {
    /// Index of the current credential.
    pub fn index(&self) -> usize {
        self.guard.cursor
    }

    /// The current credential.
    pub fn current(&self) -> &Secret<String> {
        &self.guard.keys[self.guard.cursor]
    }

    /// Number of credentials in the pool.
    pub fn len(&self) -> usize {
        self.guard.keys.len()
    }

    /// Always false; construction rejects empty pools.
    pub fn is_empty(&self) -> bool {
        self.guard.keys.is_empty()
    }

    /// Advances the cursor circularly and returns the new index.
    pub fn advance(&mut self) -> usize {
        let next = (self.guard.cursor + 1) % self.guard.keys.len();
        self.guard.cursor = next;
        next
    }
}
