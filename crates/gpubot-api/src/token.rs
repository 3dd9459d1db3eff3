use std::sync::{PoisonError, RwLock};

/// Concurrency-safe holder of a single mutable bearer token.
///
/// An empty token means "unauthenticated". Reads are shared, writes
/// exclusive; command handlers running on overlapping chat updates may call
/// both from concurrent tasks. The lock is never held across an await.
#[derive(Debug, Default)]
pub struct TokenHolder {
    token: RwLock<String>,
}

impl TokenHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current token, possibly empty.
    pub fn get(&self) -> String {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the held token.
    pub fn set(&self, token: String) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn is_empty(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}
