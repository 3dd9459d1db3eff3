use crate::errors::Result;
use crate::storage::UserStore;
use gpubot_core::Credentials;
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Concurrency-safe mapping from chat user id to credentials.
///
/// One registry per process, constructed at startup and passed to whatever
/// handles commands. A single reader/writer lock guards the whole map;
/// entry count and contention are both low enough that coarse locking is
/// fine.
#[derive(Debug)]
pub struct ConfigRegistry {
    users: RwLock<HashMap<i64, Credentials>>,
    store: UserStore,
}

impl ConfigRegistry {
    /// Create an empty registry backed by the given store.
    pub fn new(store: UserStore) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            store,
        }
    }

    /// Create a registry pre-populated from the store.
    pub fn load(store: UserStore) -> Result<Self> {
        let users = store.load_all()?;
        info!("Loaded {} user entries", users.len());
        Ok(Self {
            users: RwLock::new(users),
            store,
        })
    }

    /// Get a user's credentials, creating an empty entry if absent.
    ///
    /// Reading has a side effect on first access, so this takes the write
    /// lock unconditionally.
    pub fn get_or_create(&self, user_id: i64) -> Credentials {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user_id)
            .or_default()
            .clone()
    }

    /// Replace a user's credentials.
    pub fn set(&self, user_id: i64, credentials: Credentials) {
        debug!("Updating credentials for user {}", user_id);
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id, credentials);
    }

    /// Persist every entry to the store, stopping at the first error.
    pub fn save_all(&self) -> Result<()> {
        let snapshot: Vec<(i64, Credentials)> = self
            .users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, creds)| (*id, creds.clone()))
            .collect();

        for (user_id, credentials) in snapshot {
            self.store.save(user_id, &credentials)?;
        }
        Ok(())
    }
}
