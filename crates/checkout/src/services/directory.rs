//! Directory service trait and in-memory implementation.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use common::UserId;
use tokio::sync::RwLock;

/// Trait for user existence lookups.
///
/// User management itself lives outside the engine; the engine only ever
/// asks whether a user exists.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Returns true if the user is registered.
    async fn user_exists(&self, user_id: &UserId) -> bool;
}

/// In-memory directory for server wiring and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    users: Arc<RwLock<HashSet<UserId>>>,
}

impl InMemoryDirectory {
    /// Creates a new empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user, returning the id for convenience.
    pub async fn register(&self, user_id: UserId) -> UserId {
        self.users.write().await.insert(user_id);
        user_id
    }

    /// Returns the number of registered users.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn user_exists(&self, user_id: &UserId) -> bool {
        self.users.read().await.contains(user_id)
    }
}
