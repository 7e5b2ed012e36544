//! Credential store abstraction

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreResult;
use crate::types::RegistrarAccount;

/// Source of the registrar accounts the poll task iterates over.
///
/// Implementations:
/// - `nominet-poller`: accounts listed in the TOML config file
/// - [`InMemoryCredentialStore`]: fixed list, for embedding and tests
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Loads every configured account, including disabled and credential-less rows.
    async fn load_all(&self) -> CoreResult<Vec<RegistrarAccount>>;
}

/// Credential store backed by a list held in memory.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    accounts: RwLock<Vec<RegistrarAccount>>,
}

impl InMemoryCredentialStore {
    pub fn new(accounts: Vec<RegistrarAccount>) -> Self {
        Self {
            accounts: RwLock::new(accounts),
        }
    }

    /// Replaces an account with the same id, or appends it.
    pub async fn upsert(&self, account: RegistrarAccount) {
        let mut accounts = self.accounts.write().await;
        match accounts.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => *existing = account,
            None => accounts.push(account),
        }
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load_all(&self) -> CoreResult<Vec<RegistrarAccount>> {
        Ok(self.accounts.read().await.clone())
    }
}
