//! Config-file credential store (Read-Only)

use std::path::PathBuf;

use async_trait::async_trait;
use nominet_core::error::{CoreError, CoreResult};
use nominet_core::traits::CredentialStore;
use nominet_core::types::RegistrarAccount;

use crate::config::PollerConfig;

/// Credential store reading the `[[accounts]]` table of the poller config.
///
/// The file is parsed again on every [`load_all`](CredentialStore::load_all); nothing is
/// cached and nothing is ever written back.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load_all(&self) -> CoreResult<Vec<RegistrarAccount>> {
        let path = self.path.clone();
        let config = tokio::task::spawn_blocking(move || {
            tracing::debug!("Loading accounts from {}", path.display());
            PollerConfig::load(&path)
        })
        .await
        .map_err(|e| CoreError::StorageError(format!("Task join error: {e}")))?
        .map_err(|e| CoreError::StorageError(format!("{e:#}")))?;

        let accounts = config.registrar_accounts();
        tracing::debug!("Loaded {} account(s)", accounts.len());
        Ok(accounts)
    }
}
