use std::sync::Arc;

use async_trait::async_trait;

use crate::command::EppCommand;
use crate::error::Result;
use crate::extensions::ExtensionRegistry;
use crate::response::EppResponse;
use crate::types::AccountCredentials;

/// An authenticated EPP session.
///
/// Implementations serialise requests: at most one command is in flight per connection.
#[async_trait]
pub trait EppConnection: Send + Sync {
    /// Registrar account the session is logged in as.
    fn username(&self) -> &str;

    /// Sends one command and returns the decoded response.
    ///
    /// Registry failures (result code >= 2000) come back as `Ok` with the code set;
    /// `Err` means the exchange itself failed.
    async fn request(&self, command: &EppCommand) -> Result<EppResponse>;

    /// Sends `<logout/>` and closes the transport. Idempotent.
    async fn logout(&self) -> Result<()>;
}

/// Opens and logs in new sessions.
#[async_trait]
pub trait SessionConnector: Send + Sync {
    async fn open(
        &self,
        credentials: &AccountCredentials,
        registry: Arc<ExtensionRegistry>,
    ) -> Result<Arc<dyn EppConnection>>;
}
