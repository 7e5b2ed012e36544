//! Credential checks against the live registry.

use std::sync::Arc;

use log::warn;
use nominet_epp::{AccountCredentials, commands};

use super::{ServiceContext, send};

/// Domain checked to prove a session can issue commands.
const CHECK_DOMAIN: &str = "nominet.org.uk";

/// Account service
pub struct AccountService {
    ctx: Arc<ServiceContext>,
}

impl AccountService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Logs in and runs a domain check. Any failure means the credentials are unusable.
    pub async fn validate_connection(&self, credentials: &AccountCredentials) -> bool {
        let session = match self.ctx.session(credentials).await {
            Ok(session) => session,
            Err(e) => {
                warn!("[{}] Connection check failed: {e}", credentials.username);
                return false;
            }
        };

        match send(&session, &commands::domain::check(&[CHECK_DOMAIN])).await {
            Ok(response) => !response.check_results().is_empty(),
            Err(e) => {
                warn!("[{}] Connection check failed: {e}", session.username);
                false
            }
        }
    }
}
