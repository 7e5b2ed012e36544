//! Registrar-to-registrar transfer. Nominet only supports push transfers by tag.

use std::sync::Arc;

use log::info;
use nominet_epp::{AccountCredentials, commands};

use super::{ServiceContext, send};
use crate::error::{CoreError, CoreResult};
use crate::utils::validation;

fn unsupported(operation: &str) -> CoreError {
    CoreError::Unsupported(format!("{operation} is not supported by the Nominet registry"))
}

/// Transfer service
pub struct TransferService {
    ctx: Arc<ServiceContext>,
}

impl TransferService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Releases `domain` to the registrar identified by `tag`.
    pub async fn push_domain(
        &self,
        credentials: &AccountCredentials,
        domain: &str,
        tag: &str,
    ) -> CoreResult<()> {
        validation::validate_domain(domain)?;
        validation::validate_registrar_tag(tag)?;

        let session = self.ctx.session(credentials).await?;
        let tag = tag.trim().to_ascii_uppercase();
        send(&session, &commands::release::release(domain, &tag)).await?;
        info!("[{}] Released {domain} to {tag}", session.username);
        Ok(())
    }

    pub fn transfer_domain(&self, _domain: &str) -> CoreResult<()> {
        Err(unsupported("Domain transfer"))
    }

    pub fn resend_transfer_email(&self, _domain: &str) -> CoreResult<()> {
        Err(unsupported("Resending the transfer email"))
    }

    pub fn restore_domain(&self, _domain: &str) -> CoreResult<()> {
        Err(unsupported("Domain restore"))
    }

    pub fn send_epp_email(&self, _domain: &str) -> CoreResult<()> {
        Err(unsupported("Sending the EPP code by email"))
    }

    /// Inbound transfers cannot be requested, so no domain is ever transferable.
    pub fn check_transfer_availability(&self, _domain: &str) -> bool {
        false
    }
}
