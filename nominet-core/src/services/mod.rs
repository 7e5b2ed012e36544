//! Service layer: domain lifecycle orchestration and poll queue processing.

mod account_service;
mod contact_service;
mod dnssec_service;
mod domain_service;
mod nameserver_service;
mod poll_service;
mod transfer_service;

use std::sync::Arc;

use log::{debug, error, warn};
use nominet_epp::{AccountCredentials, DomainInfo, EppCommand, EppResponse, commands};

use crate::error::{CoreError, CoreResult, RequestFailure};
use crate::session_pool::{Session, SessionPool};
use crate::traits::PhoneFormatter;
use crate::utils::phone;

pub use account_service::AccountService;
pub use contact_service::ContactService;
pub use dnssec_service::DnssecService;
pub use domain_service::{DomainService, SUPPORTED_TLDS};
pub use nameserver_service::NameserverService;
pub use poll_service::{DEFAULT_MAX_MESSAGES, PollService};
pub use transfer_service::TransferService;

/// Service context, holding the collaborators every service needs.
pub struct ServiceContext {
    sessions: Arc<SessionPool>,
    phone_formatter: Arc<dyn PhoneFormatter>,
}

impl ServiceContext {
    pub fn new(sessions: Arc<SessionPool>, phone_formatter: Arc<dyn PhoneFormatter>) -> Self {
        Self {
            sessions,
            phone_formatter,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionPool> {
        &self.sessions
    }

    pub async fn session(&self, credentials: &AccountCredentials) -> CoreResult<Session> {
        self.sessions.get_session(credentials).await
    }

    /// `+CC.NNNN` form of `number`, or `None` when nothing usable remains.
    pub fn format_phone(&self, number: &str, country: &str) -> Option<String> {
        let formatted = phone::format_phone(self.phone_formatter.as_ref(), number, country);
        (!formatted.is_empty()).then_some(formatted)
    }
}

/// Sends one command and separates success from failure.
///
/// Result codes of 2000 and above, and every transport or decoding error, come back as a
/// [`RequestFailure`] carrying the registry message or the error text.
pub async fn send(session: &Session, command: &EppCommand) -> Result<EppResponse, RequestFailure> {
    let kind = command.kind();
    match session.connection.request(command).await {
        Ok(response) if response.is_success() => {
            debug!("[{}] {kind} -> {}", session.username, response.code);
            Ok(response)
        }
        Ok(response) => {
            warn!(
                "[{}] {kind} refused ({}): {}",
                session.username, response.code, response.message
            );
            Err(RequestFailure {
                command: kind.to_string(),
                code: Some(response.code),
                message: response.message,
            })
        }
        Err(e) => {
            error!("[{}] {kind} failed: {e}", session.username);
            Err(RequestFailure {
                command: kind.to_string(),
                code: None,
                message: e.to_string(),
            })
        }
    }
}

/// `domain:info`, failing with [`CoreError::DomainNotFound`] when no `infData` came back.
pub(crate) async fn fetch_domain_info(session: &Session, domain: &str) -> CoreResult<DomainInfo> {
    let response = send(session, &commands::domain::info(domain)).await?;
    response
        .domain_info()
        .cloned()
        .ok_or_else(|| CoreError::DomainNotFound(domain.to_string()))
}
