//! Delegation nameservers and glue records.

use std::net::IpAddr;
use std::sync::Arc;

use log::{debug, info};
use nominet_epp::{AccountCredentials, DomainUpdate, Nameserver, commands};

use super::{ServiceContext, fetch_domain_info, send};
use crate::error::{CoreResult, ValidationErrors};
use crate::session_pool::Session;
use crate::utils::validation;

/// Nameserver service
pub struct NameserverService {
    ctx: Arc<ServiceContext>,
}

impl NameserverService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// Delegated nameservers with surrounding dots trimmed.
    pub async fn get_nameservers(
        &self,
        credentials: &AccountCredentials,
        domain: &str,
    ) -> CoreResult<Vec<Nameserver>> {
        let session = self.ctx.session(credentials).await?;
        let info = fetch_domain_info(&session, domain).await?;
        Ok(info
            .nameservers
            .into_iter()
            .map(|ns| Nameserver {
                hostname: ns.hostname.trim_matches('.').to_string(),
                addresses: ns.addresses,
            })
            .collect())
    }

    /// Replaces the delegation: every current nameserver is removed and the supplied
    /// ones added, in a single update.
    pub async fn set_nameservers(
        &self,
        credentials: &AccountCredentials,
        domain: &str,
        nameservers: &[String],
    ) -> CoreResult<()> {
        validation::validate_domain(domain)?;
        validation::validate_nameservers(nameservers)?;

        let session = self.ctx.session(credentials).await?;
        let current = fetch_domain_info(&session, domain).await?;

        let mut update = DomainUpdate::new(domain);
        update.remove.nameservers = current.nameservers.into_iter().map(|ns| ns.hostname).collect();
        update.add.nameservers = nameservers
            .iter()
            .map(|ns| ns.trim().to_string())
            .filter(|ns| !ns.is_empty())
            .collect();
        send(&session, &commands::domain::update(&update)).await?;

        info!(
            "[{}] Set {} nameserver(s) on {domain}",
            session.username,
            update.add.nameservers.len()
        );
        Ok(())
    }

    /// Sets glue for each `(host, addresses)` pair: existing hosts have their address set
    /// replaced, unknown hosts are created. The first failure aborts the call.
    pub async fn set_nameserver_ips(
        &self,
        credentials: &AccountCredentials,
        glue: &[(String, Vec<IpAddr>)],
    ) -> CoreResult<()> {
        let mut errors = ValidationErrors::new();
        for (index, (host, _)) in glue.iter().enumerate() {
            if !validation::is_domain(host) {
                let slot = index + 1;
                errors.add(format!("ns{slot}"), format!("Invalid Name Server {slot}"));
            }
        }
        errors.into_result()?;

        let session = self.ctx.session(credentials).await?;
        for (host, addresses) in glue {
            let host = host.trim();
            if host_exists(&session, host).await {
                let response = send(&session, &commands::host::info(host)).await?;
                let current = response
                    .host_info()
                    .map(|h| h.addresses.clone())
                    .unwrap_or_default();
                send(&session, &commands::host::update(host, addresses, &current)).await?;
                debug!("[{}] Replaced glue of {host}", session.username);
            } else {
                send(&session, &commands::host::create(host, addresses)).await?;
                debug!("[{}] Created host {host}", session.username);
            }
        }
        Ok(())
    }
}

/// A failed check counts as "does not exist".
async fn host_exists(session: &Session, host: &str) -> bool {
    match send(session, &commands::host::check(&[host])).await {
        Ok(response) => response
            .check_results()
            .iter()
            .any(|r| r.name.eq_ignore_ascii_case(host) && !r.available),
        Err(_) => false,
    }
}
