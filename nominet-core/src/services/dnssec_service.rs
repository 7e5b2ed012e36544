//! DS record management through the secDNS extension.

use std::sync::Arc;

use log::info;
use nominet_epp::{AccountCredentials, DsRecord, commands};

use super::{ServiceContext, fetch_domain_info, send};
use crate::error::CoreResult;
use crate::utils::validation;

/// DNSSEC service
pub struct DnssecService {
    ctx: Arc<ServiceContext>,
}

impl DnssecService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub async fn get_dnssec(
        &self,
        credentials: &AccountCredentials,
        domain: &str,
    ) -> CoreResult<Vec<DsRecord>> {
        let session = self.ctx.session(credentials).await?;
        Ok(fetch_domain_info(&session, domain).await?.ds_records)
    }

    /// Adds one record; only the fields that are set are sent.
    pub async fn add_dnssec(
        &self,
        credentials: &AccountCredentials,
        domain: &str,
        record: &DsRecord,
    ) -> CoreResult<()> {
        validation::validate_domain(domain)?;
        validation::validate_ds_record(record)?;

        let session = self.ctx.session(credentials).await?;
        send(
            &session,
            &commands::dnssec::add_records(domain, std::slice::from_ref(record)),
        )
        .await?;
        info!(
            "[{}] Added DS record {:?} to {domain}",
            session.username, record.key_tag
        );
        Ok(())
    }

    /// Removes every current record whose key tag, algorithm, digest type and digest all
    /// equal `target`. Returns the number removed.
    ///
    /// The remove update is always submitted, carrying no records when none match, so the
    /// registry decides the outcome.
    pub async fn delete_dnssec(
        &self,
        credentials: &AccountCredentials,
        domain: &str,
        target: &DsRecord,
    ) -> CoreResult<usize> {
        let session = self.ctx.session(credentials).await?;
        let current = fetch_domain_info(&session, domain).await?;
        let matches: Vec<DsRecord> = current
            .ds_records
            .into_iter()
            .filter(|record| record.same_identity(target))
            .collect();

        if matches.is_empty() {
            info!(
                "[{}] No DS record on {domain} matches key tag {:?}",
                session.username, target.key_tag
            );
        }

        send(&session, &commands::dnssec::remove_records(domain, &matches)).await?;
        info!(
            "[{}] Removed {} DS record(s) from {domain}",
            session.username,
            matches.len()
        );
        Ok(matches.len())
    }
}
