//! Domain lifecycle: availability, registration, renewal, deletion, locking and auth codes.

use std::sync::Arc;

use chrono::{DateTime, Months, Utc};
use log::{debug, info, warn};
use nominet_epp::{
    AccountCredentials, DomainInfo, DomainRegistration, DomainUpdate, Period, PeriodUnit,
    RESULT_SUCCESS, commands, datetime::format_epp_date,
};

use super::contact_service::create_registrant;
use super::{ServiceContext, fetch_domain_info, send};
use crate::error::{CoreError, CoreResult, ValidationErrors};
use crate::types::{RegistrantSource, RegistrationRequest, RegistrationResult, RenewOutcome};
use crate::utils::passwords;
use crate::utils::validation::{self, MAX_NAMESERVERS};

/// Status that blocks outbound transfers.
const TRANSFER_LOCK: &str = "clientTransferProhibited";

/// TLDs offered through the registry.
pub const SUPPORTED_TLDS: [&str; 10] = [
    ".uk", ".co.uk", ".org.uk", ".me.uk", ".ltd.uk", ".net.uk", ".plc.uk", ".sch.uk", ".wales",
    ".cymru",
];

/// Domain service
pub struct DomainService {
    ctx: Arc<ServiceContext>,
}

impl DomainService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    pub fn supported_tlds() -> &'static [&'static str] {
        &SUPPORTED_TLDS
    }

    pub async fn check_availability(
        &self,
        credentials: &AccountCredentials,
        domain: &str,
    ) -> CoreResult<bool> {
        validation::validate_domain(domain)?;
        let session = self.ctx.session(credentials).await?;
        let response = send(&session, &commands::domain::check(&[domain])).await?;
        Ok(response
            .check_results()
            .iter()
            .any(|r| r.name.eq_ignore_ascii_case(domain) && r.available))
    }

    pub async fn domain_info(
        &self,
        credentials: &AccountCredentials,
        domain: &str,
    ) -> CoreResult<DomainInfo> {
        let session = self.ctx.session(credentials).await?;
        fetch_domain_info(&session, domain).await
    }

    pub async fn expiration_date(
        &self,
        credentials: &AccountCredentials,
        domain: &str,
    ) -> CoreResult<Option<DateTime<Utc>>> {
        Ok(self.domain_info(credentials, domain).await?.expires)
    }

    pub async fn registration_date(
        &self,
        credentials: &AccountCredentials,
        domain: &str,
    ) -> CoreResult<Option<DateTime<Utc>>> {
        Ok(self.domain_info(credentials, domain).await?.created)
    }

    /// Registers a domain, creating the registrant contact first when new details are given.
    ///
    /// Input is validated before any request. Succeeds only when the create response
    /// carries a creation date.
    pub async fn register(
        &self,
        credentials: &AccountCredentials,
        request: &RegistrationRequest,
    ) -> CoreResult<RegistrationResult> {
        let domain = request.domain.trim();
        let mut errors = ValidationErrors::new();
        if !validation::is_domain(domain) {
            errors.add("domain", "The given domain is invalid.");
        }
        if request.years == 0 {
            errors.add("years", "The registration term must be at least one year.");
        }
        validation::check_nameservers(&request.nameservers, &mut errors);
        match &request.registrant {
            RegistrantSource::New(details) => validation::check_contact(details, &mut errors),
            RegistrantSource::Existing(handle) if handle.trim().is_empty() => {
                errors.add("registrant", "A registrant contact is required.");
            }
            RegistrantSource::Existing(_) => {}
        }
        errors.into_result()?;

        let session = self.ctx.session(credentials).await?;
        let registrant = match &request.registrant {
            RegistrantSource::New(details) => create_registrant(&self.ctx, &session, details).await?,
            RegistrantSource::Existing(handle) => handle.trim().to_string(),
        };

        let registration = DomainRegistration {
            name: domain.to_string(),
            period: Period::years(request.years),
            registrant: registrant.clone(),
            nameservers: request
                .nameservers
                .iter()
                .map(|ns| ns.trim().to_string())
                .filter(|ns| !ns.is_empty())
                .take(MAX_NAMESERVERS)
                .collect(),
            auth_code: passwords::auth_code(),
        };
        let response = send(&session, &commands::domain::create(&registration)).await?;

        let created = response.domain_created().and_then(|c| c.created);
        let Some(created) = created else {
            warn!("[{}] Create of {domain} returned no creation date", session.username);
            return Err(CoreError::RegistrationUnconfirmed(domain.to_string()));
        };

        info!(
            "[{}] Registered {domain} for {} year(s) with registrant {registrant}",
            session.username, request.years
        );
        Ok(RegistrationResult {
            domain: domain.to_string(),
            registrant,
            auth_code: registration.auth_code,
            created,
            expires: response.domain_created().and_then(|c| c.expires),
        })
    }

    /// Renews by `term`, quoting the expiry date the registry currently holds.
    ///
    /// Terms not measured in years are skipped without contacting the registry.
    pub async fn renew(
        &self,
        credentials: &AccountCredentials,
        domain: &str,
        term: Period,
    ) -> CoreResult<RenewOutcome> {
        if term.unit != PeriodUnit::Year {
            info!("Skipping renewal of {domain}: Nominet renews in whole years only");
            return Ok(RenewOutcome::Skipped);
        }
        validation::validate_domain(domain)?;

        let session = self.ctx.session(credentials).await?;
        let current = fetch_domain_info(&session, domain).await?;
        let expires = current.expires.ok_or_else(|| {
            CoreError::IncompleteResponse(format!("{domain} has no expiry date"))
        })?;

        let months = Months::new(term.value.saturating_mul(12));
        let extended = expires.checked_add_months(months);
        let fresh_term = Utc::now().checked_add_months(months);
        match (extended, fresh_term) {
            (Some(extended), Some(fresh)) if extended > fresh => debug!(
                "[{}] Renewing {domain} moves expiry from {expires} to {extended}",
                session.username
            ),
            _ => debug!(
                "[{}] Renewing {domain} does not extend past a fresh {}-year term",
                session.username, term.value
            ),
        }

        let command = commands::domain::renew(domain, &format_epp_date(&expires), term);
        let response = send(&session, &command).await?;

        if response.code == RESULT_SUCCESS {
            info!("[{}] Renewed {domain} by {} year(s)", session.username, term.value);
            Ok(RenewOutcome::Renewed {
                expires: response.domain_renewed().and_then(|r| r.expires),
            })
        } else {
            warn!(
                "[{}] Renewal of {domain} answered {}: {}",
                session.username, response.code, response.message
            );
            Ok(RenewOutcome::Unconfirmed {
                code: response.code,
                message: response.message,
            })
        }
    }

    pub async fn delete(&self, credentials: &AccountCredentials, domain: &str) -> CoreResult<()> {
        let session = self.ctx.session(credentials).await?;
        send(&session, &commands::domain::delete(domain)).await?;
        info!("[{}] Deleted {domain}", session.username);
        Ok(())
    }

    pub async fn is_locked(
        &self,
        credentials: &AccountCredentials,
        domain: &str,
    ) -> CoreResult<bool> {
        Ok(self
            .domain_info(credentials, domain)
            .await?
            .has_status(TRANSFER_LOCK))
    }

    pub async fn lock(&self, credentials: &AccountCredentials, domain: &str) -> CoreResult<()> {
        let mut update = DomainUpdate::new(domain);
        update.add.statuses.push(TRANSFER_LOCK.to_string());
        self.update(credentials, &update).await
    }

    pub async fn unlock(&self, credentials: &AccountCredentials, domain: &str) -> CoreResult<()> {
        let mut update = DomainUpdate::new(domain);
        update.remove.statuses.push(TRANSFER_LOCK.to_string());
        self.update(credentials, &update).await
    }

    /// Sets a freshly generated authorization code and returns it.
    pub async fn update_auth_code(
        &self,
        credentials: &AccountCredentials,
        domain: &str,
    ) -> CoreResult<String> {
        let code = passwords::auth_code();
        let mut update = DomainUpdate::new(domain);
        update.auth_code = Some(code.clone());
        self.update(credentials, &update).await?;
        Ok(code)
    }

    async fn update(&self, credentials: &AccountCredentials, update: &DomainUpdate) -> CoreResult<()> {
        let session = self.ctx.session(credentials).await?;
        send(&session, &commands::domain::update(update)).await?;
        Ok(())
    }
}
