//! Registrant contact read-back, synchronisation and deletion.

use std::sync::Arc;

use log::{debug, info};
use nominet_epp::{AccountCredentials, commands};

use super::{ServiceContext, fetch_domain_info, send};
use crate::error::{CoreError, CoreResult, ValidationErrors};
use crate::session_pool::Session;
use crate::types::ContactDetails;
use crate::utils::{passwords, validation};

/// Creates a contact carrying the Nominet extension fields and returns its handle.
///
/// The handle is chosen client-side; the id echoed by the registry wins when present.
pub(crate) async fn create_registrant(
    ctx: &ServiceContext,
    session: &Session,
    details: &ContactDetails,
) -> CoreResult<String> {
    let handle = passwords::generate_contact_id();
    let mut contact = details.to_contact(ctx.format_phone(&details.phone, &details.country));
    contact.auth_password = Some(passwords::contact_password());

    let command = commands::nominet::create_contact(&handle, &contact, &details.extension());
    let response = send(session, &command).await?;
    let id = response
        .contact_created()
        .map(|c| c.id.clone())
        .filter(|id| !id.is_empty())
        .unwrap_or(handle);

    info!("[{}] Created registrant contact {id}", session.username);
    Ok(id)
}

/// Contact service
pub struct ContactService {
    ctx: Arc<ServiceContext>,
}

impl ContactService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// The domain's registrant, or nothing when the domain has none.
    pub async fn get_contacts(
        &self,
        credentials: &AccountCredentials,
        domain: &str,
    ) -> CoreResult<Vec<ContactDetails>> {
        let session = self.ctx.session(credentials).await?;
        let info = fetch_domain_info(&session, domain).await?;
        let Some(registrant) = info.registrant else {
            return Ok(Vec::new());
        };

        let response = send(&session, &commands::contact::info(&registrant)).await?;
        let contact = response.contact_info().ok_or_else(|| {
            CoreError::IncompleteResponse(format!("no contact data for {registrant}"))
        })?;
        Ok(vec![ContactDetails::from_contact_info(contact)])
    }

    /// Writes each named contact onto the domain's registrant handle.
    ///
    /// Contacts without a name are skipped. Returns how many updates were sent; the
    /// first failure aborts the call.
    pub async fn set_contacts(
        &self,
        credentials: &AccountCredentials,
        domain: &str,
        contacts: &[ContactDetails],
    ) -> CoreResult<usize> {
        let named: Vec<&ContactDetails> = contacts.iter().filter(|c| c.has_name()).collect();
        let mut errors = ValidationErrors::new();
        for contact in &named {
            validation::check_contact(contact, &mut errors);
        }
        errors.into_result()?;

        let session = self.ctx.session(credentials).await?;
        let info = fetch_domain_info(&session, domain).await?;
        let registrant = info.registrant.ok_or_else(|| {
            CoreError::IncompleteResponse(format!("{domain} has no registrant"))
        })?;

        for contact in &named {
            let changes =
                contact.to_contact(self.ctx.format_phone(&contact.phone, &contact.country));
            let command =
                commands::nominet::update_contact(&registrant, &changes, &contact.extension());
            send(&session, &command).await?;
        }

        debug!(
            "[{}] Updated registrant {registrant} of {domain} ({} contact(s), {} skipped)",
            session.username,
            named.len(),
            contacts.len() - named.len()
        );
        Ok(named.len())
    }

    pub async fn delete_contact(
        &self,
        credentials: &AccountCredentials,
        handle: &str,
    ) -> CoreResult<()> {
        let session = self.ctx.session(credentials).await?;
        send(&session, &commands::contact::delete(handle)).await?;
        info!("[{}] Deleted contact {handle}", session.username);
        Ok(())
    }
}
