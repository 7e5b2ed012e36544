//! Poll queue draining and the per-account "process poll queue" sweep.

use std::sync::Arc;

use log::{debug, info, warn};
use nominet_epp::{AccountCredentials, PollMessage, commands};

use super::{ServiceContext, send};
use crate::error::CoreResult;
use crate::session_pool::Session;
use crate::traits::CredentialStore;
use crate::types::{AccountPoll, PollSweep};

/// Upper bound on messages taken from one queue per run.
pub const DEFAULT_MAX_MESSAGES: usize = 100;

/// Poll service
pub struct PollService {
    ctx: Arc<ServiceContext>,
    credential_store: Arc<dyn CredentialStore>,
}

impl PollService {
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>, credential_store: Arc<dyn CredentialStore>) -> Self {
        Self {
            ctx,
            credential_store,
        }
    }

    /// Takes up to `max_messages` messages off the session's queue, acknowledging each.
    ///
    /// Stops at the bound, on an empty queue, or at the first failed poll or ack. Failures
    /// are logged and whatever was collected is returned; a message whose ack failed is
    /// still included.
    pub async fn drain(session: &Session, max_messages: usize) -> Vec<PollMessage> {
        let mut messages = Vec::new();
        if max_messages == 0 {
            return messages;
        }

        let mut response = match send(session, &commands::poll::request()).await {
            Ok(response) => response,
            Err(e) => {
                warn!("[{}] Poll request failed: {e}", session.username);
                return messages;
            }
        };

        while response.has_message() {
            let message = PollMessage::from_response(&response, &session.decoder);
            match message.kind() {
                Some(kind) => info!(
                    "[{}] Message {} ({kind}): {}",
                    session.username, message.id, message.message
                ),
                None => debug!(
                    "[{}] Message {} has no recognised payload: {}",
                    session.username, message.id, message.message
                ),
            }
            let id = message.id.clone();
            messages.push(message);

            if let Err(e) = send(session, &commands::poll::acknowledge(&id)).await {
                warn!("[{}] Failed to acknowledge message {id}: {e}", session.username);
                break;
            }
            if messages.len() >= max_messages {
                debug!(
                    "[{}] Stopping after {max_messages} message(s)",
                    session.username
                );
                break;
            }

            response = match send(session, &commands::poll::request()).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("[{}] Poll request failed: {e}", session.username);
                    break;
                }
            };
        }
        messages
    }

    /// Opens (or reuses) the account's session and drains its queue.
    pub async fn poll_account(
        &self,
        credentials: &AccountCredentials,
        max_messages: usize,
    ) -> CoreResult<Vec<PollMessage>> {
        let session = self.ctx.session(credentials).await?;
        Ok(Self::drain(&session, max_messages).await)
    }

    /// Drains every account with polling enabled and credentials configured.
    ///
    /// Each account yields one line in [`PollSweep::entries`]; a failing account does not
    /// stop the others. Sessions stay open; wrap the call in
    /// [`SessionPool::scoped`](crate::SessionPool::scoped) to close them.
    pub async fn process_poll_queue(&self, max_messages: usize) -> CoreResult<PollSweep> {
        let accounts = self.credential_store.load_all().await?;
        let mut sweep = PollSweep::default();

        if accounts.is_empty() {
            let note = "No accounts available for polling.".to_string();
            info!("{note}");
            sweep.entries.push(note);
            return Ok(sweep);
        }

        for account in accounts {
            if !account.poll_enabled {
                let note = format!("Polling disabled for account {}, skipping.", account.label());
                info!("{note}");
                sweep.entries.push(note);
                continue;
            }
            let Some(credentials) = account
                .credentials
                .as_ref()
                .filter(|c| !c.username.trim().is_empty())
            else {
                let note = format!("Skipping account {}: no credentials configured.", account.id);
                info!("{note}");
                sweep.entries.push(note);
                continue;
            };

            match self.poll_account(credentials, max_messages).await {
                Ok(messages) => {
                    let note = format!(
                        "Polled {} message(s) for account {}",
                        messages.len(),
                        credentials.username
                    );
                    info!("{note}");
                    sweep.entries.push(note);
                    sweep.accounts.push(AccountPoll {
                        account_id: account.id.clone(),
                        username: credentials.username.clone(),
                        messages,
                    });
                }
                Err(e) => {
                    let note = format!("Error polling account {}: {e}", credentials.username);
                    warn!("{note}");
                    sweep.entries.push(note);
                }
            }
        }
        Ok(sweep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::test_utils::{FakeRegistry, MockCredentialStore, create_test_context, released};
    use crate::types::RegistrarAccount;
    use nominet_epp::{CommandKind, NotificationType};

    async fn session(registry: &FakeRegistry) -> Session {
        create_test_context(registry)
            .session(&registry.credentials())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn bound_limits_polls_and_acks() {
        let registry = FakeRegistry::new();
        registry.endless_queue(released(&["a.co.uk"], "N"));
        let session = session(&registry).await;

        let messages = PollService::drain(&session, 2).await;

        assert_eq!(messages.len(), 2);
        assert_eq!(registry.acks().len(), 2);
        assert_eq!(registry.count(CommandKind::PollRequest), 2);
    }

    #[tokio::test]
    async fn zero_bound_sends_nothing() {
        let registry = FakeRegistry::new();
        registry.endless_queue(released(&["a.co.uk"], "N"));
        let session = session(&registry).await;

        assert!(PollService::drain(&session, 0).await.is_empty());
        assert!(registry.requests().is_empty());
    }

    #[tokio::test]
    async fn released_domains_message_is_decoded_and_acked_once() {
        let registry = FakeRegistry::new();
        let id = registry.enqueue("Domains released", released(&["a.uk", "b.uk"], "Y"));
        let session = session(&registry).await;

        let messages = PollService::drain(&session, DEFAULT_MAX_MESSAGES).await;

        assert_eq!(messages.len(), 1);
        let message = &messages[0];
        assert_eq!(message.kind(), Some(NotificationType::DomainsReleased));
        assert_eq!(message.domains(), vec!["a.uk", "b.uk"]);
        assert_eq!(message.data().get("account_moved").map(String::as_str), Some("Y"));
        assert_eq!(registry.acks(), vec![id]);
        assert_eq!(registry.count(CommandKind::PollRequest), 2);
    }

    #[tokio::test]
    async fn failed_ack_keeps_message_and_stops() {
        let registry = FakeRegistry::new();
        registry.enqueue("first", released(&["a.uk"], "N"));
        registry.enqueue("second", released(&["b.uk"], "N"));
        registry.respond_with(CommandKind::PollAck, 2303, "Object does not exist");
        let session = session(&registry).await;

        let messages = PollService::drain(&session, DEFAULT_MAX_MESSAGES).await;

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message, "first");
        assert_eq!(registry.count(CommandKind::PollRequest), 1);
        assert_eq!(registry.queue_len(), 2);
    }

    #[tokio::test]
    async fn transport_error_mid_drain_keeps_earlier_messages() {
        let registry = FakeRegistry::new();
        registry.enqueue("first", released(&["a.uk"], "N"));
        registry.enqueue("second", released(&["b.uk"], "N"));
        registry.break_transport_after(CommandKind::PollRequest, 1);
        let session = session(&registry).await;

        let messages = PollService::drain(&session, DEFAULT_MAX_MESSAGES).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(registry.acks().len(), 1);
    }

    #[tokio::test]
    async fn unknown_payload_is_still_acknowledged() {
        let registry = FakeRegistry::new();
        registry.enqueue_raw("Free text only", None);
        let session = session(&registry).await;

        let messages = PollService::drain(&session, DEFAULT_MAX_MESSAGES).await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].kind(), None);
        assert_eq!(registry.acks().len(), 1);
    }

    #[tokio::test]
    async fn sweep_reports_one_line_per_account() {
        let registry = FakeRegistry::new();
        registry.enqueue("Domains released", released(&["a.uk"], "Y"));
        let store = MockCredentialStore::new(vec![
            RegistrarAccount {
                id: "1".to_string(),
                credentials: Some(registry.credentials()),
                poll_enabled: true,
            },
            RegistrarAccount {
                id: "2".to_string(),
                credentials: Some(AccountCredentials::new("QUIET", "pw")),
                poll_enabled: false,
            },
            RegistrarAccount {
                id: "3".to_string(),
                credentials: None,
                poll_enabled: true,
            },
        ]);
        let service = PollService::new(create_test_context(&registry), Arc::new(store));

        let sweep = service.process_poll_queue(DEFAULT_MAX_MESSAGES).await.unwrap();

        assert_eq!(
            sweep.entries,
            vec![
                format!("Polled 1 message(s) for account {}", registry.credentials().username),
                "Polling disabled for account QUIET, skipping.".to_string(),
                "Skipping account 3: no credentials configured.".to_string(),
            ]
        );
        assert_eq!(sweep.message_count(), 1);
        assert_eq!(sweep.accounts[0].account_id, "1");
    }

    #[tokio::test]
    async fn sweep_isolates_connection_failures() {
        let registry = FakeRegistry::new();
        registry.refuse_login_for("BROKEN");
        let store = MockCredentialStore::new(vec![
            RegistrarAccount {
                id: "1".to_string(),
                credentials: Some(AccountCredentials::new("BROKEN", "pw")),
                poll_enabled: true,
            },
            RegistrarAccount {
                id: "2".to_string(),
                credentials: Some(registry.credentials()),
                poll_enabled: true,
            },
        ]);
        let service = PollService::new(create_test_context(&registry), Arc::new(store));

        let sweep = service.process_poll_queue(DEFAULT_MAX_MESSAGES).await.unwrap();

        assert!(sweep.entries[0].starts_with(
            "Error polling account BROKEN: Failed to connect to Nominet EPP server:"
        ));
        assert_eq!(
            sweep.entries[1],
            format!("Polled 0 message(s) for account {}", registry.credentials().username)
        );
    }

    #[tokio::test]
    async fn empty_store_and_store_failure() {
        let registry = FakeRegistry::new();
        let service = PollService::new(
            create_test_context(&registry),
            Arc::new(MockCredentialStore::new(Vec::new())),
        );
        let sweep = service.process_poll_queue(DEFAULT_MAX_MESSAGES).await.unwrap();
        assert_eq!(sweep.entries, vec!["No accounts available for polling."]);

        let service = PollService::new(
            create_test_context(&registry),
            Arc::new(MockCredentialStore::failing("database unavailable")),
        );
        let err = service.process_poll_queue(DEFAULT_MAX_MESSAGES).await.unwrap_err();
        assert!(matches!(err, CoreError::StorageError(_)));
    }
}
