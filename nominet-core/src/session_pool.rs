//! Cache of authenticated sessions, one per registrar username.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use log::{debug, error, info, warn};
use nominet_epp::{
    AccountCredentials, EppConnection, ExtensionRegistry, NotificationDecoder, SessionConnector,
};
use tokio::sync::{Mutex, RwLock};

use crate::error::{CoreError, CoreResult};

/// A cached, logged-in session plus the registry and decoder it was opened with.
#[derive(Clone)]
pub struct Session {
    pub username: String,
    pub connection: Arc<dyn EppConnection>,
    pub registry: Arc<ExtensionRegistry>,
    pub decoder: Arc<NotificationDecoder>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Opens sessions on demand and tears all of them down on [`SessionPool::close_all`].
///
/// Sessions are keyed by username and live until `close_all`; a failed login is never
/// retried by the pool. Logins run outside the cache lock: a slow login holds up only
/// other callers for the same username.
pub struct SessionPool {
    connector: Arc<dyn SessionConnector>,
    registry: Arc<ExtensionRegistry>,
    decoder: Arc<NotificationDecoder>,
    sessions: RwLock<HashMap<String, Session>>,
    /// One gate per username with a login in flight.
    connecting: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionPool {
    /// Pool using the Nominet extension registry.
    pub fn new(connector: Arc<dyn SessionConnector>) -> Self {
        Self::with_registry(connector, ExtensionRegistry::nominet())
    }

    pub fn with_registry(connector: Arc<dyn SessionConnector>, registry: ExtensionRegistry) -> Self {
        let decoder = NotificationDecoder::new(&registry);
        Self {
            connector,
            registry: Arc::new(registry),
            decoder: Arc::new(decoder),
            sessions: RwLock::new(HashMap::new()),
            connecting: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached session for `credentials.username`, opening it on first use.
    pub async fn get_session(&self, credentials: &AccountCredentials) -> CoreResult<Session> {
        let username = credentials.username.trim();
        if username.is_empty() {
            return Err(CoreError::MissingUsername);
        }

        if let Some(session) = self.cached(username).await {
            return Ok(session);
        }

        let gate = {
            let mut connecting = self.connecting.lock().await;
            Arc::clone(connecting.entry(username.to_string()).or_default())
        };
        let _in_flight = gate.lock().await;
        // Another caller may have connected while we waited at the gate
        if let Some(session) = self.cached(username).await {
            return Ok(session);
        }

        let opened = self.open(credentials, username).await;
        if let Ok(session) = &opened {
            self.sessions
                .write()
                .await
                .insert(username.to_string(), session.clone());
            info!("[{username}] EPP session ready");
        }
        self.connecting.lock().await.remove(username);
        opened
    }

    async fn cached(&self, username: &str) -> Option<Session> {
        self.sessions.read().await.get(username).cloned()
    }

    async fn open(&self, credentials: &AccountCredentials, username: &str) -> CoreResult<Session> {
        debug!("[{username}] Opening EPP session");
        let connection = self
            .connector
            .open(credentials, Arc::clone(&self.registry))
            .await
            .map_err(|source| {
                error!("[{username}] Failed to connect to Nominet EPP server: {source}");
                CoreError::Connection {
                    username: username.to_string(),
                    source,
                }
            })?;

        Ok(Session {
            username: username.to_string(),
            connection,
            registry: Arc::clone(&self.registry),
            decoder: Arc::clone(&self.decoder),
        })
    }

    /// Logs out every cached session. Individual logout failures are logged and skipped;
    /// the cache is empty afterwards.
    pub async fn close_all(&self) {
        let drained: Vec<Session> = {
            let mut sessions = self.sessions.write().await;
            sessions.drain().map(|(_, session)| session).collect()
        };

        for session in drained {
            match session.connection.logout().await {
                Ok(()) => debug!("[{}] Logged out", session.username),
                Err(e) => warn!("[{}] Logout failed: {e}", session.username),
            }
        }
    }

    /// Runs `work`, then closes every session regardless of its outcome.
    pub async fn scoped<F, T>(&self, work: F) -> T
    where
        F: Future<Output = T>,
    {
        let output = work.await;
        self.close_all().await;
        output
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    pub fn decoder(&self) -> &NotificationDecoder {
        &self.decoder
    }
}
