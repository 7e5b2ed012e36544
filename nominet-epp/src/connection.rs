//! TLS transport and session login.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, trace, warn};
use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, RootCertStore};
use rustls_pki_types::ServerName;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use uuid::Uuid;

use crate::command::EppCommand;
use crate::commands::session;
use crate::error::{EppError, Result};
use crate::extensions::{ExtensionRegistry, ns};
use crate::framing::{DEFAULT_MAX_FRAME, read_frame, write_frame};
use crate::response::{EppResponse, RESULT_SUCCESS};
use crate::traits::{EppConnection, SessionConnector};
use crate::types::{AccountCredentials, Environment};
use crate::utils::log_sanitizer::sanitize_frame;
use crate::xml::XmlElement;

/// Port the registry serves EPP on.
pub const EPP_PORT: u16 = 700;

fn default_port() -> u16 {
    EPP_PORT
}

/// Registry host and port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EppEndpoint {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl EppEndpoint {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: EPP_PORT,
        }
    }
}

/// Transport settings shared by every session a connector opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorOptions {
    pub production: EppEndpoint,
    pub sandbox: EppEndpoint,
    /// TCP connect and TLS handshake, each.
    pub connect_timeout_secs: u64,
    /// Wait for a single response frame.
    pub read_timeout_secs: u64,
    pub max_frame_bytes: u32,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        Self {
            production: EppEndpoint::new("epp.nominet.org.uk"),
            sandbox: EppEndpoint::new("testbed-epp.nominet.org.uk"),
            connect_timeout_secs: 30,
            read_timeout_secs: 60,
            max_frame_bytes: DEFAULT_MAX_FRAME,
        }
    }
}

impl ConnectorOptions {
    pub fn endpoint(&self, environment: Environment) -> &EppEndpoint {
        match environment {
            Environment::Production => &self.production,
            Environment::Sandbox => &self.sandbox,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Installs the ring provider unless another one is already in place.
fn ensure_crypto_provider() {
    // Err only means a provider was installed earlier.
    let _ = CryptoProvider::install_default(rustls::crypto::ring::default_provider());
}

/// Opens TLS sessions against the production or sandbox registry.
pub struct RegistryConnector {
    options: ConnectorOptions,
    tls: TlsConnector,
}

impl RegistryConnector {
    pub fn new(options: ConnectorOptions) -> Self {
        ensure_crypto_provider();

        let mut root_store = RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Self {
            options,
            tls: TlsConnector::from(Arc::new(config)),
        }
    }

    pub fn options(&self) -> &ConnectorOptions {
        &self.options
    }

    async fn connect_tls(&self, endpoint: &EppEndpoint) -> Result<TlsStream<TcpStream>> {
        let host = endpoint.host.clone();
        let address = format!("{}:{}", endpoint.host, endpoint.port);
        let connect_timeout = self.options.connect_timeout();

        trace!("[nominet] Establishing TCP connection to {address}...");
        let tcp = match timeout(connect_timeout, TcpStream::connect(&address)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(EppError::ConnectionFailed {
                    host,
                    detail: e.to_string(),
                });
            }
            Err(_) => {
                return Err(EppError::Timeout {
                    host,
                    detail: format!("TCP connect exceeded {}s", connect_timeout.as_secs()),
                });
            }
        };

        let server_name =
            ServerName::try_from(host.clone()).map_err(|e| EppError::ConnectionFailed {
                host: host.clone(),
                detail: format!("invalid server name: {e}"),
            })?;

        trace!("[nominet] Performing TLS handshake with {host}...");
        match timeout(connect_timeout, self.tls.connect(server_name, tcp)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(EppError::ConnectionFailed {
                host,
                detail: format!("TLS handshake failed: {e}"),
            }),
            Err(_) => Err(EppError::Timeout {
                host,
                detail: format!("TLS handshake exceeded {}s", connect_timeout.as_secs()),
            }),
        }
    }
}

impl Default for RegistryConnector {
    fn default() -> Self {
        Self::new(ConnectorOptions::default())
    }
}

#[async_trait]
impl SessionConnector for RegistryConnector {
    async fn open(
        &self,
        credentials: &AccountCredentials,
        registry: Arc<ExtensionRegistry>,
    ) -> Result<Arc<dyn EppConnection>> {
        let endpoint = self.options.endpoint(credentials.environment());
        debug!(
            "[nominet] Opening session for {} on {}:{}",
            credentials.username, endpoint.host, endpoint.port
        );

        let stream = self.connect_tls(endpoint).await?;
        let connection = StreamConnection::establish(
            stream,
            credentials,
            registry,
            SessionLimits {
                host: endpoint.host.clone(),
                read_timeout: self.options.read_timeout(),
                max_frame: self.options.max_frame_bytes,
            },
        )
        .await?;

        info!("[nominet] Logged in as {} on {}", credentials.username, endpoint.host);
        Ok(Arc::new(connection))
    }
}

/// Per-connection read limits.
#[derive(Debug, Clone)]
pub struct SessionLimits {
    /// Host name used in error reports.
    pub host: String,
    pub read_timeout: Duration,
    pub max_frame: u32,
}

/// A logged-in session over any byte stream.
pub struct StreamConnection<S> {
    username: String,
    limits: SessionLimits,
    registry: Arc<ExtensionRegistry>,
    stream: Mutex<Option<S>>,
}

impl<S> StreamConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Reads the server greeting and logs in.
    pub async fn establish(
        mut stream: S,
        credentials: &AccountCredentials,
        registry: Arc<ExtensionRegistry>,
        limits: SessionLimits,
    ) -> Result<Self> {
        let greeting = read_with_timeout(&mut stream, &limits).await?;
        let root = XmlElement::parse(&greeting)?;
        let Some(hello) = root.child(ns::EPP, "greeting") else {
            return Err(EppError::ParseError {
                detail: "expected <greeting> from server".to_string(),
            });
        };
        debug!("[nominet] Greeting from {}", hello.child_text(ns::EPP, "svID"));

        let connection = Self {
            username: credentials.username.clone(),
            limits,
            registry,
            stream: Mutex::new(None),
        };

        let login = session::login(&credentials.username, &credentials.password, &connection.registry);
        let response = connection.exchange(&mut stream, &login).await?;
        if response.code != RESULT_SUCCESS {
            warn!(
                "[nominet] Login rejected for {} ({}): {}",
                credentials.username, response.code, response.message
            );
            return Err(EppError::LoginFailed {
                username: credentials.username.clone(),
                result_code: Some(response.code),
                message: response.message,
            });
        }

        *connection.stream.lock().await = Some(stream);
        Ok(connection)
    }

    async fn exchange(&self, stream: &mut S, command: &EppCommand) -> Result<EppResponse> {
        let transaction_id = Uuid::new_v4().simple().to_string();
        let xml = command.to_xml(&transaction_id)?;
        debug!("[{}] >> {}", self.username, sanitize_frame(&xml));

        write_frame(stream, &xml).await?;
        let raw = read_with_timeout(stream, &self.limits).await?;
        debug!("[{}] << {}", self.username, sanitize_frame(&raw));

        EppResponse::decode(&raw, self.registry.response_kind(command.kind()))
    }
}

async fn read_with_timeout<S>(stream: &mut S, limits: &SessionLimits) -> Result<String>
where
    S: AsyncRead + Unpin,
{
    timeout(limits.read_timeout, read_frame(stream, limits.max_frame))
        .await
        .map_err(|_| EppError::Timeout {
            host: limits.host.clone(),
            detail: format!("no response within {}s", limits.read_timeout.as_secs()),
        })?
}

/// Errors after which the stream position is unknown.
fn breaks_stream(error: &EppError) -> bool {
    matches!(
        error,
        EppError::NetworkError { .. } | EppError::Timeout { .. } | EppError::FrameTooLarge { .. }
    )
}

#[async_trait]
impl<S> EppConnection for StreamConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn username(&self) -> &str {
        &self.username
    }

    async fn request(&self, command: &EppCommand) -> Result<EppResponse> {
        let mut guard = self.stream.lock().await;
        let stream = guard.as_mut().ok_or(EppError::NotConnected)?;

        let result = self.exchange(stream, command).await;
        if let Err(e) = &result
            && breaks_stream(e)
        {
            warn!("[{}] Dropping connection after {}: {e}", self.username, command.kind());
            *guard = None;
        }
        result
    }

    async fn logout(&self) -> Result<()> {
        let mut guard = self.stream.lock().await;
        let Some(mut stream) = guard.take() else {
            return Ok(());
        };

        let outcome = self.exchange(&mut stream, &session::logout()).await;
        if let Err(e) = stream.shutdown().await {
            trace!("[{}] Shutdown after logout failed: {e}", self.username);
        }

        match outcome {
            Ok(response) => {
                debug!("[{}] Logged out ({})", self.username, response.code);
                Ok(())
            }
            Err(e) => {
                warn!("[{}] Logout failed: {e}", self.username);
                Err(e)
            }
        }
    }
}
