//! TOML configuration for the poller
//!
//! ```toml
//! [poll]
//! interval_minutes = 15
//! max_messages = 100
//!
//! [transport]
//! read_timeout_secs = 90
//!
//! [[accounts]]
//! id = "main"
//! username = "EXAMPLE-TAG"
//! password = "secret"
//! sandbox = true
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, ensure};
use nominet_core::DEFAULT_MAX_MESSAGES;
use nominet_core::types::{AccountCredentials, PROCESS_POLL_TASK, RegistrarAccount};
use nominet_epp::ConnectorOptions;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    pub poll: PollSettings,
    pub transport: ConnectorOptions,
    pub accounts: Vec<AccountConfig>,
}

impl PollerConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(raw)?;
        ensure!(
            config.poll.interval_minutes > 0,
            "poll.interval_minutes must be at least 1"
        );
        Ok(config)
    }

    pub fn registrar_accounts(&self) -> Vec<RegistrarAccount> {
        self.accounts.iter().map(AccountConfig::to_account).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    pub interval_minutes: u64,
    /// Per account, per run.
    pub max_messages: usize,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_minutes: PROCESS_POLL_TASK.interval.as_secs() / 60,
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }
}

impl PollSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes * 60)
    }
}

const fn default_true() -> bool {
    true
}

/// One `[[accounts]]` row.
#[derive(Clone, Deserialize)]
pub struct AccountConfig {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_true")]
    pub secure: bool,
    #[serde(default)]
    pub sandbox: bool,
    #[serde(default = "default_true")]
    pub poll_enabled: bool,
}

impl AccountConfig {
    /// Rows without a username carry no credentials.
    pub fn to_account(&self) -> RegistrarAccount {
        let credentials = (!self.username.trim().is_empty()).then(|| {
            let mut credentials = AccountCredentials::new(self.username.trim(), &self.password)
                .sandbox(self.sandbox);
            credentials.secure = self.secure;
            credentials
        });
        RegistrarAccount {
            id: self.id.clone(),
            credentials,
            poll_enabled: self.poll_enabled,
        }
    }
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"***")
            .field("secure", &self.secure)
            .field("sandbox", &self.sandbox)
            .field("poll_enabled", &self.poll_enabled)
            .finish()
    }
}
