//! Registrar account and poll task types

use std::time::Duration;

use nominet_epp::{AccountCredentials, PollMessage};
use serde::{Deserialize, Serialize};

/// One stored registrar account as handed out by the credential store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrarAccount {
    /// Storage identifier, used in log lines when no username is known.
    pub id: String,
    /// `None` when the row has no username/password configured.
    pub credentials: Option<AccountCredentials>,
    #[serde(default)]
    pub poll_enabled: bool,
}

impl RegistrarAccount {
    /// Username when set, otherwise the storage id.
    pub fn label(&self) -> &str {
        self.credentials
            .as_ref()
            .map(|c| c.username.as_str())
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.id)
    }
}

/// Descriptor of a recurring task registered with an external scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub interval: Duration,
}

pub const PROCESS_POLL_TASK: ScheduledTask = ScheduledTask {
    key: "process_poll",
    name: "Process Nominet Poll Queue",
    description: "Retrieves and acknowledges pending messages from the Nominet EPP message queue.",
    interval: Duration::from_secs(15 * 60),
};

/// Messages drained for one account in a sweep.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPoll {
    pub account_id: String,
    pub username: String,
    pub messages: Vec<PollMessage>,
}

/// Outcome of one run of the poll task: a one-line note per account plus the drained messages.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSweep {
    pub entries: Vec<String>,
    pub accounts: Vec<AccountPoll>,
}

impl PollSweep {
    pub fn message_count(&self) -> usize {
        self.accounts.iter().map(|a| a.messages.len()).sum()
    }
}
