//! Domain lifecycle request and result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ContactDetails;

/// Where the registrant of a new domain comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "camelCase")]
pub enum RegistrantSource {
    /// Create a new contact first and register against its handle.
    New(Box<ContactDetails>),
    /// Register against an existing contact handle.
    Existing(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub domain: String,
    pub years: u32,
    pub registrant: RegistrantSource,
    /// ns1..ns5; blank entries are skipped.
    #[serde(default)]
    pub nameservers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResult {
    pub domain: String,
    /// Handle the domain was registered against.
    pub registrant: String,
    pub auth_code: String,
    pub created: DateTime<Utc>,
    #[serde(default, with = "nominet_epp::datetime")]
    pub expires: Option<DateTime<Utc>>,
}

/// Result of a renewal attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum RenewOutcome {
    /// Registry answered 1000.
    Renewed {
        #[serde(default, with = "nominet_epp::datetime")]
        expires: Option<DateTime<Utc>>,
    },
    /// Registry accepted the command with a code other than 1000 (e.g. 1001 pending).
    Unconfirmed { code: u16, message: String },
    /// Term was not in years; nothing was sent.
    Skipped,
}

impl RenewOutcome {
    pub fn is_renewed(&self) -> bool {
        matches!(self, Self::Renewed { .. })
    }
}
