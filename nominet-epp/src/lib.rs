//! # nominet-epp
//!
//! EPP protocol layer for the Nominet UK registry.
//!
//! ## Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`framing`] | RFC 5734 length-prefixed data units |
//! | [`RegistryConnector`] | TLS to `epp.nominet.org.uk` / `testbed-epp.nominet.org.uk` on port 700, greeting and login |
//! | [`ExtensionRegistry`] | Object and extension URIs announced at login, notification aliases, command to response mapping |
//! | [`commands`] | Builders for domain, contact, host, poll, release, secDNS and Nominet contact-extension commands |
//! | [`EppResponse`] | Result code, message queue envelope and typed `resData` |
//! | [`NotificationDecoder`] | Classifies poll messages and extracts their fields |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use nominet_epp::{
//!     commands, AccountCredentials, ExtensionRegistry, RegistryConnector, SessionConnector,
//! };
//!
//! # async fn example() -> nominet_epp::Result<()> {
//! let connector = RegistryConnector::default();
//! let credentials = AccountCredentials::new("MYTAG", "password").sandbox(true);
//! let session = connector
//!     .open(&credentials, Arc::new(ExtensionRegistry::nominet()))
//!     .await?;
//!
//! let response = session.request(&commands::domain::check(&["example.co.uk"])).await?;
//! for result in response.check_results() {
//!     println!("{} available: {}", result.name, result.available);
//! }
//! session.logout().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! A registry refusal (result code 2000 and above) is a normal [`EppResponse`]; call
//! [`EppResponse::into_result`] to turn it into [`EppError::Protocol`]. Every other
//! [`EppError`] means the exchange itself failed.

mod command;
pub mod commands;
mod connection;
mod error;
mod extensions;
pub mod framing;
mod notification;
mod response;
mod traits;
mod types;
mod utils;
mod xml;

pub use command::EppCommand;
pub use connection::{
    ConnectorOptions, EPP_PORT, EppEndpoint, RegistryConnector, SessionLimits, StreamConnection,
};
pub use error::{EppError, Result};
pub use extensions::{CommandKind, ExtensionRegistry, ResponseKind, ns};
pub use notification::{MarkerRule, Notification, NotificationDecoder, NotificationType, PollMessage};
pub use response::{
    EppResponse, RESULT_ENDING_SESSION, RESULT_ERROR_THRESHOLD, RESULT_MESSAGE_AVAILABLE,
    RESULT_PENDING, RESULT_QUEUE_EMPTY, RESULT_SUCCESS, ResponseData,
};
pub use traits::{EppConnection, SessionConnector};
pub use types::{
    AccountCredentials, CheckResult, Contact, ContactCreated, ContactExtension, ContactInfo,
    DigestType, DnssecAlgorithm, DomainCreated, DomainInfo, DomainRegistration, DomainRenewed,
    DomainUpdate, DomainUpdateSet, DsRecord, Environment, HostInfo, KeyFlags, MessageQueue,
    Nameserver, Period, PeriodUnit, PostalInfoType, RegistrantType,
};
pub use utils::{datetime, log_sanitizer};
pub use xml::XmlElement;
