//! Nominet EPP Core Library
//!
//! Business logic on top of the `nominet-epp` protocol crate:
//! - Session pool: one authenticated session per registrar account
//! - Domain lifecycle: register, renew, delete, lock, auth codes
//! - Contacts, name servers, glue records and DNSSEC
//! - Poll queue draining across every configured account
//!
//! Storage and phone formatting are abstracted through traits so the same services run
//! from a scheduled poller, a web backend or tests.

pub mod error;
pub mod services;
pub mod session_pool;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{CoreError, CoreResult, RequestFailure, ValidationErrors};
pub use nominet_epp;
pub use services::{
    AccountService, ContactService, DEFAULT_MAX_MESSAGES, DnssecService, DomainService,
    NameserverService, PollService, SUPPORTED_TLDS, ServiceContext, TransferService,
};
pub use session_pool::{Session, SessionPool};
pub use traits::{CredentialStore, InMemoryCredentialStore, PhoneFormatter};
pub use utils::phone::DottedPhoneFormatter;
