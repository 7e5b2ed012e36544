//! Type definitions

mod account;
mod contact;
mod domain;

pub use account::{AccountPoll, PROCESS_POLL_TASK, PollSweep, RegistrarAccount, ScheduledTask};
pub use contact::ContactDetails;
pub use domain::{RegistrantSource, RegistrationRequest, RegistrationResult, RenewOutcome};

// Re-export protocol types used in service signatures
pub use nominet_epp::{
    AccountCredentials, DomainInfo, DsRecord, Nameserver, Notification, NotificationType, Period,
    PeriodUnit, PollMessage, RegistrantType,
};
