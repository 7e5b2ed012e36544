//! Collaborator abstractions

mod credential_store;
mod phone_formatter;

pub use credential_store::{CredentialStore, InMemoryCredentialStore};
pub use phone_formatter::PhoneFormatter;
