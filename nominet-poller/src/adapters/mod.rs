//! Adapters bridging the poller's configuration with the core traits.
//!
//! - **`FileCredentialStore`**: reads `[[accounts]]` from the config file on every sweep,
//!   so account edits apply without a restart. Read-only.

mod credential_store;

pub use credential_store::FileCredentialStore;
