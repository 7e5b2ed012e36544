//! Shared helpers for the sandbox integration tests.

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use nominet_epp::{
    AccountCredentials, ConnectorOptions, EppConnection, ExtensionRegistry, RegistryConnector,
    SessionConnector,
};

/// Returns early when any of the listed environment variables is missing.
#[macro_export]
macro_rules! skip_if_no_credentials {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("Skipping test: environment variable {} is not set", $var);
                return;
            }
        )+
    };
}

/// Asserts that a `Result` is `Ok` and unwraps it, failing the test otherwise.
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got {res:?}");
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// Unique throwaway domain under `.co.uk`.
pub fn generate_test_domain() -> String {
    let uuid = uuid::Uuid::new_v4();
    format!("nominet-epp-test-{}.co.uk", &uuid.simple().to_string()[..10])
}

/// A logged-in sandbox session.
pub struct TestContext {
    pub session: Arc<dyn EppConnection>,
}

impl TestContext {
    /// Opens a session on the testbed using `NOMINET_TEST_USERNAME` / `NOMINET_TEST_PASSWORD`.
    pub async fn sandbox() -> Option<Self> {
        let username = env::var("NOMINET_TEST_USERNAME").ok()?;
        let password = env::var("NOMINET_TEST_PASSWORD").ok()?;
        let credentials = AccountCredentials::new(username, password).sandbox(true);

        let connector = RegistryConnector::new(ConnectorOptions::default());
        let session = connector
            .open(&credentials, Arc::new(ExtensionRegistry::nominet()))
            .await
            .ok()?;
        Some(Self { session })
    }
}
