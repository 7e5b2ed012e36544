//! Unified error type definition

use std::collections::BTreeMap;
use std::fmt;

use nominet_epp::EppError;
use serde::Serialize;
use thiserror::Error;

/// Failure sentinel of the request wrapper.
///
/// `code` is the registry result code for refusals (>= 2000) and `None` when the
/// exchange itself failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFailure {
    pub command: String,
    pub code: Option<u16>,
    pub message: String,
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} failed ({code}): {}", self.command, self.message),
            None => write!(f, "{} failed: {}", self.command, self.message),
        }
    }
}

impl std::error::Error for RequestFailure {}

/// Field-level validation messages, keyed by input field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> CoreResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().flatten().map(String::as_str).collect();
        f.write_str(&messages.join(" "))
    }
}

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Opening or logging in a session failed
    #[error("Failed to connect to Nominet EPP server: {source}")]
    Connection {
        username: String,
        #[source]
        source: EppError,
    },

    /// Credentials without a username
    #[error("Nominet username is not configured")]
    MissingUsername,

    /// A request was refused by the registry or its exchange failed
    #[error("{0}")]
    RequestFailed(RequestFailure),

    /// Caller input rejected before any request was sent
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// Operation the registry does not offer
    #[error("{0}")]
    Unsupported(String),

    /// Domain create answered without a creation date
    #[error("Registration of {0} was not confirmed by the registry")]
    RegistrationUnconfirmed(String),

    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    /// A successful response lacked data the operation depends on
    #[error("Incomplete response: {0}")]
    IncompleteResponse(String),

    /// Credential storage error
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("{0}")]
    Epp(#[from] EppError),
}

impl From<RequestFailure> for CoreError {
    fn from(failure: RequestFailure) -> Self {
        Self::RequestFailed(failure)
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl CoreError {
    /// Whether it is expected behavior (user input, registry refusal, unsupported operation),
    /// used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::MissingUsername
            | Self::Validation(_)
            | Self::Unsupported(_)
            | Self::DomainNotFound(_)
            | Self::RegistrationUnconfirmed(_) => true,
            Self::RequestFailed(failure) => failure.code.is_some(),
            Self::Connection { source, .. } | Self::Epp(source) => source.is_expected(),
            _ => false,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
