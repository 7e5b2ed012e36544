use serde::{Deserialize, Serialize};

/// Unified error type for all EPP protocol operations.
///
/// Connection-level variants carry the registry `host` they relate to. All variants are
/// serializable for structured error reporting.
///
/// # Registry outcomes vs. infrastructure failures
///
/// [`Protocol`](Self::Protocol) and [`LoginFailed`](Self::LoginFailed) mean the registry
/// answered and refused the command. Everything else means the exchange itself broke
/// (socket, TLS, framing, XML) and the session should be considered unusable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum EppError {
    /// TCP connect or TLS handshake with the registry failed.
    ConnectionFailed {
        /// Registry host.
        host: String,
        /// Error details.
        detail: String,
    },

    /// The registry rejected the login command.
    LoginFailed {
        /// Account the login was attempted for.
        username: String,
        /// EPP result code, if a response was received.
        result_code: Option<u16>,
        /// Result message from the registry.
        message: String,
    },

    /// An I/O error on an established connection.
    NetworkError {
        /// Error details.
        detail: String,
    },

    /// Connecting, or waiting for a response frame, took too long.
    Timeout {
        /// Registry host.
        host: String,
        /// Error details.
        detail: String,
    },

    /// The registry answered with a result code of 2000 or above.
    Protocol {
        /// EPP result code.
        result_code: u16,
        /// Result message from the registry.
        message: String,
    },

    /// A response could not be parsed.
    ParseError {
        /// Details about the parse failure.
        detail: String,
    },

    /// A command could not be serialized.
    SerializationError {
        /// Details about the serialization failure.
        detail: String,
    },

    /// A frame header announced a length outside the accepted range.
    FrameTooLarge {
        /// Announced total frame length, header included.
        length: u32,
        /// Configured maximum.
        limit: u32,
    },

    /// A command was issued on a connection that was never opened or is already closed.
    NotConnected,
}

impl EppError {
    /// Whether the error is a registry decision rather than an infrastructure failure.
    ///
    /// Callers log `true` at `warn` and `false` at `error`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        matches!(self, Self::Protocol { .. } | Self::LoginFailed { .. })
    }

    /// EPP result code carried by the error, if any.
    #[must_use]
    pub fn result_code(&self) -> Option<u16> {
        match self {
            Self::Protocol { result_code, .. } => Some(*result_code),
            Self::LoginFailed { result_code, .. } => *result_code,
            _ => None,
        }
    }
}

impl std::fmt::Display for EppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionFailed { host, detail } => {
                write!(f, "[nominet] Connection to {host} failed: {detail}")
            }
            Self::LoginFailed {
                username,
                result_code,
                message,
            } => {
                if let Some(code) = result_code {
                    write!(f, "[nominet] Login failed for {username} ({code}): {message}")
                } else {
                    write!(f, "[nominet] Login failed for {username}: {message}")
                }
            }
            Self::NetworkError { detail } => write!(f, "[nominet] Network error: {detail}"),
            Self::Timeout { host, detail } => write!(f, "[nominet] Timeout talking to {host}: {detail}"),
            Self::Protocol {
                result_code,
                message,
            } => write!(f, "[nominet] {message} ({result_code})"),
            Self::ParseError { detail } => write!(f, "[nominet] Parse error: {detail}"),
            Self::SerializationError { detail } => {
                write!(f, "[nominet] Serialization error: {detail}")
            }
            Self::FrameTooLarge { length, limit } => {
                write!(f, "[nominet] Frame of {length} bytes exceeds limit of {limit}")
            }
            Self::NotConnected => write!(f, "[nominet] Not connected"),
        }
    }
}

impl std::error::Error for EppError {}

impl From<std::io::Error> for EppError {
    fn from(e: std::io::Error) -> Self {
        Self::NetworkError {
            detail: e.to_string(),
        }
    }
}

/// Convenience type alias for `Result<T, EppError>`.
pub type Result<T> = std::result::Result<T, EppError>;
