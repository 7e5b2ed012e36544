//! Utility modules.

/// EPP timestamp parsing and serde helpers.
pub mod datetime;

/// Log sanitization utilities to prevent sensitive data exposure.
pub mod log_sanitizer;
