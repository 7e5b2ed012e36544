//! Utility functions module

pub mod passwords;
pub mod phone;
pub mod validation;
