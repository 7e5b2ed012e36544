//! Phone number formatting collaborator

/// Converts a cleaned phone number plus country code into `+CC.NNNN` form.
///
/// The input has already been stripped to digits, `+` and `.`, with leading zeros
/// removed from numbers that carry no `+`.
pub trait PhoneFormatter: Send + Sync {
    fn format(&self, number: &str, country: &str) -> String;
}
