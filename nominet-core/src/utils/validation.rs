//! Input validation run before any request is sent.

use std::net::IpAddr;
use std::sync::LazyLock;

use nominet_epp::{DigestType, DnssecAlgorithm, DsRecord, KeyFlags};
use regex::Regex;

use crate::error::{CoreResult, ValidationErrors};
use crate::types::ContactDetails;

/// Nameserver slots offered per domain.
pub const MAX_NAMESERVERS: usize = 5;

/// Slots that must be filled.
pub const REQUIRED_NAMESERVERS: usize = 2;

static DOMAIN_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^(?i)(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+(?:[a-z]{2,63}|xn--[a-z0-9-]{1,59})$",
    )
    .ok()
});

static EMAIL_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

fn matches(re: &LazyLock<Option<Regex>>, value: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(value))
}

/// Syntactically valid domain name with at least two labels. One trailing dot is allowed.
pub fn is_domain(name: &str) -> bool {
    let name = name.trim();
    let name = name.strip_suffix('.').unwrap_or(name);
    name.len() <= 253 && matches(&DOMAIN_RE, name)
}

/// A hostname is either a domain name or an IP address.
pub fn is_hostname(value: &str) -> bool {
    let value = value.trim();
    value.parse::<IpAddr>().is_ok() || is_domain(value)
}

pub fn is_email(value: &str) -> bool {
    matches(&EMAIL_RE, value.trim())
}

pub fn validate_domain(domain: &str) -> CoreResult<()> {
    let mut errors = ValidationErrors::new();
    if !is_domain(domain) {
        errors.add("domain", "The given domain is invalid.");
    }
    errors.into_result()
}

/// ns1 and ns2 must be valid hostnames; later slots are checked only when filled.
pub fn check_nameservers(nameservers: &[String], errors: &mut ValidationErrors) {
    let slots = nameservers.len().max(REQUIRED_NAMESERVERS);
    for index in 0..slots {
        let value = nameservers.get(index).map_or("", |v| v.trim());
        let required = index < REQUIRED_NAMESERVERS;
        if (required || !value.is_empty()) && !is_hostname(value) {
            let slot = index + 1;
            errors.add(format!("ns{slot}"), format!("Invalid Name Server {slot}"));
        }
    }
    if nameservers.len() > MAX_NAMESERVERS {
        errors.add(
            "nameservers",
            format!("At most {MAX_NAMESERVERS} name servers are supported."),
        );
    }
}

pub fn validate_nameservers(nameservers: &[String]) -> CoreResult<()> {
    let mut errors = ValidationErrors::new();
    check_nameservers(nameservers, &mut errors);
    errors.into_result()
}

pub fn check_contact(contact: &ContactDetails, errors: &mut ValidationErrors) {
    let required = [
        ("first_name", &contact.first_name, "First name is required."),
        ("last_name", &contact.last_name, "Last name is required."),
        ("phone", &contact.phone, "Phone number is required."),
        ("address1", &contact.address1, "Address is required."),
        ("city", &contact.city, "City is required."),
        ("country", &contact.country, "Country is required."),
    ];
    for (field, value, message) in required {
        if value.trim().is_empty() {
            errors.add(field, message);
        }
    }
    if !is_email(&contact.email) {
        errors.add("email", "A valid email address is required.");
    }
}

pub fn validate_contact(contact: &ContactDetails) -> CoreResult<()> {
    let mut errors = ValidationErrors::new();
    check_contact(contact, &mut errors);
    errors.into_result()
}

/// Flags, algorithm and digest type must be registry codes when present.
pub fn validate_ds_record(record: &DsRecord) -> CoreResult<()> {
    let mut errors = ValidationErrors::new();
    if record.flags.is_some_and(|f| KeyFlags::from_code(f).is_none()) {
        errors.add("flags", "Invalid DNSSEC key flags.");
    }
    if record
        .algorithm
        .is_some_and(|a| DnssecAlgorithm::from_code(a).is_none())
    {
        errors.add("algorithm", "Invalid DNSSEC algorithm.");
    }
    if record
        .digest_type
        .is_some_and(|d| DigestType::from_code(d).is_none())
    {
        errors.add("digest_type", "Invalid DNSSEC digest type.");
    }
    errors.into_result()
}

pub fn validate_registrar_tag(tag: &str) -> CoreResult<()> {
    let mut errors = ValidationErrors::new();
    if tag.trim().is_empty() {
        errors.add("tag", "A registrar tag is required.");
    }
    errors.into_result()
}
