use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============ Credentials ============

/// Registry environment an account connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    Sandbox,
}

/// Credentials for one registrar account (one EPP session).
///
/// `secure` is carried as stored; the registry only accepts TLS on port 700, so every
/// connection is encrypted regardless of its value.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccountCredentials {
    /// EPP client id (the registrar tag).
    pub username: String,
    pub password: String,
    #[serde(default = "default_true")]
    pub secure: bool,
    #[serde(default)]
    pub sandbox: bool,
}

fn default_true() -> bool {
    true
}

impl AccountCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            secure: true,
            sandbox: false,
        }
    }

    #[must_use]
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn environment(&self) -> Environment {
        if self.sandbox {
            Environment::Sandbox
        } else {
            Environment::Production
        }
    }
}

impl std::fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("secure", &self.secure)
            .field("sandbox", &self.sandbox)
            .finish()
    }
}

// ============ Contacts ============

/// Nominet registrant type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegistrantType {
    /// UK Limited Company
    Ltd,
    /// UK Public Limited Company
    Plc,
    /// UK Partnership
    Ptnr,
    /// UK Sole Trader
    Stra,
    /// UK Limited Liability Partnership
    Llp,
    /// UK Industrial/Provident Company
    Ip,
    /// UK Individual
    Ind,
    /// UK School
    Sch,
    /// UK Registered Charity
    Rchar,
    /// UK Government Body
    Gov,
    /// UK Corporation by Royal Charter
    Crc,
    /// UK Statutory Body
    Stat,
    /// UK Other
    Other,
    /// Non-UK Individual
    Find,
    /// Non-UK Corporation
    Fcorp,
    /// Non-UK Other
    Fother,
}

impl RegistrantType {
    pub const ALL: [Self; 16] = [
        Self::Ltd,
        Self::Plc,
        Self::Ptnr,
        Self::Stra,
        Self::Llp,
        Self::Ip,
        Self::Ind,
        Self::Sch,
        Self::Rchar,
        Self::Gov,
        Self::Crc,
        Self::Stat,
        Self::Other,
        Self::Find,
        Self::Fcorp,
        Self::Fother,
    ];

    /// Code sent in `contact-ext:type`.
    pub fn code(self) -> &'static str {
        match self {
            Self::Ltd => "LTD",
            Self::Plc => "PLC",
            Self::Ptnr => "PTNR",
            Self::Stra => "STRA",
            Self::Llp => "LLP",
            Self::Ip => "IP",
            Self::Ind => "IND",
            Self::Sch => "SCH",
            Self::Rchar => "RCHAR",
            Self::Gov => "GOV",
            Self::Crc => "CRC",
            Self::Stat => "STAT",
            Self::Other => "OTHER",
            Self::Find => "FIND",
            Self::Fcorp => "FCORP",
            Self::Fother => "FOTHER",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ltd => "UK Limited Company",
            Self::Plc => "UK Public Limited Company",
            Self::Ptnr => "UK Partnership",
            Self::Stra => "UK Sole Trader",
            Self::Llp => "UK Limited Liability Partnership",
            Self::Ip => "UK Industrial/Provident Company",
            Self::Ind => "UK Individual",
            Self::Sch => "UK School",
            Self::Rchar => "UK Registered Charity",
            Self::Gov => "UK Government Body",
            Self::Crc => "UK Corporation by Royal Charter",
            Self::Stat => "UK Statutory Body",
            Self::Other => "UK Other",
            Self::Find => "Non-UK Individual",
            Self::Fcorp => "Non-UK Corporation",
            Self::Fother => "Non-UK Other",
        }
    }

    /// Whether the type describes a UK-based registrant.
    pub fn is_uk(self) -> bool {
        !matches!(self, Self::Find | Self::Fcorp | Self::Fother)
    }
}

impl FromStr for RegistrantType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or_else(|| format!("Unknown registrant type: {s}"))
    }
}

/// `postalInfo` type attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostalInfoType {
    /// Localized (UK addresses).
    Loc,
    /// Internationalized.
    #[default]
    Int,
}

impl PostalInfoType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loc => "loc",
            Self::Int => "int",
        }
    }

    /// `loc` for UK addresses, `int` for everything else.
    pub fn for_country(country_code: &str) -> Self {
        if matches!(country_code.trim().to_ascii_uppercase().as_str(), "GB" | "UK") {
            Self::Loc
        } else {
            Self::Int
        }
    }
}

/// A contact object as sent to or read from the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    /// Registry handle. `None` until created.
    pub id: Option<String>,
    pub name: String,
    pub organization: Option<String>,
    /// Up to three street lines.
    pub street: Vec<String>,
    pub city: String,
    pub province: Option<String>,
    pub postal_code: Option<String>,
    /// ISO 3166 alpha-2 country code.
    pub country_code: String,
    /// Phone in `+CC.NNNN` form.
    pub voice: Option<String>,
    pub email: String,
    /// Contact auth info password.
    pub auth_password: Option<String>,
    pub postal_type: PostalInfoType,
}

/// Nominet contact extension fields. Empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactExtension {
    pub registrant_type: Option<RegistrantType>,
    pub trading_name: Option<String>,
    pub company_number: Option<String>,
}

impl ContactExtension {
    pub fn trading_name(&self) -> Option<&str> {
        non_empty(self.trading_name.as_deref())
    }

    pub fn company_number(&self) -> Option<&str> {
        non_empty(self.company_number.as_deref())
    }

    /// True when no field would be emitted.
    pub fn is_empty(&self) -> bool {
        self.registrant_type.is_none()
            && self.trading_name().is_none()
            && self.company_number().is_none()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// ============ Domains ============

/// Registration/renewal period unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodUnit {
    Year,
    Month,
}

impl PeriodUnit {
    /// Unit attribute value (`y` / `m`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Year => "y",
            Self::Month => "m",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub value: u32,
    pub unit: PeriodUnit,
}

impl Period {
    pub fn years(value: u32) -> Self {
        Self {
            value,
            unit: PeriodUnit::Year,
        }
    }

    pub fn months(value: u32) -> Self {
        Self {
            value,
            unit: PeriodUnit::Month,
        }
    }
}

/// Input for `domain:create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRegistration {
    pub name: String,
    pub period: Period,
    pub registrant: String,
    pub nameservers: Vec<String>,
    pub auth_code: String,
}

/// One side (`add` or `rem`) of a `domain:update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainUpdateSet {
    pub nameservers: Vec<String>,
    /// Status values, e.g. `clientTransferProhibited`.
    pub statuses: Vec<String>,
}

impl DomainUpdateSet {
    pub fn is_empty(&self) -> bool {
        self.nameservers.is_empty() && self.statuses.is_empty()
    }
}

/// Input for `domain:update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainUpdate {
    pub name: String,
    pub add: DomainUpdateSet,
    pub remove: DomainUpdateSet,
    pub registrant: Option<String>,
    pub auth_code: Option<String>,
}

impl DomainUpdate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A nameserver with optional glue addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nameserver {
    pub hostname: String,
    #[serde(default)]
    pub addresses: Vec<IpAddr>,
}

// ============ DNSSEC ============

/// DNSKEY flags accepted by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyFlags {
    /// Zone Signing Key (256)
    Zsk,
    /// Key Signing Key (257)
    Ksk,
}

impl KeyFlags {
    pub fn code(self) -> u16 {
        match self {
            Self::Zsk => 256,
            Self::Ksk => 257,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            256 => Some(Self::Zsk),
            257 => Some(Self::Ksk),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Zsk => "Zone Signing Key (ZSK)",
            Self::Ksk => "Key Signing Key (KSK)",
        }
    }
}

/// DS digest types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DigestType {
    Sha1,
    Sha256,
    Gost,
    Sha384,
}

impl DigestType {
    pub const ALL: [Self; 4] = [Self::Sha1, Self::Sha256, Self::Gost, Self::Sha384];

    pub fn code(self) -> u8 {
        match self {
            Self::Sha1 => 1,
            Self::Sha256 => 2,
            Self::Gost => 3,
            Self::Sha384 => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Sha1 => "SHA-1",
            Self::Sha256 => "SHA-256",
            Self::Gost => "GOST R 34.11-94",
            Self::Sha384 => "SHA-384",
        }
    }
}

/// DNSSEC signing algorithms accepted by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DnssecAlgorithm {
    RsaMd5,
    DiffieHellman,
    DsaSha1,
    EllipticCurve,
    RsaSha1,
    DsaNsec3Sha1,
    RsaSha1Nsec3Sha1,
    RsaSha256,
    RsaSha512,
    EccGost,
    EcdsaP256Sha256,
    EcdsaP384Sha384,
    Indirect,
    PrivateDns,
    PrivateOid,
}

impl DnssecAlgorithm {
    pub const ALL: [Self; 15] = [
        Self::RsaMd5,
        Self::DiffieHellman,
        Self::DsaSha1,
        Self::EllipticCurve,
        Self::RsaSha1,
        Self::DsaNsec3Sha1,
        Self::RsaSha1Nsec3Sha1,
        Self::RsaSha256,
        Self::RsaSha512,
        Self::EccGost,
        Self::EcdsaP256Sha256,
        Self::EcdsaP384Sha384,
        Self::Indirect,
        Self::PrivateDns,
        Self::PrivateOid,
    ];

    pub fn code(self) -> u8 {
        match self {
            Self::RsaMd5 => 1,
            Self::DiffieHellman => 2,
            Self::DsaSha1 => 3,
            Self::EllipticCurve => 4,
            Self::RsaSha1 => 5,
            Self::DsaNsec3Sha1 => 6,
            Self::RsaSha1Nsec3Sha1 => 7,
            Self::RsaSha256 => 8,
            Self::RsaSha512 => 10,
            Self::EccGost => 12,
            Self::EcdsaP256Sha256 => 13,
            Self::EcdsaP384Sha384 => 14,
            Self::Indirect => 252,
            Self::PrivateDns => 253,
            Self::PrivateOid => 254,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::RsaMd5 => "RSA/MD5",
            Self::DiffieHellman => "Diffie-Hellman",
            Self::DsaSha1 => "DSA/SHA-1",
            Self::EllipticCurve => "Elliptic Curve",
            Self::RsaSha1 => "RSA/SHA-1",
            Self::DsaNsec3Sha1 => "DSA-NSEC3-SHA1",
            Self::RsaSha1Nsec3Sha1 => "RSASHA1-NSEC3-SHA1",
            Self::RsaSha256 => "RSA/SHA-256",
            Self::RsaSha512 => "RSA/SHA-512",
            Self::EccGost => "ECC-GOST",
            Self::EcdsaP256Sha256 => "ECDSA Curve P-256 with SHA-256",
            Self::EcdsaP384Sha384 => "ECDSA Curve P-384 with SHA-384",
            Self::Indirect => "Indirect",
            Self::PrivateDns => "Private DNS",
            Self::PrivateOid => "Private OID",
        }
    }
}

/// A DS record with optional key data, as carried by `secDNS:dsData`.
///
/// Every field is optional: the registry accepts partial records on add, and records read
/// back may omit key data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DsRecord {
    pub key_tag: Option<u16>,
    pub algorithm: Option<u8>,
    pub digest_type: Option<u8>,
    pub digest: Option<String>,
    pub flags: Option<u16>,
    pub public_key: Option<String>,
}

impl DsRecord {
    /// Records are identified by (key tag, algorithm, digest type, digest); all four must match.
    pub fn same_identity(&self, other: &Self) -> bool {
        self.key_tag == other.key_tag
            && self.algorithm == other.algorithm
            && self.digest_type == other.digest_type
            && self.digest == other.digest
    }
}

// ============ Response views ============

/// Availability of one name in a check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub name: String,
    pub available: bool,
    pub reason: Option<String>,
}

/// `domain:infData` plus any `secDNS:infData` extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainInfo {
    pub name: String,
    pub roid: String,
    pub statuses: Vec<String>,
    pub registrant: Option<String>,
    /// `(type, handle)` pairs for non-registrant contacts.
    pub contacts: Vec<(String, String)>,
    pub nameservers: Vec<Nameserver>,
    /// Subordinate hosts.
    pub hosts: Vec<String>,
    #[serde(default, with = "crate::utils::datetime")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::utils::datetime")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::utils::datetime")]
    pub expires: Option<DateTime<Utc>>,
    pub auth_code: Option<String>,
    pub ds_records: Vec<DsRecord>,
}

impl DomainInfo {
    pub fn has_status(&self, status: &str) -> bool {
        self.statuses.iter().any(|s| s == status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainCreated {
    pub name: String,
    #[serde(default, with = "crate::utils::datetime")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::utils::datetime")]
    pub expires: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRenewed {
    pub name: String,
    #[serde(default, with = "crate::utils::datetime")]
    pub expires: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactCreated {
    pub id: String,
    #[serde(default, with = "crate::utils::datetime")]
    pub created: Option<DateTime<Utc>>,
}

/// `contact:infData` plus the `contact-nom-ext:infData` extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub roid: String,
    pub statuses: Vec<String>,
    pub contact: Contact,
    pub extension: ContactExtension,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    pub name: String,
    pub statuses: Vec<String>,
    pub addresses: Vec<IpAddr>,
}

/// `msgQ` envelope of a poll response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageQueue {
    pub id: String,
    pub count: u32,
    pub date: String,
    pub message: String,
}
