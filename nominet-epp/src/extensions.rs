//! Namespaces, command kinds and the per-session extension registry.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Namespace URIs used on the wire.
pub mod ns {
    pub const EPP: &str = "urn:ietf:params:xml:ns:epp-1.0";
    pub const DOMAIN: &str = "urn:ietf:params:xml:ns:domain-1.0";
    pub const CONTACT: &str = "urn:ietf:params:xml:ns:contact-1.0";
    pub const HOST: &str = "urn:ietf:params:xml:ns:host-1.0";
    pub const SEC_DNS: &str = "urn:ietf:params:xml:ns:secDNS-1.1";
    pub const STD_RELEASE: &str = "http://www.nominet.org.uk/epp/xml/std-release-1.0";
    pub const STD_NOTIFICATIONS: &str = "http://www.nominet.org.uk/epp/xml/std-notifications-1.2";
    pub const CONTACT_NOM_EXT: &str = "http://www.nominet.org.uk/epp/xml/contact-nom-ext-1.0";
    /// First revision of the notification schema, resolved through the `n` alias.
    pub const NOTIFICATIONS_V10: &str = "http://www.nominet.org.uk/epp/xml/std-notifications-1.0";
    /// Second revision of the notification schema, resolved through the `n11` alias.
    pub const NOTIFICATIONS_V11: &str = "http://www.nominet.org.uk/epp/xml/std-notifications-1.1";
}

/// Every command this crate can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Login,
    Logout,
    DomainCheck,
    DomainInfo,
    DomainCreate,
    DomainUpdate,
    DomainRenew,
    DomainDelete,
    DomainRelease,
    ContactCreate,
    ContactInfo,
    ContactUpdate,
    ContactDelete,
    HostCheck,
    HostInfo,
    HostCreate,
    HostUpdate,
    PollRequest,
    PollAck,
    /// Contact create carrying the `contact-nom-ext` block.
    NominetContactCreate,
    /// Contact update carrying the `contact-nom-ext` block.
    NominetContactUpdate,
}

impl CommandKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::DomainCheck => "domain:check",
            Self::DomainInfo => "domain:info",
            Self::DomainCreate => "domain:create",
            Self::DomainUpdate => "domain:update",
            Self::DomainRenew => "domain:renew",
            Self::DomainDelete => "domain:delete",
            Self::DomainRelease => "release",
            Self::ContactCreate => "contact:create",
            Self::ContactInfo => "contact:info",
            Self::ContactUpdate => "contact:update",
            Self::ContactDelete => "contact:delete",
            Self::HostCheck => "host:check",
            Self::HostInfo => "host:info",
            Self::HostCreate => "host:create",
            Self::HostUpdate => "host:update",
            Self::PollRequest => "poll:req",
            Self::PollAck => "poll:ack",
            Self::NominetContactCreate => "contact:create+contact-ext",
            Self::NominetContactUpdate => "contact:update+contact-ext",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the `resData` a command's response is decoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Result and message queue only.
    Generic,
    DomainCheck,
    DomainInfo,
    DomainCreate,
    DomainRenew,
    ContactCreate,
    ContactInfo,
    HostCheck,
    HostInfo,
    /// Poll responses keep their raw `resData` for the notification decoder.
    Poll,
}

/// Extension namespaces, notification aliases and response mappings for one session.
///
/// Built once per session. [`ExtensionRegistry::nominet`] produces the set every Nominet
/// session needs: the standard notifications and contact extension announced at login,
/// the `n`/`n11` aliases for the two notification schema revisions, and the response
/// kinds of the two extension-bearing contact commands.
#[derive(Debug, Clone)]
pub struct ExtensionRegistry {
    object_uris: Vec<String>,
    extensions: BTreeMap<String, String>,
    aliases: BTreeMap<String, String>,
    responses: HashMap<CommandKind, ResponseKind>,
}

impl Default for ExtensionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtensionRegistry {
    /// Standard objects only: domain, contact and host, plus the `domain`/`contact` aliases.
    pub fn new() -> Self {
        let mut registry = Self {
            object_uris: vec![
                ns::DOMAIN.to_string(),
                ns::CONTACT.to_string(),
                ns::HOST.to_string(),
            ],
            extensions: BTreeMap::new(),
            aliases: BTreeMap::new(),
            responses: HashMap::new(),
        };
        registry.add_namespace_alias("domain", ns::DOMAIN);
        registry.add_namespace_alias("contact", ns::CONTACT);
        registry
    }

    /// The registry every Nominet session is opened with.
    pub fn nominet() -> Self {
        let mut registry = Self::new();
        registry.add_object(ns::STD_RELEASE);
        registry.add_extension("secDNS", ns::SEC_DNS);
        registry.add_extension("std-notifications", ns::STD_NOTIFICATIONS);
        registry.add_extension("contact-ext", ns::CONTACT_NOM_EXT);
        registry.add_namespace_alias("n", ns::NOTIFICATIONS_V10);
        registry.add_namespace_alias("n11", ns::NOTIFICATIONS_V11);
        registry.add_command_response(CommandKind::NominetContactCreate, ResponseKind::ContactCreate);
        registry.add_command_response(CommandKind::NominetContactUpdate, ResponseKind::Generic);
        registry
    }

    pub fn add_object(&mut self, uri: &str) {
        if !self.object_uris.iter().any(|u| u == uri) {
            self.object_uris.push(uri.to_string());
        }
    }

    /// Registers an extension announced as `<extURI>` at login.
    pub fn add_extension(&mut self, prefix: &str, uri: &str) {
        self.extensions.insert(prefix.to_string(), uri.to_string());
    }

    /// Binds an alias used when resolving notification payloads.
    pub fn add_namespace_alias(&mut self, alias: &str, uri: &str) {
        self.aliases.insert(alias.to_string(), uri.to_string());
    }

    pub fn add_command_response(&mut self, command: CommandKind, response: ResponseKind) {
        self.responses.insert(command, response);
    }

    pub fn object_uris(&self) -> impl Iterator<Item = &str> {
        self.object_uris.iter().map(String::as_str)
    }

    pub fn extension_uris(&self) -> impl Iterator<Item = &str> {
        self.extensions.values().map(String::as_str)
    }

    pub fn extension_uri(&self, prefix: &str) -> Option<&str> {
        self.extensions.get(prefix).map(String::as_str)
    }

    pub fn resolve_alias(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// Response kind for a command: registered overrides first, then the standard mapping.
    pub fn response_kind(&self, command: CommandKind) -> ResponseKind {
        if let Some(kind) = self.responses.get(&command) {
            return *kind;
        }
        match command {
            CommandKind::DomainCheck => ResponseKind::DomainCheck,
            CommandKind::DomainInfo => ResponseKind::DomainInfo,
            CommandKind::DomainCreate => ResponseKind::DomainCreate,
            CommandKind::DomainRenew => ResponseKind::DomainRenew,
            CommandKind::ContactCreate => ResponseKind::ContactCreate,
            CommandKind::ContactInfo => ResponseKind::ContactInfo,
            CommandKind::HostCheck => ResponseKind::HostCheck,
            CommandKind::HostInfo => ResponseKind::HostInfo,
            CommandKind::PollRequest | CommandKind::PollAck => ResponseKind::Poll,
            _ => ResponseKind::Generic,
        }
    }
}
