//! Test utilities: an in-memory registry speaking EPP, plus mock collaborators.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Months, Utc};
use nominet_epp::datetime::format_epp_date;
use nominet_epp::{
    AccountCredentials, CommandKind, Contact, ContactExtension, DsRecord, EppCommand,
    EppConnection, EppError, EppResponse, ExtensionRegistry, PostalInfoType, RegistrantType,
    SessionConnector, XmlElement, ns,
};

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::session_pool::SessionPool;
use crate::traits::CredentialStore;
use crate::types::{ContactDetails, RegistrarAccount};
use crate::utils::phone::DottedPhoneFormatter;

const OK: &str = "Command completed successfully";

// ===== Fake registry =====

/// A domain as held by [`FakeRegistry`].
#[derive(Debug, Clone)]
pub struct FakeDomain {
    pub registrant: String,
    pub nameservers: Vec<String>,
    pub statuses: Vec<String>,
    pub auth_code: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
    pub ds_records: Vec<DsRecord>,
}

struct QueuedMessage {
    id: String,
    summary: String,
    payload: Option<XmlElement>,
}

#[derive(Default)]
struct State {
    contacts: BTreeMap<String, (Contact, ContactExtension)>,
    domains: BTreeMap<String, FakeDomain>,
    hosts: BTreeMap<String, Vec<IpAddr>>,
    queue: VecDeque<QueuedMessage>,
    endless: Option<XmlElement>,
    next_message_id: u64,
    requests: Vec<CommandKind>,
    seen: HashMap<CommandKind, usize>,
    acks: Vec<String>,
    releases: Vec<(String, String)>,
    overrides: HashMap<CommandKind, (u16, String)>,
    broken_after: HashMap<CommandKind, usize>,
    omit_creation_date: bool,
    last_renew_expiry: Option<String>,
    refused_logins: HashSet<String>,
    logins: usize,
    logout_attempts: usize,
    fail_logout: bool,
}

/// Stateful registry that interprets serialized EPP commands and answers with real
/// response documents. Clones share state.
#[derive(Clone, Default)]
pub struct FakeRegistry {
    state: Arc<Mutex<State>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn credentials(&self) -> AccountCredentials {
        AccountCredentials::new("TESTTAG", "secret").sandbox(true)
    }

    // ----- setup -----

    pub fn add_contact(&self, handle: &str) {
        let contact = Contact {
            id: Some(handle.to_string()),
            name: "Existing Holder".to_string(),
            street: vec!["1 Test Street".to_string()],
            city: "London".to_string(),
            country_code: "GB".to_string(),
            email: "holder@example.co.uk".to_string(),
            postal_type: PostalInfoType::Loc,
            ..Contact::default()
        };
        self.state()
            .contacts
            .insert(handle.to_string(), (contact, ContactExtension::default()));
    }

    pub fn add_domain(&self, name: &str, registrant: &str, expires: DateTime<Utc>) {
        self.state().domains.insert(
            name.to_string(),
            FakeDomain {
                registrant: registrant.to_string(),
                nameservers: Vec::new(),
                statuses: vec!["ok".to_string()],
                auth_code: "initial1".to_string(),
                created: Utc::now(),
                expires,
                ds_records: Vec::new(),
            },
        );
    }

    pub fn set_domain_nameservers(&self, name: &str, hosts: &[&str]) {
        if let Some(domain) = self.state().domains.get_mut(name) {
            domain.nameservers = hosts.iter().map(ToString::to_string).collect();
        }
    }

    pub fn add_host(&self, name: &str, addresses: &[IpAddr]) {
        self.state()
            .hosts
            .insert(name.to_string(), addresses.to_vec());
    }

    /// Queues a notification and returns its message id.
    pub fn enqueue(&self, summary: &str, payload: XmlElement) -> String {
        self.enqueue_raw(summary, Some(payload))
    }

    pub fn enqueue_raw(&self, summary: &str, payload: Option<XmlElement>) -> String {
        let mut state = self.state();
        state.next_message_id += 1;
        let id = (1000 + state.next_message_id).to_string();
        state.queue.push_back(QueuedMessage {
            id: id.clone(),
            summary: summary.to_string(),
            payload,
        });
        id
    }

    /// Every poll reports a fresh message carrying `payload`.
    pub fn endless_queue(&self, payload: XmlElement) {
        self.state().endless = Some(payload);
    }

    // ----- behaviour -----

    /// Answers every `kind` command with `code` and no data.
    pub fn respond_with(&self, kind: CommandKind, code: u16, message: &str) {
        self.state()
            .overrides
            .insert(kind, (code, message.to_string()));
    }

    /// Every further `kind` command fails at the transport level.
    pub fn break_transport(&self, kind: CommandKind) {
        let mut state = self.state();
        let seen = state.seen.get(&kind).copied().unwrap_or_default();
        state.broken_after.insert(kind, seen);
    }

    /// `kind` commands fail at the transport level after `successes` of them.
    pub fn break_transport_after(&self, kind: CommandKind, successes: usize) {
        self.state().broken_after.insert(kind, successes);
    }

    pub fn omit_creation_date(&self) {
        self.state().omit_creation_date = true;
    }

    pub fn refuse_login_for(&self, username: &str) {
        self.state().refused_logins.insert(username.to_string());
    }

    pub fn fail_logout(&self) {
        self.state().fail_logout = true;
    }

    // ----- inspection -----

    /// Commands received, login and logout excluded.
    pub fn requests(&self) -> Vec<CommandKind> {
        self.state().requests.clone()
    }

    pub fn count(&self, kind: CommandKind) -> usize {
        self.state().requests.iter().filter(|k| **k == kind).count()
    }

    pub fn logins(&self) -> usize {
        self.state().logins
    }

    pub fn logout_attempts(&self) -> usize {
        self.state().logout_attempts
    }

    pub fn domain(&self, name: &str) -> Option<FakeDomain> {
        self.state().domains.get(name).cloned()
    }

    pub fn contact(&self, handle: &str) -> Option<(Contact, ContactExtension)> {
        self.state().contacts.get(handle).cloned()
    }

    pub fn host(&self, name: &str) -> Option<Vec<IpAddr>> {
        self.state().hosts.get(name).cloned()
    }

    pub fn acks(&self) -> Vec<String> {
        self.state().acks.clone()
    }

    pub fn queue_len(&self) -> usize {
        self.state().queue.len()
    }

    pub fn releases(&self) -> Vec<(String, String)> {
        self.state().releases.clone()
    }

    pub fn last_renew_expiry(&self) -> Option<String> {
        self.state().last_renew_expiry.clone()
    }

    // ----- session hooks -----

    fn login(&self, username: &str) -> nominet_epp::Result<()> {
        let mut state = self.state();
        state.logins += 1;
        if state.refused_logins.contains(username) {
            return Err(login_refused(username));
        }
        Ok(())
    }

    fn logout(&self) -> nominet_epp::Result<()> {
        let mut state = self.state();
        state.logout_attempts += 1;
        if state.fail_logout {
            return Err(EppError::NetworkError {
                detail: "broken pipe".to_string(),
            });
        }
        Ok(())
    }

    /// Interprets one command and returns the response document.
    fn handle(&self, command: &EppCommand) -> nominet_epp::Result<String> {
        let kind = command.kind();
        let mut state = self.state();
        state.requests.push(kind);
        let seen = {
            let seen = state.seen.entry(kind).or_default();
            *seen += 1;
            *seen
        };
        if let Some(allowed) = state.broken_after.get(&kind)
            && seen > *allowed
        {
            return Err(EppError::NetworkError {
                detail: "connection reset by peer".to_string(),
            });
        }
        if let Some((code, message)) = state.overrides.get(&kind) {
            return envelope(*code, message, Vec::new()).to_document();
        }

        let root = XmlElement::parse(&command.to_xml("TEST-1")?)?;
        let cmd = root.child(ns::EPP, "command").cloned().unwrap_or_default();
        let reply = match kind {
            CommandKind::DomainCheck => domain_check(&state, &cmd),
            CommandKind::DomainInfo => domain_info(&state, &cmd),
            CommandKind::DomainCreate => domain_create(&mut state, &cmd),
            CommandKind::DomainUpdate => domain_update(&mut state, &cmd),
            CommandKind::DomainRenew => domain_renew(&mut state, &cmd),
            CommandKind::DomainDelete => domain_delete(&mut state, &cmd),
            CommandKind::DomainRelease => domain_release(&mut state, &cmd),
            CommandKind::ContactCreate | CommandKind::NominetContactCreate => {
                contact_create(&mut state, &cmd)
            }
            CommandKind::ContactInfo => contact_info(&state, &cmd),
            CommandKind::ContactUpdate | CommandKind::NominetContactUpdate => {
                contact_update(&mut state, &cmd)
            }
            CommandKind::ContactDelete => contact_delete(&mut state, &cmd),
            CommandKind::HostCheck => host_check(&state, &cmd),
            CommandKind::HostInfo => host_info(&state, &cmd),
            CommandKind::HostCreate => host_create(&mut state, &cmd),
            CommandKind::HostUpdate => host_update(&mut state, &cmd),
            CommandKind::PollRequest => poll_request(&mut state),
            CommandKind::PollAck => poll_ack(&mut state, &cmd),
            CommandKind::Login | CommandKind::Logout => failure(2101, "Unimplemented command"),
        };
        reply.to_document()
    }
}

fn login_refused(username: &str) -> EppError {
    EppError::LoginFailed {
        username: username.to_string(),
        result_code: Some(2200),
        message: "Authentication error".to_string(),
    }
}

// ----- response building -----

fn text(name: &str, value: impl Into<String>) -> XmlElement {
    XmlElement::text_node(name, value)
}

fn envelope(code: u16, message: &str, parts: Vec<XmlElement>) -> XmlElement {
    let result = XmlElement::new("result")
        .with_attr("code", code.to_string())
        .with_child(text("msg", message));
    let tr_id = XmlElement::new("trID")
        .with_child(text("clTRID", "TEST-1"))
        .with_child(text("svTRID", "FAKE-1"));
    XmlElement::new("epp").with_attr("xmlns", ns::EPP).with_child(
        XmlElement::new("response")
            .with_child(result)
            .with_children(parts)
            .with_child(tr_id),
    )
}

fn success(parts: Vec<XmlElement>) -> XmlElement {
    envelope(1000, OK, parts)
}

fn failure(code: u16, message: &str) -> XmlElement {
    envelope(code, message, Vec::new())
}

fn missing() -> XmlElement {
    failure(2303, "Object does not exist")
}

fn res_data(child: XmlElement) -> XmlElement {
    XmlElement::new("resData").with_child(child)
}

fn object<'a>(cmd: &'a XmlElement, verb: &str, uri: &str) -> Option<&'a XmlElement> {
    cmd.find(&[(ns::EPP, verb), (uri, verb)])
}

fn object_text(cmd: &XmlElement, verb: &str, uri: &str, local: &str) -> String {
    object(cmd, verb, uri)
        .map(|o| o.child_text(uri, local))
        .unwrap_or_default()
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn addresses<'a>(elements: impl Iterator<Item = &'a XmlElement>) -> Vec<IpAddr> {
    elements.filter_map(|a| a.text.parse().ok()).collect()
}

fn check_data(prefix: &str, uri: &str, names: Vec<&XmlElement>, taken: impl Fn(&str) -> bool) -> XmlElement {
    let cds = names.into_iter().map(|name| {
        let avail = if taken(&name.text) { "0" } else { "1" };
        XmlElement::new(format!("{prefix}:cd"))
            .with_child(text(&format!("{prefix}:name"), name.text.clone()).with_attr("avail", avail))
    });
    success(vec![res_data(
        XmlElement::new(format!("{prefix}:chkData"))
            .with_attr(format!("xmlns:{prefix}"), uri)
            .with_children(cds),
    )])
}

// ----- domains -----

fn domain_check(state: &State, cmd: &XmlElement) -> XmlElement {
    let names = cmd.find_all(&[(ns::EPP, "check"), (ns::DOMAIN, "check"), (ns::DOMAIN, "name")]);
    check_data("domain", ns::DOMAIN, names, |name| {
        state.domains.contains_key(&name.to_ascii_lowercase())
    })
}

fn ds_data(record: &DsRecord) -> XmlElement {
    let mut ds = XmlElement::new("secDNS:dsData");
    if let Some(tag) = record.key_tag {
        ds.push(text("secDNS:keyTag", tag.to_string()));
    }
    if let Some(alg) = record.algorithm {
        ds.push(text("secDNS:alg", alg.to_string()));
    }
    if let Some(digest_type) = record.digest_type {
        ds.push(text("secDNS:digestType", digest_type.to_string()));
    }
    if let Some(digest) = &record.digest {
        ds.push(text("secDNS:digest", digest.as_str()));
    }
    if let Some(key) = &record.public_key {
        let mut key_data = XmlElement::new("secDNS:keyData");
        if let Some(flags) = record.flags {
            key_data.push(text("secDNS:flags", flags.to_string()));
        }
        key_data.push(text("secDNS:protocol", "3"));
        if let Some(alg) = record.algorithm {
            key_data.push(text("secDNS:alg", alg.to_string()));
        }
        key_data.push(text("secDNS:pubKey", key.as_str()));
        ds.push(key_data);
    }
    ds
}

fn number<T: FromStr>(parent: &XmlElement, local: &str) -> Option<T> {
    parent
        .child(ns::SEC_DNS, local)
        .and_then(|e| e.text.parse().ok())
}

fn parse_ds(ds: &XmlElement) -> DsRecord {
    let key = ds.child(ns::SEC_DNS, "keyData");
    DsRecord {
        key_tag: number(ds, "keyTag"),
        algorithm: number(ds, "alg"),
        digest_type: number(ds, "digestType"),
        digest: non_empty(ds.child_text(ns::SEC_DNS, "digest")),
        flags: key.and_then(|k| number(k, "flags")),
        public_key: key.and_then(|k| non_empty(k.child_text(ns::SEC_DNS, "pubKey"))),
    }
}

fn domain_info(state: &State, cmd: &XmlElement) -> XmlElement {
    let name = object_text(cmd, "info", ns::DOMAIN, "name");
    let Some(domain) = state.domains.get(&name) else {
        return missing();
    };

    let mut inf = XmlElement::new("domain:infData")
        .with_attr("xmlns:domain", ns::DOMAIN)
        .with_child(text("domain:name", name.as_str()))
        .with_child(text("domain:roid", format!("{}-UK", name.len())));
    for status in &domain.statuses {
        inf.push(XmlElement::new("domain:status").with_attr("s", status.as_str()));
    }
    inf.push(text("domain:registrant", domain.registrant.as_str()));
    if !domain.nameservers.is_empty() {
        inf.push(
            XmlElement::new("domain:ns").with_children(
                domain
                    .nameservers
                    .iter()
                    .map(|h| text("domain:hostObj", h.as_str())),
            ),
        );
    }
    inf.push(text("domain:crDate", domain.created.to_rfc3339()));
    inf.push(text("domain:exDate", domain.expires.to_rfc3339()));
    inf.push(XmlElement::new("domain:authInfo").with_child(text("domain:pw", domain.auth_code.as_str())));

    let mut parts = vec![res_data(inf)];
    if !domain.ds_records.is_empty() {
        parts.push(
            XmlElement::new("extension").with_child(
                XmlElement::new("secDNS:infData")
                    .with_attr("xmlns:secDNS", ns::SEC_DNS)
                    .with_children(domain.ds_records.iter().map(ds_data)),
            ),
        );
    }
    success(parts)
}

fn domain_create(state: &mut State, cmd: &XmlElement) -> XmlElement {
    let Some(create) = object(cmd, "create", ns::DOMAIN) else {
        return failure(2001, "Command syntax error");
    };
    let name = create.child_text(ns::DOMAIN, "name");
    if state.domains.contains_key(&name) {
        return failure(2302, "Object exists");
    }
    let registrant = create.child_text(ns::DOMAIN, "registrant");
    if !state.contacts.contains_key(&registrant) {
        return failure(2303, "Registrant does not exist");
    }

    let years: u32 = create.child_text(ns::DOMAIN, "period").parse().unwrap_or(1);
    let created = Utc::now();
    let expires = created
        .checked_add_months(Months::new(years * 12))
        .unwrap_or(created);
    state.domains.insert(
        name.clone(),
        FakeDomain {
            registrant,
            nameservers: create
                .find_all(&[(ns::DOMAIN, "ns"), (ns::DOMAIN, "hostObj")])
                .into_iter()
                .map(|h| h.text.clone())
                .collect(),
            statuses: vec!["ok".to_string()],
            auth_code: create
                .find(&[(ns::DOMAIN, "authInfo"), (ns::DOMAIN, "pw")])
                .map(|pw| pw.text.clone())
                .unwrap_or_default(),
            created,
            expires,
            ds_records: Vec::new(),
        },
    );

    let mut cre = XmlElement::new("domain:creData")
        .with_attr("xmlns:domain", ns::DOMAIN)
        .with_child(text("domain:name", name));
    if !state.omit_creation_date {
        cre.push(text("domain:crDate", created.to_rfc3339()));
    }
    cre.push(text("domain:exDate", expires.to_rfc3339()));
    success(vec![res_data(cre)])
}

fn domain_update(state: &mut State, cmd: &XmlElement) -> XmlElement {
    let Some(update) = object(cmd, "update", ns::DOMAIN) else {
        return failure(2001, "Command syntax error");
    };
    let name = update.child_text(ns::DOMAIN, "name");
    let Some(domain) = state.domains.get_mut(&name) else {
        return missing();
    };

    let hosts = |set: &XmlElement| -> Vec<String> {
        set.find_all(&[(ns::DOMAIN, "ns"), (ns::DOMAIN, "hostObj")])
            .into_iter()
            .map(|h| h.text.clone())
            .collect()
    };
    let statuses = |set: &XmlElement| -> Vec<String> {
        set.children_named(ns::DOMAIN, "status")
            .filter_map(|s| s.attr("s").map(str::to_string))
            .collect()
    };

    if let Some(rem) = update.child(ns::DOMAIN, "rem") {
        let gone = hosts(rem);
        domain.nameservers.retain(|h| !gone.contains(h));
        let gone = statuses(rem);
        domain.statuses.retain(|s| !gone.contains(s));
    }
    if let Some(add) = update.child(ns::DOMAIN, "add") {
        for host in hosts(add) {
            if !domain.nameservers.contains(&host) {
                domain.nameservers.push(host);
            }
        }
        for status in statuses(add) {
            if !domain.statuses.contains(&status) {
                domain.statuses.push(status);
            }
        }
    }
    if let Some(chg) = update.child(ns::DOMAIN, "chg") {
        if let Some(registrant) = non_empty(chg.child_text(ns::DOMAIN, "registrant")) {
            domain.registrant = registrant;
        }
        if let Some(pw) = chg.find(&[(ns::DOMAIN, "authInfo"), (ns::DOMAIN, "pw")]) {
            domain.auth_code = pw.text.clone();
        }
    }

    if let Some(sec_dns) = cmd.find(&[(ns::EPP, "extension"), (ns::SEC_DNS, "update")]) {
        if let Some(rem) = sec_dns.child(ns::SEC_DNS, "rem") {
            let gone: Vec<DsRecord> = rem.children_named(ns::SEC_DNS, "dsData").map(parse_ds).collect();
            domain
                .ds_records
                .retain(|r| !gone.iter().any(|g| g.same_identity(r)));
        }
        if let Some(add) = sec_dns.child(ns::SEC_DNS, "add") {
            domain
                .ds_records
                .extend(add.children_named(ns::SEC_DNS, "dsData").map(parse_ds));
        }
    }
    success(Vec::new())
}

fn domain_renew(state: &mut State, cmd: &XmlElement) -> XmlElement {
    let Some(renew) = object(cmd, "renew", ns::DOMAIN) else {
        return failure(2001, "Command syntax error");
    };
    let name = renew.child_text(ns::DOMAIN, "name");
    let current = renew.child_text(ns::DOMAIN, "curExpDate");
    let years: u32 = renew.child_text(ns::DOMAIN, "period").parse().unwrap_or(1);
    state.last_renew_expiry = Some(current.clone());

    let Some(domain) = state.domains.get_mut(&name) else {
        return missing();
    };
    if format_epp_date(&domain.expires) != current {
        return failure(2306, "Parameter value policy error");
    }
    domain.expires = domain
        .expires
        .checked_add_months(Months::new(years * 12))
        .unwrap_or(domain.expires);

    success(vec![res_data(
        XmlElement::new("domain:renData")
            .with_attr("xmlns:domain", ns::DOMAIN)
            .with_child(text("domain:name", name))
            .with_child(text("domain:exDate", domain.expires.to_rfc3339())),
    )])
}

fn domain_delete(state: &mut State, cmd: &XmlElement) -> XmlElement {
    let name = object_text(cmd, "delete", ns::DOMAIN, "name");
    match state.domains.remove(&name) {
        Some(_) => success(Vec::new()),
        None => missing(),
    }
}

fn domain_release(state: &mut State, cmd: &XmlElement) -> XmlElement {
    let Some(release) = cmd.find(&[(ns::EPP, "update"), (ns::STD_RELEASE, "release")]) else {
        return failure(2001, "Command syntax error");
    };
    let name = release.child_text(ns::STD_RELEASE, "domainName");
    if !state.domains.contains_key(&name) {
        return missing();
    }
    let tag = release.child_text(ns::STD_RELEASE, "registrarTag");
    state.releases.push((name, tag));
    success(Vec::new())
}

// ----- contacts -----

/// Postal info, voice and email from a `contact:create` or `contact:chg` element.
fn parse_contact(element: &XmlElement) -> Contact {
    let postal = element.child(ns::CONTACT, "postalInfo");
    let addr = postal.and_then(|p| p.child(ns::CONTACT, "addr"));
    let get = |parent: Option<&XmlElement>, local: &str| {
        parent
            .map(|p| p.child_text(ns::CONTACT, local))
            .unwrap_or_default()
    };
    Contact {
        id: non_empty(element.child_text(ns::CONTACT, "id")),
        name: get(postal, "name"),
        organization: non_empty(get(postal, "org")),
        street: addr
            .map(|a| {
                a.children_named(ns::CONTACT, "street")
                    .map(|s| s.text.clone())
                    .collect()
            })
            .unwrap_or_default(),
        city: get(addr, "city"),
        province: non_empty(get(addr, "sp")),
        postal_code: non_empty(get(addr, "pc")),
        country_code: get(addr, "cc"),
        voice: non_empty(element.child_text(ns::CONTACT, "voice")),
        email: element.child_text(ns::CONTACT, "email"),
        auth_password: element
            .find(&[(ns::CONTACT, "authInfo"), (ns::CONTACT, "pw")])
            .map(|pw| pw.text.clone()),
        postal_type: match postal.and_then(|p| p.attr("type")) {
            Some("loc") => PostalInfoType::Loc,
            _ => PostalInfoType::Int,
        },
    }
}

fn parse_extension(cmd: &XmlElement, container: &str) -> ContactExtension {
    let Some(block) = cmd.find(&[(ns::EPP, "extension"), (ns::CONTACT_NOM_EXT, container)]) else {
        return ContactExtension::default();
    };
    let get = |local: &str| non_empty(block.child_text(ns::CONTACT_NOM_EXT, local));
    ContactExtension {
        registrant_type: get("type").and_then(|t| t.parse::<RegistrantType>().ok()),
        trading_name: get("trad-name"),
        company_number: get("co-no"),
    }
}

fn contact_create(state: &mut State, cmd: &XmlElement) -> XmlElement {
    let Some(create) = object(cmd, "create", ns::CONTACT) else {
        return failure(2001, "Command syntax error");
    };
    let contact = parse_contact(create);
    let Some(id) = contact.id.clone() else {
        return failure(2003, "Required parameter missing");
    };
    if state.contacts.contains_key(&id) {
        return failure(2302, "Object exists");
    }
    state
        .contacts
        .insert(id.clone(), (contact, parse_extension(cmd, "create")));

    success(vec![res_data(
        XmlElement::new("contact:creData")
            .with_attr("xmlns:contact", ns::CONTACT)
            .with_child(text("contact:id", id))
            .with_child(text("contact:crDate", Utc::now().to_rfc3339())),
    )])
}

fn contact_update(state: &mut State, cmd: &XmlElement) -> XmlElement {
    let Some(update) = object(cmd, "update", ns::CONTACT) else {
        return failure(2001, "Command syntax error");
    };
    let handle = update.child_text(ns::CONTACT, "id");
    let Some((contact, extension)) = state.contacts.get_mut(&handle) else {
        return missing();
    };

    if let Some(chg) = update.child(ns::CONTACT, "chg") {
        let changes = parse_contact(chg);
        *contact = Contact {
            id: contact.id.take(),
            auth_password: contact.auth_password.take(),
            ..changes
        };
    }
    let changes = parse_extension(cmd, "update");
    if changes.registrant_type.is_some() {
        extension.registrant_type = changes.registrant_type;
    }
    if changes.trading_name.is_some() {
        extension.trading_name = changes.trading_name;
    }
    if changes.company_number.is_some() {
        extension.company_number = changes.company_number;
    }
    success(Vec::new())
}

fn contact_info(state: &State, cmd: &XmlElement) -> XmlElement {
    let handle = object_text(cmd, "info", ns::CONTACT, "id");
    let Some((contact, extension)) = state.contacts.get(&handle) else {
        return missing();
    };

    let mut addr = XmlElement::new("contact:addr")
        .with_children(contact.street.iter().map(|s| text("contact:street", s.as_str())))
        .with_child(text("contact:city", contact.city.as_str()));
    if let Some(sp) = &contact.province {
        addr.push(text("contact:sp", sp.as_str()));
    }
    if let Some(pc) = &contact.postal_code {
        addr.push(text("contact:pc", pc.as_str()));
    }
    addr.push(text("contact:cc", contact.country_code.as_str()));

    let mut postal = XmlElement::new("contact:postalInfo")
        .with_attr("type", contact.postal_type.as_str())
        .with_child(text("contact:name", contact.name.as_str()));
    if let Some(org) = &contact.organization {
        postal.push(text("contact:org", org.as_str()));
    }
    postal.push(addr);

    let mut inf = XmlElement::new("contact:infData")
        .with_attr("xmlns:contact", ns::CONTACT)
        .with_child(text("contact:id", handle.as_str()))
        .with_child(text("contact:roid", format!("{handle}-UK")))
        .with_child(XmlElement::new("contact:status").with_attr("s", "ok"))
        .with_child(postal);
    if let Some(voice) = &contact.voice {
        inf.push(text("contact:voice", voice.as_str()));
    }
    inf.push(text("contact:email", contact.email.as_str()));

    let mut parts = vec![res_data(inf)];
    if !extension.is_empty() {
        let mut ext = XmlElement::new("contact-ext:infData")
            .with_attr("xmlns:contact-ext", ns::CONTACT_NOM_EXT);
        if let Some(kind) = extension.registrant_type {
            ext.push(text("contact-ext:type", kind.code()));
        }
        if let Some(name) = &extension.trading_name {
            ext.push(text("contact-ext:trad-name", name.as_str()));
        }
        if let Some(number) = &extension.company_number {
            ext.push(text("contact-ext:co-no", number.as_str()));
        }
        parts.push(XmlElement::new("extension").with_child(ext));
    }
    success(parts)
}

fn contact_delete(state: &mut State, cmd: &XmlElement) -> XmlElement {
    let handle = object_text(cmd, "delete", ns::CONTACT, "id");
    match state.contacts.remove(&handle) {
        Some(_) => success(Vec::new()),
        None => missing(),
    }
}

// ----- hosts -----

fn host_check(state: &State, cmd: &XmlElement) -> XmlElement {
    let names = cmd.find_all(&[(ns::EPP, "check"), (ns::HOST, "check"), (ns::HOST, "name")]);
    check_data("host", ns::HOST, names, |name| state.hosts.contains_key(name))
}

fn host_info(state: &State, cmd: &XmlElement) -> XmlElement {
    let name = object_text(cmd, "info", ns::HOST, "name");
    let Some(addresses) = state.hosts.get(&name) else {
        return missing();
    };
    let addrs = addresses.iter().map(|ip| {
        let version = if ip.is_ipv4() { "v4" } else { "v6" };
        text("host:addr", ip.to_string()).with_attr("ip", version)
    });
    success(vec![res_data(
        XmlElement::new("host:infData")
            .with_attr("xmlns:host", ns::HOST)
            .with_child(text("host:name", name.as_str()))
            .with_child(XmlElement::new("host:status").with_attr("s", "ok"))
            .with_children(addrs),
    )])
}

fn host_create(state: &mut State, cmd: &XmlElement) -> XmlElement {
    let Some(create) = object(cmd, "create", ns::HOST) else {
        return failure(2001, "Command syntax error");
    };
    let name = create.child_text(ns::HOST, "name");
    if state.hosts.contains_key(&name) {
        return failure(2302, "Object exists");
    }
    state
        .hosts
        .insert(name, addresses(create.children_named(ns::HOST, "addr")));
    success(Vec::new())
}

fn host_update(state: &mut State, cmd: &XmlElement) -> XmlElement {
    let Some(update) = object(cmd, "update", ns::HOST) else {
        return failure(2001, "Command syntax error");
    };
    let name = update.child_text(ns::HOST, "name");
    let Some(current) = state.hosts.get_mut(&name) else {
        return missing();
    };
    if let Some(rem) = update.child(ns::HOST, "rem") {
        let gone = addresses(rem.children_named(ns::HOST, "addr"));
        current.retain(|ip| !gone.contains(ip));
    }
    if let Some(add) = update.child(ns::HOST, "add") {
        for ip in addresses(add.children_named(ns::HOST, "addr")) {
            if !current.contains(&ip) {
                current.push(ip);
            }
        }
    }
    success(Vec::new())
}

// ----- poll queue -----

fn message_response(id: &str, count: usize, summary: &str, payload: Option<XmlElement>) -> XmlElement {
    let msg_q = XmlElement::new("msgQ")
        .with_attr("count", count.to_string())
        .with_attr("id", id)
        .with_child(text("qDate", Utc::now().to_rfc3339()))
        .with_child(text("msg", summary));
    let mut parts = vec![msg_q];
    parts.extend(payload.map(res_data));
    envelope(1301, "Command completed successfully; ack to dequeue", parts)
}

fn poll_request(state: &mut State) -> XmlElement {
    if let Some(payload) = state.endless.clone() {
        state.next_message_id += 1;
        let id = (1000 + state.next_message_id).to_string();
        return message_response(&id, 1, "Endless notification", Some(payload));
    }
    match state.queue.front() {
        Some(message) => message_response(
            &message.id,
            state.queue.len(),
            &message.summary,
            message.payload.clone(),
        ),
        None => failure(1300, "Command completed successfully; no messages"),
    }
}

fn poll_ack(state: &mut State, cmd: &XmlElement) -> XmlElement {
    let id = cmd
        .child(ns::EPP, "poll")
        .and_then(|p| p.attr("msgID"))
        .unwrap_or_default()
        .to_string();

    if state.endless.is_none() {
        if state.queue.front().is_none_or(|m| m.id != id) {
            return failure(2303, "Object does not exist");
        }
        state.queue.pop_front();
    }
    state.acks.push(id);
    success(Vec::new())
}

// ===== Sessions =====

/// Session backed by a [`FakeRegistry`].
pub struct MockConnection {
    username: String,
    registry: FakeRegistry,
    extensions: Arc<ExtensionRegistry>,
    closed: AtomicBool,
}

impl MockConnection {
    pub fn new(username: &str, registry: FakeRegistry) -> Self {
        Self {
            username: username.to_string(),
            registry,
            extensions: Arc::new(ExtensionRegistry::nominet()),
            closed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl EppConnection for MockConnection {
    fn username(&self) -> &str {
        &self.username
    }

    async fn request(&self, command: &EppCommand) -> nominet_epp::Result<EppResponse> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(EppError::NotConnected);
        }
        let xml = self.registry.handle(command)?;
        EppResponse::decode(&xml, self.extensions.response_kind(command.kind()))
    }

    async fn logout(&self) -> nominet_epp::Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.registry.logout()
    }
}

/// Connector handing out [`MockConnection`]s over one shared [`FakeRegistry`].
pub struct MockConnector {
    registry: FakeRegistry,
    refuse_all: bool,
    opened: AtomicUsize,
}

impl MockConnector {
    pub fn new(registry: FakeRegistry) -> Self {
        Self {
            registry,
            refuse_all: false,
            opened: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn refuse_login(mut self) -> Self {
        self.refuse_all = true;
        self
    }

    /// Successful logins so far.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionConnector for MockConnector {
    async fn open(
        &self,
        credentials: &AccountCredentials,
        registry: Arc<ExtensionRegistry>,
    ) -> nominet_epp::Result<Arc<dyn EppConnection>> {
        self.registry.login(&credentials.username)?;
        if self.refuse_all {
            return Err(login_refused(&credentials.username));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockConnection {
            username: credentials.username.clone(),
            registry: self.registry.clone(),
            extensions: registry,
            closed: AtomicBool::new(false),
        }))
    }
}

// ===== Collaborators =====

/// Credential store returning a fixed list, or a storage error.
pub struct MockCredentialStore {
    accounts: Vec<RegistrarAccount>,
    error: Option<String>,
}

impl MockCredentialStore {
    pub fn new(accounts: Vec<RegistrarAccount>) -> Self {
        Self {
            accounts,
            error: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            accounts: Vec::new(),
            error: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl CredentialStore for MockCredentialStore {
    async fn load_all(&self) -> CoreResult<Vec<RegistrarAccount>> {
        match &self.error {
            Some(message) => Err(CoreError::StorageError(message.clone())),
            None => Ok(self.accounts.clone()),
        }
    }
}

// ===== Factories =====

/// Service context whose sessions all talk to `registry`.
pub fn create_test_context(registry: &FakeRegistry) -> Arc<ServiceContext> {
    let pool = SessionPool::new(Arc::new(MockConnector::new(registry.clone())));
    Arc::new(ServiceContext::new(
        Arc::new(pool),
        Arc::new(DottedPhoneFormatter),
    ))
}

/// A complete UK individual registrant.
pub fn uk_individual() -> ContactDetails {
    ContactDetails {
        first_name: "Jo".to_string(),
        last_name: "Bloggs".to_string(),
        email: "jo@example.co.uk".to_string(),
        phone: "01865 000000".to_string(),
        address1: "2 High Street".to_string(),
        city: "Oxford".to_string(),
        zip: "OX1 1AA".to_string(),
        country: "GB".to_string(),
        registrant_type: Some(RegistrantType::Ind),
        ..ContactDetails::default()
    }
}

/// `n:relData` payload releasing `domains`, with `accountId/@moved` set to `moved`.
pub fn released(domains: &[&str], moved: &str) -> XmlElement {
    XmlElement::new("n:relData")
        .with_attr("xmlns:n", ns::NOTIFICATIONS_V10)
        .with_child(text("n:accountId", "58658").with_attr("moved", moved))
        .with_child(text("n:from", "OLD-TAG"))
        .with_child(text("n:registrarTag", "NEW-TAG"))
        .with_child(
            XmlElement::new("n:domainListData")
                .with_attr("noDomains", domains.len().to_string())
                .with_children(domains.iter().map(|d| text("n:domainName", *d))),
        )
}
