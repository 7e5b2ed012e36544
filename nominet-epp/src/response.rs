//! Response envelope and per-kind decoding of `resData`.

use std::net::IpAddr;

use crate::error::{EppError, Result};
use crate::extensions::{ResponseKind, ns};
use crate::types::{
    CheckResult, Contact, ContactCreated, ContactExtension, ContactInfo, DomainCreated, DomainInfo,
    DomainRenewed, DsRecord, HostInfo, MessageQueue, Nameserver, PostalInfoType,
};
use crate::utils::datetime::parse_epp_datetime;
use crate::xml::XmlElement;

/// Command completed successfully.
pub const RESULT_SUCCESS: u16 = 1000;
/// Command completed successfully; action pending.
pub const RESULT_PENDING: u16 = 1001;
/// Command completed successfully; no messages.
pub const RESULT_QUEUE_EMPTY: u16 = 1300;
/// Command completed successfully; ack to dequeue.
pub const RESULT_MESSAGE_AVAILABLE: u16 = 1301;
/// Command completed successfully; ending session.
pub const RESULT_ENDING_SESSION: u16 = 1500;
/// First failure code.
pub const RESULT_ERROR_THRESHOLD: u16 = 2000;

/// Typed view of `resData`, chosen by the response kind of the command that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResponseData {
    #[default]
    None,
    DomainCheck(Vec<CheckResult>),
    DomainInfo(Box<DomainInfo>),
    DomainCreated(DomainCreated),
    DomainRenewed(DomainRenewed),
    ContactCreated(ContactCreated),
    ContactInfo(Box<ContactInfo>),
    HostCheck(Vec<CheckResult>),
    HostInfo(HostInfo),
}

/// A decoded `<response>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EppResponse {
    pub code: u16,
    pub message: String,
    pub kind: ResponseKind,
    pub queue: Option<MessageQueue>,
    /// Raw `resData`, kept for decoders that work on the tree (poll notifications).
    pub res_data: Option<XmlElement>,
    /// Raw `extension`.
    pub extension: Option<XmlElement>,
    pub data: ResponseData,
    pub client_transaction_id: Option<String>,
    pub server_transaction_id: Option<String>,
}

impl EppResponse {
    /// Parses a response document and decodes `resData` as `kind`.
    ///
    /// Typed data is only decoded for successful results; failures keep
    /// [`ResponseData::None`].
    pub fn decode(xml: &str, kind: ResponseKind) -> Result<Self> {
        let root = XmlElement::parse(xml)?;
        let response = root
            .child(ns::EPP, "response")
            .ok_or_else(|| EppError::ParseError {
                detail: "missing <response> element".to_string(),
            })?;
        let result = response
            .child(ns::EPP, "result")
            .ok_or_else(|| EppError::ParseError {
                detail: "missing <result> element".to_string(),
            })?;
        let code = result
            .attr("code")
            .and_then(|c| c.trim().parse::<u16>().ok())
            .ok_or_else(|| EppError::ParseError {
                detail: "missing or invalid result code".to_string(),
            })?;

        let mut decoded = Self {
            code,
            message: result.child_text(ns::EPP, "msg"),
            kind,
            queue: response.child(ns::EPP, "msgQ").map(message_queue),
            res_data: response.child(ns::EPP, "resData").cloned(),
            extension: response.child(ns::EPP, "extension").cloned(),
            data: ResponseData::None,
            client_transaction_id: response
                .find(&[(ns::EPP, "trID"), (ns::EPP, "clTRID")])
                .map(|e| e.text.clone()),
            server_transaction_id: response
                .find(&[(ns::EPP, "trID"), (ns::EPP, "svTRID")])
                .map(|e| e.text.clone()),
        };

        if decoded.is_success() {
            decoded.data = decode_data(kind, decoded.res_data.as_ref(), decoded.extension.as_ref());
        }
        Ok(decoded)
    }

    pub fn is_success(&self) -> bool {
        self.code < RESULT_ERROR_THRESHOLD
    }

    pub fn has_message(&self) -> bool {
        self.code == RESULT_MESSAGE_AVAILABLE
    }

    /// Converts a failure result into [`EppError::Protocol`].
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(EppError::Protocol {
                result_code: self.code,
                message: self.message,
            })
        }
    }

    pub fn domain_info(&self) -> Option<&DomainInfo> {
        match &self.data {
            ResponseData::DomainInfo(info) => Some(info.as_ref()),
            _ => None,
        }
    }

    pub fn domain_created(&self) -> Option<&DomainCreated> {
        match &self.data {
            ResponseData::DomainCreated(created) => Some(created),
            _ => None,
        }
    }

    pub fn domain_renewed(&self) -> Option<&DomainRenewed> {
        match &self.data {
            ResponseData::DomainRenewed(renewed) => Some(renewed),
            _ => None,
        }
    }

    pub fn contact_created(&self) -> Option<&ContactCreated> {
        match &self.data {
            ResponseData::ContactCreated(created) => Some(created),
            _ => None,
        }
    }

    pub fn contact_info(&self) -> Option<&ContactInfo> {
        match &self.data {
            ResponseData::ContactInfo(info) => Some(info.as_ref()),
            _ => None,
        }
    }

    pub fn host_info(&self) -> Option<&HostInfo> {
        match &self.data {
            ResponseData::HostInfo(info) => Some(info),
            _ => None,
        }
    }

    /// Check results for either domain or host checks.
    pub fn check_results(&self) -> &[CheckResult] {
        match &self.data {
            ResponseData::DomainCheck(results) | ResponseData::HostCheck(results) => {
                results.as_slice()
            }
            _ => &[],
        }
    }
}

fn message_queue(msg_q: &XmlElement) -> MessageQueue {
    MessageQueue {
        id: msg_q.attr("id").unwrap_or_default().to_string(),
        count: msg_q
            .attr("count")
            .and_then(|c| c.trim().parse().ok())
            .unwrap_or_default(),
        date: msg_q.child_text(ns::EPP, "qDate"),
        message: msg_q.child_text(ns::EPP, "msg"),
    }
}

fn decode_data(
    kind: ResponseKind,
    res_data: Option<&XmlElement>,
    extension: Option<&XmlElement>,
) -> ResponseData {
    let Some(res_data) = res_data else {
        return ResponseData::None;
    };

    match kind {
        ResponseKind::DomainCheck => res_data
            .child(ns::DOMAIN, "chkData")
            .map_or(ResponseData::None, |chk| {
                ResponseData::DomainCheck(check_results(chk, ns::DOMAIN))
            }),
        ResponseKind::HostCheck => res_data
            .child(ns::HOST, "chkData")
            .map_or(ResponseData::None, |chk| {
                ResponseData::HostCheck(check_results(chk, ns::HOST))
            }),
        ResponseKind::DomainInfo => res_data
            .child(ns::DOMAIN, "infData")
            .map_or(ResponseData::None, |inf| {
                ResponseData::DomainInfo(Box::new(domain_info(inf, extension)))
            }),
        ResponseKind::DomainCreate => res_data
            .child(ns::DOMAIN, "creData")
            .map_or(ResponseData::None, |cre| {
                ResponseData::DomainCreated(DomainCreated {
                    name: cre.child_text(ns::DOMAIN, "name"),
                    created: parse_epp_datetime(&cre.child_text(ns::DOMAIN, "crDate")),
                    expires: parse_epp_datetime(&cre.child_text(ns::DOMAIN, "exDate")),
                })
            }),
        ResponseKind::DomainRenew => res_data
            .child(ns::DOMAIN, "renData")
            .map_or(ResponseData::None, |ren| {
                ResponseData::DomainRenewed(DomainRenewed {
                    name: ren.child_text(ns::DOMAIN, "name"),
                    expires: parse_epp_datetime(&ren.child_text(ns::DOMAIN, "exDate")),
                })
            }),
        ResponseKind::ContactCreate => res_data
            .child(ns::CONTACT, "creData")
            .map_or(ResponseData::None, |cre| {
                ResponseData::ContactCreated(ContactCreated {
                    id: cre.child_text(ns::CONTACT, "id"),
                    created: parse_epp_datetime(&cre.child_text(ns::CONTACT, "crDate")),
                })
            }),
        ResponseKind::ContactInfo => res_data
            .child(ns::CONTACT, "infData")
            .map_or(ResponseData::None, |inf| {
                ResponseData::ContactInfo(Box::new(contact_info(inf, extension)))
            }),
        ResponseKind::HostInfo => res_data
            .child(ns::HOST, "infData")
            .map_or(ResponseData::None, |inf| {
                ResponseData::HostInfo(HostInfo {
                    name: inf.child_text(ns::HOST, "name"),
                    statuses: statuses(inf, ns::HOST),
                    addresses: addresses(inf.children_named(ns::HOST, "addr")),
                })
            }),
        ResponseKind::Generic | ResponseKind::Poll => ResponseData::None,
    }
}

fn check_results(chk_data: &XmlElement, namespace: &str) -> Vec<CheckResult> {
    chk_data
        .children_named(namespace, "cd")
        .filter_map(|cd| {
            let name = cd.child(namespace, "name")?;
            Some(CheckResult {
                name: name.text.clone(),
                available: matches!(name.attr("avail"), Some("1" | "true")),
                reason: cd
                    .child(namespace, "reason")
                    .map(|r| r.text.clone())
                    .filter(|r| !r.is_empty()),
            })
        })
        .collect()
}

fn statuses(inf_data: &XmlElement, namespace: &str) -> Vec<String> {
    inf_data
        .children_named(namespace, "status")
        .filter_map(|s| s.attr("s").map(str::to_string))
        .collect()
}

fn addresses<'a>(elements: impl Iterator<Item = &'a XmlElement>) -> Vec<IpAddr> {
    elements.filter_map(|a| a.text.trim().parse().ok()).collect()
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn domain_info(inf: &XmlElement, extension: Option<&XmlElement>) -> DomainInfo {
    let nameservers = inf
        .child(ns::DOMAIN, "ns")
        .map(|ns_el| {
            let objects = ns_el.children_named(ns::DOMAIN, "hostObj").map(|h| Nameserver {
                hostname: h.text.clone(),
                addresses: Vec::new(),
            });
            let attributes = ns_el.children_named(ns::DOMAIN, "hostAttr").map(|h| Nameserver {
                hostname: h.child_text(ns::DOMAIN, "hostName"),
                addresses: addresses(h.children_named(ns::DOMAIN, "hostAddr")),
            });
            objects.chain(attributes).collect()
        })
        .unwrap_or_default();

    DomainInfo {
        name: inf.child_text(ns::DOMAIN, "name"),
        roid: inf.child_text(ns::DOMAIN, "roid"),
        statuses: statuses(inf, ns::DOMAIN),
        registrant: non_empty(inf.child_text(ns::DOMAIN, "registrant")),
        contacts: inf
            .children_named(ns::DOMAIN, "contact")
            .map(|c| (c.attr("type").unwrap_or_default().to_string(), c.text.clone()))
            .collect(),
        nameservers,
        hosts: inf
            .children_named(ns::DOMAIN, "host")
            .map(|h| h.text.clone())
            .collect(),
        created: parse_epp_datetime(&inf.child_text(ns::DOMAIN, "crDate")),
        updated: parse_epp_datetime(&inf.child_text(ns::DOMAIN, "upDate")),
        expires: parse_epp_datetime(&inf.child_text(ns::DOMAIN, "exDate")),
        auth_code: inf
            .find(&[(ns::DOMAIN, "authInfo"), (ns::DOMAIN, "pw")])
            .map(|pw| pw.text.clone())
            .and_then(non_empty),
        ds_records: extension
            .and_then(|ext| ext.child(ns::SEC_DNS, "infData"))
            .map(ds_records)
            .unwrap_or_default(),
    }
}

fn parse_number<T: std::str::FromStr>(element: &XmlElement, local: &str) -> Option<T> {
    element
        .child(ns::SEC_DNS, local)
        .and_then(|e| e.text.trim().parse().ok())
}

/// `secDNS:infData` holding either `dsData` (optionally with `keyData`) or bare `keyData`.
fn ds_records(inf: &XmlElement) -> Vec<DsRecord> {
    let from_ds = inf.children_named(ns::SEC_DNS, "dsData").map(|ds| {
        let key = ds.child(ns::SEC_DNS, "keyData");
        DsRecord {
            key_tag: parse_number(ds, "keyTag"),
            algorithm: parse_number(ds, "alg"),
            digest_type: parse_number(ds, "digestType"),
            digest: non_empty(ds.child_text(ns::SEC_DNS, "digest")),
            flags: key.and_then(|k| parse_number(k, "flags")),
            public_key: key.and_then(|k| non_empty(k.child_text(ns::SEC_DNS, "pubKey"))),
        }
    });
    let from_key = inf.children_named(ns::SEC_DNS, "keyData").map(|key| DsRecord {
        algorithm: parse_number(key, "alg"),
        flags: parse_number(key, "flags"),
        public_key: non_empty(key.child_text(ns::SEC_DNS, "pubKey")),
        ..DsRecord::default()
    });
    from_ds.chain(from_key).collect()
}

fn contact_info(inf: &XmlElement, extension: Option<&XmlElement>) -> ContactInfo {
    let postal = inf.child(ns::CONTACT, "postalInfo");
    let addr = postal.and_then(|p| p.child(ns::CONTACT, "addr"));
    let text = |parent: Option<&XmlElement>, local: &str| {
        parent.map(|p| p.child_text(ns::CONTACT, local)).unwrap_or_default()
    };

    let contact = Contact {
        id: non_empty(inf.child_text(ns::CONTACT, "id")),
        name: text(postal, "name"),
        organization: non_empty(text(postal, "org")),
        street: addr
            .map(|a| {
                a.children_named(ns::CONTACT, "street")
                    .map(|s| s.text.clone())
                    .collect()
            })
            .unwrap_or_default(),
        city: text(addr, "city"),
        province: non_empty(text(addr, "sp")),
        postal_code: non_empty(text(addr, "pc")),
        country_code: text(addr, "cc"),
        voice: non_empty(inf.child_text(ns::CONTACT, "voice")),
        email: inf.child_text(ns::CONTACT, "email"),
        auth_password: inf
            .find(&[(ns::CONTACT, "authInfo"), (ns::CONTACT, "pw")])
            .map(|pw| pw.text.clone())
            .and_then(non_empty),
        postal_type: match postal.and_then(|p| p.attr("type")) {
            Some("loc") => PostalInfoType::Loc,
            _ => PostalInfoType::Int,
        },
    };

    let nominet = extension.and_then(|ext| ext.child(ns::CONTACT_NOM_EXT, "infData"));
    let ext_text = |local: &str| {
        nominet
            .map(|n| n.child_text(ns::CONTACT_NOM_EXT, local))
            .and_then(non_empty)
    };

    ContactInfo {
        roid: inf.child_text(ns::CONTACT, "roid"),
        statuses: statuses(inf, ns::CONTACT),
        contact,
        extension: ContactExtension {
            registrant_type: ext_text("type").and_then(|t| t.parse().ok()),
            trading_name: ext_text("trad-name"),
            company_number: ext_text("co-no"),
        },
    }
}
