//! Classification and field extraction for poll-queue notifications.
//!
//! Nominet delivers notifications as `resData` children from two revisions of the
//! std-notifications schema (1.0 aliased `n`, 1.1 aliased `n11`) plus plain `domain`
//! and `contact` payloads. The decoder checks a fixed, ordered marker table against the
//! direct children of `resData`; the first hit decides the type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::extensions::{ExtensionRegistry, ns};
use crate::response::EppResponse;
use crate::xml::XmlElement;

/// Notification types, in marker order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationType {
    DomainCancelled,
    DomainsReleased,
    RegistrarChange,
    ReferralRejected,
    RegistrantTransfer,
    DataQualityProcess,
    DomainsSuspended,
    ReferralAccepted,
    AccountChange,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DomainCancelled => "domain-cancelled",
            Self::DomainsReleased => "domains-released",
            Self::RegistrarChange => "registrar-change",
            Self::ReferralRejected => "referral-rejected",
            Self::RegistrantTransfer => "registrant-transfer",
            Self::DataQualityProcess => "data-quality-process",
            Self::DomainsSuspended => "domains-suspended",
            Self::ReferralAccepted => "referral-accepted",
            Self::AccountChange => "account-change",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(namespace alias, resData child, type)`. Order is significant.
const MARKERS: [(&str, &str, NotificationType); 9] = [
    ("n", "cancData", NotificationType::DomainCancelled),
    ("n", "relData", NotificationType::DomainsReleased),
    ("n", "rcData", NotificationType::RegistrarChange),
    ("n", "domainFailData", NotificationType::ReferralRejected),
    ("n", "trnData", NotificationType::RegistrantTransfer),
    ("n11", "processData", NotificationType::DataQualityProcess),
    ("n11", "suspData", NotificationType::DomainsSuspended),
    ("domain", "creData", NotificationType::ReferralAccepted),
    ("contact", "infData", NotificationType::AccountChange),
];

/// One resolved marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerRule {
    pub namespace: String,
    pub tag: &'static str,
    pub kind: NotificationType,
}

/// Typed payload of a notification. Absent nodes decode to empty strings or lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Notification {
    DomainCancelled {
        domain_name: String,
        originator: String,
    },
    DomainsReleased {
        account_id: String,
        /// `moved` attribute of `accountId` (`Y`/`N`).
        account_moved: String,
        from_tag: String,
        to_tag: String,
        domains: Vec<String>,
    },
    RegistrarChange {
        originator: String,
        registrar_tag: String,
        case_id: String,
        domains: Vec<String>,
    },
    ReferralRejected {
        domain_name: String,
        reason: String,
    },
    RegistrantTransfer {
        originator: String,
        account_id: String,
        old_account_id: String,
        domains: Vec<String>,
    },
    DataQualityProcess {
        stage: String,
        process_type: String,
        suspend_date: String,
        domains: Vec<String>,
    },
    DomainsSuspended {
        reason: String,
        cancel_date: String,
        domains: Vec<String>,
    },
    ReferralAccepted {
        domain_name: String,
        creation_date: String,
        expiration_date: String,
    },
    AccountChange {
        contact_id: String,
    },
}

impl Notification {
    pub fn kind(&self) -> NotificationType {
        match self {
            Self::DomainCancelled { .. } => NotificationType::DomainCancelled,
            Self::DomainsReleased { .. } => NotificationType::DomainsReleased,
            Self::RegistrarChange { .. } => NotificationType::RegistrarChange,
            Self::ReferralRejected { .. } => NotificationType::ReferralRejected,
            Self::RegistrantTransfer { .. } => NotificationType::RegistrantTransfer,
            Self::DataQualityProcess { .. } => NotificationType::DataQualityProcess,
            Self::DomainsSuspended { .. } => NotificationType::DomainsSuspended,
            Self::ReferralAccepted { .. } => NotificationType::ReferralAccepted,
            Self::AccountChange { .. } => NotificationType::AccountChange,
        }
    }

    /// Domains the notification concerns. Single-domain payloads with an empty name yield none.
    pub fn domains(&self) -> Vec<String> {
        match self {
            Self::DomainsReleased { domains, .. }
            | Self::RegistrarChange { domains, .. }
            | Self::RegistrantTransfer { domains, .. }
            | Self::DataQualityProcess { domains, .. }
            | Self::DomainsSuspended { domains, .. } => domains.clone(),
            Self::DomainCancelled { domain_name, .. }
            | Self::ReferralRejected { domain_name, .. }
            | Self::ReferralAccepted { domain_name, .. } => {
                std::iter::once(domain_name.clone())
                    .filter(|d| !d.is_empty())
                    .collect()
            }
            Self::AccountChange { .. } => Vec::new(),
        }
    }

    /// Type-specific fields other than the domain list, keyed by field name.
    pub fn data(&self) -> BTreeMap<String, String> {
        let pairs: Vec<(&str, &String)> = match self {
            Self::DomainCancelled { originator, .. } => vec![("originator", originator)],
            Self::DomainsReleased {
                account_id,
                account_moved,
                from_tag,
                to_tag,
                ..
            } => vec![
                ("account_id", account_id),
                ("account_moved", account_moved),
                ("from_tag", from_tag),
                ("to_tag", to_tag),
            ],
            Self::RegistrarChange {
                originator,
                registrar_tag,
                case_id,
                ..
            } => vec![
                ("originator", originator),
                ("registrar_tag", registrar_tag),
                ("case_id", case_id),
            ],
            Self::ReferralRejected { reason, .. } => vec![("reason", reason)],
            Self::RegistrantTransfer {
                originator,
                account_id,
                old_account_id,
                ..
            } => vec![
                ("originator", originator),
                ("account_id", account_id),
                ("old_account_id", old_account_id),
            ],
            Self::DataQualityProcess {
                stage,
                process_type,
                suspend_date,
                ..
            } => vec![
                ("stage", stage),
                ("process_type", process_type),
                ("suspend_date", suspend_date),
            ],
            Self::DomainsSuspended {
                reason,
                cancel_date,
                ..
            } => vec![("reason", reason), ("cancel_date", cancel_date)],
            Self::ReferralAccepted {
                creation_date,
                expiration_date,
                ..
            } => vec![
                ("creation_date", creation_date),
                ("expiration_date", expiration_date),
            ],
            Self::AccountChange { contact_id } => vec![("contact_id", contact_id)],
        };
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Maps poll responses to notification types and typed payloads.
#[derive(Debug, Clone)]
pub struct NotificationDecoder {
    rules: Vec<MarkerRule>,
}

impl NotificationDecoder {
    /// Resolves the marker aliases against `registry`. Markers whose alias is unknown are dropped.
    pub fn new(registry: &ExtensionRegistry) -> Self {
        let rules = MARKERS
            .iter()
            .filter_map(|(alias, tag, kind)| match registry.resolve_alias(alias) {
                Some(uri) => Some(MarkerRule {
                    namespace: uri.to_string(),
                    tag,
                    kind: *kind,
                }),
                None => {
                    log::warn!("Notification alias '{alias}' is not registered; {kind} will not be recognised");
                    None
                }
            })
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[MarkerRule] {
        &self.rules
    }

    /// First marker matching a direct child of `resData`, if any.
    pub fn classify(&self, response: &EppResponse) -> Option<NotificationType> {
        let res_data = response.res_data.as_ref()?;
        self.rules
            .iter()
            .find(|rule| res_data.child(&rule.namespace, rule.tag).is_some())
            .map(|rule| rule.kind)
    }

    /// Reads the fields of `kind` from the response. A missing payload node gives empty fields.
    pub fn extract(&self, response: &EppResponse, kind: NotificationType) -> Notification {
        let empty = XmlElement::default();
        let rule = self.rules.iter().find(|r| r.kind == kind);
        let node = match (rule, response.res_data.as_ref()) {
            (Some(rule), Some(res_data)) => res_data.child(&rule.namespace, rule.tag),
            _ => None,
        }
        .unwrap_or(&empty);
        let uri = rule.map_or("", |r| r.namespace.as_str());

        extract_fields(node, uri, kind)
    }

    /// Classifies and extracts in one step.
    pub fn decode(&self, response: &EppResponse) -> Option<Notification> {
        self.classify(response)
            .map(|kind| self.extract(response, kind))
    }
}

fn extract_fields(node: &XmlElement, uri: &str, kind: NotificationType) -> Notification {
    let text = |local: &str| node.child_text(uri, local);
    let list = |path: &[(&str, &str)]| -> Vec<String> {
        node.find_all(path)
            .into_iter()
            .map(|n| n.text.clone())
            .filter(|d| !d.is_empty())
            .collect()
    };
    let domain_list = || list(&[(uri, "domainListData"), (uri, "domainName")]);

    match kind {
        NotificationType::DomainCancelled => Notification::DomainCancelled {
            domain_name: text("domainName"),
            originator: text("orig"),
        },
        NotificationType::DomainsReleased => {
            let account = node.child(uri, "accountId");
            Notification::DomainsReleased {
                account_id: account.map(|a| a.text.clone()).unwrap_or_default(),
                account_moved: account
                    .and_then(|a| a.attr("moved"))
                    .unwrap_or_default()
                    .to_string(),
                from_tag: text("from"),
                to_tag: text("registrarTag"),
                domains: domain_list(),
            }
        }
        NotificationType::RegistrarChange => Notification::RegistrarChange {
            originator: text("orig"),
            registrar_tag: text("registrarTag"),
            case_id: text("caseId"),
            domains: list(&[
                (uri, "domainListData"),
                (ns::DOMAIN, "infData"),
                (ns::DOMAIN, "name"),
            ]),
        },
        NotificationType::ReferralRejected => Notification::ReferralRejected {
            domain_name: text("domainName"),
            reason: text("reason"),
        },
        NotificationType::RegistrantTransfer => Notification::RegistrantTransfer {
            originator: text("orig"),
            account_id: text("accountId"),
            old_account_id: text("oldAccountId"),
            domains: domain_list(),
        },
        NotificationType::DataQualityProcess => Notification::DataQualityProcess {
            stage: node.attr("stage").unwrap_or_default().to_string(),
            process_type: text("processType"),
            suspend_date: text("suspendDate"),
            domains: domain_list(),
        },
        NotificationType::DomainsSuspended => Notification::DomainsSuspended {
            reason: text("reason"),
            cancel_date: text("cancelDate"),
            domains: domain_list(),
        },
        NotificationType::ReferralAccepted => Notification::ReferralAccepted {
            domain_name: text("name"),
            creation_date: text("crDate"),
            expiration_date: text("exDate"),
        },
        NotificationType::AccountChange => Notification::AccountChange {
            contact_id: text("id"),
        },
    }
}

/// One dequeued message: the queue envelope plus its decoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollMessage {
    pub id: String,
    /// Messages left in the queue, this one included.
    pub count: u32,
    pub message: String,
    pub date: String,
    pub notification: Option<Notification>,
}

impl PollMessage {
    /// Builds the message from a `1301` poll response.
    pub fn from_response(response: &EppResponse, decoder: &NotificationDecoder) -> Self {
        let queue = response.queue.clone().unwrap_or_default();
        Self {
            id: queue.id,
            count: queue.count,
            message: queue.message,
            date: queue.date,
            notification: decoder.decode(response),
        }
    }

    pub fn kind(&self) -> Option<NotificationType> {
        self.notification.as_ref().map(Notification::kind)
    }

    pub fn domains(&self) -> Vec<String> {
        self.notification
            .as_ref()
            .map(Notification::domains)
            .unwrap_or_default()
    }

    pub fn data(&self) -> BTreeMap<String, String> {
        self.notification
            .as_ref()
            .map(Notification::data)
            .unwrap_or_default()
    }
}
