use super::object_command;
use crate::command::EppCommand;
use crate::extensions::{CommandKind, ns};
use crate::types::{DomainRegistration, DomainUpdate, DomainUpdateSet, Period};
use crate::xml::XmlElement;

fn name(value: &str) -> XmlElement {
    XmlElement::text_node("domain:name", value)
}

fn period(period: Period) -> XmlElement {
    XmlElement::text_node("domain:period", period.value.to_string())
        .with_attr("unit", period.unit.as_str())
}

fn nameservers(hosts: &[String]) -> Option<XmlElement> {
    let hosts: Vec<XmlElement> = hosts
        .iter()
        .map(|h| h.trim())
        .filter(|h| !h.is_empty())
        .map(|h| XmlElement::text_node("domain:hostObj", h))
        .collect();
    (!hosts.is_empty()).then(|| XmlElement::new("domain:ns").with_children(hosts))
}

fn auth_info(code: &str) -> XmlElement {
    XmlElement::new("domain:authInfo").with_child(XmlElement::text_node("domain:pw", code))
}

fn update_set(tag: &str, set: &DomainUpdateSet) -> Option<XmlElement> {
    if set.is_empty() {
        return None;
    }
    let mut element = XmlElement::new(tag);
    if let Some(hosts) = nameservers(&set.nameservers) {
        element.push(hosts);
    }
    for status in &set.statuses {
        element.push(XmlElement::new("domain:status").with_attr("s", status.as_str()));
    }
    Some(element)
}

pub fn check<S: AsRef<str>>(names: &[S]) -> EppCommand {
    EppCommand::new(
        CommandKind::DomainCheck,
        object_command(
            "check",
            "domain",
            ns::DOMAIN,
            names.iter().map(|n| name(n.as_ref())),
        ),
    )
}

/// `domain:info` with `hosts="all"`.
pub fn info(domain: &str) -> EppCommand {
    EppCommand::new(
        CommandKind::DomainInfo,
        object_command(
            "info",
            "domain",
            ns::DOMAIN,
            [name(domain).with_attr("hosts", "all")],
        ),
    )
}

/// `domain:create`. Blank nameserver entries are skipped.
pub fn create(registration: &DomainRegistration) -> EppCommand {
    let mut children = vec![name(&registration.name), period(registration.period)];
    children.extend(nameservers(&registration.nameservers));
    children.push(XmlElement::text_node(
        "domain:registrant",
        registration.registrant.as_str(),
    ));
    children.push(auth_info(&registration.auth_code));

    EppCommand::new(
        CommandKind::DomainCreate,
        object_command("create", "domain", ns::DOMAIN, children),
    )
}

/// `domain:update` with `add`, `rem` and `chg` emitted only when non-empty.
pub fn update(update: &DomainUpdate) -> EppCommand {
    let mut children = vec![name(&update.name)];
    children.extend(update_set("domain:add", &update.add));
    children.extend(update_set("domain:rem", &update.remove));

    if update.registrant.is_some() || update.auth_code.is_some() {
        let mut chg = XmlElement::new("domain:chg");
        if let Some(registrant) = &update.registrant {
            chg.push(XmlElement::text_node("domain:registrant", registrant.as_str()));
        }
        if let Some(code) = &update.auth_code {
            chg.push(auth_info(code));
        }
        children.push(chg);
    }

    EppCommand::new(
        CommandKind::DomainUpdate,
        object_command("update", "domain", ns::DOMAIN, children),
    )
}

/// `domain:renew`. `current_expiry` is the `YYYY-MM-DD` expiry the registry holds.
pub fn renew(domain: &str, current_expiry: &str, term: Period) -> EppCommand {
    EppCommand::new(
        CommandKind::DomainRenew,
        object_command(
            "renew",
            "domain",
            ns::DOMAIN,
            [
                name(domain),
                XmlElement::text_node("domain:curExpDate", current_expiry),
                period(term),
            ],
        ),
    )
}

pub fn delete(domain: &str) -> EppCommand {
    EppCommand::new(
        CommandKind::DomainDelete,
        object_command("delete", "domain", ns::DOMAIN, [name(domain)]),
    )
}
