use std::net::IpAddr;

use super::object_command;
use crate::command::EppCommand;
use crate::extensions::{CommandKind, ns};
use crate::xml::XmlElement;

fn name(host: &str) -> XmlElement {
    XmlElement::text_node("host:name", host)
}

fn address(ip: &IpAddr) -> XmlElement {
    let version = if ip.is_ipv4() { "v4" } else { "v6" };
    XmlElement::text_node("host:addr", ip.to_string()).with_attr("ip", version)
}

pub fn check<S: AsRef<str>>(hosts: &[S]) -> EppCommand {
    EppCommand::new(
        CommandKind::HostCheck,
        object_command(
            "check",
            "host",
            ns::HOST,
            hosts.iter().map(|h| name(h.as_ref())),
        ),
    )
}

pub fn info(host: &str) -> EppCommand {
    EppCommand::new(
        CommandKind::HostInfo,
        object_command("info", "host", ns::HOST, [name(host)]),
    )
}

pub fn create(host: &str, addresses: &[IpAddr]) -> EppCommand {
    let mut children = vec![name(host)];
    children.extend(addresses.iter().map(address));
    EppCommand::new(
        CommandKind::HostCreate,
        object_command("create", "host", ns::HOST, children),
    )
}

/// Replaces glue: removes `remove` and adds `add` in one update.
pub fn update(host: &str, add: &[IpAddr], remove: &[IpAddr]) -> EppCommand {
    let mut children = vec![name(host)];
    if !add.is_empty() {
        children.push(XmlElement::new("host:add").with_children(add.iter().map(address)));
    }
    if !remove.is_empty() {
        children.push(XmlElement::new("host:rem").with_children(remove.iter().map(address)));
    }
    EppCommand::new(
        CommandKind::HostUpdate,
        object_command("update", "host", ns::HOST, children),
    )
}
