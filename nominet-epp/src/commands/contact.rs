use super::{object_command, optional_text};
use crate::command::EppCommand;
use crate::extensions::{CommandKind, ns};
use crate::types::Contact;
use crate::xml::XmlElement;

fn id(handle: &str) -> XmlElement {
    XmlElement::text_node("contact:id", handle)
}

fn postal_info(contact: &Contact) -> XmlElement {
    let mut addr = XmlElement::new("contact:addr");
    for line in contact.street.iter().filter(|l| !l.trim().is_empty()).take(3) {
        addr.push(XmlElement::text_node("contact:street", line.trim()));
    }
    addr.push(XmlElement::text_node("contact:city", contact.city.trim()));
    addr.children
        .extend(optional_text("contact:sp", contact.province.as_deref()));
    addr.children
        .extend(optional_text("contact:pc", contact.postal_code.as_deref()));
    addr.push(XmlElement::text_node(
        "contact:cc",
        contact.country_code.trim().to_ascii_uppercase(),
    ));

    let mut info = XmlElement::new("contact:postalInfo")
        .with_attr("type", contact.postal_type.as_str())
        .with_child(XmlElement::text_node("contact:name", contact.name.trim()));
    info.children
        .extend(optional_text("contact:org", contact.organization.as_deref()));
    info.push(addr);
    info
}

fn details(contact: &Contact) -> Vec<XmlElement> {
    let mut children = vec![postal_info(contact)];
    children.extend(optional_text("contact:voice", contact.voice.as_deref()));
    children.push(XmlElement::text_node("contact:email", contact.email.trim()));
    children
}

/// Plain `contact:create` under the client-chosen `handle`.
pub fn create(handle: &str, contact: &Contact) -> EppCommand {
    let mut children = vec![id(handle)];
    children.extend(details(contact));
    if let Some(pw) = optional_text("contact:pw", contact.auth_password.as_deref()) {
        children.push(XmlElement::new("contact:authInfo").with_child(pw));
    }

    EppCommand::new(
        CommandKind::ContactCreate,
        object_command("create", "contact", ns::CONTACT, children),
    )
}

pub fn info(handle: &str) -> EppCommand {
    EppCommand::new(
        CommandKind::ContactInfo,
        object_command("info", "contact", ns::CONTACT, [id(handle)]),
    )
}

/// Plain `contact:update` replacing postal info, voice and email.
pub fn update(handle: &str, changes: &Contact) -> EppCommand {
    let chg = XmlElement::new("contact:chg").with_children(details(changes));
    EppCommand::new(
        CommandKind::ContactUpdate,
        object_command("update", "contact", ns::CONTACT, [id(handle), chg]),
    )
}

pub fn delete(handle: &str) -> EppCommand {
    EppCommand::new(
        CommandKind::ContactDelete,
        object_command("delete", "contact", ns::CONTACT, [id(handle)]),
    )
}
