//! Contact commands carrying the Nominet `contact-nom-ext` block.
//!
//! The block is attached only when at least one of trading name, registrant type or
//! company number is non-empty; otherwise the plain standard command is returned. Children
//! appear in the fixed order `trad-name`, `type`, `co-no`, and only for supplied values.

use super::contact;
use crate::command::EppCommand;
use crate::extensions::{CommandKind, ns};
use crate::types::{Contact, ContactExtension};
use crate::xml::XmlElement;

fn extension_block(container: &str, fields: &ContactExtension) -> Option<XmlElement> {
    if fields.is_empty() {
        return None;
    }

    let mut block = XmlElement::new(format!("contact-ext:{container}"))
        .with_attr("xmlns:contact-ext", ns::CONTACT_NOM_EXT);
    if let Some(name) = fields.trading_name() {
        block.push(XmlElement::text_node("contact-ext:trad-name", name));
    }
    if let Some(kind) = fields.registrant_type {
        block.push(XmlElement::text_node("contact-ext:type", kind.code()));
    }
    if let Some(number) = fields.company_number() {
        block.push(XmlElement::text_node("contact-ext:co-no", number));
    }
    Some(block)
}

pub fn create_contact(handle: &str, contact: &Contact, fields: &ContactExtension) -> EppCommand {
    let command = contact::create(handle, contact);
    match extension_block("create", fields) {
        Some(block) => command
            .with_kind(CommandKind::NominetContactCreate)
            .with_extension(block),
        None => command,
    }
}

pub fn update_contact(handle: &str, changes: &Contact, fields: &ContactExtension) -> EppCommand {
    let command = contact::update(handle, changes);
    match extension_block("update", fields) {
        Some(block) => command
            .with_kind(CommandKind::NominetContactUpdate)
            .with_extension(block),
        None => command,
    }
}
