//! `secDNS-1.1` updates, carried as an extension on an otherwise empty `domain:update`.

use super::domain;
use crate::command::EppCommand;
use crate::extensions::ns;
use crate::types::{DomainUpdate, DsRecord};
use crate::xml::XmlElement;

fn optional<T: ToString>(name: &str, value: Option<T>) -> Option<XmlElement> {
    value.map(|v| XmlElement::text_node(name, v.to_string()))
}

/// `secDNS:dsData`, emitting only the fields that are set.
fn ds_data(record: &DsRecord) -> XmlElement {
    let mut ds = XmlElement::new("secDNS:dsData");
    ds.children.extend(optional("secDNS:keyTag", record.key_tag));
    ds.children.extend(optional("secDNS:alg", record.algorithm));
    ds.children
        .extend(optional("secDNS:digestType", record.digest_type));
    ds.children
        .extend(optional("secDNS:digest", record.digest.as_deref()));

    if let Some(public_key) = record.public_key.as_deref().filter(|k| !k.is_empty()) {
        let mut key = XmlElement::new("secDNS:keyData");
        key.children.extend(optional("secDNS:flags", record.flags));
        key.push(XmlElement::text_node("secDNS:protocol", "3"));
        key.children.extend(optional("secDNS:alg", record.algorithm));
        key.push(XmlElement::text_node("secDNS:pubKey", public_key));
        ds.push(key);
    }
    ds
}

fn sec_dns_update(section: &str, records: &[DsRecord]) -> XmlElement {
    XmlElement::new("secDNS:update")
        .with_attr("xmlns:secDNS", ns::SEC_DNS)
        .with_child(XmlElement::new(section).with_children(records.iter().map(ds_data)))
}

/// Add-only DS update.
pub fn add_records(domain: &str, records: &[DsRecord]) -> EppCommand {
    domain::update(&DomainUpdate::new(domain)).with_extension(sec_dns_update("secDNS:add", records))
}

/// Remove-only DS update.
pub fn remove_records(domain: &str, records: &[DsRecord]) -> EppCommand {
    domain::update(&DomainUpdate::new(domain)).with_extension(sec_dns_update("secDNS:rem", records))
}
