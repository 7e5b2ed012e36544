//! Nominet push transfer ("release"): hand a domain to another registrar by tag.

use crate::command::EppCommand;
use crate::extensions::{CommandKind, ns};
use crate::xml::XmlElement;

pub fn release(domain: &str, registrar_tag: &str) -> EppCommand {
    EppCommand::new(
        CommandKind::DomainRelease,
        XmlElement::new("update").with_child(
            XmlElement::new("r:release")
                .with_attr("xmlns:r", ns::STD_RELEASE)
                .with_child(XmlElement::text_node("r:domainName", domain))
                .with_child(XmlElement::text_node("r:registrarTag", registrar_tag)),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_names_domain_and_destination_tag() {
        let xml = release("example.co.uk", "NEWTAG").to_xml("T").unwrap();
        let root = XmlElement::parse(&xml).unwrap();
        let body = root
            .find(&[(ns::EPP, "command"), (ns::EPP, "update"), (ns::STD_RELEASE, "release")])
            .unwrap();
        assert_eq!(body.child_text(ns::STD_RELEASE, "domainName"), "example.co.uk");
        assert_eq!(body.child_text(ns::STD_RELEASE, "registrarTag"), "NEWTAG");
    }
}
