use crate::command::EppCommand;
use crate::extensions::{CommandKind, ExtensionRegistry};
use crate::xml::XmlElement;

/// `<login>` announcing every object and extension in `registry`.
pub fn login(username: &str, password: &str, registry: &ExtensionRegistry) -> EppCommand {
    let mut services = XmlElement::new("svcs")
        .with_children(registry.object_uris().map(|uri| XmlElement::text_node("objURI", uri)));

    let extensions: Vec<XmlElement> = registry
        .extension_uris()
        .map(|uri| XmlElement::text_node("extURI", uri))
        .collect();
    if !extensions.is_empty() {
        services.push(XmlElement::new("svcExtension").with_children(extensions));
    }

    EppCommand::new(
        CommandKind::Login,
        XmlElement::new("login")
            .with_child(XmlElement::text_node("clID", username))
            .with_child(XmlElement::text_node("pw", password))
            .with_child(
                XmlElement::new("options")
                    .with_child(XmlElement::text_node("version", "1.0"))
                    .with_child(XmlElement::text_node("lang", "en")),
            )
            .with_child(services),
    )
}

pub fn logout() -> EppCommand {
    EppCommand::new(CommandKind::Logout, XmlElement::new("logout"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensions::ns;

    #[test]
    fn login_announces_registry_extensions() {
        let command = login("TAG", "secret", &ExtensionRegistry::nominet());
        let root = XmlElement::parse(&command.to_xml("T").unwrap()).unwrap();
        let login = root
            .find(&[(ns::EPP, "command"), (ns::EPP, "login")])
            .unwrap();

        assert_eq!(login.child_text(ns::EPP, "clID"), "TAG");
        let ext_uris: Vec<&str> = login
            .find_all(&[(ns::EPP, "svcs"), (ns::EPP, "svcExtension"), (ns::EPP, "extURI")])
            .into_iter()
            .map(|e| e.text.as_str())
            .collect();
        assert!(ext_uris.contains(&ns::STD_NOTIFICATIONS));
        assert!(ext_uris.contains(&ns::CONTACT_NOM_EXT));

        let obj_uris = login.find_all(&[(ns::EPP, "svcs"), (ns::EPP, "objURI")]);
        assert_eq!(obj_uris.len(), 4);
    }

    #[test]
    fn plain_registry_has_no_svc_extension() {
        let command = login("TAG", "secret", &ExtensionRegistry::new());
        let root = XmlElement::parse(&command.to_xml("T").unwrap()).unwrap();
        assert!(
            root.find(&[(ns::EPP, "command"), (ns::EPP, "login"), (ns::EPP, "svcs"), (ns::EPP, "svcExtension")])
                .is_none()
        );
    }
}
