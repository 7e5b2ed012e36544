use crate::error::Result;
use crate::extensions::{CommandKind, ns};
use crate::xml::XmlElement;

/// One EPP command ready to be framed: the verb element, optional extension blocks,
/// and the kind used to pick the response decoder.
///
/// Extension blocks are injected with [`EppCommand::with_extension`] rather than
/// baked into the builders, so registry-specific data composes with any standard command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EppCommand {
    kind: CommandKind,
    body: XmlElement,
    extensions: Vec<XmlElement>,
}

impl EppCommand {
    pub fn new(kind: CommandKind, body: XmlElement) -> Self {
        Self {
            kind,
            body,
            extensions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_extension(mut self, extension: XmlElement) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Replaces the kind, for commands whose response shape changes once an extension is attached.
    #[must_use]
    pub fn with_kind(mut self, kind: CommandKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// The verb element, e.g. `<create>` or `<poll op="req"/>`.
    pub fn body(&self) -> &XmlElement {
        &self.body
    }

    pub fn extensions(&self) -> &[XmlElement] {
        &self.extensions
    }

    pub fn has_extensions(&self) -> bool {
        !self.extensions.is_empty()
    }

    /// Full `<epp><command>...</command></epp>` document.
    pub fn to_xml(&self, client_transaction_id: &str) -> Result<String> {
        let mut command = XmlElement::new("command").with_child(self.body.clone());
        if self.has_extensions() {
            command.push(XmlElement::new("extension").with_children(self.extensions.iter().cloned()));
        }
        command.push(XmlElement::text_node("clTRID", client_transaction_id));

        XmlElement::new("epp")
            .with_attr("xmlns", ns::EPP)
            .with_child(command)
            .to_document()
    }
}
