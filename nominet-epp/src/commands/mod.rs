//! Builders for every command the client sends.
//!
//! Each builder returns an [`EppCommand`](crate::EppCommand) whose body is the EPP verb
//! element (`<create>`, `<info>`, ...) wrapping the object-specific element with its
//! namespace declared inline.

pub mod contact;
pub mod dnssec;
pub mod domain;
pub mod host;
pub mod nominet;
pub mod poll;
pub mod release;
pub mod session;

use crate::xml::XmlElement;

/// `<verb><prefix:verb xmlns:prefix="uri">children</prefix:verb></verb>`.
pub(crate) fn object_command(
    verb: &str,
    prefix: &str,
    uri: &str,
    children: impl IntoIterator<Item = XmlElement>,
) -> XmlElement {
    XmlElement::new(verb).with_child(
        XmlElement::new(format!("{prefix}:{verb}"))
            .with_attr(format!("xmlns:{prefix}"), uri)
            .with_children(children),
    )
}

/// Text element only when `value` is non-blank.
pub(crate) fn optional_text(name: &str, value: Option<&str>) -> Option<XmlElement> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| XmlElement::text_node(name, v))
}
