//! Minimal XML element tree used for both directions of the EPP exchange.
//!
//! Outbound commands are built as trees of qualified names (`domain:name`) with explicit
//! `xmlns:*` attributes and serialized through [`quick_xml::Writer`]. Inbound responses are
//! parsed with [`quick_xml::reader::NsReader`], so every parsed element also knows its
//! resolved namespace URI and can be queried by `(namespace, local name)` regardless of
//! the prefix the server chose.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use crate::error::{EppError, Result};

/// One XML element with its attributes, child elements and concatenated text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified name as written, e.g. `domain:name`.
    pub name: String,
    /// Resolved namespace URI. Only populated for parsed documents.
    pub namespace: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Trimmed text content.
    pub text: String,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Shorthand for an element holding only text.
    pub fn text_node(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name).with_text(text)
    }

    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = XmlElement>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Local part of the qualified name.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Whether the element has the given namespace URI and local name.
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local_name() == local
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child matching `namespace` + `local`.
    pub fn child(&self, namespace: &str, local: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.is(namespace, local))
    }

    /// All direct children matching `namespace` + `local`, in document order.
    pub fn children_named<'a, 'q>(
        &'a self,
        namespace: &'q str,
        local: &'q str,
    ) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.is(namespace, local))
    }

    /// Text of the first matching child, or an empty string when absent.
    pub fn child_text(&self, namespace: &str, local: &str) -> String {
        self.child(namespace, local)
            .map(|c| c.text.clone())
            .unwrap_or_default()
    }

    /// Walks a path of `(namespace, local)` steps, taking the first match at each level.
    pub fn find(&self, path: &[(&str, &str)]) -> Option<&XmlElement> {
        path.iter()
            .try_fold(self, |node, (ns, local)| node.child(ns, local))
    }

    /// Every node reached by `path`, matching all siblings at each step (XPath-style).
    pub fn find_all<'a>(&'a self, path: &[(&str, &str)]) -> Vec<&'a XmlElement> {
        path.iter().fold(vec![self], |nodes, (ns, local)| {
            nodes
                .into_iter()
                .flat_map(|node| node.children_named(ns, local))
                .collect()
        })
    }

    /// Parses a complete document and returns its root element.
    pub fn parse(xml: &str) -> Result<XmlElement> {
        let mut reader = NsReader::from_str(xml);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let (resolved, event) = reader.read_resolved_event().map_err(parse_error)?;
            let namespace = match resolved {
                ResolveResult::Bound(Namespace(uri)) => {
                    Some(String::from_utf8_lossy(uri).into_owned())
                }
                _ => None,
            };

            match event {
                Event::Start(start) => stack.push(element_from_start(&start, namespace)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start, namespace)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| EppError::ParseError {
                        detail: "unbalanced closing tag".to_string(),
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        let value = text.unescape().map_err(parse_error)?;
                        append_text(top, &value);
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        append_text(top, &String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(EppError::ParseError {
                detail: "document ended inside an element".to_string(),
            });
        }
        root.ok_or_else(|| EppError::ParseError {
            detail: "document has no root element".to_string(),
        })
    }

    /// Serializes the element as a standalone document with an XML declaration.
    pub fn to_document(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))
            .map_err(serialization_error)?;
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(serialization_error)
    }

    fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.text.is_empty() {
            return writer
                .write_event(Event::Empty(start))
                .map_err(serialization_error);
        }

        writer
            .write_event(Event::Start(start))
            .map_err(serialization_error)?;
        if !self.text.is_empty() {
            writer
                .write_event(Event::Text(BytesText::new(&self.text)))
                .map_err(serialization_error)?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(self.name.as_str())))
            .map_err(serialization_error)
    }
}

fn element_from_start(start: &BytesStart<'_>, namespace: Option<String>) -> Result<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    element.namespace = namespace;
    for attribute in start.attributes() {
        let attribute = attribute.map_err(parse_error)?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute.unescape_value().map_err(parse_error)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(EppError::ParseError {
            detail: "multiple root elements".to_string(),
        })
    }
}

fn append_text(element: &mut XmlElement, value: &str) {
    let trimmed = value.trim();
    if !trimmed.is_empty() {
        element.text.push_str(trimmed);
    }
}

fn parse_error(e: impl std::fmt::Display) -> EppError {
    EppError::ParseError {
        detail: e.to_string(),
    }
}

fn serialization_error(e: impl std::fmt::Display) -> EppError {
    EppError::SerializationError {
        detail: e.to_string(),
    }
}
