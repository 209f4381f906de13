//! A small owned DOM built from quick-xml events.
//!
//! The model builders walk elements recursively and look attributes up by
//! name, so the streaming reader is folded into a tree once up front. Text
//! content is not used by the protocol grammar and is discarded.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::ParseError;

/// One XML element: tag name, attributes in document order, and child
/// elements in document order.
#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    /// Tag name without namespace prefix.
    pub name: String,
    /// Attribute name/value pairs.
    pub attributes: Vec<(String, String)>,
    /// Child elements.
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse a document and return its root element.
    pub fn parse_str(xml: &str) -> Result<XmlElement, ParseError> {
        let mut reader = Reader::from_str(xml);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event().map_err(|e| ParseError::Xml(e.to_string()))? {
                Event::Start(start) => {
                    stack.push(element_from_start(&start)?);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element);
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        ParseError::Xml("unexpected closing tag".to_string())
                    })?;
                    attach(&mut stack, &mut root, element);
                }
                Event::Eof => break,
                // Text, CData, comments, and processing instructions carry
                // nothing the protocol grammar uses
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(ParseError::Xml("unclosed element at end of document".to_string()));
        }

        root.ok_or(ParseError::EmptyDocument)
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }

    /// Look up an attribute, treating absence as the empty string.
    pub fn attribute_or_empty(&self, name: &str) -> &str {
        self.attribute(name).unwrap_or("")
    }

    /// Look up an attribute, mapping empty values to `None`.
    pub fn non_empty_attribute(&self, name: &str) -> Option<String> {
        self.attribute(name).filter(|value| !value.is_empty()).map(str::to_string)
    }

    /// True when the attribute contains `true`, compared case-insensitively.
    pub fn attribute_is_true(&self, name: &str) -> bool {
        self.attribute_or_empty(name).to_ascii_lowercase().contains("true")
    }

    /// True when the attribute contains `false`, compared case-insensitively.
    pub fn attribute_is_false(&self, name: &str) -> bool {
        self.attribute_or_empty(name).to_ascii_lowercase().contains("false")
    }

    /// Child elements with the given tag name.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |child| child.name == tag)
    }
}

/// Build an element shell from a start tag, decoding its attributes.
fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, ParseError> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| ParseError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| ParseError::Xml(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(XmlElement { name, attributes, children: Vec::new() })
}

/// Hand a finished element to its parent, or make it the document root.
fn attach(stack: &mut Vec<XmlElement>, root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}
