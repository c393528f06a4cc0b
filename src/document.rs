use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fs;
use std::path::Path;

use crate::errors::ConversionError;

// @module: XML loading into a small element tree

// @const: Section names the converter needs
pub const SPEAKER_TABLE: &str = "speakertable";
pub const BASIC_BODY: &str = "basic-body";
pub const COMMON_TIMELINE: &str = "common-timeline";

// @struct: One XML element with its attributes, children and direct text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    // @field: Local name, namespace prefix removed
    pub name: String,

    // @field: Attributes in declaration order
    pub attributes: Vec<(String, String)>,

    // @field: Child elements in document order
    pub children: Vec<XmlElement>,

    // @field: Concatenated text and CDATA directly inside this element
    pub text: String,
}

impl XmlElement {
    fn from_start(start: &BytesStart, reader: &Reader<&[u8]>) -> Result<Self, ConversionError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr_res in start.attributes() {
            let attr = attr_res
                .map_err(|e| ConversionError::parse(reader.buffer_position(), e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .decode_and_unescape_value(reader.decoder())
                .map_err(|e| ConversionError::parse(reader.buffer_position(), e.to_string()))?
                .into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// Value of an attribute, if present
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First direct child with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Direct children with the given name, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First element with the given name in depth-first document order,
    /// including this element itself
    pub fn find_descendant(&self, name: &str) -> Option<&XmlElement> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_descendant(name))
    }
}

// @struct: Parsed transcript document
#[derive(Debug, Clone)]
pub struct Document {
    pub root: XmlElement,
}

impl Document {
    /// The speaker table section
    pub fn speaker_table(&self) -> Result<&XmlElement, ConversionError> {
        self.section(SPEAKER_TABLE)
    }

    /// The body section holding the tiers
    pub fn body(&self) -> Result<&XmlElement, ConversionError> {
        self.section(BASIC_BODY)
    }

    /// The timeline section
    pub fn common_timeline(&self) -> Result<&XmlElement, ConversionError> {
        self.section(COMMON_TIMELINE)
    }

    /// Check that all three required sections are present
    pub fn check_structure(&self) -> Result<(), ConversionError> {
        self.speaker_table()?;
        self.body()?;
        self.common_timeline()?;
        Ok(())
    }

    fn section(&self, name: &str) -> Result<&XmlElement, ConversionError> {
        self.root
            .find_descendant(name)
            .ok_or_else(|| ConversionError::structure(name))
    }
}

/// Read and parse a transcript file
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document, ConversionError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::InvalidData => {
            ConversionError::parse(0, format!("{:?} is not valid UTF-8", path))
        }
        _ => ConversionError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;
    parse_document(&content)
}

/// Parse XML text into a `Document`
pub fn parse_document(content: &str) -> Result<Document, ConversionError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if root.is_some() {
                    return Err(ConversionError::parse(position, "content after the root element"));
                }
                let element = XmlElement::from_start(&e, &reader)?;
                stack.push(element);
            }
            Ok(Event::Empty(e)) => {
                if root.is_some() {
                    return Err(ConversionError::parse(position, "content after the root element"));
                }
                let element = XmlElement::from_start(&e, &reader)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::End(_)) => {
                // quick-xml already rejects mismatched end names
                let element = stack
                    .pop()
                    .ok_or_else(|| ConversionError::parse(position, "unexpected closing tag"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| ConversionError::parse(position, err.to_string()))?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&text),
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(ConversionError::parse(position, "text outside the root element"));
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions, doctype
            Ok(_) => {}
            Err(e) => {
                return Err(ConversionError::parse(reader.buffer_position(), e.to_string()));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(ConversionError::parse(
            reader.buffer_position(),
            format!("unclosed element <{}>", open.name),
        ));
    }

    root.map(|root| Document { root })
        .ok_or_else(|| ConversionError::parse(reader.buffer_position(), "document has no root element"))
}
