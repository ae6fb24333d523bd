//! RTML 3.1a document model.
//!
//! Documents are assembled as an owned [`Element`] tree so that assembly stays pure and
//! inspectable; serialization to text happens once, right before transport.

use std::fmt;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::domain::AppError;

pub const RTML_NS: &str = "http://www.rtml.org/v3.1a";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const SCHEMA_LOCATION: &str =
    "http://www.rtml.org/v3.1a http://telescope.livjm.ac.uk/rtml/RTML-nightly.xsd";
pub const RTML_VERSION: &str = "3.1a";

/// Value of the `mode` attribute on the `RTML` root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// New observation group.
    Request,
    /// Cancellation of a previously accepted group.
    Abort,
    /// Service accepted the document.
    Confirm,
    /// Service refused the document.
    Reject,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Request => "request",
            Mode::Abort => "abort",
            Mode::Confirm => "confirm",
            Mode::Reject => "reject",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "request" => Some(Mode::Request),
            "abort" => Some(Mode::Abort),
            "confirm" => Some(Mode::Confirm),
            "reject" => Some(Mode::Reject),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single XML element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), attributes: Vec::new(), text: None, children: Vec::new() }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// First direct child with the given name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given name.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follow a `/`-separated chain of direct children.
    pub fn path(&self, path: &str) -> Option<&Element> {
        path.split('/').try_fold(self, |node, segment| node.find(segment))
    }

    /// Serialize as indented XML without a declaration.
    pub fn to_xml(&self) -> Result<String, AppError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        self.write_to(&mut writer)?;
        String::from_utf8(writer.into_inner()).map_err(|e| AppError::Xml(e.to_string()))
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), AppError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }

        if self.text.is_none() && self.children.is_empty() {
            return write_event(writer, Event::Empty(start));
        }

        write_event(writer, Event::Start(start))?;
        if let Some(text) = &self.text {
            write_event(writer, Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        write_event(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), AppError> {
    writer.write_event(event).map_err(|e| AppError::Xml(e.to_string()))
}

/// Root `RTML` element carrying namespaces, schema location, mode, uid and version.
pub fn root(mode: Mode, uid: &str) -> Element {
    Element::new("RTML")
        .attr("xmlns", RTML_NS)
        .attr("xmlns:xsi", XSI_NS)
        .attr("xsi:schemaLocation", SCHEMA_LOCATION)
        .attr("mode", mode.as_str())
        .attr("uid", uid)
        .attr("version", RTML_VERSION)
}
