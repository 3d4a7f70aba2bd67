//! XML response decoding.
//!
//! Responses are small, so they are read into an [`XmlElement`] tree with
//! quick-xml and then picked apart by the output decoders. Namespace
//! prefixes are dropped from element names.

use crate::error::{codes, SqsError};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;

#[cfg(test)]
#[path = "xml_tests.rs"]
mod tests;

/// One element of a parsed XML document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    fn named(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Parse a document and return its root element
    pub fn parse(xml: &str) -> Result<Self, SqsError> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    stack.push(XmlElement::named(name));
                }
                Ok(Event::Empty(ref e)) => {
                    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                    let element = XmlElement::named(name);
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(current) = stack.last_mut() {
                        let text = e.unescape().map_err(|e| {
                            SqsError::serialization(format!("Failed to parse XML text: {}", e))
                        })?;
                        current.text.push_str(&text);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                    }
                }
                Ok(Event::End(_)) => {
                    let Some(mut element) = stack.pop() else {
                        return Err(SqsError::serialization("Unbalanced closing tag"));
                    };
                    // Whitespace between child elements is formatting, not content
                    if !element.children.is_empty() && element.text.trim().is_empty() {
                        element.text.clear();
                    }
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(SqsError::serialization(format!(
                        "XML parsing error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(SqsError::serialization("Unexpected end of XML document"));
        }
        root.ok_or_else(|| SqsError::serialization("Empty XML document"))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// First direct child named `name`
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children named `name`, in document order
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first direct child named `name`
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(|c| c.text.clone())
    }

    /// Text of a child that must be present
    pub fn required_text(&self, name: &str) -> Result<String, SqsError> {
        self.child_text(name).ok_or_else(|| {
            SqsError::serialization(format!("<{}> is missing from <{}>", name, self.name))
        })
    }

    /// Text of a child parsed as a number or boolean
    pub fn child_parsed<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, SqsError> {
        match self.child(name) {
            None => Ok(None),
            Some(c) => c.text.trim().parse().map(Some).map_err(|_| {
                SqsError::serialization(format!("<{}> has unexpected value '{}'", name, c.text))
            }),
        }
    }

    /// Texts of all direct children named `name`
    pub fn child_texts(&self, name: &str) -> Vec<String> {
        self.children_named(name).map(|c| c.text.clone()).collect()
    }

    /// Collect repeated `<entry><key/><Value/></entry>` children into a map
    pub fn pairs(&self, entry: &str, key: &str) -> BTreeMap<String, String> {
        self.children_named(entry)
            .filter_map(|e| Some((e.child_text(key)?, e.child_text("Value").unwrap_or_default())))
            .collect()
    }

    /// The `<{action}Result>` element of a response document
    pub fn result_of(&self, action: &str) -> Result<&XmlElement, SqsError> {
        let name = format!("{}Result", action);
        self.child(&name).ok_or_else(|| {
            SqsError::serialization(format!("<{}> is missing from <{}>", name, self.name))
        })
    }

    /// Request id from `<ResponseMetadata>` or a top-level `<RequestId>`
    pub fn request_id(&self) -> Option<String> {
        self.child("ResponseMetadata")
            .and_then(|m| m.child_text("RequestId"))
            .or_else(|| self.child_text("RequestId"))
    }
}

/// Decode a non-success response into the matching call-level error
pub(crate) fn decode_error(status: u16, body: &str) -> SqsError {
    let parsed = XmlElement::parse(body).ok();
    let error = parsed.as_ref().and_then(|root| {
        if root.name == "Error" {
            Some(root)
        } else {
            root.child("Error")
        }
    });

    let code = error
        .and_then(|e| e.child_text("Code"))
        .unwrap_or_else(|| "Unknown".to_string());
    let message = error
        .and_then(|e| e.child_text("Message"))
        .unwrap_or_else(|| "Unknown error".to_string());
    let sender_fault = match error.and_then(|e| e.child_text("Type")) {
        Some(kind) => kind == "Sender",
        None => status < 500,
    };
    let request_id = parsed.as_ref().and_then(XmlElement::request_id);

    match code.as_str() {
        codes::QUEUE_DOES_NOT_EXIST | "QueueDoesNotExist" => SqsError::QueueDoesNotExist { message },
        "InvalidClientTokenId"
        | "UnrecognizedClientException"
        | "SignatureDoesNotMatch"
        | "MissingAuthenticationToken"
        | "ExpiredToken"
        | "AccessDenied"
        | "InvalidSecurity" => SqsError::AuthenticationFailed {
            message: format!("{}: {}", code, message),
        },
        _ if status == 401 => SqsError::AuthenticationFailed {
            message: format!("{}: {}", code, message),
        },
        _ => SqsError::Service {
            code,
            message,
            status,
            sender_fault,
            request_id,
        },
    }
}
