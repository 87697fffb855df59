//! XML parser that builds node trees.
//!
//! The parser uses quick-xml's streaming API. Text and CDATA children are
//! kept as distinct node kinds and character content is preserved verbatim;
//! whitespace handling is left to the clone operations in [`crate::util`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::node::{
    is_xmlns_attr, new_node, split_qname, Attribute, NamespaceContext, NodeInner, NodeRef, QName,
    XmlContent, XmlElement,
};

/// XML parser that builds node trees.
pub struct XmlParser {
    ns: NamespaceContext,
}

impl Default for XmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlParser {
    /// Creates a new parser.
    pub fn new() -> Self {
        XmlParser {
            ns: NamespaceContext::new(),
        }
    }

    /// Parses XML from a string.
    pub fn parse_str(&mut self, xml: &str) -> Result<NodeRef> {
        let mut reader = Reader::from_reader(xml.as_bytes());
        self.parse_reader(&mut reader)
    }

    /// Parses XML from a file.
    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> Result<NodeRef> {
        let file = File::open(path)?;
        let buf_reader = BufReader::new(file);
        let mut reader = Reader::from_reader(buf_reader);
        self.parse_reader(&mut reader)
    }

    /// Parses XML from a quick-xml Reader.
    fn parse_reader<R: BufRead>(&mut self, reader: &mut Reader<R>) -> Result<NodeRef> {
        let root = new_node(XmlContent::Document);

        let mut node_stack: Vec<NodeRef> = vec![root.clone()];
        let mut current_text: Option<String> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    Self::flush_text(&node_stack, &mut current_text);

                    self.ns.push_scope();
                    let element = self.parse_element(e, reader)?;
                    let node = new_node(XmlContent::Element(element));

                    if let Some(parent) = node_stack.last() {
                        NodeInner::add_child_to_ref(parent, node.clone());
                    }
                    node_stack.push(node);
                }
                Ok(Event::End(_)) => {
                    Self::flush_text(&node_stack, &mut current_text);
                    node_stack.pop();
                    self.ns.pop_scope();
                }
                Ok(Event::Empty(ref e)) => {
                    // Self-closing tag - handle like Start + End
                    Self::flush_text(&node_stack, &mut current_text);

                    self.ns.push_scope();
                    let element = self.parse_element(e, reader)?;
                    self.ns.pop_scope();

                    let node = new_node(XmlContent::Element(element));
                    if let Some(parent) = node_stack.last() {
                        NodeInner::add_child_to_ref(parent, node);
                    }
                }
                Ok(Event::Text(e)) => {
                    let raw =
                        std::str::from_utf8(e.as_ref()).map_err(|e| Error::Parse(e.to_string()))?;
                    let text = unescape(raw).map_err(|e| Error::Parse(e.to_string()))?;
                    match current_text {
                        Some(ref mut existing) => existing.push_str(&text),
                        None => current_text = Some(text.into_owned()),
                    }
                }
                Ok(Event::CData(ref e)) => {
                    // CDATA stays a distinct node kind
                    Self::flush_text(&node_stack, &mut current_text);

                    let text = String::from_utf8_lossy(e.as_ref()).to_string();
                    let node = new_node(XmlContent::Cdata(text));
                    if let Some(parent) = node_stack.last() {
                        NodeInner::add_child_to_ref(parent, node);
                    }
                }
                Ok(Event::Comment(ref e)) => {
                    Self::flush_text(&node_stack, &mut current_text);

                    let comment_text = String::from_utf8_lossy(e.as_ref()).to_string();
                    let node = new_node(XmlContent::Comment(comment_text));
                    if let Some(parent) = node_stack.last() {
                        NodeInner::add_child_to_ref(parent, node);
                    }
                }
                Ok(Event::PI(ref e)) => {
                    Self::flush_text(&node_stack, &mut current_text);

                    let target = String::from_utf8_lossy(e.target()).to_string();
                    let data = String::from_utf8_lossy(e.content()).trim().to_string();
                    let node = new_node(XmlContent::ProcessingInstruction { target, data });
                    if let Some(parent) = node_stack.last() {
                        NodeInner::add_child_to_ref(parent, node);
                    }
                }
                Ok(Event::Eof) => break,
                Ok(Event::Decl(_)) | Ok(Event::DocType(_)) => {
                    // Ignore XML declaration and DOCTYPE
                }
                Ok(Event::GeneralRef(ref e)) => {
                    // Text events no longer carry entity references, they
                    // arrive as separate events
                    let name = reader
                        .decoder()
                        .decode(e)
                        .map_err(|e| Error::Parse(e.to_string()))?;
                    let resolved = resolve_reference(&name);
                    match current_text {
                        Some(ref mut existing) => existing.push_str(&resolved),
                        None => current_text = Some(resolved),
                    }
                }
                Err(e) => return Err(Error::Parse(format!("XML parse error: {}", e))),
            }
            buf.clear();
        }

        Ok(root)
    }

    /// Flushes accumulated character data as a text node.
    fn flush_text(node_stack: &[NodeRef], current_text: &mut Option<String>) {
        if let Some(text) = current_text.take() {
            if let Some(parent) = node_stack.last() {
                NodeInner::add_child_to_ref(parent, new_node(XmlContent::Text(text)));
            }
        }
    }

    /// Parses an element's name and attributes, resolving namespaces.
    ///
    /// Expects the caller to have pushed a namespace scope; xmlns
    /// declarations are bound into it and excluded from the attribute list.
    fn parse_element<R: BufRead>(
        &mut self,
        e: &BytesStart,
        reader: &Reader<R>,
    ) -> Result<XmlElement> {
        let qname = reader
            .decoder()
            .decode(e.name().as_ref())
            .map_err(|e| Error::Parse(e.to_string()))?
            .to_string();

        // First pass: collect raw attributes and bind namespace declarations
        let mut raw_attrs: Vec<(String, String)> = Vec::new();
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|e| Error::Parse(format!("Attribute error: {}", e)))?;
            let key = reader
                .decoder()
                .decode(attr.key.as_ref())
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Parse(e.to_string()))?
                .to_string();

            if is_xmlns_attr(&key) {
                let prefix = key.strip_prefix("xmlns:").unwrap_or("");
                self.ns.bind(prefix, &value);
            } else {
                raw_attrs.push((key, value));
            }
        }

        // Second pass: resolve names now that this element's bindings exist
        let name = self.resolve_element_name(&qname);
        let attributes = raw_attrs
            .into_iter()
            .map(|(key, value)| Attribute {
                name: self.resolve_attribute_name(&key),
                qname: key,
                value,
            })
            .collect();

        Ok(XmlElement {
            qname,
            name,
            attributes,
        })
    }

    /// Resolves an element name; unprefixed names take the default namespace.
    fn resolve_element_name(&self, qname: &str) -> QName {
        let (prefix, local) = split_qname(qname);
        let uri = match prefix {
            Some(p) => self.ns.resolve(p),
            None => self.ns.default_namespace(),
        };
        match uri {
            Some(uri) => QName::new(uri, local),
            None => QName::no_namespace(local),
        }
    }

    /// Resolves an attribute name; unprefixed attributes have no namespace.
    fn resolve_attribute_name(&self, qname: &str) -> QName {
        let (prefix, local) = split_qname(qname);
        match prefix.and_then(|p| self.ns.resolve(p)) {
            Some(uri) => QName::new(uri, local),
            None => QName::no_namespace(local),
        }
    }
}

/// Resolves a general reference name (the part between `&` and `;`) to its
/// character value: numeric character references and the five predefined
/// entities. Unknown entity names are kept in their raw form.
fn resolve_reference(name: &str) -> String {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => code.parse::<u32>(),
        };
        if let Some(c) = parsed.ok().and_then(char::from_u32) {
            return c.to_string();
        }
    }
    match name {
        "amp" => "&".to_string(),
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "apos" => "'".to_string(),
        "quot" => "\"".to_string(),
        other => format!("&{};", other),
    }
}

/// Parses XML from a file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<NodeRef> {
    XmlParser::new().parse_file(path)
}

/// Parses XML from a string.
pub fn parse_str(xml: &str) -> Result<NodeRef> {
    XmlParser::new().parse_str(xml)
}
