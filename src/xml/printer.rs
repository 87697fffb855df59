//! XML printer that outputs node trees.
//!
//! Mainly used for debugging and test assertions; output is compact, with
//! attributes in document order and without an XML declaration.

use std::fmt::Write;

use crate::node::{NodeRef, XmlContent};

/// Prints a node tree to a string.
pub fn print_to_string(node: &NodeRef) -> String {
    let mut out = String::new();
    print_node(node, &mut out);
    out
}

fn print_node(node: &NodeRef, out: &mut String) {
    let borrowed = node.borrow();
    match borrowed.content() {
        XmlContent::Document => {
            for child in borrowed.children() {
                print_node(child, out);
            }
        }
        XmlContent::Element(e) => {
            out.push('<');
            out.push_str(&e.qname);
            for attr in &e.attributes {
                // infallible, String's fmt::Write never errors
                let _ = write!(out, " {}=\"{}\"", attr.qname, to_entities(&attr.value));
            }
            if borrowed.child_count() == 0 {
                out.push_str("/>");
            } else {
                out.push('>');
                for child in borrowed.children() {
                    print_node(child, out);
                }
                out.push_str("</");
                out.push_str(&e.qname);
                out.push('>');
            }
        }
        XmlContent::Text(s) => out.push_str(&to_entities(s)),
        XmlContent::Cdata(s) => {
            out.push_str("<![CDATA[");
            out.push_str(s);
            out.push_str("]]>");
        }
        XmlContent::Comment(s) => {
            out.push_str("<!--");
            out.push_str(s);
            out.push_str("-->");
        }
        XmlContent::ProcessingInstruction { target, data } => {
            if data.is_empty() {
                let _ = write!(out, "<?{}?>", target);
            } else {
                let _ = write!(out, "<?{} {}?>", target, data);
            }
        }
    }
}

/// Converts special characters to XML entities.
fn to_entities(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}
