//! Utility algorithms that work on tree nodes.
//!
//! These are the leaf collaborators of the placeholder evaluator: attribute
//! extraction, nested-text merging and the whitespace-normalizing clone
//! operations. None of them mutate their input; the clone operations return
//! structurally independent copies.

use crate::node::{new_node, Attribute, NodeInner, NodeRef, QName, XmlContent};

/// Returns the document element of a parsed document, i.e. the first
/// element child of the document root.
pub fn document_element(doc: &NodeRef) -> Option<NodeRef> {
    doc.borrow()
        .children()
        .iter()
        .find(|c| c.borrow().content().is_element())
        .cloned()
}

/// Obtains an element's attributes as an ordered list of
/// (qualified name, value) pairs, in document declaration order.
///
/// Returns an empty list for non-element nodes.
pub fn attributes_of(node: &NodeRef) -> Vec<(QName, String)> {
    attributes_filtered(node, |_| true)
}

/// Obtains an element's attributes, keeping only those the filter accepts.
pub fn attributes_filtered<F>(node: &NodeRef, filter: F) -> Vec<(QName, String)>
where
    F: Fn(&Attribute) -> bool,
{
    let borrowed = node.borrow();
    match borrowed.content().as_element() {
        Some(e) => e
            .attributes
            .iter()
            .filter(|a| filter(a))
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect(),
        None => Vec::new(),
    }
}

/// Concatenates the values of all direct text and CDATA children of the
/// given node, in document order.
///
/// Returns an empty string if the node has no text-like children.
pub fn merged_text(node: &NodeRef) -> String {
    let mut merged = String::new();
    for child in node.borrow().children() {
        let child_borrowed = child.borrow();
        if let Some(s) = child_borrowed.content().text_value() {
            merged.push_str(s);
        }
    }
    merged
}

/// Creates a copy of the tree where all textual content (including
/// attribute values, comments and processing instruction data) is trimmed
/// and empty text-like children are removed.
pub fn strip_whitespace(node: &NodeRef) -> NodeRef {
    let cloned = deep_clone(node);
    handle_ws_rec(&cloned, false);
    cloned
}

/// Creates a copy of the tree where all textual content is trimmed and
/// whitespace-normalized, and empty text-like children are removed.
///
/// "Normalized" means every whitespace character becomes a space and
/// consecutive whitespace collapses to a single space.
pub fn normalize_whitespace(node: &NodeRef) -> NodeRef {
    let cloned = deep_clone(node);
    handle_ws_rec(&cloned, true);
    cloned
}

/// Creates a copy of the tree without text-like children that consist only
/// of whitespace. Other textual content is left untouched.
///
/// Applied to a text or CDATA node itself this has no effect.
pub fn strip_element_content_whitespace(node: &NodeRef) -> NodeRef {
    let cloned = deep_clone(node);
    strip_ecw(&cloned);
    cloned
}

/// Creates a structurally independent copy of a tree.
pub fn deep_clone(node: &NodeRef) -> NodeRef {
    let borrowed = node.borrow();
    let cloned = new_node(borrowed.content().clone());
    for child in borrowed.children() {
        NodeInner::add_child_to_ref(&cloned, deep_clone(child));
    }
    cloned
}

/// Collapses whitespace runs to single spaces.
fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_ws = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !last_was_ws {
                out.push(' ');
            }
            last_was_ws = true;
        } else {
            out.push(c);
            last_was_ws = false;
        }
    }
    out
}

fn clean(s: &str, do_normalize: bool) -> String {
    let trimmed = s.trim();
    if do_normalize {
        normalize(trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Trims (and optionally normalizes) textual content of the node and its
/// attributes, removes empty text-like children, recurses.
fn handle_ws_rec(node: &NodeRef, do_normalize: bool) {
    {
        let mut borrowed = node.borrow_mut();
        match borrowed.content_mut() {
            XmlContent::Text(s) | XmlContent::Cdata(s) | XmlContent::Comment(s) => {
                *s = clean(s, do_normalize);
            }
            XmlContent::ProcessingInstruction { data, .. } => {
                *data = clean(data, do_normalize);
            }
            XmlContent::Element(e) => {
                for attr in &mut e.attributes {
                    attr.value = clean(&attr.value, do_normalize);
                }
            }
            XmlContent::Document => {}
        }
    }

    let children: Vec<NodeRef> = node.borrow().children().to_vec();
    let mut remove: Vec<usize> = Vec::new();
    for (i, child) in children.iter().enumerate() {
        handle_ws_rec(child, do_normalize);
        let child_borrowed = child.borrow();
        if child_borrowed.is_text_like()
            && child_borrowed.content().text_value().is_some_and(str::is_empty)
        {
            remove.push(i);
        }
    }
    for i in remove.into_iter().rev() {
        NodeInner::remove_child_to_ref(node, i);
    }
}

/// Removes whitespace-only text-like children, recurses.
fn strip_ecw(node: &NodeRef) {
    let children: Vec<NodeRef> = node.borrow().children().to_vec();
    let mut remove: Vec<usize> = Vec::new();
    for (i, child) in children.iter().enumerate() {
        strip_ecw(child);
        let child_borrowed = child.borrow();
        if child_borrowed.is_text_like()
            && child_borrowed
                .content()
                .text_value()
                .is_some_and(|s| s.trim().is_empty())
        {
            remove.push(i);
        }
    }
    for i in remove.into_iter().rev() {
        NodeInner::remove_child_to_ref(node, i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_str;

    #[test]
    fn test_document_element() {
        let doc = parse_str("<!-- leading --><root/>").unwrap();
        let elem = document_element(&doc).unwrap();
        let borrowed = elem.borrow();
        assert_eq!(borrowed.content().as_element().unwrap().qname, "root");
    }

    #[test]
    fn test_attributes_of_preserves_document_order() {
        let doc = parse_str(r#"<e b="2" a="1" c="3"/>"#).unwrap();
        let elem = document_element(&doc).unwrap();
        let attrs = attributes_of(&elem);
        let names: Vec<&str> = attrs.iter().map(|(q, _)| q.local_name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(attrs[0].1, "2");
    }

    #[test]
    fn test_attributes_of_non_element() {
        let doc = parse_str("<e>text</e>").unwrap();
        let elem = document_element(&doc).unwrap();
        let text = elem.borrow().child(0).cloned().unwrap();
        assert!(attributes_of(&text).is_empty());
    }

    #[test]
    fn test_attributes_filtered() {
        let doc = parse_str(r#"<e a="1" b="2"/>"#).unwrap();
        let elem = document_element(&doc).unwrap();
        let attrs = attributes_filtered(&elem, |a| a.name.local_name != "b");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].0.local_name, "a");
    }

    #[test]
    fn test_merged_text() {
        let doc = parse_str("<e>ab<i>ignored</i>cd<![CDATA[ef]]></e>").unwrap();
        let elem = document_element(&doc).unwrap();
        assert_eq!(merged_text(&elem), "abcdef");
    }

    #[test]
    fn test_merged_text_empty() {
        let doc = parse_str("<e><i>nested only</i></e>").unwrap();
        let elem = document_element(&doc).unwrap();
        assert_eq!(merged_text(&elem), "");
    }

    #[test]
    fn test_strip_whitespace() {
        let doc = parse_str("<e a=\" x \">  hello\n  <i>  </i></e>").unwrap();
        let stripped = strip_whitespace(&doc);
        let elem = document_element(&stripped).unwrap();

        // attribute value trimmed
        let attrs = attributes_of(&elem);
        assert_eq!(attrs[0].1, "x");

        // text trimmed, but inner whitespace preserved
        assert_eq!(merged_text(&elem), "hello");

        // whitespace-only text inside <i> removed
        let inner = elem.borrow().child(1).cloned().unwrap();
        assert_eq!(inner.borrow().child_count(), 0);

        // original untouched
        let orig_elem = document_element(&doc).unwrap();
        assert_eq!(attributes_of(&orig_elem)[0].1, " x ");
    }

    #[test]
    fn test_normalize_whitespace() {
        let doc = parse_str("<e>  hello \t\n world  </e>").unwrap();
        let normalized = normalize_whitespace(&doc);
        let elem = document_element(&normalized).unwrap();
        assert_eq!(merged_text(&elem), "hello world");
    }

    #[test]
    fn test_strip_element_content_whitespace() {
        let doc = parse_str("<e>\n  <i> inner </i>\n</e>").unwrap();
        let stripped = strip_element_content_whitespace(&doc);
        let elem = document_element(&stripped).unwrap();

        // whitespace-only children removed
        assert_eq!(elem.borrow().child_count(), 1);

        // non-whitespace text left untouched
        let inner = elem.borrow().child(0).cloned().unwrap();
        assert_eq!(merged_text(&inner), " inner ");
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let doc = parse_str("<e><i>text</i></e>").unwrap();
        let clone = deep_clone(&doc);
        let elem = document_element(&clone).unwrap();
        NodeInner::remove_child_to_ref(&elem, 0);

        let orig_elem = document_element(&doc).unwrap();
        assert_eq!(orig_elem.borrow().child_count(), 1);
    }
}
