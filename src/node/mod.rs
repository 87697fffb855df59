//! Node structures for XML tree representation.
//!
//! Documents are represented as trees of reference-counted nodes. Each node
//! carries an [`XmlContent`] describing what it is (document root, element,
//! text, CDATA section, comment or processing instruction) together with its
//! children and a weak link back to its parent.

pub mod namespace;

pub use namespace::{is_xmlns_attr, split_qname, NamespaceContext, QName};

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A reference-counted pointer to a node.
pub type NodeRef = Rc<RefCell<NodeInner>>;

/// Creates a new node reference with the given content.
pub fn new_node(content: XmlContent) -> NodeRef {
    Rc::new(RefCell::new(NodeInner::new(content)))
}

/// An attribute of an element, in document declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// The attribute name as written in the document (including prefix).
    pub qname: String,
    /// The expanded attribute name.
    pub name: QName,
    /// The attribute value.
    pub value: String,
}

/// An XML element: its name and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// The element name as written in the document (including prefix).
    pub qname: String,
    /// The expanded element name.
    pub name: QName,
    /// Attributes in document declaration order, namespace declarations
    /// excluded.
    pub attributes: Vec<Attribute>,
}

impl XmlElement {
    /// Creates an element with no namespace and no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        let qname = name.into();
        XmlElement {
            name: QName::no_namespace(qname.clone()),
            qname,
            attributes: Vec::new(),
        }
    }

    /// Looks up an attribute value by expanded name.
    pub fn attribute(&self, name: &QName) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| &a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// The content of a node in the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlContent {
    /// The synthetic document root.
    Document,
    /// An element with a qualified name and attributes.
    Element(XmlElement),
    /// A text node.
    Text(String),
    /// A CDATA section.
    Cdata(String),
    /// A comment (without the `<!--` and `-->` markers).
    Comment(String),
    /// A processing instruction.
    ProcessingInstruction {
        /// The PI target (e.g. "xml-stylesheet").
        target: String,
        /// Everything after the target.
        data: String,
    },
}

impl XmlContent {
    /// Returns true for text and CDATA nodes.
    pub fn is_text_like(&self) -> bool {
        matches!(self, XmlContent::Text(_) | XmlContent::Cdata(_))
    }

    /// Returns true for element nodes.
    pub fn is_element(&self) -> bool {
        matches!(self, XmlContent::Element(_))
    }

    /// Returns the character value of a text or CDATA node.
    pub fn text_value(&self) -> Option<&str> {
        match self {
            XmlContent::Text(s) | XmlContent::Cdata(s) => Some(s),
            _ => None,
        }
    }

    /// Returns a reference to the element, if this is an element node.
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlContent::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns a mutable reference to the element, if this is an element node.
    pub fn as_element_mut(&mut self) -> Option<&mut XmlElement> {
        match self {
            XmlContent::Element(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for XmlContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlContent::Document => write!(f, "#document"),
            XmlContent::Element(e) => write!(f, "<{}>", e.qname),
            XmlContent::Text(s) => write!(f, "{}", s),
            XmlContent::Cdata(s) => write!(f, "<![CDATA[{}]]>", s),
            XmlContent::Comment(s) => write!(f, "<!--{}-->", s),
            XmlContent::ProcessingInstruction { target, data } => {
                write!(f, "<?{} {}?>", target, data)
            }
        }
    }
}

/// The inner data of a node in the tree.
///
/// Each node has:
/// - Content (document root, element, text, CDATA, comment or PI)
/// - 0 or more children
/// - A parent (except for the document root)
/// - A position among siblings
#[derive(Debug)]
pub struct NodeInner {
    /// Content of this node.
    content: XmlContent,
    /// Child nodes.
    children: Vec<NodeRef>,
    /// Weak reference to parent node.
    parent: Weak<RefCell<NodeInner>>,
    /// Zero-based position among siblings (-1 for the root).
    child_pos: i32,
}

impl NodeInner {
    /// Creates a new node with the given content.
    pub fn new(content: XmlContent) -> Self {
        NodeInner {
            content,
            children: Vec::new(),
            parent: Weak::new(),
            child_pos: -1,
        }
    }

    /// Returns the content of this node.
    pub fn content(&self) -> &XmlContent {
        &self.content
    }

    /// Returns a mutable reference to the content.
    pub fn content_mut(&mut self) -> &mut XmlContent {
        &mut self.content
    }

    /// Sets the content of this node.
    pub fn set_content(&mut self, content: XmlContent) {
        self.content = content;
    }

    /// Returns the number of children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Returns a reference to the child at the given index.
    pub fn child(&self, index: usize) -> Option<&NodeRef> {
        self.children.get(index)
    }

    /// Returns the children as a slice.
    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    /// Returns a weak reference to the parent.
    pub fn parent(&self) -> &Weak<RefCell<NodeInner>> {
        &self.parent
    }

    /// Returns the child position (0-based index among siblings, -1 for root).
    pub fn child_pos(&self) -> i32 {
        self.child_pos
    }

    /// Returns true for text and CDATA nodes.
    pub fn is_text_like(&self) -> bool {
        self.content.is_text_like()
    }
}

/// Helper functions that work with NodeRef.
impl NodeInner {
    /// Adds a child node. Must be called on the NodeRef wrapper.
    pub fn add_child_to_ref(parent_ref: &NodeRef, child_ref: NodeRef) {
        {
            let mut child = child_ref.borrow_mut();
            child.parent = Rc::downgrade(parent_ref);
            child.child_pos = parent_ref.borrow().children.len() as i32;
        }
        parent_ref.borrow_mut().children.push(child_ref);
    }

    /// Removes the child at the given index.
    pub fn remove_child_to_ref(parent_ref: &NodeRef, index: usize) {
        let mut parent = parent_ref.borrow_mut();
        if index < parent.children.len() {
            parent.children.remove(index);
            // Update child positions for siblings after the removal point
            for i in index..parent.children.len() {
                parent.children[i].borrow_mut().child_pos = i as i32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let elem = new_node(XmlContent::Element(XmlElement::new("root")));
        assert!(elem.borrow().content().is_element());
        assert!(!elem.borrow().is_text_like());

        let text = new_node(XmlContent::Text("hello".to_string()));
        assert!(text.borrow().is_text_like());
        assert_eq!(text.borrow().content().text_value(), Some("hello"));

        let cdata = new_node(XmlContent::Cdata("hello".to_string()));
        assert!(cdata.borrow().is_text_like());
        assert_eq!(cdata.borrow().content().text_value(), Some("hello"));
    }

    #[test]
    fn test_add_child() {
        let parent = new_node(XmlContent::Element(XmlElement::new("parent")));
        let child1 = new_node(XmlContent::Text("one".to_string()));
        let child2 = new_node(XmlContent::Text("two".to_string()));

        NodeInner::add_child_to_ref(&parent, child1.clone());
        NodeInner::add_child_to_ref(&parent, child2.clone());

        assert_eq!(parent.borrow().child_count(), 2);
        assert_eq!(child1.borrow().child_pos(), 0);
        assert_eq!(child2.borrow().child_pos(), 1);
        assert!(child1.borrow().parent().upgrade().is_some());
    }

    #[test]
    fn test_remove_child() {
        let parent = new_node(XmlContent::Element(XmlElement::new("parent")));
        let child1 = new_node(XmlContent::Text("one".to_string()));
        let child2 = new_node(XmlContent::Text("two".to_string()));
        let child3 = new_node(XmlContent::Text("three".to_string()));

        NodeInner::add_child_to_ref(&parent, child1.clone());
        NodeInner::add_child_to_ref(&parent, child2);
        NodeInner::add_child_to_ref(&parent, child3.clone());

        NodeInner::remove_child_to_ref(&parent, 1);

        assert_eq!(parent.borrow().child_count(), 2);
        assert_eq!(child1.borrow().child_pos(), 0);
        assert_eq!(child3.borrow().child_pos(), 1);
    }

    #[test]
    fn test_attribute_lookup() {
        let mut elem = XmlElement::new("e");
        elem.attributes.push(Attribute {
            qname: "a".to_string(),
            name: QName::no_namespace("a"),
            value: "1".to_string(),
        });
        elem.attributes.push(Attribute {
            qname: "xsi:type".to_string(),
            name: QName::new("urn:xsi", "type"),
            value: "t".to_string(),
        });

        assert_eq!(elem.attribute(&QName::no_namespace("a")), Some("1"));
        assert_eq!(elem.attribute(&QName::new("urn:xsi", "type")), Some("t"));
        assert_eq!(elem.attribute(&QName::no_namespace("type")), None);
    }
}
