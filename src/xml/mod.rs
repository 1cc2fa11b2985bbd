//! Owned XML trees with namespace-tolerant lookups.
//!
//! Documents are parsed into [`XmlNode`] values that mirror the classic
//! element-tree layout: each node carries the text before its first child
//! (`text`) and the text following its own end tag (`tail`). Queries walk
//! the tree in depth-first pre-order; see [`query`].

mod parser;
pub mod query;

pub use parser::{XmlError, parse_file, parse_str, strip_bom};
pub use query::{Element, descendants, find_first, local_name, tag_contains, tag_matches_word};

/// One element of a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    /// Tag name; `{uri}local` when the element is in a namespace.
    pub tag: String,
    /// Attributes in document order. Namespace declarations are excluded.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// Text between the start tag and the first child (or end tag).
    pub text: String,
    /// Text between this element's end tag and the next sibling or parent end.
    pub tail: String,
}

impl XmlNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = tail.into();
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Local tag name with any namespace decoration removed.
    pub fn local_name(&self) -> &str {
        local_name(&self.tag)
    }

    /// This node and all descendants in depth-first pre-order.
    pub fn iter(&self) -> query::Descendants<'_, XmlNode> {
        descendants(self)
    }

    /// First node in pre-order satisfying `predicate`.
    pub fn find(&self, predicate: impl FnMut(&XmlNode) -> bool) -> Option<&XmlNode> {
        find_first(self, predicate)
    }

    /// First node whose tag whole-word-matches `name`, ignoring case and namespace.
    pub fn find_tag(&self, name: &str) -> Option<&XmlNode> {
        self.find(|node| tag_matches_word(&node.tag, name))
    }

    /// Concatenate every text fragment of this subtree in document order.
    ///
    /// The node's own `tail` is not part of its subtree and is excluded.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        out.push_str(&self.text);
        for child in &self.children {
            child.collect_text(out);
            out.push_str(&child.tail);
        }
    }
}

impl Element for XmlNode {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        XmlNode::attribute(self, name)
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}
