//! # Node Schema
//!
//! The document tree the rest of the engine reads and writes.
//!
//! ```text
//! Document
//! └── BlockElement { id, plugin_type, properties }
//!     ├── TextLeaf { text, marks }
//!     └── InlineElement { plugin_type, properties }
//!         └── TextLeaf { text, marks }
//! ```
//!
//! ## Invariants
//!
//! - Block order is document order, display order and serialization order.
//! - A `BlockId` is generated once and never reused.
//! - A leaf with empty text only appears as the placeholder of an otherwise
//!   empty block (see [`BlockElement::normalize_children`]).

pub mod marks;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use marks::{Mark, MarkDescriptor, MarkSet};

/// Free-form element properties (`url`, `checked`, `level`, ...).
pub type Properties = BTreeMap<String, serde_json::Value>;

/// Stable identifier of a block element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The smallest text-bearing node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLeaf {
    pub text: String,
    #[serde(default, skip_serializing_if = "MarkSet::is_empty")]
    pub marks: MarkSet,
}

impl TextLeaf {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: MarkSet::empty(),
        }
    }

    pub fn marked(text: impl Into<String>, marks: MarkSet) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }
}

/// An inline element such as a link, owning its own text leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineElement {
    #[serde(rename = "type")]
    pub plugin_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: Properties,
    pub children: Vec<TextLeaf>,
}

impl InlineElement {
    pub fn new(plugin_type: impl Into<String>, children: Vec<TextLeaf>) -> Self {
        Self {
            plugin_type: plugin_type.into(),
            properties: Properties::new(),
            children,
        }
    }

    /// Concatenated text of all leaves.
    pub fn text(&self) -> String {
        self.children.iter().map(|l| l.text.as_str()).collect()
    }
}

/// A child of a block element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Child {
    Inline(InlineElement),
    Text(TextLeaf),
}

impl Child {
    pub fn text(&self) -> String {
        match self {
            Child::Text(leaf) => leaf.text.clone(),
            Child::Inline(inline) => inline.text(),
        }
    }
}

impl From<TextLeaf> for Child {
    fn from(leaf: TextLeaf) -> Self {
        Child::Text(leaf)
    }
}

impl From<InlineElement> for Child {
    fn from(inline: InlineElement) -> Self {
        Child::Inline(inline)
    }
}

/// A top-level structural unit of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockElement {
    pub id: BlockId,
    #[serde(rename = "type")]
    pub plugin_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: Properties,
    pub children: Vec<Child>,
}

impl BlockElement {
    /// Create a block with a fresh id and a single placeholder leaf.
    pub fn new(plugin_type: impl Into<String>) -> Self {
        Self {
            id: BlockId::new(),
            plugin_type: plugin_type.into(),
            properties: Properties::new(),
            children: vec![Child::Text(TextLeaf::default())],
        }
    }

    /// Create a block with a single plain text leaf.
    pub fn with_text(plugin_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_children(plugin_type, vec![TextLeaf::plain(text).into()])
    }

    pub fn with_children(plugin_type: impl Into<String>, children: Vec<Child>) -> Self {
        let mut block = Self {
            id: BlockId::new(),
            plugin_type: plugin_type.into(),
            properties: Properties::new(),
            children,
        };
        block.normalize_children();
        block
    }

    pub fn with_property(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Concatenated text of every leaf, ignoring marks.
    pub fn text(&self) -> String {
        self.children.iter().map(Child::text).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.children.iter().all(|c| c.text().is_empty())
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }

    /// Drop empty leaves, merge neighbouring leaves with equal marks and keep
    /// exactly one empty leaf when nothing else remains.
    pub fn normalize_children(&mut self) {
        let children = std::mem::take(&mut self.children);
        let mut out: Vec<Child> = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Child::Text(leaf) if leaf.text.is_empty() => {}
                Child::Text(leaf) => {
                    if let Some(Child::Text(prev)) = out.last_mut()
                        && prev.marks == leaf.marks
                    {
                        prev.text.push_str(&leaf.text);
                        continue;
                    }
                    out.push(Child::Text(leaf));
                }
                Child::Inline(inline) => out.push(Child::Inline(inline)),
            }
        }
        if out.is_empty() {
            out.push(Child::Text(TextLeaf::default()));
        }
        self.children = out;
    }
}

/// A borrowed view of either kind of element, handed to serialize hooks.
#[derive(Debug, Clone, Copy)]
pub enum ElementRef<'a> {
    Block(&'a BlockElement),
    Inline(&'a InlineElement),
}

impl<'a> ElementRef<'a> {
    pub fn plugin_type(&self) -> &'a str {
        match self {
            ElementRef::Block(b) => &b.plugin_type,
            ElementRef::Inline(i) => &i.plugin_type,
        }
    }

    pub fn properties(&self) -> &'a Properties {
        match self {
            ElementRef::Block(b) => &b.properties,
            ElementRef::Inline(i) => &i.properties,
        }
    }

    pub fn id(&self) -> Option<&'a BlockId> {
        match self {
            ElementRef::Block(b) => Some(&b.id),
            ElementRef::Inline(_) => None,
        }
    }

    /// Plain text of the element, ignoring marks.
    pub fn text(&self) -> String {
        match self {
            ElementRef::Block(b) => b.text(),
            ElementRef::Inline(i) => i.text(),
        }
    }

    pub fn property_str(&self, key: &str) -> Option<&'a str> {
        self.properties().get(key).and_then(|v| v.as_str())
    }

    pub fn property_bool(&self, key: &str) -> bool {
        self.properties()
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn property_u64(&self, key: &str) -> Option<u64> {
        self.properties().get(key).and_then(|v| v.as_u64())
    }
}

/// Ordered sequence of block elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub blocks: Vec<BlockElement>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_blocks(blocks: Vec<BlockElement>) -> Self {
        Self { blocks }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block(&self, id: &BlockId) -> Option<&BlockElement> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    pub fn block_mut(&mut self, id: &BlockId) -> Option<&mut BlockElement> {
        self.blocks.iter_mut().find(|b| &b.id == id)
    }

    pub fn position(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| &b.id == id)
    }

    /// Concatenation of every leaf's text in document order.
    pub fn plain_text(&self) -> String {
        self.blocks.iter().map(BlockElement::text).collect()
    }

    /// Load a document from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn block_ids_are_unique() {
        let a = BlockElement::new("Paragraph");
        let b = BlockElement::new("Paragraph");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn new_block_has_placeholder_leaf() {
        let block = BlockElement::new("Paragraph");
        assert_eq!(block.children, vec![Child::Text(TextLeaf::default())]);
        assert!(block.is_empty());
    }

    #[test]
    fn normalize_merges_equal_marks_and_drops_empty_leaves() {
        let bold = MarkSet::from_iter([Mark::Bold]);
        let block = BlockElement::with_children(
            "Paragraph",
            vec![
                TextLeaf::marked("a", bold).into(),
                TextLeaf::plain("").into(),
                TextLeaf::marked("b", bold).into(),
                TextLeaf::plain("c").into(),
            ],
        );
        assert_eq!(
            block.children,
            vec![
                Child::Text(TextLeaf::marked("ab", bold)),
                Child::Text(TextLeaf::plain("c")),
            ]
        );
    }

    #[test]
    fn inline_children_split_leaf_runs() {
        let block = BlockElement::with_children(
            "Paragraph",
            vec![
                TextLeaf::plain("see ").into(),
                InlineElement::new("Link", vec![TextLeaf::plain("here")]).into(),
                TextLeaf::plain(" now").into(),
            ],
        );
        assert_eq!(block.children.len(), 3);
        assert_eq!(block.text(), "see here now");
    }

    #[test]
    fn json_shape_uses_type_key() {
        let mut block = BlockElement::with_text("HeadingTwo", "Title");
        block.id = BlockId::from("b1");
        let json = serde_json::to_value(Document::from_blocks(vec![block])).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"id": "b1", "type": "HeadingTwo", "children": [{"text": "Title"}]}
            ])
        );
    }

    #[test]
    fn json_roundtrip_keeps_marks_and_inlines() {
        let doc = Document::from_blocks(vec![BlockElement::with_children(
            "Paragraph",
            vec![
                TextLeaf::marked("hi", MarkSet::from_iter([Mark::Italic, Mark::Code])).into(),
                InlineElement::new("Link", vec![TextLeaf::plain("x")]).into(),
            ],
        )]);
        let json = doc.to_json().unwrap();
        assert_eq!(Document::from_json(&json).unwrap(), doc);
    }
}
