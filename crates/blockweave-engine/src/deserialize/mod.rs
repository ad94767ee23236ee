//! # Deserialization
//!
//! Text to tree, driven by the registry's reverse indices.
//!
//! - **`html`**: markup → [`Document`] via the tag and class indices
//! - **`markdown`**: CommonMark → [`Document`] via the Markdown node index
//!
//! Both produce blocks with fresh ids, the root element's default props merged
//! with extracted properties, and normalized children. Content no plugin
//! claims becomes a block of the registry's default type.

pub mod html;
pub mod markdown;

pub use html::deserialize_html;
pub use markdown::deserialize_markdown;

use crate::plugin::PluginDescriptor;
use crate::registry::Registry;
use crate::schema::{BlockElement, Child, Document, InlineElement, MarkSet, Properties, TextLeaf};
use crate::serialize::Format;

pub fn deserialize(input: &str, registry: &Registry, format: Format) -> Document {
    match format {
        Format::Html => deserialize_html(input, registry),
        Format::Markdown => deserialize_markdown(input, registry),
    }
}

/// Accumulates the children of one block.
#[derive(Debug, Default)]
pub(crate) struct Runs {
    children: Vec<Child>,
}

impl Runs {
    pub(crate) fn push_text(&mut self, text: &str, marks: MarkSet) {
        if text.is_empty() {
            return;
        }
        if let Some(Child::Text(prev)) = self.children.last_mut()
            && prev.marks == marks
        {
            prev.text.push_str(text);
            return;
        }
        self.children.push(TextLeaf::marked(text, marks).into());
    }

    pub(crate) fn push_inline(&mut self, inline: InlineElement) {
        self.children.push(inline.into());
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.children
            .iter()
            .all(|c| matches!(c, Child::Text(leaf) if leaf.text.trim().is_empty()))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn take(&mut self) -> Vec<Child> {
        std::mem::take(&mut self.children)
    }
}

/// A block of `plugin`'s type with its default props overlaid by `props`.
pub(crate) fn make_block(
    plugin: Option<&PluginDescriptor>,
    plugin_type: &str,
    props: Properties,
    children: Vec<Child>,
) -> BlockElement {
    let mut block = BlockElement::with_children(plugin_type, children);
    if let Some(plugin) = plugin {
        block.properties = plugin.default_props();
    }
    block.properties.extend(props);
    block
}

/// Leaves of an inline element; nested inline elements flatten to their text.
pub(crate) fn inline_leaves(children: Vec<Child>) -> Vec<TextLeaf> {
    let mut leaves: Vec<TextLeaf> = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Child::Text(leaf) => leaves.push(leaf),
            Child::Inline(inner) => leaves.extend(inner.children),
        }
    }
    leaves.retain(|leaf| !leaf.text.is_empty());
    leaves
}
