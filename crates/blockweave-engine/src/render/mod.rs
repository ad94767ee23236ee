//! # Read API
//!
//! Rendering produces an immutable [`Snapshot`]: one [`RenderBlock`] per
//! document block, each holding a neutral [`RenderNode`] tree built by the
//! block's plugin. Frontends paint render nodes; they never touch the
//! document directly.
//!
//! Text leaves are wrapped by the registry's mark descriptors in wrapper
//! order (bold outermost, code innermost). A block whose type is not
//! registered renders as a `div.blockweave-unknown` holding its text and is
//! flagged with [`RenderBlock::fallback`]; its siblings are unaffected.

use crate::html::tree::is_void_element;
use crate::plugin::PluginOptions;
use crate::registry::Registry;
use crate::schema::{BlockElement, BlockId, Child, Document, ElementRef, InlineElement, TextLeaf};

/// Class of the node rendered for blocks of an unregistered type.
pub const UNKNOWN_CLASS: &str = "blockweave-unknown";

/// A neutral virtual element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNode {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<RenderNode>,
    },
    Text(String),
}

impl RenderNode {
    pub fn element(tag: &str, children: Vec<RenderNode>) -> Self {
        RenderNode::Element {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        RenderNode::Text(text.into())
    }

    /// Add an attribute; a no-op on text nodes.
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        if let RenderNode::Element { attrs, .. } = &mut self {
            attrs.push((name.to_string(), value.into()));
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            RenderNode::Element { tag, .. } => Some(tag),
            RenderNode::Text(_) => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            RenderNode::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            RenderNode::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[RenderNode] {
        match self {
            RenderNode::Element { children, .. } => children,
            RenderNode::Text(_) => &[],
        }
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            RenderNode::Text(t) => out.push_str(t),
            RenderNode::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Markup view of the node, for debugging and tests.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            RenderNode::Text(t) => out.push_str(&html_escape::encode_text(t)),
            RenderNode::Element {
                tag,
                attrs,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&html_escape::encode_double_quoted_attribute(value));
                    out.push('"');
                }
                out.push('>');
                if is_void_element(tag) {
                    return;
                }
                for child in children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

/// Everything a render hook gets to see.
pub struct RenderProps<'a> {
    pub element: ElementRef<'a>,
    /// Element kind being rendered (the plugin's root kind for blocks).
    pub element_kind: &'a str,
    /// Already rendered children.
    pub children: Vec<RenderNode>,
    pub options: &'a PluginOptions,
}

/// Immutable rendered view of a document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// Editor version the snapshot was taken at; 0 for standalone renders.
    pub version: u64,
    pub blocks: Vec<RenderBlock>,
}

impl Snapshot {
    pub fn to_html(&self) -> String {
        self.blocks.iter().map(|b| b.node.to_html()).collect()
    }

    pub fn fallback_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.fallback).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderBlock {
    pub id: BlockId,
    pub plugin_type: String,
    pub node: RenderNode,
    /// Rendered by the unknown-type fallback.
    pub fallback: bool,
    /// Set on the sole empty block of an otherwise empty document.
    pub placeholder: Option<String>,
}

/// Render every block of `doc` through its plugin.
pub fn render(doc: &Document, registry: &Registry) -> Snapshot {
    render_with_placeholder(doc, registry, None)
}

pub fn render_with_placeholder(
    doc: &Document,
    registry: &Registry,
    placeholder: Option<&str>,
) -> Snapshot {
    let show_placeholder = doc.len() == 1 && doc.blocks[0].is_empty();
    let blocks = doc
        .blocks
        .iter()
        .map(|block| {
            let mut rendered = render_block(block, registry);
            if show_placeholder {
                rendered.placeholder = placeholder.map(str::to_string);
            }
            rendered
        })
        .collect();
    Snapshot { version: 0, blocks }
}

pub fn render_block(block: &BlockElement, registry: &Registry) -> RenderBlock {
    let children: Vec<RenderNode> = block
        .children
        .iter()
        .map(|child| match child {
            Child::Text(leaf) => render_leaf(leaf, registry),
            Child::Inline(inline) => render_inline(inline, registry),
        })
        .collect();

    let root = registry
        .plugin(&block.plugin_type)
        .and_then(|plugin| plugin.root_element().map(|root| (plugin, root)));

    let Some((plugin, (kind, spec))) = root else {
        log::warn!(
            "Block {} has unknown type {}; rendering fallback",
            block.id,
            block.plugin_type
        );
        return RenderBlock {
            id: block.id.clone(),
            plugin_type: block.plugin_type.clone(),
            node: RenderNode::element("div", children).with_attr("class", UNKNOWN_CLASS),
            fallback: true,
            placeholder: None,
        };
    };

    let node = (spec.render)(RenderProps {
        element: ElementRef::Block(block),
        element_kind: kind,
        children,
        options: plugin.options(),
    });

    RenderBlock {
        id: block.id.clone(),
        plugin_type: block.plugin_type.clone(),
        node,
        fallback: false,
        placeholder: None,
    }
}

fn render_inline(inline: &InlineElement, registry: &Registry) -> RenderNode {
    let children: Vec<RenderNode> = inline
        .children
        .iter()
        .map(|leaf| render_leaf(leaf, registry))
        .collect();
    match registry
        .plugin(&inline.plugin_type)
        .and_then(|plugin| plugin.root_element().map(|root| (plugin, root)))
    {
        Some((plugin, (kind, spec))) => (spec.render)(RenderProps {
            element: ElementRef::Inline(inline),
            element_kind: kind,
            children,
            options: plugin.options(),
        }),
        None => {
            log::warn!("Unknown inline type {}; rendering fallback", inline.plugin_type);
            RenderNode::element("span", children).with_attr("class", UNKNOWN_CLASS)
        }
    }
}

/// A text node wrapped by each registered mark, code innermost.
pub fn render_leaf(leaf: &TextLeaf, registry: &Registry) -> RenderNode {
    leaf.marks
        .iter()
        .rev()
        .filter_map(|mark| registry.mark(mark))
        .fold(RenderNode::text(leaf.text.clone()), |node, descriptor| {
            (descriptor.render)(node)
        })
}
