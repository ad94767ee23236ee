//! HTML → document.
//!
//! Walks the parsed element tree looking for elements a block plugin claims
//! (class index first, then tag index). Inside a claimed element, content
//! becomes text runs: mark tags add marks, inline plugin tags become inline
//! elements, `<br>` becomes a newline and anything else is transparent.
//!
//! Outside claimed elements:
//! - an unclaimed element containing claimed descendants is a transparent
//!   container (`<div><h2>..</h2></div>`);
//! - other unclaimed block-level elements become one default-type block each;
//! - loose phrasing content (stray text, `<b>`, `<a>`, ...) is gathered into
//!   a default-type block that ends at the next block boundary.

use std::collections::HashSet;

use crate::html::{HtmlElement, HtmlNode, parse_html};
use crate::plugin::PluginDescriptor;
use crate::registry::Registry;
use crate::schema::{BlockElement, Document, InlineElement, MarkSet, Properties, TextLeaf};

use super::{Runs, inline_leaves, make_block};

pub fn deserialize_html(markup: &str, registry: &Registry) -> Document {
    let nodes = parse_html(markup);
    let mut containers = HashSet::new();
    for node in &nodes {
        if let HtmlNode::Element(el) = node {
            mark_containers(registry, el, &mut containers);
        }
    }
    let mut de = HtmlDeserializer {
        registry,
        containers,
        blocks: Vec::new(),
        pending: Runs::default(),
    };
    de.walk(&nodes);
    de.flush();
    log::debug!("Deserialized {} blocks from HTML", de.blocks.len());
    Document::from_blocks(de.blocks)
}

struct HtmlDeserializer<'r> {
    registry: &'r Registry,
    /// Elements with a claimed element somewhere below them. Only used as
    /// identities, never dereferenced.
    containers: HashSet<*const HtmlElement>,
    blocks: Vec<BlockElement>,
    /// Loose phrasing content waiting for a block boundary.
    pending: Runs,
}

impl<'r> HtmlDeserializer<'r> {
    fn walk(&mut self, nodes: &[HtmlNode]) {
        for node in nodes {
            match node {
                HtmlNode::Text(text) => {
                    if self.pending.is_empty() && text.trim().is_empty() {
                        continue;
                    }
                    self.pending.push_text(text, MarkSet::empty());
                }
                HtmlNode::Element(el) => self.element(el),
            }
        }
    }

    fn element(&mut self, el: &HtmlElement) {
        let registry = self.registry;
        if let Some(plugin) = registry.block_for_element(el) {
            self.flush();
            self.claimed(plugin, el);
        } else if self.containers.contains(&std::ptr::from_ref(el)) {
            self.flush();
            self.walk(&el.children);
            self.flush();
        } else if is_phrasing(registry, el) {
            collect_element(registry, el, MarkSet::empty(), &mut self.pending);
        } else {
            self.flush();
            collect_nodes(registry, &el.children, MarkSet::empty(), &mut self.pending);
            self.flush();
        }
    }

    fn claimed(&mut self, plugin: &PluginDescriptor, el: &HtmlElement) {
        let registry = self.registry;

        // `<p><img></p>`: the paragraph only wraps another block.
        if plugin.plugin_type() == registry.default_block_type()
            && sole_element_child(el).is_some_and(|inner| registry.block_for_element(inner).is_some())
        {
            self.walk(&el.children);
            self.flush();
            return;
        }

        if is_item_list(el) {
            for item in el.element_children() {
                let block = build_block(registry, plugin, item);
                self.blocks.push(block);
            }
            return;
        }

        let block = build_block(registry, plugin, el);
        self.blocks.push(block);
    }

    fn flush(&mut self) {
        if self.pending.is_blank() {
            self.pending.take();
            return;
        }
        let children = self.pending.take();
        let plugin_type = self.registry.default_block_type();
        let plugin = self.registry.plugin(plugin_type);
        self.blocks
            .push(make_block(plugin, plugin_type, Properties::new(), children));
    }
}

fn build_block(registry: &Registry, plugin: &PluginDescriptor, el: &HtmlElement) -> BlockElement {
    let de = plugin.html_deserialize();
    let props = de
        .and_then(|d| d.parse.as_ref())
        .map(|parse| parse(el))
        .unwrap_or_default();
    let children = if de.is_some_and(|d| d.plain_text) {
        vec![TextLeaf::plain(el.text_content()).into()]
    } else {
        let mut runs = Runs::default();
        collect_nodes(registry, &el.children, MarkSet::empty(), &mut runs);
        runs.take()
    };
    make_block(Some(plugin), plugin.plugin_type(), props, children)
}

fn collect_nodes(registry: &Registry, nodes: &[HtmlNode], marks: MarkSet, runs: &mut Runs) {
    for node in nodes {
        match node {
            HtmlNode::Text(text) => runs.push_text(text, marks),
            HtmlNode::Element(el) => collect_element(registry, el, marks, runs),
        }
    }
}

fn collect_element(registry: &Registry, el: &HtmlElement, marks: MarkSet, runs: &mut Runs) {
    if el.name == "br" {
        runs.push_text("\n", marks);
        return;
    }

    if let Some(plugin) = registry.inline_for_element(el) {
        let mut inner = Runs::default();
        collect_nodes(registry, &el.children, marks, &mut inner);
        let mut properties = plugin.default_props();
        if let Some(parse) = plugin.html_deserialize().and_then(|d| d.parse.as_ref()) {
            properties.extend(parse(el));
        }
        runs.push_inline(InlineElement {
            plugin_type: plugin.plugin_type().to_string(),
            properties,
            children: inline_leaves(inner.take()),
        });
        return;
    }

    let marks = match registry.mark_for_tag(&el.name) {
        Some(mark) => marks.with(mark),
        None => marks,
    };
    collect_nodes(registry, &el.children, marks, runs);
}

/// Record, bottom-up in one pass, every element that has a claimed element
/// below it. Returns whether `el` itself has one.
fn mark_containers(
    registry: &Registry,
    el: &HtmlElement,
    containers: &mut HashSet<*const HtmlElement>,
) -> bool {
    let mut found = false;
    for child in el.element_children() {
        let below = mark_containers(registry, child, containers);
        found |= below || registry.block_for_element(child).is_some();
    }
    if found {
        containers.insert(std::ptr::from_ref(el));
    }
    found
}

fn is_phrasing(registry: &Registry, el: &HtmlElement) -> bool {
    matches!(
        el.name.as_str(),
        "a" | "abbr"
            | "b"
            | "br"
            | "cite"
            | "code"
            | "del"
            | "em"
            | "i"
            | "kbd"
            | "mark"
            | "s"
            | "small"
            | "span"
            | "strike"
            | "strong"
            | "sub"
            | "sup"
            | "u"
    ) || registry.mark_for_tag(&el.name).is_some()
        || registry.inline_for_element(el).is_some()
}

fn has_text(el: &HtmlElement) -> bool {
    el.children
        .iter()
        .any(|c| matches!(c, HtmlNode::Text(t) if !t.trim().is_empty()))
}

fn sole_element_child(el: &HtmlElement) -> Option<&HtmlElement> {
    if has_text(el) {
        return None;
    }
    let mut children = el.element_children();
    let first = children.next()?;
    children.next().is_none().then_some(first)
}

/// `<ul>`/`<ol>` shaped: only `<li>` element children and no loose text.
fn is_item_list(el: &HtmlElement) -> bool {
    !has_text(el)
        && el.element_children().next().is_some()
        && el.element_children().all(|c| c.name == "li")
}
