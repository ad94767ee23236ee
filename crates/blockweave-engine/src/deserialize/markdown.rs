//! Markdown → document.
//!
//! `pulldown-cmark` events are folded into blocks by [`MarkdownProcessor`].
//! Each block-level construct maps to a [`MarkdownNode`] key that plugins
//! claim; unclaimed constructs fall back to the registry's default type.
//!
//! Extracted properties: `language` (fenced code info string), `src`, `alt`
//! and `title` (images), `url` and `title` (links), `checked` (task items).

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde_json::Value;

use crate::plugin::{MarkdownNode, NodeKind};
use crate::registry::Registry;
use crate::schema::{BlockElement, Document, InlineElement, Mark, MarkSet, Properties};

use super::{Runs, inline_leaves, make_block};

pub fn deserialize_markdown(input: &str, registry: &Registry) -> Document {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut processor = MarkdownProcessor::new(registry);
    for event in Parser::new_ext(input, options) {
        processor.process_event(event);
    }
    let blocks = processor.finalize();
    log::debug!("Deserialized {} blocks from Markdown", blocks.len());
    Document::from_blocks(blocks)
}

/// The block currently being filled.
struct Pending {
    node: MarkdownNode,
    props: Properties,
    runs: Runs,
    /// Image seen as the first content of a paragraph.
    image: Option<Properties>,
}

impl Pending {
    fn new(node: MarkdownNode) -> Self {
        Self {
            node,
            props: Properties::new(),
            runs: Runs::default(),
            image: None,
        }
    }
}

struct ImageCapture {
    props: Properties,
    alt: String,
}

struct MarkdownProcessor<'r> {
    registry: &'r Registry,
    blocks: Vec<BlockElement>,
    current: Option<Pending>,
    marks: MarkSet,
    /// One entry per open list; `true` when ordered.
    lists: Vec<bool>,
    quote_depth: usize,
    code: Option<String>,
    link: Option<(Properties, Runs)>,
    image: Option<ImageCapture>,
}

impl<'r> MarkdownProcessor<'r> {
    fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            blocks: Vec::new(),
            current: None,
            marks: MarkSet::empty(),
            lists: Vec::new(),
            quote_depth: 0,
            code: None,
            link: None,
            image: None,
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Paragraph) => match self.current.as_mut() {
                // A paragraph inside a quote or loose list item.
                Some(pending) => {
                    if !pending.runs.is_empty() {
                        pending.runs.push_text("\n", MarkSet::empty());
                    }
                }
                None => self.open(MarkdownNode::Paragraph),
            },
            Event::End(TagEnd::Paragraph) => {
                if self
                    .current
                    .as_ref()
                    .is_some_and(|p| p.node == MarkdownNode::Paragraph)
                {
                    self.close();
                }
            }
            Event::Start(Tag::Heading { level, .. }) => {
                self.interrupt();
                self.open(MarkdownNode::Heading(level as u8));
            }
            Event::End(TagEnd::Heading(_)) => self.close(),
            Event::Start(Tag::BlockQuote(_)) => {
                if self.quote_depth == 0 {
                    self.close();
                    self.open(MarkdownNode::BlockQuote);
                }
                self.quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 {
                    self.close();
                }
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                self.interrupt();
                self.open(MarkdownNode::CodeBlock);
                if let CodeBlockKind::Fenced(info) = kind
                    && let Some(language) = info.split_whitespace().next()
                    && let Some(pending) = self.current.as_mut()
                {
                    pending
                        .props
                        .insert("language".into(), Value::from(language));
                }
                self.code = Some(String::new());
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(mut code) = self.code.take() {
                    if code.ends_with('\n') {
                        code.pop();
                    }
                    if let Some(pending) = self.current.as_mut() {
                        pending.runs.push_text(&code, MarkSet::empty());
                    }
                }
                self.close();
            }
            Event::Start(Tag::List(first)) => {
                // A nested list ends the text of its parent item.
                self.interrupt();
                self.lists.push(first.is_some());
            }
            Event::End(TagEnd::List(_)) => {
                self.close();
                self.lists.pop();
            }
            Event::Start(Tag::Item) => {
                self.close();
                let node = if self.lists.last() == Some(&true) {
                    MarkdownNode::NumberedItem
                } else {
                    MarkdownNode::BulletItem
                };
                self.open(node);
            }
            Event::End(TagEnd::Item) => self.close(),
            Event::TaskListMarker(checked) => {
                if let Some(pending) = self.current.as_mut() {
                    pending.node = MarkdownNode::TaskItem;
                    pending.props.insert("checked".into(), Value::Bool(checked));
                }
            }
            Event::Rule => {
                self.interrupt();
                if let Some(plugin) = self.registry.for_markdown(MarkdownNode::ThematicBreak) {
                    self.blocks.push(make_block(
                        Some(plugin),
                        plugin.plugin_type(),
                        Properties::new(),
                        Vec::new(),
                    ));
                }
            }
            Event::Start(Tag::Emphasis) => self.marks.insert(Mark::Italic),
            Event::End(TagEnd::Emphasis) => self.marks.remove(Mark::Italic),
            Event::Start(Tag::Strong) => self.marks.insert(Mark::Bold),
            Event::End(TagEnd::Strong) => self.marks.remove(Mark::Bold),
            Event::Start(Tag::Strikethrough) => self.marks.insert(Mark::Strike),
            Event::End(TagEnd::Strikethrough) => self.marks.remove(Mark::Strike),
            Event::InlineHtml(html) => match html.trim().to_ascii_lowercase().as_str() {
                "<u>" => self.marks.insert(Mark::Underline),
                "</u>" => self.marks.remove(Mark::Underline),
                "<br>" | "<br/>" | "<br />" => self.push_text("\n", MarkSet::empty()),
                _ => {}
            },
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) => {
                let claimed = self
                    .registry
                    .for_markdown(MarkdownNode::Link)
                    .is_some_and(|p| p.node_kind() == NodeKind::Inline);
                if claimed && self.image.is_none() {
                    let mut props = Properties::new();
                    props.insert("url".into(), Value::from(dest_url.as_ref()));
                    if !title.is_empty() {
                        props.insert("title".into(), Value::from(title.as_ref()));
                    }
                    self.link = Some((props, Runs::default()));
                }
            }
            Event::End(TagEnd::Link) => self.close_link(),
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                let mut props = Properties::new();
                props.insert("src".into(), Value::from(dest_url.as_ref()));
                if !title.is_empty() {
                    props.insert("title".into(), Value::from(title.as_ref()));
                }
                self.image = Some(ImageCapture {
                    props,
                    alt: String::new(),
                });
            }
            Event::End(TagEnd::Image) => self.close_image(),
            Event::Text(text) => {
                if let Some(image) = self.image.as_mut() {
                    image.alt.push_str(&text);
                } else if let Some(code) = self.code.as_mut() {
                    code.push_str(&text);
                } else {
                    self.push_text(&text, self.marks);
                }
            }
            Event::Code(text) => {
                if let Some(image) = self.image.as_mut() {
                    image.alt.push_str(&text);
                } else {
                    self.push_text(&text, self.marks.with(Mark::Code));
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(image) = self.image.as_mut() {
                    image.alt.push(' ');
                } else {
                    self.push_text("\n", self.marks);
                }
            }
            _ => {}
        }
    }

    fn open(&mut self, node: MarkdownNode) {
        self.current = Some(Pending::new(node));
    }

    fn push_text(&mut self, text: &str, marks: MarkSet) {
        if let Some((_, runs)) = self.link.as_mut() {
            runs.push_text(text, marks);
            return;
        }
        let pending = self
            .current
            .get_or_insert_with(|| Pending::new(MarkdownNode::Paragraph));
        if let Some(image) = pending.image.take() {
            // Text after the image: it was inline after all.
            if let Some(alt) = image.get("alt").and_then(Value::as_str) {
                pending.runs.push_text(alt, MarkSet::empty());
            }
        }
        pending.runs.push_text(text, marks);
    }

    fn close_link(&mut self) {
        let Some((properties, mut runs)) = self.link.take() else {
            return;
        };
        let Some(plugin) = self.registry.for_markdown(MarkdownNode::Link) else {
            return;
        };
        let mut all = plugin.default_props();
        all.extend(properties);
        let inline = InlineElement {
            plugin_type: plugin.plugin_type().to_string(),
            properties: all,
            children: inline_leaves(runs.take()),
        };
        self.current
            .get_or_insert_with(|| Pending::new(MarkdownNode::Paragraph))
            .runs
            .push_inline(inline);
    }

    fn close_image(&mut self) {
        let Some(ImageCapture { mut props, alt }) = self.image.take() else {
            return;
        };
        props.insert("alt".into(), Value::from(alt.as_str()));

        let standalone = self.link.is_none()
            && self
                .current
                .as_ref()
                .is_none_or(|p| p.node == MarkdownNode::Paragraph && p.runs.is_empty());
        if standalone {
            let pending = self
                .current
                .get_or_insert_with(|| Pending::new(MarkdownNode::Paragraph));
            pending.image = Some(props);
        } else {
            self.push_text(&alt, self.marks);
        }
    }

    /// A nested block starts. A quote with no text of its own yet is only a
    /// wrapper around it and is dropped rather than kept as an empty block.
    fn interrupt(&mut self) {
        let bare_quote = self.current.as_ref().is_some_and(|p| {
            p.node == MarkdownNode::BlockQuote && p.image.is_none() && p.runs.is_blank()
        });
        if bare_quote {
            self.current = None;
        } else {
            self.close();
        }
    }

    fn close(&mut self) {
        let Some(mut pending) = self.current.take() else {
            return;
        };
        let registry = self.registry;

        if let Some(image) = pending.image.take() {
            if pending.runs.is_blank()
                && let Some(plugin) = registry.for_markdown(MarkdownNode::Image)
            {
                self.blocks
                    .push(make_block(Some(plugin), plugin.plugin_type(), image, Vec::new()));
                return;
            }
            if let Some(alt) = image.get("alt").and_then(Value::as_str) {
                pending.runs.push_text(alt, MarkSet::empty());
            }
        }

        if pending.node == MarkdownNode::Paragraph && pending.runs.is_blank() {
            return;
        }

        let plugin = registry
            .for_markdown(pending.node)
            .or_else(|| match pending.node {
                MarkdownNode::TaskItem => registry.for_markdown(MarkdownNode::BulletItem),
                _ => None,
            })
            .filter(|p| p.node_kind() == NodeKind::Block);
        let block = match plugin {
            Some(plugin) => make_block(
                Some(plugin),
                plugin.plugin_type(),
                pending.props,
                pending.runs.take(),
            ),
            None => {
                let plugin_type = registry.default_block_type();
                make_block(
                    registry.plugin(plugin_type),
                    plugin_type,
                    Properties::new(),
                    pending.runs.take(),
                )
            }
        };
        self.blocks.push(block);
    }

    fn finalize(mut self) -> Vec<BlockElement> {
        self.close_link();
        self.close();
        self.blocks
    }
}
