//! # Plugin Descriptors
//!
//! A [`PluginDescriptor`] is the declarative contract a content-type module
//! hands to the registry: its block-type name, the element kinds it renders,
//! display options for menus, and per-format parsers.
//!
//! Descriptors are plain data plus `Arc`'d hook functions. They are built once
//! with the `with_*` methods and never mutated afterwards; overriding a stock
//! plugin goes through [`PluginDescriptor::extend`], which returns a new
//! descriptor.

pub mod extend;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::editing::upload::{UploadFile, UploadFn, UploadFuture};
use crate::html::HtmlElement;
use crate::render::{RenderNode, RenderProps};
use crate::schema::{ElementRef, Properties};
use crate::serialize::Format;

pub use extend::{DisplayOverrides, ElementOverrides, OptionsOverrides, PluginOverrides};

/// Renders one element kind into a neutral view node.
pub type RenderFn = Arc<dyn Fn(RenderProps<'_>) -> RenderNode + Send + Sync>;

/// `(element, inner_text) -> markup` for one output format.
pub type SerializeFn = Arc<dyn Fn(ElementRef<'_>, &str) -> String + Send + Sync>;

/// Extracts element properties from matched HTML (`src`, `href`, ...).
pub type HtmlParseFn = Arc<dyn Fn(&HtmlElement) -> Properties + Send + Sync>;

/// Whether an element kind lives at block level or inside text runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Block,
    Inline,
}

/// One entry of a plugin's element map.
#[derive(Clone)]
pub struct ElementSpec {
    pub render: RenderFn,
    pub node_kind: NodeKind,
    pub default_props: Properties,
}

impl ElementSpec {
    pub fn block(render: impl Fn(RenderProps<'_>) -> RenderNode + Send + Sync + 'static) -> Self {
        Self {
            render: Arc::new(render),
            node_kind: NodeKind::Block,
            default_props: Properties::new(),
        }
    }

    pub fn inline(render: impl Fn(RenderProps<'_>) -> RenderNode + Send + Sync + 'static) -> Self {
        Self {
            render: Arc::new(render),
            node_kind: NodeKind::Inline,
            default_props: Properties::new(),
        }
    }

    pub fn with_default_prop(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.default_props.insert(key.to_string(), value.into());
        self
    }
}

impl fmt::Debug for ElementSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementSpec")
            .field("node_kind", &self.node_kind)
            .field("default_props", &self.default_props)
            .finish_non_exhaustive()
    }
}

/// Metadata consumed by menus and toolbars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayMeta {
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub search_string: Option<String>,
}

/// Plugin options: display metadata, keyboard shortcuts, free-form custom
/// fields and the optional upload hook.
#[derive(Clone, Default)]
pub struct PluginOptions {
    pub display: DisplayMeta,
    pub shortcuts: Vec<String>,
    pub custom: serde_json::Map<String, serde_json::Value>,
    pub upload: Option<UploadFn>,
}

impl fmt::Debug for PluginOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginOptions")
            .field("display", &self.display)
            .field("shortcuts", &self.shortcuts)
            .field("custom", &self.custom)
            .field("upload", &self.upload.is_some())
            .finish()
    }
}

/// Which HTML this plugin claims during deserialization.
#[derive(Clone, Default)]
pub struct HtmlDeserialize {
    pub tag_names: BTreeSet<String>,
    pub class_names: BTreeSet<String>,
    pub parse: Option<HtmlParseFn>,
    /// Take the element's text verbatim as one unmarked leaf (code blocks).
    pub plain_text: bool,
}

#[derive(Clone, Default)]
pub struct HtmlParser {
    pub deserialize: Option<HtmlDeserialize>,
    pub serialize: Option<SerializeFn>,
}

impl HtmlParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim tag names. Matching is case-insensitive.
    pub fn match_tags(mut self, tags: &[&str]) -> Self {
        let de = self.deserialize.get_or_insert_with(HtmlDeserialize::default);
        de.tag_names
            .extend(tags.iter().map(|t| t.to_ascii_lowercase()));
        self
    }

    /// Claim class names; a class match beats a tag match.
    pub fn match_classes(mut self, classes: &[&str]) -> Self {
        let de = self.deserialize.get_or_insert_with(HtmlDeserialize::default);
        de.class_names.extend(classes.iter().map(|c| c.to_string()));
        self
    }

    pub fn parse_with(
        mut self,
        parse: impl Fn(&HtmlElement) -> Properties + Send + Sync + 'static,
    ) -> Self {
        let de = self.deserialize.get_or_insert_with(HtmlDeserialize::default);
        de.parse = Some(Arc::new(parse));
        self
    }

    /// Keep matched content as plain text instead of inferring marks.
    pub fn plain_text(mut self) -> Self {
        let de = self.deserialize.get_or_insert_with(HtmlDeserialize::default);
        de.plain_text = true;
        self
    }

    pub fn serialize_with(
        mut self,
        serialize: impl Fn(ElementRef<'_>, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.serialize = Some(Arc::new(serialize));
        self
    }
}

/// Markdown constructs a plugin can claim during deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MarkdownNode {
    Paragraph,
    Heading(u8),
    BlockQuote,
    CodeBlock,
    BulletItem,
    NumberedItem,
    TaskItem,
    Image,
    ThematicBreak,
    Link,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownDeserialize {
    pub nodes: Vec<MarkdownNode>,
}

#[derive(Clone, Default)]
pub struct MarkdownParser {
    pub serialize: Option<SerializeFn>,
    pub deserialize: Option<MarkdownDeserialize>,
    /// Output ends in a construct that absorbs a following unindented line
    /// (list items). The serializer separates it from a following block of
    /// another type with a blank line.
    pub lazy_continuation: bool,
}

impl MarkdownParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn match_nodes(mut self, nodes: &[MarkdownNode]) -> Self {
        let de = self
            .deserialize
            .get_or_insert_with(MarkdownDeserialize::default);
        de.nodes.extend_from_slice(nodes);
        self
    }

    pub fn serialize_with(
        mut self,
        serialize: impl Fn(ElementRef<'_>, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.serialize = Some(Arc::new(serialize));
        self
    }

    pub fn continues_lazily(mut self) -> Self {
        self.lazy_continuation = true;
        self
    }
}

#[derive(Clone, Default)]
pub struct Parsers {
    pub html: Option<HtmlParser>,
    pub markdown: Option<MarkdownParser>,
}

impl Parsers {
    pub fn serializer(&self, format: Format) -> Option<&SerializeFn> {
        match format {
            Format::Html => self.html.as_ref()?.serialize.as_ref(),
            Format::Markdown => self.markdown.as_ref()?.serialize.as_ref(),
        }
    }
}

impl fmt::Debug for Parsers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let html = self.html.as_ref().map(|h| {
            (
                h.deserialize.as_ref().map(|d| &d.tag_names),
                h.serialize.is_some(),
            )
        });
        let markdown = self.markdown.as_ref().map(|m| {
            (
                m.deserialize.as_ref().map(|d| &d.nodes),
                m.serialize.is_some(),
            )
        });
        f.debug_struct("Parsers")
            .field("html", &html)
            .field("markdown", &markdown)
            .finish()
    }
}

/// Immutable declaration of one block (or inline) type.
#[derive(Clone, Debug)]
pub struct PluginDescriptor {
    plugin_type: String,
    root: Option<String>,
    elements: BTreeMap<String, ElementSpec>,
    /// Element overrides from `extend` still waiting for a render hook.
    held_elements: BTreeMap<String, ElementOverrides>,
    options: PluginOptions,
    parsers: Parsers,
}

impl PluginDescriptor {
    pub fn new(plugin_type: impl Into<String>) -> Self {
        Self {
            plugin_type: plugin_type.into(),
            root: None,
            elements: BTreeMap::new(),
            held_elements: BTreeMap::new(),
            options: PluginOptions::default(),
            parsers: Parsers::default(),
        }
    }

    /// Add an element kind. The first one added is the root element used to
    /// render blocks of this type.
    pub fn with_element(mut self, kind: impl Into<String>, spec: ElementSpec) -> Self {
        let kind = kind.into();
        if self.root.is_none() {
            self.root = Some(kind.clone());
        }
        self.elements.insert(kind, spec);
        self
    }

    pub fn with_display(mut self, title: &str, description: &str) -> Self {
        self.options.display.title = title.to_string();
        self.options.display.description = description.to_string();
        self
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.options.display.icon = Some(icon.to_string());
        self
    }

    pub fn with_search_string(mut self, search: &str) -> Self {
        self.options.display.search_string = Some(search.to_string());
        self
    }

    pub fn with_shortcuts(mut self, shortcuts: &[&str]) -> Self {
        self.options.shortcuts = shortcuts.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_custom(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.options.custom.insert(key.to_string(), value.into());
        self
    }

    pub fn with_upload(
        mut self,
        upload: impl Fn(UploadFile) -> UploadFuture + Send + Sync + 'static,
    ) -> Self {
        self.options.upload = Some(Arc::new(upload));
        self
    }

    pub fn with_html(mut self, html: HtmlParser) -> Self {
        self.parsers.html = Some(html);
        self
    }

    pub fn with_markdown(mut self, markdown: MarkdownParser) -> Self {
        self.parsers.markdown = Some(markdown);
        self
    }

    pub fn plugin_type(&self) -> &str {
        &self.plugin_type
    }

    pub fn elements(&self) -> &BTreeMap<String, ElementSpec> {
        &self.elements
    }

    pub fn element(&self, kind: &str) -> Option<&ElementSpec> {
        self.elements.get(kind)
    }

    pub fn root_element(&self) -> Option<(&str, &ElementSpec)> {
        let kind = self.root.as_deref()?;
        self.elements.get(kind).map(|spec| (kind, spec))
    }

    /// Node kind of the root element; plugins without elements count as block.
    pub fn node_kind(&self) -> NodeKind {
        self.root_element()
            .map(|(_, spec)| spec.node_kind)
            .unwrap_or(NodeKind::Block)
    }

    pub fn default_props(&self) -> Properties {
        self.root_element()
            .map(|(_, spec)| spec.default_props.clone())
            .unwrap_or_default()
    }

    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    pub fn display(&self) -> &DisplayMeta {
        &self.options.display
    }

    pub fn shortcuts(&self) -> &[String] {
        &self.options.shortcuts
    }

    pub fn custom(&self, key: &str) -> Option<&serde_json::Value> {
        self.options.custom.get(key)
    }

    pub fn upload(&self) -> Option<&UploadFn> {
        self.options.upload.as_ref()
    }

    pub fn parsers(&self) -> &Parsers {
        &self.parsers
    }

    pub fn serializer(&self, format: Format) -> Option<&SerializeFn> {
        self.parsers.serializer(format)
    }

    pub fn html_deserialize(&self) -> Option<&HtmlDeserialize> {
        self.parsers.html.as_ref()?.deserialize.as_ref()
    }

    pub fn markdown_continues_lazily(&self) -> bool {
        self.parsers
            .markdown
            .as_ref()
            .is_some_and(|m| m.lazy_continuation)
    }

    pub fn markdown_nodes(&self) -> &[MarkdownNode] {
        self.parsers
            .markdown
            .as_ref()
            .and_then(|m| m.deserialize.as_ref())
            .map(|d| d.nodes.as_slice())
            .unwrap_or(&[])
    }
}
