//! Plugin registry: the resolved, read-only lookup table behind rendering and
//! serialization.
//!
//! Built once from an ordered plugin list and a mark list. Besides the
//! forward `type -> descriptor` map it keeps reverse indices for
//! deserialization (HTML tag, HTML class, Markdown node, mark tag). When two
//! plugins claim the same key, the one registered first keeps it and the
//! conflict is recorded as a [`RegistryWarning`].

use std::collections::HashMap;
use std::fmt;

use crate::error::{ConfigurationError, UnknownTypeError};
use crate::html::HtmlElement;
use crate::plugin::{MarkdownNode, NodeKind, PluginDescriptor};
use crate::schema::{Child, Document, Mark, MarkDescriptor};
use crate::serialize::Format;

/// Block type used for unmatched content when no plugin qualifies.
pub const FALLBACK_BLOCK_TYPE: &str = "Paragraph";

/// Which reverse index a conflict happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    HtmlTag,
    HtmlClass,
    Markdown,
    MarkTag,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IndexKind::HtmlTag => "HTML tag",
            IndexKind::HtmlClass => "HTML class",
            IndexKind::Markdown => "Markdown node",
            IndexKind::MarkTag => "mark tag",
        })
    }
}

/// Non-fatal problems found while building a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryWarning {
    TagConflict {
        index: IndexKind,
        key: String,
        kept: String,
        ignored: String,
    },
}

impl fmt::Display for RegistryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryWarning::TagConflict {
                index,
                key,
                kept,
                ignored,
            } => write!(f, "{index} '{key}' claimed by {kept} and {ignored}; {kept} wins"),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct ReverseIndex {
    keys: HashMap<String, usize>,
}

impl ReverseIndex {
    fn claim(
        &mut self,
        kind: IndexKind,
        key: String,
        idx: usize,
        owner: impl Fn(usize) -> String,
        warnings: &mut Vec<RegistryWarning>,
    ) {
        match self.keys.get(&key) {
            Some(&existing) if existing != idx => {
                let warning = RegistryWarning::TagConflict {
                    index: kind,
                    key,
                    kept: owner(existing),
                    ignored: owner(idx),
                };
                log::warn!("{warning}");
                warnings.push(warning);
            }
            Some(_) => {}
            None => {
                self.keys.insert(key, idx);
            }
        }
    }

    fn get(&self, key: &str) -> Option<usize> {
        self.keys.get(key).copied()
    }
}

#[derive(Debug, Clone, Default)]
struct NodeIndices {
    tags: ReverseIndex,
    classes: ReverseIndex,
}

#[derive(Debug, Clone)]
pub struct Registry {
    plugins: Vec<PluginDescriptor>,
    by_type: HashMap<String, usize>,
    block: NodeIndices,
    inline: NodeIndices,
    markdown: HashMap<MarkdownNode, usize>,
    marks: Vec<MarkDescriptor>,
    mark_tags: HashMap<String, Mark>,
    default_block: Option<usize>,
    warnings: Vec<RegistryWarning>,
}

impl Registry {
    /// Resolve `plugins` and `marks` into a registry.
    ///
    /// Fails on an empty or duplicate type name, a plugin without elements,
    /// or two descriptors for the same mark. Index conflicts are warnings.
    pub fn build(
        plugins: Vec<PluginDescriptor>,
        marks: Vec<MarkDescriptor>,
    ) -> Result<Registry, ConfigurationError> {
        let mut by_type = HashMap::with_capacity(plugins.len());
        for (idx, plugin) in plugins.iter().enumerate() {
            let name = plugin.plugin_type();
            if name.is_empty() {
                return Err(ConfigurationError::EmptyType);
            }
            if plugin.elements().is_empty() {
                return Err(ConfigurationError::MissingElements(name.to_string()));
            }
            if by_type.insert(name.to_string(), idx).is_some() {
                return Err(ConfigurationError::DuplicateType(name.to_string()));
            }
        }

        let mut seen_marks: Vec<Mark> = Vec::with_capacity(marks.len());
        for descriptor in &marks {
            if seen_marks.contains(&descriptor.mark) {
                return Err(ConfigurationError::DuplicateMark(descriptor.mark));
            }
            seen_marks.push(descriptor.mark);
        }

        let mut warnings = Vec::new();
        let mut block = NodeIndices::default();
        let mut inline = NodeIndices::default();
        let mut markdown: HashMap<MarkdownNode, usize> = HashMap::new();
        let owner = |idx: usize| plugins[idx].plugin_type().to_string();

        for (idx, plugin) in plugins.iter().enumerate() {
            let indices = match plugin.node_kind() {
                NodeKind::Block => &mut block,
                NodeKind::Inline => &mut inline,
            };
            if let Some(de) = plugin.html_deserialize() {
                for tag in &de.tag_names {
                    indices
                        .tags
                        .claim(IndexKind::HtmlTag, tag.clone(), idx, owner, &mut warnings);
                }
                for class in &de.class_names {
                    indices.classes.claim(
                        IndexKind::HtmlClass,
                        class.clone(),
                        idx,
                        owner,
                        &mut warnings,
                    );
                }
            }
            for node in plugin.markdown_nodes() {
                match markdown.get(node) {
                    Some(&existing) if existing != idx => {
                        let warning = RegistryWarning::TagConflict {
                            index: IndexKind::Markdown,
                            key: format!("{node:?}"),
                            kept: owner(existing),
                            ignored: owner(idx),
                        };
                        log::warn!("{warning}");
                        warnings.push(warning);
                    }
                    Some(_) => {}
                    None => {
                        markdown.insert(*node, idx);
                    }
                }
            }
        }

        let mut mark_tags: HashMap<String, Mark> = HashMap::new();
        for descriptor in &marks {
            for tag in &descriptor.html_tags {
                match mark_tags.get(tag) {
                    Some(existing) if *existing != descriptor.mark => {
                        let warning = RegistryWarning::TagConflict {
                            index: IndexKind::MarkTag,
                            key: tag.clone(),
                            kept: existing.to_string(),
                            ignored: descriptor.mark.to_string(),
                        };
                        log::warn!("{warning}");
                        warnings.push(warning);
                    }
                    Some(_) => {}
                    None => {
                        mark_tags.insert(tag.clone(), descriptor.mark);
                    }
                }
            }
        }

        let default_block = block.tags.get("p").or_else(|| {
            plugins
                .iter()
                .position(|p| p.node_kind() == NodeKind::Block)
        });

        log::debug!(
            "Registry built: {} plugins, {} marks, {} warnings",
            plugins.len(),
            marks.len(),
            warnings.len()
        );

        Ok(Registry {
            plugins,
            by_type,
            block,
            inline,
            markdown,
            marks,
            mark_tags,
            default_block,
            warnings,
        })
    }

    /// Plugins in registration order.
    pub fn plugins(&self) -> &[PluginDescriptor] {
        &self.plugins
    }

    pub fn plugin(&self, plugin_type: &str) -> Option<&PluginDescriptor> {
        self.by_type.get(plugin_type).map(|&idx| &self.plugins[idx])
    }

    pub fn contains(&self, plugin_type: &str) -> bool {
        self.by_type.contains_key(plugin_type)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn marks(&self) -> &[MarkDescriptor] {
        &self.marks
    }

    pub fn mark(&self, mark: Mark) -> Option<&MarkDescriptor> {
        self.marks.iter().find(|d| d.mark == mark)
    }

    pub fn has_mark(&self, mark: Mark) -> bool {
        self.mark(mark).is_some()
    }

    pub fn mark_for_tag(&self, tag: &str) -> Option<Mark> {
        self.mark_tags.get(tag).copied()
    }

    /// Block plugin claiming `element`; a class match beats a tag match.
    pub fn block_for_element(&self, element: &HtmlElement) -> Option<&PluginDescriptor> {
        self.lookup(&self.block, element)
    }

    /// Inline plugin claiming `element`; a class match beats a tag match.
    pub fn inline_for_element(&self, element: &HtmlElement) -> Option<&PluginDescriptor> {
        self.lookup(&self.inline, element)
    }

    fn lookup(&self, indices: &NodeIndices, element: &HtmlElement) -> Option<&PluginDescriptor> {
        element
            .classes()
            .find_map(|class| indices.classes.get(class))
            .or_else(|| indices.tags.get(&element.name))
            .map(|idx| &self.plugins[idx])
    }

    pub fn for_markdown(&self, node: MarkdownNode) -> Option<&PluginDescriptor> {
        self.markdown.get(&node).map(|&idx| &self.plugins[idx])
    }

    /// Type given to content no plugin claims: the plugin owning `<p>`, else
    /// the first block plugin.
    pub fn default_block_type(&self) -> &str {
        self.default_block
            .map(|idx| self.plugins[idx].plugin_type())
            .unwrap_or(FALLBACK_BLOCK_TYPE)
    }

    pub fn warnings(&self) -> &[RegistryWarning] {
        &self.warnings
    }

    /// Whether at least one plugin can serialize to `format`.
    pub fn supports(&self, format: Format) -> bool {
        self.plugins.iter().any(|p| p.serializer(format).is_some())
    }

    /// Every block (or inline element) whose type is not registered.
    pub fn check(&self, doc: &Document) -> Vec<UnknownTypeError> {
        let mut errors = Vec::new();
        for block in &doc.blocks {
            if !self.contains(&block.plugin_type) {
                errors.push(UnknownTypeError {
                    id: block.id.clone(),
                    plugin_type: block.plugin_type.clone(),
                });
            }
            for child in &block.children {
                if let Child::Inline(inline) = child
                    && !self.contains(&inline.plugin_type)
                {
                    errors.push(UnknownTypeError {
                        id: block.id.clone(),
                        plugin_type: inline.plugin_type.clone(),
                    });
                }
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::{HtmlNode, parse_html};
    use crate::plugin::{ElementSpec, HtmlParser, PluginOverrides};
    use crate::render::RenderNode;
    use crate::schema::BlockElement;
    use crate::tests::{fixture_marks, fixture_plugins, fixture_registry};
    use rstest::rstest;

    fn plugin(name: &str, tags: &[&str]) -> PluginDescriptor {
        PluginDescriptor::new(name)
            .with_element(
                name.to_lowercase(),
                ElementSpec::block(|props| RenderNode::element("div", props.children)),
            )
            .with_html(HtmlParser::new().match_tags(tags))
    }

    fn element(markup: &str) -> HtmlElement {
        match parse_html(markup).into_iter().next() {
            Some(HtmlNode::Element(e)) => e,
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_type_fails_build() {
        let err = Registry::build(vec![plugin("Note", &[]), plugin("Note", &[])], vec![])
            .unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateType("Note".into()));
    }

    #[rstest]
    #[case::empty_type(PluginDescriptor::new(""), ConfigurationError::EmptyType)]
    #[case::no_elements(
        PluginDescriptor::new("Bare"),
        ConfigurationError::MissingElements("Bare".into())
    )]
    fn invalid_descriptor_fails_build(
        #[case] descriptor: PluginDescriptor,
        #[case] expected: ConfigurationError,
    ) {
        assert_eq!(
            Registry::build(vec![descriptor], vec![]).unwrap_err(),
            expected
        );
    }

    #[test]
    fn duplicate_mark_fails_build() {
        let marks = vec![
            MarkDescriptor::new(Mark::Bold, &["strong"]),
            MarkDescriptor::new(Mark::Bold, &["b"]),
        ];
        assert_eq!(
            Registry::build(vec![], marks).unwrap_err(),
            ConfigurationError::DuplicateMark(Mark::Bold)
        );
    }

    #[test]
    fn tag_conflict_first_registered_wins() {
        let registry = Registry::build(
            vec![plugin("Quote", &["blockquote"]), plugin("Callout", &["blockquote"])],
            vec![],
        )
        .unwrap();
        let found = registry
            .block_for_element(&element("<blockquote>x</blockquote>"))
            .unwrap();
        assert_eq!(found.plugin_type(), "Quote");
        assert_eq!(
            registry.warnings(),
            &[RegistryWarning::TagConflict {
                index: IndexKind::HtmlTag,
                key: "blockquote".into(),
                kept: "Quote".into(),
                ignored: "Callout".into(),
            }]
        );
    }

    #[test]
    fn class_match_beats_tag_match() {
        let callout = plugin("Callout", &[]).extend(PluginOverrides::new().html_classes(&["callout"]));
        let registry =
            Registry::build(vec![plugin("Quote", &["blockquote"]), callout], vec![]).unwrap();
        let found = registry
            .block_for_element(&element(r#"<blockquote class="callout">x</blockquote>"#))
            .unwrap();
        assert_eq!(found.plugin_type(), "Callout");
    }

    #[test]
    fn default_block_prefers_p_owner() {
        let registry = Registry::build(
            vec![plugin("Heading", &["h1"]), plugin("Text", &["p"])],
            vec![],
        )
        .unwrap();
        assert_eq!(registry.default_block_type(), "Text");

        let registry = Registry::build(vec![plugin("Heading", &["h1"])], vec![]).unwrap();
        assert_eq!(registry.default_block_type(), "Heading");

        let registry = Registry::build(vec![], vec![]).unwrap();
        assert_eq!(registry.default_block_type(), FALLBACK_BLOCK_TYPE);
    }

    #[test]
    fn inline_plugins_use_their_own_index() {
        let registry = fixture_registry();
        let a = element(r#"<a href="x">y</a>"#);
        assert!(registry.block_for_element(&a).is_none());
        assert_eq!(
            registry.inline_for_element(&a).map(|p| p.plugin_type()),
            Some("Link")
        );
    }

    #[test]
    fn mark_tags_resolve() {
        let registry = fixture_registry();
        assert_eq!(registry.mark_for_tag("b"), Some(Mark::Bold));
        assert_eq!(registry.mark_for_tag("strong"), Some(Mark::Bold));
        assert_eq!(registry.mark_for_tag("del"), Some(Mark::Strike));
        assert_eq!(registry.mark_for_tag("blink"), None);
    }

    #[test]
    fn markdown_index_and_supported_formats() {
        let registry = fixture_registry();
        assert_eq!(
            registry
                .for_markdown(MarkdownNode::Heading(2))
                .map(|p| p.plugin_type()),
            Some("HeadingTwo")
        );
        assert!(registry.supports(Format::Html));
        assert!(registry.supports(Format::Markdown));

        let html_only = plugin("Note", &["aside"]).with_html(
            HtmlParser::new()
                .match_tags(&["aside"])
                .serialize_with(|_, t| format!("<aside>{t}</aside>")),
        );
        let registry = Registry::build(vec![html_only], vec![]).unwrap();
        assert!(registry.supports(Format::Html));
        assert!(!registry.supports(Format::Markdown));
    }

    #[test]
    fn check_reports_unknown_types() {
        let registry = Registry::build(fixture_plugins(), fixture_marks()).unwrap();
        let ghost = BlockElement::with_text("Ghost", "boo");
        let id = ghost.id.clone();
        let doc = Document::from_blocks(vec![BlockElement::with_text("Paragraph", "ok"), ghost]);
        assert_eq!(
            registry.check(&doc),
            vec![UnknownTypeError {
                id,
                plugin_type: "Ghost".into()
            }]
        );
    }

    #[test]
    fn registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
