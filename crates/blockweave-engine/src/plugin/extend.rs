//! Non-destructive override of plugin descriptors.
//!
//! `extend` clones the base and deep-merges a [`PluginOverrides`] over it:
//!
//! - scalar fields and sequences (`shortcuts`, tag sets) are replaced;
//! - maps (`options.custom`, `elements`, `default_props`) merge key by key,
//!   recursing into nested JSON objects;
//! - hook functions (render, serialize, parse, upload) are substituted whole.
//!
//! An element kind the base does not have is only added once some override
//! supplies its render hook. Until then its partial override is held on the
//! descriptor, so building it up over several `extend` calls gives the same
//! result as merging the overrides first.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::{
    ElementSpec, HtmlDeserialize, HtmlParseFn, HtmlParser, MarkdownDeserialize, MarkdownNode,
    MarkdownParser, NodeKind, PluginDescriptor, RenderFn, SerializeFn,
};
use crate::editing::upload::{UploadFile, UploadFn, UploadFuture};
use crate::html::HtmlElement;
use crate::render::{RenderNode, RenderProps};
use crate::schema::{ElementRef, Properties};

#[derive(Clone, Default)]
pub struct DisplayOverrides {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub search_string: Option<String>,
}

#[derive(Clone, Default)]
pub struct OptionsOverrides {
    pub display: DisplayOverrides,
    pub shortcuts: Option<Vec<String>>,
    pub custom: Map<String, Value>,
    pub upload: Option<UploadFn>,
}

#[derive(Clone, Default)]
pub struct ElementOverrides {
    pub render: Option<RenderFn>,
    pub node_kind: Option<NodeKind>,
    pub default_props: Properties,
}

impl ElementOverrides {
    fn merge(&mut self, later: ElementOverrides) {
        replace_if_some(&mut self.render, later.render);
        replace_if_some(&mut self.node_kind, later.node_kind);
        merge_props(&mut self.default_props, later.default_props);
    }
}

impl fmt::Debug for ElementOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementOverrides")
            .field("render", &self.render.is_some())
            .field("node_kind", &self.node_kind)
            .field("default_props", &self.default_props)
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct HtmlOverrides {
    pub tag_names: Option<BTreeSet<String>>,
    pub class_names: Option<BTreeSet<String>>,
    pub parse: Option<HtmlParseFn>,
    pub serialize: Option<SerializeFn>,
}

#[derive(Clone, Default)]
pub struct MarkdownOverrides {
    pub nodes: Option<Vec<MarkdownNode>>,
    pub serialize: Option<SerializeFn>,
}

/// A partial descriptor: every field is optional and only named fields
/// change when extending.
#[derive(Clone, Default)]
pub struct PluginOverrides {
    pub elements: BTreeMap<String, ElementOverrides>,
    pub options: OptionsOverrides,
    pub html: HtmlOverrides,
    pub markdown: MarkdownOverrides,
}

impl PluginOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: &str) -> Self {
        self.options.display.title = Some(title.to_string());
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.options.display.description = Some(description.to_string());
        self
    }

    pub fn icon(mut self, icon: &str) -> Self {
        self.options.display.icon = Some(icon.to_string());
        self
    }

    pub fn search_string(mut self, search: &str) -> Self {
        self.options.display.search_string = Some(search.to_string());
        self
    }

    pub fn shortcuts<S: AsRef<str>>(mut self, shortcuts: &[S]) -> Self {
        self.options.shortcuts = Some(shortcuts.iter().map(|s| s.as_ref().to_string()).collect());
        self
    }

    pub fn custom(mut self, key: &str, value: impl Into<Value>) -> Self {
        merge_value_into(&mut self.options.custom, key.to_string(), value.into());
        self
    }

    /// Deep-merge a whole JSON object of custom options.
    pub fn custom_map(mut self, custom: Map<String, Value>) -> Self {
        merge_map(&mut self.options.custom, custom);
        self
    }

    pub fn upload(
        mut self,
        upload: impl Fn(UploadFile) -> UploadFuture + Send + Sync + 'static,
    ) -> Self {
        self.options.upload = Some(Arc::new(upload));
        self
    }

    pub fn element_render(
        mut self,
        kind: &str,
        render: impl Fn(RenderProps<'_>) -> RenderNode + Send + Sync + 'static,
    ) -> Self {
        self.elements.entry(kind.to_string()).or_default().render = Some(Arc::new(render));
        self
    }

    pub fn element_node_kind(mut self, kind: &str, node_kind: NodeKind) -> Self {
        self.elements.entry(kind.to_string()).or_default().node_kind = Some(node_kind);
        self
    }

    pub fn element_default_prop(mut self, kind: &str, key: &str, value: impl Into<Value>) -> Self {
        let element = self.elements.entry(kind.to_string()).or_default();
        merge_prop(&mut element.default_props, key.to_string(), value.into());
        self
    }

    pub fn html_tags(mut self, tags: &[&str]) -> Self {
        self.html.tag_names = Some(tags.iter().map(|t| t.to_ascii_lowercase()).collect());
        self
    }

    pub fn html_classes(mut self, classes: &[&str]) -> Self {
        self.html.class_names = Some(classes.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn html_parse(
        mut self,
        parse: impl Fn(&HtmlElement) -> Properties + Send + Sync + 'static,
    ) -> Self {
        self.html.parse = Some(Arc::new(parse));
        self
    }

    pub fn html_serialize(
        mut self,
        serialize: impl Fn(ElementRef<'_>, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.html.serialize = Some(Arc::new(serialize));
        self
    }

    pub fn markdown_nodes(mut self, nodes: &[MarkdownNode]) -> Self {
        self.markdown.nodes = Some(nodes.to_vec());
        self
    }

    pub fn markdown_serialize(
        mut self,
        serialize: impl Fn(ElementRef<'_>, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.markdown.serialize = Some(Arc::new(serialize));
        self
    }

    /// Compose two overrides; `later` wins wherever both name a field.
    ///
    /// `base.extend(a).extend(b)` and `base.extend(a.merge(b))` produce the
    /// same descriptor.
    pub fn merge(mut self, later: PluginOverrides) -> PluginOverrides {
        for (kind, over) in later.elements {
            self.elements.entry(kind).or_default().merge(over);
        }

        let display = &mut self.options.display;
        let later_display = later.options.display;
        replace_if_some(&mut display.title, later_display.title);
        replace_if_some(&mut display.description, later_display.description);
        replace_if_some(&mut display.icon, later_display.icon);
        replace_if_some(&mut display.search_string, later_display.search_string);
        replace_if_some(&mut self.options.shortcuts, later.options.shortcuts);
        replace_if_some(&mut self.options.upload, later.options.upload);
        merge_map(&mut self.options.custom, later.options.custom);

        replace_if_some(&mut self.html.tag_names, later.html.tag_names);
        replace_if_some(&mut self.html.class_names, later.html.class_names);
        replace_if_some(&mut self.html.parse, later.html.parse);
        replace_if_some(&mut self.html.serialize, later.html.serialize);

        replace_if_some(&mut self.markdown.nodes, later.markdown.nodes);
        replace_if_some(&mut self.markdown.serialize, later.markdown.serialize);
        self
    }
}

impl PluginDescriptor {
    /// Derive a new descriptor with `overrides` deep-merged over this one.
    ///
    /// `self` is left untouched, so one stock plugin can be extended
    /// differently for two editors.
    pub fn extend(&self, overrides: PluginOverrides) -> PluginDescriptor {
        let mut next = self.clone();

        for (kind, over) in overrides.elements {
            match next.elements.get_mut(&kind) {
                Some(spec) => {
                    if let Some(render) = over.render {
                        spec.render = render;
                    }
                    if let Some(node_kind) = over.node_kind {
                        spec.node_kind = node_kind;
                    }
                    merge_props(&mut spec.default_props, over.default_props);
                }
                None => {
                    let mut held = next.held_elements.remove(&kind).unwrap_or_default();
                    held.merge(over);
                    match held.render.take() {
                        Some(render) => {
                            if next.root.is_none() {
                                next.root = Some(kind.clone());
                            }
                            next.elements.insert(
                                kind,
                                ElementSpec {
                                    render,
                                    node_kind: held.node_kind.unwrap_or(NodeKind::Block),
                                    default_props: held.default_props,
                                },
                            );
                        }
                        None => {
                            log::warn!(
                                "extend({}): element '{kind}' has no render hook yet; held until one is supplied",
                                self.plugin_type
                            );
                            next.held_elements.insert(kind, held);
                        }
                    }
                }
            }
        }

        let options = &mut next.options;
        let display = overrides.options.display;
        if let Some(title) = display.title {
            options.display.title = title;
        }
        if let Some(description) = display.description {
            options.display.description = description;
        }
        replace_if_some(&mut options.display.icon, display.icon);
        replace_if_some(&mut options.display.search_string, display.search_string);
        if let Some(shortcuts) = overrides.options.shortcuts {
            options.shortcuts = shortcuts;
        }
        replace_if_some(&mut options.upload, overrides.options.upload);
        merge_map(&mut options.custom, overrides.options.custom);

        let html = overrides.html;
        if html.tag_names.is_some()
            || html.class_names.is_some()
            || html.parse.is_some()
            || html.serialize.is_some()
        {
            let parser = next.parsers.html.get_or_insert_with(HtmlParser::default);
            replace_if_some(&mut parser.serialize, html.serialize);
            if html.tag_names.is_some() || html.class_names.is_some() || html.parse.is_some() {
                let de = parser
                    .deserialize
                    .get_or_insert_with(HtmlDeserialize::default);
                if let Some(tags) = html.tag_names {
                    de.tag_names = tags;
                }
                if let Some(classes) = html.class_names {
                    de.class_names = classes;
                }
                replace_if_some(&mut de.parse, html.parse);
            }
        }

        let markdown = overrides.markdown;
        if markdown.nodes.is_some() || markdown.serialize.is_some() {
            let parser = next
                .parsers
                .markdown
                .get_or_insert_with(MarkdownParser::default);
            replace_if_some(&mut parser.serialize, markdown.serialize);
            if let Some(nodes) = markdown.nodes {
                parser.deserialize = Some(MarkdownDeserialize { nodes });
            }
        }

        next
    }
}

fn replace_if_some<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Recursive JSON merge; objects merge per key, anything else is replaced.
pub fn merge_value(base: &mut Value, over: Value) {
    match (base, over) {
        (Value::Object(base_map), Value::Object(over_map)) => merge_map(base_map, over_map),
        (slot, value) => *slot = value,
    }
}

pub fn merge_map(base: &mut Map<String, Value>, over: Map<String, Value>) {
    for (key, value) in over {
        merge_value_into(base, key, value);
    }
}

fn merge_value_into(base: &mut Map<String, Value>, key: String, value: Value) {
    match base.get_mut(&key) {
        Some(existing) => merge_value(existing, value),
        None => {
            base.insert(key, value);
        }
    }
}

fn merge_props(base: &mut Properties, over: Properties) {
    for (key, value) in over {
        merge_prop(base, key, value);
    }
}

fn merge_prop(base: &mut Properties, key: String, value: Value) {
    match base.get_mut(&key) {
        Some(existing) => merge_value(existing, value),
        None => {
            base.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{HtmlParser, MarkdownParser};
    use crate::serialize::Format;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn image() -> PluginDescriptor {
        PluginDescriptor::new("Image")
            .with_element(
                "image",
                ElementSpec::block(|_| RenderNode::element("img", vec![]))
                    .with_default_prop("sizes", json!({"width": 650, "height": 500})),
            )
            .with_display("Image", "Upload or embed with a link")
            .with_shortcuts(&["img"])
            .with_custom("maxWidth", 650)
            .with_custom("limits", json!({"bytes": 1024, "types": ["png"]}))
            .with_html(
                HtmlParser::new()
                    .match_tags(&["IMG"])
                    .serialize_with(|_, _| "<img>".to_string()),
            )
            .with_markdown(MarkdownParser::new().serialize_with(|_, _| "![]()".to_string()))
    }

    #[test]
    fn shortcuts_override_leaves_parsers_alone() {
        let base = image();
        let extended = base.extend(PluginOverrides::new().shortcuts(&["x"]));

        assert_eq!(extended.shortcuts(), &["x".to_string()]);
        assert_eq!(base.shortcuts(), &["img".to_string()]);

        let base_html = base.serializer(Format::Html).unwrap();
        let ext_html = extended.serializer(Format::Html).unwrap();
        assert!(Arc::ptr_eq(base_html, ext_html));
        let base_md = base.serializer(Format::Markdown).unwrap();
        let ext_md = extended.serializer(Format::Markdown).unwrap();
        assert!(Arc::ptr_eq(base_md, ext_md));
        assert_eq!(
            base.html_deserialize().unwrap().tag_names,
            extended.html_deserialize().unwrap().tag_names
        );
        assert_eq!(base.display(), extended.display());
        assert_eq!(base.options().custom, extended.options().custom);
    }

    #[test]
    fn custom_options_deep_merge() {
        let extended = image().extend(
            PluginOverrides::new()
                .custom("maxWidth", 750)
                .custom("maxHeight", 800)
                .custom("limits", json!({"bytes": 2048})),
        );
        assert_eq!(
            serde_json::Value::Object(extended.options().custom.clone()),
            json!({
                "maxWidth": 750,
                "maxHeight": 800,
                "limits": {"bytes": 2048, "types": ["png"]},
            })
        );
    }

    #[test]
    fn default_props_deep_merge() {
        let extended =
            image().extend(PluginOverrides::new().element_default_prop(
                "image",
                "sizes",
                json!({"width": 750}),
            ));
        assert_eq!(
            extended.default_props().get("sizes"),
            Some(&json!({"width": 750, "height": 500}))
        );
    }

    #[test]
    fn hooks_are_substituted() {
        let extended = image().extend(
            PluginOverrides::new().html_serialize(|_, text| format!("<figure>{text}</figure>")),
        );
        let block = crate::schema::BlockElement::new("Image");
        let html = extended.serializer(Format::Html).unwrap();
        assert_eq!(html(ElementRef::Block(&block), "x"), "<figure>x</figure>");
        // Tag claims are a separate field and survive.
        assert!(extended.html_deserialize().unwrap().tag_names.contains("img"));
    }

    #[test]
    fn unknown_element_without_render_is_held_back() {
        let extended =
            image().extend(PluginOverrides::new().element_node_kind("caption", NodeKind::Inline));
        assert!(extended.element("caption").is_none());

        let extended = image().extend(
            PluginOverrides::new()
                .element_render("caption", |p| RenderNode::element("figcaption", p.children))
                .element_node_kind("caption", NodeKind::Inline),
        );
        assert_eq!(extended.element("caption").unwrap().node_kind, NodeKind::Inline);
        assert_eq!(extended.root_element().unwrap().0, "image");
    }

    #[test]
    fn extend_composes_associatively() {
        let o1 = PluginOverrides::new()
            .custom("maxWidth", 700)
            .custom("limits", json!({"bytes": 1}))
            .title("Picture")
            .shortcuts(&["pic"]);
        let o2 = PluginOverrides::new()
            .custom("limits", json!({"types": ["gif"]}))
            .description("Pictures")
            .shortcuts(&["p", "pic"]);

        let chained = image().extend(o1.clone()).extend(o2.clone());
        let merged = image().extend(o1.merge(o2));

        assert_eq!(chained.options().custom, merged.options().custom);
        assert_eq!(chained.display(), merged.display());
        assert_eq!(chained.shortcuts(), merged.shortcuts());
        assert_eq!(chained.display().title, "Picture");
        assert_eq!(chained.display().description, "Pictures");
        assert_eq!(
            chained.custom("limits"),
            Some(&json!({"bytes": 1, "types": ["gif"]}))
        );
    }

    #[test]
    fn new_element_built_across_overrides_composes_associatively() {
        let o1 = PluginOverrides::new()
            .element_node_kind("caption", NodeKind::Inline)
            .element_default_prop("caption", "align", "left");
        let o2 = PluginOverrides::new()
            .element_render("caption", |p| RenderNode::element("figcaption", p.children));

        let first = image().extend(o1.clone());
        assert!(first.element("caption").is_none());

        let chained = first.extend(o2.clone());
        let merged = image().extend(o1.merge(o2));

        for descriptor in [&chained, &merged] {
            let caption = descriptor.element("caption").unwrap();
            assert_eq!(caption.node_kind, NodeKind::Inline);
            assert_eq!(caption.default_props.get("align"), Some(&json!("left")));
        }
        assert_eq!(chained.root_element().unwrap().0, "image");
    }

    #[test]
    fn upload_hook_can_be_added() {
        use crate::editing::upload::{UploadError, UploadResult};

        let base = image();
        assert!(base.upload().is_none());
        let extended = base.extend(PluginOverrides::new().upload(|_file| {
            Box::pin(async {
                Ok::<_, UploadError>(UploadResult {
                    url: "https://cdn.example/x.png".into(),
                    width: 1,
                    height: 1,
                })
            })
        }));
        assert!(extended.upload().is_some());
        assert!(base.upload().is_none());
    }
}
