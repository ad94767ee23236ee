//! Shared test fixtures: a small plugin set covering every engine path.
//!
//! The stock plugins live in `blockweave-plugins`; these mirror the subset
//! the engine's own tests need.

use serde_json::Value;

use crate::html::HtmlElement;
use crate::plugin::{ElementSpec, HtmlParser, MarkdownNode, MarkdownParser, PluginDescriptor};
use crate::registry::Registry;
use crate::render::RenderNode;
use crate::schema::{Mark, MarkDescriptor, Properties};

pub fn paragraph() -> PluginDescriptor {
    PluginDescriptor::new("Paragraph")
        .with_element(
            "paragraph",
            ElementSpec::block(|props| RenderNode::element("p", props.children)),
        )
        .with_display("Paragraph", "Plain text")
        .with_search_string("text paragraph")
        .with_html(
            HtmlParser::new()
                .match_tags(&["p"])
                .serialize_with(|_, text| format!("<p>{text}</p>")),
        )
        .with_markdown(
            MarkdownParser::new()
                .match_nodes(&[MarkdownNode::Paragraph])
                .serialize_with(|_, text| format!("{text}\n\n")),
        )
}

pub fn heading_two() -> PluginDescriptor {
    PluginDescriptor::new("HeadingTwo")
        .with_element(
            "heading-two",
            ElementSpec::block(|props| RenderNode::element("h2", props.children)),
        )
        .with_display("Heading 2", "Medium section heading")
        .with_search_string("h2 subtitle")
        .with_shortcuts(&["##"])
        .with_html(
            HtmlParser::new()
                .match_tags(&["h2"])
                .serialize_with(|_, text| format!("<h2>{text}</h2>")),
        )
        .with_markdown(
            MarkdownParser::new()
                .match_nodes(&[MarkdownNode::Heading(2)])
                .serialize_with(|_, text| format!("## {text}\n")),
        )
}

pub fn bulleted_list() -> PluginDescriptor {
    PluginDescriptor::new("BulletedList")
        .with_element(
            "bulleted-list",
            ElementSpec::block(|props| {
                RenderNode::element("ul", vec![RenderNode::element("li", props.children)])
            }),
        )
        .with_display("Bulleted list", "Unordered list")
        .with_shortcuts(&["-"])
        .with_html(
            HtmlParser::new()
                .match_tags(&["ul"])
                .serialize_with(|_, text| format!("<ul><li>{text}</li></ul>")),
        )
        .with_markdown(
            MarkdownParser::new()
                .match_nodes(&[MarkdownNode::BulletItem])
                .serialize_with(|_, text| format!("- {text}\n"))
                .continues_lazily(),
        )
}

pub fn link() -> PluginDescriptor {
    PluginDescriptor::new("Link")
        .with_element(
            "link",
            ElementSpec::inline(|props| {
                let href = props.element.property_str("url").unwrap_or_default();
                RenderNode::element("a", props.children).with_attr("href", href)
            }),
        )
        .with_display("Link", "Hyperlink")
        .with_html(
            HtmlParser::new()
                .match_tags(&["a"])
                .parse_with(|el| attrs_to_props(el, &[("href", "url")]))
                .serialize_with(|el, text| {
                    let url = el.property_str("url").unwrap_or_default();
                    format!(
                        "<a href=\"{}\">{text}</a>",
                        html_escape::encode_double_quoted_attribute(url)
                    )
                }),
        )
        .with_markdown(
            MarkdownParser::new()
                .match_nodes(&[MarkdownNode::Link])
                .serialize_with(|el, text| {
                    format!("[{text}]({})", el.property_str("url").unwrap_or_default())
                }),
        )
}

pub fn image() -> PluginDescriptor {
    PluginDescriptor::new("Image")
        .with_element(
            "image",
            ElementSpec::block(|props| {
                let src = props.element.property_str("src").unwrap_or_default();
                RenderNode::element("img", vec![]).with_attr("src", src)
            }),
        )
        .with_display("Image", "Upload or embed an image")
        .with_html(
            HtmlParser::new()
                .match_tags(&["img"])
                .parse_with(|el| attrs_to_props(el, &[("src", "src"), ("alt", "alt")]))
                .serialize_with(|el, _| {
                    format!(
                        "<img src=\"{}\" alt=\"{}\">",
                        html_escape::encode_double_quoted_attribute(
                            el.property_str("src").unwrap_or_default()
                        ),
                        html_escape::encode_double_quoted_attribute(
                            el.property_str("alt").unwrap_or_default()
                        ),
                    )
                }),
        )
        .with_markdown(
            MarkdownParser::new()
                .match_nodes(&[MarkdownNode::Image])
                .serialize_with(|el, _| {
                    format!(
                        "![{}]({})\n\n",
                        el.property_str("alt").unwrap_or_default(),
                        el.property_str("src").unwrap_or_default()
                    )
                }),
        )
}

pub fn code() -> PluginDescriptor {
    PluginDescriptor::new("Code")
        .with_element(
            "code",
            ElementSpec::block(|props| {
                RenderNode::element("pre", vec![RenderNode::element("code", props.children)])
            }),
        )
        .with_display("Code", "Code block")
        .with_html(
            HtmlParser::new()
                .match_tags(&["pre"])
                .plain_text()
                .parse_with(|el| {
                    let mut props = Properties::new();
                    let language = el
                        .element_children()
                        .flat_map(|c| c.classes())
                        .find_map(|class| class.strip_prefix("language-"));
                    if let Some(language) = language {
                        props.insert("language".into(), Value::from(language));
                    }
                    props
                })
                .serialize_with(|el, _| {
                    let text = el.text();
                    match el.property_str("language") {
                        Some(lang) => format!(
                            "<pre><code class=\"language-{lang}\">{}</code></pre>",
                            html_escape::encode_text(&text)
                        ),
                        None => format!("<pre><code>{}</code></pre>", html_escape::encode_text(&text)),
                    }
                }),
        )
        .with_markdown(
            MarkdownParser::new()
                .match_nodes(&[MarkdownNode::CodeBlock])
                .serialize_with(|el, _| {
                    let lang = el.property_str("language").unwrap_or_default();
                    format!("```{lang}\n{}\n```\n\n", el.text())
                }),
        )
}

/// HTML-only plugin, for format-support tests.
pub fn html_only_plugin() -> PluginDescriptor {
    PluginDescriptor::new("Note")
        .with_element(
            "note",
            ElementSpec::block(|props| RenderNode::element("aside", props.children)),
        )
        .with_html(
            HtmlParser::new()
                .match_tags(&["aside"])
                .serialize_with(|_, text| format!("<aside>{text}</aside>")),
        )
}

pub fn fixture_plugins() -> Vec<PluginDescriptor> {
    vec![
        paragraph(),
        heading_two(),
        bulleted_list(),
        link(),
        image(),
        code(),
    ]
}

pub fn fixture_marks() -> Vec<MarkDescriptor> {
    vec![
        MarkDescriptor::new(Mark::Bold, &["strong", "b"]),
        MarkDescriptor::new(Mark::Italic, &["em", "i"]),
        MarkDescriptor::new(Mark::Underline, &["u"]),
        MarkDescriptor::new(Mark::Strike, &["s", "strike", "del"]),
        MarkDescriptor::new(Mark::Code, &["code"]),
    ]
}

pub fn fixture_registry() -> Registry {
    Registry::build(fixture_plugins(), fixture_marks()).expect("fixture registry builds")
}

fn attrs_to_props(el: &HtmlElement, pairs: &[(&str, &str)]) -> Properties {
    pairs
        .iter()
        .filter_map(|(attr, prop)| {
            el.attr(attr)
                .map(|value| (prop.to_string(), Value::from(value)))
        })
        .collect()
}
