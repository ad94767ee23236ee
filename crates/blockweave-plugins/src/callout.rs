//! Callout: a highlighted note, recognised in HTML by its class rather than
//! its tag so plain `<div>`s stay paragraphs.

use blockweave_engine::{
    ElementSpec, HtmlParser, MarkdownParser, PluginDescriptor, Properties, RenderNode,
};
use serde_json::Value;

use crate::attrs::attr;
use crate::blockquote::quote_lines;

pub const CALLOUT: &str = "Callout";
pub const CALLOUT_CLASS: &str = "blockweave-callout";

const THEMES: [&str; 4] = ["default", "info", "success", "warning"];

pub fn callout() -> PluginDescriptor {
    PluginDescriptor::new(CALLOUT)
        .with_element(
            "callout",
            ElementSpec::block(|props| {
                let theme = props.element.property_str("theme").unwrap_or("default");
                RenderNode::element("div", props.children)
                    .with_attr("class", CALLOUT_CLASS)
                    .with_attr("data-theme", theme)
            })
            .with_default_prop("theme", "default"),
        )
        .with_display("Callout", "Make writing stand out.")
        .with_custom("themes", THEMES.to_vec())
        .with_html(
            HtmlParser::new()
                .match_classes(&[CALLOUT_CLASS])
                .parse_with(|el| {
                    let mut props = Properties::new();
                    if let Some(theme) = el.attr("data-theme").filter(|t| THEMES.contains(t)) {
                        props.insert("theme".into(), Value::from(theme));
                    }
                    props
                })
                .serialize_with(|el, text| {
                    format!(
                        "<div class=\"{CALLOUT_CLASS}\"{}>{text}</div>",
                        attr("data-theme", el.property_str("theme"))
                    )
                }),
        )
        // No Markdown syntax of its own: written as a quote, read back as one.
        .with_markdown(
            MarkdownParser::new().serialize_with(|_, text| format!("{}\n\n", quote_lines(text))),
        )
}
