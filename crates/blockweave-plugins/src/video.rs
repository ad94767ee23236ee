use blockweave_engine::html::HtmlElement;
use blockweave_engine::{ElementSpec, HtmlParser, MarkdownParser, PluginDescriptor, RenderNode};
use serde_json::Value;

use crate::attrs::{attr, attrs_to_props, media_source, number_attr};
use crate::media::{ACCEPT, MAX_HEIGHT, MAX_WIDTH, fit, upload_status, with_size};

pub const VIDEO: &str = "Video";

/// Hosted video file. Markdown has no video syntax, so it is written as a
/// link and reads back as a paragraph.
pub fn video() -> PluginDescriptor {
    PluginDescriptor::new(VIDEO)
        .with_element(
            "video",
            ElementSpec::block(|props| {
                if let Some(status) = upload_status(&props.element) {
                    return status;
                }
                let el = props.element;
                let video = RenderNode::element("video", vec![])
                    .with_attr("src", media_source(&el).unwrap_or_default())
                    .with_attr("controls", "");
                let video = with_size(video, fit(&el, props.options));
                RenderNode::element("div", vec![video]).with_attr("class", "blockweave-video")
            }),
        )
        .with_display("Video", "Embed from YouTube, Vimeo...")
        .with_search_string("video media")
        .with_custom(MAX_WIDTH, 650)
        .with_custom(MAX_HEIGHT, 550)
        .with_custom(ACCEPT, "video/*")
        .with_html(
            HtmlParser::new()
                .match_tags(&["video"])
                .parse_with(|el| {
                    let mut props =
                        attrs_to_props(el, &[("src", "src"), ("width", "width"), ("height", "height")]);
                    if !props.contains_key("src")
                        && let Some(src) = source_child(el)
                    {
                        props.insert("src".into(), Value::from(src));
                    }
                    props
                })
                .serialize_with(|el, _| {
                    format!(
                        "<video{}{}{} controls></video>",
                        attr("src", media_source(&el)),
                        number_attr("width", el.property_u64("width")),
                        number_attr("height", el.property_u64("height")),
                    )
                }),
        )
        .with_markdown(MarkdownParser::new().serialize_with(|el, _| {
            let src = media_source(&el).unwrap_or_default();
            format!("[video]({src})\n\n")
        }))
}

/// `<video><source src="..."></video>`
fn source_child(el: &HtmlElement) -> Option<&str> {
    el.element_children()
        .filter(|child| child.name == "source")
        .find_map(|child| child.attr("src"))
}
