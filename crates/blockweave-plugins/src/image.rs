use blockweave_engine::{
    ElementSpec, HtmlParser, MarkdownNode, MarkdownParser, PluginDescriptor, RenderNode,
};

use crate::attrs::{attr, attrs_to_props, media_source, number_attr};
use crate::media::{ACCEPT, MAX_HEIGHT, MAX_WIDTH, fit, upload_status, with_size};

pub const IMAGE: &str = "Image";

/// Image block. Hosts enable uploads by extending it with an upload hook;
/// a finished upload stores `url`, `width` and `height` on the block.
pub fn image() -> PluginDescriptor {
    PluginDescriptor::new(IMAGE)
        .with_element(
            "image",
            ElementSpec::block(|props| {
                if let Some(status) = upload_status(&props.element) {
                    return status;
                }
                let el = props.element;
                let mut img = RenderNode::element("img", vec![])
                    .with_attr("src", media_source(&el).unwrap_or_default());
                if let Some(alt) = el.property_str("alt") {
                    img = img.with_attr("alt", alt);
                }
                let img = with_size(img, fit(&el, props.options));
                RenderNode::element("div", vec![img]).with_attr("class", "blockweave-image")
            }),
        )
        .with_display("Image", "Upload or embed with a link.")
        .with_search_string("image picture")
        .with_custom(MAX_WIDTH, 650)
        .with_custom(MAX_HEIGHT, 550)
        .with_custom(ACCEPT, "image/*")
        .with_html(
            HtmlParser::new()
                .match_tags(&["img"])
                .parse_with(|el| {
                    attrs_to_props(
                        el,
                        &[
                            ("src", "src"),
                            ("alt", "alt"),
                            ("width", "width"),
                            ("height", "height"),
                        ],
                    )
                })
                .serialize_with(|el, _| {
                    format!(
                        "<img{}{}{}{}>",
                        attr("src", media_source(&el)),
                        attr("alt", el.property_str("alt")),
                        number_attr("width", el.property_u64("width")),
                        number_attr("height", el.property_u64("height")),
                    )
                }),
        )
        .with_markdown(
            MarkdownParser::new()
                .match_nodes(&[MarkdownNode::Image])
                .serialize_with(|el, _| {
                    let alt = el.property_str("alt").unwrap_or_default();
                    let src = media_source(&el).unwrap_or_default();
                    format!("![{}]({src})\n\n", alt.replace(['[', ']'], ""))
                }),
        )
}
