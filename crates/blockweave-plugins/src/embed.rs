//! Embedded third-party players (`<iframe>`).
//!
//! Page URLs pasted by users are rewritten to the provider's player URL, and
//! the provider name is kept as a property so Markdown output can label the
//! link.

use blockweave_engine::{ElementSpec, HtmlParser, MarkdownParser, PluginDescriptor, RenderNode};
use serde_json::Value;

use crate::attrs::{attr, attrs_to_props, number_attr};
use crate::media::{MAX_HEIGHT, MAX_WIDTH, fit, with_size};

pub const EMBED: &str = "Embed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    YouTube,
    Vimeo,
    Dailymotion,
    Figma,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Provider::YouTube => "youtube",
            Provider::Vimeo => "vimeo",
            Provider::Dailymotion => "dailymotion",
            Provider::Figma => "figma",
        }
    }

    /// Recognise the provider from a page or player URL.
    pub fn detect(url: &str) -> Option<Provider> {
        let host = host_of(url)?;
        let host = host.strip_prefix("www.").unwrap_or(host);
        match host {
            "youtube.com" | "m.youtube.com" | "youtu.be" | "youtube-nocookie.com" => {
                Some(Provider::YouTube)
            }
            "vimeo.com" | "player.vimeo.com" => Some(Provider::Vimeo),
            "dailymotion.com" | "dai.ly" => Some(Provider::Dailymotion),
            "figma.com" => Some(Provider::Figma),
            _ => None,
        }
    }
}

/// The URL to load in the iframe for `url`. Unknown URLs pass through.
pub fn player_url(url: &str) -> String {
    let Some(provider) = Provider::detect(url) else {
        return url.to_string();
    };
    let path = path_of(url);
    let rewritten = match provider {
        Provider::YouTube => {
            if path.starts_with("/embed/") {
                None
            } else if let Some(id) = query_param(url, "v") {
                Some(format!("https://www.youtube.com/embed/{id}"))
            } else {
                first_segment(path).map(|id| format!("https://www.youtube.com/embed/{id}"))
            }
        }
        Provider::Vimeo => {
            if host_of(url) == Some("player.vimeo.com") {
                None
            } else {
                first_segment(path)
                    .filter(|id| id.bytes().all(|b| b.is_ascii_digit()))
                    .map(|id| format!("https://player.vimeo.com/video/{id}"))
            }
        }
        Provider::Dailymotion => path
            .strip_prefix("/video/")
            .or_else(|| first_segment(path))
            .filter(|id| !id.is_empty() && !path.starts_with("/embed/"))
            .map(|id| format!("https://www.dailymotion.com/embed/video/{id}")),
        Provider::Figma => Some(format!(
            "https://www.figma.com/embed?embed_host=blockweave&url={url}"
        ))
        .filter(|_| !path.starts_with("/embed")),
    };
    rewritten.unwrap_or_else(|| url.to_string())
}

fn host_of(url: &str) -> Option<&str> {
    let rest = url.split_once("://").map(|(_, rest)| rest)?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let host = &rest[..end];
    Some(host.rsplit_once('@').map(|(_, h)| h).unwrap_or(host))
}

fn path_of(url: &str) -> &str {
    let Some((_, rest)) = url.split_once("://") else {
        return "";
    };
    let Some(start) = rest.find('/') else {
        return "";
    };
    let path = &rest[start..];
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

fn first_segment(path: &str) -> Option<&str> {
    path.trim_start_matches('/')
        .split('/')
        .next()
        .filter(|s| !s.is_empty())
}

fn query_param<'a>(url: &'a str, key: &str) -> Option<&'a str> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or_default();
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key && !v.is_empty()).then_some(v)
    })
}

pub fn embed() -> PluginDescriptor {
    PluginDescriptor::new(EMBED)
        .with_element(
            "embed",
            ElementSpec::block(|props| {
                let el = props.element;
                let src = el.property_str("url").map(player_url).unwrap_or_default();
                let iframe = RenderNode::element("iframe", vec![])
                    .with_attr("src", src)
                    .with_attr("frameborder", "0")
                    .with_attr("allowfullscreen", "");
                let iframe = with_size(iframe, fit(&el, props.options));
                RenderNode::element("div", vec![iframe]).with_attr("class", "blockweave-embed")
            }),
        )
        .with_display("Embed", "Embed from YouTube, Vimeo...")
        .with_search_string("Embed media")
        .with_custom(MAX_WIDTH, 650)
        .with_custom(MAX_HEIGHT, 550)
        .with_html(
            HtmlParser::new()
                .match_tags(&["iframe"])
                .parse_with(|el| {
                    let mut props =
                        attrs_to_props(el, &[("src", "url"), ("width", "width"), ("height", "height")]);
                    let provider = el.attr("src").and_then(Provider::detect);
                    if let Some(provider) = provider {
                        props.insert("provider".into(), Value::from(provider.name()));
                    }
                    props
                })
                .serialize_with(|el, _| {
                    let src = el.property_str("url").map(player_url);
                    format!(
                        "<iframe{}{}{} frameborder=\"0\" allowfullscreen></iframe>",
                        attr("src", src.as_deref()),
                        number_attr("width", el.property_u64("width")),
                        number_attr("height", el.property_u64("height")),
                    )
                }),
        )
        .with_markdown(MarkdownParser::new().serialize_with(|el, _| {
            let label = el.property_str("provider").unwrap_or("embed");
            let url = el.property_str("url").unwrap_or_default();
            format!("[{label}]({url})\n\n")
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=1",
        "https://www.youtube.com/embed/dQw4w9WgXcQ"
    )]
    #[case("https://youtu.be/dQw4w9WgXcQ", "https://www.youtube.com/embed/dQw4w9WgXcQ")]
    #[case(
        "https://www.youtube.com/embed/dQw4w9WgXcQ",
        "https://www.youtube.com/embed/dQw4w9WgXcQ"
    )]
    #[case("https://vimeo.com/76979871", "https://player.vimeo.com/video/76979871")]
    #[case(
        "https://www.dailymotion.com/video/x7tgad0",
        "https://www.dailymotion.com/embed/video/x7tgad0"
    )]
    #[case("https://example.com/page", "https://example.com/page")]
    fn player_urls(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(player_url(input), expected);
    }

    #[test]
    fn detects_provider_from_host() {
        assert_eq!(
            Provider::detect("https://m.youtube.com/watch?v=x"),
            Some(Provider::YouTube)
        );
        assert_eq!(Provider::detect("https://player.vimeo.com/video/1"), Some(Provider::Vimeo));
        assert_eq!(Provider::detect("not a url"), None);
    }
}
