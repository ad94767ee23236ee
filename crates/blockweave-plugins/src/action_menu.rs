//! The default slash-menu entries, one per stock block plugin.

use blockweave_engine::{ActionMenuIndex, ActionMenuItem};

use crate::{blockquote, callout, code, embed, headings, image, lists, paragraph, video};

pub fn default_action_items() -> Vec<ActionMenuItem> {
    vec![
        ActionMenuItem::new(paragraph::PARAGRAPH, "Paragraph")
            .with_description("Just start writing with plain text.")
            .with_icon("/text.png")
            .with_search_string("text paragraph"),
        ActionMenuItem::new(headings::HEADING_ONE, "Heading 1")
            .with_description("Big section heading.")
            .with_icon("/header.png")
            .with_search_string("h1 title"),
        ActionMenuItem::new(headings::HEADING_TWO, "Heading 2")
            .with_description("Medium section heading.")
            .with_icon("/subheader.png")
            .with_search_string("h2 subtitle"),
        ActionMenuItem::new(headings::HEADING_THREE, "Heading 3")
            .with_description("Small section heading.")
            .with_icon("/subsubheader.png")
            .with_search_string("h3 subsubtitle small heading"),
        ActionMenuItem::new(image::IMAGE, "Image")
            .with_description("Upload or embed with a link.")
            .with_icon("/image.png")
            .with_search_string("image picture"),
        ActionMenuItem::new(video::VIDEO, "Video")
            .with_description("Embed from YouTube, Vimeo...")
            .with_icon("/video.png")
            .with_search_string("video media"),
        ActionMenuItem::new(embed::EMBED, "Embed")
            .with_description("Embed from YouTube, Vimeo...")
            .with_icon("/video.png")
            .with_search_string("Embed media"),
        ActionMenuItem::new(blockquote::BLOCKQUOTE, "Blockquote")
            .with_description("Capture a quote")
            .with_icon("/text.png"),
        ActionMenuItem::new(callout::CALLOUT, "Callout")
            .with_description("Just start writing with plain text.")
            .with_icon("/text.png"),
        ActionMenuItem::new(code::CODE, "Code")
            .with_description("Write bugs.")
            .with_icon("/text.png")
            .with_search_string("hello world bug"),
        ActionMenuItem::new(lists::BULLETED_LIST, "BulletedList")
            .with_description("Just start writing with plain text.")
            .with_icon("/text.png"),
        ActionMenuItem::new(lists::NUMBERED_LIST, "NumberedList")
            .with_description("Just start writing with plain text.")
            .with_icon("/text.png"),
        ActionMenuItem::new(lists::TODO_LIST, "TodoList")
            .with_description("Just start writing with plain text.")
            .with_icon("/text.png")
            .with_search_string("todo check list"),
    ]
}

pub fn default_action_menu() -> ActionMenuIndex {
    ActionMenuIndex::from_items(default_action_items())
}
