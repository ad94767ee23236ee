//! Stock content types for the blockweave engine.
//!
//! Every plugin is a plain [`PluginDescriptor`] constructor; hosts pick the
//! ones they want, optionally [`extend`](PluginDescriptor::extend) them, and
//! hand the list to an editor or renderer.

pub mod action_menu;
pub mod attrs;
pub mod blockquote;
pub mod callout;
pub mod code;
pub mod embed;
pub mod headings;
pub mod image;
pub mod link;
pub mod lists;
pub mod marks;
pub mod media;
pub mod paragraph;
pub mod video;

use blockweave_engine::{ConfigurationError, MarkDescriptor, PluginDescriptor, Registry};

pub use action_menu::{default_action_items, default_action_menu};
pub use blockquote::blockquote;
pub use callout::callout;
pub use code::code;
pub use embed::embed;
pub use headings::{heading_one, heading_three, heading_two};
pub use image::image;
pub use link::link;
pub use lists::{bulleted_list, numbered_list, todo_list};
pub use paragraph::paragraph;
pub use video::video;

/// All stock plugins, Paragraph first so it is the default block type.
pub fn stock_plugins() -> Vec<PluginDescriptor> {
    vec![
        paragraph(),
        blockquote(),
        callout(),
        code(),
        link(),
        numbered_list(),
        bulleted_list(),
        todo_list(),
        heading_one(),
        heading_two(),
        heading_three(),
        embed(),
        image(),
        video(),
    ]
}

pub fn stock_marks() -> Vec<MarkDescriptor> {
    vec![
        marks::bold(),
        marks::italic(),
        marks::code_mark(),
        marks::underline(),
        marks::strike(),
    ]
}

/// Registry over [`stock_plugins`] and [`stock_marks`].
pub fn stock_registry() -> Result<Registry, ConfigurationError> {
    Registry::build(stock_plugins(), stock_marks())
}
