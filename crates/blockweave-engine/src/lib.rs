pub mod action_menu;
pub mod deserialize;
pub mod editing;
pub mod error;
pub mod html;
pub mod io;
pub mod plugin;
pub mod registry;
pub mod render;
pub mod schema;
pub mod serialize;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use action_menu::{ActionMenuIndex, ActionMenuItem};
pub use deserialize::{deserialize, deserialize_html, deserialize_markdown};
pub use editing::{Cmd, Editor, EditorError, EditorProps, Patch, Renderer};
pub use error::{ConfigurationError, UnknownTypeError, UnsupportedFormatError};
pub use io::{FileStorage, IoError, MemoryStorage, Storage};
pub use plugin::*;
pub use registry::{Registry, RegistryWarning};
pub use render::{RenderBlock, RenderNode, RenderProps, Snapshot, render};
pub use schema::*;
pub use serialize::{
    Format, SerializeIssue, Serialized, serialize, serialize_html, serialize_markdown,
    serialize_with_report,
};
