use crate::schema::{BlockId, Mark};
use crate::serialize::Format;

/// Invalid plugin or mark configuration, reported when the registry is built
/// and before any document is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Duplicate plugin type: {0}")]
    DuplicateType(String),
    #[error("Plugin type must not be empty")]
    EmptyType,
    #[error("Plugin {0} declares no elements")]
    MissingElements(String),
    #[error("Duplicate mark descriptor: {0}")]
    DuplicateMark(Mark),
}

/// A block references a type the registry does not know.
///
/// Recovered by rendering or serializing a fallback; never aborts the document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Block {id} has unknown type {plugin_type}")]
pub struct UnknownTypeError {
    pub id: BlockId,
    pub plugin_type: String,
}

/// No active plugin supports the requested format; output degrades to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("No registered plugin supports {format} output")]
pub struct UnsupportedFormatError {
    pub format: Format,
}
