use crate::schema::BlockId;

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Blocks inserted, removed, moved or modified by the edit.
    pub changed: Vec<BlockId>,
    pub version: u64,
}

impl Patch {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }
}
