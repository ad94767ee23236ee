use std::ops::Range;

use crate::schema::{BlockElement, BlockId, Child, Document, Mark, Properties, TextLeaf};

/// Edit commands. Every edit to an editor's document is one of these or a
/// closure passed to `Editor::commit`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    /// Insert `block` before position `at` (clamped to the end). Its id must
    /// not already be in the document.
    InsertBlock { at: usize, block: BlockElement },
    RemoveBlock { id: BlockId },
    /// Move a block to position `to` (clamped to the end).
    MoveBlock { id: BlockId, to: usize },
    /// Replace a block's children with one unmarked leaf.
    SetText { id: BlockId, text: String },
    /// Merge `properties` over the block's properties.
    SetProperties { id: BlockId, properties: Properties },
    /// Toggle `mark` over a byte range of the block's text. The mark is
    /// removed when every character in the range already has it.
    ToggleMark {
        id: BlockId,
        range: Range<usize>,
        mark: Mark,
    },
}

impl Cmd {
    /// The block this command targets.
    pub fn block_id(&self) -> &BlockId {
        match self {
            Cmd::InsertBlock { block, .. } => &block.id,
            Cmd::RemoveBlock { id }
            | Cmd::MoveBlock { id, .. }
            | Cmd::SetText { id, .. }
            | Cmd::SetProperties { id, .. }
            | Cmd::ToggleMark { id, .. } => id,
        }
    }
}

/// Why a command could not be applied to a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CmdFailure {
    UnknownBlock(BlockId),
    DuplicateBlock(BlockId),
    InvalidRange(BlockId, Range<usize>),
}

/// Apply `cmd` to `doc`, leaving it untouched on failure.
pub(crate) fn apply_cmd(doc: &mut Document, cmd: Cmd) -> Result<BlockId, CmdFailure> {
    match cmd {
        Cmd::InsertBlock { at, mut block } => {
            if doc.position(&block.id).is_some() {
                return Err(CmdFailure::DuplicateBlock(block.id));
            }
            block.normalize_children();
            let id = block.id.clone();
            let at = at.min(doc.blocks.len());
            doc.blocks.insert(at, block);
            Ok(id)
        }
        Cmd::RemoveBlock { id } => {
            let pos = doc
                .position(&id)
                .ok_or_else(|| CmdFailure::UnknownBlock(id.clone()))?;
            doc.blocks.remove(pos);
            Ok(id)
        }
        Cmd::MoveBlock { id, to } => {
            let pos = doc
                .position(&id)
                .ok_or_else(|| CmdFailure::UnknownBlock(id.clone()))?;
            let block = doc.blocks.remove(pos);
            let to = to.min(doc.blocks.len());
            doc.blocks.insert(to, block);
            Ok(id)
        }
        Cmd::SetText { id, text } => {
            let block = doc
                .block_mut(&id)
                .ok_or_else(|| CmdFailure::UnknownBlock(id.clone()))?;
            block.children = vec![TextLeaf::plain(text).into()];
            block.normalize_children();
            Ok(id)
        }
        Cmd::SetProperties { id, properties } => {
            let block = doc
                .block_mut(&id)
                .ok_or_else(|| CmdFailure::UnknownBlock(id.clone()))?;
            for (key, value) in properties {
                match block.properties.get_mut(&key) {
                    Some(existing) => crate::plugin::extend::merge_value(existing, value),
                    None => {
                        block.properties.insert(key, value);
                    }
                }
            }
            Ok(id)
        }
        Cmd::ToggleMark { id, range, mark } => {
            let block = doc
                .block_mut(&id)
                .ok_or_else(|| CmdFailure::UnknownBlock(id.clone()))?;
            if !toggle_mark(block, range.clone(), mark) {
                return Err(CmdFailure::InvalidRange(id, range));
            }
            Ok(id)
        }
    }
}

fn toggle_mark(block: &mut BlockElement, range: Range<usize>, mark: Mark) -> bool {
    let text = block.text();
    if range.start >= range.end
        || range.end > text.len()
        || !text.is_char_boundary(range.start)
        || !text.is_char_boundary(range.end)
    {
        return false;
    }

    let mut offset = 0;
    let mut covered = true;
    for leaf in block.children.iter().flat_map(child_leaves) {
        let span = offset..offset + leaf.text.len();
        offset = span.end;
        if span.start < range.end && range.start < span.end && !leaf.marks.contains(mark) {
            covered = false;
        }
    }
    let add = !covered;

    let mut offset = 0;
    let children = std::mem::take(&mut block.children);
    for child in children {
        match child {
            Child::Text(leaf) => {
                for piece in split_leaf(leaf, &mut offset, &range, mark, add) {
                    block.children.push(piece.into());
                }
            }
            Child::Inline(mut inline) => {
                inline.children = std::mem::take(&mut inline.children)
                    .into_iter()
                    .flat_map(|leaf| split_leaf(leaf, &mut offset, &range, mark, add))
                    .collect();
                block.children.push(inline.into());
            }
        }
    }
    block.normalize_children();
    true
}

fn child_leaves(child: &Child) -> Vec<&TextLeaf> {
    match child {
        Child::Text(leaf) => vec![leaf],
        Child::Inline(inline) => inline.children.iter().collect(),
    }
}

/// Split `leaf` (starting at `*offset`) around `range`, setting or clearing
/// `mark` on the overlapping part.
fn split_leaf(
    leaf: TextLeaf,
    offset: &mut usize,
    range: &Range<usize>,
    mark: Mark,
    add: bool,
) -> Vec<TextLeaf> {
    let start = *offset;
    let end = start + leaf.text.len();
    *offset = end;

    let lo = range.start.max(start);
    let hi = range.end.min(end);
    if lo >= hi {
        return vec![leaf];
    }

    let mut marks = leaf.marks;
    if add {
        marks.insert(mark);
    } else {
        marks.remove(mark);
    }

    let (lo, hi) = (lo - start, hi - start);
    [
        TextLeaf::marked(&leaf.text[..lo], leaf.marks),
        TextLeaf::marked(&leaf.text[lo..hi], marks),
        TextLeaf::marked(&leaf.text[hi..], leaf.marks),
    ]
    .into_iter()
    .filter(|piece| !piece.text.is_empty())
    .collect()
}
