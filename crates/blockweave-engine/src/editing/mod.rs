/*!
 * # Editing Core Module
 *
 * The editor owns one [`Document`](crate::schema::Document) and is its single
 * commit point.
 *
 * ## Architecture Overview
 *
 * ### 1. Single Source of Truth: the Document tree
 * - Serialization, rendering and persistence all read the same tree
 * - Markup is produced on demand; it is never the stored form
 *
 * ### 2. Command-Based Editing
 * - Edits are **Commands** (`Cmd` enum) or closures passed to `Editor::commit`
 * - Each committed edit yields a **Patch** (changed block ids, new version)
 * - Each committed edit notifies `on_change` listeners exactly once
 *
 * ### 3. Read API: Immutable Snapshots
 * - `Editor::snapshot` renders the tree through the plugin registry
 * - `Renderer` is the read-only counterpart with no mutation path
 *
 * ### 4. Uploads
 * - Plugins with an upload hook accept files via `Editor::begin_upload`
 * - Progress lives on the block as an `UploadState`
 *
 * ## Module Structure
 *
 * - **`commands`**: `Cmd` enum and how each command rewrites the tree
 * - **`editor`**: `Editor`, `EditorProps`, `Renderer`, `EditorError`
 * - **`patch`**: edit result metadata
 * - **`upload`**: upload hook types and the `UploadState` machine
 *
 * ## Usage Pattern
 *
 * ```rust,ignore
 * use blockweave_engine::editing::*;
 *
 * let mut editor = Editor::new(EditorProps { plugins, marks, ..Default::default() })?;
 * editor.on_change(|doc| println!("{} blocks", doc.len()));
 *
 * let block = editor.new_block("HeadingTwo")?;
 * let id = block.id.clone();
 * editor.apply(Cmd::InsertBlock { at: 0, block })?;
 * editor.apply(Cmd::SetText { id, text: "Title".into() })?;
 *
 * let markdown = editor.serialize(Format::Markdown);
 * ```
 */

pub mod commands;
pub mod editor;
pub mod patch;
pub mod upload;

pub use commands::Cmd;
pub use editor::{Editor, EditorError, EditorProps, Renderer};
pub use patch::Patch;
pub use upload::{
    UploadError, UploadFile, UploadFn, UploadFuture, UploadOutcome, UploadResult, UploadState,
    UploadTask,
};
