use std::fmt;
use std::sync::Arc;

use super::commands::{Cmd, CmdFailure, apply_cmd};
use super::patch::Patch;
use super::upload::{UploadFile, UploadOutcome, UploadResult, UploadState, UploadTask};
use crate::error::{ConfigurationError, UnknownTypeError};
use crate::io::{IoError, Storage};
use crate::plugin::{NodeKind, PluginDescriptor};
use crate::registry::Registry;
use crate::render::{Snapshot, render_with_placeholder};
use crate::schema::{BlockElement, BlockId, Document, MarkDescriptor};
use crate::serialize::{Format, Serialized, serialize_with_report};

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("Unknown block: {0}")]
    UnknownBlock(BlockId),
    #[error("Block {0} is already in the document")]
    DuplicateBlock(BlockId),
    #[error(transparent)]
    UnknownType(#[from] UnknownTypeError),
    #[error("Unknown plugin type: {0}")]
    UnknownPluginType(String),
    #[error("Invalid range {start}..{end} in block {id}")]
    InvalidRange { id: BlockId, start: usize, end: usize },
    #[error("Plugin {0} does not accept uploads")]
    UploadUnsupported(String),
    #[error("Block {0} already has an upload in progress")]
    UploadInProgress(BlockId),
    /// The edit was applied and announced but could not be stored.
    #[error("Edit applied but not persisted: {0}")]
    Storage(#[from] IoError),
}

impl From<CmdFailure> for EditorError {
    fn from(failure: CmdFailure) -> Self {
        match failure {
            CmdFailure::UnknownBlock(id) => EditorError::UnknownBlock(id),
            CmdFailure::DuplicateBlock(id) => EditorError::DuplicateBlock(id),
            CmdFailure::InvalidRange(id, range) => EditorError::InvalidRange {
                id,
                start: range.start,
                end: range.end,
            },
        }
    }
}

/// Everything an editor is configured with.
#[derive(Default)]
pub struct EditorProps {
    /// Initial document; a persisted value under `persistence_key` wins.
    pub value: Option<Document>,
    pub plugins: Vec<PluginDescriptor>,
    pub marks: Vec<MarkDescriptor>,
    /// Shown on the sole empty block of an otherwise empty document.
    pub placeholder: Option<String>,
    pub persistence_key: Option<String>,
}

type ChangeFn = Box<dyn FnMut(&Document) + Send>;

/// Owner of one document and the single commit point for its edits.
///
/// Every committed edit bumps the version, notifies `on_change` listeners
/// once with the full document and, when a persistence key and storage are
/// configured, stores the document as JSON. A failed store is returned as
/// [`EditorError::Storage`]; the edit itself stays applied and the next
/// successful commit stores it.
pub struct Editor {
    registry: Registry,
    doc: Document,
    version: u64,
    placeholder: Option<String>,
    persistence_key: Option<String>,
    storage: Option<Arc<dyn Storage>>,
    listeners: Vec<ChangeFn>,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("blocks", &self.doc.len())
            .field("version", &self.version)
            .field("persistence_key", &self.persistence_key)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Editor {
    pub fn new(props: EditorProps) -> Result<Self, EditorError> {
        Self::build(props, None)
    }

    /// Like [`Editor::new`], persisting through `storage`.
    pub fn with_storage(props: EditorProps, storage: Arc<dyn Storage>) -> Result<Self, EditorError> {
        Self::build(props, Some(storage))
    }

    fn build(props: EditorProps, storage: Option<Arc<dyn Storage>>) -> Result<Self, EditorError> {
        let registry = Registry::build(props.plugins, props.marks)?;

        let persisted = match (&props.persistence_key, &storage) {
            (Some(key), Some(storage)) => load_persisted(storage.as_ref(), key),
            _ => None,
        };
        let mut doc = persisted.or(props.value).unwrap_or_default();
        if doc.is_empty() {
            doc.blocks.push(empty_block(&registry, registry.default_block_type()));
        }
        for unknown in registry.check(&doc) {
            log::warn!("{unknown}; it will render as a fallback");
        }

        Ok(Self {
            registry,
            doc,
            version: 0,
            placeholder: props.placeholder,
            persistence_key: props.persistence_key,
            storage,
            listeners: Vec::new(),
        })
    }

    pub fn on_change(&mut self, listener: impl FnMut(&Document) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// An empty block of a registered type, carrying its default props.
    pub fn new_block(&self, plugin_type: &str) -> Result<BlockElement, EditorError> {
        if !self.registry.contains(plugin_type) {
            return Err(EditorError::UnknownPluginType(plugin_type.to_string()));
        }
        Ok(empty_block(&self.registry, plugin_type))
    }

    pub fn apply(&mut self, cmd: Cmd) -> Result<Patch, EditorError> {
        if let Cmd::InsertBlock { block, .. } = &cmd
            && !self.registry.contains(&block.plugin_type)
        {
            return Err(UnknownTypeError {
                id: block.id.clone(),
                plugin_type: block.plugin_type.clone(),
            }
            .into());
        }
        log::debug!("apply {cmd:?}");
        let id = apply_cmd(&mut self.doc, cmd)?;
        self.committed(vec![id])
    }

    /// Run an arbitrary edit against the document as one commit.
    pub fn commit(&mut self, edit: impl FnOnce(&mut Document)) -> Result<Patch, EditorError> {
        let before = self.doc.clone();
        edit(&mut self.doc);
        for block in &mut self.doc.blocks {
            block.normalize_children();
        }
        let changed = changed_blocks(&before, &self.doc);
        self.committed(changed)
    }

    fn committed(&mut self, changed: Vec<BlockId>) -> Result<Patch, EditorError> {
        self.version += 1;
        for listener in &mut self.listeners {
            listener(&self.doc);
        }
        self.persist()?;
        Ok(Patch {
            changed,
            version: self.version,
        })
    }

    fn persist(&self) -> Result<(), IoError> {
        let (Some(key), Some(storage)) = (&self.persistence_key, &self.storage) else {
            return Ok(());
        };
        let json = self
            .doc
            .to_json()
            .map_err(|e| IoError::Unavailable(format!("cannot encode document: {e}")))?;
        storage.store(key, &json).inspect_err(|e| {
            log::error!("Failed to persist document under {key}: {e}");
        })
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot =
            render_with_placeholder(&self.doc, &self.registry, self.placeholder.as_deref());
        snapshot.version = self.version;
        snapshot
    }

    pub fn serialize(&self, format: Format) -> String {
        self.serialize_with_report(format).output
    }

    pub fn serialize_with_report(&self, format: Format) -> Serialized {
        serialize_with_report(&self.doc, &self.registry, format)
    }

    /// Start an upload into `id` through its plugin's upload hook.
    ///
    /// The block is marked `Pending` (one commit) and the returned task
    /// resolves to the outcome for [`Editor::finish_upload`]. When the
    /// pending state cannot be stored no upload starts and the block stays
    /// `Pending` until [`Editor::cancel_upload`].
    pub fn begin_upload(&mut self, id: &BlockId, file: UploadFile) -> Result<UploadTask, EditorError> {
        let block = self
            .doc
            .block(id)
            .ok_or_else(|| EditorError::UnknownBlock(id.clone()))?;
        let plugin = self
            .registry
            .plugin(&block.plugin_type)
            .ok_or_else(|| UnknownTypeError {
                id: id.clone(),
                plugin_type: block.plugin_type.clone(),
            })?;
        let hook = plugin
            .upload()
            .cloned()
            .ok_or_else(|| EditorError::UploadUnsupported(block.plugin_type.clone()))?;
        if UploadState::of(block).is_pending() {
            return Err(EditorError::UploadInProgress(id.clone()));
        }

        log::debug!("Uploading {} into {id}", file.name);
        self.set_upload_state(id, UploadState::Pending, None)?;
        Ok(UploadTask::new(id.clone(), hook(file)))
    }

    /// Record an upload outcome. Outcomes for blocks that are no longer
    /// pending (cancelled, removed) are dropped.
    pub fn finish_upload(&mut self, outcome: UploadOutcome) -> Result<Patch, EditorError> {
        let UploadOutcome { block_id, result } = outcome;
        let block = self
            .doc
            .block(&block_id)
            .ok_or_else(|| EditorError::UnknownBlock(block_id.clone()))?;
        if !UploadState::of(block).is_pending() {
            log::debug!("Ignoring stale upload outcome for {block_id}");
            return Ok(Patch {
                changed: Vec::new(),
                version: self.version,
            });
        }

        match result {
            Ok(uploaded) => self.set_upload_state(&block_id, UploadState::Succeeded, Some(uploaded)),
            Err(e) => {
                log::warn!("Upload into {block_id} failed: {e}");
                self.set_upload_state(
                    &block_id,
                    UploadState::Failed {
                        reason: e.to_string(),
                    },
                    None,
                )
            }
        }
    }

    /// Return a pending block to `Idle`.
    pub fn cancel_upload(&mut self, id: &BlockId) -> Result<Patch, EditorError> {
        let block = self
            .doc
            .block(id)
            .ok_or_else(|| EditorError::UnknownBlock(id.clone()))?;
        if !UploadState::of(block).is_pending() {
            return Ok(Patch {
                changed: Vec::new(),
                version: self.version,
            });
        }
        self.set_upload_state(id, UploadState::Idle, None)
    }

    fn set_upload_state(
        &mut self,
        id: &BlockId,
        state: UploadState,
        uploaded: Option<UploadResult>,
    ) -> Result<Patch, EditorError> {
        self.commit(|doc| {
            if let Some(block) = doc.block_mut(id) {
                state.store(block);
                if let Some(uploaded) = uploaded {
                    block
                        .properties
                        .insert("url".into(), uploaded.url.into());
                    block
                        .properties
                        .insert("width".into(), uploaded.width.into());
                    block
                        .properties
                        .insert("height".into(), uploaded.height.into());
                }
            }
        })
    }
}

fn empty_block(registry: &Registry, plugin_type: &str) -> BlockElement {
    let mut block = BlockElement::new(plugin_type);
    if let Some(plugin) = registry.plugin(plugin_type) {
        block.properties = plugin.default_props();
    }
    block
}

fn load_persisted(storage: &dyn Storage, key: &str) -> Option<Document> {
    match storage.load(key) {
        Ok(Some(json)) => match Document::from_json(&json) {
            Ok(doc) => Some(doc),
            Err(e) => {
                log::warn!("Ignoring unreadable persisted document {key}: {e}");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            log::error!("Failed to load persisted document {key}: {e}");
            None
        }
    }
}

fn changed_blocks(before: &Document, after: &Document) -> Vec<BlockId> {
    let mut changed: Vec<BlockId> = after
        .blocks
        .iter()
        .enumerate()
        .filter(|(idx, block)| before.blocks.get(*idx) != Some(*block))
        .map(|(_, block)| block.id.clone())
        .collect();
    changed.extend(
        before
            .blocks
            .iter()
            .filter(|b| after.block(&b.id).is_none())
            .map(|b| b.id.clone()),
    );
    changed
}

/// Read-only counterpart of [`Editor`]: renders a fixed document.
#[derive(Debug, Clone)]
pub struct Renderer {
    registry: Registry,
    data: Document,
}

impl Renderer {
    pub fn new(
        plugins: Vec<PluginDescriptor>,
        marks: Vec<MarkDescriptor>,
        data: Document,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            registry: Registry::build(plugins, marks)?,
            data,
        })
    }

    pub fn document(&self) -> &Document {
        &self.data
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn snapshot(&self) -> Snapshot {
        crate::render::render(&self.data, &self.registry)
    }

    /// Block plugins in registration order, for read-only hosts that list
    /// what a document may contain.
    pub fn block_types(&self) -> impl Iterator<Item = &str> {
        self.registry
            .plugins()
            .iter()
            .filter(|p| p.node_kind() == NodeKind::Block)
            .map(PluginDescriptor::plugin_type)
    }
}
