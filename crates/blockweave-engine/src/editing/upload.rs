//! Upload boundary.
//!
//! Plugins that accept files carry an [`UploadFn`] in their options. The
//! transport lives with the host; the engine only tracks progress on the
//! block as an [`UploadState`] stored in its `upload` property:
//!
//! ```text
//! Idle ──begin──▶ Pending ──finish(Ok)──▶ Succeeded
//!                   │   └────finish(Err)─▶ Failed { reason }
//!                   └──cancel──▶ Idle
//! ```
//!
//! A failed upload keeps its block so the user can retry.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::schema::{BlockElement, BlockId};

/// Block property holding the serialized [`UploadState`].
pub const UPLOAD_PROPERTY: &str = "upload";

#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Upload rejected: {0}")]
    Rejected(String),
    #[error("Upload transport failed: {0}")]
    Transport(String),
    #[error("Upload cancelled")]
    Cancelled,
}

pub type UploadFuture = BoxFuture<'static, Result<UploadResult, UploadError>>;

/// Host-provided transport: file in, eventual `{url, width, height}` out.
pub type UploadFn = Arc<dyn Fn(UploadFile) -> UploadFuture + Send + Sync>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum UploadState {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed {
        reason: String,
    },
}

impl UploadState {
    /// State recorded on `block`; missing or unreadable means `Idle`.
    pub fn of(block: &BlockElement) -> UploadState {
        block
            .properties
            .get(UPLOAD_PROPERTY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, UploadState::Pending)
    }

    pub(crate) fn store(&self, block: &mut BlockElement) {
        match serde_json::to_value(self) {
            Ok(value) => {
                block.properties.insert(UPLOAD_PROPERTY.to_string(), value);
            }
            Err(e) => log::error!("Failed to record upload state on {}: {e}", block.id),
        }
    }
}

/// In-flight upload for one block.
///
/// Await it, then hand the [`UploadOutcome`] to `Editor::finish_upload`.
/// Dropping the task abandons the transfer.
pub struct UploadTask {
    block_id: BlockId,
    future: UploadFuture,
}

impl UploadTask {
    pub(crate) fn new(block_id: BlockId, future: UploadFuture) -> Self {
        Self { block_id, future }
    }

    pub fn block_id(&self) -> &BlockId {
        &self.block_id
    }
}

impl fmt::Debug for UploadTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadTask")
            .field("block_id", &self.block_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub block_id: BlockId,
    pub result: Result<UploadResult, UploadError>,
}

impl Future for UploadTask {
    type Output = UploadOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let result = match self.future.as_mut().poll(cx) {
            Poll::Ready(result) => result,
            Poll::Pending => return Poll::Pending,
        };
        Poll::Ready(UploadOutcome {
            block_id: self.block_id.clone(),
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_round_trips_through_block_property() {
        let mut block = BlockElement::new("Image");
        assert_eq!(UploadState::of(&block), UploadState::Idle);

        UploadState::Failed {
            reason: "too big".into(),
        }
        .store(&mut block);
        assert_eq!(
            block.properties[UPLOAD_PROPERTY],
            json!({"state": "failed", "reason": "too big"})
        );
        assert_eq!(
            UploadState::of(&block),
            UploadState::Failed {
                reason: "too big".into()
            }
        );
    }

    #[test]
    fn garbage_state_reads_as_idle() {
        let block = BlockElement::new("Image").with_property(UPLOAD_PROPERTY, "??");
        assert_eq!(UploadState::of(&block), UploadState::Idle);
    }

    #[tokio::test]
    async fn task_resolves_with_block_id() {
        let id = BlockId::from("b1");
        let task = UploadTask::new(
            id.clone(),
            Box::pin(async {
                Ok::<_, UploadError>(UploadResult {
                    url: "u".into(),
                    width: 2,
                    height: 3,
                })
            }),
        );
        let outcome = task.await;
        assert_eq!(outcome.block_id, id);
        assert_eq!(outcome.result.map(|r| r.width), Ok(2));
    }
}
