//! Pieces shared by the Image, Video and Embed plugins.

use blockweave_engine::editing::UploadState;
use blockweave_engine::{ElementRef, PluginOptions, RenderNode};

use crate::attrs::media_source;

/// Custom option keys read at render time.
pub const MAX_WIDTH: &str = "maxWidth";
pub const MAX_HEIGHT: &str = "maxHeight";
pub const ACCEPT: &str = "accept";

/// `(width, height)` scaled down to fit the plugin's `maxWidth` and
/// `maxHeight` options, keeping the aspect ratio.
pub fn fit(el: &ElementRef<'_>, options: &PluginOptions) -> (Option<u64>, Option<u64>) {
    let (Some(width), Some(height)) = (el.property_u64("width"), el.property_u64("height")) else {
        return (el.property_u64("width"), el.property_u64("height"));
    };
    let limit = |key: &str| options.custom.get(key).and_then(|v| v.as_u64());
    let mut scale = 1.0_f64;
    if let Some(max) = limit(MAX_WIDTH).filter(|max| width > *max) {
        scale = scale.min(max as f64 / width as f64);
    }
    if let Some(max) = limit(MAX_HEIGHT).filter(|max| height > *max) {
        scale = scale.min(max as f64 / height as f64);
    }
    (
        Some((width as f64 * scale).round() as u64),
        Some((height as f64 * scale).round() as u64),
    )
}

/// Rendered in place of the media while an upload is pending or after it
/// failed. `None` when the block has something to show.
pub fn upload_status(el: &ElementRef<'_>) -> Option<RenderNode> {
    let ElementRef::Block(block) = el else {
        return None;
    };
    match UploadState::of(block) {
        UploadState::Pending => Some(
            RenderNode::element("div", vec![RenderNode::text("Uploading…")])
                .with_attr("class", "blockweave-upload")
                .with_attr("data-state", "pending"),
        ),
        UploadState::Failed { reason } if media_source(el).is_none() => Some(
            RenderNode::element("div", vec![RenderNode::text(format!("Upload failed: {reason}"))])
                .with_attr("class", "blockweave-upload")
                .with_attr("data-state", "failed"),
        ),
        _ => None,
    }
}

/// Sets `width`/`height` attributes on a rendered media node.
pub fn with_size(mut node: RenderNode, size: (Option<u64>, Option<u64>)) -> RenderNode {
    if let Some(width) = size.0 {
        node = node.with_attr("width", width.to_string());
    }
    if let Some(height) = size.1 {
        node = node.with_attr("height", height.to_string());
    }
    node
}
