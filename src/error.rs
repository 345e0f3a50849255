//! Error types.
//!
//! The node tree and the select overlay never fail loudly: stale references are logged and
//! ignored. Errors only exist at the configuration and render-backend boundaries.

use crate::frame_node::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("theme error: {0}")]
    Theme(#[from] serde_json::Error),

    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

/// Errors that may occur when applying a render patch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("no render node for {0:?}")]
    NoSuchNode(NodeId),

    #[error("render node {0:?} would become its own descendant")]
    Cycle(NodeId),

    #[error("backend error: {0}")]
    Backend(String),
}
