//! A frame node tree with text selection overlays.
//!
//! Frame nodes live in a [`FrameTree`] owned by a [`PipelineContext`]. Each node carries a
//! [`Pattern`] that decides how it lays out, paints, and reacts to gestures. The pipeline runs
//! tasks, layout, and paint once per frame, and a [`Host`] mirrors the result into a
//! [`RenderTree`] backed by a native [`RenderBackend`].
//!
//! The [`select_overlay`] module implements text selection handles and the selection menu on top
//! of that.

#[macro_use]
mod pattern;

pub mod accessibility;
pub mod animation;
pub mod backend;
pub mod canvas;
pub mod color;
pub mod error;
pub mod event_hub;
pub mod events;
pub mod frame_node;
pub mod frame_tree;
pub mod geometry_node;
mod host;
pub mod layout;
pub mod paint;
pub mod pipeline;
pub mod rect;
pub mod render_context;
pub mod render_tree;
pub mod select_overlay;
pub mod task;
pub mod theme;

pub use crate::backend::RenderBackend;
pub use crate::error::{Error, RenderError};
pub use crate::frame_node::{tags, FrameNode, NodeId, PropertyChangeFlag};
pub use crate::frame_tree::FrameTree;
pub use crate::host::Host;
pub use crate::pattern::{EmptyPattern, LinearLayoutPattern, Pattern};
pub use crate::pipeline::{PipelineConfig, PipelineContext};
pub use crate::render_tree::{RenderPatch, RenderTree};
pub use crate::theme::{Dimension, Theme};
