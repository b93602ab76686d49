//! Frame graph.
//!
//! Provides:
//! - [`RenderTask`]: one fully-merged, pass-agnostic draw instruction
//! - [`SortKey`]: 64-bit draw-order key (layer > blend > shader/depth)
//! - [`RenderQueue`]: sortable task collection submitted to one pass
//! - [`RenderPass`]: a named stage with its own framebuffer and queue
//! - [`FrameGraph`]: the fixed pass set, built once in dependency order
//! - [`FrameContext`]: per-frame inbound data from the game loop
//! - `shadow_utils`: cascade split and light-matrix math

pub mod composer;
pub mod context;
pub mod key;
pub mod pass;
pub mod queue;
pub mod shadow_utils;
pub mod task;

pub use composer::FrameGraph;
pub use context::{CameraSlice, FrameContext};
pub use key::SortKey;
pub use pass::{BlitTarget, PassKind, PassStatus, RenderPass};
pub use queue::RenderQueue;
pub use task::RenderTask;
