//! Frame-graph and render-state core.
//!
//! Provides:
//! - `backend`: the narrow device seam the core drives (plus a recording
//!   implementation for tests and headless use)
//! - `state`: state groups, the scoped writer, and the caching executor
//! - `graph`: render tasks, sortable queues, passes and the frame graph
//! - `settings`: constructor-injected renderer configuration

pub mod backend;
pub mod graph;
pub mod settings;
pub mod state;

pub use backend::RenderDevice;
pub use graph::{FrameGraph, PassKind, RenderPass, RenderQueue, RenderTask};
pub use settings::RendererSettings;
pub use state::{RenderStateExecutor, StateGroup, StateGroupWriter};
