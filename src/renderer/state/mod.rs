//! Render state representation.
//!
//! - [`StateGroup`]: immutable bundle of pipeline flags and resource bindings
//! - [`StateGroupWriter`]: scoped builder with semantic texture-slot routing
//! - [`RenderStateExecutor`]: cached diffing against the device

pub mod executor;
pub mod group;
pub mod writer;

pub use executor::RenderStateExecutor;
pub use group::{FullscreenLayer, PipelineState, RenderLayer, ResourceState, StateGroup};
pub use writer::StateGroupWriter;
