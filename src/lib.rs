#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod errors;
pub mod renderer;

pub use errors::{RenderError, Result};
pub use renderer::backend::recording::{RecordedCommand, RecordingDevice};
pub use renderer::backend::{
    BlendMode, BufferHandle, ClearFlags, DepthStencilFlags, DrawCall, Extent, FaceCullFlags,
    FramebufferHandle, PrimitiveTopology, RenderDevice, ShaderHandle, TextureHandle, TextureRef,
    TextureSemantic, TextureSlot, UniformSlot, VertexBufferHandle,
};
pub use renderer::graph::{
    BlitTarget, CameraSlice, FrameContext, FrameGraph, PassKind, PassStatus, RenderPass,
    RenderQueue, RenderTask, SortKey,
};
pub use renderer::settings::RendererSettings;
pub use renderer::state::{
    FullscreenLayer, PipelineState, RenderLayer, RenderStateExecutor, ResourceState, StateGroup,
    StateGroupWriter,
};
