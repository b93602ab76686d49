//! Cached state execution.
//!
//! [`RenderStateExecutor`] is the single source of truth for what is
//! currently bound on the device. Every application compares against the
//! cache and calls through only on change, so a queue of ten thousand draws
//! sharing a shader costs one shader bind, not ten thousand.

use log::trace;

use crate::renderer::backend::{
    BlendMode, BufferHandle, ClearFlags, DepthStencilFlags, DrawCall, FaceCullFlags, RenderDevice,
    ShaderHandle, TextureHandle, TextureSlot, UniformSlot, VertexBufferHandle, TEXTURE_SLOT_COUNT,
    UNIFORM_SLOT_COUNT,
};

use super::group::{PipelineState, ResourceState, StateGroup};

/// Diffs requested state against the cached device state and applies only
/// the deltas. Draws are never deduplicated.
pub struct RenderStateExecutor {
    blend_mode: BlendMode,
    depth_stencil: DepthStencilFlags,
    face_cull: FaceCullFlags,
    clear_flags: ClearFlags,
    shader: Option<ShaderHandle>,
    textures: [Option<TextureHandle>; TEXTURE_SLOT_COUNT],
    uniform_buffers: [Option<BufferHandle>; UNIFORM_SLOT_COUNT],
    vertex_buffer: Option<VertexBufferHandle>,
}

impl Default for RenderStateExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderStateExecutor {
    /// Cache starts at the global default state, mirroring a freshly
    /// initialized device.
    #[must_use]
    pub fn new() -> Self {
        let default = &StateGroup::GLOBAL_DEFAULT;
        Self {
            blend_mode: default.pipeline.blend_mode,
            depth_stencil: default.pipeline.depth_stencil.unwrap_or_default(),
            face_cull: default.pipeline.face_cull.unwrap_or_default(),
            clear_flags: ClearFlags::empty(),
            shader: None,
            textures: [None; TEXTURE_SLOT_COUNT],
            uniform_buffers: [None; UNIFORM_SLOT_COUNT],
            vertex_buffer: None,
        }
    }

    /// Applies the pipeline-state deltas.
    ///
    /// Unset fields request no change; set fields issue exactly one device
    /// call when they differ from the cache.
    pub fn apply_pipeline(&mut self, device: &mut dyn RenderDevice, state: &PipelineState) {
        if let Some(clear) = state.clear_flags {
            if clear != self.clear_flags {
                device.set_clear_flags(clear);
                self.clear_flags = clear;
            }
        }
        if state.blend_mode != BlendMode::Null && state.blend_mode != self.blend_mode {
            trace!("blend {:?} -> {:?}", self.blend_mode, state.blend_mode);
            device.set_blend_mode(state.blend_mode);
            self.blend_mode = state.blend_mode;
        }
        if let Some(depth_stencil) = state.depth_stencil {
            if depth_stencil != self.depth_stencil {
                device.set_depth_stencil(depth_stencil);
                self.depth_stencil = depth_stencil;
            }
        }
        if let Some(face_cull) = state.face_cull {
            if face_cull != self.face_cull {
                device.set_face_cull(face_cull);
                self.face_cull = face_cull;
            }
        }
    }

    /// Applies the resource-binding deltas.
    ///
    /// A shader switch resets the cached texture and buffer arrays: slot
    /// meaning differs per program, so every binding must be re-proven
    /// against the new shader.
    pub fn apply_resources(&mut self, device: &mut dyn RenderDevice, state: &ResourceState) {
        if let Some(shader) = state.shader {
            if self.shader != Some(shader) {
                trace!("shader switch -> {shader:?}");
                device.bind_shader(shader);
                self.shader = Some(shader);
                self.textures = [None; TEXTURE_SLOT_COUNT];
                self.uniform_buffers = [None; UNIFORM_SLOT_COUNT];
            }
        }

        for (slot, requested) in TextureSlot::ALL.iter().zip(state.textures.iter()) {
            if let Some(texture) = requested {
                let cached = &mut self.textures[slot.index()];
                if *cached != Some(*texture) {
                    device.bind_texture(*slot, *texture);
                    *cached = Some(*texture);
                }
            }
        }

        for (slot, requested) in UniformSlot::ALL.iter().zip(state.uniform_buffers.iter()) {
            if let Some(buffer) = requested {
                let cached = &mut self.uniform_buffers[slot.index()];
                if *cached != Some(*buffer) {
                    device.bind_uniform_buffer(*slot, *buffer);
                    *cached = Some(*buffer);
                }
            }
        }

        if let Some(vertex_buffer) = state.vertex_buffer {
            if self.vertex_buffer != Some(vertex_buffer) {
                device.bind_vertex_buffer(vertex_buffer);
                self.vertex_buffer = Some(vertex_buffer);
            }
        }
    }

    /// Binds a single uniform buffer through the cache.
    ///
    /// Used by passes for bindings that live outside any state group, e.g.
    /// the shadow pass's light-space matrix buffer.
    pub fn bind_uniform_buffer(
        &mut self,
        device: &mut dyn RenderDevice,
        slot: UniformSlot,
        buffer: BufferHandle,
    ) {
        let cached = &mut self.uniform_buffers[slot.index()];
        if *cached != Some(buffer) {
            device.bind_uniform_buffer(slot, buffer);
            *cached = Some(buffer);
        }
    }

    /// Issues the draw unconditionally.
    pub fn draw(&mut self, device: &mut dyn RenderDevice, call: &DrawCall) {
        device.draw(call);
    }

    /// Runs a full state application followed by the draw.
    pub fn run(&mut self, device: &mut dyn RenderDevice, state: &StateGroup, call: &DrawCall) {
        self.apply_pipeline(device, &state.pipeline);
        self.apply_resources(device, &state.resources);
        self.draw(device, call);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::backend::recording::{RecordedCommand, RecordingDevice};

    fn pipeline_call(c: &RecordedCommand) -> bool {
        matches!(
            c,
            RecordedCommand::SetBlendMode(_)
                | RecordedCommand::SetDepthStencil(_)
                | RecordedCommand::SetFaceCull(_)
                | RecordedCommand::SetClearFlags(_)
        )
    }

    #[test]
    fn identical_pipeline_states_issue_no_calls() {
        let mut device = RecordingDevice::new();
        let mut executor = RenderStateExecutor::new();
        let state = PipelineState {
            blend_mode: BlendMode::Transparent,
            depth_stencil: Some(DepthStencilFlags::DEPTH),
            face_cull: Some(FaceCullFlags::BACK),
            clear_flags: None,
        };

        executor.apply_pipeline(&mut device, &state);
        let after_first = device.count(pipeline_call);
        executor.apply_pipeline(&mut device, &state);
        executor.apply_pipeline(&mut device, &state);

        assert_eq!(device.count(pipeline_call), after_first);
    }

    #[test]
    fn single_field_change_issues_single_call() {
        let mut device = RecordingDevice::new();
        let mut executor = RenderStateExecutor::new();
        let mut state = PipelineState {
            blend_mode: BlendMode::Transparent,
            ..PipelineState::default()
        };
        executor.apply_pipeline(&mut device, &state);
        device.reset();

        state.blend_mode = BlendMode::Additive;
        executor.apply_pipeline(&mut device, &state);

        assert_eq!(device.commands().len(), 1);
        assert_eq!(
            device.commands()[0],
            RecordedCommand::SetBlendMode(BlendMode::Additive)
        );
    }

    #[test]
    fn unset_fields_request_no_change() {
        let mut device = RecordingDevice::new();
        let mut executor = RenderStateExecutor::new();

        executor.apply_pipeline(&mut device, &PipelineState::default());
        executor.apply_resources(&mut device, &ResourceState::EMPTY);

        assert!(device.commands().is_empty());
    }

    #[test]
    fn shader_switch_resets_cached_bindings() {
        let mut device = RecordingDevice::new();
        let mut executor = RenderStateExecutor::new();

        let mut state = ResourceState::EMPTY;
        state.shader = Some(ShaderHandle(1));
        state.textures[TextureSlot::Color.index()] = Some(TextureHandle(4));
        executor.apply_resources(&mut device, &state);

        // Same texture, new shader: the texture must be re-bound.
        state.shader = Some(ShaderHandle(2));
        device.reset();
        executor.apply_resources(&mut device, &state);

        assert_eq!(
            device.commands(),
            &[
                RecordedCommand::BindShader(ShaderHandle(2)),
                RecordedCommand::BindTexture(TextureSlot::Color, TextureHandle(4)),
            ]
        );
    }

    #[test]
    fn draws_are_never_deduplicated() {
        let mut device = RecordingDevice::new();
        let mut executor = RenderStateExecutor::new();
        let call = DrawCall::triangles(3);

        executor.draw(&mut device, &call);
        executor.draw(&mut device, &call);

        assert_eq!(device.draw_count(), 2);
    }
}
