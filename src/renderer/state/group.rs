//! State groups.
//!
//! A [`StateGroup`] is a bundle of GPU pipeline flags and resource bindings
//! built by one scene component (camera, object, model, mesh, material,
//! light, pass). Groups are merged into a single flat snapshot when a draw
//! is compiled; every field carries an unset sentinel so a group only
//! speaks for the fields its builder actually touched.

use crate::renderer::backend::{
    BlendMode, BufferHandle, ClearFlags, DepthStencilFlags, FaceCullFlags, ShaderHandle,
    TextureHandle, VertexBufferHandle, TEXTURE_SLOT_COUNT, UNIFORM_SLOT_COUNT,
};

// ============================================================================
// Layers
// ============================================================================

/// Overlay plane a draw belongs to, above all view-space ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum FullscreenLayer {
    #[default]
    Null = 0,
    Game = 1,
    Ui = 2,
}

/// Coarse draw-order bucket within a fullscreen layer.
///
/// `Invisible` draws are dropped at queue admission; it is the merge
/// default, so a draw that never picked a layer simply does not render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum RenderLayer {
    #[default]
    Null = 0,
    Sky = 1,
    Static = 2,
    Dynamic = 3,
    Particles = 4,
    Ui = 5,
    Invisible = 6,
}

// ============================================================================
// Pipeline State
// ============================================================================

/// Fixed-function pipeline flags.
///
/// `None` / [`BlendMode::Null`] mean "not set by this layer": the field is
/// skipped during merge, preserving whatever a broader layer already chose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineState {
    pub blend_mode: BlendMode,
    pub depth_stencil: Option<DepthStencilFlags>,
    pub face_cull: Option<FaceCullFlags>,
    pub clear_flags: Option<ClearFlags>,
}

impl PipelineState {
    /// Adopts `src`'s values for every field this state has not set.
    fn fill_from(&mut self, src: &Self) {
        if self.blend_mode == BlendMode::Null {
            self.blend_mode = src.blend_mode;
        }
        if self.depth_stencil.is_none() {
            self.depth_stencil = src.depth_stencil;
        }
        if self.face_cull.is_none() {
            self.face_cull = src.face_cull;
        }
        if self.clear_flags.is_none() {
            self.clear_flags = src.clear_flags;
        }
    }
}

// ============================================================================
// Resource State
// ============================================================================

/// Shader, texture, uniform-buffer and vertex-buffer bindings.
///
/// Texture and buffer arrays are indexed by
/// [`TextureSlot`](crate::renderer::backend::TextureSlot) and
/// [`UniformSlot`](crate::renderer::backend::UniformSlot).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceState {
    pub shader: Option<ShaderHandle>,
    pub textures: [Option<TextureHandle>; TEXTURE_SLOT_COUNT],
    pub uniform_buffers: [Option<BufferHandle>; UNIFORM_SLOT_COUNT],
    pub vertex_buffer: Option<VertexBufferHandle>,
}

impl ResourceState {
    /// No bindings at all.
    pub const EMPTY: Self = Self {
        shader: None,
        textures: [None; TEXTURE_SLOT_COUNT],
        uniform_buffers: [None; UNIFORM_SLOT_COUNT],
        vertex_buffer: None,
    };

    fn fill_from(&mut self, src: &Self) {
        if self.shader.is_none() {
            self.shader = src.shader;
        }
        for (dst, s) in self.textures.iter_mut().zip(src.textures.iter()) {
            if dst.is_none() {
                *dst = *s;
            }
        }
        for (dst, s) in self
            .uniform_buffers
            .iter_mut()
            .zip(src.uniform_buffers.iter())
        {
            if dst.is_none() {
                *dst = *s;
            }
        }
        if self.vertex_buffer.is_none() {
            self.vertex_buffer = src.vertex_buffer;
        }
    }
}

impl Default for ResourceState {
    fn default() -> Self {
        Self::EMPTY
    }
}

// ============================================================================
// State Group
// ============================================================================

/// One layer of render state.
///
/// Produced exclusively by the
/// [`StateGroupWriter`](crate::renderer::state::StateGroupWriter) and frozen
/// from then on; tasks and passes share finished groups behind `Arc`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StateGroup {
    pub pipeline: PipelineState,
    pub resources: ResourceState,
    pub fullscreen_layer: FullscreenLayer,
    pub render_layer: RenderLayer,
    /// View depth for sorting; `0` is the unset sentinel.
    pub render_depth: u32,
}

impl StateGroup {
    /// The global fallback every compiled task bottoms out on: opaque,
    /// depth-tested, back-face culled, on the `Invisible` layer.
    pub const GLOBAL_DEFAULT: Self = Self {
        pipeline: PipelineState {
            blend_mode: BlendMode::Opaque,
            depth_stencil: Some(DepthStencilFlags::DEPTH),
            face_cull: Some(FaceCullFlags::BACK),
            clear_flags: None,
        },
        resources: ResourceState::EMPTY,
        fullscreen_layer: FullscreenLayer::Null,
        render_layer: RenderLayer::Invisible,
        render_depth: 0,
    };

    /// Merges `src` underneath this group.
    ///
    /// Every field this group has already set keeps its value; unset fields
    /// adopt `src`'s values where `src` set one. Applying layers from most
    /// to least specific therefore realizes "most specific wins, absence
    /// defers to a broader default".
    pub fn apply(&mut self, src: &Self) {
        self.pipeline.fill_from(&src.pipeline);
        self.resources.fill_from(&src.resources);
        if self.fullscreen_layer == FullscreenLayer::Null {
            self.fullscreen_layer = src.fullscreen_layer;
        }
        if self.render_layer == RenderLayer::Null {
            self.render_layer = src.render_layer;
        }
        if self.render_depth == 0 {
            self.render_depth = src.render_depth;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::backend::TextureSlot;

    #[test]
    fn apply_keeps_more_specific_fields() {
        let mut dst = StateGroup {
            pipeline: PipelineState {
                blend_mode: BlendMode::Transparent,
                ..PipelineState::default()
            },
            ..StateGroup::default()
        };
        let src = StateGroup {
            pipeline: PipelineState {
                blend_mode: BlendMode::Opaque,
                face_cull: Some(FaceCullFlags::FRONT),
                ..PipelineState::default()
            },
            render_depth: 42,
            ..StateGroup::default()
        };

        dst.apply(&src);

        assert_eq!(dst.pipeline.blend_mode, BlendMode::Transparent);
        assert_eq!(dst.pipeline.face_cull, Some(FaceCullFlags::FRONT));
        assert_eq!(dst.render_depth, 42);
    }

    #[test]
    fn apply_merges_binding_arrays_per_slot() {
        let mut dst = StateGroup::default();
        dst.resources.textures[TextureSlot::Shadow.index()] = Some(TextureHandle(7));

        let mut src = StateGroup::default();
        src.resources.textures[TextureSlot::Shadow.index()] = Some(TextureHandle(9));
        src.resources.textures[TextureSlot::Color.index()] = Some(TextureHandle(3));

        dst.apply(&src);

        assert_eq!(
            dst.resources.textures[TextureSlot::Shadow.index()],
            Some(TextureHandle(7))
        );
        assert_eq!(
            dst.resources.textures[TextureSlot::Color.index()],
            Some(TextureHandle(3))
        );
    }

    #[test]
    fn global_default_enables_depth_and_backface_cull() {
        let d = StateGroup::GLOBAL_DEFAULT;
        assert_eq!(d.pipeline.blend_mode, BlendMode::Opaque);
        assert_eq!(d.pipeline.depth_stencil, Some(DepthStencilFlags::DEPTH));
        assert_eq!(d.pipeline.face_cull, Some(FaceCullFlags::BACK));
        assert_eq!(d.render_layer, RenderLayer::Invisible);
    }
}
