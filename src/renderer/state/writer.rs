//! State group writer.
//!
//! The only producer of [`StateGroup`]s. The writer owns the in-progress
//! group between `begin` and `end`; `end` freezes the group behind an `Arc`
//! and resets the writer, so finished groups can never be mutated again.

use std::sync::Arc;

use log::trace;

use crate::renderer::backend::{
    BlendMode, BufferHandle, ClearFlags, DepthStencilFlags, FaceCullFlags, ShaderHandle,
    TextureRef, TextureSlot, UniformSlot, VertexBufferHandle, TEXTURE_SLOT_COUNT,
    USER_TEXTURE_SLOT_COUNT,
};

use super::group::{FullscreenLayer, RenderLayer, StateGroup};

/// Scoped builder for [`StateGroup`]s.
///
/// One writer is typically kept per producing component and reused across
/// frames; it holds no allocation between scopes.
#[derive(Default)]
pub struct StateGroupWriter {
    group: Option<StateGroup>,
    /// Round-robin cursor over the user texture-slot pool.
    user_slot_cursor: usize,
}

impl StateGroupWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a scope on a fresh, empty group.
    ///
    /// Calling a setter without `begin` opens the scope implicitly.
    pub fn begin(&mut self) -> &mut Self {
        if self.group.is_none() {
            self.group = Some(StateGroup::default());
        }
        self
    }

    /// Opens a scope that continues from an existing group's fields.
    pub fn begin_with(&mut self, group: StateGroup) -> &mut Self {
        self.group = Some(group);
        self
    }

    fn group_mut(&mut self) -> &mut StateGroup {
        self.group.get_or_insert_with(StateGroup::default)
    }

    pub fn set_blending(&mut self, mode: BlendMode) -> &mut Self {
        self.group_mut().pipeline.blend_mode = mode;
        self
    }

    pub fn set_shader(&mut self, shader: ShaderHandle) -> &mut Self {
        self.group_mut().resources.shader = Some(shader);
        self
    }

    pub fn bind_uniform_buffer(&mut self, slot: UniformSlot, buffer: BufferHandle) -> &mut Self {
        self.group_mut().resources.uniform_buffers[slot.index()] = Some(buffer);
        self
    }

    pub fn bind_vertex_buffer(&mut self, buffer: VertexBufferHandle) -> &mut Self {
        self.group_mut().resources.vertex_buffer = Some(buffer);
        self
    }

    /// Binds a texture into its semantic slot.
    ///
    /// Reserved semantics always land in their fixed slot, replacing any
    /// prior occupant. Generic textures take the next user slot; when the
    /// pool is exhausted the cursor wraps and the oldest binding is
    /// overwritten. Slot choice is never the caller's.
    pub fn bind_texture(&mut self, texture: TextureRef) -> &mut Self {
        let slot = match texture.semantic.reserved_slot() {
            Some(slot) => slot,
            None => {
                let slot = TextureSlot::user(self.user_slot_cursor);
                if self.user_slot_cursor >= USER_TEXTURE_SLOT_COUNT {
                    trace!("user texture slots exhausted, recycling {slot:?}");
                }
                self.user_slot_cursor += 1;
                slot
            }
        };
        self.group_mut().resources.textures[slot.index()] = Some(texture.handle);
        self
    }

    /// Drops every texture binding from the in-progress group.
    pub fn clear_textures(&mut self) -> &mut Self {
        self.group_mut().resources.textures = [None; TEXTURE_SLOT_COUNT];
        self.user_slot_cursor = 0;
        self
    }

    pub fn set_render_layer(&mut self, layer: RenderLayer) -> &mut Self {
        self.group_mut().render_layer = layer;
        self
    }

    pub fn set_fullscreen_layer(&mut self, layer: FullscreenLayer) -> &mut Self {
        self.group_mut().fullscreen_layer = layer;
        self
    }

    /// Accumulates clear flags into the group (bitwise OR with any flags
    /// already set in this scope).
    pub fn set_clear_flags(&mut self, flags: ClearFlags) -> &mut Self {
        let pipeline = &mut self.group_mut().pipeline;
        pipeline.clear_flags = Some(pipeline.clear_flags.unwrap_or(ClearFlags::empty()) | flags);
        self
    }

    pub fn set_depth_stencil_state(&mut self, flags: DepthStencilFlags) -> &mut Self {
        self.group_mut().pipeline.depth_stencil = Some(flags);
        self
    }

    pub fn set_face_cull_state(&mut self, flags: FaceCullFlags) -> &mut Self {
        self.group_mut().pipeline.face_cull = Some(flags);
        self
    }

    pub fn set_render_depth(&mut self, depth: u32) -> &mut Self {
        self.group_mut().render_depth = depth;
        self
    }

    /// Closes the scope, returning the finished immutable group and
    /// resetting the writer to empty.
    pub fn end(&mut self) -> Arc<StateGroup> {
        self.user_slot_cursor = 0;
        Arc::new(self.group.take().unwrap_or_default())
    }
}
