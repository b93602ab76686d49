//! Command-recording device.
//!
//! [`RecordingDevice`] implements [`RenderDevice`] by appending every
//! command to an in-memory log instead of touching a graphics API. The test
//! suite uses it to assert call counts and call order; it also works as a
//! headless device when no GPU is present.

use super::{
    BlendMode, BufferHandle, ClearFlags, DepthStencilFlags, DrawCall, Extent, FaceCullFlags,
    FramebufferDescriptor, FramebufferHandle, RenderDevice, ShaderHandle, TextureHandle,
    TextureSlot, UniformSlot, VertexBufferHandle,
};
use crate::errors::Result;

/// One recorded device command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedCommand {
    ResizeFramebuffer(FramebufferHandle, Extent),
    BindFramebuffer(Option<FramebufferHandle>),
    BindFramebufferLayer(FramebufferHandle, u32),
    SetViewport(Extent),
    Clear(ClearFlags),
    SetBlendMode(BlendMode),
    SetDepthStencil(DepthStencilFlags),
    SetFaceCull(FaceCullFlags),
    SetClearFlags(ClearFlags),
    BindShader(ShaderHandle),
    BindTexture(TextureSlot, TextureHandle),
    BindUniformBuffer(UniformSlot, BufferHandle),
    BindVertexBuffer(VertexBufferHandle),
    WriteUniformBuffer {
        buffer: BufferHandle,
        offset: u64,
        len: usize,
    },
    Draw(DrawCall),
    Blit {
        source: FramebufferHandle,
        target: Option<FramebufferHandle>,
    },
}

struct RecordedFramebuffer {
    color: Option<TextureHandle>,
    depth: Option<TextureHandle>,
}

/// A [`RenderDevice`] that records instead of rendering.
#[derive(Default)]
pub struct RecordingDevice {
    commands: Vec<RecordedCommand>,
    framebuffers: Vec<RecordedFramebuffer>,
    next_texture: u32,
    next_buffer: u32,
}

impl RecordingDevice {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded since construction or the last [`Self::reset`].
    #[must_use]
    pub fn commands(&self) -> &[RecordedCommand] {
        &self.commands
    }

    /// Drops the recorded command log; created resources stay valid.
    pub fn reset(&mut self) {
        self.commands.clear();
    }

    /// Number of recorded commands matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&RecordedCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| predicate(c)).count()
    }

    /// Number of recorded draws.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.count(|c| matches!(c, RecordedCommand::Draw(_)))
    }
}

impl RenderDevice for RecordingDevice {
    fn create_framebuffer(&mut self, desc: &FramebufferDescriptor) -> Result<FramebufferHandle> {
        let color = desc.with_color.then(|| {
            self.next_texture += 1;
            TextureHandle(self.next_texture)
        });
        let depth = desc.with_depth.then(|| {
            self.next_texture += 1;
            TextureHandle(self.next_texture)
        });
        self.framebuffers.push(RecordedFramebuffer { color, depth });
        Ok(FramebufferHandle(self.framebuffers.len() as u32 - 1))
    }

    fn create_uniform_buffer(&mut self, _label: &'static str, _size: u64) -> Result<BufferHandle> {
        self.next_buffer += 1;
        Ok(BufferHandle(self.next_buffer))
    }

    fn color_attachment(&self, framebuffer: FramebufferHandle) -> Option<TextureHandle> {
        self.framebuffers
            .get(framebuffer.0 as usize)
            .and_then(|fb| fb.color)
    }

    fn depth_attachment(&self, framebuffer: FramebufferHandle) -> Option<TextureHandle> {
        self.framebuffers
            .get(framebuffer.0 as usize)
            .and_then(|fb| fb.depth)
    }

    fn resize_framebuffer(&mut self, framebuffer: FramebufferHandle, size: Extent) {
        self.commands
            .push(RecordedCommand::ResizeFramebuffer(framebuffer, size));
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) {
        self.commands
            .push(RecordedCommand::BindFramebuffer(framebuffer));
    }

    fn bind_framebuffer_layer(&mut self, framebuffer: FramebufferHandle, layer: u32) {
        self.commands
            .push(RecordedCommand::BindFramebufferLayer(framebuffer, layer));
    }

    fn set_viewport(&mut self, size: Extent) {
        self.commands.push(RecordedCommand::SetViewport(size));
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.commands.push(RecordedCommand::Clear(flags));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.commands.push(RecordedCommand::SetBlendMode(mode));
    }

    fn set_depth_stencil(&mut self, flags: DepthStencilFlags) {
        self.commands.push(RecordedCommand::SetDepthStencil(flags));
    }

    fn set_face_cull(&mut self, flags: FaceCullFlags) {
        self.commands.push(RecordedCommand::SetFaceCull(flags));
    }

    fn set_clear_flags(&mut self, flags: ClearFlags) {
        self.commands.push(RecordedCommand::SetClearFlags(flags));
    }

    fn bind_shader(&mut self, shader: ShaderHandle) {
        self.commands.push(RecordedCommand::BindShader(shader));
    }

    fn bind_texture(&mut self, slot: TextureSlot, texture: TextureHandle) {
        self.commands
            .push(RecordedCommand::BindTexture(slot, texture));
    }

    fn bind_uniform_buffer(&mut self, slot: UniformSlot, buffer: BufferHandle) {
        self.commands
            .push(RecordedCommand::BindUniformBuffer(slot, buffer));
    }

    fn bind_vertex_buffer(&mut self, buffer: VertexBufferHandle) {
        self.commands
            .push(RecordedCommand::BindVertexBuffer(buffer));
    }

    fn write_uniform_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        self.commands.push(RecordedCommand::WriteUniformBuffer {
            buffer,
            offset,
            len: data.len(),
        });
    }

    fn draw(&mut self, call: &DrawCall) {
        self.commands.push(RecordedCommand::Draw(*call));
    }

    fn blit(&mut self, source: FramebufferHandle, target: Option<FramebufferHandle>, _size: Extent) {
        self.commands.push(RecordedCommand::Blit { source, target });
    }
}
