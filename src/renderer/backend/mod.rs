//! Graphics device seam.
//!
//! The render core never talks to a graphics API directly. Everything it
//! needs from the backend (binding framebuffers, textures and buffers,
//! flipping pipeline state, issuing draws) goes through the narrow
//! [`RenderDevice`] trait. Shader compilation, asset upload and swapchain
//! management live behind the same boundary, on the far side.
//!
//! Handles are plain opaque ids resolved by the upstream resource systems.
//! A handle that never resolved simply stays absent from the state it would
//! have occupied; nothing at this layer treats that as an error.

pub mod recording;

use bitflags::bitflags;

use crate::errors::Result;

// ============================================================================
// Handles
// ============================================================================

/// Opaque handle to a compiled-and-linked shader program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderHandle(pub u32);

/// Opaque handle to a device texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// Opaque handle to a uniform buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u32);

/// Opaque handle to a vertex buffer (vertex array / geometry stream).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexBufferHandle(pub u32);

/// Opaque handle to a framebuffer and its attachments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FramebufferHandle(pub u32);

// ============================================================================
// Pipeline State Vocabulary
// ============================================================================

/// Blend mode of a draw.
///
/// `Null` is the unset sentinel: it is skipped during state merging and the
/// executor never applies it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum BlendMode {
    #[default]
    Null = 0,
    Opaque = 1,
    Transparent = 2,
    Additive = 3,
}

impl BlendMode {
    /// Whether draws in this mode depend on back-to-front ordering.
    #[inline]
    #[must_use]
    pub const fn is_translucent(self) -> bool {
        matches!(self, Self::Transparent | Self::Additive)
    }
}

bitflags! {
    /// Depth/stencil test toggles.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct DepthStencilFlags: u8 {
        const DEPTH   = 1 << 0;
        const STENCIL = 1 << 1;
    }
}

bitflags! {
    /// Face culling toggles.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct FaceCullFlags: u8 {
        const FRONT = 1 << 0;
        const BACK  = 1 << 1;
    }
}

bitflags! {
    /// Which attachment planes a clear touches.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ClearFlags: u8 {
        const COLOR   = 1 << 0;
        const DEPTH   = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

// ============================================================================
// Bind Points
// ============================================================================

/// Number of texture bind points a shader can see at once.
pub const TEXTURE_SLOT_COUNT: usize = 16;

/// Number of non-reserved ("user") texture bind points.
pub const USER_TEXTURE_SLOT_COUNT: usize = 10;

/// Texture bind points.
///
/// The first six slots are reserved for well-known semantic roles so that
/// e.g. every shadow map lands in the same slot no matter which component
/// bound it. The remaining slots form the user pool, assigned round-robin
/// by the state-group writer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TextureSlot {
    Depth = 0,
    Shadow = 1,
    Color = 2,
    Irradiance = 3,
    Prefilter = 4,
    BrdfLut = 5,
    User0 = 6,
    User1 = 7,
    User2 = 8,
    User3 = 9,
    User4 = 10,
    User5 = 11,
    User6 = 12,
    User7 = 13,
    User8 = 14,
    User9 = 15,
}

impl TextureSlot {
    const USER_SLOTS: [Self; USER_TEXTURE_SLOT_COUNT] = [
        Self::User0,
        Self::User1,
        Self::User2,
        Self::User3,
        Self::User4,
        Self::User5,
        Self::User6,
        Self::User7,
        Self::User8,
        Self::User9,
    ];

    /// All bind points, in slot-index order.
    pub const ALL: [Self; TEXTURE_SLOT_COUNT] = [
        Self::Depth,
        Self::Shadow,
        Self::Color,
        Self::Irradiance,
        Self::Prefilter,
        Self::BrdfLut,
        Self::User0,
        Self::User1,
        Self::User2,
        Self::User3,
        Self::User4,
        Self::User5,
        Self::User6,
        Self::User7,
        Self::User8,
        Self::User9,
    ];

    /// The `n`-th user slot, wrapping past the end of the user pool.
    #[inline]
    #[must_use]
    pub const fn user(n: usize) -> Self {
        Self::USER_SLOTS[n % USER_TEXTURE_SLOT_COUNT]
    }

    /// Array index of this bind point.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as u8 as usize
    }
}

/// Number of uniform-buffer bind points.
pub const UNIFORM_SLOT_COUNT: usize = 8;

/// Uniform-buffer bind points, one per buffer role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum UniformSlot {
    Camera = 0,
    Object = 1,
    Model = 2,
    Material = 3,
    Light = 4,
    Ui = 5,
    Post = 6,
    UserDefined = 7,
}

impl UniformSlot {
    /// All bind points, in slot-index order.
    pub const ALL: [Self; UNIFORM_SLOT_COUNT] = [
        Self::Camera,
        Self::Object,
        Self::Model,
        Self::Material,
        Self::Light,
        Self::Ui,
        Self::Post,
        Self::UserDefined,
    ];

    /// Array index of this bind point.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as u8 as usize
    }
}

// ============================================================================
// Texture Semantics
// ============================================================================

/// Semantic role of a texture, carried alongside its handle.
///
/// Reserved roles map onto fixed bind points; `Generic` textures go through
/// the user-slot pool instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextureSemantic {
    Depth,
    Shadow,
    Color,
    Irradiance,
    Prefilter,
    BrdfLut,
    #[default]
    Generic,
}

impl TextureSemantic {
    /// Parses an asset-side semantic type tag.
    ///
    /// Unknown tags are `Generic`; the caller never picks a reserved slot
    /// by hand.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "depth" => Self::Depth,
            "shadow" => Self::Shadow,
            "color" => Self::Color,
            "irradiance" => Self::Irradiance,
            "prefilter" => Self::Prefilter,
            "brdf_lut" => Self::BrdfLut,
            _ => Self::Generic,
        }
    }

    /// The reserved bind point for this semantic, if it has one.
    #[inline]
    #[must_use]
    pub const fn reserved_slot(self) -> Option<TextureSlot> {
        match self {
            Self::Depth => Some(TextureSlot::Depth),
            Self::Shadow => Some(TextureSlot::Shadow),
            Self::Color => Some(TextureSlot::Color),
            Self::Irradiance => Some(TextureSlot::Irradiance),
            Self::Prefilter => Some(TextureSlot::Prefilter),
            Self::BrdfLut => Some(TextureSlot::BrdfLut),
            Self::Generic => None,
        }
    }
}

/// A resolved texture handle plus its semantic role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureRef {
    pub handle: TextureHandle,
    pub semantic: TextureSemantic,
}

impl TextureRef {
    #[must_use]
    pub const fn new(handle: TextureHandle, semantic: TextureSemantic) -> Self {
        Self { handle, semantic }
    }

    /// Builds a reference from a handle and an asset-side type tag.
    #[must_use]
    pub fn tagged(handle: TextureHandle, tag: &str) -> Self {
        Self::new(handle, TextureSemantic::from_tag(tag))
    }
}

// ============================================================================
// Draw Calls
// ============================================================================

/// Primitive assembly topology.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PrimitiveTopology {
    Points,
    Lines,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
}

/// One fully-specified draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCall {
    pub topology: PrimitiveTopology,
    pub vertex_count: u32,
    /// Indexed draws carry an index count; `None` draws raw vertices.
    pub index_count: Option<u32>,
}

impl DrawCall {
    /// Non-indexed triangle list.
    #[must_use]
    pub const fn triangles(vertex_count: u32) -> Self {
        Self {
            topology: PrimitiveTopology::Triangles,
            vertex_count,
            index_count: None,
        }
    }

    /// Indexed triangle list.
    #[must_use]
    pub const fn indexed_triangles(vertex_count: u32, index_count: u32) -> Self {
        Self {
            topology: PrimitiveTopology::Triangles,
            vertex_count,
            index_count: Some(index_count),
        }
    }
}

// ============================================================================
// Framebuffers
// ============================================================================

/// A 2D pixel extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Extent {
    pub width: u32,
    pub height: u32,
}

impl Extent {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub const fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Requested framebuffer layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FramebufferDescriptor {
    pub label: &'static str,
    pub size: Extent,
    /// MSAA sample count; `1` means single-sampled.
    pub samples: u32,
    /// Array layer count; layered targets are addressed per layer at bind time.
    pub layers: u32,
    pub with_color: bool,
    pub with_depth: bool,
}

// ============================================================================
// Device Trait
// ============================================================================

/// The narrow interface the render core drives the graphics backend through.
///
/// Resource creation can fail and says so; the per-frame command surface is
/// infallible by contract. Fatal backend conditions (context loss, GPU
/// out-of-memory) are logged and surfaced on the backend's side of this
/// boundary, never propagated through the state/queue pipeline.
///
/// `bind_shader` also detaches any attachment uniforms the previous program
/// held, matching the executor's cache reset on shader switches.
pub trait RenderDevice {
    // --- resource creation (initialization time) ---

    /// Allocates a framebuffer with the requested attachments.
    fn create_framebuffer(&mut self, desc: &FramebufferDescriptor) -> Result<FramebufferHandle>;

    /// Allocates a uniform buffer of `size` bytes.
    fn create_uniform_buffer(&mut self, label: &'static str, size: u64) -> Result<BufferHandle>;

    // --- attachment queries ---

    /// The color attachment of a framebuffer, if it has one.
    fn color_attachment(&self, framebuffer: FramebufferHandle) -> Option<TextureHandle>;

    /// The depth attachment of a framebuffer, if it has one.
    fn depth_attachment(&self, framebuffer: FramebufferHandle) -> Option<TextureHandle>;

    // --- per-frame commands ---

    /// Reallocates a framebuffer's attachments at a new size.
    fn resize_framebuffer(&mut self, framebuffer: FramebufferHandle, size: Extent);

    /// Makes a framebuffer the render target; `None` targets the backbuffer.
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>);

    /// Targets one layer of a layered framebuffer.
    fn bind_framebuffer_layer(&mut self, framebuffer: FramebufferHandle, layer: u32);

    /// Sets the viewport rectangle to `(0, 0, size)`.
    fn set_viewport(&mut self, size: Extent);

    /// Clears the bound framebuffer's planes.
    fn clear(&mut self, flags: ClearFlags);

    fn set_blend_mode(&mut self, mode: BlendMode);
    fn set_depth_stencil(&mut self, flags: DepthStencilFlags);
    fn set_face_cull(&mut self, flags: FaceCullFlags);
    fn set_clear_flags(&mut self, flags: ClearFlags);

    fn bind_shader(&mut self, shader: ShaderHandle);
    fn bind_texture(&mut self, slot: TextureSlot, texture: TextureHandle);
    fn bind_uniform_buffer(&mut self, slot: UniformSlot, buffer: BufferHandle);
    fn bind_vertex_buffer(&mut self, buffer: VertexBufferHandle);

    /// Uploads bytes into a uniform buffer at a byte offset.
    fn write_uniform_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]);

    /// Issues one draw with whatever is currently bound.
    fn draw(&mut self, call: &DrawCall);

    /// Blits a framebuffer into a target; `None` targets the backbuffer.
    /// Resolves multisampled sources into single-sampled targets.
    fn blit(&mut self, source: FramebufferHandle, target: Option<FramebufferHandle>, size: Extent);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_slots_wrap_round_robin() {
        assert_eq!(TextureSlot::user(0), TextureSlot::User0);
        assert_eq!(TextureSlot::user(9), TextureSlot::User9);
        assert_eq!(TextureSlot::user(10), TextureSlot::User0);
        assert_eq!(TextureSlot::user(23), TextureSlot::User3);
    }

    #[test]
    fn semantic_tags_map_to_reserved_slots() {
        assert_eq!(
            TextureSemantic::from_tag("shadow").reserved_slot(),
            Some(TextureSlot::Shadow)
        );
        assert_eq!(
            TextureSemantic::from_tag("brdf_lut").reserved_slot(),
            Some(TextureSlot::BrdfLut)
        );
        assert_eq!(TextureSemantic::from_tag("albedo").reserved_slot(), None);
    }

    #[test]
    fn slot_indices_match_enum_order() {
        for (i, slot) in TextureSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
        for (i, slot) in UniformSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
        }
    }
}
