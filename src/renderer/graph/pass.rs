//! Render passes.
//!
//! A [`RenderPass`] is one named stage of the frame: it owns a target
//! framebuffer, a base state group wired to its upstream dependencies'
//! output textures, and the queue of tasks submitted to it this frame.
//!
//! Lifecycle: `Uninitialized -> Initialized` once, at frame-graph
//! construction; then `prepare -> perform -> resolve` per frame, skipped
//! entirely, down to the last device call, when the queue is empty.

use log::{debug, trace, warn};

use crate::errors::Result;
use crate::renderer::backend::{
    BufferHandle, ClearFlags, Extent, FramebufferDescriptor, FramebufferHandle, RenderDevice,
    ShaderHandle, TextureHandle, TextureRef, TextureSemantic, UniformSlot,
};
use crate::renderer::settings::RendererSettings;
use crate::renderer::state::{RenderStateExecutor, StateGroup, StateGroupWriter};

use super::context::FrameContext;
use super::queue::RenderQueue;
use super::shadow_utils;

use std::sync::Arc;

// ============================================================================
// Pass Kinds
// ============================================================================

/// The fixed set of pass stages, in execution (= dependency) order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum PassKind {
    Depth = 0,
    Shadow = 1,
    Color = 2,
    Post = 3,
    Ui = 4,
}

impl PassKind {
    pub const COUNT: usize = 5;

    /// Execution order of the frame loop.
    pub const ORDERED: [Self; Self::COUNT] =
        [Self::Depth, Self::Shadow, Self::Color, Self::Post, Self::Ui];

    /// Upstream passes whose output attachments feed this pass.
    ///
    /// Depth and Shadow are roots, so the graph is acyclic by construction:
    /// a pass only ever names passes that precede it in [`Self::ORDERED`].
    #[must_use]
    pub const fn dependencies(self) -> &'static [Self] {
        match self {
            Self::Depth | Self::Shadow => &[],
            Self::Color => &[Self::Depth, Self::Shadow],
            Self::Post => &[Self::Color],
            Self::Ui => &[Self::Post],
        }
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as u8 as usize
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Depth => "Depth",
            Self::Shadow => "Shadow",
            Self::Color => "Color",
            Self::Post => "Post",
            Self::Ui => "UI",
        }
    }
}

/// One-time initialization state of a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassStatus {
    Uninitialized,
    Initialized,
}

/// Where a pass's resolve step blits its output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlitTarget {
    /// The presentation surface.
    Backbuffer,
    Framebuffer(FramebufferHandle),
}

// ============================================================================
// Kind-specific Configuration
// ============================================================================

/// Shadow pass parameters and per-cascade resources.
#[derive(Clone, Copy, Debug)]
struct ShadowConfig {
    cascade_count: u32,
    map_size: u32,
    split_lambda: f32,
    caster_extension: f32,
    /// Holds the light-space matrix, rewritten once per cascade.
    light_buffer: Option<BufferHandle>,
}

/// Closed set of per-kind behaviors; each variant is a short, independent
/// sequence rather than a specialization layer.
enum KindConfig {
    Depth,
    Shadow(ShadowConfig),
    Color {
        /// Multisampled intermediate, resolved into the primary after
        /// perform. Absent when MSAA is off.
        msaa_framebuffer: Option<FramebufferHandle>,
        samples: u32,
    },
    Post,
    Ui,
}

// ============================================================================
// Render Pass
// ============================================================================

/// A named render stage owning a framebuffer, a base state and a queue.
pub struct RenderPass {
    kind: PassKind,
    status: PassStatus,
    size: Extent,
    framebuffer: Option<FramebufferHandle>,
    /// Shader applied to every task that compiles against this pass,
    /// unless a more specific layer overrides it.
    shader: Option<ShaderHandle>,
    base_state: Option<Arc<StateGroup>>,
    clear_flags: ClearFlags,
    queue: RenderQueue,
    config: KindConfig,
}

impl RenderPass {
    fn new(kind: PassKind, size: Extent, clear_flags: ClearFlags, config: KindConfig) -> Self {
        Self {
            kind,
            status: PassStatus::Uninitialized,
            size,
            framebuffer: None,
            shader: None,
            base_state: None,
            clear_flags,
            queue: RenderQueue::with_capacity(256),
            config,
        }
    }

    #[must_use]
    pub(crate) fn depth(size: Extent) -> Self {
        Self::new(PassKind::Depth, size, ClearFlags::DEPTH, KindConfig::Depth)
    }

    #[must_use]
    pub(crate) fn shadow(settings: &RendererSettings) -> Self {
        let cascade_count = settings.shadow_cascades.clamp(1, shadow_utils::MAX_CASCADES);
        Self::new(
            PassKind::Shadow,
            Extent::square(settings.shadow_map_size),
            ClearFlags::DEPTH,
            KindConfig::Shadow(ShadowConfig {
                cascade_count,
                map_size: settings.shadow_map_size,
                split_lambda: settings.cascade_split_lambda,
                caster_extension: settings.shadow_caster_extension,
                light_buffer: None,
            }),
        )
    }

    #[must_use]
    pub(crate) fn color(size: Extent, samples: u32) -> Self {
        Self::new(
            PassKind::Color,
            size,
            ClearFlags::COLOR | ClearFlags::DEPTH,
            KindConfig::Color {
                msaa_framebuffer: None,
                samples: samples.max(1),
            },
        )
    }

    #[must_use]
    pub(crate) fn post(size: Extent) -> Self {
        Self::new(PassKind::Post, size, ClearFlags::COLOR, KindConfig::Post)
    }

    #[must_use]
    pub(crate) fn ui(size: Extent) -> Self {
        Self::new(PassKind::Ui, size, ClearFlags::empty(), KindConfig::Ui)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn kind(&self) -> PassKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> PassStatus {
        self.status
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> Extent {
        self.size
    }

    /// The pass's base state: dependency textures, pass shader, clear flags.
    /// `None` until initialized.
    #[must_use]
    pub fn base_state(&self) -> Option<&StateGroup> {
        self.base_state.as_deref()
    }

    #[must_use]
    pub fn queue(&self) -> &RenderQueue {
        &self.queue
    }

    #[must_use]
    pub fn queue_mut(&mut self) -> &mut RenderQueue {
        &mut self.queue
    }

    /// The framebuffer downstream passes read from.
    #[must_use]
    pub fn output_framebuffer(&self) -> Option<FramebufferHandle> {
        self.framebuffer
    }

    /// Semantic under which downstream passes see this pass's output.
    #[must_use]
    pub(crate) fn output_semantic(&self) -> TextureSemantic {
        match self.kind {
            PassKind::Depth => TextureSemantic::Depth,
            PassKind::Shadow => TextureSemantic::Shadow,
            PassKind::Color | PassKind::Post | PassKind::Ui => TextureSemantic::Color,
        }
    }

    /// The output attachment texture downstream passes bind as input.
    #[must_use]
    pub fn output_texture(&self, device: &dyn RenderDevice) -> Option<TextureHandle> {
        let framebuffer = self.framebuffer?;
        match self.kind {
            PassKind::Depth | PassKind::Shadow => device.depth_attachment(framebuffer),
            PassKind::Color | PassKind::Post | PassKind::Ui => {
                device.color_attachment(framebuffer)
            }
        }
    }

    /// Sets the pass shader, folding it into the base state when the pass
    /// is already initialized.
    pub fn set_shader(&mut self, shader: ShaderHandle) {
        self.shader = Some(shader);
        if let Some(base) = self.base_state.take() {
            let mut writer = StateGroupWriter::new();
            writer.begin_with(*base).set_shader(shader);
            self.base_state = Some(writer.end());
        }
    }

    // ------------------------------------------------------------------------
    // Initialization
    // ------------------------------------------------------------------------

    /// One-time setup: allocates the framebuffer(s) and builds the base
    /// state by binding every upstream pass's output texture under its
    /// semantic slot.
    pub(crate) fn initialize(
        &mut self,
        device: &mut dyn RenderDevice,
        upstream: &[&RenderPass],
    ) -> Result<()> {
        debug_assert_eq!(self.status, PassStatus::Uninitialized);
        debug_assert_eq!(upstream.len(), self.kind.dependencies().len());

        let (with_color, with_depth, layers) = match &self.config {
            KindConfig::Depth => (false, true, 1),
            KindConfig::Shadow(cfg) => (false, true, cfg.cascade_count),
            KindConfig::Color { .. } => (true, true, 1),
            KindConfig::Post | KindConfig::Ui => (true, false, 1),
        };

        self.framebuffer = Some(device.create_framebuffer(&FramebufferDescriptor {
            label: self.kind.name(),
            size: self.size,
            samples: 1,
            layers,
            with_color,
            with_depth,
        })?);

        if let KindConfig::Color {
            msaa_framebuffer,
            samples,
        } = &mut self.config
        {
            if *samples > 1 {
                *msaa_framebuffer = Some(device.create_framebuffer(&FramebufferDescriptor {
                    label: "Color MSAA",
                    size: self.size,
                    samples: *samples,
                    layers: 1,
                    with_color: true,
                    with_depth: true,
                })?);
            }
        }

        if let KindConfig::Shadow(cfg) = &mut self.config {
            cfg.light_buffer = Some(
                device.create_uniform_buffer("Shadow Light Matrix", std::mem::size_of::<
                    glam::Mat4,
                >() as u64)?,
            );
        }

        let mut writer = StateGroupWriter::new();
        writer.begin().set_clear_flags(self.clear_flags);
        if let Some(shader) = self.shader {
            writer.set_shader(shader);
        }
        for dep in upstream {
            if let Some(texture) = dep.output_texture(device) {
                writer.bind_texture(TextureRef::new(texture, dep.output_semantic()));
            } else {
                warn!(
                    "{} pass: dependency {} has no output texture yet",
                    self.kind.name(),
                    dep.kind().name()
                );
            }
        }
        if let KindConfig::Shadow(cfg) = &self.config {
            if let Some(buffer) = cfg.light_buffer {
                writer.bind_uniform_buffer(UniformSlot::Light, buffer);
            }
        }
        self.base_state = Some(writer.end());
        self.status = PassStatus::Initialized;

        Ok(())
    }

    // ------------------------------------------------------------------------
    // Per-frame Rendering
    // ------------------------------------------------------------------------

    /// Runs the pass for this frame.
    ///
    /// An empty queue short-circuits before any device call is made; this
    /// is the primary throughput guard against idle passes.
    pub(crate) fn render(
        &mut self,
        device: &mut dyn RenderDevice,
        executor: &mut RenderStateExecutor,
        ctx: &FrameContext,
        target: Option<BlitTarget>,
    ) {
        if self.status != PassStatus::Initialized {
            warn!("{} pass: rendered before initialization", self.kind.name());
            return;
        }
        if self.queue.is_empty() {
            trace!("{} pass: empty queue, skipped", self.kind.name());
            return;
        }

        self.prepare(device, ctx);
        self.perform(device, executor, ctx);
        self.resolve(device, target);
    }

    /// Binds the pass's render target, tracks the viewport and clears.
    fn prepare(&mut self, device: &mut dyn RenderDevice, ctx: &FrameContext) {
        let wanted = match &self.config {
            // Shadow maps keep their configured resolution.
            KindConfig::Shadow(cfg) => Extent::square(cfg.map_size),
            _ => ctx.viewport,
        };
        if wanted != self.size && !wanted.is_empty() {
            debug!(
                "{} pass: resizing {}x{} -> {}x{}",
                self.kind.name(),
                self.size.width,
                self.size.height,
                wanted.width,
                wanted.height
            );
            if let Some(framebuffer) = self.framebuffer {
                device.resize_framebuffer(framebuffer, wanted);
            }
            if let KindConfig::Color {
                msaa_framebuffer: Some(msaa),
                ..
            } = &self.config
            {
                device.resize_framebuffer(*msaa, wanted);
            }
            self.size = wanted;
        }

        let render_target = match &self.config {
            KindConfig::Color {
                msaa_framebuffer: Some(msaa),
                ..
            } => Some(*msaa),
            _ => self.framebuffer,
        };
        device.bind_framebuffer(render_target);
        device.set_viewport(self.size);
        if !self.clear_flags.is_empty() {
            device.clear(self.clear_flags);
        }
    }

    /// Drains (or, for shadow cascades, replays) the queue.
    fn perform(
        &mut self,
        device: &mut dyn RenderDevice,
        executor: &mut RenderStateExecutor,
        ctx: &FrameContext,
    ) {
        match &self.config {
            KindConfig::Shadow(cfg) => {
                let splits = shadow_utils::compute_cascade_splits(
                    cfg.cascade_count,
                    ctx.camera.near.max(0.1),
                    ctx.camera.far,
                    cfg.split_lambda,
                );

                // One draw stream, replayed per cascade against a different
                // attachment layer and light matrix; the queue flushes only
                // on the final cascade.
                let mut slice_near = ctx.camera.near.max(0.1);
                for cascade in 0..cfg.cascade_count {
                    let slice_far = splits[cascade as usize];
                    let corners = shadow_utils::compute_frustum_corners_world(
                        &ctx.camera,
                        slice_near,
                        slice_far,
                    );
                    let light_vp = shadow_utils::build_cascade_vp(
                        ctx.light_direction,
                        &corners,
                        cfg.map_size,
                        cfg.caster_extension,
                    );

                    if let Some(buffer) = cfg.light_buffer {
                        device.write_uniform_buffer(buffer, 0, bytemuck::bytes_of(&light_vp));
                        executor.bind_uniform_buffer(device, UniformSlot::Light, buffer);
                    }
                    if let Some(framebuffer) = self.framebuffer {
                        device.bind_framebuffer_layer(framebuffer, cascade);
                        device.clear(ClearFlags::DEPTH);
                    }

                    let last = cascade + 1 == cfg.cascade_count;
                    self.queue.submit(executor, device, last);
                    slice_near = slice_far;
                }
            }
            _ => self.queue.submit(executor, device, true),
        }
    }

    /// Resolves multisampling and feeds any downstream blit target.
    fn resolve(&mut self, device: &mut dyn RenderDevice, target: Option<BlitTarget>) {
        if let (KindConfig::Color {
            msaa_framebuffer: Some(msaa),
            ..
        }, Some(primary)) = (&self.config, self.framebuffer)
        {
            device.blit(*msaa, Some(primary), self.size);
        }

        if let (Some(target), Some(framebuffer)) = (target, self.framebuffer) {
            let destination = match target {
                BlitTarget::Backbuffer => None,
                BlitTarget::Framebuffer(handle) => Some(handle),
            };
            device.blit(framebuffer, destination, self.size);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_order_matches_dependency_order() {
        for kind in PassKind::ORDERED {
            for dep in kind.dependencies() {
                assert!(
                    dep.index() < kind.index(),
                    "{} must run before {}",
                    dep.name(),
                    kind.name()
                );
            }
        }
    }

    #[test]
    fn roots_have_no_dependencies() {
        assert!(PassKind::Depth.dependencies().is_empty());
        assert!(PassKind::Shadow.dependencies().is_empty());
        assert_eq!(PassKind::Color.dependencies(), &[PassKind::Depth, PassKind::Shadow]);
    }
}
