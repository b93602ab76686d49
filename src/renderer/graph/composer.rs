//! Frame graph composition.
//!
//! [`FrameGraph`] owns the fixed pass set and the state executor. Passes
//! are explicit, constructor-injected instances created once here, in
//! dependency order: a pass's upstream outputs are wired into its base
//! state before any later pass exists, so the graph cannot form a cycle.

use std::sync::Arc;

use log::info;

use crate::errors::Result;
use crate::renderer::backend::{Extent, RenderDevice};
use crate::renderer::settings::RendererSettings;
use crate::renderer::state::RenderStateExecutor;

use super::context::FrameContext;
use super::pass::{BlitTarget, PassKind, RenderPass};
use super::task::RenderTask;

/// The renderer's pass set and per-frame driver.
pub struct FrameGraph {
    passes: [RenderPass; PassKind::COUNT],
    executor: RenderStateExecutor,
    settings: RendererSettings,
}

impl FrameGraph {
    /// Builds and initializes every pass in dependency order.
    pub fn new(
        device: &mut dyn RenderDevice,
        settings: RendererSettings,
        size: Extent,
    ) -> Result<Self> {
        info!(
            "building frame graph ({}x{}, {}x msaa, {} shadow cascades)",
            size.width, size.height, settings.msaa_samples, settings.shadow_cascades
        );

        let mut depth = RenderPass::depth(size);
        depth.initialize(device, &[])?;

        let mut shadow = RenderPass::shadow(&settings);
        shadow.initialize(device, &[])?;

        let mut color = RenderPass::color(size, settings.msaa_samples);
        color.initialize(device, &[&depth, &shadow])?;

        let mut post = RenderPass::post(size);
        post.initialize(device, &[&color])?;

        let mut ui = RenderPass::ui(size);
        ui.initialize(device, &[&post])?;

        Ok(Self {
            passes: [depth, shadow, color, post, ui],
            executor: RenderStateExecutor::new(),
            settings,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    #[must_use]
    pub fn pass(&self, kind: PassKind) -> &RenderPass {
        &self.passes[kind.index()]
    }

    #[must_use]
    pub fn pass_mut(&mut self, kind: PassKind) -> &mut RenderPass {
        &mut self.passes[kind.index()]
    }

    /// Adds a compiled task to a pass's queue for this frame.
    pub fn enqueue(&mut self, kind: PassKind, task: Arc<RenderTask>) {
        self.passes[kind.index()].queue_mut().add(task);
    }

    /// Runs one frame: every pass in dependency order, the final pass
    /// blitting into the presentation target.
    pub fn render(&mut self, device: &mut dyn RenderDevice, ctx: &FrameContext) {
        for kind in PassKind::ORDERED {
            let target = (kind == PassKind::Ui).then_some(BlitTarget::Backbuffer);
            self.passes[kind.index()].render(device, &mut self.executor, ctx, target);
        }
    }
}
