//! Render tasks.
//!
//! A [`RenderTask`] is one draw call plus the fully-merged state snapshot
//! it runs under. Tasks are compiled fresh every frame from a stack of
//! state groups and are pass-agnostic: the same task can sit in several
//! pass queues at once.

use std::sync::Arc;

use crate::renderer::backend::DrawCall;
use crate::renderer::state::StateGroup;

use super::composer::FrameGraph;
use super::pass::{PassKind, RenderPass};

/// One fully-merged, pass-agnostic draw instruction.
#[derive(Clone, Debug)]
pub struct RenderTask {
    /// Flattened snapshot; no unresolved layering remains.
    pub state: StateGroup,
    pub draw_call: DrawCall,
}

impl RenderTask {
    /// Flattens a state stack into one snapshot.
    ///
    /// `stack` is ordered least to most specific (camera, object, model,
    /// mesh, overrides); `None` entries are skipped. Per field, the most
    /// specific layer that set a value wins; the target pass's base state
    /// ranks below the whole stack, and [`StateGroup::GLOBAL_DEFAULT`]
    /// fills anything nobody set.
    #[must_use]
    pub fn compile(
        draw_call: DrawCall,
        stack: &[Option<&StateGroup>],
        pass: Option<&RenderPass>,
    ) -> Arc<Self> {
        let mut state = StateGroup::default();

        for group in stack.iter().rev().copied().flatten() {
            state.apply(group);
        }

        if let Some(base) = pass.and_then(RenderPass::base_state) {
            state.apply(base);
        }

        state.apply(&StateGroup::GLOBAL_DEFAULT);

        Arc::new(Self { state, draw_call })
    }

    /// Registers this task with each named pass's queue.
    pub fn submit(self: &Arc<Self>, graph: &mut FrameGraph, passes: &[PassKind]) {
        for kind in passes {
            graph.enqueue(*kind, Arc::clone(self));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::backend::{BlendMode, DepthStencilFlags, ShaderHandle};
    use crate::renderer::state::{PipelineState, RenderLayer};

    fn layer(build: impl FnOnce(&mut StateGroup)) -> StateGroup {
        let mut group = StateGroup::default();
        build(&mut group);
        group
    }

    #[test]
    fn most_specific_layer_wins_per_field() {
        let camera = layer(|g| {
            g.render_layer = RenderLayer::Static;
            g.render_depth = 100;
        });
        let material = layer(|g| {
            g.pipeline.blend_mode = BlendMode::Transparent;
            g.render_layer = RenderLayer::Dynamic;
        });
        let override_group = layer(|g| g.render_layer = RenderLayer::Particles);

        let task = RenderTask::compile(
            DrawCall::triangles(3),
            &[Some(&camera), Some(&material), Some(&override_group)],
            None,
        );

        // Overlapping field: the most specific setter wins.
        assert_eq!(task.state.render_layer, RenderLayer::Particles);
        // Disjoint fields: each unique setter's value survives.
        assert_eq!(task.state.pipeline.blend_mode, BlendMode::Transparent);
        assert_eq!(task.state.render_depth, 100);
        // Nothing set depth/stencil: the global default fills it.
        assert_eq!(
            task.state.pipeline.depth_stencil,
            Some(DepthStencilFlags::DEPTH)
        );
    }

    #[test]
    fn null_stack_entries_are_skipped() {
        let only = layer(|g| g.resources.shader = Some(ShaderHandle(3)));
        let task = RenderTask::compile(
            DrawCall::triangles(3),
            &[None, Some(&only), None],
            None,
        );
        assert_eq!(task.state.resources.shader, Some(ShaderHandle(3)));
    }

    #[test]
    fn empty_stack_compiles_to_global_default() {
        let task = RenderTask::compile(DrawCall::triangles(3), &[], None);
        assert_eq!(task.state.pipeline, PipelineState {
            blend_mode: BlendMode::Opaque,
            depth_stencil: StateGroup::GLOBAL_DEFAULT.pipeline.depth_stencil,
            face_cull: StateGroup::GLOBAL_DEFAULT.pipeline.face_cull,
            clear_flags: None,
        });
        assert_eq!(task.state.render_layer, RenderLayer::Invisible);
    }
}
