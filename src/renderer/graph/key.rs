//! Draw-order sort keys.
//!
//! A [`SortKey`] packs a task's ordering-relevant state into one `u64` so a
//! whole queue orders with a single integer sort. The packing order IS the
//! ordering contract: fields higher in the key dominate everything below
//! them. Layout, high bit to low:
//!
//! ```text
//! bits 47-50  fullscreen layer
//! bits 43-46  render layer
//! bits 40-42  blend mode
//! opaque:      bits 24-39 shader id, bits 0-23 depth (ascending, front-to-back)
//! translucent: bits 16-39 inverted depth (back-to-front), bits 0-15 shader id
//! ```
//!
//! Opaque draws batch by shader first and then run front-to-back for early
//! depth rejection; translucent draws give distance the upper bits because
//! blending correctness beats shader batching. Fullscreen/UI draws keep
//! ascending depth as a plain z-order even when blended.

use crate::renderer::state::{FullscreenLayer, RenderLayer, StateGroup};

/// 64-bit draw-order key; queues execute in ascending key order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey(u64);

impl SortKey {
    const FULLSCREEN_SHIFT: u32 = 47;
    const LAYER_SHIFT: u32 = 43;
    const BLEND_SHIFT: u32 = 40;
    const OPAQUE_SHADER_SHIFT: u32 = 24;
    const TRANSLUCENT_DEPTH_SHIFT: u32 = 16;

    const DEPTH_MASK: u64 = 0x00FF_FFFF;
    const SHADER_MASK: u64 = 0xFFFF;

    /// Derives the key for a merged task snapshot.
    #[must_use]
    pub fn derive(state: &StateGroup) -> Self {
        let mut key = ((state.fullscreen_layer as u64) << Self::FULLSCREEN_SHIFT)
            | ((state.render_layer as u64) << Self::LAYER_SHIFT)
            | ((state.pipeline.blend_mode as u64) << Self::BLEND_SHIFT);

        let shader = state
            .resources
            .shader
            .map_or(0, |shader| u64::from(shader.0) & Self::SHADER_MASK);
        let depth = u64::from(state.render_depth).min(Self::DEPTH_MASK);

        if state.pipeline.blend_mode.is_translucent() {
            // Screen-space draws z-order ascending; view-space draws invert
            // so that larger distances sort first (back-to-front).
            let screen_space = state.fullscreen_layer != FullscreenLayer::Null
                || state.render_layer == RenderLayer::Ui;
            let depth_field = if screen_space {
                depth
            } else {
                Self::DEPTH_MASK - depth
            };
            key |= (depth_field << Self::TRANSLUCENT_DEPTH_SHIFT) | shader;
        } else {
            key |= (shader << Self::OPAQUE_SHADER_SHIFT) | depth;
        }

        Self(key)
    }

    /// Raw packed value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::backend::{BlendMode, ShaderHandle};
    use crate::renderer::state::PipelineState;

    fn state(blend: BlendMode, shader: u32, depth: u32) -> StateGroup {
        let mut group = StateGroup {
            pipeline: PipelineState {
                blend_mode: blend,
                ..PipelineState::default()
            },
            render_layer: RenderLayer::Dynamic,
            render_depth: depth,
            ..StateGroup::default()
        };
        group.resources.shader = Some(ShaderHandle(shader));
        group
    }

    #[test]
    fn field_placement_is_bit_exact() {
        let key = SortKey::derive(&state(BlendMode::Opaque, 0xABCD, 0x12_3456)).raw();
        assert_eq!((key >> 43) & 0xF, RenderLayer::Dynamic as u64);
        assert_eq!((key >> 40) & 0x7, BlendMode::Opaque as u64);
        assert_eq!((key >> 24) & 0xFFFF, 0xABCD);
        assert_eq!(key & 0x00FF_FFFF, 0x12_3456);
    }

    #[test]
    fn opaque_groups_by_shader_before_depth() {
        let near_other_shader = SortKey::derive(&state(BlendMode::Opaque, 2, 1));
        let far_same_shader = SortKey::derive(&state(BlendMode::Opaque, 1, 0x00FF_FFFF));
        assert!(far_same_shader < near_other_shader);
    }

    #[test]
    fn translucent_sorts_back_to_front_before_shader() {
        let far = SortKey::derive(&state(BlendMode::Transparent, 9, 500));
        let near = SortKey::derive(&state(BlendMode::Transparent, 1, 20));
        assert!(far < near, "larger view depth must sort first");
    }

    #[test]
    fn blend_mode_separates_sort_spaces() {
        let opaque = SortKey::derive(&state(BlendMode::Opaque, 0xFFFF, 0x00FF_FFFF));
        let translucent = SortKey::derive(&state(BlendMode::Transparent, 0, 0));
        assert!(opaque < translucent);
    }

    #[test]
    fn layer_dominates_blend_mode() {
        let sky_translucent = SortKey::derive(&StateGroup {
            render_layer: RenderLayer::Sky,
            ..state(BlendMode::Transparent, 5, 10)
        });
        let dynamic_opaque = SortKey::derive(&state(BlendMode::Opaque, 5, 10));
        assert!(sky_translucent < dynamic_opaque);
    }

    #[test]
    fn ui_layer_uses_ascending_z_order() {
        let mut below = state(BlendMode::Transparent, 3, 1);
        below.render_layer = RenderLayer::Ui;
        let mut above = state(BlendMode::Transparent, 3, 9);
        above.render_layer = RenderLayer::Ui;
        assert!(SortKey::derive(&below) < SortKey::derive(&above));
    }

    #[test]
    fn oversized_depth_clamps_into_field() {
        let key = SortKey::derive(&state(BlendMode::Opaque, 1, u32::MAX)).raw();
        assert_eq!(key & 0x00FF_FFFF, 0x00FF_FFFF);
    }
}
