//! Renderer configuration.
//!
//! Settings are plain data injected at frame-graph construction; nothing
//! here is read from the environment or mutated at runtime.

/// Tunables for the frame graph and its passes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RendererSettings {
    /// MSAA sample count for the color pass; `1` disables the intermediate
    /// multisampled framebuffer.
    pub msaa_samples: u32,
    /// Side length of the (square, layered) shadow map.
    pub shadow_map_size: u32,
    /// Cascade count, clamped to the supported maximum.
    pub shadow_cascades: u32,
    /// Practical Split Scheme blend: `0.0` uniform, `1.0` logarithmic.
    pub cascade_split_lambda: f32,
    /// Extra light-space depth to catch casters outside the view frustum.
    pub shadow_caster_extension: f32,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            msaa_samples: 4,
            shadow_map_size: 2048,
            shadow_cascades: 4,
            cascade_split_lambda: 0.5,
            shadow_caster_extension: 50.0,
        }
    }
}
