//! The closed set of persistent pipeline switches that affect subsequent
//! draw calls until changed. Invalid combinations do not exist by
//! construction, so the setters on `Renderer` never fail.

use crate::math::prelude::Vector2;

/// An opaque, externally created texture resource. The wrapped value is the
/// backend's native object name; the device performs no validation beyond
/// the capability queries callers are expected to consult up front.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// The maximum number of texture units a renderer keeps bindings for.
pub const MAX_TEXTURE_UNITS: usize = 8;

/// Specifies how incoming fragments (source) are combined with the RGBA
/// already in the framebuffer (destination).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BlendMode {
    /// Blending is disabled.
    Off,
    /// Alpha test: discard fragments with alpha below the configured amount.
    /// Under core profiles the test itself runs in the fragment shader; the
    /// amount travels with the standard uniforms.
    Test,
    /// Classic transparency, `src_alpha` over `1 - src_alpha`.
    Alpha,
    /// Additive blending.
    Add,
    /// Additive blending scaled by source alpha.
    AddAlpha,
    /// Multiplies framebuffer with source color.
    Multiply,
    /// Transparency for pre-multiplied alpha sources.
    PreMultipliedAlpha,
}

impl Default for BlendMode {
    fn default() -> Self {
        BlendMode::Off
    }
}

/// Which polygon faces are culled. By default, no culling happens.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CullMode {
    Nothing,
    Front,
    Back,
    FrontAndBack,
}

impl Default for CullMode {
    fn default() -> Self {
        CullMode::Nothing
    }
}

/// How fragments are compared against the Z-buffer before writing.
///
/// Every frame advance resets the active function to `Less`, so a custom
/// comparison never leaks across frame boundaries.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DepthFunction {
    /// Depth testing and depth writes are off.
    Disabled,
    Never,
    Always,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl Default for DepthFunction {
    fn default() -> Self {
        DepthFunction::Less
    }
}

/// The viewport region in pixels, relative to the lower left corner of the
/// drawable area.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Viewport {
    pub position: Vector2<i32>,
    pub size: Vector2<u32>,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            position: Vector2::new(0, 0),
            size: Vector2::new(0, 0),
        }
    }
}

/// The scissor box in screen pixels. Fragments outside of it are dropped.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ScissorRect {
    pub position: Vector2<i32>,
    pub size: Vector2<u32>,
}

/// The persistent render state carried by every renderer handle. Changes are
/// visible only through draw calls issued via the same handle afterwards.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct RenderState {
    pub blend: BlendMode,
    /// The cutoff used with `BlendMode::Test`.
    pub blend_amount: f32,
    pub cull: CullMode,
    pub depth_function: DepthFunction,
    /// `None` leaves scissoring off.
    pub scissor: Option<ScissorRect>,
    pub viewport: Viewport,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            blend: BlendMode::Off,
            blend_amount: 0.5,
            cull: CullMode::Nothing,
            depth_function: DepthFunction::Less,
            scissor: None,
            viewport: Viewport::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let state = RenderState::default();
        assert_eq!(state.blend, BlendMode::Off);
        assert_eq!(state.cull, CullMode::Nothing);
        assert_eq!(state.depth_function, DepthFunction::Less);
        assert_eq!(state.scissor, None);
    }
}
