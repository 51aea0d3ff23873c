use gl;
use gl::types::*;

use super::super::super::states::{BlendMode, CullMode, DepthFunction};

impl From<DepthFunction> for GLenum {
    fn from(function: DepthFunction) -> Self {
        match function {
            // `Disabled` turns the depth test off entirely; the comparison
            // enum is never submitted in that case.
            DepthFunction::Disabled => gl::ALWAYS,
            DepthFunction::Never => gl::NEVER,
            DepthFunction::Always => gl::ALWAYS,
            DepthFunction::Less => gl::LESS,
            DepthFunction::LessEqual => gl::LEQUAL,
            DepthFunction::Greater => gl::GREATER,
            DepthFunction::GreaterEqual => gl::GEQUAL,
            DepthFunction::Equal => gl::EQUAL,
            DepthFunction::NotEqual => gl::NOTEQUAL,
        }
    }
}

/// The cull face to submit, or `None` to disable culling.
pub fn cull_face(mode: CullMode) -> Option<GLenum> {
    match mode {
        CullMode::Nothing => None,
        CullMode::Front => Some(gl::FRONT),
        CullMode::Back => Some(gl::BACK),
        CullMode::FrontAndBack => Some(gl::FRONT_AND_BACK),
    }
}

/// The source and destination blend factors to submit, or `None` to disable
/// blending. `Test` carries no fixed-function equivalent under core
/// profiles; the cutoff is delivered through the standard uniforms and the
/// fragment shader discards below it.
pub fn blend_factors(mode: BlendMode) -> Option<(GLenum, GLenum)> {
    match mode {
        BlendMode::Off | BlendMode::Test => None,
        BlendMode::Alpha => Some((gl::SRC_ALPHA, gl::ONE_MINUS_SRC_ALPHA)),
        BlendMode::Add => Some((gl::ONE, gl::ONE)),
        BlendMode::AddAlpha => Some((gl::SRC_ALPHA, gl::ONE)),
        BlendMode::Multiply => Some((gl::DST_COLOR, gl::ZERO)),
        BlendMode::PreMultipliedAlpha => Some((gl::ONE, gl::ONE_MINUS_SRC_ALPHA)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blending_is_off_for_opaque_modes() {
        assert_eq!(blend_factors(BlendMode::Off), None);
        assert_eq!(blend_factors(BlendMode::Test), None);
        assert!(blend_factors(BlendMode::Alpha).is_some());
    }
}
