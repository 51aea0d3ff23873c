//! The backend of the device, responsible for only one thing: turning
//! capability queries, shader requests and render-state changes into
//! low-level video API calls.

pub mod headless;

use crate::errors::*;
use crate::math::prelude::{Color, Matrix4, Vector3};

use super::capabilities::Capabilities;
use super::shader::ShaderHandle;
use super::states::{BlendMode, CullMode, DepthFunction, ScissorRect, TextureHandle, Viewport};

/// The standard uniform values delivered to a program when it is bound.
/// The bone palette is borrowed from the renderer handle for the duration
/// of the call.
#[derive(Debug, Clone, Copy)]
pub struct StandardUniforms<'a> {
    pub model_view_projection: Matrix4<f32>,
    pub model: Matrix4<f32>,
    pub color: Color<f32>,
    pub light_pos: Vector3<f32>,
    pub camera_pos: Vector3<f32>,
    pub time: f32,
    pub blend_amount: f32,
    pub bone_transforms: &'a [Matrix4<f32>],
}

pub trait Visitor: Send {
    /// The capability snapshot parsed when the backend came up. Never
    /// recomputed afterwards.
    fn capabilities(&self) -> &Capabilities;

    unsafe fn create_shader(&mut self, handle: ShaderHandle, vs: &str, fs: &str) -> Result<()>;

    /// Replaces the program behind `handle` with a freshly compiled and
    /// linked one. The old program must stay bound to the handle when
    /// compilation or linking fails.
    unsafe fn rebuild_shader(&mut self, handle: ShaderHandle, vs: &str, fs: &str) -> Result<()>;

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()>;

    unsafe fn bind_shader(
        &mut self,
        handle: ShaderHandle,
        uniforms: &StandardUniforms,
    ) -> Result<()>;

    unsafe fn set_blend_mode(&mut self, mode: BlendMode, amount: f32) -> Result<()>;

    unsafe fn set_cull_mode(&mut self, mode: CullMode) -> Result<()>;

    unsafe fn set_depth_function(&mut self, function: DepthFunction) -> Result<()>;

    unsafe fn set_scissor(&mut self, scissor: Option<ScissorRect>) -> Result<()>;

    unsafe fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    unsafe fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> Result<()>;

    unsafe fn clear(&mut self, color: Option<Color<f32>>, depth: Option<f32>) -> Result<()>;

    /// Blocks until all execution is complete. Such effects include all
    /// changes to render state and all changes to the framebuffer contents.
    unsafe fn flush(&mut self) -> Result<()>;

    /// Advances one frame; called exactly once per frame boundary.
    unsafe fn advance(&mut self) -> Result<()>;
}

pub mod gl;

pub fn new() -> Result<Box<dyn Visitor>> {
    let visitor = unsafe { self::gl::visitor::GLVisitor::new()? };
    Ok(Box::new(visitor))
}

pub fn new_headless() -> Box<dyn Visitor> {
    Box::new(self::headless::HeadlessVisitor::new())
}
