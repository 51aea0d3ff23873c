use crate::errors::*;
use crate::math::prelude::Color;

use super::super::capabilities::Capabilities;
use super::super::shader::ShaderHandle;
use super::super::states::{
    BlendMode, CullMode, DepthFunction, ScissorRect, TextureHandle, Viewport,
};
use super::{StandardUniforms, Visitor};

pub struct HeadlessVisitor {
    capabilities: Capabilities,
}

impl HeadlessVisitor {
    pub fn new() -> Self {
        HeadlessVisitor {
            capabilities: Capabilities::headless(),
        }
    }
}

impl Visitor for HeadlessVisitor {
    #[inline]
    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    unsafe fn create_shader(&mut self, _: ShaderHandle, _: &str, _: &str) -> Result<()> {
        Ok(())
    }

    unsafe fn rebuild_shader(&mut self, _: ShaderHandle, _: &str, _: &str) -> Result<()> {
        Ok(())
    }

    unsafe fn delete_shader(&mut self, _: ShaderHandle) -> Result<()> {
        Ok(())
    }

    unsafe fn bind_shader(&mut self, _: ShaderHandle, _: &StandardUniforms) -> Result<()> {
        Ok(())
    }

    unsafe fn set_blend_mode(&mut self, _: BlendMode, _: f32) -> Result<()> {
        Ok(())
    }

    unsafe fn set_cull_mode(&mut self, _: CullMode) -> Result<()> {
        Ok(())
    }

    unsafe fn set_depth_function(&mut self, _: DepthFunction) -> Result<()> {
        Ok(())
    }

    unsafe fn set_scissor(&mut self, _: Option<ScissorRect>) -> Result<()> {
        Ok(())
    }

    unsafe fn set_viewport(&mut self, _: Viewport) -> Result<()> {
        Ok(())
    }

    unsafe fn bind_texture(&mut self, _: u32, _: TextureHandle) -> Result<()> {
        Ok(())
    }

    unsafe fn clear(&mut self, _: Option<Color<f32>>, _: Option<f32>) -> Result<()> {
        Ok(())
    }

    unsafe fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    unsafe fn advance(&mut self) -> Result<()> {
        Ok(())
    }
}
