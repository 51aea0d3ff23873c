use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CString;
use std::ptr;

use gl;
use gl::types::*;
use smallvec::SmallVec;

use crate::errors::*;
use crate::math::prelude::Color;
use crate::utils::prelude::DataVec;

use super::super::super::capabilities::Capabilities;
use super::super::super::shader::ShaderHandle;
use super::super::super::states::{
    BlendMode, CullMode, DepthFunction, ScissorRect, TextureHandle, Viewport, MAX_TEXTURE_UNITS,
};
use super::super::{StandardUniforms, Visitor};
use super::capabilities::{GLCapabilities, Version};
use super::types;

#[derive(Debug)]
struct GLProgramData {
    id: GLuint,
    uniforms: RefCell<HashMap<String, GLint>>,
}

impl GLProgramData {
    unsafe fn uniform_location(&self, name: &str) -> Result<GLint> {
        let mut uniforms = self.uniforms.borrow_mut();
        if let Some(&location) = uniforms.get(name) {
            return Ok(location);
        }

        let c_name = CString::new(name.as_bytes())?;
        let location = gl::GetUniformLocation(self.id, c_name.as_ptr());
        check()?;

        uniforms.insert(name.to_owned(), location);
        Ok(location)
    }
}

struct GLMutableState {
    blend: BlendMode,
    blend_amount: f32,
    cull: CullMode,
    depth: DepthFunction,
    scissor: Option<ScissorRect>,
    viewport: Viewport,
    bound_shader: Option<ShaderHandle>,
    bound_textures: SmallVec<[Option<TextureHandle>; MAX_TEXTURE_UNITS]>,
}

pub struct GLVisitor {
    state: GLMutableState,
    capabilities: Capabilities,
    programs: DataVec<GLProgramData>,
}

impl GLVisitor {
    /// Parses the context's capabilities and resets the pipeline to a known
    /// state. The GL context must be current in this thread.
    pub unsafe fn new() -> Result<Self> {
        let raw = GLCapabilities::parse()?;
        info!("GLVisitor {:#?}", raw);

        if !(raw.version >= Version::GL(2, 1) || raw.version >= Version::ES(2, 0)) {
            bail!(
                "[GL] The context \"{}\" ({:?}) is below the minimum supported version.",
                raw.renderer,
                raw.version
            );
        }

        let capabilities = raw.snapshot();

        let mut visitor = GLVisitor {
            state: GLMutableState {
                blend: BlendMode::Off,
                blend_amount: 0.5,
                cull: CullMode::Nothing,
                depth: DepthFunction::Less,
                scissor: None,
                viewport: Viewport::default(),
                bound_shader: None,
                bound_textures: SmallVec::new(),
            },
            capabilities,
            programs: DataVec::new(),
        };

        Self::reset_render_state(&mut visitor.state)?;
        Ok(visitor)
    }

    unsafe fn reset_render_state(state: &mut GLMutableState) -> Result<()> {
        gl::Disable(gl::CULL_FACE);
        state.cull = CullMode::Nothing;

        gl::FrontFace(gl::CCW);

        gl::Enable(gl::DEPTH_TEST);
        gl::DepthFunc(gl::LESS);
        gl::DepthMask(gl::TRUE);
        state.depth = DepthFunction::Less;

        gl::Disable(gl::BLEND);
        state.blend = BlendMode::Off;

        gl::Disable(gl::SCISSOR_TEST);
        state.scissor = None;

        gl::ColorMask(1, 1, 1, 1);
        gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
        gl::BindFramebuffer(gl::FRAMEBUFFER, 0);

        check()
    }

    unsafe fn compile(stage: GLenum, src: &str) -> Result<GLuint> {
        let shader = gl::CreateShader(stage);
        let c_str = CString::new(src.as_bytes())?;
        gl::ShaderSource(shader, 1, &c_str.as_ptr(), ptr::null());
        gl::CompileShader(shader);

        let mut status = GLint::from(gl::FALSE);
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);
        if status != GLint::from(gl::TRUE) {
            let log = info_log(shader, InfoLogKind::Shader);
            gl::DeleteShader(shader);
            bail!("Failed to compile shader:\n{}", log);
        }

        Ok(shader)
    }

    unsafe fn link(vso: GLuint, fso: GLuint) -> Result<GLuint> {
        let program = gl::CreateProgram();
        gl::AttachShader(program, vso);
        gl::AttachShader(program, fso);
        gl::LinkProgram(program);

        let mut status = GLint::from(gl::FALSE);
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);
        if status != GLint::from(gl::TRUE) {
            let log = info_log(program, InfoLogKind::Program);
            gl::DeleteProgram(program);
            bail!("Failed to link program:\n{}", log);
        }

        Ok(program)
    }

    /// Compiles both stages and links them. Nothing is left behind on
    /// failure; the stage objects are flagged for deletion once linked.
    unsafe fn build_program(vs: &str, fs: &str) -> Result<GLuint> {
        let vso = Self::compile(gl::VERTEX_SHADER, vs)?;
        let fso = match Self::compile(gl::FRAGMENT_SHADER, fs) {
            Ok(v) => v,
            Err(err) => {
                gl::DeleteShader(vso);
                return Err(err);
            }
        };

        let program = Self::link(vso, fso);
        gl::DeleteShader(vso);
        gl::DeleteShader(fso);
        program
    }

    unsafe fn bind_uniform_matrix(program: &GLProgramData, name: &str, m: &[f32; 16]) -> Result<()> {
        let location = program.uniform_location(name)?;
        if location >= 0 {
            gl::UniformMatrix4fv(location, 1, gl::FALSE, m.as_ptr());
        }
        Ok(())
    }

    unsafe fn bind_uniform_f32(program: &GLProgramData, name: &str, v: f32) -> Result<()> {
        let location = program.uniform_location(name)?;
        if location >= 0 {
            gl::Uniform1f(location, v);
        }
        Ok(())
    }
}

impl Visitor for GLVisitor {
    #[inline]
    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    unsafe fn create_shader(&mut self, handle: ShaderHandle, vs: &str, fs: &str) -> Result<()> {
        let id = Self::build_program(vs, fs)?;
        self.programs.create(
            handle,
            GLProgramData {
                id,
                uniforms: RefCell::new(HashMap::new()),
            },
        );

        check()
    }

    unsafe fn rebuild_shader(&mut self, handle: ShaderHandle, vs: &str, fs: &str) -> Result<()> {
        // Build the replacement first so the old program stays valid when
        // either stage fails.
        let id = Self::build_program(vs, fs)?;

        let data = match self.programs.get_mut(handle) {
            Some(data) => data,
            None => {
                gl::DeleteProgram(id);
                bail!("{} is invalid.", handle);
            }
        };

        gl::DeleteProgram(data.id);
        data.id = id;
        data.uniforms.borrow_mut().clear();

        // The binding might point at the deleted object; force a rebind on
        // the next use.
        if self.state.bound_shader == Some(handle) {
            self.state.bound_shader = None;
        }

        check()
    }

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        let data = self
            .programs
            .free(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        if self.state.bound_shader == Some(handle) {
            gl::UseProgram(0);
            self.state.bound_shader = None;
        }

        gl::DeleteProgram(data.id);
        check()
    }

    unsafe fn bind_shader(
        &mut self,
        handle: ShaderHandle,
        uniforms: &StandardUniforms,
    ) -> Result<()> {
        let program = self
            .programs
            .get(handle)
            .ok_or_else(|| format_err!("{} is invalid.", handle))?;

        if self.state.bound_shader != Some(handle) {
            gl::UseProgram(program.id);
            self.state.bound_shader = Some(handle);
        }

        Self::bind_uniform_matrix(
            program,
            "model_view_projection",
            uniforms.model_view_projection.as_ref(),
        )?;
        Self::bind_uniform_matrix(program, "model", uniforms.model.as_ref())?;
        Self::bind_uniform_f32(program, "time", uniforms.time)?;
        Self::bind_uniform_f32(program, "blend_amount", uniforms.blend_amount)?;

        let location = program.uniform_location("color")?;
        if location >= 0 {
            let v: [f32; 4] = uniforms.color.into();
            gl::Uniform4fv(location, 1, v.as_ptr());
        }

        let location = program.uniform_location("light_pos")?;
        if location >= 0 {
            let v: &[f32; 3] = uniforms.light_pos.as_ref();
            gl::Uniform3fv(location, 1, v.as_ptr());
        }

        let location = program.uniform_location("camera_pos")?;
        if location >= 0 {
            let v: &[f32; 3] = uniforms.camera_pos.as_ref();
            gl::Uniform3fv(location, 1, v.as_ptr());
        }

        if !uniforms.bone_transforms.is_empty() {
            let location = program.uniform_location("bone_transforms")?;
            if location >= 0 {
                gl::UniformMatrix4fv(
                    location,
                    uniforms.bone_transforms.len() as GLsizei,
                    gl::FALSE,
                    uniforms.bone_transforms.as_ptr() as *const f32,
                );
            }
        }

        check()
    }

    unsafe fn set_blend_mode(&mut self, mode: BlendMode, amount: f32) -> Result<()> {
        let state = &mut self.state;

        if state.blend != mode {
            match types::blend_factors(mode) {
                Some((src, dst)) => {
                    if types::blend_factors(state.blend).is_none() {
                        gl::Enable(gl::BLEND);
                    }
                    gl::BlendFunc(src, dst);
                }
                None => {
                    if types::blend_factors(state.blend).is_some() {
                        gl::Disable(gl::BLEND);
                    }
                }
            }

            state.blend = mode;
            check()?;
        }

        state.blend_amount = amount;
        Ok(())
    }

    unsafe fn set_cull_mode(&mut self, mode: CullMode) -> Result<()> {
        let state = &mut self.state;

        if state.cull != mode {
            match types::cull_face(mode) {
                Some(face) => {
                    if state.cull == CullMode::Nothing {
                        gl::Enable(gl::CULL_FACE);
                    }
                    gl::CullFace(face);
                }
                None => gl::Disable(gl::CULL_FACE),
            }

            state.cull = mode;
            check()?;
        }

        Ok(())
    }

    unsafe fn set_depth_function(&mut self, function: DepthFunction) -> Result<()> {
        let state = &mut self.state;

        if state.depth != function {
            if function == DepthFunction::Disabled {
                gl::Disable(gl::DEPTH_TEST);
                gl::DepthMask(gl::FALSE);
            } else {
                if state.depth == DepthFunction::Disabled {
                    gl::Enable(gl::DEPTH_TEST);
                    gl::DepthMask(gl::TRUE);
                }
                gl::DepthFunc(function.into());
            }

            state.depth = function;
            check()?;
        }

        Ok(())
    }

    unsafe fn set_scissor(&mut self, scissor: Option<ScissorRect>) -> Result<()> {
        let state = &mut self.state;

        match scissor {
            Some(rect) => {
                if state.scissor.is_none() {
                    gl::Enable(gl::SCISSOR_TEST);
                }
                gl::Scissor(
                    rect.position.x,
                    rect.position.y,
                    rect.size.x as i32,
                    rect.size.y as i32,
                );
            }
            None => {
                if state.scissor.is_some() {
                    gl::Disable(gl::SCISSOR_TEST);
                }
            }
        }

        state.scissor = scissor;
        check()
    }

    unsafe fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        let state = &mut self.state;

        if state.viewport != viewport {
            gl::Viewport(
                viewport.position.x,
                viewport.position.y,
                viewport.size.x as i32,
                viewport.size.y as i32,
            );

            state.viewport = viewport;
            check()?;
        }

        Ok(())
    }

    unsafe fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> Result<()> {
        if unit >= u32::from(self.capabilities.max_texture_units) {
            bail!(
                "Texture unit {} is beyond the {} the hardware supports.",
                unit,
                self.capabilities.max_texture_units
            );
        }

        let state = &mut self.state;
        let index = unit as usize;
        if state.bound_textures.len() <= index {
            state.bound_textures.resize(index + 1, None);
        }

        if state.bound_textures[index] != Some(texture) {
            gl::ActiveTexture(gl::TEXTURE0 + unit);
            gl::BindTexture(gl::TEXTURE_2D, texture.0);
            state.bound_textures[index] = Some(texture);
            check()?;
        }

        Ok(())
    }

    unsafe fn clear(&mut self, color: Option<Color<f32>>, depth: Option<f32>) -> Result<()> {
        let mut bits = 0;

        if let Some(v) = color {
            bits |= gl::COLOR_BUFFER_BIT;
            gl::ClearColor(v.r, v.g, v.b, v.a);
        }

        if let Some(v) = depth {
            bits |= gl::DEPTH_BUFFER_BIT;
            gl::ClearDepth(f64::from(v));
        }

        if bits != 0 {
            gl::Clear(bits);
        }

        check()
    }

    unsafe fn flush(&mut self) -> Result<()> {
        gl::Finish();
        check()
    }

    unsafe fn advance(&mut self) -> Result<()> {
        // External code may have touched the context between two frames;
        // cached bindings are only trusted within one.
        self.state.bound_shader = None;
        self.state.bound_textures.clear();
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum InfoLogKind {
    Shader,
    Program,
}

unsafe fn info_log(object: GLuint, kind: InfoLogKind) -> String {
    let mut len = 0;
    match kind {
        InfoLogKind::Shader => gl::GetShaderiv(object, gl::INFO_LOG_LENGTH, &mut len),
        InfoLogKind::Program => gl::GetProgramiv(object, gl::INFO_LOG_LENGTH, &mut len),
    }

    if len <= 0 {
        return String::new();
    }

    let mut buf = vec![0u8; len as usize];
    match kind {
        InfoLogKind::Shader => {
            gl::GetShaderInfoLog(object, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar)
        }
        InfoLogKind::Program => {
            gl::GetProgramInfoLog(object, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar)
        }
    }

    String::from_utf8_lossy(&buf)
        .trim_end_matches('\u{0}')
        .to_owned()
}

unsafe fn check() -> Result<()> {
    match gl::GetError() {
        gl::NO_ERROR => Ok(()),
        code => bail!("[GL] Backend failure, error code {:#x}.", code),
    }
}
