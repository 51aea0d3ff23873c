use std::sync::Arc;

use smallvec::SmallVec;

use crate::env::EnvironmentParams;
use crate::errors::*;
use crate::math::prelude::*;

use super::backends::StandardUniforms;
use super::capabilities::{FeatureLevel, TextureFormat};
use super::device::Device;
use super::shader::ShaderProgram;
use super::states::{
    BlendMode, CullMode, DepthFunction, RenderState, ScissorRect, TextureHandle, Viewport,
    MAX_TEXTURE_UNITS,
};

/// A lightweight handle onto the shared [`Device`], carrying its own copy of
/// the per-frame uniform values and render state.
///
/// Creating the first renderer creates the device; the last renderer to go
/// away releases it. Renderers are cheap, so make one per thread (or per
/// subsystem) that submits draws and keep it around.
///
/// [`Device`]: struct.Device.html
pub struct Renderer {
    device: Arc<Device>,

    model_view_projection: Matrix4<f32>,
    model: Matrix4<f32>,
    color: Color<f32>,
    light_pos: Vector3<f32>,
    camera_pos: Vector3<f32>,
    bone_transforms: SmallVec<[Matrix4<f32>; 16]>,

    render_state: RenderState,
    textures: SmallVec<[Option<TextureHandle>; MAX_TEXTURE_UNITS]>,
    frame_open: bool,
}

impl Renderer {
    /// Creates a renderer attached to the shared device, creating the
    /// device when this is the first renderer alive.
    pub fn new() -> Self {
        Renderer {
            device: super::acquire(),
            model_view_projection: Matrix4::identity(),
            model: Matrix4::identity(),
            color: Color::white(),
            light_pos: Vector3::zero(),
            camera_pos: Vector3::zero(),
            bone_transforms: SmallVec::new(),
            render_state: RenderState::default(),
            textures: SmallVec::from_elem(None, MAX_TEXTURE_UNITS),
            frame_open: false,
        }
    }

    /// The shared device behind this renderer.
    #[inline]
    pub fn device(&self) -> &Arc<Device> {
        &self.device
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer::new()
    }
}

// Device lifecycle, forwarded for convenience.
impl Renderer {
    /// See [`Device::initialize`](struct.Device.html#method.initialize).
    #[inline]
    pub fn initialize(&self, params: EnvironmentParams) -> Result<()> {
        self.device.initialize(params)
    }

    /// See [`Device::initialize_headless`](struct.Device.html#method.initialize_headless).
    #[inline]
    pub fn initialize_headless(&self) -> Result<()> {
        self.device.initialize_headless()
    }

    /// Swaps frames, resetting the depth function to its default of
    /// [`DepthFunction::Less`] for the frame to come.
    ///
    /// [`DepthFunction::Less`]: enum.DepthFunction.html
    pub fn advance_frame(&mut self, minimized: bool, time: f64) {
        assert!(
            !self.frame_open,
            "advance_frame inside a begin/end rendering bracket"
        );
        self.device.advance_frame(minimized, time);
        self.set_depth_function(DepthFunction::Less);
    }

    /// See [`Device::shut_down`](struct.Device.html#method.shut_down).
    #[inline]
    pub fn shut_down(&self) {
        self.device.shut_down();
    }

    /// Marks the start of draw submission for this frame, setting the
    /// viewport to the full framebuffer.
    pub fn begin_rendering(&mut self) {
        assert!(!self.frame_open, "begin_rendering twice without an end");
        self.frame_open = true;

        let size = self.device.viewport_size();
        self.set_viewport(Viewport {
            position: Vector2::new(0, 0),
            size,
        });
    }

    /// Marks the end of draw submission for this frame.
    pub fn end_rendering(&mut self) {
        assert!(self.frame_open, "end_rendering without a begin");
        self.frame_open = false;
        self.device.flush();
    }
}

// Render state.
impl Renderer {
    /// Sets the blend mode with the default blend amount of 0.5.
    #[inline]
    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.set_blend_mode_with_amount(mode, 0.5);
    }

    /// Sets the blend mode. `amount` only matters for [`BlendMode::Test`],
    /// where it is the alpha cutoff.
    ///
    /// [`BlendMode::Test`]: enum.BlendMode.html
    pub fn set_blend_mode_with_amount(&mut self, mode: BlendMode, amount: f32) {
        self.render_state.blend = mode;
        self.render_state.blend_amount = amount;
        self.device.apply_blend_mode(mode, amount);
    }

    pub fn set_culling(&mut self, mode: CullMode) {
        self.render_state.cull = mode;
        self.device.apply_cull_mode(mode);
    }

    pub fn set_depth_function(&mut self, function: DepthFunction) {
        self.render_state.depth_function = function;
        self.device.apply_depth_function(function);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.render_state.viewport = viewport;
        self.device.apply_viewport(viewport);
    }

    /// Restricts rendering to a sub-rectangle of the framebuffer, in
    /// pixels.
    pub fn scissor_on(&mut self, position: Vector2<i32>, size: Vector2<u32>) {
        let rect = ScissorRect { position, size };
        self.render_state.scissor = Some(rect);
        self.device.apply_scissor(Some(rect));
    }

    pub fn scissor_off(&mut self) {
        self.render_state.scissor = None;
        self.device.apply_scissor(None);
    }

    /// Binds an externally created texture object to a texture unit.
    pub fn set_texture(&mut self, unit: u32, texture: TextureHandle) {
        assert!(
            (unit as usize) < MAX_TEXTURE_UNITS,
            "texture unit {} out of range",
            unit
        );
        self.textures[unit as usize] = Some(texture);
        self.device.apply_texture(unit, texture);
    }

    #[inline]
    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    #[inline]
    pub fn blend_mode(&self) -> BlendMode {
        self.render_state.blend
    }

    #[inline]
    pub fn depth_function(&self) -> DepthFunction {
        self.render_state.depth_function
    }

    #[inline]
    pub fn texture(&self, unit: u32) -> Option<TextureHandle> {
        self.textures.get(unit as usize).cloned().unwrap_or(None)
    }

    /// Clears the color buffer to `color` and the depth buffer to its
    /// farthest value.
    pub fn clear_frame_buffer(&mut self, color: Color<f32>) {
        self.device.apply_clear(Some(color), Some(1.0));
    }

    /// Clears the depth buffer only, leaving color untouched.
    pub fn clear_depth_buffer(&mut self) {
        self.device.apply_clear(None, Some(1.0));
    }
}

// Standard uniforms.
impl Renderer {
    #[inline]
    pub fn set_model_view_projection(&mut self, mvp: Matrix4<f32>) {
        self.model_view_projection = mvp;
    }

    #[inline]
    pub fn model_view_projection(&self) -> Matrix4<f32> {
        self.model_view_projection
    }

    #[inline]
    pub fn set_model(&mut self, model: Matrix4<f32>) {
        self.model = model;
    }

    #[inline]
    pub fn model(&self) -> Matrix4<f32> {
        self.model
    }

    #[inline]
    pub fn set_color(&mut self, color: Color<f32>) {
        self.color = color;
    }

    #[inline]
    pub fn color(&self) -> Color<f32> {
        self.color
    }

    #[inline]
    pub fn set_light_pos(&mut self, pos: Vector3<f32>) {
        self.light_pos = pos;
    }

    #[inline]
    pub fn light_pos(&self) -> Vector3<f32> {
        self.light_pos
    }

    #[inline]
    pub fn set_camera_pos(&mut self, pos: Vector3<f32>) {
        self.camera_pos = pos;
    }

    #[inline]
    pub fn camera_pos(&self) -> Vector3<f32> {
        self.camera_pos
    }

    /// Copies the skinning palette for the next shader bind. Check
    /// [`max_vertex_uniform_components`] before using large palettes.
    ///
    /// [`max_vertex_uniform_components`]: #method.max_vertex_uniform_components
    pub fn set_bone_transforms(&mut self, transforms: &[Matrix4<f32>]) {
        self.bone_transforms.clear();
        self.bone_transforms.extend_from_slice(transforms);
    }

    #[inline]
    pub fn bone_transforms(&self) -> &[Matrix4<f32>] {
        &self.bone_transforms
    }

    #[inline]
    pub fn num_bones(&self) -> usize {
        self.bone_transforms.len()
    }

    /// Activates a shader program and uploads the current uniform values to
    /// it. Call after the uniforms and render state are what the next draw
    /// needs.
    pub fn bind_shader(&mut self, program: &ShaderProgram) {
        let uniforms = StandardUniforms {
            model_view_projection: self.model_view_projection,
            model: self.model,
            color: self.color,
            light_pos: self.light_pos,
            camera_pos: self.camera_pos,
            time: self.device.time() as f32,
            blend_amount: self.render_state.blend_amount,
            bone_transforms: &self.bone_transforms,
        };
        self.device.apply_shader(program.handle(), &uniforms);
    }
}

// Shader management and capability queries, forwarded for convenience.
impl Renderer {
    /// See [`Device::compile_and_link_shader`](struct.Device.html#method.compile_and_link_shader).
    #[inline]
    pub fn compile_and_link_shader(&self, vs: &str, fs: &str) -> Result<ShaderProgram> {
        self.device.compile_and_link_shader(vs, fs)
    }

    /// See [`Device::recompile_shader`](struct.Device.html#method.recompile_shader).
    /// Additionally asserts this renderer is not in the middle of draw
    /// submission.
    #[inline]
    pub fn recompile_shader(&self, vs: &str, fs: &str, existing: &ShaderProgram) -> Result<()> {
        assert!(
            !self.frame_open,
            "recompile_shader inside a begin/end rendering bracket"
        );
        self.device.recompile_shader(vs, fs, existing)
    }

    /// See [`Device::delete_shader`](struct.Device.html#method.delete_shader).
    #[inline]
    pub fn delete_shader(&self, program: ShaderProgram) {
        self.device.delete_shader(program);
    }

    /// See [`Device::program_linked`](struct.Device.html#method.program_linked).
    #[inline]
    pub fn program_linked(&self, program: &ShaderProgram) -> bool {
        self.device.program_linked(program)
    }

    #[inline]
    pub fn feature_level(&self) -> FeatureLevel {
        self.device.feature_level()
    }

    #[inline]
    pub fn supports_texture_format(&self, format: TextureFormat) -> bool {
        self.device.supports_texture_format(format)
    }

    #[inline]
    pub fn supports_texture_npot(&self) -> bool {
        self.device.supports_texture_npot()
    }

    #[inline]
    pub fn max_vertex_uniform_components(&self) -> i32 {
        self.device.max_vertex_uniform_components()
    }

    #[inline]
    pub fn allow_multi_threading(&self) -> bool {
        self.device.allow_multi_threading()
    }

    #[inline]
    pub fn set_window_size(&self, size: Vector2<u32>) {
        self.device.set_window_size(size);
    }

    #[inline]
    pub fn window_size(&self) -> Vector2<u32> {
        self.device.window_size()
    }

    #[inline]
    pub fn viewport_size(&self) -> Vector2<u32> {
        self.device.viewport_size()
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.device.time()
    }

    #[inline]
    pub fn last_error(&self) -> String {
        self.device.last_error()
    }

    #[inline]
    pub fn set_last_error<T: Into<String>>(&self, last_error: T) {
        self.device.set_last_error(last_error);
    }

    #[inline]
    pub fn force_blend_mode(&self) -> Option<BlendMode> {
        self.device.force_blend_mode()
    }

    #[inline]
    pub fn set_force_blend_mode(&self, mode: Option<BlendMode>) {
        self.device.set_force_blend_mode(mode);
    }

    #[inline]
    pub fn set_override_fragment_shader(&self, fs: Option<String>) {
        self.device.set_override_fragment_shader(fs);
    }
}
