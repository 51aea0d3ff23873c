use std::sync::{Mutex, RwLock};

use crate::env::{Environment, EnvironmentParams};
use crate::errors::*;
use crate::math::prelude::{Color, Vector2};
use crate::utils::prelude::ObjectPool;

use super::backends::{self, StandardUniforms, Visitor};
use super::capabilities::{Capabilities, FeatureLevel, TextureFormat};
use super::shader::{self, ProgramSlot, ShaderHandle, ShaderProgram};
use super::states::{BlendMode, CullMode, DepthFunction, ScissorRect, TextureHandle, Viewport};

/// Where the device is in its life. Frame advance, shader work and
/// capability queries are valid in `Initialized` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Initialized,
    ShutDown,
}

#[derive(Debug)]
struct DeviceState {
    phase: Phase,
    /// Seconds since program start, updated once per frame only.
    time: f64,
    last_error: String,
    force_blend_mode: Option<BlendMode>,
    override_fragment_shader: Option<String>,
}

/// The single owner of the GPU context/window and of the device-wide
/// capabilities.
///
/// Do not construct this yourself: ownership is shared amongst all
/// [`Renderer`] handles, the first of which brings the device to life and
/// the last of which tears it down. All of the device functionality is also
/// available on `Renderer` through delegation, so prefer going through a
/// renderer when you have one around.
///
/// [`Renderer`]: struct.Renderer.html
pub struct Device {
    state: RwLock<DeviceState>,
    environment: Mutex<Option<Environment>>,
    visitor: Mutex<Option<Box<dyn Visitor>>>,
    // Written exactly once while initializing, read-only afterwards.
    capabilities: RwLock<Option<Capabilities>>,
    programs: Mutex<ObjectPool<ShaderHandle, ProgramSlot>>,
}

// The context itself is thread-affine; whether draw submission from several
// renderers at once is legal is reported by `allow_multi_threading()`, and
// callers of backends that disallow it serialize externally. The device's
// own bookkeeping is guarded by the interior locks.
unsafe impl Send for Device {}
unsafe impl Sync for Device {}

impl Device {
    pub(crate) fn new() -> Self {
        Device {
            state: RwLock::new(DeviceState {
                phase: Phase::Uninitialized,
                time: 0.0,
                last_error: String::new(),
                force_blend_mode: None,
                override_fragment_shader: None,
            }),
            environment: Mutex::new(None),
            visitor: Mutex::new(None),
            capabilities: RwLock::new(None),
            programs: Mutex::new(ObjectPool::new()),
        }
    }

    /// Initializes the device by bringing up the environment (window and
    /// context) and running the one-shot capability queries.
    ///
    /// On failure a descriptive message is stored and retrievable via
    /// [`last_error`], the device stays `Uninitialized`, and another attempt
    /// is permitted. Re-initializing after a *successful* call is undefined
    /// and must be avoided by the caller.
    ///
    /// [`last_error`]: #method.last_error
    pub fn initialize(&self, params: EnvironmentParams) -> Result<()> {
        let environment = match Environment::new(params) {
            Ok(v) => v,
            Err(err) => {
                self.set_last_error(format!("Environment creation failed: {}", err));
                return Err(err);
            }
        };

        let visitor = match backends::new() {
            Ok(v) => v,
            Err(err) => {
                self.set_last_error(format!("Backend creation failed: {}", err));
                return Err(err);
            }
        };

        self.finish_initialize(environment, visitor)
    }

    /// Initializes the device without a display. Capabilities come from a
    /// fixed, generous snapshot; everything else behaves as usual.
    pub fn initialize_headless(&self) -> Result<()> {
        self.finish_initialize(Environment::headless(), backends::new_headless())
    }

    fn finish_initialize(
        &self,
        environment: Environment,
        visitor: Box<dyn Visitor>,
    ) -> Result<()> {
        let capabilities = match self.initialize_rendering_state(visitor.as_ref()) {
            Ok(v) => v,
            Err(err) => {
                self.set_last_error(format!("{}", err));
                return Err(err);
            }
        };

        info!("device initialized: {:?}", capabilities);

        *self.environment.lock().unwrap() = Some(environment);
        *self.visitor.lock().unwrap() = Some(visitor);
        *self.capabilities.write().unwrap() = Some(capabilities);

        let mut state = self.state.write().unwrap();
        state.phase = Phase::Initialized;
        state.last_error.clear();
        Ok(())
    }

    /// Snapshots the backend capabilities and rejects contexts this crate
    /// cannot drive. Invoked from initialization only; the result is cached
    /// for the lifetime of the device.
    fn initialize_rendering_state(&self, visitor: &dyn Visitor) -> Result<Capabilities> {
        let capabilities = *visitor.capabilities();

        if !capabilities.supports_texture_format(TextureFormat::U8U8U8U8) {
            bail!("The context does not support RGBA8 textures.");
        }

        Ok(capabilities)
    }

    /// Swaps frames. Call this exactly once per logical frame boundary,
    /// after all draw submission for the previous frame and before any draw
    /// submission for the next.
    ///
    /// `minimized` suppresses presentation work without breaking the timing
    /// contract: `time` (seconds since program start) still advances.
    pub fn advance_frame(&self, minimized: bool, time: f64) {
        {
            let mut state = self.state.write().unwrap();
            assert_eq!(
                state.phase,
                Phase::Initialized,
                "advance_frame on a device that is not initialized"
            );
            state.time = time;
        }

        if let Some(environment) = self.environment.lock().unwrap().as_mut() {
            environment.poll_events();

            if !minimized {
                if let Err(err) = environment.swap_buffers() {
                    warn!("frame presentation failed: {}", err);
                }
            }
        }

        if !minimized {
            let mut visitor = self.visitor.lock().unwrap();
            if let Some(visitor) = visitor.as_mut() {
                if let Err(err) = unsafe { visitor.advance() } {
                    warn!("backend frame advance failed: {}", err);
                }
            }
        }
    }

    /// Cleans up the context and window resources. This must be the final
    /// operation on the device; no further operations are valid afterwards.
    /// Dropping the device performs it automatically when the caller forgot.
    pub fn shut_down(&self) {
        let mut state = self.state.write().unwrap();
        if state.phase != Phase::Initialized {
            return;
        }
        state.phase = Phase::ShutDown;
        drop(state);

        *self.visitor.lock().unwrap() = None;
        *self.environment.lock().unwrap() = None;
        info!("device shut down");
    }

    /// Creates a shader program from two strings containing code in the
    /// backend's native shading language.
    ///
    /// The returned program is owned by the caller, who is responsible for
    /// destroying it through [`delete_shader`]. On a compile or link error
    /// the diagnostic text is stored and retrievable via [`last_error`].
    ///
    /// [`delete_shader`]: #method.delete_shader
    /// [`last_error`]: #method.last_error
    pub fn compile_and_link_shader(&self, vs: &str, fs: &str) -> Result<ShaderProgram> {
        self.assert_initialized("compile_and_link_shader");

        let override_fs = self
            .state
            .read()
            .unwrap()
            .override_fragment_shader
            .clone();
        let fs = override_fs.as_ref().map(String::as_str).unwrap_or(fs);

        if let Err(err) = shader::validate(vs, fs) {
            self.set_last_error(format!("{}", err));
            return Err(err);
        }

        let handle = self
            .programs
            .lock()
            .unwrap()
            .create(ProgramSlot { linked: false });

        let built = self.with_visitor(|v| unsafe { v.create_shader(handle, vs, fs) });
        match built {
            Ok(()) => {
                let mut programs = self.programs.lock().unwrap();
                if let Some(slot) = programs.get_mut(handle) {
                    slot.linked = true;
                }
                Ok(ShaderProgram::new(handle))
            }
            Err(err) => {
                self.programs.lock().unwrap().free(handle);
                self.set_last_error(format!("{}", err));
                Err(err)
            }
        }
    }

    /// Like [`compile_and_link_shader`], but replaces the program behind
    /// `existing` so every outstanding reference to it observes the new code
    /// at its next use.
    ///
    /// Only call this at a frame boundary; the backend program binding may
    /// be invalidated during the relink. On failure the previously linked
    /// program is left fully intact.
    ///
    /// [`compile_and_link_shader`]: #method.compile_and_link_shader
    pub fn recompile_shader(&self, vs: &str, fs: &str, existing: &ShaderProgram) -> Result<()> {
        self.assert_initialized("recompile_shader");
        assert!(
            self.programs.lock().unwrap().is_alive(existing.handle()),
            "recompile of a deleted shader program"
        );

        let override_fs = self
            .state
            .read()
            .unwrap()
            .override_fragment_shader
            .clone();
        let fs = override_fs.as_ref().map(String::as_str).unwrap_or(fs);

        if let Err(err) = shader::validate(vs, fs) {
            self.set_last_error(format!("{}", err));
            return Err(err);
        }

        let rebuilt =
            self.with_visitor(|v| unsafe { v.rebuild_shader(existing.handle(), vs, fs) });
        if let Err(err) = rebuilt {
            self.set_last_error(format!("{}", err));
            return Err(err);
        }

        Ok(())
    }

    /// Destroys a shader program, consuming the owner.
    pub fn delete_shader(&self, program: ShaderProgram) {
        self.assert_initialized("delete_shader");

        if self.programs.lock().unwrap().free(program.handle()).is_some() {
            let deleted = self.with_visitor(|v| unsafe { v.delete_shader(program.handle()) });
            if let Err(err) = deleted {
                warn!("failed to delete {}: {}", program.handle(), err);
            }
        }
    }

    /// Returns true if the program is alive and holds a successfully linked
    /// pair of stages.
    pub fn program_linked(&self, program: &ShaderProgram) -> bool {
        self.programs
            .lock()
            .unwrap()
            .get(program.handle())
            .map(|slot| slot.linked)
            .unwrap_or(false)
    }

    /// Returns if a texture format is supported by the hardware.
    #[inline]
    pub fn supports_texture_format(&self, format: TextureFormat) -> bool {
        self.snapshot("supports_texture_format")
            .supports_texture_format(format)
    }

    /// Returns if NPOT textures are supported by the hardware,
    /// see <https://www.opengl.org/wiki/NPOT_Texture>.
    #[inline]
    pub fn supports_texture_npot(&self) -> bool {
        self.snapshot("supports_texture_npot").supports_texture_npot
    }

    /// The max number of uniform components available to the vertex stage
    /// (individual floats, so a mat4 needs 16 of them). From this, safe
    /// sizes of uniform arrays can be computed.
    #[inline]
    pub fn max_vertex_uniform_components(&self) -> i32 {
        self.snapshot("max_vertex_uniform_components")
            .max_vertex_uniform_components
    }

    /// The supported feature level.
    #[inline]
    pub fn feature_level(&self) -> FeatureLevel {
        self.snapshot("feature_level").feature_level
    }

    /// Returns true if the graphics API allows draw submission from several
    /// threads at once. When false, the caller serializes submission
    /// externally; the device reports the capability but does not enforce
    /// it.
    #[inline]
    pub fn allow_multi_threading(&self) -> bool {
        self.snapshot("allow_multi_threading").allow_multi_threading
    }

    /// Sets the window size, for when the window is not owned by the
    /// device. In that use case, call whenever the size changes.
    pub fn set_window_size(&self, size: Vector2<u32>) {
        if let Some(environment) = self.environment.lock().unwrap().as_ref() {
            environment.resize(size);
        }
    }

    /// The current framebuffer size. May change from frame to frame due to
    /// window resizing.
    pub fn window_size(&self) -> Vector2<u32> {
        self.environment
            .lock()
            .unwrap()
            .as_ref()
            .map(|v| v.dimensions())
            .unwrap_or_else(|| Vector2::new(0, 0))
    }

    /// The size of the viewport, in pixels. This may be larger than the
    /// window if a hardware scaler is active.
    pub fn viewport_size(&self) -> Vector2<u32> {
        self.environment
            .lock()
            .unwrap()
            .as_ref()
            .map(|v| v.viewport_size())
            .unwrap_or_else(|| Vector2::new(0, 0))
    }

    /// Time in seconds since program start, updated once per frame only.
    /// Used by animated shaders.
    #[inline]
    pub fn time(&self) -> f64 {
        self.state.read().unwrap().time
    }

    /// The last error that occurred, if there is one. When any of the more
    /// complex operations (initialization, shader builds) fail, this string
    /// carries a more informative message.
    #[inline]
    pub fn last_error(&self) -> String {
        self.state.read().unwrap().last_error.clone()
    }

    #[inline]
    pub fn set_last_error<T: Into<String>>(&self, last_error: T) {
        self.state.write().unwrap().last_error = last_error.into();
    }

    /// The blend mode override applied to all subsequent blend changes, if
    /// any.
    #[inline]
    pub fn force_blend_mode(&self) -> Option<BlendMode> {
        self.state.read().unwrap().force_blend_mode
    }

    /// Overrides the blend mode set by every renderer until cleared with
    /// `None`. A debugging aid.
    #[inline]
    pub fn set_force_blend_mode(&self, mode: Option<BlendMode>) {
        self.state.write().unwrap().force_blend_mode = mode;
    }

    /// Forces every program compiled from now on to use this fragment
    /// source instead of its own (for debugging purposes). Cleared with
    /// `None`.
    #[inline]
    pub fn set_override_fragment_shader(&self, fs: Option<String>) {
        self.state.write().unwrap().override_fragment_shader = fs;
    }
}

// The state-application surface the renderer handles forward to. Render
// state setters are infallible by contract, so backend hiccups are logged
// rather than surfaced.
impl Device {
    pub(crate) fn apply_blend_mode(&self, mode: BlendMode, amount: f32) {
        self.assert_initialized("set_blend_mode");
        let mode = self.force_blend_mode().unwrap_or(mode);
        self.apply("set_blend_mode", |v| unsafe {
            v.set_blend_mode(mode, amount)
        });
    }

    pub(crate) fn apply_cull_mode(&self, mode: CullMode) {
        self.assert_initialized("set_culling");
        self.apply("set_culling", |v| unsafe { v.set_cull_mode(mode) });
    }

    pub(crate) fn apply_depth_function(&self, function: DepthFunction) {
        self.assert_initialized("set_depth_function");
        self.apply("set_depth_function", |v| unsafe {
            v.set_depth_function(function)
        });
    }

    pub(crate) fn apply_scissor(&self, scissor: Option<ScissorRect>) {
        self.assert_initialized("scissor");
        self.apply("scissor", |v| unsafe { v.set_scissor(scissor) });
    }

    pub(crate) fn apply_viewport(&self, viewport: Viewport) {
        self.assert_initialized("set_viewport");
        self.apply("set_viewport", |v| unsafe { v.set_viewport(viewport) });
    }

    pub(crate) fn apply_texture(&self, unit: u32, texture: TextureHandle) {
        self.assert_initialized("set_texture");
        self.apply("set_texture", |v| unsafe { v.bind_texture(unit, texture) });
    }

    pub(crate) fn apply_clear(&self, color: Option<Color<f32>>, depth: Option<f32>) {
        self.assert_initialized("clear");
        self.apply("clear", |v| unsafe { v.clear(color, depth) });
    }

    pub(crate) fn apply_shader(&self, handle: ShaderHandle, uniforms: &StandardUniforms) {
        self.assert_initialized("bind_shader");
        self.apply("bind_shader", |v| unsafe {
            v.bind_shader(handle, uniforms)
        });
    }

    pub(crate) fn flush(&self) {
        self.assert_initialized("flush");
        self.apply("flush", |v| unsafe { v.flush() });
    }

    fn apply<F>(&self, op: &str, f: F)
    where
        F: FnOnce(&mut dyn Visitor) -> Result<()>,
    {
        if let Err(err) = self.with_visitor(f) {
            warn!("{} failed: {}", op, err);
        }
    }

    fn with_visitor<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Visitor) -> Result<T>,
    {
        let mut guard = self.visitor.lock().unwrap();
        let visitor = guard
            .as_mut()
            .expect("operation on a device outside of its initialized phase");
        f(visitor.as_mut())
    }

    fn snapshot(&self, op: &str) -> Capabilities {
        self.capabilities
            .read()
            .unwrap()
            .unwrap_or_else(|| panic!("{} on a device that is not initialized", op))
    }

    fn assert_initialized(&self, op: &str) {
        assert_eq!(
            self.state.read().unwrap().phase,
            Phase::Initialized,
            "{} on a device that is not initialized",
            op
        );
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        self.shut_down();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Succeeds at everything, but advertises a capability snapshot without
    // RGBA8 textures, which initialization must refuse.
    struct NoRgbaVisitor {
        capabilities: Capabilities,
    }

    impl NoRgbaVisitor {
        fn new() -> Self {
            let mut capabilities = Capabilities::headless();
            capabilities.supports_texture_format &= !TextureFormat::U8U8U8U8.bit();
            NoRgbaVisitor { capabilities }
        }
    }

    impl Visitor for NoRgbaVisitor {
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

    #[test]
    fn failed_initialize_records_last_error_and_permits_retry() {
        let device = Device::new();
        let rejected =
            device.finish_initialize(Environment::headless(), Box::new(NoRgbaVisitor::new()));
        assert!(rejected.is_err());
        assert!(!device.last_error().is_empty());

        device.initialize_headless().unwrap();
        assert_eq!(device.last_error(), "");
        device.shut_down();
    }
}
