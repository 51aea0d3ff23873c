//! Represents the OpenGL context and the window or environment around it.
//!
//! The device owns exactly one `Environment` for the span of its initialized
//! phase. The environment is a capability provider only: it creates and
//! presents the context, reports sizes, and nothing else.

mod backends;

use crate::errors::*;
use crate::math::prelude::Vector2;

use self::backends::Visitor;

#[derive(Debug, Clone)]
pub struct EnvironmentParams {
    /// Sets the title of the window.
    pub title: String,
    /// Sets the size in *points* of the client area of the window.
    pub size: Vector2<u32>,
    /// Sets the multisampling level to request. A value of 0 indicates that
    /// multisampling must not be enabled.
    pub multisample: u16,
    /// Specifies whether should we have vsync.
    pub vsync: bool,
}

impl Default for EnvironmentParams {
    fn default() -> Self {
        EnvironmentParams {
            title: "Window".to_owned(),
            size: Vector2::new(640, 320),
            multisample: 2,
            vsync: false,
        }
    }
}

/// The window and OpenGL context around it, behind a backend seam so the
/// whole device can run without a display.
pub struct Environment {
    visitor: Box<dyn Visitor>,
}

impl Environment {
    /// Creates a new `Environment` and initializes the OpenGL context.
    pub fn new(params: EnvironmentParams) -> Result<Self> {
        Ok(Environment {
            visitor: backends::new(params)?,
        })
    }

    /// Creates a new `Environment` with a headless context.
    pub fn headless() -> Self {
        Environment {
            visitor: backends::new_headless(),
        }
    }

    /// Returns the size in *points* of the client area of the window.
    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.visitor.dimensions()
    }

    /// Returns the ratio between the backing framebuffer resolution and the
    /// window size in screen pixels. This is typically one for a normal
    /// display and two for a retina display.
    #[inline]
    pub fn device_pixel_ratio(&self) -> f32 {
        self.visitor.device_pixel_ratio()
    }

    /// Returns the size of the drawable region in pixels. This may be larger
    /// than the window size if a hardware scaler is active.
    #[inline]
    pub fn viewport_size(&self) -> Vector2<u32> {
        let dims = self.dimensions();
        let dpr = self.device_pixel_ratio();
        Vector2::new(
            (dims.x as f32 * dpr) as u32,
            (dims.y as f32 * dpr) as u32,
        )
    }

    /// Resizes the window and the GL context behind it.
    #[inline]
    pub fn resize(&self, dimensions: Vector2<u32>) {
        self.visitor.resize(dimensions);
    }

    /// Set the context as the active context in this thread.
    #[inline]
    pub fn make_current(&self) -> Result<()> {
        self.visitor.make_current()
    }

    /// Returns true if this context is the current one in this thread.
    #[inline]
    pub fn is_current(&self) -> bool {
        self.visitor.is_current()
    }

    /// Swaps the buffers in case of double or triple buffering.
    ///
    /// **Warning**: if you enabled vsync, this function will block until the
    /// next time the screen is refreshed. However drivers can choose to
    /// override your vsync settings, which means that you can't know in
    /// advance whether swap_buffers will block or not.
    #[inline]
    pub fn swap_buffers(&self) -> Result<()> {
        self.visitor.swap_buffers()
    }

    /// Drains pending platform events so the window stays responsive. Input
    /// handling is not this crate's concern; the events are discarded.
    #[inline]
    pub fn poll_events(&mut self) {
        self.visitor.poll_events();
    }
}
