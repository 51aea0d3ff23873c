//! The heart of the crate: the shared [`Device`] and the lightweight
//! [`Renderer`] handles in front of it.
//!
//! The device is a process-wide singleton with shared ownership. It comes to
//! life when the first renderer is constructed and is torn down when the
//! last one goes away; the registry below is the single source of truth for
//! that lifetime. Code that runs strictly in between and has no renderer of
//! its own can reach the device through [`instance`], which fails loudly
//! instead of handing out a dangling reference.
//!
//! [`Device`]: struct.Device.html
//! [`Renderer`]: struct.Renderer.html
//! [`instance`]: fn.instance.html

pub mod backends;
pub mod capabilities;
pub mod shader;
pub mod states;

mod device;
mod renderer;

pub use self::device::Device;
pub use self::renderer::Renderer;

pub mod prelude {
    pub use super::capabilities::{Capabilities, FeatureLevel, TextureFormat};
    pub use super::shader::{ShaderHandle, ShaderProgram};
    pub use super::states::{
        BlendMode, CullMode, DepthFunction, RenderState, ScissorRect, TextureHandle, Viewport,
    };
    pub use super::{Device, Renderer};
}

use std::sync::{Arc, Mutex, Weak};

lazy_static! {
    // Serializes renderer construction and destruction, the only place the
    // shared device is created or torn down.
    static ref REGISTRY: Mutex<Weak<Device>> = Mutex::new(Weak::new());
}

/// Acquires shared ownership of the process-wide device, creating it when no
/// renderer is currently alive.
pub(crate) fn acquire() -> Arc<Device> {
    let mut slot = REGISTRY.lock().unwrap();
    match slot.upgrade() {
        Some(device) => device,
        None => {
            let device = Arc::new(Device::new());
            *slot = Arc::downgrade(&device);
            device
        }
    }
}

/// Returns the shared device.
///
/// Valid strictly between the construction of the first renderer and the
/// destruction of the last one. Calling it with zero live renderers is a
/// programming error and panics; prefer going through a `Renderer` whenever
/// one is in reach.
pub fn instance() -> Arc<Device> {
    REGISTRY
        .lock()
        .unwrap()
        .upgrade()
        .expect("no renderer is alive; the shared device does not exist")
}

/// Returns true if at least one renderer currently keeps the shared device
/// alive. This observes the ownership count only and never touches the
/// device itself.
pub fn is_alive() -> bool {
    REGISTRY.lock().unwrap().strong_count() > 0
}
