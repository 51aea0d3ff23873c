//! A small, portable abstraction over the OpenGL device. It owns the window
//! and context, compiles and links shader programs, and tracks the per-frame
//! render state (blend, cull, depth, scissor, viewport, texture bindings and
//! the standard shader uniforms) that affects every subsequent draw call.
//!
//! The crate is built around two types:
//!
//! - [`Device`] is the single owner of the GPU context and of the
//!   device-wide capabilities. Exactly one instance exists whenever at least
//!   one renderer is alive; it is created when the first [`Renderer`] is
//!   constructed and torn down when the last one goes away.
//! - [`Renderer`] is a lightweight front end. Construct as many as you like,
//!   potentially one per thread; each carries its own transient uniforms and
//!   persistent render state, and forwards the device-level operations.
//!
//! ```no_run
//! use kindling::prelude::*;
//!
//! let mut renderer = Renderer::new();
//! renderer.initialize(EnvironmentParams::default()).unwrap();
//!
//! let program = renderer
//!     .compile_and_link_shader(VS_SOURCE, FS_SOURCE)
//!     .unwrap();
//!
//! loop {
//!     renderer.advance_frame(false, 0.0);
//!     renderer.begin_rendering();
//!     renderer.bind_shader(&program);
//!     // ... submit draws ...
//!     renderer.end_rendering();
//! #   break;
//! }
//! # const VS_SOURCE: &str = "";
//! # const FS_SOURCE: &str = "";
//! ```
//!
//! [`Device`]: device/struct.Device.html
//! [`Renderer`]: device/struct.Renderer.html

#[macro_use]
extern crate failure;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

#[macro_use]
pub mod utils;

pub mod errors;
pub mod math;

pub mod device;
pub mod env;

pub mod prelude;
