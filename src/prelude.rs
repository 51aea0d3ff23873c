pub use crate::device::prelude::*;
pub use crate::env::EnvironmentParams;
pub use crate::errors::Result;
pub use crate::math::prelude::{Color, Matrix4, Vector2, Vector3};
