//! This module contains the math utils that mainly comes from `cgmath`.

pub use cgmath::*;

pub mod color;
pub use self::color::Color;

pub mod prelude {
    pub use super::color::Color;
    pub use super::{Matrix4, SquareMatrix, Vector2, Vector3, Vector4, Zero};
}
