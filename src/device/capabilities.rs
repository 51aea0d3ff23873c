//! Device-wide capabilities. Contrary to the render state, these values are
//! computed once while the device initializes and never change afterwards,
//! which is what makes them safely readable from any thread without locking.

/// The coarse capability tier the backend advertises, used to gate optional
/// rendering techniques.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum FeatureLevel {
    /// The baseline feature set, comparable to OpenGL ES 2.0.
    Base,
    /// The extended feature set of OpenGL 3.0 / OpenGL ES 3.0 contexts,
    /// including vertex array objects and ETC2 texture compression.
    Level30,
}

/// Client texture formats callers may ask the device about before requesting
/// an upload elsewhere. One bit of the capability bitmask per variant.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TextureFormat {
    U8 = 0,
    U8U8 = 1,
    U8U8U8 = 2,
    U8U8U8U8 = 3,
    U5U6U5 = 4,
    U4U4U4U4 = 5,
    U5U5U5U1 = 6,
    F16 = 7,
    F16F16 = 8,
    F16F16F16 = 9,
    F16F16F16F16 = 10,
    F32 = 11,
    F32F32 = 12,
    F32F32F32 = 13,
    F32F32F32F32 = 14,
    /// ETC2 compressed, requires a `Level30` context or the ES3 compatibility
    /// extensions.
    Etc2 = 15,
    /// PVRTC compressed, PowerVR hardware only.
    Pvrtc = 16,
    /// S3TC (DXT) compressed, desktop hardware mostly.
    S3tc = 17,
}

impl TextureFormat {
    #[inline]
    pub(crate) fn bit(self) -> u64 {
        1 << (self as u64)
    }
}

const UNCOMPRESSED_FORMATS: &[TextureFormat] = &[
    TextureFormat::U8,
    TextureFormat::U8U8,
    TextureFormat::U8U8U8,
    TextureFormat::U8U8U8U8,
    TextureFormat::U5U6U5,
    TextureFormat::U4U4U4U4,
    TextureFormat::U5U5U5U1,
    TextureFormat::F16,
    TextureFormat::F16F16,
    TextureFormat::F16F16F16,
    TextureFormat::F16F16F16F16,
    TextureFormat::F32,
    TextureFormat::F32F32,
    TextureFormat::F32F32F32,
    TextureFormat::F32F32F32F32,
];

/// Represents the capabilities of the device.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    /// The advertised feature tier.
    pub feature_level: FeatureLevel,
    /// One bit for each variant in `TextureFormat`.
    pub supports_texture_format: u64,
    /// Whether non-power-of-two textures are fully supported,
    /// see <https://www.opengl.org/wiki/NPOT_Texture>.
    pub supports_texture_npot: bool,
    /// The max number of uniform components (individual floats, so a mat4
    /// needs 16 of them) available to the vertex stage. From this, safe
    /// sizes of uniform arrays can be computed.
    pub max_vertex_uniform_components: i32,
    /// Maximum number of texture units that can be bound at once.
    pub max_texture_units: u8,
    /// Whether the graphics API allows draw submission from several threads
    /// at once. Immediate-mode GL does not; callers must serialize
    /// externally when this is false.
    pub allow_multi_threading: bool,
}

impl Capabilities {
    /// Returns true if the given texture format is supported by the
    /// hardware.
    #[inline]
    pub fn supports_texture_format(&self, format: TextureFormat) -> bool {
        self.supports_texture_format & format.bit() != 0
    }

    /// Builds a format bitmask from individual formats.
    pub fn format_mask<'a, T>(formats: T) -> u64
    where
        T: IntoIterator<Item = &'a TextureFormat>,
    {
        formats.into_iter().fold(0, |mask, v| mask | v.bit())
    }

    /// The bitmask covering every uncompressed format.
    pub fn uncompressed_formats() -> u64 {
        Self::format_mask(UNCOMPRESSED_FORMATS)
    }

    /// A fixed snapshot for the headless backend, generous enough that code
    /// paths gated on capabilities stay reachable in tests.
    pub fn headless() -> Self {
        Capabilities {
            feature_level: FeatureLevel::Level30,
            supports_texture_format: Self::uncompressed_formats(),
            supports_texture_npot: true,
            max_vertex_uniform_components: 1024,
            max_texture_units: 8,
            allow_multi_threading: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_levels_are_ordered() {
        assert!(FeatureLevel::Base < FeatureLevel::Level30);
    }

    #[test]
    fn format_mask() {
        let caps = Capabilities::headless();
        assert!(caps.supports_texture_format(TextureFormat::U8U8U8U8));
        assert!(caps.supports_texture_format(TextureFormat::F32F32F32F32));
        assert!(!caps.supports_texture_format(TextureFormat::S3tc));
        assert!(!caps.supports_texture_format(TextureFormat::Pvrtc));
    }
}
