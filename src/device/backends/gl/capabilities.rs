use std::cmp;
use std::ffi;

use gl;
use gl::types::*;

use crate::errors::*;

use super::super::super::capabilities::{Capabilities, FeatureLevel, TextureFormat};

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the
/// same API. For example, both `Version::GL(3, 0) >= Version::ES(3, 0)` and
/// `Version::ES(3, 0) >= Version::GL(3, 0)` return `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// Regular OpenGL.
    GL(u8, u8),
    /// OpenGL embedded system.
    ES(u8, u8),
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<cmp::Ordering> {
        let (es1, major1, minor1) = match *self {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        let (es2, major2, minor2) = match *other {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        if es1 != es2 {
            None
        } else {
            match major1.cmp(&major2) {
                cmp::Ordering::Equal => Some(minor1.cmp(&minor2)),
                v => Some(v),
            }
        }
    }
}

impl Version {
    /// Obtains the OpenGL version of the current context using the loaded
    /// functions.
    ///
    /// # Unsafe
    ///
    /// You must ensure that the functions belong to the current context,
    /// otherwise you will get an undefined behavior.
    pub unsafe fn parse() -> Result<Version> {
        let desc = parse_str(gl::VERSION)?;

        let (es, desc) = if desc.starts_with("OpenGL ES ") {
            (true, &desc[10..])
        } else if desc.starts_with("OpenGL ES-") {
            (true, &desc[13..])
        } else {
            (false, &desc[..])
        };

        let desc = desc
            .split(' ')
            .next()
            .ok_or_else(|| format_err!("[GL] Version string is unformatted."))?;

        let mut iter = desc.split(move |c: char| c == '.');
        let major = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| format_err!("[GL] Version string is unformatted."))?;
        let minor = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| format_err!("[GL] Version string is unformatted."))?;

        if es {
            Ok(Version::ES(major, minor))
        } else {
            Ok(Version::GL(major, minor))
        }
    }
}

macro_rules! extensions {
    ($($string:expr => $field:ident,)+) => {
        /// Contains data about the list of extensions the context reports.
        #[derive(Debug, Clone, Copy)]
        pub struct Extensions {
            $(
                pub $field: bool,
            )+
        }

        impl Extensions {
            /// Returns the list of extensions supported by the backend. The
            /// version must match the one of the current context, otherwise
            /// unloaded functions could be called.
            pub unsafe fn parse(version: Version) -> Result<Extensions> {
                let strings: Vec<String> = if version >= Version::GL(3, 0) || version >= Version::ES(3, 0) {
                    let mut num_extensions = 0;
                    gl::GetIntegerv(gl::NUM_EXTENSIONS, &mut num_extensions);
                    (0..num_extensions)
                        .map(|i| {
                            let ext = gl::GetStringi(gl::EXTENSIONS, i as GLuint);
                            String::from_utf8_lossy(
                                ffi::CStr::from_ptr(ext as *const _).to_bytes(),
                            ).into_owned()
                        })
                        .collect()
                } else {
                    parse_str(gl::EXTENSIONS)?
                        .split(' ')
                        .map(|e| e.to_owned())
                        .collect()
                };

                let mut extensions = Extensions {
                    $(
                        $field: false,
                    )+
                };

                for extension in strings {
                    match &extension[..] {
                        $(
                            $string => extensions.$field = true,
                        )+
                        _ => ()
                    }
                }

                Ok(extensions)
            }
        }
    }
}

extensions! {
    "GL_ARB_texture_non_power_of_two" => gl_arb_texture_non_power_of_two,
    "GL_OES_texture_npot" => gl_oes_texture_npot,
    "GL_OES_texture_half_float" => gl_oes_texture_half_float,
    "GL_OES_texture_float" => gl_oes_texture_float,
    "GL_ARB_ES3_compatibility" => gl_arb_es3_compatibility,
    "GL_OES_compressed_ETC2_RGB8_texture" => gl_oes_compressed_etc2_rgb8_texture,
    "GL_OES_compressed_ETC2_RGBA8_texture" => gl_oes_compressed_etc2_rgba8_texture,
    "GL_IMG_texture_compression_pvrtc" => gl_img_texture_compression_pvrtc,
    "GL_EXT_texture_compression_s3tc" => gl_ext_texture_compression_s3tc,
}

/// The raw context properties a capability snapshot is derived from.
#[derive(Debug, Clone)]
pub struct GLCapabilities {
    pub version: Version,
    /// The company responsible for this GL implementation.
    pub vendor: String,
    /// The name of the renderer, typically specific to a particular
    /// configuration of a hardware platform.
    pub renderer: String,
    pub extensions: Extensions,
    pub max_vertex_uniform_components: i32,
    pub max_combined_texture_image_units: u8,
}

impl GLCapabilities {
    pub unsafe fn parse() -> Result<GLCapabilities> {
        let version = Version::parse()?;
        let extensions = Extensions::parse(version)?;

        let mut max_vertex_uniform_components = 0;
        gl::GetIntegerv(
            gl::MAX_VERTEX_UNIFORM_COMPONENTS,
            &mut max_vertex_uniform_components,
        );

        let mut max_units = 2;
        gl::GetIntegerv(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS, &mut max_units);

        Ok(GLCapabilities {
            version,
            vendor: parse_str(gl::VENDOR)?,
            renderer: parse_str(gl::RENDERER)?,
            extensions,
            max_vertex_uniform_components,
            max_combined_texture_image_units: max_units as u8,
        })
    }

    fn feature_level(&self) -> FeatureLevel {
        if self.version >= Version::GL(3, 0) || self.version >= Version::ES(3, 0) {
            FeatureLevel::Level30
        } else {
            FeatureLevel::Base
        }
    }

    fn supports_texture_npot(&self) -> bool {
        self.version >= Version::GL(2, 0)
            || self.version >= Version::ES(3, 0)
            || self.extensions.gl_arb_texture_non_power_of_two
            || self.extensions.gl_oes_texture_npot
    }

    fn supports_float_textures(&self) -> bool {
        self.version >= Version::GL(3, 0)
            || self.version >= Version::ES(3, 0)
            || (self.extensions.gl_oes_texture_half_float && self.extensions.gl_oes_texture_float)
    }

    fn supports_etc2(&self) -> bool {
        self.version >= Version::ES(3, 0)
            || self.extensions.gl_arb_es3_compatibility
            || (self.extensions.gl_oes_compressed_etc2_rgb8_texture
                && self.extensions.gl_oes_compressed_etc2_rgba8_texture)
    }

    /// Folds the raw properties into the cached device snapshot.
    pub fn snapshot(&self) -> Capabilities {
        let mut formats = Capabilities::format_mask(&[
            TextureFormat::U8,
            TextureFormat::U8U8,
            TextureFormat::U8U8U8,
            TextureFormat::U8U8U8U8,
            TextureFormat::U5U6U5,
            TextureFormat::U4U4U4U4,
            TextureFormat::U5U5U5U1,
        ]);

        if self.supports_float_textures() {
            formats |= Capabilities::format_mask(&[
                TextureFormat::F16,
                TextureFormat::F16F16,
                TextureFormat::F16F16F16,
                TextureFormat::F16F16F16F16,
                TextureFormat::F32,
                TextureFormat::F32F32,
                TextureFormat::F32F32F32,
                TextureFormat::F32F32F32F32,
            ]);
        }

        if self.supports_etc2() {
            formats |= TextureFormat::Etc2.bit();
        }

        if self.extensions.gl_img_texture_compression_pvrtc {
            formats |= TextureFormat::Pvrtc.bit();
        }

        if self.extensions.gl_ext_texture_compression_s3tc {
            formats |= TextureFormat::S3tc.bit();
        }

        Capabilities {
            feature_level: self.feature_level(),
            supports_texture_format: formats,
            supports_texture_npot: self.supports_texture_npot(),
            max_vertex_uniform_components: self.max_vertex_uniform_components,
            max_texture_units: self.max_combined_texture_image_units,
            // Immediate-mode GL contexts are thread-affine.
            allow_multi_threading: false,
        }
    }
}

unsafe fn parse_str(id: GLenum) -> Result<String> {
    let s = gl::GetString(id);
    if s.is_null() {
        bail!("[GL] String of {} is null.", id);
    }

    Ok(String::from_utf8_lossy(ffi::CStr::from_ptr(s as *const _).to_bytes()).into_owned())
}
