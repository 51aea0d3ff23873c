//! Shader program objects. The device is a factory for these, not a store:
//! the caller owns every program it compiles and destroys it explicitly
//! through `Device::delete_shader`.

use crate::errors::*;

impl_handle!(ShaderHandle);

/// An owned, linked shader program.
///
/// The handle inside names a slot in the device's program arena, and the
/// backend keeps the actual GL program object keyed by it. A recompile swaps
/// the program *under* the handle, so every outstanding reference to this
/// object observes the update at its next use; on a failed recompile the
/// previously linked program stays untouched.
///
/// Deliberately neither `Copy` nor `Clone`: destruction through
/// `Device::delete_shader` consumes the value.
#[derive(Debug, PartialEq, Eq)]
pub struct ShaderProgram {
    handle: ShaderHandle,
}

impl ShaderProgram {
    pub(crate) fn new(handle: ShaderHandle) -> Self {
        ShaderProgram { handle }
    }

    #[inline]
    pub fn handle(&self) -> ShaderHandle {
        self.handle
    }
}

/// Book-keeping for one slot in the device's program arena.
#[derive(Debug, Clone)]
pub(crate) struct ProgramSlot {
    pub linked: bool,
}

/// Rejects sources the backend could never link, before it sees them.
pub(crate) fn validate(vs: &str, fs: &str) -> Result<()> {
    if vs.is_empty() {
        bail!("Vertex shader source is required to build a program.");
    }

    if fs.is_empty() {
        bail!("Fragment shader source is required to build a program.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_empty_stages() {
        assert!(validate("void main() {}", "void main() {}").is_ok());
        assert!(validate("", "void main() {}").is_err());
        assert!(validate("void main() {}", "").is_err());
    }
}
