//! Errors reported by shader compilation, program linking and uniform application.

use crate::{shader::ShaderStage, vartype::ScalarVariableType};

/// Failures while building GPU program objects.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    /// The driver refused to allocate a shader or program object.
    #[error("Unable to create GPU object: {0}")]
    CreateFailed(String),
    /// Compilation of a shader stage has failed.
    #[error("Compilation of {stage} shader has failed: {log}")]
    CompileFailed {
        /// Stage of the rejected unit.
        stage: ShaderStage,
        /// Compiler diagnostic log, may be empty.
        log: String,
    },
    /// Linking has failed, exact reason is inside `log`.
    #[error("Linking program has failed: {log}")]
    LinkFailed {
        /// Linker diagnostic log, may be empty.
        log: String,
    },
}

/// Failures while applying a value to a uniform slot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UniformError {
    /// The value's type does not fit the reflected slot type.
    #[error("Cannot apply a {value} value to a uniform of type {slot}")]
    TypeMismatch {
        /// Reflected type of the slot.
        slot: ScalarVariableType,
        /// Type tag of the submitted value.
        value: ScalarVariableType,
    },
    /// More elements than the uniform array holds.
    #[error("Uniform holds {capacity} element(s), but {len} were submitted")]
    ArrayOverflow { len: usize, capacity: u32 },
    /// Texture unit index does not fit into a sampler slot.
    #[error("Texture unit {0} is out of range")]
    TextureUnitOutOfRange(u32),
    /// The handle was issued before the program was linked again.
    #[error("Uniform handle is stale, fetch it again after linking")]
    StaleHandle,
}
