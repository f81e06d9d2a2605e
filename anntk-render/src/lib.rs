//! GPU shader programs for the annotation toolkit renderer.
//!
//! Shader units are compiled per stage, linked into a [`ProgramObject`], and the linked program
//! is reflected into a table of uniform slots. Values are written into those slots through
//! [`UniformHandle`]s, which check the host type against the reflected GLSL type.
//!
//! All calls go through a [`GlBackend`], which is implemented for [`glow::Context`].

pub mod backend;
pub mod error;
pub mod program;
pub mod shader;
pub mod uniform;
pub mod vartype;

#[cfg(test)]
mod mock;

pub use backend::GlBackend;
pub use error::{ShaderError, UniformError};
pub use program::{LinkStages, ProgramObject, build_program};
pub use shader::{ShaderStage, ShaderUnit, numbered_source};
pub use uniform::{UniformDescriptor, UniformHandle, UniformValue};
pub use vartype::ScalarVariableType;
