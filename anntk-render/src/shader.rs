//! OpenGL Shaders
//!
//! This module defines [`ShaderStage`] and [`ShaderUnit`], a single compiled pipeline stage.

use std::{fmt, sync::Arc};

use crate::{backend::GlBackend, error::ShaderError};

/// A pipeline stage a shader unit is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    Compute,
}

impl ShaderStage {
    /// The matching `GL_*_SHADER` constant.
    pub fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
            ShaderStage::Geometry => glow::GEOMETRY_SHADER,
            ShaderStage::Compute => glow::COMPUTE_SHADER,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Compute => "compute",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reprints shader source with 1-based line numbers, one `"  N:\tline"` entry per line,
/// so compiler diagnostics can be matched against the text.
pub fn numbered_source(source: &str) -> impl Iterator<Item = String> + '_ {
    source
        .split('\n')
        .enumerate()
        .map(|(i, line)| format!("{:3}:\t{}", i + 1, line.trim_end_matches('\r')))
}

/// Represents an individual OpenGL shader.
///
/// The shader object lives as long as the unit does. Deleting it while a program still has it
/// attached is fine, the driver frees it once the last reference is gone.
pub struct ShaderUnit<B: GlBackend> {
    gl: Arc<B>,
    pub(crate) id: B::Shader,
    stage: ShaderStage,
}

impl<B: GlBackend> ShaderUnit<B> {
    /// Allocates an empty shader object for the given stage.
    pub fn new(gl: &Arc<B>, stage: ShaderStage) -> Result<Self, ShaderError> {
        let id = gl
            .create_shader(stage.gl_enum())
            .map_err(ShaderError::CreateFailed)?;

        Ok(Self {
            gl: Arc::clone(gl),
            id,
            stage,
        })
    }

    /// Allocates a shader object and compiles `source` into it.
    pub fn from_source(gl: &Arc<B>, stage: ShaderStage, source: &str) -> Result<Self, ShaderError> {
        let shader = Self::new(gl, stage)?;
        shader.compile(source)?;
        Ok(shader)
    }

    /// Replaces the source of this unit and compiles it.
    ///
    /// Any diagnostic output, warnings included, is logged along with the numbered source.
    /// On failure the unit stays allocated and can be compiled again.
    pub fn compile(&self, source: &str) -> Result<(), ShaderError> {
        self.gl.shader_source(self.id, source);
        self.gl.compile_shader(self.id);

        let compiled = self.gl.shader_compile_status(self.id);
        let log = self.gl.shader_info_log(self.id);

        if !log.trim().is_empty() {
            if compiled {
                log::warn!("Warning during {} shader compilation.", self.stage);
            } else {
                log::error!("Error during {} shader compilation.", self.stage);
            }
            for line in numbered_source(source) {
                log::info!("{line}");
            }
            if compiled {
                log::warn!("Compilation log: {log}");
            } else {
                log::error!("Compilation log: {log}");
            }
        }

        if compiled {
            Ok(())
        } else {
            Err(ShaderError::CompileFailed {
                stage: self.stage,
                log,
            })
        }
    }

    /// The stage this unit was created for.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// The underlying GL shader object.
    pub fn id(&self) -> B::Shader {
        self.id
    }
}

impl<B: GlBackend> Drop for ShaderUnit<B> {
    fn drop(&mut self) {
        self.gl.delete_shader(self.id);
    }
}
