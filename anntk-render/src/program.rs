//! Shader programs
//!
//! [`ProgramObject`] owns a GPU program, links shader units into it and reflects the active
//! uniforms of the result into a name lookup table.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use fxhash::FxBuildHasher;
use indexmap::IndexMap;

use crate::{
    backend::GlBackend,
    error::{ShaderError, UniformError},
    shader::{ShaderStage, ShaderUnit},
    uniform::{UniformDescriptor, UniformHandle, UniformValue},
    vartype::ScalarVariableType,
};

/// Unique across all programs, so a handle can only ever match the link that issued it.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// Attaches a shader to a program for as long as the guard lives.
struct Attachment<'a, B: GlBackend> {
    gl: &'a B,
    program: B::Program,
    shader: B::Shader,
}

impl<'a, B: GlBackend> Attachment<'a, B> {
    fn new(gl: &'a B, program: B::Program, shader: B::Shader) -> Self {
        gl.attach_shader(program, shader);
        Self {
            gl,
            program,
            shader,
        }
    }
}

impl<B: GlBackend> Drop for Attachment<'_, B> {
    fn drop(&mut self) {
        self.gl.detach_shader(self.program, self.shader);
    }
}

/// The stage combinations a program can be linked from: a single unit (compute),
/// vertex + fragment, or vertex + geometry + fragment.
pub trait LinkStages<'a, B: GlBackend + 'a> {
    fn units(self) -> Vec<&'a ShaderUnit<B>>;
}

impl<'a, B: GlBackend + 'a> LinkStages<'a, B> for &'a ShaderUnit<B> {
    fn units(self) -> Vec<&'a ShaderUnit<B>> {
        vec![self]
    }
}

impl<'a, B: GlBackend + 'a> LinkStages<'a, B> for (&'a ShaderUnit<B>, &'a ShaderUnit<B>) {
    fn units(self) -> Vec<&'a ShaderUnit<B>> {
        vec![self.0, self.1]
    }
}

impl<'a, B: GlBackend + 'a> LinkStages<'a, B>
    for (&'a ShaderUnit<B>, &'a ShaderUnit<B>, &'a ShaderUnit<B>)
{
    fn units(self) -> Vec<&'a ShaderUnit<B>> {
        vec![self.0, self.1, self.2]
    }
}

/// GL reports array uniforms as `name[0]`; they are looked up by `name`.
fn base_name(name: &str) -> &str {
    name.strip_suffix("[0]").unwrap_or(name)
}

/// Represents an OpenGL shader program composed of multiple shaders.
pub struct ProgramObject<B: GlBackend> {
    gl: Arc<B>,
    id: B::Program,
    uniforms: IndexMap<String, UniformDescriptor<B::UniformLocation>, FxBuildHasher>,
    linked: bool,
    generation: u64,
}

impl<B: GlBackend> ProgramObject<B> {
    /// Allocates an empty program object.
    pub fn new(gl: &Arc<B>) -> Result<Self, ShaderError> {
        let id = gl.create_program().map_err(ShaderError::CreateFailed)?;

        Ok(Self {
            gl: Arc::clone(gl),
            id,
            uniforms: IndexMap::default(),
            linked: false,
            generation: next_generation(),
        })
    }

    /// Links the given units into this program and reflects its uniforms.
    ///
    /// The units are only attached for the duration of the call. On failure the uniform table
    /// is emptied and the program can be linked again with other units. Either way, handles
    /// fetched before this call are stale afterwards.
    pub fn link<'a>(&mut self, stages: impl LinkStages<'a, B>) -> Result<(), ShaderError>
    where
        B: 'a,
    {
        let units = stages.units();
        let gl = Arc::clone(&self.gl);

        let _attachments: Vec<_> = units
            .iter()
            .map(|unit| Attachment::new(&*gl, self.id, unit.id))
            .collect();

        gl.link_program(self.id);

        let linked = gl.program_link_status(self.id);
        let log = gl.program_info_log(self.id);

        self.generation = next_generation();
        self.uniforms.clear();
        self.linked = linked;

        if !linked {
            if !log.trim().is_empty() {
                log::warn!("Linking error: \n{log}\n");
            }
            return Err(ShaderError::LinkFailed { log });
        }

        let stages = units
            .iter()
            .map(|unit| unit.stage().name())
            .collect::<Vec<_>>()
            .join(" + ");
        if log.trim().is_empty() {
            log::info!("Program {stages} linked successfully!");
        } else {
            log::info!("Program {stages} linked successfully!\nAdditional info: {log}");
        }

        self.reflect_uniforms();

        Ok(())
    }

    fn reflect_uniforms(&mut self) {
        let total = self.gl.active_uniform_count(self.id);

        for index in 0..total {
            let Some(active) = self.gl.active_uniform(self.id, index) else {
                continue;
            };

            let ty = ScalarVariableType::from_gl(active.utype);
            if ty == ScalarVariableType::Invalid {
                log::debug!(
                    "Uniform {} has unsupported type {:#06x}",
                    active.name,
                    active.utype
                );
            }

            let location = self.gl.uniform_location(self.id, &active.name);
            if location.is_none() {
                log::debug!("Uniform {} has no location", active.name);
            }

            self.uniforms.insert(
                base_name(&active.name).to_owned(),
                UniformDescriptor {
                    location,
                    ty,
                    array_count: active.size.max(1) as u32,
                },
            );
        }
    }

    /// Looks up a reflected uniform by name.
    ///
    /// Unknown names, and every name before a successful link, yield an unresolved handle that
    /// silently ignores values.
    pub fn uniform(&self, name: &str) -> UniformHandle<B> {
        match self.uniforms.get(name) {
            Some(descriptor) => UniformHandle::new(descriptor, self.generation),
            None => UniformHandle::unresolved(self.generation),
        }
    }

    /// Reflected uniforms in the order the driver reported them.
    pub fn uniforms(
        &self,
    ) -> impl Iterator<Item = (&str, &UniformDescriptor<B::UniformLocation>)> + '_ {
        self.uniforms.iter().map(|(name, desc)| (name.as_str(), desc))
    }

    /// Number of reflected uniforms, zero unless the last link succeeded.
    pub fn uniform_count(&self) -> usize {
        self.uniforms.len()
    }

    /// Whether the last link attempt succeeded.
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Whether `handle` was issued by the current link of this program.
    pub fn is_current(&self, handle: &UniformHandle<B>) -> bool {
        handle.generation() == self.generation
    }

    /// Applies a value through a handle of this program. See [`Self::set_uniform_slice`].
    pub fn set_uniform<T: UniformValue>(
        &self,
        handle: &UniformHandle<B>,
        value: T,
    ) -> Result<(), UniformError> {
        self.set_uniform_slice(handle, std::slice::from_ref(&value))
    }

    /// Applies values through a handle, rejecting handles from another program or from an
    /// earlier link of this one. The program must be in use.
    pub fn set_uniform_slice<T: UniformValue>(
        &self,
        handle: &UniformHandle<B>,
        values: &[T],
    ) -> Result<(), UniformError> {
        if !self.is_current(handle) {
            return Err(UniformError::StaleHandle);
        }
        handle.apply_slice(&*self.gl, values)
    }

    /// Makes this the current program of the context.
    pub fn use_program(&self) {
        self.gl.use_program(Some(self.id));
    }

    /// Raw attribute location query, independent of reflection.
    pub fn attrib_location(&self, name: &str) -> Option<u32> {
        self.gl.attrib_location(self.id, name)
    }

    /// Raw uniform location query, independent of reflection.
    pub fn uniform_location(&self, name: &str) -> Option<B::UniformLocation> {
        self.gl.uniform_location(self.id, name)
    }

    /// The underlying GL program object.
    pub fn id(&self) -> B::Program {
        self.id
    }
}

impl<B: GlBackend> fmt::Debug for ProgramObject<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramObject")
            .field("id", &self.id)
            .field("linked", &self.linked)
            .field("uniforms", &self.uniforms.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<B: GlBackend> Drop for ProgramObject<B> {
    fn drop(&mut self) {
        self.gl.delete_program(self.id);
    }
}

/// Compiles a vertex and a fragment shader and links them into a new program.
///
/// Both stages are compiled even if the first one fails, so all diagnostics are logged.
/// Returns `None` if any step failed; the intermediate units are released either way.
pub fn build_program<B: GlBackend>(
    gl: &Arc<B>,
    vertex_source: &str,
    fragment_source: &str,
) -> Option<ProgramObject<B>> {
    let vertex = ShaderUnit::new(gl, ShaderStage::Vertex)
        .map_err(|e| log::error!("{e}"))
        .ok()?;
    let fragment = ShaderUnit::new(gl, ShaderStage::Fragment)
        .map_err(|e| log::error!("{e}"))
        .ok()?;

    let vertex_ok = vertex.compile(vertex_source).is_ok();
    let fragment_ok = fragment.compile(fragment_source).is_ok();
    if !(vertex_ok && fragment_ok) {
        return None;
    }

    let mut program = ProgramObject::new(gl).map_err(|e| log::error!("{e}")).ok()?;
    program.link((&vertex, &fragment)).ok()?;
    Some(program)
}
