//! The full-screen pass drawn by the viewer.
//!
//! The pass draws one triangle generated from `gl_VertexID`, so it needs no vertex buffers,
//! only an empty vertex array object.

use std::{path::Path, sync::Arc};

use anntk_render::{
    ProgramObject, ShaderError, ShaderStage, ShaderUnit, UniformHandle, UniformValue,
    build_program,
};
use glam::{Mat4, Vec2, Vec4};
use glow::HasContext;

use crate::config::ProgramConfig;

type Program = ProgramObject<glow::Context>;
type Handle = UniformHandle<glow::Context>;

const BUNDLED_VERTEX: &str = include_str!("shaders/quad/vert.glsl");
const BUNDLED_FRAGMENT: &str = include_str!("shaders/quad/frag.glsl");

/// Source text of every stage of the pass.
pub struct Sources {
    pub vertex: String,
    pub geometry: Option<String>,
    pub fragment: String,
}

fn read(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Unable to read {}: {e}", path.display()))
}

impl Sources {
    pub fn load(config: &ProgramConfig) -> Result<Self, String> {
        Ok(Self {
            vertex: match &config.vertex {
                Some(path) => read(path)?,
                None => BUNDLED_VERTEX.to_string(),
            },
            geometry: config.geometry.as_deref().map(read).transpose()?,
            fragment: match &config.fragment {
                Some(path) => read(path)?,
                None => BUNDLED_FRAGMENT.to_string(),
            },
        })
    }
}

fn link_with_geometry(
    gl: &Arc<glow::Context>,
    vertex: &str,
    geometry: &str,
    fragment: &str,
) -> Result<Program, ShaderError> {
    let vs = ShaderUnit::from_source(gl, ShaderStage::Vertex, vertex)?;
    let gs = ShaderUnit::from_source(gl, ShaderStage::Geometry, geometry)?;
    let fs = ShaderUnit::from_source(gl, ShaderStage::Fragment, fragment)?;
    let mut program = ProgramObject::new(gl)?;
    program.link((&vs, &gs, &fs))?;
    Ok(program)
}

/// Compiles and links the pass. Diagnostics have been logged when this returns `None`.
pub fn build(gl: &Arc<glow::Context>, sources: &Sources) -> Option<Program> {
    let program = match &sources.geometry {
        None => build_program(gl, &sources.vertex, &sources.fragment),
        Some(geometry) => link_with_geometry(gl, &sources.vertex, geometry, &sources.fragment)
            .map_err(|e| log::error!("{e}"))
            .ok(),
    }?;

    log::info!("Program has {} active uniform(s):", program.uniform_count());
    for (name, uniform) in program.uniforms() {
        let components = uniform.ty.components();
        match uniform.array_count {
            1 => log::info!(
                "  {} {name} at {:?}, {components} component(s)",
                uniform.ty,
                uniform.location
            ),
            n => log::info!(
                "  {} {name}[{n}] at {:?}, {components} component(s) each",
                uniform.ty,
                uniform.location
            ),
        }
    }

    Some(program)
}

/// Handles of the uniforms the pass feeds. Any of them may be missing from custom shaders.
struct QuadUniforms {
    model_view_proj: Handle,
    tint: Handle,
    resolution: Handle,
    time: Handle,
    highlight: Handle,
}

impl QuadUniforms {
    fn fetch(program: &Program) -> Self {
        Self {
            model_view_proj: program.uniform("u_modelViewProj"),
            tint: program.uniform("u_tint"),
            resolution: program.uniform("u_resolution"),
            time: program.uniform("u_time"),
            highlight: program.uniform("u_highlight"),
        }
    }
}

fn set<T: UniformValue>(program: &Program, name: &str, handle: &Handle, value: T) {
    if let Err(e) = program.set_uniform(handle, value) {
        log::warn!("{name}: {e}");
    }
}

pub struct QuadPass {
    gl: Arc<glow::Context>,
    config: ProgramConfig,
    program: Program,
    uniforms: QuadUniforms,
    vertex_array: glow::VertexArray,
}

impl QuadPass {
    pub fn new(gl: &Arc<glow::Context>, config: &ProgramConfig) -> Result<Self, String> {
        let sources = Sources::load(config)?;
        let program = build(gl, &sources).ok_or("Unable to build the viewer program")?;
        let vertex_array = unsafe { gl.create_vertex_array()? };

        Ok(Self {
            gl: Arc::clone(gl),
            config: config.clone(),
            uniforms: QuadUniforms::fetch(&program),
            program,
            vertex_array,
        })
    }

    /// Re-reads the sources from disk. The current program stays in place if they do not build.
    pub fn reload(&mut self) {
        let sources = match Sources::load(&self.config) {
            Ok(sources) => sources,
            Err(e) => {
                log::error!("{e}");
                return;
            }
        };
        match build(&self.gl, &sources) {
            Some(program) => {
                self.uniforms = QuadUniforms::fetch(&program);
                self.program = program;
                log::info!("Program reloaded");
            }
            None => log::warn!("Reload failed, keeping the previous program"),
        }
    }

    pub fn draw(&self, size: (u32, u32), time: f32, highlight: bool) {
        let uniforms = &self.uniforms;

        self.program.use_program();
        set(&self.program, "u_modelViewProj", &uniforms.model_view_proj, Mat4::IDENTITY);
        set(&self.program, "u_tint", &uniforms.tint, Vec4::ONE);
        set(
            &self.program,
            "u_resolution",
            &uniforms.resolution,
            Vec2::new(size.0 as f32, size.1 as f32),
        );
        set(&self.program, "u_time", &uniforms.time, time);
        set(&self.program, "u_highlight", &uniforms.highlight, highlight as i32);

        unsafe {
            self.gl.bind_vertex_array(Some(self.vertex_array));
            self.gl.draw_arrays(glow::TRIANGLES, 0, 3);
            self.gl.bind_vertex_array(None);
        }
    }
}

impl Drop for QuadPass {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_vertex_array(self.vertex_array);
        }
    }
}
