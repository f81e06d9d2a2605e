//! The GPU context seam
//!
//! Every object in this crate talks to the driver through [`GlBackend`], which is the narrow
//! slice of OpenGL the shader core needs. It is implemented for [`glow::Context`]; the context
//! is passed in explicitly instead of being an ambient global, so the whole core can be driven
//! by any other implementation as well.

use std::fmt::Debug;

use glow::HasContext;

pub use glow::ActiveUniform;

/// Number of components of a vector submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Components {
    One,
    Two,
    Three,
    Four,
}

/// Row (and column) count of a square matrix submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixSize {
    Two,
    Three,
    Four,
}

/// The OpenGL calls used to compile, link, reflect and feed shader programs.
///
/// All calls are synchronous and must happen on the thread that owns the context.
pub trait GlBackend {
    type Shader: Copy + Debug;
    type Program: Copy + Debug;
    type UniformLocation: Clone + Debug + PartialEq;

    fn create_shader(&self, shader_type: u32) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn use_program(&self, program: Option<Self::Program>);
    fn delete_program(&self, program: Self::Program);

    fn active_uniform_count(&self, program: Self::Program) -> u32;
    fn active_uniform(&self, program: Self::Program, index: u32) -> Option<ActiveUniform>;
    fn uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;

    /// Submits `values.len() / components` float vectors in one call.
    fn uniform_f32(&self, location: &Self::UniformLocation, components: Components, values: &[f32]);
    /// Submits signed integer vectors; samplers are fed through this call as well.
    fn uniform_i32(&self, location: &Self::UniformLocation, components: Components, values: &[i32]);
    fn uniform_u32(&self, location: &Self::UniformLocation, components: Components, values: &[u32]);
    /// Submits column-major square matrices, never transposed.
    fn uniform_matrix_f32(&self, location: &Self::UniformLocation, size: MatrixSize, values: &[f32]);
}

impl GlBackend for glow::Context {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type UniformLocation = glow::UniformLocation;

    fn create_shader(&self, shader_type: u32) -> Result<Self::Shader, String> {
        unsafe { HasContext::create_shader(self, shader_type) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { HasContext::shader_source(self, shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::compile_shader(self, shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { HasContext::delete_shader(self, shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { HasContext::create_program(self) }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::attach_shader(self, program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { HasContext::detach_shader(self, program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { HasContext::link_program(self, program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn active_uniform_count(&self, program: Self::Program) -> u32 {
        unsafe { self.get_active_uniforms(program) }
    }

    fn active_uniform(&self, program: Self::Program, index: u32) -> Option<ActiveUniform> {
        unsafe { self.get_active_uniform(program, index) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.get_attrib_location(program, name) }
    }

    fn uniform_f32(&self, location: &Self::UniformLocation, components: Components, values: &[f32]) {
        let location = Some(location);
        unsafe {
            match components {
                Components::One => self.uniform_1_f32_slice(location, values),
                Components::Two => self.uniform_2_f32_slice(location, values),
                Components::Three => self.uniform_3_f32_slice(location, values),
                Components::Four => self.uniform_4_f32_slice(location, values),
            }
        }
    }

    fn uniform_i32(&self, location: &Self::UniformLocation, components: Components, values: &[i32]) {
        let location = Some(location);
        unsafe {
            match components {
                Components::One => self.uniform_1_i32_slice(location, values),
                Components::Two => self.uniform_2_i32_slice(location, values),
                Components::Three => self.uniform_3_i32_slice(location, values),
                Components::Four => self.uniform_4_i32_slice(location, values),
            }
        }
    }

    fn uniform_u32(&self, location: &Self::UniformLocation, components: Components, values: &[u32]) {
        let location = Some(location);
        unsafe {
            match components {
                Components::One => self.uniform_1_u32_slice(location, values),
                Components::Two => self.uniform_2_u32_slice(location, values),
                Components::Three => self.uniform_3_u32_slice(location, values),
                Components::Four => self.uniform_4_u32_slice(location, values),
            }
        }
    }

    fn uniform_matrix_f32(&self, location: &Self::UniformLocation, size: MatrixSize, values: &[f32]) {
        let location = Some(location);
        unsafe {
            match size {
                MatrixSize::Two => self.uniform_matrix_2_f32_slice(location, false, values),
                MatrixSize::Three => self.uniform_matrix_3_f32_slice(location, false, values),
                MatrixSize::Four => self.uniform_matrix_4_f32_slice(location, false, values),
            }
        }
    }
}
