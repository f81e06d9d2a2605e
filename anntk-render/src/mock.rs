//! An in-memory [`GlBackend`] for tests.
//!
//! It "compiles" GLSL by scanning declarations, links by checking the stage combination, and
//! reports uniforms the way a GL driver does (`name[0]` for arrays). Every value submitted to a
//! uniform location is recorded so tests can read back what the GPU would see.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{
    backend::{ActiveUniform, Components, GlBackend, MatrixSize},
    vartype::ScalarVariableType,
};

/// A value as it was handed to one of the uniform calls.
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted {
    F32(Components, Vec<f32>),
    I32(Components, Vec<i32>),
    U32(Components, Vec<u32>),
    Matrix(MatrixSize, Vec<f32>),
}

struct MockShader {
    shader_type: u32,
    source: String,
    compiled: bool,
    log: String,
}

struct MockUniform {
    name: String,
    base: String,
    utype: u32,
    size: i32,
    location: u32,
}

#[derive(Default)]
struct MockProgram {
    attached: Vec<u32>,
    linked: bool,
    log: String,
    uniforms: Vec<MockUniform>,
    attributes: Vec<String>,
}

#[derive(Default)]
struct State {
    next_id: u32,
    next_location: u32,
    shaders: HashMap<u32, MockShader>,
    programs: HashMap<u32, MockProgram>,
    current: Option<u32>,
    submitted: HashMap<u32, Submitted>,
    submissions: usize,
    fail_links_silently: bool,
    unlocated: HashSet<String>,
}

impl State {
    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MockGl {
    state: RefCell<State>,
}

fn compile(shader_type: u32, source: &str) -> (bool, String) {
    let mut log = String::new();
    let mut depth = 0i32;

    for (i, line) in source.lines().enumerate() {
        depth += line.matches('{').count() as i32 - line.matches('}').count() as i32;
        if let Some(text) = line.split("// warning:").nth(1) {
            log += &format!("0:{}: warning:{}\n", i + 1, text);
        }
    }

    let mut ok = true;
    if depth != 0 {
        log += &format!("0:{}: error: unbalanced braces\n", source.lines().count());
        ok = false;
    }
    if !source.contains("void main") {
        log += "0:1: error: missing entry point main\n";
        ok = false;
    }
    if shader_type == glow::VERTEX_SHADER && !source.contains("gl_Position") {
        log += "0:1: error: vertex shader does not write gl_Position\n";
        ok = false;
    }
    (ok, log)
}

fn glsl_type_code(name: &str) -> u32 {
    if name == "bool" {
        return glow::BOOL;
    }
    ScalarVariableType::NATIVE
        .iter()
        .find(|ty| ty.glsl_name() == name)
        .and_then(|ty| ty.to_gl())
        .unwrap_or(0)
}

/// `uniform <type> <name>[<n>];` declarations, in source order.
fn uniform_declarations(source: &str) -> impl Iterator<Item = (u32, String, i32)> + '_ {
    source.lines().filter_map(|line| {
        let mut tokens = line.trim().trim_end_matches(';').split_whitespace();
        if tokens.next() != Some("uniform") {
            return None;
        }
        let ty = glsl_type_code(tokens.next()?);
        let declared = tokens.next()?;
        match declared.split_once('[') {
            Some((name, len)) => {
                let len = len.trim_end_matches(']').parse().ok()?;
                Some((ty, name.to_owned(), len))
            }
            None => Some((ty, declared.to_owned(), 1)),
        }
    })
}

/// Vertex inputs, in source order.
fn attribute_declarations(source: &str) -> impl Iterator<Item = String> + '_ {
    source.lines().filter_map(|line| {
        let mut tokens = line.trim().trim_end_matches(';').split_whitespace();
        match tokens.next() {
            Some("in") | Some("attribute") => tokens.nth(1).map(str::to_owned),
            _ => None,
        }
    })
}

impl MockGl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn shader_type(&self, shader: u32) -> Option<u32> {
        self.state.borrow().shaders.get(&shader).map(|s| s.shader_type)
    }

    pub fn is_shader_alive(&self, shader: u32) -> bool {
        self.state.borrow().shaders.contains_key(&shader)
    }

    pub fn live_shader_count(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_program_count(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn attached_count(&self, program: u32) -> usize {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map_or(0, |p| p.attached.len())
    }

    pub fn current_program(&self) -> Option<u32> {
        self.state.borrow().current
    }

    /// The last value written to `location`.
    pub fn submitted(&self, location: u32) -> Option<Submitted> {
        self.state.borrow().submitted.get(&location).cloned()
    }

    /// Number of uniform calls issued so far.
    pub fn submission_count(&self) -> usize {
        self.state.borrow().submissions
    }

    /// Every following link fails without writing a log.
    pub fn fail_links_silently(&self) {
        self.state.borrow_mut().fail_links_silently = true;
    }

    /// Reports `name` as active but without a location, like a uniform block member.
    pub fn drop_location(&self, name: &str) {
        self.state.borrow_mut().unlocated.insert(name.to_owned());
    }

    fn record(&self, location: u32, value: Submitted) {
        let mut state = self.state.borrow_mut();
        state.submitted.insert(location, value);
        state.submissions += 1;
    }

    fn link(state: &mut State, program: u32) {
        let attached = match state.programs.get(&program) {
            Some(p) => p.attached.clone(),
            None => return,
        };

        let shaders: Vec<&MockShader> = attached
            .iter()
            .filter_map(|id| state.shaders.get(id))
            .collect();
        let count = |ty: u32| shaders.iter().filter(|s| s.shader_type == ty).count();

        let error = if shaders.is_empty() {
            Some("error: no shaders attached")
        } else if shaders.iter().any(|s| !s.compiled) {
            Some("error: attached shader is not compiled")
        } else if count(glow::COMPUTE_SHADER) > 0 {
            (shaders.len() != 1).then_some("error: compute shader mixed with other stages")
        } else if count(glow::VERTEX_SHADER) != 1
            || count(glow::FRAGMENT_SHADER) != 1
            || count(glow::GEOMETRY_SHADER) > 1
        {
            Some("error: program needs exactly one vertex and one fragment shader")
        } else {
            None
        };

        let mut uniforms: Vec<(u32, String, i32)> = Vec::new();
        let mut attributes = Vec::new();
        for shader in &shaders {
            for declaration in uniform_declarations(&shader.source) {
                if !uniforms.iter().any(|(_, name, _)| *name == declaration.1) {
                    uniforms.push(declaration);
                }
            }
            if shader.shader_type == glow::VERTEX_SHADER {
                attributes.extend(attribute_declarations(&shader.source));
            }
        }

        let silent = state.fail_links_silently;
        let linked = error.is_none() && !silent;
        let uniforms = if linked {
            uniforms
                .into_iter()
                .map(|(utype, base, size)| {
                    state.next_location += 1;
                    MockUniform {
                        name: if size > 1 { format!("{base}[0]") } else { base.clone() },
                        base,
                        utype,
                        size,
                        location: state.next_location,
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        if let Some(p) = state.programs.get_mut(&program) {
            p.linked = linked;
            p.log = match error {
                Some(error) if !silent => error.to_owned(),
                _ => String::new(),
            };
            p.uniforms = uniforms;
            p.attributes = if linked { attributes } else { Vec::new() };
        }
    }
}

impl GlBackend for MockGl {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = u32;

    fn create_shader(&self, shader_type: u32) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.shaders.insert(
            id,
            MockShader {
                shader_type,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            s.source = source.to_owned();
        }
    }

    fn compile_shader(&self, shader: u32) {
        if let Some(s) = self.state.borrow_mut().shaders.get_mut(&shader) {
            let (compiled, log) = compile(s.shader_type, &s.source);
            s.compiled = compiled;
            s.log = log;
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, shader: u32) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|s| s.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        self.state.borrow_mut().shaders.remove(&shader);
    }

    fn create_program(&self) -> Result<u32, String> {
        let mut state = self.state.borrow_mut();
        let id = state.allocate();
        state.programs.insert(id, MockProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.retain(|&s| s != shader);
        }
    }

    fn link_program(&self, program: u32) {
        Self::link(&mut self.state.borrow_mut(), program);
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: u32) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn use_program(&self, program: Option<u32>) {
        self.state.borrow_mut().current = program;
    }

    fn delete_program(&self, program: u32) {
        let mut state = self.state.borrow_mut();
        state.programs.remove(&program);
        if state.current == Some(program) {
            state.current = None;
        }
    }

    fn active_uniform_count(&self, program: u32) -> u32 {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map_or(0, |p| p.uniforms.len() as u32)
    }

    fn active_uniform(&self, program: u32, index: u32) -> Option<ActiveUniform> {
        let state = self.state.borrow();
        let uniform = state.programs.get(&program)?.uniforms.get(index as usize)?;
        Some(ActiveUniform {
            size: uniform.size,
            utype: uniform.utype,
            name: uniform.name.clone(),
        })
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        state
            .programs
            .get(&program)?
            .uniforms
            .iter()
            .find(|u| u.name == name || u.base == name)
            .filter(|u| !state.unlocated.contains(&u.base))
            .map(|u| u.location)
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        let state = self.state.borrow();
        state
            .programs
            .get(&program)?
            .attributes
            .iter()
            .position(|a| a == name)
            .map(|index| index as u32)
    }

    fn uniform_f32(&self, location: &u32, components: Components, values: &[f32]) {
        self.record(*location, Submitted::F32(components, values.to_vec()));
    }

    fn uniform_i32(&self, location: &u32, components: Components, values: &[i32]) {
        self.record(*location, Submitted::I32(components, values.to_vec()));
    }

    fn uniform_u32(&self, location: &u32, components: Components, values: &[u32]) {
        self.record(*location, Submitted::U32(components, values.to_vec()));
    }

    fn uniform_matrix_f32(&self, location: &u32, size: MatrixSize, values: &[f32]) {
        self.record(*location, Submitted::Matrix(size, values.to_vec()));
    }
}

/// Records log output of the current test thread.
pub mod capture {
    use std::cell::RefCell;

    use log::{Level, Log, Metadata, Record};

    struct Capture;

    static CAPTURE: Capture = Capture;

    thread_local! {
        static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
    }

    impl Log for Capture {
        fn enabled(&self, _: &Metadata) -> bool {
            true
        }

        fn log(&self, record: &Record) {
            RECORDS.with(|r| {
                r.borrow_mut()
                    .push((record.level(), record.args().to_string()))
            });
        }

        fn flush(&self) {}
    }

    /// Installs the capturing logger (once per process) and forgets earlier records.
    pub fn start() {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Trace);
        RECORDS.with(|r| r.borrow_mut().clear());
    }

    /// Everything logged on this thread since [`start`].
    pub fn take() -> Vec<(Level, String)> {
        RECORDS.with(|r| r.take())
    }
}

/// GLSL sources shared by the tests.
pub mod sources {
    pub const VERTEX: &str = "#version 330 core
in vec3 a_position;
in vec2 a_uv;
uniform mat4 u_modelViewProj;
out vec2 v_uv;
void main() {
    v_uv = a_uv;
    gl_Position = u_modelViewProj * vec4(a_position, 1.0);
}
";

    pub const FRAGMENT: &str = "#version 330 core
in vec2 v_uv;
uniform sampler2D u_texture;
uniform vec3 u_lights[3];
uniform vec4 u_tint;
out vec4 frag_color;
void main() {
    vec3 light = u_lights[0] + u_lights[1] + u_lights[2];
    frag_color = texture(u_texture, v_uv) * u_tint * vec4(light, 1.0);
}
";

    pub const GEOMETRY: &str = "#version 330 core
layout(lines) in;
layout(triangle_strip, max_vertices = 4) out;
uniform float u_thickness;
void main() {
    EndPrimitive();
}
";

    pub const COMPUTE: &str = "#version 430 core
layout(local_size_x = 8, local_size_y = 8) in;
uniform uvec2 u_size;
void main() {
}
";

    pub const BROKEN: &str = "#version 330 core
out vec4 frag_color;
void main() {
    frag_color = vec4(1.0;
";
}
