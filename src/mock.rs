// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `glow-program`.
//
// `glow-program` is free software: you can redistribute it and/or modify it under the
// terms of either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
//   version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `glow-program` is distributed in the hope that it will be useful, but WITHOUT ANY
// WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR
// PURPOSE. See the GNU Lesser General Public License or the Mozilla Public License for more
// details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `glow-program`. If not, see <https://www.gnu.org/licenses/>.

//! A fake driver that records every call, for tests.
//!
//! Compilation fails for any source containing `syntax error`. Linking fails unless exactly one
//! compiled vertex and one compiled fragment shader are attached, or if any attached source
//! mentions `undefined_function`. Active uniforms are the `uniform` declarations of the
//! attached sources.

use crate::gpu_backend::{ContextVersion, ShaderContext, ShaderStage};
use crate::uniform::UniformValue;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub(crate) struct MockShader {
    pub(crate) stage: ShaderStage,
    pub(crate) source: String,
    pub(crate) compiled: bool,
    pub(crate) deleted: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MockProgram {
    pub(crate) attached: Vec<u32>,
    pub(crate) ever_attached: Vec<u32>,
    pub(crate) linked: bool,
    pub(crate) deleted: bool,
    pub(crate) uniforms: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MockLocation {
    pub(crate) program: u32,
    pub(crate) index: usize,
}

/// A recorded uniform push.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Push {
    pub(crate) current: Option<u32>,
    pub(crate) location: Option<MockLocation>,
    pub(crate) value: UniformValue,
}

pub(crate) struct MockContext {
    version: ContextVersion,
    next_id: Cell<u32>,
    shaders: RefCell<BTreeMap<u32, MockShader>>,
    programs: RefCell<BTreeMap<u32, MockProgram>>,
    current: Cell<Option<u32>>,
    pushes: RefCell<Vec<Push>>,
    lookups: Cell<usize>,
    refuse_programs: Cell<bool>,
}

impl MockContext {
    pub(crate) fn new() -> Self {
        Self::with_version(ContextVersion::desktop(4, 6))
    }

    pub(crate) fn with_version(version: ContextVersion) -> Self {
        Self {
            version,
            next_id: Cell::new(1),
            shaders: RefCell::new(BTreeMap::new()),
            programs: RefCell::new(BTreeMap::new()),
            current: Cell::new(None),
            pushes: RefCell::new(Vec::new()),
            lookups: Cell::new(0),
            refuse_programs: Cell::new(false),
        }
    }

    /// Make `create_program` fail from now on.
    pub(crate) fn refuse_programs(&self) {
        self.refuse_programs.set(true);
    }

    pub(crate) fn shaders(&self) -> Vec<MockShader> {
        self.shaders.borrow().values().cloned().collect()
    }

    pub(crate) fn live_shaders(&self) -> usize {
        self.shaders.borrow().values().filter(|s| !s.deleted).count()
    }

    pub(crate) fn program(&self, id: u32) -> MockProgram {
        self.programs.borrow()[&id].clone()
    }

    pub(crate) fn program_count(&self) -> usize {
        self.programs.borrow().len()
    }

    pub(crate) fn live_programs(&self) -> usize {
        self.programs.borrow().values().filter(|p| !p.deleted).count()
    }

    pub(crate) fn current(&self) -> Option<u32> {
        self.current.get()
    }

    pub(crate) fn pushes(&self) -> Vec<Push> {
        self.pushes.borrow().clone()
    }

    pub(crate) fn lookups(&self) -> usize {
        self.lookups.get()
    }

    fn next_id(&self) -> u32 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

impl ShaderContext for MockContext {
    type Shader = u32;
    type Program = u32;
    type UniformLocation = MockLocation;

    fn version(&self) -> ContextVersion {
        self.version
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        let id = self.next_id();
        self.shaders.borrow_mut().insert(
            id,
            MockShader {
                stage,
                source: String::new(),
                compiled: false,
                deleted: false,
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        let mut shaders = self.shaders.borrow_mut();
        let shader = shaders.get_mut(&shader).unwrap();
        shader.source = source.to_string();
    }

    fn compile_shader(&self, shader: u32) {
        let mut shaders = self.shaders.borrow_mut();
        let shader = shaders.get_mut(&shader).unwrap();
        shader.compiled = !shader.source.contains("syntax error");
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.shaders.borrow()[&shader].compiled
    }

    fn shader_info_log(&self, shader: u32) -> String {
        if self.shader_compile_status(shader) {
            String::new()
        } else {
            "0:3(1): error: syntax error, unexpected IDENTIFIER\n\0".to_string()
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.shaders.borrow_mut().get_mut(&shader).unwrap().deleted = true;
    }

    fn create_program(&self) -> Result<u32, String> {
        if self.refuse_programs.get() {
            return Err("out of program objects".to_string());
        }

        let id = self.next_id();
        self.programs
            .borrow_mut()
            .insert(id, MockProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        let mut programs = self.programs.borrow_mut();
        let program = programs.get_mut(&program).unwrap();
        program.attached.push(shader);
        program.ever_attached.push(shader);
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        let mut programs = self.programs.borrow_mut();
        let program = programs.get_mut(&program).unwrap();
        program.attached.retain(|&s| s != shader);
    }

    fn link_program(&self, program: u32) {
        let shaders = self.shaders.borrow();
        let mut programs = self.programs.borrow_mut();
        let program = programs.get_mut(&program).unwrap();

        let attached: Vec<&MockShader> = program.attached.iter().map(|id| &shaders[id]).collect();
        let count = |stage: ShaderStage| attached.iter().filter(|s| s.stage == stage).count();

        program.linked = attached.iter().all(|s| s.compiled)
            && count(ShaderStage::Vertex) == 1
            && count(ShaderStage::Fragment) == 1
            && count(ShaderStage::Geometry) <= 1
            && !attached
                .iter()
                .any(|s| s.source.contains("undefined_function"));

        program.uniforms.clear();
        if program.linked {
            for line in attached.iter().flat_map(|s| s.source.lines()) {
                let mut words = line.split_whitespace();
                if words.next() != Some("uniform") {
                    continue;
                }

                if let Some(name) = words.nth(1) {
                    let name = name.trim_end_matches(';').to_string();
                    if !program.uniforms.contains(&name) {
                        program.uniforms.push(name);
                    }
                }
            }
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.programs.borrow()[&program].linked
    }

    fn program_info_log(&self, program: u32) -> String {
        if self.program_link_status(program) {
            String::new()
        } else {
            "error: linking failed, unresolved reference\n".to_string()
        }
    }

    fn delete_program(&self, program: u32) {
        self.programs.borrow_mut().get_mut(&program).unwrap().deleted = true;
        if self.current.get() == Some(program) {
            self.current.set(None);
        }
    }

    fn use_program(&self, program: Option<u32>) {
        self.current.set(program);
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<MockLocation> {
        self.lookups.set(self.lookups.get() + 1);

        let programs = self.programs.borrow();
        let data = &programs[&program];
        if !data.linked {
            return None;
        }

        data.uniforms
            .iter()
            .position(|uniform| uniform == name)
            .map(|index| MockLocation { program, index })
    }

    fn set_uniform(&self, location: Option<&MockLocation>, value: &UniformValue) {
        self.pushes.borrow_mut().push(Push {
            current: self.current.get(),
            location: location.copied(),
            value: *value,
        });
    }
}

/// A writer that collects everything a `tracing` subscriber prints.
#[derive(Clone, Default)]
pub(crate) struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` and return whatever it logged at `WARN` or above.
pub(crate) fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let captured = Captured::default();
    let writer = captured.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .finish();

    let out = tracing::subscriber::with_default(subscriber, f);
    (out, captured.contents())
}
