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

//! Building shader programs and pushing uniforms to them.

use crate::error::Error;
use crate::gpu_backend::{ShaderContext, ShaderStage};
use crate::source::{ShaderSource, VersionHeader};
use crate::uniform::UniformValue;
use crate::CallOnDrop;

use ahash::RandomState;
use arrayvec::ArrayVec;
use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};
use hashbrown::HashMap;

use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::path::Path;
use std::rc::Rc;

/// The longest info log kept from the driver, in bytes.
const MAX_INFO_LOG: usize = 1024;

/// Vertex, fragment and geometry.
const STAGE_COUNT: usize = 3;

/// Describes the sources and options of a [`ShaderProgram`] before it is built.
#[derive(Debug, Clone)]
pub struct ProgramBuilder {
    vertex: ShaderSource,
    fragment: ShaderSource,
    geometry: Option<ShaderSource>,
    version_header: VersionHeader,
    label: Option<Cow<'static, str>>,
}

impl ProgramBuilder {
    /// Start a program from its two mandatory stages.
    pub fn new(vertex: impl Into<ShaderSource>, fragment: impl Into<ShaderSource>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
            geometry: None,
            version_header: VersionHeader::Keep,
            label: None,
        }
    }

    /// Add a geometry stage.
    pub fn geometry(mut self, geometry: impl Into<ShaderSource>) -> Self {
        self.geometry = Some(geometry.into());
        self
    }

    /// Set how `#version` directives are handled.
    pub fn version_header(mut self, version_header: VersionHeader) -> Self {
        self.version_header = version_header;
        self
    }

    /// Name the program in log output.
    pub fn label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Read, compile and link every stage into a program.
    ///
    /// All sources are read before the driver is touched. Every intermediate shader object is
    /// deleted before this returns, whether or not building succeeded.
    ///
    /// # Safety
    ///
    /// `context` must be current on this thread, and must stay current whenever the returned
    /// program is used or dropped.
    pub unsafe fn build<C: ShaderContext + ?Sized>(
        self,
        context: Rc<C>,
    ) -> Result<ShaderProgram<C>, Error> {
        let Self {
            vertex,
            fragment,
            geometry,
            version_header,
            label,
        } = self;
        let name = label.as_deref().unwrap_or(UNNAMED);

        let mut sources = ArrayVec::<_, STAGE_COUNT>::new();
        sources.push((ShaderStage::Vertex, vertex.load(ShaderStage::Vertex)?));
        sources.push((ShaderStage::Fragment, fragment.load(ShaderStage::Fragment)?));
        if let Some(geometry) = &geometry {
            sources.push((ShaderStage::Geometry, geometry.load(ShaderStage::Geometry)?));
        }

        let version = context.version();
        if let Some(&(stage, _)) = sources.iter().find(|(stage, _)| !version.supports(*stage)) {
            return Err(Error::UnsupportedStage(stage));
        }

        let stages = sources
            .iter()
            .map(|(stage, _)| *stage)
            .collect::<ArrayVec<_, STAGE_COUNT>>();

        let mut shaders = StageShaders {
            context: &*context,
            shaders: ArrayVec::new(),
        };
        for (stage, source) in sources {
            let source = version_header.apply(version, source);
            let shader = compile_shader(&*context, stage, &source, name)?;
            shaders.shaders.push(shader);
        }

        let program = link_program(&*context, &shaders.shaders, name)?;
        drop(shaders);

        tracing::debug!("linked program {} from stages {:?}", name, stages.as_slice());

        Ok(ShaderProgram {
            context,
            program,
            stages,
            label,
            uniforms: RefCell::new(HashMap::with_hasher(RandomState::new())),
            bound: Cell::new(0),
        })
    }
}

const UNNAMED: &str = "<unnamed>";

/// A linked shader program.
///
/// The program object is deleted when this is dropped.
pub struct ShaderProgram<C: ShaderContext + ?Sized> {
    /// The context the program lives in.
    context: Rc<C>,

    /// The program object.
    program: C::Program,

    /// The stages linked into the program, in pipeline order.
    stages: ArrayVec<ShaderStage, STAGE_COUNT>,

    /// Name used in log output.
    label: Option<Cow<'static, str>>,

    /// Uniform locations looked up so far, including names that are not active.
    uniforms: RefCell<HashMap<Box<str>, Option<C::UniformLocation>, RandomState>>,

    /// Number of live [`BoundProgram`] guards for this program.
    bound: Cell<usize>,
}

impl<C: ShaderContext + ?Sized> fmt::Debug for ShaderProgram<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("program", &self.program)
            .field("stages", &self.stages.as_slice())
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<C: ShaderContext + ?Sized> ShaderProgram<C> {
    /// Build a program from shader files.
    ///
    /// `geometry` is only read when it is `Some`.
    ///
    /// # Safety
    ///
    /// See [`ProgramBuilder::build`].
    pub unsafe fn from_files(
        context: Rc<C>,
        vertex: impl AsRef<Path>,
        fragment: impl AsRef<Path>,
        geometry: Option<&Path>,
    ) -> Result<Self, Error> {
        let mut builder = ProgramBuilder::new(vertex.as_ref(), fragment.as_ref());
        if let Some(geometry) = geometry {
            builder = builder.geometry(geometry);
        }

        builder.build(context)
    }

    /// Make this program current.
    ///
    /// Uniforms are set through the returned guard. The program stays current until the last
    /// guard for it is dropped, so draw calls should be issued while one is alive. Guards may
    /// be nested.
    pub fn use_program(&self) -> BoundProgram<'_, C> {
        self.context.use_program(Some(self.program));
        self.bound.set(self.bound.get() + 1);
        BoundProgram { program: self }
    }

    /// Get the location of a uniform, or `None` if it is not active in this program.
    pub fn uniform_location(&self, name: &str) -> Option<C::UniformLocation> {
        let mut uniforms = self.uniforms.borrow_mut();
        if let Some(location) = uniforms.get(name) {
            return location.clone();
        }

        let location = self.context.uniform_location(self.program, name);
        if location.is_none() {
            tracing::trace!("{} is not an active uniform of {}", name, self.name());
        }

        uniforms.insert(name.into(), location.clone());
        location
    }

    /// The underlying program object.
    pub fn raw(&self) -> C::Program {
        self.program
    }

    /// The stages linked into this program.
    pub fn stages(&self) -> &[ShaderStage] {
        &self.stages
    }

    /// The label given at build time.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get a reference to the underlying context.
    pub fn context(&self) -> &C {
        &self.context
    }

    fn name(&self) -> &str {
        self.label().unwrap_or(UNNAMED)
    }
}

impl<C: ShaderContext + ?Sized> Drop for ShaderProgram<C> {
    fn drop(&mut self) {
        tracing::debug!("deleting program {}", self.name());
        self.context.delete_program(self.program);
    }
}

/// A [`ShaderProgram`] that is currently in use.
///
/// Uniform setters forward to the driver immediately, making the program current again first
/// in case another guard unbound it. Names that are not active uniforms are ignored.
#[must_use = "the program is unbound when this guard is dropped"]
pub struct BoundProgram<'a, C: ShaderContext + ?Sized> {
    program: &'a ShaderProgram<C>,
}

impl<'a, C: ShaderContext + ?Sized> BoundProgram<'a, C> {
    /// The program that is in use.
    pub fn program(&self) -> &'a ShaderProgram<C> {
        self.program
    }

    /// Set a uniform of any supported type.
    pub fn set_uniform(&self, name: &str, value: impl Into<UniformValue>) {
        let value = value.into();
        let location = self.program.uniform_location(name);
        let context = &self.program.context;
        context.use_program(Some(self.program.program));
        context.set_uniform(location.as_ref(), &value);
    }

    /// Set a `bool` uniform.
    pub fn set_bool(&self, name: &str, value: bool) {
        self.set_uniform(name, value)
    }

    /// Set an `int` uniform.
    pub fn set_int(&self, name: &str, value: i32) {
        self.set_uniform(name, value)
    }

    /// Set a `float` uniform.
    pub fn set_float(&self, name: &str, value: f32) {
        self.set_uniform(name, value)
    }

    /// Set a `vec2` uniform.
    pub fn set_vec2(&self, name: &str, value: Vec2) {
        self.set_uniform(name, value)
    }

    /// Set a `vec2` uniform from its components.
    pub fn set_vec2_xy(&self, name: &str, x: f32, y: f32) {
        self.set_uniform(name, Vec2::new(x, y))
    }

    /// Set a `vec3` uniform.
    pub fn set_vec3(&self, name: &str, value: Vec3) {
        self.set_uniform(name, value)
    }

    /// Set a `vec3` uniform from its components.
    pub fn set_vec3_xyz(&self, name: &str, x: f32, y: f32, z: f32) {
        self.set_uniform(name, Vec3::new(x, y, z))
    }

    /// Set a `vec4` uniform.
    pub fn set_vec4(&self, name: &str, value: Vec4) {
        self.set_uniform(name, value)
    }

    /// Set a `vec4` uniform from its components.
    pub fn set_vec4_xyzw(&self, name: &str, x: f32, y: f32, z: f32, w: f32) {
        self.set_uniform(name, Vec4::new(x, y, z, w))
    }

    /// Set a `mat2` uniform.
    pub fn set_mat2(&self, name: &str, value: &Mat2) {
        self.set_uniform(name, *value)
    }

    /// Set a `mat3` uniform.
    pub fn set_mat3(&self, name: &str, value: &Mat3) {
        self.set_uniform(name, *value)
    }

    /// Set a `mat4` uniform.
    pub fn set_mat4(&self, name: &str, value: &Mat4) {
        self.set_uniform(name, *value)
    }
}

impl<C: ShaderContext + ?Sized> Drop for BoundProgram<'_, C> {
    fn drop(&mut self) {
        let bound = self.program.bound.get() - 1;
        self.program.bound.set(bound);
        if bound == 0 {
            self.program.context.use_program(None);
        }
    }
}

/// Shader objects that are deleted once linking is over.
struct StageShaders<'a, C: ShaderContext + ?Sized> {
    context: &'a C,
    shaders: ArrayVec<C::Shader, STAGE_COUNT>,
}

impl<C: ShaderContext + ?Sized> Drop for StageShaders<'_, C> {
    fn drop(&mut self) {
        for &shader in &self.shaders {
            self.context.delete_shader(shader);
        }
    }
}

/// The object whose status is being checked.
enum Checked<C: ShaderContext + ?Sized> {
    Shader(ShaderStage, C::Shader),
    Program(C::Program),
}

fn compile_shader<C: ShaderContext + ?Sized>(
    context: &C,
    stage: ShaderStage,
    source: &str,
    name: &str,
) -> Result<C::Shader, Error> {
    let shader = context.create_shader(stage)?;
    let call_on_drop = CallOnDrop(|| context.delete_shader(shader));

    context.shader_source(shader, source);
    context.compile_shader(shader);
    check_compile_errors(context, Checked::Shader(stage, shader), name)?;

    mem::forget(call_on_drop);
    Ok(shader)
}

fn link_program<C: ShaderContext + ?Sized>(
    context: &C,
    shaders: &[C::Shader],
    name: &str,
) -> Result<C::Program, Error> {
    let program = context.create_program()?;
    let call_on_drop = CallOnDrop(|| context.delete_program(program));

    for &shader in shaders {
        context.attach_shader(program, shader);
    }
    let _detach_shaders = CallOnDrop(|| {
        for &shader in shaders {
            context.detach_shader(program, shader);
        }
    });

    context.link_program(program);
    check_compile_errors(context, Checked::Program(program), name)?;

    mem::forget(call_on_drop);
    Ok(program)
}

/// Check the compile status of a shader or the link status of a program.
///
/// Failures are logged with their stage label and the driver's info log.
fn check_compile_errors<C: ShaderContext + ?Sized>(
    context: &C,
    object: Checked<C>,
    name: &str,
) -> Result<(), Error> {
    match object {
        Checked::Shader(stage, shader) => {
            if context.shader_compile_status(shader) {
                return Ok(());
            }

            let log = trim_info_log(context.shader_info_log(shader));
            tracing::error!(
                "shader compilation error of type {} in {}\n{}",
                stage,
                name,
                log
            );

            Err(Error::Compile { stage, log })
        }

        Checked::Program(program) => {
            if context.program_link_status(program) {
                return Ok(());
            }

            let log = trim_info_log(context.program_info_log(program));
            tracing::error!("program linking error of type PROGRAM in {}\n{}", name, log);

            Err(Error::Link { log })
        }
    }
}

/// Cap an info log at [`MAX_INFO_LOG`] bytes and strip trailing NULs and whitespace.
fn trim_info_log(mut log: String) -> String {
    if log.len() > MAX_INFO_LOG {
        let mut end = MAX_INFO_LOG;
        while !log.is_char_boundary(end) {
            end -= 1;
        }
        log.truncate(end);
    }

    let len = log
        .trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
        .len();
    log.truncate(len);
    log
}
