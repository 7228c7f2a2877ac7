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

//! The [`ShaderContext`] implementation for [`glow`] contexts.
//!
//! [`glow`]: https://crates.io/crates/glow

use crate::gpu_backend::{ContextVersion, ShaderContext, ShaderStage};
use crate::uniform::UniformValue;

use glow::HasContext;

impl<H: HasContext + ?Sized> ShaderContext for H {
    type Shader = H::Shader;
    type Program = H::Program;
    type UniformLocation = H::UniformLocation;

    fn version(&self) -> ContextVersion {
        let version = HasContext::version(self);

        ContextVersion {
            major: version.major,
            minor: version.minor,
            is_embedded: version.is_embedded,
        }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        let shader_type = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
            ShaderStage::Geometry => glow::GEOMETRY_SHADER,
        };

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
        unsafe {
            HasContext::link_program(self, program);
        }

        gl_error(self, "glLinkProgram");
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(self, program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(self, program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn set_uniform(&self, location: Option<&Self::UniformLocation>, value: &UniformValue) {
        unsafe {
            match *value {
                UniformValue::Bool(b) => self.uniform_1_i32(location, b as i32),
                UniformValue::Int(i) => self.uniform_1_i32(location, i),
                UniformValue::Float(f) => self.uniform_1_f32(location, f),
                UniformValue::Vec2(v) => self.uniform_2_f32_slice(location, &v.to_array()),
                UniformValue::Vec3(v) => self.uniform_3_f32_slice(location, &v.to_array()),
                UniformValue::Vec4(v) => self.uniform_4_f32_slice(location, &v.to_array()),
                UniformValue::Mat2(m) => {
                    self.uniform_matrix_2_f32_slice(location, false, &m.to_cols_array())
                }
                UniformValue::Mat3(m) => {
                    self.uniform_matrix_3_f32_slice(location, false, &m.to_cols_array())
                }
                UniformValue::Mat4(m) => {
                    self.uniform_matrix_4_f32_slice(location, false, &m.to_cols_array())
                }
            }
        }

        gl_error(self, "glUniform");
    }
}

/// Log any pending GL error. Only checked in debug builds.
fn gl_error(h: &(impl HasContext + ?Sized), call: &str) {
    if !cfg!(debug_assertions) {
        return;
    }

    let err = unsafe { h.get_error() };
    if let Some(name) = error_name(err) {
        tracing::error!("GL error after {}: {}", call, name);
    }
}

/// The name of a `glGetError` code, or `None` for `GL_NO_ERROR`.
fn error_name(err: u32) -> Option<&'static str> {
    Some(match err {
        glow::NO_ERROR => return None,
        glow::INVALID_ENUM => "GL_INVALID_ENUM",
        glow::INVALID_VALUE => "GL_INVALID_VALUE",
        glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
        glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        glow::CONTEXT_LOST => "GL_CONTEXT_LOST",
        _ => "unknown GL error",
    })
}
