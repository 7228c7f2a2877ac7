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

//! Defines the driver interface that shader programs are built on.

use crate::uniform::UniformValue;

use std::fmt;

/// A stage of the programmable pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    /// The vertex shader.
    Vertex,

    /// The fragment shader.
    Fragment,

    /// The geometry shader.
    Geometry,
}

impl ShaderStage {
    /// The label used for this stage in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "VERTEX",
            ShaderStage::Fragment => "FRAGMENT",
            ShaderStage::Geometry => "GEOMETRY",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The version of the GL context a program is built against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextVersion {
    /// The major version.
    pub major: u32,

    /// The minor version.
    pub minor: u32,

    /// Whether this is an OpenGL ES context.
    pub is_embedded: bool,
}

impl ContextVersion {
    /// Create a new desktop OpenGL version.
    pub const fn desktop(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            is_embedded: false,
        }
    }

    /// Create a new OpenGL ES version.
    pub const fn embedded(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            is_embedded: true,
        }
    }

    fn at_least(&self, major: u32, minor: u32) -> bool {
        (self.major, self.minor) >= (major, minor)
    }

    /// Whether a context of this version can run the given stage.
    ///
    /// Geometry shaders need OpenGL 3.2 or OpenGL ES 3.2.
    pub fn supports(&self, stage: ShaderStage) -> bool {
        match stage {
            ShaderStage::Vertex | ShaderStage::Fragment => true,
            ShaderStage::Geometry => self.at_least(3, 2),
        }
    }

    /// The `#version` directive that matches this context.
    ///
    /// Desktop contexts newer than 3.3 still get `#version 330 core`.
    pub fn glsl_header(&self) -> &'static str {
        match (self.is_embedded, self.major, self.minor) {
            (false, 2, 0) | (false, 0..=1, _) => "#version 110",
            (false, 2, _) => "#version 120",
            (false, 3, 0) => "#version 130",
            (false, 3, 1) => "#version 140",
            (false, 3, 2) => "#version 150 core",
            (false, _, _) => "#version 330 core",
            (true, 0..=2, _) => "#version 100",
            (true, 3, 0) => "#version 300 es",
            (true, 3, 1) => "#version 310 es",
            (true, _, _) => "#version 320 es",
        }
    }
}

/// The part of a GL context needed to build and drive a shader program.
///
/// Every method maps onto one driver call. The context is assumed to be current on the calling
/// thread whenever one of these methods runs.
pub trait ShaderContext {
    /// A compiled, per-stage shader object.
    type Shader: Copy + fmt::Debug;

    /// A program object.
    type Program: Copy + fmt::Debug;

    /// The location of an active uniform in a linked program.
    type UniformLocation: Clone + fmt::Debug;

    /// Get the version of this context.
    fn version(&self) -> ContextVersion;

    /// Create a new shader object for the given stage.
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;

    /// Replace the source text of a shader object.
    fn shader_source(&self, shader: Self::Shader, source: &str);

    /// Compile a shader object.
    fn compile_shader(&self, shader: Self::Shader);

    /// Whether the last compilation of this shader succeeded.
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;

    /// Get the info log of a shader object.
    fn shader_info_log(&self, shader: Self::Shader) -> String;

    /// Delete a shader object.
    fn delete_shader(&self, shader: Self::Shader);

    /// Create a new program object.
    fn create_program(&self) -> Result<Self::Program, String>;

    /// Attach a shader object to a program.
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);

    /// Detach a shader object from a program.
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);

    /// Link a program.
    fn link_program(&self, program: Self::Program);

    /// Whether the last link of this program succeeded.
    fn program_link_status(&self, program: Self::Program) -> bool;

    /// Get the info log of a program object.
    fn program_info_log(&self, program: Self::Program) -> String;

    /// Delete a program object.
    fn delete_program(&self, program: Self::Program);

    /// Make a program current, or unbind the current one.
    fn use_program(&self, program: Option<Self::Program>);

    /// Look up the location of a uniform by name.
    ///
    /// Returns `None` if the name is not an active uniform of `program`.
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    /// Push a value to a uniform of the current program.
    ///
    /// A `None` location is forwarded as-is; the driver ignores the push.
    fn set_uniform(&self, location: Option<&Self::UniformLocation>, value: &UniformValue);
}
