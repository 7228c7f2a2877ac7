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

//! Load, compile and link GLSL shader programs.
//!
//! The centerpiece of this crate is [`ShaderProgram`], which takes the vertex, fragment and
//! optional geometry stages of a program, compiles and links them with an OpenGL context
//! provided by [`glow`], and deletes the program again when dropped. Uniforms are set through
//! the [`BoundProgram`] returned by [`ShaderProgram::use_program`], so values only ever reach
//! the program that is current.
//!
//! ```no_run
//! use glow_program::{ProgramBuilder, ShaderSource};
//! use std::rc::Rc;
//!
//! # fn render(gl: glow::Context) -> Result<(), glow_program::Error> {
//! let gl = Rc::new(gl);
//!
//! // SAFETY: `gl` is current on this thread.
//! let program = unsafe {
//!     ProgramBuilder::new(
//!         ShaderSource::file("shaders/scene.vs"),
//!         ShaderSource::file("shaders/scene.fs"),
//!     )
//!     .geometry(ShaderSource::file("shaders/scene.gs"))
//!     .label("scene")
//!     .build(gl.clone())?
//! };
//!
//! let bound = program.use_program();
//! bound.set_mat4("uMvp", &glam::Mat4::IDENTITY);
//! bound.set_vec3_xyz("uLightColor", 1.0, 0.9, 0.8);
//! // ... draw calls ...
//! # Ok(())
//! # }
//! ```
//!
//! Any context type can be used by implementing [`ShaderContext`]; every [`glow::HasContext`]
//! already does.
//!
//! [`glow`]: https://crates.io/crates/glow

mod error;
mod gl;
mod gpu_backend;
mod program;
mod source;
mod uniform;

#[cfg(test)]
mod mock;

pub use error::Error;
pub use gpu_backend::{ContextVersion, ShaderContext, ShaderStage};
pub use program::{BoundProgram, ProgramBuilder, ShaderProgram};
pub use source::{ShaderSource, VersionHeader};
pub use uniform::UniformValue;

pub use glam;
pub use glow;

/// Run a closure when dropped, unless forgotten.
pub(crate) struct CallOnDrop<F: FnMut()>(pub(crate) F);

impl<F: FnMut()> Drop for CallOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}
