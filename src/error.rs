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

//! The error type for building programs.

use crate::gpu_backend::ShaderStage;

use std::fmt;
use std::io;
use std::path::PathBuf;

/// An error that occurred while building a [`ShaderProgram`].
///
/// [`ShaderProgram`]: crate::ShaderProgram
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A shader source file could not be read.
    Io {
        /// The stage the file was meant for.
        stage: ShaderStage,

        /// The path that failed.
        path: PathBuf,

        /// The underlying I/O error.
        source: io::Error,
    },

    /// The context cannot run this stage.
    UnsupportedStage(ShaderStage),

    /// A stage failed to compile.
    Compile {
        /// The stage that failed.
        stage: ShaderStage,

        /// The driver's info log.
        log: String,
    },

    /// The program failed to link.
    Link {
        /// The driver's info log.
        log: String,
    },

    /// The driver refused to create an object.
    Backend(String),
}

impl Error {
    /// The stage this error is tied to, if any.
    pub fn stage(&self) -> Option<ShaderStage> {
        match self {
            Error::Io { stage, .. } | Error::Compile { stage, .. } => Some(*stage),
            Error::UnsupportedStage(stage) => Some(*stage),
            Error::Link { .. } | Error::Backend(_) => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Backend(s)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io { stage, path, .. } => {
                write!(
                    f,
                    "failed to read {} shader from {}",
                    stage,
                    path.display()
                )
            }
            Error::UnsupportedStage(stage) => {
                write!(f, "{stage} shaders are not supported by this context")
            }
            Error::Compile { stage, log } => {
                write!(f, "shader compilation error of type {stage}: {log}")
            }
            Error::Link { log } => write!(f, "program linking error: {log}"),
            Error::Backend(msg) => write!(f, "gl error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
